// Path: crates/perf-context/src/init.rs
use crate::config::PerfConfig;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer, Registry};

/// Initializes the global `tracing` subscriber.
///
/// `RUST_LOG` wins over `config.log_filter` when set. `log` records are
/// bridged into `tracing`.
pub fn init_tracing(config: &PerfConfig) -> Result<(), anyhow::Error> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))?;
    let fmt_layer = if config.log_json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };
    let subscriber = Registry::default().with(filter).with(fmt_layer);
    tracing_log::LogTracer::init()?;
    tracing::subscriber::set_global_default(subscriber)?;
    tracing::debug!(target: "perf", level = %config.level, "tracing initialized");
    Ok(())
}
