use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

use crate::config::Settings;
use crate::error::Error;

/// Initialize the logging system
pub fn init_logging(config: &Settings) -> Result<(), Error> {
    let log_level = parse_level(&config.general.log_level);

    // RUST_LOG directives still apply on top of the configured level
    let filter = EnvFilter::from_default_env()
        .add_directive(log_level.into());

    let registry = Registry::default().with(filter);
    let result = if config.telemetry.structured_logging {
        registry
            .with(
                fmt::Layer::default()
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .json(),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::Layer::default()
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .with_ansi(true),
            )
            .try_init()
    };

    result.map_err(|e| Error::Internal(format!("Failed to set global default subscriber: {}", e)))
}

/// Parse log level, falling back to INFO
fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}
