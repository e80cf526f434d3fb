use tracing_subscriber::{
    fmt::{self, format::FmtSpan, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::{LogFormat, LoggingConfig};

/// Directives appended to the configured level so that upstream HTML parsing
/// and connection pooling stay quiet unless RUST_LOG asks for them
const QUIET_DEPENDENCIES: &[&str] = &["hyper_util=warn", "html5ever=warn", "selectors=warn"];

fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let mut directives = vec![level.to_string()];
        directives.extend(QUIET_DEPENDENCIES.iter().map(|d| d.to_string()));
        EnvFilter::new(directives.join(","))
    })
}

/// Logs to stdout, for the server
pub fn init_logging(config: &LoggingConfig) {
    init_with_writer(config, std::io::stdout);
}

/// Logs to stderr, for commands that print results on stdout
pub fn init_cli_logging(config: &LoggingConfig) {
    init_with_writer(config, std::io::stderr);
}

fn init_with_writer<W>(config: &LoggingConfig, writer: W)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = build_filter(&config.level);

    let result = match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .pretty()
                    .with_writer(writer)
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init(),
    };

    if result.is_ok() {
        tracing::info!("Logging initialized with level: {}", config.level);
    }
}
