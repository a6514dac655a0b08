use crate::config::TelemetryConfig;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("invalid log filter '{value}'")]
    InvalidFilter {
        value: String,
        #[source]
        source: ParseError,
    },
    #[error("subscriber already installed: {0}")]
    AlreadyInstalled(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Installs the global fmt subscriber on stderr, keeping stdout for command
/// output. A valid `RUST_LOG` wins over the configured level.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let env_filter = log_filter(rust_log.as_deref(), &config.log_level)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(TelemetryError::AlreadyInstalled)
}

fn log_filter(rust_log: Option<&str>, log_level: &str) -> Result<EnvFilter, TelemetryError> {
    if let Some(filter) = rust_log.and_then(|directives| EnvFilter::try_new(directives).ok()) {
        return Ok(filter);
    }
    EnvFilter::try_new(log_level).map_err(|source| TelemetryError::InvalidFilter {
        value: log_level.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn bad_configured_level_names_the_value_once() {
        let error = log_filter(None, "deal_radar=loud").expect_err("level rejected");
        assert!(matches!(error, TelemetryError::InvalidFilter { ref value, .. } if value == "deal_radar=loud"));
        assert_eq!(
            AppError::from(error).to_string(),
            "telemetry error: invalid log filter 'deal_radar=loud'"
        );
    }

    #[test]
    fn rust_log_overrides_and_falls_back_when_invalid() {
        assert!(log_filter(Some("debug"), "deal_radar=loud").is_ok());
        assert!(log_filter(Some("deal_radar=loud"), "info").is_ok());
        assert!(log_filter(None, "deal_radar=debug,warn").is_ok());
    }
}
