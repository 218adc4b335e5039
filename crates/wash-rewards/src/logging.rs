use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogRotation, LoggingConfig};

/// Directives used when neither `RUST_LOG` nor the config names a filter:
/// this crate at `info`, dependencies at `warn`.
pub fn default_directives() -> String {
    format!("{}=info,warn", env!("CARGO_CRATE_NAME"))
}

/// Filter directives for the configured logging section.
pub fn filter_directives(logging: &LoggingConfig) -> String {
    logging.filter.clone().unwrap_or_else(default_directives)
}

impl From<LogRotation> for Rotation {
    fn from(rotation: LogRotation) -> Self {
        match rotation {
            LogRotation::Hourly => Rotation::HOURLY,
            LogRotation::Daily => Rotation::DAILY,
            LogRotation::Never => Rotation::NEVER,
        }
    }
}

/// Initialise the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured filter. Returns a [`WorkerGuard`]
/// that **must** be held for the lifetime of the process; dropping it
/// flushes the JSON log file.
pub fn init_tracing(logging: &LoggingConfig) -> Result<WorkerGuard> {
    std::fs::create_dir_all(&logging.log_dir)
        .with_context(|| format!("failed to create log directory {}", logging.log_dir))?;

    let file_appender =
        RollingFileAppender::new(logging.rotation.into(), &logging.log_dir, &logging.file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(filter_directives(logging))
            .context("invalid logging filter directives")?,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .json(),
        )
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .compact(),
        )
        .init();

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_target_this_crate() {
        assert_eq!(default_directives(), "wash_rewards=info,warn");
        assert!(EnvFilter::try_new(default_directives()).is_ok());
    }

    #[test]
    fn test_configured_filter_replaces_default() {
        let mut logging = LoggingConfig::default();
        assert_eq!(filter_directives(&logging), default_directives());

        logging.filter = Some("wash_rewards::core=debug,info".into());
        assert_eq!(filter_directives(&logging), "wash_rewards::core=debug,info");
    }

    #[test]
    fn test_rotation_mapping() {
        assert_eq!(Rotation::from(LogRotation::Hourly), Rotation::HOURLY);
        assert_eq!(Rotation::from(LogRotation::Daily), Rotation::DAILY);
        assert_eq!(Rotation::from(LogRotation::Never), Rotation::NEVER);
    }
}
