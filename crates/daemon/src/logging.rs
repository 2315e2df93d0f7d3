//! tracing-subscriber setup: stderr in pretty or JSON form, plus an optional
//! daily-rolling JSON file.

use crate::config::{DaemonConfig, LogFormat};
use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "fleetsure=info";
const LOG_FILE_PREFIX: &str = "fleetsure.log";

/// Install the global subscriber. Keep the returned guard alive until exit
/// so buffered file output is flushed.
pub fn init(config: &DaemonConfig) -> Result<Option<WorkerGuard>> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_LOG_FILTER))?;

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer);

    match config.log_format {
        // Production: JSON structured logging
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        // Development: Pretty formatting with colors
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).init(),
    }

    Ok(guard)
}
