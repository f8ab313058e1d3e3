//! Logging Infrastructure
//!
//! `LOG_LVL` selects the default level; `RUST_LOG` directives override it.

use std::path::Path;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

type InitError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Initialize the logger, writing to a daily rolling file when `log_dir` exists
pub fn init_logger_with_file(log_level: Option<&str>, log_dir: Option<&str>) -> Result<(), InitError> {
    let level = parse_level(log_level.unwrap_or("info"));
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.is_dir() {
            let file_appender = tracing_appender::rolling::daily(log_path, "accrual-worker");
            return subscriber.with_ansi(false).with_writer(file_appender).try_init();
        }
    }

    subscriber.try_init()
}

/// Map a `LOG_LVL` value onto a tracing level, defaulting to INFO
pub fn parse_level(value: &str) -> tracing::Level {
    value.trim().parse().unwrap_or(tracing::Level::INFO)
}
