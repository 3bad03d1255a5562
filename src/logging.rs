// src/logging.rs

use color_eyre::eyre::Result;
use directories::ProjectDirs;
use lazy_static::lazy_static;
use std::path::PathBuf;
use tracing::warn;
use tracing_error::ErrorLayer;
use tracing_subscriber::{self, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase();
    pub static ref LOG_ENV: String = format!("{}_LOGLEVEL", *PROJECT_NAME);
    pub static ref LOG_FILE: String = format!("{}.log", env!("CARGO_PKG_NAME"));
    static ref DEFAULT_DIRECTIVE: String = format!("{}=info", env!("CARGO_CRATE_NAME"));
}

pub fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "webseccheck", env!("CARGO_PKG_NAME"))
}

/// Where the log file lives. Falls back to `./.data` without a home directory.
pub fn data_dir() -> PathBuf {
    project_directory()
        .map(|dirs| dirs.data_local_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".").join(".data"))
}

/// The filter directive in effect: `RUST_LOG` wins over the project
/// variable, blank values count as unset.
fn filter_directive(rust_log: Option<String>, project_level: Option<String>) -> String {
    [rust_log, project_level]
        .into_iter()
        .flatten()
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_DIRECTIVE.clone())
}

/// Builds the filter, or the default one with the rejected directive when
/// the configured one does not parse.
fn build_filter(directive: &str) -> (EnvFilter, Option<String>) {
    match EnvFilter::try_new(directive) {
        Ok(filter) => (filter, None),
        Err(_) => (EnvFilter::new(DEFAULT_DIRECTIVE.as_str()), Some(directive.to_string())),
    }
}

/// Initializes file-based logging. The terminal belongs to the UI, so
/// nothing is written to stdout or stderr. Returns the log file path.
pub fn initialize_logging() -> Result<PathBuf> {
    let directory = data_dir();
    std::fs::create_dir_all(&directory)?;
    let log_path = directory.join(LOG_FILE.as_str());
    let log_file = std::fs::File::create(&log_path)?;

    let directive = filter_directive(std::env::var("RUST_LOG").ok(), std::env::var(LOG_ENV.as_str()).ok());
    let (filter, rejected) = build_filter(&directive);

    let file_subscriber = tracing_subscriber::fmt::layer()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_filter(filter);

    tracing_subscriber::registry()
        .with(file_subscriber)
        .with(ErrorLayer::default())
        .init();

    if let Some(rejected) = rejected {
        warn!(directive = %rejected, "Invalid log filter, using {}.", *DEFAULT_DIRECTIVE);
    }
    Ok(log_path)
}
