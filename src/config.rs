// src/config.rs

use crate::core::partition::DisclosurePolicy;
use crate::core::session::UnlockVariant;
use crate::logging::project_directory;
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.webseccheck.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 45;
pub const API_URL_ENV: &str = "WEBSECCHECK_API_URL";

/// Command-line arguments.
#[derive(Debug, Default, Parser)]
#[command(name = "webseccheck", version, about = "Website security check from your terminal")]
pub struct Cli {
    /// Website to scan as soon as the UI opens
    pub url: Option<String>,

    /// Origin of the WebSecCheck API
    #[arg(long)]
    pub api_url: Option<String>,

    /// Which report-unlock flow to offer
    #[arg(long, value_enum)]
    pub variant: Option<UnlockVariant>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Path to a config file (defaults to config.toml in the config directory)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Optional settings read from `config.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub api_url: Option<String>,
    pub variant: Option<UnlockVariant>,
    pub request_timeout_secs: Option<u64>,
    pub free_checks: Option<Vec<String>>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&text).wrap_err_with(|| format!("invalid config file {}", path.display()))
    }
}

/// Fully resolved settings.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub variant: UnlockVariant,
    pub request_timeout: Duration,
    pub policy: DisclosurePolicy,
}

impl Config {
    /// Defaults, then the config file, then the environment, then flags.
    pub fn load(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => Some(FileConfig::load(path)?),
            None => match default_config_path() {
                Some(path) if path.exists() => Some(FileConfig::load(&path)?),
                _ => None,
            },
        };
        Ok(Self::resolve(file, std::env::var(API_URL_ENV).ok(), cli))
    }

    pub fn resolve(file: Option<FileConfig>, env_api_url: Option<String>, cli: &Cli) -> Self {
        let file = file.unwrap_or_default();
        let api_url = cli
            .api_url
            .clone()
            .or(env_api_url.filter(|v| !v.trim().is_empty()))
            .or(file.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let policy = file.free_checks.map(DisclosurePolicy::new).unwrap_or_default();

        Self {
            api_url,
            variant: cli.variant.or(file.variant).unwrap_or_default(),
            request_timeout: Duration::from_secs(
                cli.timeout.or(file.request_timeout_secs).unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            policy,
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    project_directory().map(|dirs| dirs.config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_apply_without_sources() {
        let config = Config::resolve(None, None, &Cli::default());
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.variant, UnlockVariant::Checkout);
        assert_eq!(config.request_timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.policy, DisclosurePolicy::default());
    }

    #[test]
    fn file_then_env_then_flags() {
        let file = FileConfig {
            api_url: Some("https://file.example".into()),
            variant: Some(UnlockVariant::EmailReport),
            request_timeout_secs: Some(10),
            free_checks: Some(vec!["hsts".into()]),
        };
        let config = Config::resolve(Some(file), Some("https://env.example".into()), &Cli::default());
        assert_eq!(config.api_url, "https://env.example");
        assert_eq!(config.variant, UnlockVariant::EmailReport);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert!(config.policy.is_free("hsts"));
        assert!(!config.policy.is_free("ssl_valid"));

        let cli = Cli {
            api_url: Some("https://flag.example".into()),
            variant: Some(UnlockVariant::Checkout),
            ..Default::default()
        };
        let config = Config::resolve(None, Some("https://env.example".into()), &cli);
        assert_eq!(config.api_url, "https://flag.example");
        assert_eq!(config.variant, UnlockVariant::Checkout);
    }

    #[test]
    fn reads_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "api_url = \"https://staging.example\"\nvariant = \"email-report\"\nfree_checks = [\"hsts\", \"spf\"]"
        )
        .unwrap();
        let parsed = FileConfig::load(file.path()).unwrap();
        assert_eq!(parsed.api_url.as_deref(), Some("https://staging.example"));
        assert_eq!(parsed.variant, Some(UnlockVariant::EmailReport));
        assert_eq!(parsed.free_checks.map(|ids| ids.len()), Some(2));
    }

    #[test]
    fn rejects_unknown_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "colour = \"green\"").unwrap();
        assert!(FileConfig::load(file.path()).is_err());
    }

    #[test]
    fn parses_flags() {
        let cli = Cli::parse_from(["webseccheck", "--variant", "email-report", "--timeout", "5", "example.com"]);
        assert_eq!(cli.variant, Some(UnlockVariant::EmailReport));
        assert_eq!(cli.timeout, Some(5));
        assert_eq!(cli.url.as_deref(), Some("example.com"));
    }
}
