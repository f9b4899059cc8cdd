//! Configuration management for the patent portal using the prefer crate.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::scrapers::ScraperConfig;
use crate::search::DEFAULT_DISPLAY_LIMIT;

/// Default dataset filename.
pub const DEFAULT_DATA_FILE: &str = "master_patents.csv";

/// Default logo filename.
pub const DEFAULT_LOGO_FILE: &str = "logo.png";

/// Environment variable holding the shared passcode.
pub const PASSCODE_ENV: &str = "PATENT_PORTAL_PASSCODE";

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base data directory.
    pub data_dir: PathBuf,
    /// Path of the patent CSV.
    pub data_file: PathBuf,
    /// Optional logo image shown on every page.
    pub logo_file: PathBuf,
    /// Shared passcode gating the dashboard.
    pub passcode: Option<String>,
    /// Maximum rows rendered on the dashboard.
    pub display_limit: usize,
    /// Address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Portal version probe.
    pub scraper: ScraperConfig,
}

impl Default for Settings {
    fn default() -> Self {
        // Default to the working directory, where the dataset is usually checked in
        let data_dir = PathBuf::from(".");

        Self {
            data_file: data_dir.join(DEFAULT_DATA_FILE),
            logo_file: data_dir.join(DEFAULT_LOGO_FILE),
            data_dir,
            passcode: None,
            display_limit: DEFAULT_DISPLAY_LIMIT,
            host: "127.0.0.1".to_string(),
            port: 8501,
            scraper: ScraperConfig::default(),
        }
    }
}

impl Settings {
    /// The passcode, if one is configured and non-blank.
    pub fn passcode(&self) -> Option<&str> {
        self.passcode.as_deref().filter(|p| !p.is_empty())
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Base directory for the dataset and logo.
    #[serde(default)]
    pub data_dir: Option<String>,
    /// Dataset path, relative to `data_dir` unless absolute.
    #[serde(default)]
    pub data_file: Option<String>,
    /// Logo path, relative to `data_dir` unless absolute.
    #[serde(default)]
    pub logo_file: Option<String>,
    /// Shared passcode. Prefer the environment variable.
    #[serde(default)]
    pub passcode: Option<String>,
    /// Maximum rows rendered on the dashboard.
    #[serde(default)]
    pub display_limit: Option<usize>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    /// Portal version probe configuration.
    #[serde(default)]
    pub scraper: Option<ScraperConfig>,
}

impl Config {
    /// Load configuration using prefer crate.
    /// Automatically discovers patent-portal config files in standard locations.
    pub async fn load() -> Self {
        match prefer::load("patent-portal").await {
            Ok(pref_config) => {
                let data_dir: Option<String> = pref_config.get("data_dir").await.ok();
                let data_file: Option<String> = pref_config.get("data_file").await.ok();
                let logo_file: Option<String> = pref_config.get("logo_file").await.ok();
                let passcode: Option<String> = pref_config.get("passcode").await.ok();
                let display_limit: Option<usize> = pref_config.get("display_limit").await.ok();
                let host: Option<String> = pref_config.get("host").await.ok();
                let port: Option<u16> = pref_config.get("port").await.ok();
                let scraper: Option<ScraperConfig> = pref_config.get("scraper").await.ok();

                Config {
                    data_dir,
                    data_file,
                    logo_file,
                    passcode,
                    display_limit,
                    host,
                    port,
                    scraper,
                }
            }
            Err(_) => {
                // No config file found, use defaults
                Self::default()
            }
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings) {
        if let Some(ref dir) = self.data_dir {
            let dir = expand(dir);
            settings.data_file = dir.join(DEFAULT_DATA_FILE);
            settings.logo_file = dir.join(DEFAULT_LOGO_FILE);
            settings.data_dir = dir;
        }
        if let Some(ref file) = self.data_file {
            settings.data_file = settings.data_dir.join(expand(file));
        }
        if let Some(ref file) = self.logo_file {
            settings.logo_file = settings.data_dir.join(expand(file));
        }
        if let Some(ref passcode) = self.passcode {
            settings.passcode = Some(passcode.clone());
        }
        if let Some(limit) = self.display_limit {
            settings.display_limit = limit.max(1);
        }
        if let Some(ref host) = self.host {
            settings.host = host.clone();
        }
        if let Some(port) = self.port {
            settings.port = port;
        }
        if let Some(ref scraper) = self.scraper {
            settings.scraper = scraper.clone();
        }
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

/// Load settings from configuration (async version).
///
/// The passcode environment variable wins over the config file.
pub async fn load_settings() -> Settings {
    let config = Config::load().await;
    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings);
    if let Ok(passcode) = std::env::var(PASSCODE_ENV) {
        settings.passcode = Some(passcode);
    }
    settings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_defaults_live_in_working_directory() {
        let settings = Settings::default();
        assert_eq!(settings.data_dir, PathBuf::from("."));
        assert_eq!(settings.data_file, Path::new(".").join(DEFAULT_DATA_FILE));
        assert_eq!(settings.logo_file, Path::new(".").join(DEFAULT_LOGO_FILE));
    }

    #[test]
    fn test_apply_relative_paths_under_data_dir() {
        let config = Config {
            data_dir: Some("/srv/patents".to_string()),
            data_file: Some("export/latest.csv".to_string()),
            display_limit: Some(0),
            ..Default::default()
        };
        let mut settings = Settings {
            passcode: Some("kept".to_string()),
            ..Default::default()
        };
        config.apply_to_settings(&mut settings);

        assert_eq!(
            settings.data_file,
            PathBuf::from("/srv/patents/export/latest.csv")
        );
        assert_eq!(settings.logo_file, PathBuf::from("/srv/patents/logo.png"));
        assert_eq!(settings.display_limit, 1);
        assert_eq!(settings.passcode(), Some("kept"));
    }

    #[test]
    fn test_blank_passcode_is_unset() {
        let settings = Settings {
            passcode: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(settings.passcode(), None);
    }
}
