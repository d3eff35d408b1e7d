//! Configuration management for jobacquire.
//!
//! Settings are loaded from an optional `config.toml` in the data
//! directory, with serde defaults for everything that is absent. The
//! `DATABASE_URL` environment variable overrides the database location.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default database filename inside the data directory.
pub const DEFAULT_DATABASE_FILENAME: &str = "jobacquire.db";

/// Subdirectory of the data directory holding managed rendering engines.
pub const ENGINE_CACHE_SUBDIR: &str = "engine";

/// Runtime settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Base data directory.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Database filename.
    #[serde(default = "default_database_filename")]
    pub database_filename: String,
    /// Database URL (overrides data_dir/database_filename if set).
    #[serde(default)]
    pub database_url: Option<String>,
    /// Base URL of the listing site.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Path of the listings page, relative to the base URL.
    #[serde(default = "default_jobs_path")]
    pub jobs_path: String,
    /// Maximum number of listings to capture per run.
    #[serde(default = "default_max_jobs")]
    pub max_jobs: usize,
    /// Request timeout in seconds for static fetches.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
    /// Ceiling in seconds for rendering-engine navigation and page-ready waits.
    #[serde(default = "default_navigation_timeout")]
    pub navigation_timeout: u64,
    /// Run the rendering engine headless.
    #[serde(default = "default_headless")]
    pub headless: bool,
}

fn default_data_dir() -> PathBuf {
    // Falls back gracefully: Documents dir -> Home dir -> Current dir
    dirs::document_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("jobacquire")
}

fn default_database_filename() -> String {
    DEFAULT_DATABASE_FILENAME.to_string()
}

fn default_base_url() -> String {
    "https://www.actuarylist.com".to_string()
}

fn default_jobs_path() -> String {
    "/jobs".to_string()
}

fn default_max_jobs() -> usize {
    50
}

fn default_request_timeout() -> u64 {
    30
}

fn default_navigation_timeout() -> u64 {
    10
}

fn default_headless() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            database_filename: default_database_filename(),
            database_url: None,
            base_url: default_base_url(),
            jobs_path: default_jobs_path(),
            max_jobs: default_max_jobs(),
            request_timeout: default_request_timeout(),
            navigation_timeout: default_navigation_timeout(),
            headless: default_headless(),
        }
    }
}

impl Settings {
    /// Load settings for the given data directory (or the default one).
    ///
    /// Reads `config.toml` inside the data directory when present; a file
    /// that fails to parse is ignored with a warning rather than aborting.
    pub fn load(data_dir: Option<PathBuf>) -> Self {
        let data_dir = data_dir.unwrap_or_else(default_data_dir);
        let config_path = data_dir.join("config.toml");

        let mut settings = if config_path.exists() {
            match fs::read_to_string(&config_path) {
                Ok(raw) => toml::from_str(&raw).unwrap_or_else(|e| {
                    warn!("Ignoring unparseable {}: {}", config_path.display(), e);
                    Settings::default()
                }),
                Err(e) => {
                    warn!("Could not read {}: {}", config_path.display(), e);
                    Settings::default()
                }
            }
        } else {
            Settings::default()
        };

        settings.data_dir = data_dir;

        if let Ok(url) = std::env::var("DATABASE_URL") {
            if !url.is_empty() {
                settings.database_url = Some(url);
            }
        }

        settings
    }

    /// Create settings rooted at a custom data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            ..Default::default()
        }
    }

    /// Get the database URL, constructing from path if not explicitly set.
    pub fn database_url(&self) -> String {
        if let Some(ref url) = self.database_url {
            url.clone()
        } else {
            let path = self.data_dir.join(&self.database_filename);
            format!("sqlite:{}", path.display())
        }
    }

    /// Get the full path to the database file.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_filename)
    }

    /// Check if the database appears to be initialized.
    pub fn database_exists(&self) -> bool {
        if self.database_url.is_some() {
            true
        } else {
            self.database_path().exists()
        }
    }

    /// Full URL of the listings page.
    pub fn jobs_url(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            self.jobs_path
        )
    }

    /// Directory where downloaded rendering engines are cached.
    pub fn engine_cache_dir(&self) -> PathBuf {
        self.data_dir.join(ENGINE_CACHE_SUBDIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.max_jobs, 50);
        assert_eq!(settings.request_timeout, 30);
        assert!(settings.headless);
        assert_eq!(settings.jobs_url(), "https://www.actuarylist.com/jobs");
    }

    #[test]
    fn test_database_url_from_path() {
        let settings = Settings::with_data_dir(PathBuf::from("/tmp/ja"));
        assert_eq!(settings.database_url(), "sqlite:/tmp/ja/jobacquire.db");
    }

    #[test]
    fn test_explicit_database_url_wins() {
        let mut settings = Settings::with_data_dir(PathBuf::from("/tmp/ja"));
        settings.database_url = Some("sqlite:/elsewhere/jobs.db".to_string());
        assert_eq!(settings.database_url(), "sqlite:/elsewhere/jobs.db");
    }

    #[test]
    fn test_load_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            "max_jobs = 8\nbase_url = \"https://example.org\"\n",
        )
        .unwrap();

        let settings = Settings::load(Some(dir.path().to_path_buf()));
        assert_eq!(settings.max_jobs, 8);
        assert_eq!(settings.jobs_url(), "https://example.org/jobs");
        // Untouched fields keep their defaults
        assert_eq!(settings.request_timeout, 30);
    }

    #[test]
    fn test_load_ignores_broken_toml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), "max_jobs = [oops").unwrap();

        let settings = Settings::load(Some(dir.path().to_path_buf()));
        assert_eq!(settings.max_jobs, 50);
    }
}
