/// Application configuration
///
/// Resolved once at startup and passed explicitly to whatever needs it.
/// Sources, lowest precedence first:
/// - built-in defaults
/// - `config.json` in the user's config directory:
///   - Linux: ~/.config/photo-search/config.json
///   - macOS: ~/Library/Application Support/photo-search/config.json
///   - Windows: %APPDATA%\photo-search\config.json
/// - environment variables (`UNSPLASH_ACCESS_KEY`, `PHOTO_SEARCH_API_URL`,
///   `PHOTO_SEARCH_PER_PAGE`)

use reqwest::Url;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::ConfigError;
use crate::state::data::PerPage;

pub const DEFAULT_API_BASE_URL: &str = "https://api.unsplash.com/";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_IMAGE_TIMEOUT_SECS: u64 = 60;

const ENV_ACCESS_KEY: &str = "UNSPLASH_ACCESS_KEY";
const ENV_API_URL: &str = "PHOTO_SEARCH_API_URL";
const ENV_PER_PAGE: &str = "PHOTO_SEARCH_PER_PAGE";

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the photo-search API, always ending in '/'
    pub api_base_url: Url,
    /// Unsplash application access key
    pub access_key: String,
    /// Page size a new search starts with
    pub default_per_page: PerPage,
    /// Timeout for search requests
    pub request_timeout: Duration,
    /// Timeout for thumbnail and full-size image downloads
    pub image_timeout: Duration,
}

/// On-disk config; every field optional
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub api_base_url: Option<String>,
    pub access_key: Option<String>,
    pub default_per_page: Option<PerPage>,
    pub request_timeout_secs: Option<u64>,
    pub image_timeout_secs: Option<u64>,
}

impl ConfigFile {
    /// Read a config file; a missing file is treated as empty
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read { path: path.to_path_buf(), source });
            }
        };

        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl Config {
    /// Get the path where the config file is looked up
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        path.push("photo-search");
        path.push("config.json");
        path
    }

    /// Load from the default config file and the process environment
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        let file = ConfigFile::load(&path)?;
        let config = Self::resolve(file, &path, |name| std::env::var(name).ok())?;

        info!(
            api = %config.api_base_url,
            per_page = config.default_per_page.get(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Merge defaults, file values and environment values
    pub fn resolve(
        file: ConfigFile,
        file_path: &Path,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let env = |name: &str| env(name).filter(|v| !v.trim().is_empty());

        let access_key = env(ENV_ACCESS_KEY)
            .or(file.access_key)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ConfigError::MissingAccessKey(file_path.display().to_string()))?;

        let base = env(ENV_API_URL)
            .or(file.api_base_url)
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let api_base_url = parse_base_url(&base)?;

        let default_per_page = match env(ENV_PER_PAGE) {
            Some(value) => {
                let number: u32 = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                    name: ENV_PER_PAGE,
                    value: value.clone(),
                })?;
                PerPage::try_from(number)?
            }
            None => file.default_per_page.unwrap_or_default(),
        };

        Ok(Self {
            api_base_url,
            access_key,
            default_per_page,
            request_timeout: Duration::from_secs(
                file.request_timeout_secs.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            ),
            image_timeout: Duration::from_secs(
                file.image_timeout_secs.unwrap_or(DEFAULT_IMAGE_TIMEOUT_SECS),
            ),
        })
    }
}

/// Parse an http(s) base URL, adding the trailing '/' that `Url::join` needs
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{}/", trimmed)
    };

    let url = Url::parse(&with_slash).map_err(|_| ConfigError::InvalidBaseUrl(raw.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidBaseUrl(raw.to_string()));
    }
    Ok(url)
}
