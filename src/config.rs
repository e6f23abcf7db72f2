// Runtime configuration read from the environment (and a `.env` file, which
// `main` loads through `dotenv` before calling `Config::from_env`).

use crate::error::ConfigError;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
/// Recognition on the backend is slow, so the scan upload gets its own timeout.
pub const DEFAULT_SCAN_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Which surface resolves the image for a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerKind {
    /// The platform's native file dialog.
    Native,
    /// A typed path in the terminal, for headless sessions.
    Prompt,
}

impl FromStr for PickerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" => Ok(PickerKind::Native),
            "prompt" => Ok(PickerKind::Prompt),
            _ => Err("expected 'native' or 'prompt'".into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub scan_timeout: Duration,
    /// Timeout for every call except the scan upload. `None` waits forever.
    pub request_timeout: Option<Duration>,
    pub max_upload_bytes: u64,
    pub picker: PickerKind,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: DEFAULT_API_URL.into(),
            scan_timeout: DEFAULT_SCAN_TIMEOUT,
            request_timeout: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            picker: PickerKind::Native,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup. Unset or blank
    /// keys fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Config::default();

        let api_url = match get("CARD_TRACKER_API_URL") {
            Some(url) => url.trim().trim_end_matches('/').to_string(),
            None => {
                info!("CARD_TRACKER_API_URL not set, using default: {DEFAULT_API_URL}");
                defaults.api_url
            }
        };
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                key: "CARD_TRACKER_API_URL",
                value: api_url,
                reason: "expected an http:// or https:// URL".into(),
            });
        }

        let scan_timeout = parse::<u64>(get("CARD_TRACKER_SCAN_TIMEOUT_SECS"), "CARD_TRACKER_SCAN_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.scan_timeout);
        let request_timeout =
            parse::<u64>(get("CARD_TRACKER_REQUEST_TIMEOUT_SECS"), "CARD_TRACKER_REQUEST_TIMEOUT_SECS")?
                .map(Duration::from_secs);
        let max_upload_bytes = parse::<u64>(get("CARD_TRACKER_MAX_UPLOAD_BYTES"), "CARD_TRACKER_MAX_UPLOAD_BYTES")?
            .unwrap_or(defaults.max_upload_bytes);
        let picker = parse::<PickerKind>(get("CARD_TRACKER_PICKER"), "CARD_TRACKER_PICKER")?
            .unwrap_or(defaults.picker);

        let config = Config {
            api_url,
            scan_timeout,
            request_timeout,
            max_upload_bytes,
            picker,
        };
        debug!(?config, "configuration loaded");
        Ok(config)
    }
}

fn parse<T>(raw: Option<String>, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.map(|value| {
        value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        })
    })
    .transpose()
}
