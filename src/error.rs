// Error types shared by the library modules. The binary and the UI layer
// wrap these in `anyhow`, the library keeps them typed so the scan workflow
// can decide which failures carry a reason worth showing to the user.

use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Failures of a single call against the card backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-success status. `reason` holds the
    /// human-readable detail from the body when one could be extracted.
    #[error("server returned {status}{}", .reason.as_ref().map(|r| format!(": {r}")).unwrap_or_default())]
    Server {
        status: StatusCode,
        reason: Option<String>,
    },

    /// Connection refused, DNS failure, timeout and the like.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The body arrived but did not match the expected shape.
    #[error("could not decode {what} response: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The image was rejected before anything was sent.
    #[error("{0}")]
    InvalidFile(String),

    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    /// Reason suitable for the UI, if this failure carries one. Transport
    /// and decoding failures return `None` so callers fall back to their
    /// own generic wording.
    pub fn reason(&self) -> Option<String> {
        match self {
            ApiError::Server { reason, .. } => reason.clone(),
            ApiError::InvalidFile(reason) => Some(reason.clone()),
            ApiError::Io { path, .. } => Some(format!("Could not read {}", path.display())),
            ApiError::Transport(_) | ApiError::Decode { .. } => None,
        }
    }
}

/// Invalid configuration values found at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} has invalid value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_exposes_reason() {
        let err = ApiError::Server {
            status: StatusCode::NOT_FOUND,
            reason: Some("Card not found".into()),
        };
        assert_eq!(err.reason().as_deref(), Some("Card not found"));
        assert_eq!(err.to_string(), "server returned 404 Not Found: Card not found");
    }

    #[test]
    fn server_error_without_reason() {
        let err = ApiError::Server {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            reason: None,
        };
        assert_eq!(err.reason(), None);
        assert_eq!(err.to_string(), "server returned 500 Internal Server Error");
    }

    #[test]
    fn decode_error_has_no_reason() {
        let source = serde_json::from_str::<u32>("nope").unwrap_err();
        let err = ApiError::Decode { what: "card", source };
        assert!(err.reason().is_none());
        assert!(err.to_string().starts_with("could not decode card response"));
    }

    #[test]
    fn config_error_names_key() {
        let err = ConfigError::Invalid {
            key: "CARD_TRACKER_PICKER",
            value: "mouse".into(),
            reason: "expected 'native' or 'prompt'".into(),
        };
        assert_eq!(
            err.to_string(),
            "CARD_TRACKER_PICKER has invalid value 'mouse': expected 'native' or 'prompt'"
        );
    }
}
