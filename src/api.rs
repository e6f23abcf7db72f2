// API client module: a small blocking HTTP client that talks to the card
// backend. Every operation is a single attempt; failures come back as
// `ApiError` and the caller decides what the user sees.

use crate::config::Config;
use crate::error::ApiError;
use crate::models::{Card, CardCreate, CardPrice, ScanResult};
use reqwest::blocking::{multipart, Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// The five operations the front-end needs from the backend. `ApiClient` is
/// the HTTP implementation; tests plug in an in-memory one.
pub trait CardApi {
    fn list_cards(&self) -> Result<Vec<Card>, ApiError>;
    fn get_card(&self, id: i64) -> Result<Card, ApiError>;
    fn create_card(&self, card: &CardCreate) -> Result<Card, ApiError>;
    fn scan_card(&self, image: &Path) -> Result<ScanResult, ApiError>;
    fn get_card_price(&self, id: i64) -> Result<CardPrice, ApiError>;
}

/// Blocking client holding a reqwest client and the backend base URL.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    scan_timeout: Duration,
    max_upload_bytes: u64,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(ApiClient {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            scan_timeout: config.scan_timeout,
            max_upload_bytes: config.max_upload_bytes,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send `request` once and decode a JSON body of type `T`.
    fn execute<T: DeserializeOwned>(&self, request: RequestBuilder, what: &'static str) -> Result<T, ApiError> {
        let res = request.send().map_err(|e| {
            warn!(error = %e, what, "request did not complete");
            ApiError::Transport(e)
        })?;
        let status = res.status();
        let body = res.text()?;
        if !status.is_success() {
            let reason = extract_reason(&body);
            warn!(%status, ?reason, what, "backend rejected request");
            return Err(ApiError::Server { status, reason });
        }
        debug!(%status, what, bytes = body.len(), "backend responded");
        serde_json::from_str(&body).map_err(|source| ApiError::Decode { what, source })
    }
}

impl CardApi for ApiClient {
    fn list_cards(&self) -> Result<Vec<Card>, ApiError> {
        self.execute(self.client.get(self.url("/cards")), "card list")
    }

    fn get_card(&self, id: i64) -> Result<Card, ApiError> {
        self.execute(self.client.get(self.url(&format!("/cards/{id}"))), "card")
    }

    fn create_card(&self, card: &CardCreate) -> Result<Card, ApiError> {
        self.execute(self.client.post(self.url("/cards")).json(card), "created card")
    }

    /// Upload the image as multipart form data under the `file` field.
    fn scan_card(&self, image: &Path) -> Result<ScanResult, ApiError> {
        let upload = prepare_upload(image, self.max_upload_bytes)?;
        debug!(file = %upload.file_name, mime = upload.mime, bytes = upload.bytes.len(), "uploading card image");

        let part = multipart::Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(upload.mime)?;
        let form = multipart::Form::new().part("file", part);
        let request = self
            .client
            .post(self.url("/cards/scan"))
            .multipart(form)
            .timeout(self.scan_timeout);
        self.execute(request, "scan")
    }

    fn get_card_price(&self, id: i64) -> Result<CardPrice, ApiError> {
        self.execute(self.client.get(self.url(&format!("/cards/{id}/price"))), "price")
    }
}

/// An image read into memory and checked against the upload rules.
#[derive(Debug)]
pub struct Upload {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// Validate and load an image before sending it, so obviously bad files
/// never reach the backend.
pub fn prepare_upload(path: &Path, max_bytes: u64) -> Result<Upload, ApiError> {
    let mime = mime_for_path(path).ok_or_else(|| ApiError::InvalidFile("File must be an image".into()))?;
    let io_err = |source| ApiError::Io {
        path: path.to_path_buf(),
        source,
    };
    let len = std::fs::metadata(path).map_err(io_err)?.len();
    if len == 0 {
        return Err(ApiError::InvalidFile("File is empty".into()));
    }
    if len > max_bytes {
        return Err(ApiError::InvalidFile(format!(
            "File exceeds the {} upload limit",
            human_size(max_bytes)
        )));
    }
    let bytes = std::fs::read(path).map_err(io_err)?;
    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("image.jpg")
        .to_string();
    Ok(Upload { file_name, mime, bytes })
}

/// MIME type for common image extensions, `None` for anything else.
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "tif" | "tiff" => "image/tiff",
        _ => return None,
    };
    Some(mime)
}

/// Pull a human-readable reason out of an error body. Understands FastAPI's
/// `{"detail": "..."}`, its validation list `{"detail": [{"msg": ...}]}` and
/// a plain `{"message": "..."}`.
pub fn extract_reason(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let reason = match value.get("detail") {
        Some(serde_json::Value::String(detail)) => detail.clone(),
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
            .collect::<Vec<_>>()
            .join("; "),
        _ => value.get("message")?.as_str()?.to_string(),
    };
    let reason = reason.trim();
    (!reason.is_empty()).then(|| reason.to_string())
}

fn human_size(bytes: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{} MB", bytes / MIB)
    } else {
        format!("{bytes} byte")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_image(name: &str, bytes: &[u8]) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("card-tracker-api-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn reason_from_detail_string() {
        assert_eq!(
            extract_reason(r#"{"detail":"File must be an image"}"#).as_deref(),
            Some("File must be an image")
        );
    }

    #[test]
    fn reason_from_validation_list() {
        let body = r#"{"detail":[{"loc":["body","player_name"],"msg":"field required"},{"msg":"value is not a valid integer"}]}"#;
        assert_eq!(
            extract_reason(body).as_deref(),
            Some("field required; value is not a valid integer")
        );
    }

    #[test]
    fn reason_from_message_field() {
        assert_eq!(extract_reason(r#"{"message":"Invalid image"}"#).as_deref(), Some("Invalid image"));
    }

    #[test]
    fn no_reason_from_html_or_blank() {
        assert_eq!(extract_reason("<html>Bad Gateway</html>"), None);
        assert_eq!(extract_reason(r#"{"detail":"  "}"#), None);
        assert_eq!(extract_reason(""), None);
    }

    #[test]
    fn mime_detection() {
        assert_eq!(mime_for_path(Path::new("front.JPG")), Some("image/jpeg"));
        assert_eq!(mime_for_path(Path::new("back.webp")), Some("image/webp"));
        assert_eq!(mime_for_path(Path::new("notes.txt")), None);
        assert_eq!(mime_for_path(Path::new("no_extension")), None);
    }

    #[test]
    fn upload_rejects_non_images() {
        let path = temp_image("list.txt", b"hello");
        let err = prepare_upload(&path, 1024).unwrap_err();
        assert_eq!(err.reason().as_deref(), Some("File must be an image"));
    }

    #[test]
    fn upload_rejects_empty_and_oversized() {
        let empty = temp_image("empty.png", b"");
        assert_eq!(
            prepare_upload(&empty, 1024).unwrap_err().reason().as_deref(),
            Some("File is empty")
        );

        let big = temp_image("big.png", &[0u8; 64]);
        assert_eq!(
            prepare_upload(&big, 32).unwrap_err().reason().as_deref(),
            Some("File exceeds the 32 byte upload limit")
        );
    }

    #[test]
    fn upload_reports_missing_file() {
        let err = prepare_upload(Path::new("/definitely/not/here.jpg"), 1024).unwrap_err();
        assert!(matches!(err, ApiError::Io { .. }));
    }

    #[test]
    fn upload_reads_image() {
        let path = temp_image("front.jpeg", b"\xff\xd8\xff\xe0jpeg");
        let upload = prepare_upload(&path, 1024).unwrap();
        assert_eq!(upload.file_name, "front.jpeg");
        assert_eq!(upload.mime, "image/jpeg");
        assert_eq!(upload.bytes.len(), 8);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let config = Config {
            api_url: "http://localhost:9000/api/".into(),
            ..Config::default()
        };
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:9000/api");
        assert_eq!(client.url("/cards"), "http://localhost:9000/api/cards");
    }
}
