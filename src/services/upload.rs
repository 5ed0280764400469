//! Image upload — validate, presign, then PUT the bytes to object storage.
//!
//! The content API hands out a presigned URL for each upload; the bytes go
//! straight to that URL and the public URL it returns is what the page
//! stores. Validation happens before any network call.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ErrorCode;
use crate::services::store::{ContentApi, StoreError};

pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp", "image/svg+xml"];

const PRESIGN_PATH: &str = "/api/upload/presigned";

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("file is empty")]
    Empty,
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("file is {size} bytes; the limit is {max}")]
    TooLarge { size: u64, max: u64 },
    #[error("presign request rejected: {0}")]
    Presign(String),
    #[error("storage upload failed with status {status}")]
    Transfer { status: u16 },
    #[error(transparent)]
    Api(#[from] StoreError),
}

impl ErrorCode for UploadError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Empty => "E_UPLOAD_EMPTY",
            Self::UnsupportedType(_) => "E_UPLOAD_TYPE",
            Self::TooLarge { .. } => "E_UPLOAD_TOO_LARGE",
            Self::Presign(_) => "E_UPLOAD_PRESIGN",
            Self::Transfer { .. } => "E_UPLOAD_TRANSFER",
            Self::Api(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Transfer { status } => *status >= 500,
            Self::Api(e) => e.retryable(),
            _ => false,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PresignRequest<'a> {
    file_name: &'a str,
    content_type: &'a str,
    file_size: u64,
}

#[derive(Debug, Deserialize)]
struct PresignResponse {
    #[serde(default)]
    success: bool,
    data: Option<PresignData>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PresignData {
    upload_url: String,
    key: String,
    public_url: String,
}

/// Where an uploaded image ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    pub url: String,
    pub key: String,
}

/// Check type and size before anything is sent.
///
/// # Errors
///
/// Returns `Empty`, `UnsupportedType` or `TooLarge`.
pub fn validate_upload(content_type: &str, size: u64, max_bytes: u64) -> Result<(), UploadError> {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if !ALLOWED_IMAGE_TYPES.contains(&mime.as_str()) {
        return Err(UploadError::UnsupportedType(content_type.to_owned()));
    }
    if size == 0 {
        return Err(UploadError::Empty);
    }
    if size > max_bytes {
        return Err(UploadError::TooLarge { size, max: max_bytes });
    }
    Ok(())
}

/// Reduce a client-supplied name to its last path segment.
#[must_use]
pub fn sanitize_file_name(raw: &str) -> String {
    let name = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if name.is_empty() || name == "." || name == ".." {
        "image".to_owned()
    } else {
        name.to_owned()
    }
}

/// Validate, presign and transfer one image.
///
/// # Errors
///
/// Returns a validation error, `Presign` when the content API refuses,
/// `Transfer` when storage rejects the bytes, or `Api` for transport errors.
pub async fn upload_image(
    api: &ContentApi,
    file_name: &str,
    content_type: &str,
    bytes: Vec<u8>,
    max_bytes: u64,
) -> Result<UploadedImage, UploadError> {
    let size = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
    validate_upload(content_type, size, max_bytes)?;
    let file_name = sanitize_file_name(file_name);

    let presign: PresignResponse = api
        .post_json(PRESIGN_PATH, &PresignRequest { file_name: &file_name, content_type, file_size: size })
        .await?;
    let data = match presign {
        PresignResponse { success: true, data: Some(data), .. } => data,
        PresignResponse { error, .. } => {
            let message = error.unwrap_or_else(|| "no upload URL returned".to_owned());
            warn!(file_name = %file_name, error = %message, "presign rejected");
            return Err(UploadError::Presign(message));
        }
    };

    let response = api
        .http()
        .put(&data.upload_url)
        .header(reqwest::header::CONTENT_TYPE, content_type)
        .body(bytes)
        .send()
        .await
        .map_err(|e| StoreError::Request(e.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        warn!(file_name = %file_name, status = status.as_u16(), "storage upload failed");
        return Err(UploadError::Transfer { status: status.as_u16() });
    }

    info!(file_name = %file_name, size, key = %data.key, "image uploaded");
    Ok(UploadedImage { url: data.public_url, key: data.key })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: u64 = 10 * 1024 * 1024;

    #[test]
    fn accepts_listed_types() {
        for mime in ALLOWED_IMAGE_TYPES {
            assert!(validate_upload(mime, 100, MAX).is_ok(), "{mime}");
        }
        assert!(validate_upload("IMAGE/PNG; charset=binary", 100, MAX).is_ok());
    }

    #[test]
    fn rejects_other_types() {
        let err = validate_upload("application/pdf", 100, MAX).unwrap_err();
        assert!(matches!(err, UploadError::UnsupportedType(_)));
        assert_eq!(err.error_code(), "E_UPLOAD_TYPE");
    }

    #[test]
    fn rejects_empty_and_oversized() {
        assert!(matches!(validate_upload("image/png", 0, MAX), Err(UploadError::Empty)));
        let err = validate_upload("image/png", MAX + 1, MAX).unwrap_err();
        assert!(matches!(err, UploadError::TooLarge { size, max } if size == MAX + 1 && max == MAX));
    }

    #[test]
    fn sanitize_strips_directories() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\photos\\cat.png"), "cat.png");
        assert_eq!(sanitize_file_name("dir/"), "image");
        assert_eq!(sanitize_file_name(".."), "image");
    }

    #[test]
    fn presign_response_parses() {
        let raw = r#"{"success":true,"data":{"uploadUrl":"https://s3.test/put","key":"k/1.png","publicUrl":"https://cdn.test/k/1.png"}}"#;
        let parsed: PresignResponse = serde_json::from_str(raw).unwrap();
        assert!(parsed.success);
        assert_eq!(parsed.data.unwrap().public_url, "https://cdn.test/k/1.png");

        let raw = r#"{"success":false,"error":"quota exceeded"}"#;
        let parsed: PresignResponse = serde_json::from_str(raw).unwrap();
        assert!(!parsed.success);
        assert_eq!(parsed.error.as_deref(), Some("quota exceeded"));
    }

    #[tokio::test]
    async fn invalid_upload_fails_before_network() {
        let api = ContentApi::new(reqwest::Client::new(), "http://127.0.0.1:1", None);
        let err = upload_image(&api, "a.txt", "text/plain", b"hello".to_vec(), MAX)
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::UnsupportedType(_)));
    }
}
