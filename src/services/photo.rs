use crate::config::upload::MAX_PHOTOS;
use crate::error::{AppError, AppResult};
use crate::repository::Storage;
use std::path::Path;
use uuid::Uuid;

const ALLOWED_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];
const MAX_STEM_LEN: usize = 40;

/// One file part of a report submission, as received.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub original_name: String,
    /// Declared content type, if the client sent one.
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Validate file magic bytes match the declared content type.
fn validate_magic_bytes(data: &[u8], content_type: &str) -> bool {
    match content_type {
        "image/jpeg" => data.len() >= 3 && data[..3] == [0xFF, 0xD8, 0xFF],
        "image/png" => data.len() >= 4 && data[..4] == [0x89, 0x50, 0x4E, 0x47],
        "image/gif" => data.len() >= 4 && data[..4] == [0x47, 0x49, 0x46, 0x38],
        "image/webp" => {
            data.len() >= 12
                && data[..4] == [0x52, 0x49, 0x46, 0x46]
                && data[8..12] == [0x57, 0x45, 0x42, 0x50]
        }
        _ => false,
    }
}

fn sniff_content_type(data: &[u8]) -> Option<&'static str> {
    ALLOWED_CONTENT_TYPES
        .iter()
        .copied()
        .find(|ct| validate_magic_bytes(data, ct))
}

fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

pub fn content_type_for_name(name: &str) -> Option<&'static str> {
    let ext = Path::new(name).extension()?.to_str()?;
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Check one upload and return the extension it will be stored under.
///
/// `index` is the zero-based position in the submission and only feeds the
/// error messages.
pub fn inspect_photo(upload: &PhotoUpload, index: usize, max_bytes: usize) -> AppResult<&'static str> {
    if upload.data.is_empty() {
        return Err(AppError::Validation(format!("photos[{}] is empty", index)));
    }
    if upload.data.len() > max_bytes {
        return Err(AppError::PayloadTooLarge);
    }

    let content_type = match upload.content_type.as_deref() {
        None | Some("application/octet-stream") => sniff_content_type(&upload.data)
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "photos[{}] is not a supported image. Allowed: jpeg, png, gif, webp",
                    index
                ))
            })?,
        Some(declared) => {
            if !ALLOWED_CONTENT_TYPES.contains(&declared) {
                return Err(AppError::Validation(format!(
                    "photos[{}] has unsupported file type: {}. Allowed: jpeg, png, gif, webp",
                    index, declared
                )));
            }
            if !validate_magic_bytes(&upload.data, declared) {
                return Err(AppError::Validation(format!(
                    "photos[{}] content does not match declared content type",
                    index
                )));
            }
            declared
        }
    };

    extension_for(content_type)
        .ok_or_else(|| AppError::Validation("Unsupported file type".to_string()))
}

/// Client-supplied names never reach the filesystem as-is: only the stem
/// survives, reduced to `[A-Za-z0-9_-]`.
fn sanitize_stem(original_name: &str) -> String {
    // Some browsers send the full client-side path.
    let base = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_name);
    let stem = Path::new(base)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("");

    let cleaned: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(MAX_STEM_LEN)
        .collect();

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        "photo".to_string()
    } else {
        trimmed.to_string()
    }
}

/// `<unix-millis>-<8 hex>-<stem>.<ext>`. The random segment keeps two
/// uploads of the same file in the same millisecond apart.
pub fn stored_photo_name(now_millis: i64, original_name: &str, ext: &str) -> String {
    let nonce = Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}-{}.{}",
        now_millis,
        &nonce[..8],
        sanitize_stem(original_name),
        ext
    )
}

/// Whether `name` could have been produced by [`stored_photo_name`].
pub fn is_stored_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 128
        && !name.starts_with('.')
        && !name.contains("..")
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && content_type_for_name(name).is_some()
}

pub fn check_photo_count(count: usize) -> AppResult<()> {
    if count > MAX_PHOTOS {
        return Err(AppError::Validation(format!(
            "At most {} photos may be attached, got {}",
            MAX_PHOTOS, count
        )));
    }
    Ok(())
}

/// Serve stored photos by name.
pub struct PhotoService {
    storage: Storage,
}

impl PhotoService {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Returns the content type and bytes of a stored photo.
    pub async fn fetch(&self, name: &str) -> AppResult<(&'static str, Vec<u8>)> {
        if !is_stored_name(name) {
            return Err(AppError::NotFound);
        }
        let content_type = content_type_for_name(name).ok_or(AppError::NotFound)?;
        let data = self
            .storage
            .photos
            .get(name)
            .await?
            .ok_or(AppError::NotFound)?;
        Ok((content_type, data))
    }
}
