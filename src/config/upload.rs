use super::env_parse;
use std::env;

/// Most photos a single report may carry.
pub const MAX_PHOTOS: usize = 5;

const FORM_OVERHEAD_BYTES: usize = 256 * 1024;

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub upload_dir: String,
    pub max_photo_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            upload_dir: "./uploads".to_string(),
            max_photo_bytes: 5 * 1024 * 1024, // 5 MB
        }
    }
}

impl UploadConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            upload_dir: env::var("UPLOAD_DIR").unwrap_or(defaults.upload_dir),
            max_photo_bytes: env_parse("MAX_PHOTO_BYTES", defaults.max_photo_bytes),
        }
    }

    /// Body limit for a report submission: every photo at full size plus room
    /// for the text fields and multipart framing. A per-photo limit too large
    /// to multiply out falls back to the default limit.
    pub fn max_submission_bytes(&self) -> usize {
        submission_bytes(self.max_photo_bytes)
            .or_else(|| submission_bytes(Self::default().max_photo_bytes))
            .unwrap_or(usize::MAX)
    }
}

fn submission_bytes(max_photo_bytes: usize) -> Option<usize> {
    max_photo_bytes
        .checked_mul(MAX_PHOTOS)?
        .checked_add(FORM_OVERHEAD_BYTES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submission_limit_covers_every_photo() {
        let cfg = UploadConfig::default();
        assert_eq!(
            cfg.max_submission_bytes(),
            cfg.max_photo_bytes * MAX_PHOTOS + FORM_OVERHEAD_BYTES
        );
    }

    #[test]
    fn oversized_photo_limit_falls_back_to_default() {
        let cfg = UploadConfig {
            max_photo_bytes: usize::MAX / 2,
            ..Default::default()
        };
        assert_eq!(
            cfg.max_submission_bytes(),
            UploadConfig::default().max_submission_bytes()
        );
    }
}
