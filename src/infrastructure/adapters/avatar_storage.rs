//! Local filesystem storage for avatar uploads

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use regex::Regex;
use tracing::info;

use crate::application::ports::{AvatarStorage, AvatarUpload};
use crate::config::app_config::UploadsConfig;
use crate::shared::error::{AppError, AppResult};

const UNSAFE_FILENAME_CHARS: &str = r"[^A-Za-z0-9._-]+";

const AVATAR_DIR: &str = "avatars";

/// Writes avatars under `{root_dir}/avatars` and serves them from
/// `{public_path}/avatars`
pub struct LocalAvatarStorage {
    root_dir: PathBuf,
    public_path: String,
    unsafe_chars: Regex,
}

impl LocalAvatarStorage {
    pub fn new(config: &UploadsConfig) -> AppResult<Self> {
        let unsafe_chars = Regex::new(UNSAFE_FILENAME_CHARS)
            .map_err(|e| AppError::Internal(format!("Invalid filename pattern: {}", e)))?;

        Ok(Self {
            root_dir: PathBuf::from(&config.root_dir),
            public_path: config.public_path.trim_end_matches('/').to_string(),
            unsafe_chars,
        })
    }

    /// Keep only the final path component and replace anything outside
    /// `[A-Za-z0-9._-]` with `_`
    pub fn sanitize_filename(&self, name: &str) -> String {
        let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
        let cleaned = self.unsafe_chars.replace_all(base, "_");
        let cleaned = cleaned.trim_start_matches('.');
        if cleaned.is_empty() {
            "avatar".to_string()
        } else {
            cleaned.to_string()
        }
    }
}

#[async_trait]
impl AvatarStorage for LocalAvatarStorage {
    async fn save(&self, client_id: &str, upload: &AvatarUpload) -> AppResult<String> {
        let directory = self.root_dir.join(AVATAR_DIR);
        tokio::fs::create_dir_all(&directory)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create avatar directory: {}", e)))?;

        let filename = format!(
            "{}-{}-{}",
            self.sanitize_filename(client_id),
            Utc::now().timestamp_millis(),
            self.sanitize_filename(&upload.filename)
        );

        tokio::fs::write(directory.join(&filename), &upload.bytes)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write avatar: {}", e)))?;

        info!(client_id = %client_id, file = %filename, size = upload.bytes.len(), "Avatar stored");

        Ok(format!("{}/{}/{}", self.public_path, AVATAR_DIR, filename))
    }
}
