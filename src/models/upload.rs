use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// UploadKind
///
/// What an upload is for. The kind decides the object key prefix and which
/// MIME types are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum UploadKind {
    #[default]
    PostImage,
    Avatar,
    ShowArt,
    EpisodeAudio,
    PodcastAudio,
    BannerImage,
}

impl UploadKind {
    pub fn prefix(self) -> &'static str {
        match self {
            UploadKind::PostImage => "posts",
            UploadKind::Avatar => "avatars",
            UploadKind::ShowArt => "shows",
            UploadKind::EpisodeAudio => "episodes",
            UploadKind::PodcastAudio => "podcasts",
            UploadKind::BannerImage => "banners",
        }
    }

    pub fn accepts(self, mime: &str) -> bool {
        let mime = mime.trim().to_ascii_lowercase();
        match self {
            UploadKind::EpisodeAudio | UploadKind::PodcastAudio => mime.starts_with("audio/"),
            _ => mime.starts_with("image/"),
        }
    }
}

/// PresignedUrlRequest
///
/// Input payload for requesting a short-lived upload URL (POST /upload/presigned).
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, TS, Default)]
#[ts(export)]
pub struct PresignedUrlRequest {
    /// The original filename, used to derive the file extension.
    #[schema(example = "cover.png")]
    pub filename: String,
    /// The MIME type the upload will be constrained to.
    #[schema(example = "image/png")]
    pub file_type: String,
    #[serde(default)]
    pub kind: UploadKind,
}

impl PresignedUrlRequest {
    pub fn validate(&self) -> AppResult<()> {
        if self.filename.trim().is_empty() {
            return Err(AppError::validation("filename is required"));
        }
        if !self.kind.accepts(&self.file_type) {
            return Err(AppError::validation(format!(
                "{} is not allowed for {} uploads",
                self.file_type,
                self.kind.prefix()
            )));
        }
        Ok(())
    }

    /// `{prefix}/{id}.{ext}`, falling back to `bin` when the filename has no extension.
    pub fn object_key(&self, id: uuid::Uuid) -> String {
        let ext = std::path::Path::new(&self.filename)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_else(|| "bin".to_string());
        format!("{}/{}.{}", self.kind.prefix(), id, ext)
    }
}

/// PresignedUrlResponse
///
/// The time-limited URL for the PUT request and the key to store on the resource.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS, Default)]
#[ts(export)]
pub struct PresignedUrlResponse {
    pub upload_url: String,
    pub resource_key: String,
}
