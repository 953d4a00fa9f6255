use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppResult;
use crate::validation;

/// Comment
///
/// A comment on a post, joined with the author's username and avatar.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub desc: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[sqlx(default)]
    pub author_name: Option<String>,
    #[sqlx(default)]
    pub author_img: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateCommentRequest {
    pub desc: String,
}

impl CreateCommentRequest {
    pub fn validate(&self) -> AppResult<()> {
        validation::required("desc", &self.desc, 2000)
    }
}

/// LikeSummary
///
/// Like count for a post, and whether the caller (if any) liked it.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct LikeSummary {
    pub post_id: Uuid,
    pub likes: i64,
    pub liked: bool,
}

/// FollowSummary
///
/// Follower count for a writer, and whether the caller follows them.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct FollowSummary {
    pub writer_id: Uuid,
    pub followers: i64,
    pub following: bool,
}

/// SharePlatform
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS, ToSchema,
    sqlx::Type,
)]
#[sqlx(type_name = "share_platform", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum SharePlatform {
    Facebook,
    Twitter,
    Whatsapp,
    Telegram,
    Linkedin,
    Email,
    Other,
}

impl SharePlatform {
    pub fn as_str(self) -> &'static str {
        match self {
            SharePlatform::Facebook => "facebook",
            SharePlatform::Twitter => "twitter",
            SharePlatform::Whatsapp => "whatsapp",
            SharePlatform::Telegram => "telegram",
            SharePlatform::Linkedin => "linkedin",
            SharePlatform::Email => "email",
            SharePlatform::Other => "other",
        }
    }
}

/// ShareMethod
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS, ToSchema,
    sqlx::Type,
)]
#[sqlx(type_name = "share_method", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ShareMethod {
    Button,
    CopyLink,
    Native,
}

impl ShareMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            ShareMethod::Button => "button",
            ShareMethod::CopyLink => "copy_link",
            ShareMethod::Native => "native",
        }
    }
}

/// ShareLog
///
/// One recorded share action against a post.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct ShareLog {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Option<Uuid>,
    pub platform: SharePlatform,
    pub method: ShareMethod,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewShareLog {
    pub post_id: Uuid,
    pub user_id: Option<Uuid>,
    pub platform: SharePlatform,
    pub method: ShareMethod,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ShareRequest {
    pub platform: SharePlatform,
    pub method: ShareMethod,
}

/// ShareResponse
///
/// The tracked link the client should hand to the share target.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ShareResponse {
    pub share_url: String,
    pub log: ShareLog,
}

/// ShareStat
///
/// Aggregated share count per (platform, method).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, PartialEq)]
#[ts(export)]
pub struct ShareStat {
    pub platform: SharePlatform,
    pub method: ShareMethod,
    pub count: i64,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, utoipa::IntoParams)]
pub struct ShareStatsQuery {
    pub post_id: Option<Uuid>,
}

/// Builds the tracked URL for a post share.
pub fn share_url(base_url: &str, slug: &str, platform: SharePlatform, method: ShareMethod) -> String {
    format!(
        "{}/posts/{}?utm_source={}&utm_medium={}",
        base_url.trim_end_matches('/'),
        slug,
        platform.as_str(),
        method.as_str()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn share_url_carries_utm_tags() {
        let url = share_url(
            "https://radio.example/",
            "late-night-jazz",
            SharePlatform::Whatsapp,
            ShareMethod::CopyLink,
        );
        assert_eq!(
            url,
            "https://radio.example/posts/late-night-jazz?utm_source=whatsapp&utm_medium=copy_link"
        );
    }

    #[test]
    fn as_str_matches_serde() {
        for platform in [SharePlatform::Facebook, SharePlatform::Linkedin, SharePlatform::Other] {
            let json = serde_json::to_string(&platform).unwrap();
            assert_eq!(json, format!("\"{}\"", platform.as_str()));
        }
        let json = serde_json::to_string(&ShareMethod::CopyLink).unwrap();
        assert_eq!(json, "\"copy_link\"");
    }
}
