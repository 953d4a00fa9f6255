use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::PageRequest;
use crate::moderation::{ModerationAction, ModerationState};
use crate::validation;

/// PostStatus
///
/// Publication flag of a post. Only meaningful together with `approved`; see
/// `crate::moderation`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema, sqlx::Type,
)]
#[sqlx(type_name = "post_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
}

/// Post
///
/// An article authored by a writer. Counters (`likes`, `comments`) and
/// `author_name` are computed on read, not stored on the row.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Post {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub desc: String,
    pub img: Option<String>,
    // Slug of the category the post is filed under.
    pub cat: String,
    pub author_id: Uuid,
    #[sqlx(default)]
    pub author_name: Option<String>,
    pub status: PostStatus,
    pub approved: bool,
    pub visits: i64,
    #[sqlx(default)]
    pub likes: i64,
    #[sqlx(default)]
    pub comments: i64,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn moderation_state(&self) -> ModerationState {
        ModerationState::from_fields(self.approved, self.status)
    }

    /// Publicly visible: approved and published.
    pub fn is_visible(&self) -> bool {
        self.moderation_state().is_public()
    }
}

/// NewPost
///
/// Insertion payload for `Repository::create_post`. New posts always start pending.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub author_id: Uuid,
    pub slug: String,
    pub title: String,
    pub desc: String,
    pub img: Option<String>,
    pub cat: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreatePostRequest {
    pub title: String,
    pub desc: String,
    #[serde(default)]
    pub img: Option<String>,
    pub cat: String,
}

impl CreatePostRequest {
    pub fn validate(&self) -> AppResult<()> {
        validation::required("title", &self.title, 200)?;
        validation::required("desc", &self.desc, 100_000)?;
        validation::required("cat", &self.cat, 100)
    }
}

/// UpdatePostRequest
///
/// Partial update; omitted fields keep their current value.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdatePostRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cat: Option<String>,
}

impl UpdatePostRequest {
    pub fn validate(&self) -> AppResult<()> {
        if let Some(title) = &self.title {
            validation::required("title", title, 200)?;
        }
        if let Some(desc) = &self.desc {
            validation::required("desc", desc, 100_000)?;
        }
        Ok(())
    }
}

/// PostStatusRequest
///
/// Author-side publish/unpublish.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct PostStatusRequest {
    pub status: PostStatus,
}

/// ModerationRequest
///
/// Admin-side moderation move.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ModerationRequest {
    pub action: ModerationAction,
}

/// PostFilter
///
/// Repository-level filter shared by the public, author and admin listings.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    // Restrict to approved + published posts.
    pub visible_only: bool,
    pub author_id: Option<Uuid>,
    pub cat: Option<String>,
    pub search: Option<String>,
    pub approved: Option<bool>,
    pub status: Option<PostStatus>,
}

/// PostRanking
///
/// Ordering used by the featured (likes) and popular (visits) listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostRanking {
    Likes,
    Visits,
}

/// PostListQuery
///
/// Query parameters of `GET /posts`.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
pub struct PostListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Category slug.
    pub cat: Option<String>,
    /// Author id.
    pub author: Option<Uuid>,
    /// Case-insensitive match on title and body.
    pub search: Option<String>,
}

impl PostListQuery {
    pub fn page(&self) -> AppResult<PageRequest> {
        PageRequest::from_query(self.page, self.limit)
    }

    pub fn filter(&self) -> PostFilter {
        PostFilter {
            visible_only: true,
            author_id: self.author,
            cat: self.cat.clone().filter(|c| !c.is_empty()),
            search: self.search.clone().filter(|s| !s.trim().is_empty()),
            ..PostFilter::default()
        }
    }
}

/// AdminPostQuery
///
/// Query parameters of `GET /admin/posts`.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
pub struct AdminPostQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub approved: Option<bool>,
    pub status: Option<PostStatus>,
    pub search: Option<String>,
}

impl AdminPostQuery {
    pub fn page(&self) -> AppResult<PageRequest> {
        PageRequest::from_query(self.page, self.limit)
    }

    pub fn filter(&self) -> PostFilter {
        PostFilter {
            approved: self.approved,
            status: self.status,
            search: self.search.clone().filter(|s| !s.trim().is_empty()),
            ..PostFilter::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, utoipa::IntoParams)]
pub struct TopPostsQuery {
    pub limit: Option<i64>,
}

/// PostKey
///
/// `GET /posts/{id}` accepts either the UUID or the slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostKey {
    Id(Uuid),
    Slug(String),
}

impl PostKey {
    pub fn parse(raw: &str) -> Self {
        match Uuid::parse_str(raw) {
            Ok(id) => PostKey::Id(id),
            Err(_) => PostKey::Slug(raw.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visibility_needs_approval_and_publication() {
        let mut post = Post::default();
        assert!(!post.is_visible());
        post.status = PostStatus::Published;
        assert!(!post.is_visible());
        post.approved = true;
        assert!(post.is_visible());
    }

    #[test]
    fn post_key_prefers_uuid() {
        let id = Uuid::new_v4();
        assert_eq!(PostKey::parse(&id.to_string()), PostKey::Id(id));
        assert_eq!(
            PostKey::parse("breakfast-news"),
            PostKey::Slug("breakfast-news".to_string())
        );
    }

    #[test]
    fn public_filter_is_visible_only() {
        let query = PostListQuery {
            search: Some("  ".into()),
            cat: Some("music".into()),
            ..PostListQuery::default()
        };
        let filter = query.filter();
        assert!(filter.visible_only);
        assert_eq!(filter.search, None);
        assert_eq!(filter.cat.as_deref(), Some("music"));
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&PostStatus::Published).unwrap();
        assert_eq!(json, r#""published""#);
    }
}
