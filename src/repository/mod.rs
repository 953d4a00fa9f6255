use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{
    AdminDashboardStats, Banner, BannerPlacement, Category, Comment, CreateBannerRequest,
    CreateCategoryRequest, CreateEpisodeRequest, CreatePodcastRequest, CreateShowRequest, Episode,
    FollowSummary, LikeSummary, NewPost, NewShareLog, NewUser, Page, PageRequest, Podcast, Post,
    PostFilter, PostRanking, PostStatus, ShareLog, ShareStat, Show, UpdateBannerRequest,
    UpdateCategoryRequest, UpdateEpisodeRequest, UpdatePodcastRequest, UpdatePostRequest,
    UpdateProfileRequest, UpdateRolesRequest, UpdateShowRequest, User, UserProfile, WriterProfile,
};

mod memory;
mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PostgresRepository;

/// Repository
///
/// The contract for every persistence operation. Handlers only ever see
/// `Arc<dyn Repository>`, so the Postgres store and the in-memory store used by
/// the test suite are interchangeable.
///
/// Conventions:
/// - lookups return `Ok(None)` when the row does not exist;
/// - deletes return `Ok(false)` when nothing matched;
/// - uniqueness violations surface as `AppError::Conflict`.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn create_user(&self, user: NewUser) -> AppResult<User>;
    async fn get_user(&self, id: Uuid) -> AppResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn username_exists(&self, username: &str) -> AppResult<bool>;
    async fn update_profile(&self, id: Uuid, req: UpdateProfileRequest) -> AppResult<Option<User>>;
    async fn set_user_roles(&self, id: Uuid, req: UpdateRolesRequest) -> AppResult<Option<User>>;
    /// Removes the account together with its posts, comments, likes and follows.
    async fn delete_user(&self, id: Uuid) -> AppResult<bool>;
    async fn list_users(&self, page: PageRequest) -> AppResult<Page<User>>;
    async fn list_writers(&self, page: PageRequest) -> AppResult<Page<WriterProfile>>;
    /// `None` when the user does not exist or is not a writer.
    async fn get_writer(&self, id: Uuid) -> AppResult<Option<WriterProfile>>;

    // --- Posts ---
    async fn post_slug_exists(&self, slug: &str) -> AppResult<bool>;
    async fn create_post(&self, post: NewPost) -> AppResult<Post>;
    async fn get_post(&self, id: Uuid) -> AppResult<Option<Post>>;
    async fn get_post_by_slug(&self, slug: &str) -> AppResult<Option<Post>>;
    /// Newest first.
    async fn list_posts(&self, filter: PostFilter, page: PageRequest) -> AppResult<Page<Post>>;
    /// Visible posts only.
    async fn top_posts(&self, ranking: PostRanking, limit: i64) -> AppResult<Vec<Post>>;
    /// Owner-only: matches on both `id` and `author_id`.
    async fn update_post(
        &self,
        id: Uuid,
        author_id: Uuid,
        req: UpdatePostRequest,
    ) -> AppResult<Option<Post>>;
    async fn set_post_moderation(
        &self,
        id: Uuid,
        approved: bool,
        status: PostStatus,
    ) -> AppResult<Option<Post>>;
    async fn record_post_visit(&self, id: Uuid) -> AppResult<()>;
    /// Owner-only delete.
    async fn delete_post(&self, id: Uuid, author_id: Uuid) -> AppResult<bool>;
    async fn delete_post_admin(&self, id: Uuid) -> AppResult<bool>;

    // --- Comments ---
    async fn add_comment(&self, post_id: Uuid, user_id: Uuid, desc: String) -> AppResult<Comment>;
    async fn get_comment(&self, id: Uuid) -> AppResult<Option<Comment>>;
    /// Oldest first.
    async fn list_comments(&self, post_id: Uuid, page: PageRequest) -> AppResult<Page<Comment>>;
    async fn delete_comment(&self, id: Uuid) -> AppResult<bool>;

    // --- Likes ---
    /// `false` when the like already existed.
    async fn like_post(&self, post_id: Uuid, user_id: Uuid) -> AppResult<bool>;
    async fn unlike_post(&self, post_id: Uuid, user_id: Uuid) -> AppResult<bool>;
    async fn like_summary(&self, post_id: Uuid, viewer: Option<Uuid>) -> AppResult<LikeSummary>;

    // --- Follows ---
    /// `false` when already following.
    async fn follow(&self, follower_id: Uuid, writer_id: Uuid) -> AppResult<bool>;
    async fn unfollow(&self, follower_id: Uuid, writer_id: Uuid) -> AppResult<bool>;
    async fn follow_summary(&self, writer_id: Uuid, viewer: Option<Uuid>)
    -> AppResult<FollowSummary>;
    async fn list_followers(&self, writer_id: Uuid, page: PageRequest)
    -> AppResult<Page<UserProfile>>;
    async fn list_following(&self, user_id: Uuid, page: PageRequest)
    -> AppResult<Page<UserProfile>>;

    // --- Categories ---
    async fn category_slug_exists(&self, slug: &str) -> AppResult<bool>;
    async fn create_category(&self, slug: String, req: CreateCategoryRequest) -> AppResult<Category>;
    /// Ordered by title.
    async fn list_categories(&self) -> AppResult<Vec<Category>>;
    async fn get_category(&self, id: Uuid) -> AppResult<Option<Category>>;
    async fn get_category_by_slug(&self, slug: &str) -> AppResult<Option<Category>>;
    async fn update_category(
        &self,
        id: Uuid,
        req: UpdateCategoryRequest,
    ) -> AppResult<Option<Category>>;
    async fn count_posts_in_category(&self, slug: &str) -> AppResult<i64>;
    async fn delete_category(&self, id: Uuid) -> AppResult<bool>;

    // --- Shows & episodes ---
    async fn show_slug_exists(&self, slug: &str) -> AppResult<bool>;
    async fn create_show(&self, slug: String, req: CreateShowRequest) -> AppResult<Show>;
    /// Schedule order: day of week, then start time.
    async fn list_shows(&self, day: Option<i16>) -> AppResult<Vec<Show>>;
    async fn get_show(&self, id: Uuid) -> AppResult<Option<Show>>;
    async fn get_show_by_slug(&self, slug: &str) -> AppResult<Option<Show>>;
    async fn update_show(&self, id: Uuid, req: UpdateShowRequest) -> AppResult<Option<Show>>;
    /// Cascades to the show's episodes.
    async fn delete_show(&self, id: Uuid) -> AppResult<bool>;
    async fn create_episode(&self, show_id: Uuid, req: CreateEpisodeRequest) -> AppResult<Episode>;
    /// Newest first.
    async fn list_episodes(&self, show_id: Uuid, page: PageRequest) -> AppResult<Page<Episode>>;
    async fn update_episode(
        &self,
        id: Uuid,
        req: UpdateEpisodeRequest,
    ) -> AppResult<Option<Episode>>;
    async fn delete_episode(&self, id: Uuid) -> AppResult<bool>;

    // --- Podcasts ---
    async fn podcast_slug_exists(&self, slug: &str) -> AppResult<bool>;
    async fn create_podcast(&self, slug: String, req: CreatePodcastRequest) -> AppResult<Podcast>;
    /// Newest first.
    async fn list_podcasts(&self, page: PageRequest) -> AppResult<Page<Podcast>>;
    async fn get_podcast_by_slug(&self, slug: &str) -> AppResult<Option<Podcast>>;
    async fn update_podcast(
        &self,
        id: Uuid,
        req: UpdatePodcastRequest,
    ) -> AppResult<Option<Podcast>>;
    async fn delete_podcast(&self, id: Uuid) -> AppResult<bool>;

    // --- Banners ---
    async fn create_banner(&self, req: CreateBannerRequest) -> AppResult<Banner>;
    /// Every banner, newest first.
    async fn list_banners(&self) -> AppResult<Vec<Banner>>;
    /// Banners live at `now`, optionally restricted to one placement.
    async fn list_active_banners(
        &self,
        placement: Option<BannerPlacement>,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Banner>>;
    async fn get_banner(&self, id: Uuid) -> AppResult<Option<Banner>>;
    async fn update_banner(&self, id: Uuid, req: UpdateBannerRequest) -> AppResult<Option<Banner>>;
    /// Increments the click counter if the banner is live at `now`.
    async fn record_banner_click(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<Option<Banner>>;
    async fn delete_banner(&self, id: Uuid) -> AppResult<bool>;

    // --- Shares & stats ---
    async fn log_share(&self, share: NewShareLog) -> AppResult<ShareLog>;
    /// Counts per (platform, method), largest first.
    async fn share_stats(&self, post_id: Option<Uuid>) -> AppResult<Vec<ShareStat>>;
    async fn get_stats(&self) -> AppResult<AdminDashboardStats>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;
