use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, query_builder::QueryBuilder};
use uuid::Uuid;

use super::Repository;
use crate::error::{AppError, AppResult};
use crate::models::{
    AdminDashboardStats, Banner, BannerPlacement, Category, Comment, CreateBannerRequest,
    CreateCategoryRequest, CreateEpisodeRequest, CreatePodcastRequest, CreateShowRequest, Episode,
    FollowSummary, LikeSummary, NewPost, NewShareLog, NewUser, Page, PageRequest, Podcast, Post,
    PostFilter, PostRanking, PostStatus, ShareLog, ShareStat, Show, UpdateBannerRequest,
    UpdateCategoryRequest, UpdateEpisodeRequest, UpdatePodcastRequest, UpdatePostRequest,
    UpdateProfileRequest, UpdateRolesRequest, UpdateShowRequest, User, UserProfile, WriterProfile,
};

const USER_COLUMNS: &str = "id, username, email, password_hash, img, bio, account_type, \
                            is_general_admin, auth_provider, created_at, updated_at";

const PROFILE_COLUMNS: &str = "u.id, u.username, u.img, u.bio, u.account_type";

// Posts are always read hydrated with the author's username and live counters.
const POST_SELECT: &str = r#"
    SELECT p.id, p.slug, p.title, p."desc", p.img, p.cat, p.author_id,
           u.username AS author_name, p.status, p.approved, p.visits,
           (SELECT COUNT(*) FROM post_likes l WHERE l.post_id = p.id) AS likes,
           (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comments,
           p.created_at, p.updated_at
    FROM posts p
    JOIN users u ON u.id = p.author_id
"#;

const WRITER_SELECT: &str = r#"
    SELECT u.id, u.username, u.img, u.bio,
           (SELECT COUNT(*) FROM follows f WHERE f.writer_id = u.id) AS followers,
           (SELECT COUNT(*) FROM posts p
             WHERE p.author_id = u.id AND p.approved AND p.status = 'published') AS posts
    FROM users u
    WHERE u.account_type = 'writer'
"#;

const COMMENT_SELECT: &str = r#"
    SELECT c.id, c.post_id, c.user_id, c."desc", c.created_at,
           u.username AS author_name, u.img AS author_img
    FROM comments c
    JOIN users u ON u.id = c.user_id
"#;

const CATEGORY_COLUMNS: &str = r#"id, slug, title, "desc", img, created_at"#;

const SHOW_COLUMNS: &str =
    r#"id, slug, title, "desc", img, host, day_of_week, start_time, end_time, created_at"#;

const EPISODE_COLUMNS: &str =
    r#"id, show_id, title, "desc", audio_url, duration_secs, episode_number, published_at"#;

const PODCAST_COLUMNS: &str =
    r#"id, slug, title, "desc", img, audio_url, host, duration_secs, created_at"#;

const BANNER_COLUMNS: &str =
    "id, title, img, link, placement, active, starts_at, ends_at, clicks, created_at";

const SHARE_COLUMNS: &str = "id, post_id, user_id, platform, method, created_at";

/// Maps constraint violations onto domain errors; anything else stays a
/// database error.
fn constraint_error(err: sqlx::Error, conflict: &str) -> AppError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return AppError::conflict(conflict);
        }
        if db.is_foreign_key_violation() {
            return AppError::validation("referenced record does not exist");
        }
        if db.is_check_violation() {
            return AppError::validation(db.message().to_string());
        }
    }
    AppError::Database(err)
}

/// Appends the WHERE clause for a post listing. Expects the `posts` table
/// aliased as `p`.
fn push_post_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &PostFilter) {
    builder.push(" WHERE TRUE");
    if filter.visible_only {
        builder.push(" AND p.approved AND p.status = 'published'");
    }
    if let Some(author_id) = filter.author_id {
        builder.push(" AND p.author_id = ").push_bind(author_id);
    }
    if let Some(cat) = &filter.cat {
        builder.push(" AND p.cat = ").push_bind(cat.clone());
    }
    if let Some(approved) = filter.approved {
        builder.push(" AND p.approved = ").push_bind(approved);
    }
    if let Some(status) = filter.status {
        builder.push(" AND p.status = ").push_bind(status);
    }
    if let Some(search) = &filter.search {
        let pattern = contains_pattern(search.trim());
        builder
            .push(" AND (p.title ILIKE ")
            .push_bind(pattern.clone())
            .push(r#" ESCAPE '\' OR p."desc" ILIKE "#)
            .push_bind(pattern)
            .push(r#" ESCAPE '\')"#);
    }
}

/// `%{text}%` with `\`, `%` and `_` escaped, so the search matches literally.
fn contains_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn push_page(builder: &mut QueryBuilder<'_, Postgres>, page: PageRequest) {
    builder
        .push(" LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
}

/// PostgresRepository
///
/// The production implementation of `Repository`, backed by PostgreSQL. All
/// queries are built at runtime (`query_as` / `QueryBuilder`) with bound
/// parameters.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn count(&self, sql: &str) -> AppResult<i64> {
        Ok(sqlx::query_scalar::<_, i64>(sql)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn slug_taken(&self, table: &str, slug: &str) -> AppResult<bool> {
        let sql = format!("SELECT EXISTS (SELECT 1 FROM {table} WHERE slug = $1)");
        Ok(sqlx::query_scalar::<_, bool>(&sql)
            .bind(slug)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn delete_by_id(&self, table: &str, id: Uuid) -> AppResult<bool> {
        let sql = format!("DELETE FROM {table} WHERE id = $1");
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    // --- Users ---

    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        let sql = format!(
            "INSERT INTO users (id, username, email, password_hash, img, account_type, auth_provider) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.img)
            .bind(user.account_type)
            .bind(user.auth_provider)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| constraint_error(e, "email or username is already registered"))
    }

    async fn get_user(&self, id: Uuid) -> AppResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn username_exists(&self, username: &str) -> AppResult<bool> {
        Ok(
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    /// update_profile
    ///
    /// Partial update through `COALESCE`: a `None` field keeps the stored value.
    async fn update_profile(&self, id: Uuid, req: UpdateProfileRequest) -> AppResult<Option<User>> {
        let sql = format!(
            "UPDATE users SET username = COALESCE($2, username), img = COALESCE($3, img), \
             bio = COALESCE($4, bio), updated_at = NOW() WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(req.username)
            .bind(req.img)
            .bind(req.bio)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| constraint_error(e, "username is already taken"))
    }

    async fn set_user_roles(&self, id: Uuid, req: UpdateRolesRequest) -> AppResult<Option<User>> {
        let sql = format!(
            "UPDATE users SET account_type = COALESCE($2, account_type), \
             is_general_admin = COALESCE($3, is_general_admin), updated_at = NOW() \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(req.account_type)
            .bind(req.is_general_admin)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_user(&self, id: Uuid) -> AppResult<bool> {
        let deleted = self.delete_by_id("users", id).await?;
        if deleted {
            tracing::info!(user_id = %id, "user deleted");
        }
        Ok(deleted)
    }

    async fn list_users(&self, page: PageRequest) -> AppResult<Page<User>> {
        let total = self.count("SELECT COUNT(*) FROM users").await?;
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;
        Ok(Page::new(users, page, total))
    }

    async fn list_writers(&self, page: PageRequest) -> AppResult<Page<WriterProfile>> {
        let total = self
            .count("SELECT COUNT(*) FROM users WHERE account_type = 'writer'")
            .await?;
        let sql = format!("{WRITER_SELECT} ORDER BY u.username LIMIT $1 OFFSET $2");
        let writers = sqlx::query_as::<_, WriterProfile>(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;
        Ok(Page::new(writers, page, total))
    }

    async fn get_writer(&self, id: Uuid) -> AppResult<Option<WriterProfile>> {
        let sql = format!("{WRITER_SELECT} AND u.id = $1");
        Ok(sqlx::query_as::<_, WriterProfile>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    // --- Posts ---

    async fn post_slug_exists(&self, slug: &str) -> AppResult<bool> {
        self.slug_taken("posts", slug).await
    }

    async fn create_post(&self, post: NewPost) -> AppResult<Post> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"INSERT INTO posts (id, slug, title, "desc", img, cat, author_id, status, approved)
               VALUES ($1, $2, $3, $4, $5, $6, $7, 'draft', FALSE) RETURNING id"#,
        )
        .bind(Uuid::new_v4())
        .bind(&post.slug)
        .bind(&post.title)
        .bind(&post.desc)
        .bind(&post.img)
        .bind(&post.cat)
        .bind(post.author_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| constraint_error(e, "slug is already in use"))?;

        self.get_post(id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("post {id} vanished after insert")))
    }

    async fn get_post(&self, id: Uuid) -> AppResult<Option<Post>> {
        let sql = format!("{POST_SELECT} WHERE p.id = $1");
        Ok(sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn get_post_by_slug(&self, slug: &str) -> AppResult<Option<Post>> {
        let sql = format!("{POST_SELECT} WHERE p.slug = $1");
        Ok(sqlx::query_as::<_, Post>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// list_posts
    ///
    /// Shared by the public feed, author listings and the admin queue. The
    /// filter is applied identically to the count and the page query.
    async fn list_posts(&self, filter: PostFilter, page: PageRequest) -> AppResult<Page<Post>> {
        let mut count: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM posts p");
        push_post_filter(&mut count, &filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(POST_SELECT);
        push_post_filter(&mut builder, &filter);
        builder.push(" ORDER BY p.created_at DESC");
        push_page(&mut builder, page);
        let posts = builder
            .build_query_as::<Post>()
            .fetch_all(&self.pool)
            .await?;

        Ok(Page::new(posts, page, total))
    }

    async fn top_posts(&self, ranking: PostRanking, limit: i64) -> AppResult<Vec<Post>> {
        let order = match ranking {
            PostRanking::Likes => "likes DESC",
            PostRanking::Visits => "p.visits DESC",
        };
        let sql = format!(
            "{POST_SELECT} WHERE p.approved AND p.status = 'published' \
             ORDER BY {order}, p.created_at DESC LIMIT $1"
        );
        Ok(sqlx::query_as::<_, Post>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn update_post(
        &self,
        id: Uuid,
        author_id: Uuid,
        req: UpdatePostRequest,
    ) -> AppResult<Option<Post>> {
        let updated = sqlx::query_scalar::<_, Uuid>(
            r#"UPDATE posts
               SET title = COALESCE($3, title),
                   "desc" = COALESCE($4, "desc"),
                   img = COALESCE($5, img),
                   cat = COALESCE($6, cat),
                   updated_at = NOW()
               WHERE id = $1 AND author_id = $2
               RETURNING id"#,
        )
        .bind(id)
        .bind(author_id)
        .bind(req.title)
        .bind(req.desc)
        .bind(req.img)
        .bind(req.cat)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| constraint_error(e, "post update conflicts with an existing post"))?;

        match updated {
            Some(id) => self.get_post(id).await,
            None => Ok(None),
        }
    }

    async fn set_post_moderation(
        &self,
        id: Uuid,
        approved: bool,
        status: PostStatus,
    ) -> AppResult<Option<Post>> {
        let updated = sqlx::query_scalar::<_, Uuid>(
            "UPDATE posts SET approved = $2, status = $3, updated_at = NOW() WHERE id = $1 RETURNING id",
        )
        .bind(id)
        .bind(approved)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(id) => {
                tracing::info!(post_id = %id, approved, ?status, "post moderation updated");
                self.get_post(id).await
            }
            None => Ok(None),
        }
    }

    async fn record_post_visit(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE posts SET visits = visits + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_post(&self, id: Uuid, author_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1 AND author_id = $2")
            .bind(id)
            .bind(author_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_post_admin(&self, id: Uuid) -> AppResult<bool> {
        self.delete_by_id("posts", id).await
    }

    // --- Comments ---

    async fn add_comment(&self, post_id: Uuid, user_id: Uuid, desc: String) -> AppResult<Comment> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"INSERT INTO comments (id, post_id, user_id, "desc") VALUES ($1, $2, $3, $4) RETURNING id"#,
        )
        .bind(Uuid::new_v4())
        .bind(post_id)
        .bind(user_id)
        .bind(desc)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| constraint_error(e, "comment already exists"))?;

        self.get_comment(id)
            .await?
            .ok_or_else(|| AppError::Internal(format!("comment {id} vanished after insert")))
    }

    async fn get_comment(&self, id: Uuid) -> AppResult<Option<Comment>> {
        let sql = format!("{COMMENT_SELECT} WHERE c.id = $1");
        Ok(sqlx::query_as::<_, Comment>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_comments(&self, post_id: Uuid, page: PageRequest) -> AppResult<Page<Comment>> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments WHERE post_id = $1")
            .bind(post_id)
            .fetch_one(&self.pool)
            .await?;
        let sql = format!(
            "{COMMENT_SELECT} WHERE c.post_id = $1 ORDER BY c.created_at ASC LIMIT $2 OFFSET $3"
        );
        let comments = sqlx::query_as::<_, Comment>(&sql)
            .bind(post_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;
        Ok(Page::new(comments, page, total))
    }

    async fn delete_comment(&self, id: Uuid) -> AppResult<bool> {
        self.delete_by_id("comments", id).await
    }

    // --- Likes ---

    /// like_post
    ///
    /// `ON CONFLICT DO NOTHING` keeps the insert idempotent; a zero row count
    /// means the like already existed.
    async fn like_post(&self, post_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO post_likes (post_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(post_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn unlike_post(&self, post_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM post_likes WHERE post_id = $1 AND user_id = $2")
            .bind(post_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn like_summary(&self, post_id: Uuid, viewer: Option<Uuid>) -> AppResult<LikeSummary> {
        let (likes, liked) = sqlx::query_as::<_, (i64, bool)>(
            "SELECT COUNT(*), COALESCE(BOOL_OR(user_id = $2), FALSE) FROM post_likes WHERE post_id = $1",
        )
        .bind(post_id)
        .bind(viewer)
        .fetch_one(&self.pool)
        .await?;
        Ok(LikeSummary {
            post_id,
            likes,
            liked,
        })
    }

    // --- Follows ---

    async fn follow(&self, follower_id: Uuid, writer_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO follows (follower_id, writer_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(follower_id)
        .bind(writer_id)
        .execute(&self.pool)
        .await
        .map_err(|e| constraint_error(e, "already following"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn unfollow(&self, follower_id: Uuid, writer_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND writer_id = $2")
            .bind(follower_id)
            .bind(writer_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn follow_summary(
        &self,
        writer_id: Uuid,
        viewer: Option<Uuid>,
    ) -> AppResult<FollowSummary> {
        let (followers, following) = sqlx::query_as::<_, (i64, bool)>(
            "SELECT COUNT(*), COALESCE(BOOL_OR(follower_id = $2), FALSE) FROM follows WHERE writer_id = $1",
        )
        .bind(writer_id)
        .bind(viewer)
        .fetch_one(&self.pool)
        .await?;
        Ok(FollowSummary {
            writer_id,
            followers,
            following,
        })
    }

    async fn list_followers(
        &self,
        writer_id: Uuid,
        page: PageRequest,
    ) -> AppResult<Page<UserProfile>> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM follows WHERE writer_id = $1")
            .bind(writer_id)
            .fetch_one(&self.pool)
            .await?;
        let sql = format!(
            "SELECT {PROFILE_COLUMNS} FROM follows f JOIN users u ON u.id = f.follower_id \
             WHERE f.writer_id = $1 ORDER BY f.created_at DESC LIMIT $2 OFFSET $3"
        );
        let profiles = sqlx::query_as::<_, UserProfile>(&sql)
            .bind(writer_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;
        Ok(Page::new(profiles, page, total))
    }

    async fn list_following(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> AppResult<Page<UserProfile>> {
        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM follows WHERE follower_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        let sql = format!(
            "SELECT {PROFILE_COLUMNS} FROM follows f JOIN users u ON u.id = f.writer_id \
             WHERE f.follower_id = $1 ORDER BY f.created_at DESC LIMIT $2 OFFSET $3"
        );
        let profiles = sqlx::query_as::<_, UserProfile>(&sql)
            .bind(user_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;
        Ok(Page::new(profiles, page, total))
    }

    // --- Categories ---

    async fn category_slug_exists(&self, slug: &str) -> AppResult<bool> {
        self.slug_taken("categories", slug).await
    }

    async fn create_category(&self, slug: String, req: CreateCategoryRequest) -> AppResult<Category> {
        let sql = format!(
            r#"INSERT INTO categories (id, slug, title, "desc", img) VALUES ($1, $2, $3, $4, $5)
               RETURNING {CATEGORY_COLUMNS}"#
        );
        sqlx::query_as::<_, Category>(&sql)
            .bind(Uuid::new_v4())
            .bind(slug)
            .bind(req.title)
            .bind(req.desc)
            .bind(req.img)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| constraint_error(e, "category slug is already in use"))
    }

    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY title");
        Ok(sqlx::query_as::<_, Category>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_category(&self, id: Uuid) -> AppResult<Option<Category>> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1");
        Ok(sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn get_category_by_slug(&self, slug: &str) -> AppResult<Option<Category>> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE slug = $1");
        Ok(sqlx::query_as::<_, Category>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_category(
        &self,
        id: Uuid,
        req: UpdateCategoryRequest,
    ) -> AppResult<Option<Category>> {
        let sql = format!(
            r#"UPDATE categories SET title = COALESCE($2, title), "desc" = COALESCE($3, "desc"),
               img = COALESCE($4, img) WHERE id = $1 RETURNING {CATEGORY_COLUMNS}"#
        );
        Ok(sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .bind(req.title)
            .bind(req.desc)
            .bind(req.img)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn count_posts_in_category(&self, slug: &str) -> AppResult<i64> {
        Ok(
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts WHERE cat = $1")
                .bind(slug)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    async fn delete_category(&self, id: Uuid) -> AppResult<bool> {
        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map(|r| r.rows_affected() > 0)
            .map_err(|e| match constraint_error(e, "category is in use") {
                AppError::Validation(_) => AppError::conflict("category is in use"),
                other => other,
            })
    }

    // --- Shows & episodes ---

    async fn show_slug_exists(&self, slug: &str) -> AppResult<bool> {
        self.slug_taken("shows", slug).await
    }

    async fn create_show(&self, slug: String, req: CreateShowRequest) -> AppResult<Show> {
        let sql = format!(
            r#"INSERT INTO shows (id, slug, title, "desc", img, host, day_of_week, start_time, end_time)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {SHOW_COLUMNS}"#
        );
        sqlx::query_as::<_, Show>(&sql)
            .bind(Uuid::new_v4())
            .bind(slug)
            .bind(req.title)
            .bind(req.desc)
            .bind(req.img)
            .bind(req.host)
            .bind(req.day_of_week)
            .bind(req.start_time)
            .bind(req.end_time)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| constraint_error(e, "show slug is already in use"))
    }

    async fn list_shows(&self, day: Option<i16>) -> AppResult<Vec<Show>> {
        let sql = format!(
            "SELECT {SHOW_COLUMNS} FROM shows WHERE ($1::smallint IS NULL OR day_of_week = $1) \
             ORDER BY day_of_week, start_time"
        );
        Ok(sqlx::query_as::<_, Show>(&sql)
            .bind(day)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_show(&self, id: Uuid) -> AppResult<Option<Show>> {
        let sql = format!("SELECT {SHOW_COLUMNS} FROM shows WHERE id = $1");
        Ok(sqlx::query_as::<_, Show>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn get_show_by_slug(&self, slug: &str) -> AppResult<Option<Show>> {
        let sql = format!("SELECT {SHOW_COLUMNS} FROM shows WHERE slug = $1");
        Ok(sqlx::query_as::<_, Show>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_show(&self, id: Uuid, req: UpdateShowRequest) -> AppResult<Option<Show>> {
        let sql = format!(
            r#"UPDATE shows SET title = COALESCE($2, title), "desc" = COALESCE($3, "desc"),
               img = COALESCE($4, img), host = COALESCE($5, host),
               day_of_week = COALESCE($6, day_of_week), start_time = COALESCE($7, start_time),
               end_time = COALESCE($8, end_time)
               WHERE id = $1 RETURNING {SHOW_COLUMNS}"#
        );
        sqlx::query_as::<_, Show>(&sql)
            .bind(id)
            .bind(req.title)
            .bind(req.desc)
            .bind(req.img)
            .bind(req.host)
            .bind(req.day_of_week)
            .bind(req.start_time)
            .bind(req.end_time)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| constraint_error(e, "show slug is already in use"))
    }

    async fn delete_show(&self, id: Uuid) -> AppResult<bool> {
        self.delete_by_id("shows", id).await
    }

    async fn create_episode(&self, show_id: Uuid, req: CreateEpisodeRequest) -> AppResult<Episode> {
        let sql = format!(
            r#"INSERT INTO episodes (id, show_id, title, "desc", audio_url, duration_secs, episode_number, published_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, NOW())) RETURNING {EPISODE_COLUMNS}"#
        );
        sqlx::query_as::<_, Episode>(&sql)
            .bind(Uuid::new_v4())
            .bind(show_id)
            .bind(req.title)
            .bind(req.desc)
            .bind(req.audio_url)
            .bind(req.duration_secs)
            .bind(req.episode_number)
            .bind(req.published_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| constraint_error(e, "episode number is already used for this show"))
    }

    async fn list_episodes(&self, show_id: Uuid, page: PageRequest) -> AppResult<Page<Episode>> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM episodes WHERE show_id = $1")
            .bind(show_id)
            .fetch_one(&self.pool)
            .await?;
        let sql = format!(
            "SELECT {EPISODE_COLUMNS} FROM episodes WHERE show_id = $1 \
             ORDER BY published_at DESC, episode_number DESC LIMIT $2 OFFSET $3"
        );
        let episodes = sqlx::query_as::<_, Episode>(&sql)
            .bind(show_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;
        Ok(Page::new(episodes, page, total))
    }

    async fn update_episode(
        &self,
        id: Uuid,
        req: UpdateEpisodeRequest,
    ) -> AppResult<Option<Episode>> {
        let sql = format!(
            r#"UPDATE episodes SET title = COALESCE($2, title), "desc" = COALESCE($3, "desc"),
               audio_url = COALESCE($4, audio_url), duration_secs = COALESCE($5, duration_secs),
               episode_number = COALESCE($6, episode_number), published_at = COALESCE($7, published_at)
               WHERE id = $1 RETURNING {EPISODE_COLUMNS}"#
        );
        sqlx::query_as::<_, Episode>(&sql)
            .bind(id)
            .bind(req.title)
            .bind(req.desc)
            .bind(req.audio_url)
            .bind(req.duration_secs)
            .bind(req.episode_number)
            .bind(req.published_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| constraint_error(e, "episode number is already used for this show"))
    }

    async fn delete_episode(&self, id: Uuid) -> AppResult<bool> {
        self.delete_by_id("episodes", id).await
    }

    // --- Podcasts ---

    async fn podcast_slug_exists(&self, slug: &str) -> AppResult<bool> {
        self.slug_taken("podcasts", slug).await
    }

    async fn create_podcast(&self, slug: String, req: CreatePodcastRequest) -> AppResult<Podcast> {
        let sql = format!(
            r#"INSERT INTO podcasts (id, slug, title, "desc", img, audio_url, host, duration_secs)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {PODCAST_COLUMNS}"#
        );
        sqlx::query_as::<_, Podcast>(&sql)
            .bind(Uuid::new_v4())
            .bind(slug)
            .bind(req.title)
            .bind(req.desc)
            .bind(req.img)
            .bind(req.audio_url)
            .bind(req.host)
            .bind(req.duration_secs)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| constraint_error(e, "podcast slug is already in use"))
    }

    async fn list_podcasts(&self, page: PageRequest) -> AppResult<Page<Podcast>> {
        let total = self.count("SELECT COUNT(*) FROM podcasts").await?;
        let sql = format!(
            "SELECT {PODCAST_COLUMNS} FROM podcasts ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        );
        let podcasts = sqlx::query_as::<_, Podcast>(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;
        Ok(Page::new(podcasts, page, total))
    }

    async fn get_podcast_by_slug(&self, slug: &str) -> AppResult<Option<Podcast>> {
        let sql = format!("SELECT {PODCAST_COLUMNS} FROM podcasts WHERE slug = $1");
        Ok(sqlx::query_as::<_, Podcast>(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_podcast(
        &self,
        id: Uuid,
        req: UpdatePodcastRequest,
    ) -> AppResult<Option<Podcast>> {
        let sql = format!(
            r#"UPDATE podcasts SET title = COALESCE($2, title), "desc" = COALESCE($3, "desc"),
               img = COALESCE($4, img), audio_url = COALESCE($5, audio_url),
               host = COALESCE($6, host), duration_secs = COALESCE($7, duration_secs)
               WHERE id = $1 RETURNING {PODCAST_COLUMNS}"#
        );
        Ok(sqlx::query_as::<_, Podcast>(&sql)
            .bind(id)
            .bind(req.title)
            .bind(req.desc)
            .bind(req.img)
            .bind(req.audio_url)
            .bind(req.host)
            .bind(req.duration_secs)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_podcast(&self, id: Uuid) -> AppResult<bool> {
        self.delete_by_id("podcasts", id).await
    }

    // --- Banners ---

    async fn create_banner(&self, req: CreateBannerRequest) -> AppResult<Banner> {
        let sql = format!(
            "INSERT INTO banners (id, title, img, link, placement, active, starts_at, ends_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {BANNER_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Banner>(&sql)
            .bind(Uuid::new_v4())
            .bind(req.title)
            .bind(req.img)
            .bind(req.link)
            .bind(req.placement)
            .bind(req.active)
            .bind(req.starts_at)
            .bind(req.ends_at)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn list_banners(&self) -> AppResult<Vec<Banner>> {
        let sql = format!("SELECT {BANNER_COLUMNS} FROM banners ORDER BY created_at DESC");
        Ok(sqlx::query_as::<_, Banner>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    /// list_active_banners
    ///
    /// The live window is start-inclusive and end-exclusive, matching `Banner::is_live`.
    async fn list_active_banners(
        &self,
        placement: Option<BannerPlacement>,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Banner>> {
        let sql = format!(
            "SELECT {BANNER_COLUMNS} FROM banners \
             WHERE active \
               AND (starts_at IS NULL OR starts_at <= $1) \
               AND (ends_at IS NULL OR ends_at > $1) \
               AND ($2::banner_placement IS NULL OR placement = $2) \
             ORDER BY created_at DESC"
        );
        Ok(sqlx::query_as::<_, Banner>(&sql)
            .bind(now)
            .bind(placement)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_banner(&self, id: Uuid) -> AppResult<Option<Banner>> {
        let sql = format!("SELECT {BANNER_COLUMNS} FROM banners WHERE id = $1");
        Ok(sqlx::query_as::<_, Banner>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_banner(&self, id: Uuid, req: UpdateBannerRequest) -> AppResult<Option<Banner>> {
        let sql = format!(
            "UPDATE banners SET title = COALESCE($2, title), img = COALESCE($3, img), \
             link = COALESCE($4, link), placement = COALESCE($5, placement), \
             active = COALESCE($6, active), starts_at = COALESCE($7, starts_at), \
             ends_at = COALESCE($8, ends_at) WHERE id = $1 RETURNING {BANNER_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Banner>(&sql)
            .bind(id)
            .bind(req.title)
            .bind(req.img)
            .bind(req.link)
            .bind(req.placement)
            .bind(req.active)
            .bind(req.starts_at)
            .bind(req.ends_at)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn record_banner_click(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<Option<Banner>> {
        let sql = format!(
            "UPDATE banners SET clicks = clicks + 1 \
             WHERE id = $1 AND active \
               AND (starts_at IS NULL OR starts_at <= $2) \
               AND (ends_at IS NULL OR ends_at > $2) \
             RETURNING {BANNER_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Banner>(&sql)
            .bind(id)
            .bind(now)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_banner(&self, id: Uuid) -> AppResult<bool> {
        self.delete_by_id("banners", id).await
    }

    // --- Shares & stats ---

    async fn log_share(&self, share: NewShareLog) -> AppResult<ShareLog> {
        let sql = format!(
            "INSERT INTO share_logs (id, post_id, user_id, platform, method) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {SHARE_COLUMNS}"
        );
        sqlx::query_as::<_, ShareLog>(&sql)
            .bind(Uuid::new_v4())
            .bind(share.post_id)
            .bind(share.user_id)
            .bind(share.platform)
            .bind(share.method)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| constraint_error(e, "share already recorded"))
    }

    async fn share_stats(&self, post_id: Option<Uuid>) -> AppResult<Vec<ShareStat>> {
        Ok(sqlx::query_as::<_, ShareStat>(
            "SELECT platform, method, COUNT(*) AS count FROM share_logs \
             WHERE ($1::uuid IS NULL OR post_id = $1) \
             GROUP BY platform, method \
             ORDER BY count DESC, platform, method",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// get_stats
    ///
    /// Compiles every dashboard counter in a single round trip.
    async fn get_stats(&self) -> AppResult<AdminDashboardStats> {
        Ok(sqlx::query_as::<_, AdminDashboardStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users) AS users,
                (SELECT COUNT(*) FROM users WHERE account_type = 'writer') AS writers,
                (SELECT COUNT(*) FROM posts) AS posts,
                (SELECT COUNT(*) FROM posts WHERE NOT approved) AS pending_posts,
                (SELECT COUNT(*) FROM posts WHERE approved AND status = 'published') AS published_posts,
                (SELECT COUNT(*) FROM comments) AS comments,
                (SELECT COUNT(*) FROM post_likes) AS likes,
                (SELECT COUNT(*) FROM follows) AS follows,
                (SELECT COUNT(*) FROM share_logs) AS shares
            "#,
        )
        .fetch_one(&self.pool)
        .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("jazz"), "%jazz%");
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
        assert_eq!(contains_pattern(r"c:\dj"), r"%c:\\dj%");
    }
}
