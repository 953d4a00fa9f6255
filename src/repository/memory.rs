use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::Repository;
use crate::error::{AppError, AppResult};
use crate::models::{
    AccountType, AdminDashboardStats, Banner, BannerPlacement, Category, Comment,
    CreateBannerRequest, CreateCategoryRequest, CreateEpisodeRequest, CreatePodcastRequest,
    CreateShowRequest, Episode, FollowSummary, LikeSummary, NewPost, NewShareLog, NewUser, Page,
    PageRequest, Podcast, Post, PostFilter, PostRanking, PostStatus, ShareLog, ShareStat, Show,
    UpdateBannerRequest, UpdateCategoryRequest, UpdateEpisodeRequest, UpdatePodcastRequest,
    UpdatePostRequest, UpdateProfileRequest, UpdateRolesRequest, UpdateShowRequest, User,
    UserProfile, WriterProfile,
};

struct Like {
    post_id: Uuid,
    user_id: Uuid,
}

struct Follow {
    follower_id: Uuid,
    writer_id: Uuid,
}

/// Vectors are kept in insertion order; listings sort on read.
#[derive(Default)]
struct Store {
    users: Vec<User>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    likes: Vec<Like>,
    follows: Vec<Follow>,
    categories: Vec<Category>,
    shows: Vec<Show>,
    episodes: Vec<Episode>,
    podcasts: Vec<Podcast>,
    banners: Vec<Banner>,
    shares: Vec<ShareLog>,
}

impl Store {
    fn user(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Fills in the computed columns the SQL store joins in.
    fn hydrate_post(&self, post: &Post) -> Post {
        let mut post = post.clone();
        post.author_name = self.user(post.author_id).map(|u| u.username.clone());
        post.likes = self.likes.iter().filter(|l| l.post_id == post.id).count() as i64;
        post.comments = self.comments.iter().filter(|c| c.post_id == post.id).count() as i64;
        post
    }

    fn hydrate_comment(&self, comment: &Comment) -> Comment {
        let mut comment = comment.clone();
        if let Some(author) = self.user(comment.user_id) {
            comment.author_name = Some(author.username.clone());
            comment.author_img = author.img.clone();
        }
        comment
    }

    fn writer_profile(&self, user: &User) -> WriterProfile {
        WriterProfile {
            id: user.id,
            username: user.username.clone(),
            img: user.img.clone(),
            bio: user.bio.clone(),
            followers: self
                .follows
                .iter()
                .filter(|f| f.writer_id == user.id)
                .count() as i64,
            posts: self
                .posts
                .iter()
                .filter(|p| p.author_id == user.id && p.is_visible())
                .count() as i64,
        }
    }

    /// Newest first. Ties keep reverse insertion order.
    fn posts_newest_first(&self) -> Vec<&Post> {
        let mut posts: Vec<&Post> = self.posts.iter().rev().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts
    }

    fn remove_post_cascade(&mut self, id: Uuid) {
        self.posts.retain(|p| p.id != id);
        self.comments.retain(|c| c.post_id != id);
        self.likes.retain(|l| l.post_id != id);
        self.shares.retain(|s| s.post_id != id);
    }
}

fn matches_filter(post: &Post, filter: &PostFilter) -> bool {
    if filter.visible_only && !post.is_visible() {
        return false;
    }
    if filter.author_id.is_some_and(|a| a != post.author_id) {
        return false;
    }
    if filter.cat.as_ref().is_some_and(|c| c != &post.cat) {
        return false;
    }
    if filter.approved.is_some_and(|a| a != post.approved) {
        return false;
    }
    if filter.status.is_some_and(|s| s != post.status) {
        return false;
    }
    if let Some(search) = &filter.search {
        let needle = search.trim().to_lowercase();
        if !post.title.to_lowercase().contains(&needle)
            && !post.desc.to_lowercase().contains(&needle)
        {
            return false;
        }
    }
    true
}

fn page_of<T: Clone>(items: &[T], page: PageRequest) -> Page<T> {
    Page::new(page.slice(items), page, items.len() as i64)
}

/// MemoryRepository
///
/// An in-process `Repository` with the same observable semantics as the
/// Postgres store: uniqueness conflicts, owner checks, cascades and ordering.
/// Used by the test suite so the full router runs without a database.
#[derive(Default)]
pub struct MemoryRepository {
    store: RwLock<Store>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    // --- Users ---

    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        let mut store = self.store.write().await;
        if store
            .users
            .iter()
            .any(|u| u.email == user.email || u.username == user.username)
        {
            return Err(AppError::conflict("email or username is already registered"));
        }
        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            img: user.img,
            bio: None,
            account_type: user.account_type,
            is_general_admin: false,
            auth_provider: user.auth_provider,
            created_at: now,
            updated_at: now,
        };
        store.users.push(created.clone());
        Ok(created)
    }

    async fn get_user(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.store.read().await.user(id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let store = self.store.read().await;
        Ok(store.users.iter().find(|u| u.email == email).cloned())
    }

    async fn username_exists(&self, username: &str) -> AppResult<bool> {
        let store = self.store.read().await;
        Ok(store.users.iter().any(|u| u.username == username))
    }

    async fn update_profile(&self, id: Uuid, req: UpdateProfileRequest) -> AppResult<Option<User>> {
        let mut store = self.store.write().await;
        if let Some(username) = &req.username {
            if store
                .users
                .iter()
                .any(|u| u.id != id && &u.username == username)
            {
                return Err(AppError::conflict("username is already taken"));
            }
        }
        let Some(user) = store.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(username) = req.username {
            user.username = username;
        }
        if let Some(img) = req.img {
            user.img = Some(img);
        }
        if let Some(bio) = req.bio {
            user.bio = Some(bio);
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn set_user_roles(&self, id: Uuid, req: UpdateRolesRequest) -> AppResult<Option<User>> {
        let mut store = self.store.write().await;
        let Some(user) = store.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(account_type) = req.account_type {
            user.account_type = account_type;
        }
        if let Some(is_admin) = req.is_general_admin {
            user.is_general_admin = is_admin;
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: Uuid) -> AppResult<bool> {
        let mut store = self.store.write().await;
        let before = store.users.len();
        store.users.retain(|u| u.id != id);
        if store.users.len() == before {
            return Ok(false);
        }
        let owned: Vec<Uuid> = store
            .posts
            .iter()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in owned {
            store.remove_post_cascade(post_id);
        }
        store.comments.retain(|c| c.user_id != id);
        store.likes.retain(|l| l.user_id != id);
        store
            .follows
            .retain(|f| f.follower_id != id && f.writer_id != id);
        for share in store.shares.iter_mut().filter(|s| s.user_id == Some(id)) {
            share.user_id = None;
        }
        Ok(true)
    }

    async fn list_users(&self, page: PageRequest) -> AppResult<Page<User>> {
        let store = self.store.read().await;
        let mut users: Vec<User> = store.users.iter().rev().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page_of(&users, page))
    }

    async fn list_writers(&self, page: PageRequest) -> AppResult<Page<WriterProfile>> {
        let store = self.store.read().await;
        let mut writers: Vec<WriterProfile> = store
            .users
            .iter()
            .filter(|u| u.account_type == AccountType::Writer)
            .map(|u| store.writer_profile(u))
            .collect();
        writers.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(page_of(&writers, page))
    }

    async fn get_writer(&self, id: Uuid) -> AppResult<Option<WriterProfile>> {
        let store = self.store.read().await;
        Ok(store
            .users
            .iter()
            .find(|u| u.id == id && u.account_type == AccountType::Writer)
            .map(|u| store.writer_profile(u)))
    }

    // --- Posts ---

    async fn post_slug_exists(&self, slug: &str) -> AppResult<bool> {
        Ok(self.store.read().await.posts.iter().any(|p| p.slug == slug))
    }

    async fn create_post(&self, post: NewPost) -> AppResult<Post> {
        let mut store = self.store.write().await;
        if store.posts.iter().any(|p| p.slug == post.slug) {
            return Err(AppError::conflict("slug is already in use"));
        }
        if !store.categories.iter().any(|c| c.slug == post.cat) {
            return Err(AppError::validation("referenced record does not exist"));
        }
        let now = Utc::now();
        let created = Post {
            id: Uuid::new_v4(),
            slug: post.slug,
            title: post.title,
            desc: post.desc,
            img: post.img,
            cat: post.cat,
            author_id: post.author_id,
            author_name: None,
            status: PostStatus::Draft,
            approved: false,
            visits: 0,
            likes: 0,
            comments: 0,
            created_at: now,
            updated_at: now,
        };
        store.posts.push(created.clone());
        Ok(store.hydrate_post(&created))
    }

    async fn get_post(&self, id: Uuid) -> AppResult<Option<Post>> {
        let store = self.store.read().await;
        Ok(store
            .posts
            .iter()
            .find(|p| p.id == id)
            .map(|p| store.hydrate_post(p)))
    }

    async fn get_post_by_slug(&self, slug: &str) -> AppResult<Option<Post>> {
        let store = self.store.read().await;
        Ok(store
            .posts
            .iter()
            .find(|p| p.slug == slug)
            .map(|p| store.hydrate_post(p)))
    }

    async fn list_posts(&self, filter: PostFilter, page: PageRequest) -> AppResult<Page<Post>> {
        let store = self.store.read().await;
        let posts: Vec<Post> = store
            .posts_newest_first()
            .into_iter()
            .filter(|p| matches_filter(p, &filter))
            .map(|p| store.hydrate_post(p))
            .collect();
        Ok(page_of(&posts, page))
    }

    async fn top_posts(&self, ranking: PostRanking, limit: i64) -> AppResult<Vec<Post>> {
        let store = self.store.read().await;
        let mut posts: Vec<Post> = store
            .posts_newest_first()
            .into_iter()
            .filter(|p| p.is_visible())
            .map(|p| store.hydrate_post(p))
            .collect();
        match ranking {
            PostRanking::Likes => posts.sort_by(|a, b| b.likes.cmp(&a.likes)),
            PostRanking::Visits => posts.sort_by(|a, b| b.visits.cmp(&a.visits)),
        }
        posts.truncate(limit.max(0) as usize);
        Ok(posts)
    }

    async fn update_post(
        &self,
        id: Uuid,
        author_id: Uuid,
        req: UpdatePostRequest,
    ) -> AppResult<Option<Post>> {
        let mut store = self.store.write().await;
        if let Some(cat) = &req.cat {
            if !store.categories.iter().any(|c| &c.slug == cat) {
                return Err(AppError::validation("referenced record does not exist"));
            }
        }
        let Some(post) = store
            .posts
            .iter_mut()
            .find(|p| p.id == id && p.author_id == author_id)
        else {
            return Ok(None);
        };
        if let Some(title) = req.title {
            post.title = title;
        }
        if let Some(desc) = req.desc {
            post.desc = desc;
        }
        if let Some(img) = req.img {
            post.img = Some(img);
        }
        if let Some(cat) = req.cat {
            post.cat = cat;
        }
        post.updated_at = Utc::now();
        let updated = post.clone();
        Ok(Some(store.hydrate_post(&updated)))
    }

    async fn set_post_moderation(
        &self,
        id: Uuid,
        approved: bool,
        status: PostStatus,
    ) -> AppResult<Option<Post>> {
        let mut store = self.store.write().await;
        let Some(post) = store.posts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        post.approved = approved;
        post.status = status;
        post.updated_at = Utc::now();
        let updated = post.clone();
        Ok(Some(store.hydrate_post(&updated)))
    }

    async fn record_post_visit(&self, id: Uuid) -> AppResult<()> {
        let mut store = self.store.write().await;
        if let Some(post) = store.posts.iter_mut().find(|p| p.id == id) {
            post.visits += 1;
        }
        Ok(())
    }

    async fn delete_post(&self, id: Uuid, author_id: Uuid) -> AppResult<bool> {
        let mut store = self.store.write().await;
        if !store
            .posts
            .iter()
            .any(|p| p.id == id && p.author_id == author_id)
        {
            return Ok(false);
        }
        store.remove_post_cascade(id);
        Ok(true)
    }

    async fn delete_post_admin(&self, id: Uuid) -> AppResult<bool> {
        let mut store = self.store.write().await;
        if !store.posts.iter().any(|p| p.id == id) {
            return Ok(false);
        }
        store.remove_post_cascade(id);
        Ok(true)
    }

    // --- Comments ---

    async fn add_comment(&self, post_id: Uuid, user_id: Uuid, desc: String) -> AppResult<Comment> {
        let mut store = self.store.write().await;
        if !store.posts.iter().any(|p| p.id == post_id) {
            return Err(AppError::validation("referenced record does not exist"));
        }
        let comment = Comment {
            id: Uuid::new_v4(),
            post_id,
            user_id,
            desc,
            created_at: Utc::now(),
            author_name: None,
            author_img: None,
        };
        store.comments.push(comment.clone());
        Ok(store.hydrate_comment(&comment))
    }

    async fn get_comment(&self, id: Uuid) -> AppResult<Option<Comment>> {
        let store = self.store.read().await;
        Ok(store
            .comments
            .iter()
            .find(|c| c.id == id)
            .map(|c| store.hydrate_comment(c)))
    }

    async fn list_comments(&self, post_id: Uuid, page: PageRequest) -> AppResult<Page<Comment>> {
        let store = self.store.read().await;
        let mut comments: Vec<Comment> = store
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .map(|c| store.hydrate_comment(c))
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(page_of(&comments, page))
    }

    async fn delete_comment(&self, id: Uuid) -> AppResult<bool> {
        let mut store = self.store.write().await;
        let before = store.comments.len();
        store.comments.retain(|c| c.id != id);
        Ok(store.comments.len() < before)
    }

    // --- Likes ---

    async fn like_post(&self, post_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let mut store = self.store.write().await;
        if store
            .likes
            .iter()
            .any(|l| l.post_id == post_id && l.user_id == user_id)
        {
            return Ok(false);
        }
        store.likes.push(Like { post_id, user_id });
        Ok(true)
    }

    async fn unlike_post(&self, post_id: Uuid, user_id: Uuid) -> AppResult<bool> {
        let mut store = self.store.write().await;
        let before = store.likes.len();
        store
            .likes
            .retain(|l| !(l.post_id == post_id && l.user_id == user_id));
        Ok(store.likes.len() < before)
    }

    async fn like_summary(&self, post_id: Uuid, viewer: Option<Uuid>) -> AppResult<LikeSummary> {
        let store = self.store.read().await;
        let likes: Vec<&Like> = store.likes.iter().filter(|l| l.post_id == post_id).collect();
        Ok(LikeSummary {
            post_id,
            likes: likes.len() as i64,
            liked: viewer.is_some_and(|v| likes.iter().any(|l| l.user_id == v)),
        })
    }

    // --- Follows ---

    async fn follow(&self, follower_id: Uuid, writer_id: Uuid) -> AppResult<bool> {
        let mut store = self.store.write().await;
        if store
            .follows
            .iter()
            .any(|f| f.follower_id == follower_id && f.writer_id == writer_id)
        {
            return Ok(false);
        }
        store.follows.push(Follow {
            follower_id,
            writer_id,
        });
        Ok(true)
    }

    async fn unfollow(&self, follower_id: Uuid, writer_id: Uuid) -> AppResult<bool> {
        let mut store = self.store.write().await;
        let before = store.follows.len();
        store
            .follows
            .retain(|f| !(f.follower_id == follower_id && f.writer_id == writer_id));
        Ok(store.follows.len() < before)
    }

    async fn follow_summary(
        &self,
        writer_id: Uuid,
        viewer: Option<Uuid>,
    ) -> AppResult<FollowSummary> {
        let store = self.store.read().await;
        let followers: Vec<&Follow> = store
            .follows
            .iter()
            .filter(|f| f.writer_id == writer_id)
            .collect();
        Ok(FollowSummary {
            writer_id,
            followers: followers.len() as i64,
            following: viewer.is_some_and(|v| followers.iter().any(|f| f.follower_id == v)),
        })
    }

    async fn list_followers(
        &self,
        writer_id: Uuid,
        page: PageRequest,
    ) -> AppResult<Page<UserProfile>> {
        let store = self.store.read().await;
        let profiles: Vec<UserProfile> = store
            .follows
            .iter()
            .rev()
            .filter(|f| f.writer_id == writer_id)
            .filter_map(|f| store.user(f.follower_id).map(User::profile))
            .collect();
        Ok(page_of(&profiles, page))
    }

    async fn list_following(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> AppResult<Page<UserProfile>> {
        let store = self.store.read().await;
        let profiles: Vec<UserProfile> = store
            .follows
            .iter()
            .rev()
            .filter(|f| f.follower_id == user_id)
            .filter_map(|f| store.user(f.writer_id).map(User::profile))
            .collect();
        Ok(page_of(&profiles, page))
    }

    // --- Categories ---

    async fn category_slug_exists(&self, slug: &str) -> AppResult<bool> {
        Ok(self
            .store
            .read()
            .await
            .categories
            .iter()
            .any(|c| c.slug == slug))
    }

    async fn create_category(&self, slug: String, req: CreateCategoryRequest) -> AppResult<Category> {
        let mut store = self.store.write().await;
        if store.categories.iter().any(|c| c.slug == slug) {
            return Err(AppError::conflict("category slug is already in use"));
        }
        let category = Category {
            id: Uuid::new_v4(),
            slug,
            title: req.title,
            desc: req.desc,
            img: req.img,
            created_at: Utc::now(),
        };
        store.categories.push(category.clone());
        Ok(category)
    }

    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let mut categories = self.store.read().await.categories.clone();
        categories.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(categories)
    }

    async fn get_category(&self, id: Uuid) -> AppResult<Option<Category>> {
        let store = self.store.read().await;
        Ok(store.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn get_category_by_slug(&self, slug: &str) -> AppResult<Option<Category>> {
        let store = self.store.read().await;
        Ok(store.categories.iter().find(|c| c.slug == slug).cloned())
    }

    async fn update_category(
        &self,
        id: Uuid,
        req: UpdateCategoryRequest,
    ) -> AppResult<Option<Category>> {
        let mut store = self.store.write().await;
        let Some(category) = store.categories.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        if let Some(title) = req.title {
            category.title = title;
        }
        if let Some(desc) = req.desc {
            category.desc = Some(desc);
        }
        if let Some(img) = req.img {
            category.img = Some(img);
        }
        Ok(Some(category.clone()))
    }

    async fn count_posts_in_category(&self, slug: &str) -> AppResult<i64> {
        let store = self.store.read().await;
        Ok(store.posts.iter().filter(|p| p.cat == slug).count() as i64)
    }

    async fn delete_category(&self, id: Uuid) -> AppResult<bool> {
        let mut store = self.store.write().await;
        let Some(slug) = store
            .categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.slug.clone())
        else {
            return Ok(false);
        };
        if store.posts.iter().any(|p| p.cat == slug) {
            return Err(AppError::conflict("category is in use"));
        }
        store.categories.retain(|c| c.id != id);
        Ok(true)
    }

    // --- Shows & episodes ---

    async fn show_slug_exists(&self, slug: &str) -> AppResult<bool> {
        Ok(self.store.read().await.shows.iter().any(|s| s.slug == slug))
    }

    async fn create_show(&self, slug: String, req: CreateShowRequest) -> AppResult<Show> {
        let mut store = self.store.write().await;
        if store.shows.iter().any(|s| s.slug == slug) {
            return Err(AppError::conflict("show slug is already in use"));
        }
        let show = Show {
            id: Uuid::new_v4(),
            slug,
            title: req.title,
            desc: req.desc,
            img: req.img,
            host: req.host,
            day_of_week: req.day_of_week,
            start_time: req.start_time,
            end_time: req.end_time,
            created_at: Utc::now(),
        };
        store.shows.push(show.clone());
        Ok(show)
    }

    async fn list_shows(&self, day: Option<i16>) -> AppResult<Vec<Show>> {
        let store = self.store.read().await;
        let mut shows: Vec<Show> = store
            .shows
            .iter()
            .filter(|s| day.is_none_or(|d| s.day_of_week == d))
            .cloned()
            .collect();
        shows.sort_by_key(|s| (s.day_of_week, s.start_time));
        Ok(shows)
    }

    async fn get_show(&self, id: Uuid) -> AppResult<Option<Show>> {
        let store = self.store.read().await;
        Ok(store.shows.iter().find(|s| s.id == id).cloned())
    }

    async fn get_show_by_slug(&self, slug: &str) -> AppResult<Option<Show>> {
        let store = self.store.read().await;
        Ok(store.shows.iter().find(|s| s.slug == slug).cloned())
    }

    async fn update_show(&self, id: Uuid, req: UpdateShowRequest) -> AppResult<Option<Show>> {
        let mut store = self.store.write().await;
        let Some(show) = store.shows.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        if let Some(title) = req.title {
            show.title = title;
        }
        if let Some(desc) = req.desc {
            show.desc = Some(desc);
        }
        if let Some(img) = req.img {
            show.img = Some(img);
        }
        if let Some(host) = req.host {
            show.host = host;
        }
        if let Some(day) = req.day_of_week {
            show.day_of_week = day;
        }
        if let Some(start) = req.start_time {
            show.start_time = start;
        }
        if let Some(end) = req.end_time {
            show.end_time = end;
        }
        Ok(Some(show.clone()))
    }

    async fn delete_show(&self, id: Uuid) -> AppResult<bool> {
        let mut store = self.store.write().await;
        let before = store.shows.len();
        store.shows.retain(|s| s.id != id);
        if store.shows.len() == before {
            return Ok(false);
        }
        store.episodes.retain(|e| e.show_id != id);
        Ok(true)
    }

    async fn create_episode(&self, show_id: Uuid, req: CreateEpisodeRequest) -> AppResult<Episode> {
        let mut store = self.store.write().await;
        if !store.shows.iter().any(|s| s.id == show_id) {
            return Err(AppError::validation("referenced record does not exist"));
        }
        if store
            .episodes
            .iter()
            .any(|e| e.show_id == show_id && e.episode_number == req.episode_number)
        {
            return Err(AppError::conflict(
                "episode number is already used for this show",
            ));
        }
        let episode = Episode {
            id: Uuid::new_v4(),
            show_id,
            title: req.title,
            desc: req.desc,
            audio_url: req.audio_url,
            duration_secs: req.duration_secs,
            episode_number: req.episode_number,
            published_at: req.published_at.unwrap_or_else(Utc::now),
        };
        store.episodes.push(episode.clone());
        Ok(episode)
    }

    async fn list_episodes(&self, show_id: Uuid, page: PageRequest) -> AppResult<Page<Episode>> {
        let store = self.store.read().await;
        let mut episodes: Vec<Episode> = store
            .episodes
            .iter()
            .filter(|e| e.show_id == show_id)
            .cloned()
            .collect();
        episodes.sort_by(|a, b| {
            b.published_at
                .cmp(&a.published_at)
                .then(b.episode_number.cmp(&a.episode_number))
        });
        Ok(page_of(&episodes, page))
    }

    async fn update_episode(
        &self,
        id: Uuid,
        req: UpdateEpisodeRequest,
    ) -> AppResult<Option<Episode>> {
        let mut store = self.store.write().await;
        let Some(show_id) = store
            .episodes
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.show_id)
        else {
            return Ok(None);
        };
        if let Some(number) = req.episode_number {
            if store
                .episodes
                .iter()
                .any(|e| e.id != id && e.show_id == show_id && e.episode_number == number)
            {
                return Err(AppError::conflict(
                    "episode number is already used for this show",
                ));
            }
        }
        let Some(episode) = store.episodes.iter_mut().find(|e| e.id == id) else {
            return Ok(None);
        };
        if let Some(title) = req.title {
            episode.title = title;
        }
        if let Some(desc) = req.desc {
            episode.desc = Some(desc);
        }
        if let Some(audio_url) = req.audio_url {
            episode.audio_url = audio_url;
        }
        if let Some(duration) = req.duration_secs {
            episode.duration_secs = duration;
        }
        if let Some(number) = req.episode_number {
            episode.episode_number = number;
        }
        if let Some(published_at) = req.published_at {
            episode.published_at = published_at;
        }
        Ok(Some(episode.clone()))
    }

    async fn delete_episode(&self, id: Uuid) -> AppResult<bool> {
        let mut store = self.store.write().await;
        let before = store.episodes.len();
        store.episodes.retain(|e| e.id != id);
        Ok(store.episodes.len() < before)
    }

    // --- Podcasts ---

    async fn podcast_slug_exists(&self, slug: &str) -> AppResult<bool> {
        Ok(self
            .store
            .read()
            .await
            .podcasts
            .iter()
            .any(|p| p.slug == slug))
    }

    async fn create_podcast(&self, slug: String, req: CreatePodcastRequest) -> AppResult<Podcast> {
        let mut store = self.store.write().await;
        if store.podcasts.iter().any(|p| p.slug == slug) {
            return Err(AppError::conflict("podcast slug is already in use"));
        }
        let podcast = Podcast {
            id: Uuid::new_v4(),
            slug,
            title: req.title,
            desc: req.desc,
            img: req.img,
            audio_url: req.audio_url,
            host: req.host,
            duration_secs: req.duration_secs,
            created_at: Utc::now(),
        };
        store.podcasts.push(podcast.clone());
        Ok(podcast)
    }

    async fn list_podcasts(&self, page: PageRequest) -> AppResult<Page<Podcast>> {
        let store = self.store.read().await;
        let mut podcasts: Vec<Podcast> = store.podcasts.iter().rev().cloned().collect();
        podcasts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page_of(&podcasts, page))
    }

    async fn get_podcast_by_slug(&self, slug: &str) -> AppResult<Option<Podcast>> {
        let store = self.store.read().await;
        Ok(store.podcasts.iter().find(|p| p.slug == slug).cloned())
    }

    async fn update_podcast(
        &self,
        id: Uuid,
        req: UpdatePodcastRequest,
    ) -> AppResult<Option<Podcast>> {
        let mut store = self.store.write().await;
        let Some(podcast) = store.podcasts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(title) = req.title {
            podcast.title = title;
        }
        if let Some(desc) = req.desc {
            podcast.desc = Some(desc);
        }
        if let Some(img) = req.img {
            podcast.img = Some(img);
        }
        if let Some(audio_url) = req.audio_url {
            podcast.audio_url = audio_url;
        }
        if let Some(host) = req.host {
            podcast.host = Some(host);
        }
        if let Some(duration) = req.duration_secs {
            podcast.duration_secs = duration;
        }
        Ok(Some(podcast.clone()))
    }

    async fn delete_podcast(&self, id: Uuid) -> AppResult<bool> {
        let mut store = self.store.write().await;
        let before = store.podcasts.len();
        store.podcasts.retain(|p| p.id != id);
        Ok(store.podcasts.len() < before)
    }

    // --- Banners ---

    async fn create_banner(&self, req: CreateBannerRequest) -> AppResult<Banner> {
        let banner = Banner {
            id: Uuid::new_v4(),
            title: req.title,
            img: req.img,
            link: req.link,
            placement: req.placement,
            active: req.active,
            starts_at: req.starts_at,
            ends_at: req.ends_at,
            clicks: 0,
            created_at: Utc::now(),
        };
        self.store.write().await.banners.push(banner.clone());
        Ok(banner)
    }

    async fn list_banners(&self) -> AppResult<Vec<Banner>> {
        let store = self.store.read().await;
        Ok(store.banners.iter().rev().cloned().collect())
    }

    async fn list_active_banners(
        &self,
        placement: Option<BannerPlacement>,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<Banner>> {
        let store = self.store.read().await;
        Ok(store
            .banners
            .iter()
            .rev()
            .filter(|b| b.is_live(now) && placement.is_none_or(|p| b.placement == p))
            .cloned()
            .collect())
    }

    async fn get_banner(&self, id: Uuid) -> AppResult<Option<Banner>> {
        let store = self.store.read().await;
        Ok(store.banners.iter().find(|b| b.id == id).cloned())
    }

    async fn update_banner(&self, id: Uuid, req: UpdateBannerRequest) -> AppResult<Option<Banner>> {
        let mut store = self.store.write().await;
        let Some(banner) = store.banners.iter_mut().find(|b| b.id == id) else {
            return Ok(None);
        };
        if let Some(title) = req.title {
            banner.title = title;
        }
        if let Some(img) = req.img {
            banner.img = img;
        }
        if let Some(link) = req.link {
            banner.link = link;
        }
        if let Some(placement) = req.placement {
            banner.placement = placement;
        }
        if let Some(active) = req.active {
            banner.active = active;
        }
        if req.starts_at.is_some() {
            banner.starts_at = req.starts_at;
        }
        if req.ends_at.is_some() {
            banner.ends_at = req.ends_at;
        }
        Ok(Some(banner.clone()))
    }

    async fn record_banner_click(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<Option<Banner>> {
        let mut store = self.store.write().await;
        let Some(banner) = store
            .banners
            .iter_mut()
            .find(|b| b.id == id && b.is_live(now))
        else {
            return Ok(None);
        };
        banner.clicks += 1;
        Ok(Some(banner.clone()))
    }

    async fn delete_banner(&self, id: Uuid) -> AppResult<bool> {
        let mut store = self.store.write().await;
        let before = store.banners.len();
        store.banners.retain(|b| b.id != id);
        Ok(store.banners.len() < before)
    }

    // --- Shares & stats ---

    async fn log_share(&self, share: NewShareLog) -> AppResult<ShareLog> {
        let mut store = self.store.write().await;
        if !store.posts.iter().any(|p| p.id == share.post_id) {
            return Err(AppError::validation("referenced record does not exist"));
        }
        let log = ShareLog {
            id: Uuid::new_v4(),
            post_id: share.post_id,
            user_id: share.user_id,
            platform: share.platform,
            method: share.method,
            created_at: Utc::now(),
        };
        store.shares.push(log.clone());
        Ok(log)
    }

    async fn share_stats(&self, post_id: Option<Uuid>) -> AppResult<Vec<ShareStat>> {
        let store = self.store.read().await;
        let mut counts = BTreeMap::new();
        for share in store
            .shares
            .iter()
            .filter(|s| post_id.is_none_or(|id| s.post_id == id))
        {
            *counts.entry((share.platform, share.method)).or_insert(0i64) += 1;
        }
        let mut stats: Vec<ShareStat> = counts
            .into_iter()
            .map(|((platform, method), count)| ShareStat {
                platform,
                method,
                count,
            })
            .collect();
        // BTreeMap already yields (platform, method) order; the stable sort keeps it for ties.
        stats.sort_by(|a, b| b.count.cmp(&a.count));
        Ok(stats)
    }

    async fn get_stats(&self) -> AppResult<AdminDashboardStats> {
        let store = self.store.read().await;
        Ok(AdminDashboardStats {
            users: store.users.len() as i64,
            writers: store
                .users
                .iter()
                .filter(|u| u.account_type == AccountType::Writer)
                .count() as i64,
            posts: store.posts.len() as i64,
            pending_posts: store.posts.iter().filter(|p| !p.approved).count() as i64,
            published_posts: store.posts.iter().filter(|p| p.is_visible()).count() as i64,
            comments: store.comments.len() as i64,
            likes: store.likes.len() as i64,
            follows: store.follows.len() as i64,
            shares: store.shares.len() as i64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AuthProvider;

    async fn seed_writer(repo: &MemoryRepository, name: &str) -> User {
        repo.create_user(NewUser {
            username: name.to_string(),
            email: format!("{name}@station.fm"),
            password_hash: None,
            img: None,
            account_type: AccountType::Writer,
            auth_provider: AuthProvider::Credentials,
        })
        .await
        .unwrap()
    }

    async fn seed_post(repo: &MemoryRepository, author: &User, slug: &str) -> Post {
        if !repo.category_slug_exists("news").await.unwrap() {
            repo.create_category(
                "news".into(),
                CreateCategoryRequest {
                    title: "News".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        }
        repo.create_post(NewPost {
            author_id: author.id,
            slug: slug.into(),
            title: slug.into(),
            desc: "body".into(),
            img: None,
            cat: "news".into(),
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let repo = MemoryRepository::new();
        seed_writer(&repo, "host").await;
        let err = repo
            .create_user(NewUser {
                username: "other".into(),
                email: "host@station.fm".into(),
                password_hash: None,
                img: None,
                account_type: AccountType::Reader,
                auth_provider: AuthProvider::Google,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn deleting_a_user_cascades() {
        let repo = MemoryRepository::new();
        let writer = seed_writer(&repo, "writer").await;
        let reader = seed_writer(&repo, "reader").await;
        let post = seed_post(&repo, &writer, "first").await;
        repo.like_post(post.id, reader.id).await.unwrap();
        repo.add_comment(post.id, reader.id, "nice".into())
            .await
            .unwrap();
        repo.follow(reader.id, writer.id).await.unwrap();

        assert!(repo.delete_user(writer.id).await.unwrap());
        let stats = repo.get_stats().await.unwrap();
        assert_eq!(stats.posts, 0);
        assert_eq!(stats.likes, 0);
        assert_eq!(stats.comments, 0);
        assert_eq!(stats.follows, 0);
    }

    #[tokio::test]
    async fn hydrated_post_counts_engagement() {
        let repo = MemoryRepository::new();
        let writer = seed_writer(&repo, "writer").await;
        let post = seed_post(&repo, &writer, "counted").await;
        repo.like_post(post.id, writer.id).await.unwrap();
        assert!(!repo.like_post(post.id, writer.id).await.unwrap());
        repo.add_comment(post.id, writer.id, "first!".into())
            .await
            .unwrap();

        let fetched = repo.get_post(post.id).await.unwrap().unwrap();
        assert_eq!(fetched.likes, 1);
        assert_eq!(fetched.comments, 1);
        assert_eq!(fetched.author_name.as_deref(), Some("writer"));
    }

    #[tokio::test]
    async fn category_in_use_cannot_be_deleted() {
        let repo = MemoryRepository::new();
        let writer = seed_writer(&repo, "writer").await;
        seed_post(&repo, &writer, "filed").await;
        let cat = repo.get_category_by_slug("news").await.unwrap().unwrap();
        assert!(matches!(
            repo.delete_category(cat.id).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn episode_numbers_are_unique_per_show() {
        let repo = MemoryRepository::new();
        let show = repo
            .create_show(
                "breakfast".into(),
                CreateShowRequest {
                    title: "Breakfast".into(),
                    desc: None,
                    img: None,
                    host: "Sam".into(),
                    day_of_week: 0,
                    start_time: "07:00:00".parse().unwrap(),
                    end_time: "10:00:00".parse().unwrap(),
                },
            )
            .await
            .unwrap();
        let episode = || CreateEpisodeRequest {
            title: "Ep".into(),
            desc: None,
            audio_url: "episodes/a.mp3".into(),
            duration_secs: 60,
            episode_number: 1,
            published_at: None,
        };
        repo.create_episode(show.id, episode()).await.unwrap();
        assert!(matches!(
            repo.create_episode(show.id, episode()).await,
            Err(AppError::Conflict(_))
        ));

        assert!(repo.delete_show(show.id).await.unwrap());
        let page = repo
            .list_episodes(show.id, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 0);
    }
}
