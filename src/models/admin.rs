use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;

/// AdminDashboardStats
///
/// Platform-wide totals for the admin dashboard (GET /admin/stats).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct AdminDashboardStats {
    pub users: i64,
    pub writers: i64,
    pub posts: i64,
    pub pending_posts: i64,
    pub published_posts: i64,
    pub comments: i64,
    pub likes: i64,
    pub follows: i64,
    pub shares: i64,
}
