use axum::{
    Json,
    extract::{Query, State},
};

use crate::{
    AppState,
    error::AppResult,
    models::{AdminDashboardStats, ShareStat, ShareStatsQuery},
};

/// get_admin_stats
///
/// [Admin Route] Dashboard totals across accounts, posts and engagement.
#[utoipa::path(
    get,
    path = "/admin/stats",
    responses((status = 200, description = "Stats", body = AdminDashboardStats))
)]
pub async fn get_admin_stats(State(state): State<AppState>) -> AppResult<Json<AdminDashboardStats>> {
    Ok(Json(state.repo.get_stats().await?))
}

/// get_share_stats
///
/// [Admin Route] Share counts per (platform, method), largest first, either
/// site-wide or for one post.
#[utoipa::path(
    get,
    path = "/admin/shares",
    params(ShareStatsQuery),
    responses((status = 200, description = "Share stats", body = [ShareStat]))
)]
pub async fn get_share_stats(
    State(state): State<AppState>,
    Query(query): Query<ShareStatsQuery>,
) -> AppResult<Json<Vec<ShareStat>>> {
    Ok(Json(state.repo.share_stats(query.post_id).await?))
}
