use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    AppState,
    error::{AppError, AppResult},
    models::{Banner, BannerClick, BannerQuery, CreateBannerRequest, UpdateBannerRequest},
};

/// get_banners
///
/// [Public Route] Banners that are active and inside their scheduling window,
/// optionally for a single placement.
#[utoipa::path(
    get,
    path = "/banners",
    params(BannerQuery),
    responses((status = 200, description = "Live banners", body = [Banner]))
)]
pub async fn get_banners(
    State(state): State<AppState>,
    Query(query): Query<BannerQuery>,
) -> AppResult<Json<Vec<Banner>>> {
    let banners = state
        .repo
        .list_active_banners(query.placement, Utc::now())
        .await?;
    Ok(Json(banners))
}

/// click_banner
///
/// [Public Route] Counts a click and hands back the link to follow.
/// Unknown, inactive or out-of-window banners answer 404.
#[utoipa::path(
    post,
    path = "/banners/{id}/click",
    responses(
        (status = 200, description = "Click recorded", body = BannerClick),
        (status = 404, description = "Not Found")
    )
)]
pub async fn click_banner(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<BannerClick>> {
    let banner = state
        .repo
        .record_banner_click(id, Utc::now())
        .await?
        .ok_or(AppError::NotFound("banner"))?;

    Ok(Json(BannerClick {
        id: banner.id,
        link: banner.link,
        clicks: banner.clicks,
    }))
}

/// get_admin_banners
///
/// [Admin Route] Every banner, including inactive and expired ones.
#[utoipa::path(
    get,
    path = "/admin/banners",
    responses((status = 200, description = "All banners", body = [Banner]))
)]
pub async fn get_admin_banners(State(state): State<AppState>) -> AppResult<Json<Vec<Banner>>> {
    Ok(Json(state.repo.list_banners().await?))
}

/// create_banner
#[utoipa::path(
    post,
    path = "/admin/banners",
    request_body = CreateBannerRequest,
    responses(
        (status = 201, description = "Banner created", body = Banner),
        (status = 422, description = "Invalid window or link")
    )
)]
pub async fn create_banner(
    State(state): State<AppState>,
    Json(payload): Json<CreateBannerRequest>,
) -> AppResult<(StatusCode, Json<Banner>)> {
    payload.validate()?;
    let banner = state.repo.create_banner(payload).await?;
    Ok((StatusCode::CREATED, Json(banner)))
}

/// update_banner
///
/// [Admin Route] Partial update. The scheduling window is checked against the
/// merged result, so moving only one bound cannot invert it.
#[utoipa::path(
    put,
    path = "/admin/banners/{id}",
    request_body = UpdateBannerRequest,
    responses(
        (status = 200, description = "Banner updated", body = Banner),
        (status = 404, description = "Not Found"),
        (status = 422, description = "Invalid window or link")
    )
)]
pub async fn update_banner(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBannerRequest>,
) -> AppResult<Json<Banner>> {
    let current = state
        .repo
        .get_banner(id)
        .await?
        .ok_or(AppError::NotFound("banner"))?;
    payload.validate_against(&current)?;

    let banner = state
        .repo
        .update_banner(id, payload)
        .await?
        .ok_or(AppError::NotFound("banner"))?;
    Ok(Json(banner))
}

/// delete_banner
#[utoipa::path(
    delete,
    path = "/admin/banners/{id}",
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_banner(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if state.repo.delete_banner(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("banner"))
    }
}
