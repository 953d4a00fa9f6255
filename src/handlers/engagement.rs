use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    AppState,
    auth::{AuthUser, MaybeAuthUser},
    error::{AppError, AppResult},
    handlers::visible_post,
    models::{
        FollowSummary, LikeSummary, NewShareLog, Page, PageQuery, ShareRequest, ShareResponse,
        UserProfile, share_url,
    },
};

// --- Likes ---

/// like_post
///
/// [Authenticated Route] Likes a visible post. A second like answers 409.
#[utoipa::path(
    post,
    path = "/posts/{id}/like",
    responses(
        (status = 200, description = "Liked", body = LikeSummary),
        (status = 404, description = "Post not found or hidden"),
        (status = 409, description = "Already liked")
    )
)]
pub async fn like_post(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> AppResult<Json<LikeSummary>> {
    let post = visible_post(&state, post_id).await?;
    if !state.repo.like_post(post.id, user_id).await? {
        return Err(AppError::conflict("post already liked"));
    }
    Ok(Json(state.repo.like_summary(post.id, Some(user_id)).await?))
}

/// unlike_post
///
/// [Authenticated Route] Removes the caller's like.
#[utoipa::path(
    delete,
    path = "/posts/{id}/like",
    responses(
        (status = 200, description = "Like removed", body = LikeSummary),
        (status = 404, description = "Not liked")
    )
)]
pub async fn unlike_post(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> AppResult<Json<LikeSummary>> {
    if !state.repo.unlike_post(post_id, user_id).await? {
        return Err(AppError::NotFound("like"));
    }
    Ok(Json(state.repo.like_summary(post_id, Some(user_id)).await?))
}

/// get_likes
///
/// [Public Route] Like count of a visible post and whether the caller liked it.
#[utoipa::path(
    get,
    path = "/posts/{id}/likes",
    responses(
        (status = 200, description = "Like summary", body = LikeSummary),
        (status = 404, description = "Post not found or hidden")
    )
)]
pub async fn get_likes(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> AppResult<Json<LikeSummary>> {
    let post = visible_post(&state, post_id).await?;
    Ok(Json(state.repo.like_summary(post.id, viewer.id()).await?))
}

// --- Follows ---

async fn ensure_writer(state: &AppState, writer_id: Uuid) -> AppResult<()> {
    match state.repo.get_user(writer_id).await? {
        Some(user) if user.is_writer() => Ok(()),
        _ => Err(AppError::NotFound("writer")),
    }
}

/// follow_writer
///
/// [Authenticated Route] Follows a writer. Only writer accounts can be
/// followed; following yourself answers 422 and following twice 409.
#[utoipa::path(
    post,
    path = "/writers/{id}/follow",
    responses(
        (status = 200, description = "Following", body = FollowSummary),
        (status = 404, description = "Not a writer"),
        (status = 409, description = "Already following"),
        (status = 422, description = "Self-follow")
    )
)]
pub async fn follow_writer(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(writer_id): Path<Uuid>,
) -> AppResult<Json<FollowSummary>> {
    ensure_writer(&state, writer_id).await?;
    if writer_id == user_id {
        return Err(AppError::validation("you cannot follow yourself"));
    }
    if !state.repo.follow(user_id, writer_id).await? {
        return Err(AppError::conflict("already following this writer"));
    }
    Ok(Json(state.repo.follow_summary(writer_id, Some(user_id)).await?))
}

/// unfollow_writer
///
/// [Authenticated Route] Stops following a writer.
#[utoipa::path(
    delete,
    path = "/writers/{id}/follow",
    responses(
        (status = 200, description = "Unfollowed", body = FollowSummary),
        (status = 404, description = "Not following")
    )
)]
pub async fn unfollow_writer(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(writer_id): Path<Uuid>,
) -> AppResult<Json<FollowSummary>> {
    if !state.repo.unfollow(user_id, writer_id).await? {
        return Err(AppError::NotFound("follow"));
    }
    Ok(Json(state.repo.follow_summary(writer_id, Some(user_id)).await?))
}

/// get_follow_summary
///
/// [Public Route] Follower count of a writer and whether the caller follows them.
#[utoipa::path(
    get,
    path = "/writers/{id}/follow",
    responses(
        (status = 200, description = "Follow summary", body = FollowSummary),
        (status = 404, description = "Not a writer")
    )
)]
pub async fn get_follow_summary(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(writer_id): Path<Uuid>,
) -> AppResult<Json<FollowSummary>> {
    ensure_writer(&state, writer_id).await?;
    Ok(Json(state.repo.follow_summary(writer_id, viewer.id()).await?))
}

/// list_followers
///
/// [Public Route] Accounts following a writer.
#[utoipa::path(
    get,
    path = "/writers/{id}/followers",
    params(PageQuery),
    responses(
        (status = 200, description = "Followers", body = Page<UserProfile>),
        (status = 404, description = "Not a writer")
    )
)]
pub async fn list_followers(
    State(state): State<AppState>,
    Path(writer_id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<Page<UserProfile>>> {
    let page = query.resolve()?;
    ensure_writer(&state, writer_id).await?;
    Ok(Json(state.repo.list_followers(writer_id, page).await?))
}

/// list_following
///
/// [Authenticated Route] Writers the caller follows.
#[utoipa::path(
    get,
    path = "/me/following",
    params(PageQuery),
    responses((status = 200, description = "Following", body = Page<UserProfile>))
)]
pub async fn list_following(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<Page<UserProfile>>> {
    Ok(Json(state.repo.list_following(id, query.resolve()?).await?))
}

// --- Shares ---

/// share_post
///
/// [Public Route] Records a share of a visible post and returns the tracked
/// link to hand to the share target. Signed-in callers are attributed.
#[utoipa::path(
    post,
    path = "/posts/{id}/share",
    request_body = ShareRequest,
    responses(
        (status = 201, description = "Share recorded", body = ShareResponse),
        (status = 404, description = "Post not found or hidden")
    )
)]
pub async fn share_post(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    Json(payload): Json<ShareRequest>,
) -> AppResult<(StatusCode, Json<ShareResponse>)> {
    let post = visible_post(&state, post_id).await?;

    let log = state
        .repo
        .log_share(NewShareLog {
            post_id: post.id,
            user_id: viewer.id(),
            platform: payload.platform,
            method: payload.method,
        })
        .await?;

    let share_url = share_url(
        &state.config.public_base_url,
        &post.slug,
        payload.platform,
        payload.method,
    );
    Ok((StatusCode::CREATED, Json(ShareResponse { share_url, log })))
}
