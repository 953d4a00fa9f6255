use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, AppResult},
    handlers::visible_post,
    models::{Comment, CreateCommentRequest, Page, PageQuery},
};

/// add_comment
///
/// [Authenticated Route] Posts a new comment on a visible post.
#[utoipa::path(
    post,
    path = "/posts/{id}/comments",
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment Added", body = Comment),
        (status = 404, description = "Post not found or hidden")
    )
)]
pub async fn add_comment(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    Json(payload): Json<CreateCommentRequest>,
) -> AppResult<(StatusCode, Json<Comment>)> {
    payload.validate()?;
    let post = visible_post(&state, post_id).await?;

    let comment = state
        .repo
        .add_comment(post.id, user_id, payload.desc.trim().to_string())
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// get_comments
///
/// [Public Route] Comments of a visible post, oldest first.
#[utoipa::path(
    get,
    path = "/posts/{id}/comments",
    params(PageQuery),
    responses(
        (status = 200, description = "Comments", body = Page<Comment>),
        (status = 404, description = "Post not found or hidden")
    )
)]
pub async fn get_comments(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<Page<Comment>>> {
    let page = query.resolve()?;
    let post = visible_post(&state, post_id).await?;
    Ok(Json(state.repo.list_comments(post.id, page).await?))
}

/// delete_comment
///
/// [Authenticated Route] Removes a comment.
///
/// *Authorization*: the comment's author, the author of the post it sits on,
/// or a general admin. Anyone else gets the same 404 as a missing comment.
#[utoipa::path(
    delete,
    path = "/comments/{id}",
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_comment(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let comment = state
        .repo
        .get_comment(id)
        .await?
        .ok_or(AppError::NotFound("comment"))?;

    let allowed = if comment.user_id == user.id || user.is_general_admin {
        true
    } else {
        state
            .repo
            .get_post(comment.post_id)
            .await?
            .is_some_and(|post| post.author_id == user.id)
    };
    if !allowed {
        return Err(AppError::NotFound("comment"));
    }

    if state.repo.delete_comment(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("comment"))
    }
}
