use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    AppState,
    auth::{AdminUser, AuthUser},
    error::{AppError, AppResult},
    models::{Page, PageQuery, UpdateProfileRequest, UpdateRolesRequest, User, WriterProfile},
};

/// get_me
///
/// [Authenticated Route] Returns the caller's own account, including email and role flags.
#[utoipa::path(
    get,
    path = "/me",
    responses((status = 200, description = "Current account", body = User))
)]
pub async fn get_me(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<User>> {
    let user = state.repo.get_user(id).await?.ok_or(AppError::Unauthorized)?;
    Ok(Json(user))
}

/// update_me
///
/// [Authenticated Route] Partial profile update. A username already held by
/// another account answers 409.
#[utoipa::path(
    put,
    path = "/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = User),
        (status = 409, description = "Username taken")
    )
)]
pub async fn update_me(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<Json<User>> {
    payload.validate()?;
    let user = state
        .repo
        .update_profile(id, payload)
        .await?
        .ok_or(AppError::Unauthorized)?;
    Ok(Json(user))
}

/// list_writers
///
/// [Public Route] Paginated directory of writer accounts with follower and post counts.
#[utoipa::path(
    get,
    path = "/writers",
    params(PageQuery),
    responses((status = 200, description = "Writers", body = Page<WriterProfile>))
)]
pub async fn list_writers(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<Page<WriterProfile>>> {
    Ok(Json(state.repo.list_writers(query.resolve()?).await?))
}

/// get_writer
///
/// [Public Route] A single writer's public card. Readers answer 404.
#[utoipa::path(
    get,
    path = "/writers/{id}",
    responses(
        (status = 200, description = "Writer", body = WriterProfile),
        (status = 404, description = "Not a writer")
    )
)]
pub async fn get_writer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<WriterProfile>> {
    let writer = state
        .repo
        .get_writer(id)
        .await?
        .ok_or(AppError::NotFound("writer"))?;
    Ok(Json(writer))
}

/// list_users
///
/// [Admin Route] Every account, newest first.
#[utoipa::path(
    get,
    path = "/admin/users",
    params(PageQuery),
    responses((status = 200, description = "Users", body = Page<User>))
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<Page<User>>> {
    Ok(Json(state.repo.list_users(query.resolve()?).await?))
}

/// update_roles
///
/// [Admin Route] Promotes or demotes an account. Admins cannot drop their own
/// admin flag (409).
#[utoipa::path(
    put,
    path = "/admin/users/{id}/roles",
    request_body = UpdateRolesRequest,
    responses(
        (status = 200, description = "Roles updated", body = User),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Self-demotion")
    )
)]
pub async fn update_roles(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRolesRequest>,
) -> AppResult<Json<User>> {
    if admin.id == id && payload.is_general_admin == Some(false) {
        return Err(AppError::conflict("you cannot revoke your own admin rights"));
    }

    let user = state
        .repo
        .set_user_roles(id, payload)
        .await?
        .ok_or(AppError::NotFound("user"))?;

    tracing::info!(
        admin_id = %admin.id,
        user_id = %user.id,
        account_type = ?user.account_type,
        is_general_admin = user.is_general_admin,
        "roles updated"
    );
    Ok(Json(user))
}

/// delete_user
///
/// [Admin Route] Removes an account and everything it authored.
#[utoipa::path(
    delete,
    path = "/admin/users/{id}",
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if state.repo.delete_user(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("user"))
    }
}
