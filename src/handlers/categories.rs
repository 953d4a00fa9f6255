use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    AppState,
    error::{AppError, AppResult},
    models::{Category, CreateCategoryRequest, UpdateCategoryRequest},
    slug,
};

/// list_categories
///
/// [Public Route] All categories, ordered by title.
#[utoipa::path(
    get,
    path = "/categories",
    responses((status = 200, description = "Categories", body = [Category]))
)]
pub async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Vec<Category>>> {
    Ok(Json(state.repo.list_categories().await?))
}

/// get_category
///
/// [Public Route] A category by slug.
#[utoipa::path(
    get,
    path = "/categories/{slug}",
    responses(
        (status = 200, description = "Category", body = Category),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<Category>> {
    let category = state
        .repo
        .get_category_by_slug(&slug)
        .await?
        .ok_or(AppError::NotFound("category"))?;
    Ok(Json(category))
}

/// create_category
///
/// [Admin Route] Creates a category with a unique slug derived from its title.
#[utoipa::path(
    post,
    path = "/admin/categories",
    request_body = CreateCategoryRequest,
    responses((status = 201, description = "Category created", body = Category))
)]
pub async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<CreateCategoryRequest>,
) -> AppResult<(StatusCode, Json<Category>)> {
    payload.validate()?;

    let repo = state.repo.clone();
    let slug = slug::create_unique_slug(&payload.title, |candidate| {
        let repo = repo.clone();
        async move { repo.category_slug_exists(&candidate).await }
    })
    .await?;

    let category = state.repo.create_category(slug, payload).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// update_category
///
/// [Admin Route] Partial update. The slug is never regenerated.
#[utoipa::path(
    put,
    path = "/admin/categories/{id}",
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = Category),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> AppResult<Json<Category>> {
    payload.validate()?;
    let category = state
        .repo
        .update_category(id, payload)
        .await?
        .ok_or(AppError::NotFound("category"))?;
    Ok(Json(category))
}

/// delete_category
///
/// [Admin Route] Deletes an unused category. Categories still holding posts answer 409.
#[utoipa::path(
    delete,
    path = "/admin/categories/{id}",
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Category in use")
    )
)]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let category = state
        .repo
        .get_category(id)
        .await?
        .ok_or(AppError::NotFound("category"))?;

    let in_use = state.repo.count_posts_in_category(&category.slug).await?;
    if in_use > 0 {
        return Err(AppError::conflict(format!(
            "category `{}` still has {in_use} post(s)",
            category.slug
        )));
    }

    if state.repo.delete_category(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("category"))
    }
}
