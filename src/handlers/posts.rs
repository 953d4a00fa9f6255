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
    handlers::can_see_hidden,
    models::{
        AdminPostQuery, CreatePostRequest, ModerationRequest, NewPost, Page, PageQuery, Post,
        PostFilter, PostKey, PostListQuery, PostRanking, PostStatusRequest, TopPostsQuery,
        UpdatePostRequest,
    },
    moderation::{self, ModerationAction},
    slug,
};

const FEATURED_DEFAULT: i64 = 3;
const POPULAR_DEFAULT: i64 = 5;
const TOP_MAX: i64 = 50;

async fn ensure_category(state: &AppState, cat: &str) -> AppResult<()> {
    match state.repo.get_category_by_slug(cat).await? {
        Some(_) => Ok(()),
        None => Err(AppError::validation(format!("category `{cat}` does not exist"))),
    }
}

/// Applies a moderation move to a post and persists the resulting fields.
async fn apply_moderation(state: &AppState, post: Post, action: ModerationAction) -> AppResult<Post> {
    let next = moderation::transition(post.moderation_state(), action)?;
    let (approved, status) = next.into_fields();
    state
        .repo
        .set_post_moderation(post.id, approved, status)
        .await?
        .ok_or(AppError::NotFound("post"))
}

/// list_posts
///
/// [Public Route] Visible posts, newest first, filterable by category, author and search text.
#[utoipa::path(
    get,
    path = "/posts",
    params(PostListQuery),
    responses((status = 200, description = "Visible posts", body = Page<Post>))
)]
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PostListQuery>,
) -> AppResult<Json<Page<Post>>> {
    let page = query.page()?;
    Ok(Json(state.repo.list_posts(query.filter(), page).await?))
}

/// get_featured_posts
///
/// [Public Route] Top visible posts by like count (default 3).
#[utoipa::path(
    get,
    path = "/posts/featured",
    params(TopPostsQuery),
    responses((status = 200, description = "Featured posts", body = [Post]))
)]
pub async fn get_featured_posts(
    State(state): State<AppState>,
    Query(query): Query<TopPostsQuery>,
) -> AppResult<Json<Vec<Post>>> {
    let limit = query.limit.unwrap_or(FEATURED_DEFAULT).clamp(1, TOP_MAX);
    Ok(Json(state.repo.top_posts(PostRanking::Likes, limit).await?))
}

/// get_popular_posts
///
/// [Public Route] Top visible posts by visit count (default 5).
#[utoipa::path(
    get,
    path = "/posts/popular",
    params(TopPostsQuery),
    responses((status = 200, description = "Popular posts", body = [Post]))
)]
pub async fn get_popular_posts(
    State(state): State<AppState>,
    Query(query): Query<TopPostsQuery>,
) -> AppResult<Json<Vec<Post>>> {
    let limit = query.limit.unwrap_or(POPULAR_DEFAULT).clamp(1, TOP_MAX);
    Ok(Json(state.repo.top_posts(PostRanking::Visits, limit).await?))
}

/// get_post
///
/// [Public Route] A single post by UUID or slug.
///
/// Hidden posts are only returned to their author and to general admins;
/// everyone else gets 404. Reading a visible post counts as a visit.
#[utoipa::path(
    get,
    path = "/posts/{id}",
    params(("id" = String, Path, description = "Post UUID or slug")),
    responses(
        (status = 200, description = "Post", body = Post),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_post(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<Json<Post>> {
    let post = match PostKey::parse(&key) {
        PostKey::Id(id) => state.repo.get_post(id).await?,
        PostKey::Slug(slug) => state.repo.get_post_by_slug(&slug).await?,
    }
    .ok_or(AppError::NotFound("post"))?;

    if post.is_visible() {
        state.repo.record_post_visit(post.id).await?;
        return Ok(Json(Post {
            visits: post.visits + 1,
            ..post
        }));
    }

    if can_see_hidden(&post, viewer.0.as_ref()) {
        Ok(Json(post))
    } else {
        Err(AppError::NotFound("post"))
    }
}

/// list_writer_posts
///
/// [Public Route] A writer's visible posts, newest first.
#[utoipa::path(
    get,
    path = "/writers/{id}/posts",
    params(PageQuery),
    responses((status = 200, description = "Writer posts", body = Page<Post>))
)]
pub async fn list_writer_posts(
    State(state): State<AppState>,
    Path(writer_id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<Page<Post>>> {
    let filter = PostFilter {
        visible_only: true,
        author_id: Some(writer_id),
        ..PostFilter::default()
    };
    Ok(Json(state.repo.list_posts(filter, query.resolve()?).await?))
}

/// get_my_posts
///
/// [Authenticated Route] All of the caller's posts, including drafts and
/// posts still waiting for approval.
#[utoipa::path(
    get,
    path = "/me/posts",
    params(PageQuery),
    responses((status = 200, description = "My posts", body = Page<Post>))
)]
pub async fn get_my_posts(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<Page<Post>>> {
    let filter = PostFilter {
        author_id: Some(id),
        ..PostFilter::default()
    };
    Ok(Json(state.repo.list_posts(filter, query.resolve()?).await?))
}

/// create_post
///
/// [Authenticated Route] Writers submit a new post. It starts as a pending
/// draft and stays hidden until an admin approves it and it is published.
#[utoipa::path(
    post,
    path = "/posts",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post created", body = Post),
        (status = 403, description = "Not a writer"),
        (status = 422, description = "Invalid input or unknown category")
    )
)]
pub async fn create_post(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreatePostRequest>,
) -> AppResult<(StatusCode, Json<Post>)> {
    if !user.is_writer() {
        return Err(AppError::Forbidden);
    }
    payload.validate()?;
    ensure_category(&state, &payload.cat).await?;

    let repo = state.repo.clone();
    let slug = slug::create_unique_slug(&payload.title, |candidate| {
        let repo = repo.clone();
        async move { repo.post_slug_exists(&candidate).await }
    })
    .await?;

    let post = state
        .repo
        .create_post(NewPost {
            author_id: user.id,
            slug,
            title: payload.title.trim().to_string(),
            desc: payload.desc,
            img: payload.img,
            cat: payload.cat,
        })
        .await?;

    tracing::info!(post_id = %post.id, author_id = %user.id, slug = %post.slug, "post submitted");
    Ok((StatusCode::CREATED, Json(post)))
}

/// update_post
///
/// [Authenticated Route] Partial update of the caller's own post. The slug and
/// moderation state are left alone. Posts owned by someone else answer 404.
#[utoipa::path(
    put,
    path = "/posts/{id}",
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Post updated", body = Post),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_post(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(mut payload): Json<UpdatePostRequest>,
) -> AppResult<Json<Post>> {
    payload.validate()?;
    payload.title = payload.title.map(|title| title.trim().to_string());
    if let Some(cat) = &payload.cat {
        ensure_category(&state, cat).await?;
    }

    let post = state
        .repo
        .update_post(id, user_id, payload)
        .await?
        .ok_or(AppError::NotFound("post"))?;
    Ok(Json(post))
}

/// update_post_status
///
/// [Authenticated Route] The author publishes or unpublishes their own post.
/// Publishing requires prior approval (409 otherwise).
#[utoipa::path(
    put,
    path = "/posts/{id}/status",
    request_body = PostStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = Post),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Post not approved yet")
    )
)]
pub async fn update_post_status(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PostStatusRequest>,
) -> AppResult<Json<Post>> {
    let post = state
        .repo
        .get_post(id)
        .await?
        .filter(|post| post.author_id == user_id)
        .ok_or(AppError::NotFound("post"))?;

    let action = ModerationAction::for_status(payload.status);
    Ok(Json(apply_moderation(&state, post, action).await?))
}

/// delete_post
///
/// [Authenticated Route] Deletes a post. Authors may delete their own posts;
/// general admins may delete any post.
#[utoipa::path(
    delete,
    path = "/posts/{id}",
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_post(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let deleted = if user.is_general_admin {
        state.repo.delete_post_admin(id).await?
    } else {
        state.repo.delete_post(id, user.id).await?
    };

    if deleted {
        tracing::info!(post_id = %id, user_id = %user.id, "post deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("post"))
    }
}

/// get_admin_posts
///
/// [Admin Route] Every post regardless of moderation state, filterable by
/// approval, status and search text.
#[utoipa::path(
    get,
    path = "/admin/posts",
    params(AdminPostQuery),
    responses((status = 200, description = "All posts", body = Page<Post>))
)]
pub async fn get_admin_posts(
    State(state): State<AppState>,
    Query(query): Query<AdminPostQuery>,
) -> AppResult<Json<Page<Post>>> {
    let page = query.page()?;
    Ok(Json(state.repo.list_posts(query.filter(), page).await?))
}

/// moderate_post
///
/// [Admin Route] Applies approve / unapprove / publish / unpublish.
#[utoipa::path(
    put,
    path = "/admin/posts/{id}/moderation",
    request_body = ModerationRequest,
    responses(
        (status = 200, description = "Moderation applied", body = Post),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Invalid transition")
    )
)]
pub async fn moderate_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ModerationRequest>,
) -> AppResult<Json<Post>> {
    let post = state
        .repo
        .get_post(id)
        .await?
        .ok_or(AppError::NotFound("post"))?;
    Ok(Json(apply_moderation(&state, post, payload.action).await?))
}

/// admin_delete_post
///
/// [Admin Route] Force-deletes any post.
#[utoipa::path(
    delete,
    path = "/admin/posts/{id}",
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn admin_delete_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if state.repo.delete_post_admin(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("post"))
    }
}
