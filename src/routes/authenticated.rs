use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, post, put},
};

/// Authenticated Router Module
///
/// Routes for any signed-in account, reader or writer. The router is wrapped
/// in the auth middleware by `create_router`, and every handler also takes the
/// `AuthUser` extractor for its ownership checks (`update_post`,
/// `delete_post`, `delete_comment`, ...).
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // POST /upload/presigned
        // Short-lived (10-minute) presigned PUT URL for images and audio.
        .route(
            "/upload/presigned",
            post(handlers::uploads::get_presigned_url),
        )
        // --- Account ---
        .route(
            "/me",
            get(handlers::users::get_me).put(handlers::users::update_me),
        )
        // GET /me/posts
        // Includes drafts and posts still waiting for approval.
        .route("/me/posts", get(handlers::posts::get_my_posts))
        .route("/me/following", get(handlers::engagement::list_following))
        // --- Posts ---
        // POST /posts
        // Writers only; anyone else gets 403.
        .route("/posts", post(handlers::posts::create_post))
        .route(
            "/posts/{id}",
            put(handlers::posts::update_post).delete(handlers::posts::delete_post),
        )
        // PUT /posts/{id}/status
        // Author-side publish / unpublish through the moderation state machine.
        .route(
            "/posts/{id}/status",
            put(handlers::posts::update_post_status),
        )
        // --- Engagement ---
        .route(
            "/posts/{id}/comments",
            post(handlers::comments::add_comment),
        )
        .route("/comments/{id}", delete(handlers::comments::delete_comment))
        .route(
            "/posts/{id}/like",
            post(handlers::engagement::like_post).delete(handlers::engagement::unlike_post),
        )
        .route(
            "/writers/{id}/follow",
            post(handlers::engagement::follow_writer)
                .delete(handlers::engagement::unfollow_writer),
        )
}
