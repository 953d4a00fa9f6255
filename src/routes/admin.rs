use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Admin Router Module
///
/// Moderation and content management, nested under `/admin`.
///
/// Access Control:
/// `create_router` wraps this router in the admin middleware, which resolves
/// the `AdminUser` extractor: no session answers 401, a session without the
/// general admin flag answers 403.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin/stats
        // Dashboard totals (users, writers, posts, pending, published, engagement).
        .route("/stats", get(handlers::admin::get_admin_stats))
        // GET /admin/shares?post_id=
        .route("/shares", get(handlers::admin::get_share_stats))
        // --- Users ---
        .route("/users", get(handlers::users::list_users))
        .route("/users/{id}", axum::routing::delete(handlers::users::delete_user))
        .route("/users/{id}/roles", put(handlers::users::update_roles))
        // --- Posts ---
        // GET /admin/posts
        // Every post regardless of moderation state; the review queue is
        // `?approved=false`.
        .route("/posts", get(handlers::posts::get_admin_posts))
        .route(
            "/posts/{id}",
            axum::routing::delete(handlers::posts::admin_delete_post),
        )
        // PUT /admin/posts/{id}/moderation
        // approve / unapprove / publish / unpublish.
        .route(
            "/posts/{id}/moderation",
            put(handlers::posts::moderate_post),
        )
        // --- Categories ---
        .route(
            "/categories",
            post(handlers::categories::create_category),
        )
        .route(
            "/categories/{id}",
            put(handlers::categories::update_category)
                .delete(handlers::categories::delete_category),
        )
        // --- Shows, episodes, podcasts ---
        .route("/shows", post(handlers::broadcast::create_show))
        .route(
            "/shows/{id}",
            put(handlers::broadcast::update_show).delete(handlers::broadcast::delete_show),
        )
        .route(
            "/shows/{id}/episodes",
            post(handlers::broadcast::create_episode),
        )
        .route(
            "/episodes/{id}",
            put(handlers::broadcast::update_episode).delete(handlers::broadcast::delete_episode),
        )
        .route("/podcasts", post(handlers::broadcast::create_podcast))
        .route(
            "/podcasts/{id}",
            put(handlers::broadcast::update_podcast)
                .delete(handlers::broadcast::delete_podcast),
        )
        // --- Banners ---
        .route(
            "/banners",
            get(handlers::banners::get_admin_banners).post(handlers::banners::create_banner),
        )
        .route(
            "/banners/{id}",
            put(handlers::banners::update_banner).delete(handlers::banners::delete_banner),
        )
}
