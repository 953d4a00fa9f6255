use crate::{AppState, handlers, rate_limit};
use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;

/// Public Router Module
///
/// Endpoints reachable without a session: the read side of the site, the
/// sign-in flows, banner click tracking and share tracking.
///
/// Visibility Mandate:
/// Post reads only return approved and published posts. The handlers enforce
/// this through `PostFilter::visible_only` and `handlers::visible_post`; the
/// single-post read additionally lets authors and admins see hidden posts.
pub fn public_routes(limiter: Arc<rate_limit::RateLimiter>) -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for the load balancer.
        .route("/health", get(|| async { "ok" }))
        .merge(auth_routes(limiter))
        // --- Posts ---
        .route("/posts", get(handlers::posts::list_posts))
        .route("/posts/featured", get(handlers::posts::get_featured_posts))
        .route("/posts/popular", get(handlers::posts::get_popular_posts))
        // GET /posts/{id}
        // Accepts a UUID or a slug.
        .route("/posts/{id}", get(handlers::posts::get_post))
        .route("/posts/{id}/comments", get(handlers::comments::get_comments))
        .route("/posts/{id}/likes", get(handlers::engagement::get_likes))
        // POST /posts/{id}/share
        // Anonymous shares are recorded too; signed-in callers are attributed.
        .route("/posts/{id}/share", post(handlers::engagement::share_post))
        // --- Writers ---
        .route("/writers", get(handlers::users::list_writers))
        .route("/writers/{id}", get(handlers::users::get_writer))
        .route("/writers/{id}/posts", get(handlers::posts::list_writer_posts))
        .route(
            "/writers/{id}/followers",
            get(handlers::engagement::list_followers),
        )
        .route(
            "/writers/{id}/follow",
            get(handlers::engagement::get_follow_summary),
        )
        // --- Catalog ---
        .route("/categories", get(handlers::categories::list_categories))
        .route("/categories/{slug}", get(handlers::categories::get_category))
        .route("/shows", get(handlers::broadcast::list_shows))
        .route("/shows/schedule", get(handlers::broadcast::get_schedule))
        .route("/shows/on-air", get(handlers::broadcast::get_on_air))
        .route("/shows/{slug}", get(handlers::broadcast::get_show))
        .route(
            "/shows/{slug}/episodes",
            get(handlers::broadcast::list_show_episodes),
        )
        .route("/podcasts", get(handlers::broadcast::list_podcasts))
        .route("/podcasts/{slug}", get(handlers::broadcast::get_podcast))
        // --- Banners ---
        .route("/banners", get(handlers::banners::get_banners))
        .route("/banners/{id}/click", post(handlers::banners::click_banner))
}

/// The sign-in endpoints, throttled per client address.
fn auth_routes(limiter: Arc<rate_limit::RateLimiter>) -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/google", post(handlers::auth::google_login))
        .route("/auth/supabase", post(handlers::auth::supabase_login))
        .route_layer(middleware::from_fn_with_state(
            limiter,
            rate_limit::limit_auth_requests,
        ))
}
