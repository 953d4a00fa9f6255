use axum::{
    Router,
    extract::{FromRef, Request},
    http::{HeaderName, HeaderValue},
    middleware::{self, Next},
    response::Response,
};
use std::sync::Arc;
use std::time::Duration;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod models;
pub mod moderation;
pub mod rate_limit;
pub mod repository;
pub mod security;
pub mod slug;
pub mod storage;
pub mod validation;

// Routing segregated by access level (public, authenticated, admin).
pub mod routes;
use auth::{AdminUser, AuthUser};
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use identity::{HttpIdentityProvider, IdentityState, MockIdentityProvider};
pub use rate_limit::RateLimiter;
pub use repository::{MemoryRepository, PostgresRepository, RepositoryState};
pub use storage::{MockStorageService, S3StorageClient, StorageState};

/// ApiDoc
///
/// Aggregates every `#[utoipa::path]` handler and `ToSchema` model into the
/// OpenAPI document served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::register, handlers::auth::login, handlers::auth::google_login,
        handlers::auth::supabase_login,
        handlers::users::get_me, handlers::users::update_me, handlers::users::list_writers,
        handlers::users::get_writer, handlers::users::list_users, handlers::users::update_roles,
        handlers::users::delete_user,
        handlers::posts::list_posts, handlers::posts::get_featured_posts,
        handlers::posts::get_popular_posts, handlers::posts::get_post,
        handlers::posts::list_writer_posts, handlers::posts::get_my_posts,
        handlers::posts::create_post, handlers::posts::update_post,
        handlers::posts::update_post_status, handlers::posts::delete_post,
        handlers::posts::get_admin_posts, handlers::posts::moderate_post,
        handlers::posts::admin_delete_post,
        handlers::comments::add_comment, handlers::comments::get_comments,
        handlers::comments::delete_comment,
        handlers::engagement::like_post, handlers::engagement::unlike_post,
        handlers::engagement::get_likes, handlers::engagement::follow_writer,
        handlers::engagement::unfollow_writer, handlers::engagement::get_follow_summary,
        handlers::engagement::list_followers, handlers::engagement::list_following,
        handlers::engagement::share_post,
        handlers::categories::list_categories, handlers::categories::get_category,
        handlers::categories::create_category, handlers::categories::update_category,
        handlers::categories::delete_category,
        handlers::broadcast::list_shows, handlers::broadcast::get_schedule,
        handlers::broadcast::get_on_air, handlers::broadcast::get_show,
        handlers::broadcast::list_show_episodes, handlers::broadcast::create_show,
        handlers::broadcast::update_show, handlers::broadcast::delete_show,
        handlers::broadcast::create_episode, handlers::broadcast::update_episode,
        handlers::broadcast::delete_episode, handlers::broadcast::list_podcasts,
        handlers::broadcast::get_podcast, handlers::broadcast::create_podcast,
        handlers::broadcast::update_podcast, handlers::broadcast::delete_podcast,
        handlers::banners::get_banners, handlers::banners::click_banner,
        handlers::banners::get_admin_banners, handlers::banners::create_banner,
        handlers::banners::update_banner, handlers::banners::delete_banner,
        handlers::uploads::get_presigned_url,
        handlers::admin::get_admin_stats, handlers::admin::get_share_stats,
    ),
    components(
        schemas(
            models::User, models::UserProfile, models::WriterProfile, models::AccountType,
            models::AuthProvider, models::RegisterRequest, models::LoginRequest,
            models::GoogleLoginRequest, models::SupabaseLoginRequest, models::AuthResponse,
            models::UpdateProfileRequest, models::UpdateRolesRequest,
            models::Post, models::PostStatus, models::CreatePostRequest,
            models::UpdatePostRequest, models::PostStatusRequest, models::ModerationRequest,
            moderation::ModerationAction, moderation::ModerationState,
            models::Comment, models::CreateCommentRequest, models::LikeSummary,
            models::FollowSummary, models::SharePlatform, models::ShareMethod,
            models::ShareLog, models::ShareRequest, models::ShareResponse, models::ShareStat,
            models::Category, models::CreateCategoryRequest, models::UpdateCategoryRequest,
            models::Show, models::CreateShowRequest, models::UpdateShowRequest,
            models::Episode, models::CreateEpisodeRequest, models::UpdateEpisodeRequest,
            models::Podcast, models::CreatePodcastRequest, models::UpdatePodcastRequest,
            models::Banner, models::BannerPlacement, models::CreateBannerRequest,
            models::UpdateBannerRequest, models::BannerClick,
            models::UploadKind, models::PresignedUrlRequest, models::PresignedUrlResponse,
            models::AdminDashboardStats,
        )
    ),
    tags(
        (name = "radio-portal", description = "Radio station content platform API")
    )
)]
pub struct ApiDoc;

/// AppState
///
/// The single shared container for every service a handler may need. Cloned
/// per request; all members are cheap handles.
#[derive(Clone)]
pub struct AppState {
    /// Persistence: Postgres in production, in-memory in tests.
    pub repo: RepositoryState,
    /// Object storage: S3/MinIO presigned URLs.
    pub storage: StorageState,
    /// Google / Supabase token verification.
    pub identity: IdentityState,
    pub config: AppConfig,
    /// Throttles the `/auth/*` routes.
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(
        repo: RepositoryState,
        storage: StorageState,
        identity: IdentityState,
        config: AppConfig,
    ) -> Self {
        let rate_limiter = Arc::new(RateLimiter::new(
            Duration::from_secs(config.auth_rate_limit_window_secs),
            config.auth_rate_limit_max,
        ));
        Self {
            repo,
            storage,
            identity,
            config,
            rate_limiter,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

// Lets extractors pull single components out of the shared AppState.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for IdentityState {
    fn from_ref(app_state: &AppState) -> IdentityState {
        app_state.identity.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Enforces authentication for `authenticated_routes`. Resolving `AuthUser`
/// rejects the request with 401 before the handler runs when the session is
/// missing, invalid, or belongs to a deleted account.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// admin_middleware
///
/// Same as `auth_middleware`, plus the general admin flag (403 otherwise).
async fn admin_middleware(AdminUser(admin): AdminUser, request: Request, next: Next) -> Response {
    tracing::debug!(admin_id = %admin.id, uri = %request.uri(), "admin request");
    next.run(request).await
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if parsed.is_empty() {
        base.allow_origin(Any)
    } else {
        base.allow_origin(AllowOrigin::list(parsed))
    }
}

/// create_router
///
/// Assembles the route modules, applies the scoped auth layers and the global
/// observability stack, and binds the state.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes(state.rate_limiter.clone()))
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .nest(
            "/admin",
            admin::admin_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                admin_middleware,
            )),
        )
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                // Every request gets a UUID x-request-id...
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // ...which the trace span carries...
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // ...and the response echoes back.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Builds the per-request span with method, URI and request id so every log
/// line of one request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
