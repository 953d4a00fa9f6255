/// Router Module Index
///
/// Routing is split by access level, and access control is applied per module
/// with Axum layers in `create_router`.

/// Routes open to anonymous callers. Post reads are restricted to visible posts.
pub mod public;

/// Routes behind the `AuthUser` middleware. Requires a valid session.
pub mod authenticated;

/// Routes behind the `AdminUser` middleware, nested under `/admin`.
pub mod admin;
