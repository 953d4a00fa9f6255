//! HTTP handlers, grouped by resource. Route wiring lives in `crate::routes`.

pub mod admin;
pub mod auth;
pub mod banners;
pub mod broadcast;
pub mod categories;
pub mod comments;
pub mod engagement;
pub mod posts;
pub mod uploads;
pub mod users;

use uuid::Uuid;

use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, AppResult},
    models::Post,
};

/// Loads a post that the public may interact with (approved and published).
/// Hidden posts answer 404, the same as missing ones.
pub(crate) async fn visible_post(state: &AppState, id: Uuid) -> AppResult<Post> {
    state
        .repo
        .get_post(id)
        .await?
        .filter(Post::is_visible)
        .ok_or(AppError::NotFound("post"))
}

/// Authors see their own hidden posts; general admins see everything.
pub(crate) fn can_see_hidden(post: &Post, viewer: Option<&AuthUser>) -> bool {
    viewer.is_some_and(|user| user.id == post.author_id || user.is_general_admin)
}
