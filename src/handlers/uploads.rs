use axum::{Json, extract::State};
use uuid::Uuid;

use crate::{
    AppState,
    auth::AuthUser,
    error::AppResult,
    models::{PresignedUrlRequest, PresignedUrlResponse},
};

/// get_presigned_url
///
/// [Authenticated Route] Initiates a direct-to-storage upload.
///
/// *Flow*:
/// 1. The kind decides the key prefix and which MIME types are accepted.
/// 2. The object key is `{prefix}/{uuid}.{ext}`.
/// 3. The storage service signs a PUT URL bound to the declared Content-Type.
///
/// The client PUTs the file to `upload_url`, then saves `resource_key` on the
/// post, profile, show, episode, podcast or banner it belongs to.
#[utoipa::path(
    post,
    path = "/upload/presigned",
    request_body = PresignedUrlRequest,
    responses(
        (status = 200, description = "URL Generated", body = PresignedUrlResponse),
        (status = 422, description = "File type not allowed for this kind")
    )
)]
pub async fn get_presigned_url(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<PresignedUrlRequest>,
) -> AppResult<Json<PresignedUrlResponse>> {
    payload.validate()?;

    let key = payload.object_key(Uuid::new_v4());
    let upload_url = state
        .storage
        .get_presigned_upload_url(&key, &payload.file_type)
        .await?;

    tracing::debug!(%user_id, %key, kind = ?payload.kind, "presigned upload issued");
    Ok(Json(PresignedUrlResponse {
        upload_url,
        resource_key: key,
    }))
}
