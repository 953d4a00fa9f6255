use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    AppState,
    error::{AppError, AppResult},
    models::{
        CreateEpisodeRequest, CreatePodcastRequest, CreateShowRequest, Episode, Page, PageQuery,
        Podcast, ScheduleQuery, Show, UpdateEpisodeRequest, UpdatePodcastRequest,
        UpdateShowRequest, on_air, validate_day,
    },
    slug,
};

// --- Shows ---

/// list_shows
///
/// [Public Route] The weekly schedule: by day of week, then start time.
#[utoipa::path(
    get,
    path = "/shows",
    responses((status = 200, description = "Shows", body = [Show]))
)]
pub async fn list_shows(State(state): State<AppState>) -> AppResult<Json<Vec<Show>>> {
    Ok(Json(state.repo.list_shows(None).await?))
}

/// get_schedule
///
/// [Public Route] The shows of one day (0 = Monday ... 6 = Sunday).
/// Without `day`, the whole week is returned.
#[utoipa::path(
    get,
    path = "/shows/schedule",
    params(ScheduleQuery),
    responses(
        (status = 200, description = "Schedule", body = [Show]),
        (status = 422, description = "Day out of range")
    )
)]
pub async fn get_schedule(
    State(state): State<AppState>,
    Query(query): Query<ScheduleQuery>,
) -> AppResult<Json<Vec<Show>>> {
    if let Some(day) = query.day {
        validate_day(day)?;
    }
    Ok(Json(state.repo.list_shows(query.day).await?))
}

/// get_on_air
///
/// [Public Route] The show airing right now in the station's time zone.
/// Covers today's slots and the tail of yesterday's overnight slot.
#[utoipa::path(
    get,
    path = "/shows/on-air",
    responses(
        (status = 200, description = "On air", body = Show),
        (status = 404, description = "Nothing on air")
    )
)]
pub async fn get_on_air(State(state): State<AppState>) -> AppResult<Json<Show>> {
    let now = Utc::now().with_timezone(&state.config.station_tz).naive_local();
    let shows = state.repo.list_shows(None).await?;
    let show = on_air(&shows, now)
        .cloned()
        .ok_or(AppError::NotFound("show on air"))?;
    Ok(Json(show))
}

/// get_show
///
/// [Public Route] A show by slug.
#[utoipa::path(
    get,
    path = "/shows/{slug}",
    responses(
        (status = 200, description = "Show", body = Show),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<Show>> {
    let show = state
        .repo
        .get_show_by_slug(&slug)
        .await?
        .ok_or(AppError::NotFound("show"))?;
    Ok(Json(show))
}

/// list_show_episodes
///
/// [Public Route] Episodes of a show, newest first.
#[utoipa::path(
    get,
    path = "/shows/{slug}/episodes",
    params(PageQuery),
    responses(
        (status = 200, description = "Episodes", body = Page<Episode>),
        (status = 404, description = "Not Found")
    )
)]
pub async fn list_show_episodes(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<Page<Episode>>> {
    let page = query.resolve()?;
    let show = state
        .repo
        .get_show_by_slug(&slug)
        .await?
        .ok_or(AppError::NotFound("show"))?;
    Ok(Json(state.repo.list_episodes(show.id, page).await?))
}

/// create_show
///
/// [Admin Route] Adds a slot to the schedule.
#[utoipa::path(
    post,
    path = "/admin/shows",
    request_body = CreateShowRequest,
    responses(
        (status = 201, description = "Show created", body = Show),
        (status = 422, description = "Invalid slot")
    )
)]
pub async fn create_show(
    State(state): State<AppState>,
    Json(payload): Json<CreateShowRequest>,
) -> AppResult<(StatusCode, Json<Show>)> {
    payload.validate()?;

    let repo = state.repo.clone();
    let slug = slug::create_unique_slug(&payload.title, |candidate| {
        let repo = repo.clone();
        async move { repo.show_slug_exists(&candidate).await }
    })
    .await?;

    let show = state.repo.create_show(slug, payload).await?;
    tracing::info!(show_id = %show.id, day = show.day_of_week, "show scheduled");
    Ok((StatusCode::CREATED, Json(show)))
}

/// update_show
///
/// [Admin Route] Partial update; the resulting slot is validated as a whole.
#[utoipa::path(
    put,
    path = "/admin/shows/{id}",
    request_body = UpdateShowRequest,
    responses(
        (status = 200, description = "Show updated", body = Show),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_show(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateShowRequest>,
) -> AppResult<Json<Show>> {
    let current = state
        .repo
        .get_show(id)
        .await?
        .ok_or(AppError::NotFound("show"))?;
    payload.validate_against(&current)?;

    let show = state
        .repo
        .update_show(id, payload)
        .await?
        .ok_or(AppError::NotFound("show"))?;
    Ok(Json(show))
}

/// delete_show
///
/// [Admin Route] Removes a show and all of its episodes.
#[utoipa::path(
    delete,
    path = "/admin/shows/{id}",
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_show(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if state.repo.delete_show(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("show"))
    }
}

// --- Episodes ---

/// create_episode
///
/// [Admin Route] Adds an episode to a show. Episode numbers are unique per show (409).
#[utoipa::path(
    post,
    path = "/admin/shows/{id}/episodes",
    request_body = CreateEpisodeRequest,
    responses(
        (status = 201, description = "Episode created", body = Episode),
        (status = 404, description = "Show not found"),
        (status = 409, description = "Episode number taken")
    )
)]
pub async fn create_episode(
    State(state): State<AppState>,
    Path(show_id): Path<Uuid>,
    Json(payload): Json<CreateEpisodeRequest>,
) -> AppResult<(StatusCode, Json<Episode>)> {
    payload.validate()?;
    let show = state
        .repo
        .get_show(show_id)
        .await?
        .ok_or(AppError::NotFound("show"))?;

    let episode = state.repo.create_episode(show.id, payload).await?;
    Ok((StatusCode::CREATED, Json(episode)))
}

/// update_episode
#[utoipa::path(
    put,
    path = "/admin/episodes/{id}",
    request_body = UpdateEpisodeRequest,
    responses(
        (status = 200, description = "Episode updated", body = Episode),
        (status = 404, description = "Not Found"),
        (status = 409, description = "Episode number taken")
    )
)]
pub async fn update_episode(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEpisodeRequest>,
) -> AppResult<Json<Episode>> {
    payload.validate()?;
    let episode = state
        .repo
        .update_episode(id, payload)
        .await?
        .ok_or(AppError::NotFound("episode"))?;
    Ok(Json(episode))
}

/// delete_episode
#[utoipa::path(
    delete,
    path = "/admin/episodes/{id}",
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_episode(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if state.repo.delete_episode(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("episode"))
    }
}

// --- Podcasts ---

/// list_podcasts
///
/// [Public Route] Standalone podcasts, newest first.
#[utoipa::path(
    get,
    path = "/podcasts",
    params(PageQuery),
    responses((status = 200, description = "Podcasts", body = Page<Podcast>))
)]
pub async fn list_podcasts(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<Page<Podcast>>> {
    Ok(Json(state.repo.list_podcasts(query.resolve()?).await?))
}

/// get_podcast
#[utoipa::path(
    get,
    path = "/podcasts/{slug}",
    responses(
        (status = 200, description = "Podcast", body = Podcast),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_podcast(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<Podcast>> {
    let podcast = state
        .repo
        .get_podcast_by_slug(&slug)
        .await?
        .ok_or(AppError::NotFound("podcast"))?;
    Ok(Json(podcast))
}

/// create_podcast
///
/// [Admin Route] Publishes a podcast under a unique slug derived from its title.
#[utoipa::path(
    post,
    path = "/admin/podcasts",
    request_body = CreatePodcastRequest,
    responses((status = 201, description = "Podcast created", body = Podcast))
)]
pub async fn create_podcast(
    State(state): State<AppState>,
    Json(payload): Json<CreatePodcastRequest>,
) -> AppResult<(StatusCode, Json<Podcast>)> {
    payload.validate()?;

    let repo = state.repo.clone();
    let slug = slug::create_unique_slug(&payload.title, |candidate| {
        let repo = repo.clone();
        async move { repo.podcast_slug_exists(&candidate).await }
    })
    .await?;

    let podcast = state.repo.create_podcast(slug, payload).await?;
    Ok((StatusCode::CREATED, Json(podcast)))
}

/// update_podcast
#[utoipa::path(
    put,
    path = "/admin/podcasts/{id}",
    request_body = UpdatePodcastRequest,
    responses(
        (status = 200, description = "Podcast updated", body = Podcast),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_podcast(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePodcastRequest>,
) -> AppResult<Json<Podcast>> {
    payload.validate()?;
    let podcast = state
        .repo
        .update_podcast(id, payload)
        .await?
        .ok_or(AppError::NotFound("podcast"))?;
    Ok(Json(podcast))
}

/// delete_podcast
#[utoipa::path(
    delete,
    path = "/admin/podcasts/{id}",
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_podcast(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    if state.repo.delete_podcast(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("podcast"))
    }
}
