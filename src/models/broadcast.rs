use chrono::{DateTime, Datelike, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::validation;

// --- Shows ---

/// Show
///
/// A recurring slot on the weekly schedule. `day_of_week` runs from 0 (Monday)
/// to 6 (Sunday). A slot whose `end_time` is not after `start_time` runs past
/// midnight into the next day.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct Show {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub desc: Option<String>,
    pub img: Option<String>,
    pub host: String,
    pub day_of_week: i16,
    #[schema(value_type = String, example = "07:00:00")]
    #[ts(type = "string")]
    pub start_time: NaiveTime,
    #[schema(value_type = String, example = "10:00:00")]
    #[ts(type = "string")]
    pub end_time: NaiveTime,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

impl Show {
    pub fn is_overnight(&self) -> bool {
        self.end_time <= self.start_time
    }

    /// Whether the slot covers `now`, which must be in station time.
    pub fn covers(&self, now: NaiveDateTime) -> bool {
        let today = now.weekday().num_days_from_monday() as i16;
        let yesterday = (today + 6) % 7;
        let time = now.time();

        if self.day_of_week == today {
            if self.is_overnight() {
                time >= self.start_time
            } else {
                self.start_time <= time && time < self.end_time
            }
        } else {
            self.day_of_week == yesterday && self.is_overnight() && time < self.end_time
        }
    }
}

/// on_air
///
/// Picks the show airing at `now` (station-local). Today's slots win over the
/// tail of yesterday's overnight slot.
pub fn on_air(shows: &[Show], now: NaiveDateTime) -> Option<&Show> {
    let today = now.weekday().num_days_from_monday() as i16;
    shows
        .iter()
        .filter(|show| show.covers(now))
        .min_by_key(|show| if show.day_of_week == today { 0 } else { 1 })
}

pub fn validate_day(day: i16) -> AppResult<()> {
    if (0..=6).contains(&day) {
        Ok(())
    } else {
        Err(AppError::validation("day_of_week must be between 0 and 6"))
    }
}

fn validate_slot(start: NaiveTime, end: NaiveTime) -> AppResult<()> {
    if start == end {
        return Err(AppError::validation("show must end at a different time than it starts"));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreateShowRequest {
    pub title: String,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub img: Option<String>,
    pub host: String,
    pub day_of_week: i16,
    #[schema(value_type = String, example = "07:00:00")]
    #[ts(type = "string")]
    pub start_time: NaiveTime,
    #[schema(value_type = String, example = "10:00:00")]
    #[ts(type = "string")]
    pub end_time: NaiveTime,
}

impl CreateShowRequest {
    pub fn validate(&self) -> AppResult<()> {
        validation::required("title", &self.title, 200)?;
        validation::required("host", &self.host, 100)?;
        validate_day(self.day_of_week)?;
        validate_slot(self.start_time, self.end_time)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UpdateShowRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<i16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    #[ts(type = "string | null")]
    pub start_time: Option<NaiveTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    #[ts(type = "string | null")]
    pub end_time: Option<NaiveTime>,
}

impl UpdateShowRequest {
    pub fn validate_against(&self, current: &Show) -> AppResult<()> {
        if let Some(title) = &self.title {
            validation::required("title", title, 200)?;
        }
        if let Some(host) = &self.host {
            validation::required("host", host, 100)?;
        }
        if let Some(day) = self.day_of_week {
            validate_day(day)?;
        }
        validate_slot(
            self.start_time.unwrap_or(current.start_time),
            self.end_time.unwrap_or(current.end_time),
        )
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, utoipa::IntoParams)]
pub struct ScheduleQuery {
    /// 0 = Monday ... 6 = Sunday
    pub day: Option<i16>,
}

// --- Episodes ---

/// Episode
///
/// A recorded broadcast of a show.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct Episode {
    pub id: Uuid,
    pub show_id: Uuid,
    pub title: String,
    pub desc: Option<String>,
    pub audio_url: String,
    pub duration_secs: i32,
    pub episode_number: i32,
    #[ts(type = "string")]
    pub published_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreateEpisodeRequest {
    pub title: String,
    #[serde(default)]
    pub desc: Option<String>,
    pub audio_url: String,
    pub duration_secs: i32,
    pub episode_number: i32,
    // Defaults to now.
    #[serde(default)]
    #[ts(type = "string | null")]
    pub published_at: Option<DateTime<Utc>>,
}

impl CreateEpisodeRequest {
    pub fn validate(&self) -> AppResult<()> {
        validation::required("title", &self.title, 200)?;
        validation::required("audio_url", &self.audio_url, 1000)?;
        validate_counts(self.duration_secs, self.episode_number)
    }
}

fn validate_counts(duration_secs: i32, episode_number: i32) -> AppResult<()> {
    if duration_secs < 0 {
        return Err(AppError::validation("duration_secs cannot be negative"));
    }
    if episode_number < 1 {
        return Err(AppError::validation("episode_number starts at 1"));
    }
    Ok(())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UpdateEpisodeRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode_number: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(type = "string | null")]
    pub published_at: Option<DateTime<Utc>>,
}

impl UpdateEpisodeRequest {
    pub fn validate(&self) -> AppResult<()> {
        if let Some(title) = &self.title {
            validation::required("title", title, 200)?;
        }
        validate_counts(
            self.duration_secs.unwrap_or(0),
            self.episode_number.unwrap_or(1),
        )
    }
}

// --- Podcasts ---

/// Podcast
///
/// A standalone on-demand audio piece, not tied to the schedule.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct Podcast {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub desc: Option<String>,
    pub img: Option<String>,
    pub audio_url: String,
    pub host: Option<String>,
    pub duration_secs: i32,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreatePodcastRequest {
    pub title: String,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub img: Option<String>,
    pub audio_url: String,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub duration_secs: i32,
}

impl CreatePodcastRequest {
    pub fn validate(&self) -> AppResult<()> {
        validation::required("title", &self.title, 200)?;
        validation::required("audio_url", &self.audio_url, 1000)?;
        if self.duration_secs < 0 {
            return Err(AppError::validation("duration_secs cannot be negative"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UpdatePodcastRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<i32>,
}

impl UpdatePodcastRequest {
    pub fn validate(&self) -> AppResult<()> {
        if let Some(title) = &self.title {
            validation::required("title", title, 200)?;
        }
        if let Some(audio_url) = &self.audio_url {
            validation::required("audio_url", audio_url, 1000)?;
        }
        if self.duration_secs.is_some_and(|d| d < 0) {
            return Err(AppError::validation("duration_secs cannot be negative"));
        }
        Ok(())
    }
}
