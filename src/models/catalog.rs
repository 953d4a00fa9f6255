use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::validation;

// --- Categories ---

/// Category
///
/// Editorial section posts are filed under (`Post::cat` holds its slug).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Category {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub desc: Option<String>,
    pub img: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateCategoryRequest {
    pub title: String,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub img: Option<String>,
}

impl CreateCategoryRequest {
    pub fn validate(&self) -> AppResult<()> {
        validation::required("title", &self.title, 100)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateCategoryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
}

impl UpdateCategoryRequest {
    pub fn validate(&self) -> AppResult<()> {
        match &self.title {
            Some(title) => validation::required("title", title, 100),
            None => Ok(()),
        }
    }
}

// --- Banners ---

/// BannerPlacement
///
/// Slot on the public site a banner is rendered into.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, sqlx::Type,
)]
#[sqlx(type_name = "banner_placement", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum BannerPlacement {
    HomeTop,
    Sidebar,
    InArticle,
    Footer,
}

/// Banner
///
/// A sponsored banner ad with an optional scheduling window.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct Banner {
    pub id: Uuid,
    pub title: String,
    pub img: String,
    pub link: String,
    pub placement: BannerPlacement,
    pub active: bool,
    #[ts(type = "string | null")]
    pub starts_at: Option<DateTime<Utc>>,
    #[ts(type = "string | null")]
    pub ends_at: Option<DateTime<Utc>>,
    pub clicks: i64,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

impl Banner {
    /// Active and inside its window (start inclusive, end exclusive).
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.active
            && self.starts_at.is_none_or(|start| start <= now)
            && self.ends_at.is_none_or(|end| now < end)
    }
}

fn check_window(starts_at: Option<DateTime<Utc>>, ends_at: Option<DateTime<Utc>>) -> AppResult<()> {
    match (starts_at, ends_at) {
        (Some(start), Some(end)) if end <= start => Err(AppError::validation(
            "banner window must end after it starts",
        )),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreateBannerRequest {
    pub title: String,
    pub img: String,
    pub link: String,
    pub placement: BannerPlacement,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    #[ts(type = "string | null")]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    #[ts(type = "string | null")]
    pub ends_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

impl CreateBannerRequest {
    pub fn validate(&self) -> AppResult<()> {
        validation::required("title", &self.title, 200)?;
        validation::required("img", &self.img, 1000)?;
        validation::url("link", &self.link)?;
        check_window(self.starts_at, self.ends_at)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UpdateBannerRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement: Option<BannerPlacement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(type = "string | null")]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(type = "string | null")]
    pub ends_at: Option<DateTime<Utc>>,
}

impl UpdateBannerRequest {
    /// Validates the update against the banner it will be applied to.
    pub fn validate_against(&self, current: &Banner) -> AppResult<()> {
        if let Some(title) = &self.title {
            validation::required("title", title, 200)?;
        }
        if let Some(link) = &self.link {
            validation::url("link", link)?;
        }
        check_window(
            self.starts_at.or(current.starts_at),
            self.ends_at.or(current.ends_at),
        )
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, utoipa::IntoParams)]
pub struct BannerQuery {
    pub placement: Option<BannerPlacement>,
}

/// BannerClick
///
/// Returned by the click tracker so the client can follow the link.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct BannerClick {
    pub id: Uuid,
    pub link: String,
    pub clicks: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn banner(start: Option<i64>, end: Option<i64>, active: bool) -> (Banner, DateTime<Utc>) {
        let now = Utc::now();
        let banner = Banner {
            id: Uuid::new_v4(),
            title: "Sponsor".into(),
            img: "banners/a.png".into(),
            link: "https://sponsor.example".into(),
            placement: BannerPlacement::Sidebar,
            active,
            starts_at: start.map(|h| now + Duration::hours(h)),
            ends_at: end.map(|h| now + Duration::hours(h)),
            clicks: 0,
            created_at: now,
        };
        (banner, now)
    }

    #[test]
    fn open_window_is_live() {
        let (b, now) = banner(None, None, true);
        assert!(b.is_live(now));
    }

    #[test]
    fn inactive_is_never_live() {
        let (b, now) = banner(None, None, false);
        assert!(!b.is_live(now));
    }

    #[test]
    fn window_bounds() {
        let (future, now) = banner(Some(1), None, true);
        assert!(!future.is_live(now));
        let (expired, now) = banner(Some(-3), Some(-1), true);
        assert!(!expired.is_live(now));
        let (running, now) = banner(Some(-1), Some(1), true);
        assert!(running.is_live(now));
    }

    #[test]
    fn inverted_window_is_rejected() {
        let now = Utc::now();
        let req = CreateBannerRequest {
            title: "Sponsor".into(),
            img: "banners/a.png".into(),
            link: "https://sponsor.example".into(),
            placement: BannerPlacement::Footer,
            active: true,
            starts_at: Some(now),
            ends_at: Some(now - Duration::minutes(5)),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn update_window_checked_against_current() {
        let (current, now) = banner(Some(0), Some(5), true);
        let update = UpdateBannerRequest {
            starts_at: Some(now + Duration::hours(6)),
            ..UpdateBannerRequest::default()
        };
        assert!(update.validate_against(&current).is_err());
    }
}
