//! Post moderation lifecycle.
//!
//! A post carries two persisted fields, `approved` and `status`. Together they
//! describe three states:
//!
//! | approved | status      | state       |
//! |----------|-------------|-------------|
//! | false    | draft       | `Pending`   |
//! | true     | draft       | `Approved`  |
//! | true     | published   | `Published` |
//!
//! `approved = false, status = published` is not a valid combination. Every
//! transition goes through [`transition`], so that combination is never written.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::models::PostStatus;

/// ModerationState
///
/// The derived lifecycle position of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ModerationState {
    Pending,
    Approved,
    Published,
}

/// ModerationAction
///
/// The moves admins (all four) and authors (`publish`/`unpublish` only) can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ModerationAction {
    Approve,
    Unapprove,
    Publish,
    Unpublish,
}

impl ModerationState {
    pub fn from_fields(approved: bool, status: PostStatus) -> Self {
        match (approved, status) {
            (true, PostStatus::Published) => ModerationState::Published,
            (true, PostStatus::Draft) => ModerationState::Approved,
            // A stray published-but-unapproved row is treated as pending.
            (false, _) => ModerationState::Pending,
        }
    }

    pub fn into_fields(self) -> (bool, PostStatus) {
        match self {
            ModerationState::Pending => (false, PostStatus::Draft),
            ModerationState::Approved => (true, PostStatus::Draft),
            ModerationState::Published => (true, PostStatus::Published),
        }
    }

    pub fn is_public(self) -> bool {
        self == ModerationState::Published
    }
}

impl ModerationAction {
    /// Actions a post's own author may take without admin rights.
    pub fn allowed_for_author(self) -> bool {
        matches!(self, ModerationAction::Publish | ModerationAction::Unpublish)
    }

    pub fn for_status(status: PostStatus) -> Self {
        match status {
            PostStatus::Published => ModerationAction::Publish,
            PostStatus::Draft => ModerationAction::Unpublish,
        }
    }
}

/// transition
///
/// Applies `action` to the current state. Repeating an action is a no-op;
/// publishing a post that has not been approved is rejected.
pub fn transition(current: ModerationState, action: ModerationAction) -> AppResult<ModerationState> {
    use ModerationAction::*;
    use ModerationState::*;

    match (current, action) {
        (Pending, Approve) => Ok(Approved),
        (Approved | Published, Approve) => Ok(current),
        (_, Unapprove) => Ok(Pending),
        (Approved | Published, Publish) => Ok(Published),
        (Pending, Publish) => Err(AppError::InvalidTransition(
            "post must be approved before it can be published".to_string(),
        )),
        (Published, Unpublish) => Ok(Approved),
        (Pending | Approved, Unpublish) => Ok(current),
    }
}

#[cfg(test)]
mod tests {
    use super::ModerationAction::*;
    use super::ModerationState::*;
    use super::*;

    #[test]
    fn happy_path_reaches_published() {
        let approved = transition(Pending, Approve).unwrap();
        assert_eq!(approved, Approved);
        assert_eq!(transition(approved, Publish).unwrap(), Published);
    }

    #[test]
    fn publish_requires_approval() {
        let err = transition(Pending, Publish).unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
    }

    #[test]
    fn unapprove_unpublishes() {
        assert_eq!(transition(Published, Unapprove).unwrap(), Pending);
        assert_eq!(Pending.into_fields(), (false, PostStatus::Draft));
    }

    #[test]
    fn unpublish_keeps_approval() {
        assert_eq!(transition(Published, Unpublish).unwrap(), Approved);
        assert_eq!(transition(Pending, Unpublish).unwrap(), Pending);
    }

    #[test]
    fn repeated_actions_are_noops() {
        assert_eq!(transition(Approved, Approve).unwrap(), Approved);
        assert_eq!(transition(Published, Publish).unwrap(), Published);
    }

    #[test]
    fn no_transition_yields_unapproved_published() {
        for state in [Pending, Approved, Published] {
            for action in [Approve, Unapprove, Publish, Unpublish] {
                if let Ok(next) = transition(state, action) {
                    let (approved, status) = next.into_fields();
                    assert!(approved || status == PostStatus::Draft);
                }
            }
        }
    }

    #[test]
    fn inconsistent_row_reads_as_pending() {
        assert_eq!(
            ModerationState::from_fields(false, PostStatus::Published),
            Pending
        );
    }

    #[test]
    fn authors_only_toggle_publication() {
        assert!(Publish.allowed_for_author());
        assert!(Unpublish.allowed_for_author());
        assert!(!Approve.allowed_for_author());
        assert!(!Unapprove.allowed_for_author());
    }
}
