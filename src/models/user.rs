use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppResult;
use crate::validation;

/// AccountType
///
/// Readers can comment, like, follow and share. Writers can additionally author posts.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema, sqlx::Type,
)]
#[sqlx(type_name = "account_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum AccountType {
    #[default]
    Reader,
    Writer,
}

/// AuthProvider
///
/// How the account was first created.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema, sqlx::Type,
)]
#[sqlx(type_name = "auth_provider", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum AuthProvider {
    #[default]
    Credentials,
    Google,
    Supabase,
}

/// User
///
/// A row of the `users` table. The password hash is never serialized; accounts
/// created through Google or Supabase have none.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip)]
    #[ts(skip)]
    pub password_hash: Option<String>,
    pub img: Option<String>,
    pub bio: Option<String>,
    pub account_type: AccountType,
    pub is_general_admin: bool,
    pub auth_provider: AuthProvider,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_writer(&self) -> bool {
        self.account_type == AccountType::Writer
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.username.clone(),
            img: self.img.clone(),
            bio: self.bio.clone(),
            account_type: self.account_type,
        }
    }
}

/// NewUser
///
/// Insertion payload for `Repository::create_user`.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub img: Option<String>,
    pub account_type: AccountType,
    pub auth_provider: AuthProvider,
}

/// UserProfile
///
/// Public projection of a user (no email, no flags).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default, PartialEq)]
#[ts(export)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub img: Option<String>,
    pub bio: Option<String>,
    pub account_type: AccountType,
}

/// WriterProfile
///
/// A writer's public card with follower and published post counts.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct WriterProfile {
    pub id: Uuid,
    pub username: String,
    pub img: Option<String>,
    pub bio: Option<String>,
    pub followers: i64,
    pub posts: i64,
}

// --- Auth payloads ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub account_type: AccountType,
}

impl RegisterRequest {
    pub fn validate(&self) -> AppResult<()> {
        validation::username(&self.username)?;
        validation::email(&self.email)?;
        validation::password(&self.password)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct GoogleLoginRequest {
    /// The ID token returned by Google Identity Services on the client.
    pub id_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SupabaseLoginRequest {
    /// A Supabase session access token.
    pub access_token: String,
}

/// AuthResponse
///
/// Returned by every login flow. The token is sent back as `Authorization: Bearer`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl UpdateProfileRequest {
    pub fn validate(&self) -> AppResult<()> {
        if let Some(username) = &self.username {
            validation::username(username)?;
        }
        if let Some(bio) = &self.bio {
            validation::max_len("bio", bio, 500)?;
        }
        Ok(())
    }
}

/// UpdateRolesRequest
///
/// Admin payload for promoting/demoting accounts.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UpdateRolesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_type: Option<AccountType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_general_admin: Option<bool>,
}
