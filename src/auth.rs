use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, header, request::Parts},
};
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    error::AppError,
    models::{AccountType, User},
    repository::RepositoryState,
    security,
};

/// AuthUser Extractor Result
///
/// The resolved identity of an authenticated request. Handlers use it for the
/// caller's id and for writer/admin permission checks.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: Uuid,
    pub account_type: AccountType,
    pub is_general_admin: bool,
}

impl AuthUser {
    pub fn is_writer(&self) -> bool {
        self.account_type == AccountType::Writer
    }
}

impl From<&User> for AuthUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            account_type: user.account_type,
            is_general_admin: user.is_general_admin,
        }
    }
}

/// Local development bypass: `x-user-id: <uuid>` naming an existing user.
async fn local_bypass(
    headers: &HeaderMap,
    repo: &RepositoryState,
) -> Result<Option<AuthUser>, AppError> {
    let Some(user_id) = headers
        .get("x-user-id")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value).ok())
    else {
        return Ok(None);
    };
    Ok(repo.get_user(user_id).await?.as_ref().map(AuthUser::from))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// AuthUser Extractor Implementation
///
/// 1. In `Env::Local`, an `x-user-id` header naming an existing user wins.
/// 2. Otherwise a `Bearer` token is required and must verify against the
///    configured secret.
/// 3. The subject must still exist, so deleted accounts lose access
///    immediately and role changes apply on the next request.
///
/// Rejection: `AppError::Unauthorized` (401) on any failure.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        if config.env == Env::Local {
            if let Some(user) = local_bypass(&parts.headers, &repo).await? {
                return Ok(user);
            }
        }

        let token = bearer_token(&parts.headers).ok_or(AppError::Unauthorized)?;
        let claims = security::verify_token(token, &config.jwt_secret)?;

        let user = repo
            .get_user(claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)?;

        Ok(AuthUser::from(&user))
    }
}

/// MaybeAuthUser
///
/// Optional identity for public endpoints that personalise their answer
/// (`liked`, `following`) or attribute an action (share logs). A missing or
/// invalid credential yields an anonymous caller instead of a 401.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl MaybeAuthUser {
    pub fn id(&self) -> Option<Uuid> {
        self.0.as_ref().map(|user| user.id)
    }
}

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match AuthUser::from_request_parts(parts, state).await {
            Ok(user) => Ok(MaybeAuthUser(Some(user))),
            Err(AppError::Unauthorized) => Ok(MaybeAuthUser(None)),
            Err(other) => Err(other),
        }
    }
}

/// AdminUser
///
/// An authenticated caller holding the general admin flag. Anyone else gets 403.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_general_admin {
            return Err(AppError::Forbidden);
        }
        Ok(AdminUser(user))
    }
}
