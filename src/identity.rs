//! External identity verification for the Google and Supabase sign-in flows.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::SupabaseConfig;
use crate::error::{AppError, AppResult};
use crate::models::AuthProvider;

const GOOGLE_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// ExternalIdentity
///
/// A verified identity asserted by a third-party provider. The email is the
/// join key onto local accounts.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalIdentity {
    pub email: String,
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub provider: AuthProvider,
}

/// IdentityProvider
///
/// Verifies tokens minted by external providers. Swapped for
/// `MockIdentityProvider` in tests so no network calls are made.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verifies a Google ID token and returns the identity it asserts.
    async fn verify_google(&self, id_token: &str) -> AppResult<ExternalIdentity>;

    /// Exchanges a Supabase access token for the user it belongs to.
    async fn verify_supabase(&self, access_token: &str) -> AppResult<ExternalIdentity>;
}

pub type IdentityState = Arc<dyn IdentityProvider>;

#[derive(Debug, Deserialize)]
struct GoogleTokenInfo {
    aud: String,
    email: Option<String>,
    // Google serializes this flag as the string "true" / "false".
    email_verified: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SupabaseUser {
    email: Option<String>,
    #[serde(default)]
    user_metadata: SupabaseMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct SupabaseMetadata {
    full_name: Option<String>,
    avatar_url: Option<String>,
}

/// HttpIdentityProvider
///
/// The real provider: calls Google's tokeninfo endpoint and the Supabase
/// `/auth/v1/user` endpoint with `reqwest`.
#[derive(Clone)]
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    google_client_id: Option<String>,
    supabase: Option<SupabaseConfig>,
}

impl HttpIdentityProvider {
    pub fn new(google_client_id: Option<String>, supabase: Option<SupabaseConfig>) -> Self {
        Self {
            client: reqwest::Client::new(),
            google_client_id,
            supabase,
        }
    }
}

fn normalize_email(email: Option<String>) -> AppResult<String> {
    email
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .ok_or(AppError::Unauthorized)
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn verify_google(&self, id_token: &str) -> AppResult<ExternalIdentity> {
        let response = self
            .client
            .get(GOOGLE_TOKENINFO_URL)
            .query(&[("id_token", id_token)])
            .send()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "google rejected id token");
            return Err(AppError::Unauthorized);
        }

        let info: GoogleTokenInfo = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        if let Some(expected) = &self.google_client_id {
            if &info.aud != expected {
                tracing::warn!(aud = %info.aud, "google token issued for another client");
                return Err(AppError::Unauthorized);
            }
        }
        if info.email_verified.as_deref() != Some("true") {
            return Err(AppError::Unauthorized);
        }

        Ok(ExternalIdentity {
            email: normalize_email(info.email)?,
            name: info.name,
            avatar: info.picture,
            provider: AuthProvider::Google,
        })
    }

    async fn verify_supabase(&self, access_token: &str) -> AppResult<ExternalIdentity> {
        let supabase = self
            .supabase
            .as_ref()
            .ok_or(AppError::Unavailable("supabase auth"))?;

        let response = self
            .client
            .get(format!("{}/auth/v1/user", supabase.url))
            .header("apikey", &supabase.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            tracing::debug!(status = %response.status(), "supabase rejected access token");
            return Err(AppError::Unauthorized);
        }

        let user: SupabaseUser = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        Ok(ExternalIdentity {
            email: normalize_email(user.email)?,
            name: user.user_metadata.full_name,
            avatar: user.user_metadata.avatar_url,
            provider: AuthProvider::Supabase,
        })
    }
}

/// MockIdentityProvider
///
/// Resolves tokens from a fixed table. Unknown tokens are rejected as
/// unauthorized; Supabase answers `Unavailable` unless enabled.
#[derive(Clone, Default)]
pub struct MockIdentityProvider {
    google: HashMap<String, ExternalIdentity>,
    supabase: Option<HashMap<String, ExternalIdentity>>,
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_google(mut self, token: &str, email: &str) -> Self {
        self.google.insert(
            token.to_string(),
            ExternalIdentity {
                email: email.to_string(),
                name: None,
                avatar: None,
                provider: AuthProvider::Google,
            },
        );
        self
    }

    pub fn with_supabase(mut self, token: &str, email: &str) -> Self {
        self.supabase.get_or_insert_with(HashMap::new).insert(
            token.to_string(),
            ExternalIdentity {
                email: email.to_string(),
                name: None,
                avatar: None,
                provider: AuthProvider::Supabase,
            },
        );
        self
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn verify_google(&self, id_token: &str) -> AppResult<ExternalIdentity> {
        self.google
            .get(id_token)
            .cloned()
            .ok_or(AppError::Unauthorized)
    }

    async fn verify_supabase(&self, access_token: &str) -> AppResult<ExternalIdentity> {
        let tokens = self
            .supabase
            .as_ref()
            .ok_or(AppError::Unavailable("supabase auth"))?;
        tokens
            .get(access_token)
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}
