use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    error::{AppError, AppResult},
    identity::ExternalIdentity,
    models::{
        AccountType, AuthResponse, GoogleLoginRequest, LoginRequest, NewUser, RegisterRequest,
        SupabaseLoginRequest, User,
    },
    security, slug,
};

fn session_for(state: &AppState, user: User) -> AppResult<AuthResponse> {
    let token = security::issue_token(user.id, &state.config.jwt_secret, state.config.jwt_ttl_hours)?;
    Ok(AuthResponse { token, user })
}

/// register
///
/// [Public Route] Creates a credentials account and signs it in.
/// Emails are stored lowercased; a taken email or username answers 409.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 409, description = "Email or username taken"),
        (status = 422, description = "Invalid input")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    payload.validate()?;

    let password_hash = security::hash_password(&payload.password)?;
    let user = state
        .repo
        .create_user(NewUser {
            username: payload.username.trim().to_string(),
            email: payload.email.trim().to_lowercase(),
            password_hash: Some(password_hash),
            img: None,
            account_type: payload.account_type,
            auth_provider: Default::default(),
        })
        .await?;

    tracing::info!(user_id = %user.id, account_type = ?user.account_type, "account registered");
    Ok((StatusCode::CREATED, Json(session_for(&state, user)?)))
}

/// login
///
/// [Public Route] Email + password sign-in. Every failure mode (unknown email,
/// wrong password, account without a password) answers the same 401.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let email = payload.email.trim().to_lowercase();
    let user = state
        .repo
        .find_user_by_email(&email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let verified = user
        .password_hash
        .as_deref()
        .is_some_and(|hash| security::verify_password(&payload.password, hash));
    if !verified {
        tracing::debug!(user_id = %user.id, "password rejected");
        return Err(AppError::Unauthorized);
    }

    Ok(Json(session_for(&state, user)?))
}

/// Finds the account for a verified external identity, creating a reader
/// account with a derived username on first sign-in.
async fn sign_in_external(state: &AppState, identity: ExternalIdentity) -> AppResult<AuthResponse> {
    if let Some(user) = state.repo.find_user_by_email(&identity.email).await? {
        return session_for(state, user);
    }

    let repo = state.repo.clone();
    let username = slug::create_unique_username(&identity.email, |candidate| {
        let repo = repo.clone();
        async move { repo.username_exists(&candidate).await }
    })
    .await?;

    let user = state
        .repo
        .create_user(NewUser {
            username,
            email: identity.email,
            password_hash: None,
            img: identity.avatar,
            account_type: AccountType::Reader,
            auth_provider: identity.provider,
        })
        .await?;

    tracing::info!(user_id = %user.id, provider = ?user.auth_provider, "external account created");
    session_for(state, user)
}

/// google_login
///
/// [Public Route] Exchanges a Google ID token for a session.
#[utoipa::path(
    post,
    path = "/auth/google",
    request_body = GoogleLoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 401, description = "Token rejected")
    )
)]
pub async fn google_login(
    State(state): State<AppState>,
    Json(payload): Json<GoogleLoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let identity = state.identity.verify_google(&payload.id_token).await?;
    Ok(Json(sign_in_external(&state, identity).await?))
}

/// supabase_login
///
/// [Public Route] Exchanges a Supabase access token for a session.
/// Answers 503 when no Supabase project is configured.
#[utoipa::path(
    post,
    path = "/auth/supabase",
    request_body = SupabaseLoginRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 401, description = "Token rejected"),
        (status = 503, description = "Supabase not configured")
    )
)]
pub async fn supabase_login(
    State(state): State<AppState>,
    Json(payload): Json<SupabaseLoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let identity = state.identity.verify_supabase(&payload.access_token).await?;
    Ok(Json(sign_in_external(&state, identity).await?))
}
