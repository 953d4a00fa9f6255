#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use radio_portal::{
    AppConfig, AppState, MemoryRepository, MockIdentityProvider, MockStorageService,
    create_router,
    identity::IdentityState,
    models::{AccountType, Category, CreateCategoryRequest, NewUser, UpdateRolesRequest, User},
    repository::{Repository, RepositoryState},
    security,
    storage::StorageState,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// TestApp
///
/// The full router over the in-memory repository, mock storage and mock
/// identity provider. `repo` is kept so tests can seed rows directly.
pub struct TestApp {
    pub router: Router,
    pub repo: Arc<MemoryRepository>,
    pub config: AppConfig,
}

pub struct Account {
    pub user: User,
    pub token: String,
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(AppConfig::default(), MockIdentityProvider::new(), MockStorageService::new())
    }

    pub fn with_config(config: AppConfig) -> Self {
        Self::build(config, MockIdentityProvider::new(), MockStorageService::new())
    }

    pub fn with_identity(identity: MockIdentityProvider) -> Self {
        Self::build(AppConfig::default(), identity, MockStorageService::new())
    }

    pub fn with_storage(storage: MockStorageService) -> Self {
        Self::build(AppConfig::default(), MockIdentityProvider::new(), storage)
    }

    fn build(config: AppConfig, identity: MockIdentityProvider, storage: MockStorageService) -> Self {
        let repo = Arc::new(MemoryRepository::new());
        let state = AppState::new(
            repo.clone() as RepositoryState,
            Arc::new(storage) as StorageState,
            Arc::new(identity) as IdentityState,
            config.clone(),
        );
        Self {
            router: create_router(state),
            repo,
            config,
        }
    }

    /// Seeds an account directly and mints a session token for it.
    pub async fn account(&self, username: &str, account_type: AccountType) -> Account {
        let user = self
            .repo
            .create_user(NewUser {
                username: username.to_string(),
                email: format!("{username}@station.fm"),
                password_hash: None,
                img: None,
                account_type,
                auth_provider: Default::default(),
            })
            .await
            .unwrap();
        let token = security::issue_token(user.id, &self.config.jwt_secret, 1).unwrap();
        Account { user, token }
    }

    pub async fn reader(&self, username: &str) -> Account {
        self.account(username, AccountType::Reader).await
    }

    pub async fn writer(&self, username: &str) -> Account {
        self.account(username, AccountType::Writer).await
    }

    pub async fn admin(&self, username: &str) -> Account {
        let account = self.reader(username).await;
        let user = self
            .repo
            .set_user_roles(
                account.user.id,
                UpdateRolesRequest {
                    account_type: None,
                    is_general_admin: Some(true),
                },
            )
            .await
            .unwrap()
            .unwrap();
        Account { user, ..account }
    }

    pub async fn category(&self, title: &str) -> Category {
        self.repo
            .create_category(
                slug::slugify(title),
                CreateCategoryRequest {
                    title: title.to_string(),
                    ..CreateCategoryRequest::default()
                },
            )
            .await
            .unwrap()
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.call(request).await
    }

    pub async fn call(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, token, None).await
    }

    /// Creates a post as `writer` and walks it through approval and publication.
    pub async fn published_post(&self, writer: &Account, admin: &Account, title: &str, cat: &str) -> Value {
        let (status, post) = self
            .post(
                "/posts",
                Some(&writer.token),
                serde_json::json!({ "title": title, "desc": "On air tonight.", "cat": cat }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{post}");
        let id = post["id"].as_str().unwrap().to_string();

        let (status, _) = self
            .put(
                &format!("/admin/posts/{id}/moderation"),
                Some(&admin.token),
                serde_json::json!({ "action": "approve" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, post) = self
            .put(
                &format!("/posts/{id}/status"),
                Some(&writer.token),
                serde_json::json!({ "status": "published" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        post
    }
}
