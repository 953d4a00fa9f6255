use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::error::AppError;

/// RateLimiter
///
/// Sliding-window limiter keyed by `{client}:{route}`. Each bucket keeps the
/// instants of the requests still inside the window. Buckets with no hits left
/// are swept out at most once per window.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    window: Duration,
    max_requests: u32,
    buckets: Arc<DashMap<String, Vec<Instant>>>,
    last_sweep: Arc<Mutex<Instant>>,
}

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: u32 },
    Limited { retry_after_secs: u64 },
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            buckets: Arc::new(DashMap::new()),
            last_sweep: Arc::new(Mutex::new(Instant::now())),
        }
    }

    pub fn check(&self, key: &str, route: &str) -> Decision {
        self.check_at(key, route, Instant::now())
    }

    fn check_at(&self, key: &str, route: &str, now: Instant) -> Decision {
        self.sweep(now);
        let window = self.window;
        let mut entry = self.buckets.entry(format!("{key}:{route}")).or_default();
        entry.retain(|instant| now.saturating_duration_since(*instant) < window);

        if entry.len() as u32 >= self.max_requests {
            let oldest = entry.first().copied().unwrap_or(now);
            let wait = window.saturating_sub(now.saturating_duration_since(oldest));
            return Decision::Limited {
                retry_after_secs: wait.as_secs().max(1),
            };
        }

        entry.push(now);
        Decision::Allowed {
            remaining: self.max_requests - entry.len() as u32,
        }
    }

    /// Drops every bucket whose hits have all left the window. Must not be
    /// called while holding a bucket entry.
    fn sweep(&self, now: Instant) {
        {
            let mut last = match self.last_sweep.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if now.saturating_duration_since(*last) < self.window {
                return;
            }
            *last = now;
        }
        let window = self.window;
        self.buckets.retain(|_, hits| {
            hits.retain(|instant| now.saturating_duration_since(*instant) < window);
            !hits.is_empty()
        });
    }
}

/// Resolves the client key: the first `x-forwarded-for` hop, then the socket
/// address, then a shared anonymous bucket.
fn client_key(request: &Request<Body>) -> String {
    let forwarded = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    forwarded
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
        })
        .unwrap_or_else(|| "anonymous".to_string())
}

/// limit_auth_requests
///
/// Middleware guarding the `/auth/*` routes against credential stuffing.
pub async fn limit_auth_requests(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let key = client_key(&request);
    let route = request.uri().path().to_string();

    match limiter.check(&key, &route) {
        Decision::Allowed { .. } => next.run(request).await,
        Decision::Limited { retry_after_secs } => {
            tracing::warn!(client = %key, %route, retry_after_secs, "auth rate limit exceeded");
            AppError::RateLimited { retry_after_secs }.into_response()
        }
    }
}
