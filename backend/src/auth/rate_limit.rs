use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    Extension,
};
use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;

use crate::auth::middleware::AuthUser;
use crate::error::AppError;
use crate::AppState;

/// Fixed-window counter per key, in memory (single-instance deployments).
#[derive(Clone)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    entries: Arc<Mutex<HashMap<String, WindowEntry>>>,
}

struct WindowEntry {
    count: u32,
    window_start: Instant,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Ok(remaining) when allowed, Err(retry_after) when the window is used up.
    pub async fn check(&self, key: &str) -> Result<u32, Duration> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        let entry = entries.entry(key.to_string()).or_insert(WindowEntry {
            count: 0,
            window_start: now,
        });

        if now.duration_since(entry.window_start) > self.window {
            entry.count = 0;
            entry.window_start = now;
        }

        if entry.count >= self.max_requests {
            let retry_after = self
                .window
                .saturating_sub(now.duration_since(entry.window_start));
            return Err(retry_after);
        }

        entry.count += 1;
        Ok(self.max_requests - entry.count)
    }

    /// Drop keys idle for more than two windows.
    pub async fn cleanup(&self) -> usize {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        let keep_for = self.window * 2;
        let before = entries.len();
        entries.retain(|_, entry| now.duration_since(entry.window_start) < keep_for);
        before - entries.len()
    }

    #[cfg(test)]
    pub async fn tracked_keys(&self) -> usize {
        self.entries.lock().await.len()
    }
}

/// Spawn a background task that prunes idle limiter keys every window.
pub fn spawn_cleanup_worker(limiter: RateLimiter) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(limiter.window.max(Duration::from_secs(1)));
        loop {
            interval.tick().await;
            let removed = limiter.cleanup().await;
            if removed > 0 {
                tracing::debug!(removed, "Pruned idle rate limit keys");
            }
        }
    });
}

/// Per-user limit for the model proxy. Must run after `require_auth`.
pub async fn rate_limit_chat(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = format!("chat:{}", auth_user.id);

    match state.chat_limiter.check(&key).await {
        Ok(remaining) => {
            tracing::debug!(user_id = %auth_user.id, remaining, "Chat rate limit check passed");
            Ok(next.run(req).await)
        }
        Err(retry_after) => {
            tracing::warn!(
                user_id = %auth_user.id,
                retry_after_secs = retry_after.as_secs(),
                "Chat rate limit exceeded"
            );
            Err(AppError::RateLimited)
        }
    }
}
