use std::collections::HashMap;
use std::net::IpAddr;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use axum::extract::ConnectInfo;
use axum::extract::Request;
use axum::extract::State;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::NebulaState;
use crate::config::RateLimitSection;
use crate::error::NebulaError;

/// Fixed window request counter per client IP
pub struct RateLimiter {
    windows: Mutex<HashMap<IpAddr, Window>>,
    max_requests: u32,
    window: Duration,
    enabled: bool,
}

struct Window {
    started: Instant,
    count: u32,
}

impl RateLimiter {
    pub fn new(config: &RateLimitSection) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            max_requests: config.max_requests,
            window: config.window(),
            enabled: config.enabled(),
        }
    }

    /// Count a request from `ip`. Returns false once the window is used up.
    pub async fn check(&self, ip: IpAddr) -> bool {
        if !self.enabled {
            return true;
        }
        let now = Instant::now();
        let mut windows = self.windows.lock().await;
        let window = windows.entry(ip).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(window.started) >= self.window {
            window.started = now;
            window.count = 0;
        }
        if window.count >= self.max_requests {
            return false;
        }
        window.count += 1;
        true
    }

    /// Forget windows that have expired. Called periodically from main.
    pub async fn cleanup(&self) {
        let now = Instant::now();
        self.windows
            .lock()
            .await
            .retain(|_, window| now.duration_since(window.started) < self.window);
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }
}

/// Periodically drop expired windows. Nothing is spawned when limiting is
/// disabled, a zero window would make `tokio::time::interval` panic.
pub fn spawn_cleanup(limiter: Arc<RateLimiter>) -> Option<JoinHandle<()>> {
    if !limiter.enabled() {
        return None;
    }
    Some(tokio::spawn(async move {
        let mut interval = tokio::time::interval(limiter.window());
        loop {
            interval.tick().await;
            limiter.cleanup().await;
        }
    }))
}

/// Middleware rejecting clients over their limit. Requests without a peer
/// address (in-process test transports) are never limited.
pub async fn limit_requests(
    State(state): State<NebulaState>,
    request: Request,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    if let Some(ip) = peer
        && !state.limiter.check(ip).await
    {
        log::warn!("rate limited {ip}");
        return NebulaError::rate_limited().into_response();
    }
    next.run(request).await
}
