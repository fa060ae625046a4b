// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fixed-window request limiter.
//!
//! Clients are keyed by the peer socket address. `X-Forwarded-For` is only
//! consulted when the deployment says a proxy in front of us sets it.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

pub const DEFAULT_LIMIT: u32 = 100;
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(15 * 60);
/// Expired windows are swept once the table grows past this.
const SWEEP_THRESHOLD: usize = 10_000;
/// Minimum spacing between sweeps.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Outcome of counting one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: u32, reset_secs: u64 },
    Limited { reset_secs: u64 },
}

/// Per-client fixed-window counter.
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    windows: DashMap<String, Window>,
    last_sweep: Mutex<Option<Instant>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT, DEFAULT_WINDOW)
    }
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            windows: DashMap::new(),
            last_sweep: Mutex::new(None),
        }
    }

    /// Drop expired windows, at most once per [`SWEEP_INTERVAL`].
    fn sweep(&self, now: Instant) {
        if self.windows.len() <= SWEEP_THRESHOLD {
            return;
        }
        // Another request is already sweeping.
        let Ok(mut last) = self.last_sweep.try_lock() else {
            return;
        };
        if last.is_some_and(|at| now.duration_since(at) < SWEEP_INTERVAL) {
            return;
        }
        *last = Some(now);
        drop(last);

        let before = self.windows.len();
        self.windows
            .retain(|_, w| now.duration_since(w.started) < self.window);
        tracing::debug!(
            before,
            after = self.windows.len(),
            "Swept expired rate limit windows"
        );
    }

    /// Count a request from `key` at `now`.
    pub fn check(&self, key: &str, now: Instant) -> Decision {
        self.sweep(now);

        let mut entry = self.windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(entry.started) >= self.window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }

        let reset_secs = self
            .window
            .saturating_sub(now.duration_since(entry.started))
            .as_secs();

        if entry.count >= self.limit {
            return Decision::Limited { reset_secs };
        }

        entry.count += 1;
        Decision::Allowed {
            remaining: self.limit - entry.count,
            reset_secs,
        }
    }

    #[cfg(test)]
    fn tracked_clients(&self) -> usize {
        self.windows.len()
    }

    fn policy_header(&self) -> String {
        format!("{};w={}", self.limit, self.window.as_secs())
    }
}

/// Client key for a request.
///
/// The first `X-Forwarded-For` hop when the proxy is trusted, otherwise
/// the peer IP. `None` when neither is known.
fn client_key(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trust_forwarded_for: bool,
) -> Option<String> {
    let forwarded = trust_forwarded_for
        .then(|| headers.get("x-forwarded-for"))
        .flatten()
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty());

    forwarded.or_else(|| peer.map(|addr| addr.ip().to_string()))
}

/// Apply the limiter to every request.
///
/// The peer address comes from the `ConnectInfo` extension that
/// `into_make_service_with_connect_info` inserts.
pub async fn rate_limit(State(state): State<Arc<AppState>>, req: Request, next: Next) -> Response {
    let limiter = &state.rate_limiter;
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let Some(key) = client_key(req.headers(), peer, state.config.trust_forwarded_for) else {
        tracing::debug!("No client address; request not rate limited");
        return next.run(req).await;
    };

    let (mut response, remaining, reset_secs) = match limiter.check(&key, Instant::now()) {
        Decision::Allowed {
            remaining,
            reset_secs,
        } => (next.run(req).await, remaining, reset_secs),
        Decision::Limited { reset_secs } => {
            tracing::warn!(client = %key, "Rate limit exceeded");
            (AppError::TooManyRequests.into_response(), 0, reset_secs)
        }
    };

    let headers = response.headers_mut();
    if let Ok(v) = HeaderValue::from_str(&limiter.policy_header()) {
        headers.insert("RateLimit-Policy", v);
    }
    if let Ok(v) = HeaderValue::from_str(&format!(
        "limit={}, remaining={}, reset={}",
        limiter.limit, remaining, reset_secs
    )) {
        headers.insert("RateLimit", v);
    }

    response
}
