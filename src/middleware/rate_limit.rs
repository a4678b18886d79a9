//! Fixed-window rate limiting per client.
//!
//! Each client key owns a `{count, window_start}` record. A request past the
//! end of the current window starts a new one with a count of 1; otherwise
//! the count is incremented. Once the count exceeds the limit the request is
//! rejected with `429 Too Many Requests` and a `Retry-After` header.
//!
//! Records live in a sharded map, so requests from one client serialize on
//! that client's record without blocking other clients.

use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, HeaderValue, header};
use axum::middleware::{Next, from_fn_with_state};
use axum::response::{IntoResponse, Response};
use dashmap::DashMap;

use classconnect_config::RateLimitConfig;
use classconnect_core::AppError;

use super::chain::Middleware;
use crate::metrics::track_rate_limited;
use crate::router::route_label;
use crate::state::AppState;

// Stale windows are swept when the map grows past this many keys,
// at most once per window.
const SWEEP_THRESHOLD: usize = 10_000;

pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    started: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

#[derive(Debug)]
pub struct RateLimiter {
    windows: DashMap<String, Window>,
    max_requests: u32,
    window: Duration,
    sweep_threshold: usize,
    last_sweep: Mutex<Instant>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            windows: DashMap::new(),
            max_requests: config.max_requests.max(1),
            window: config.window,
            sweep_threshold: SWEEP_THRESHOLD,
            last_sweep: Mutex::new(Instant::now()),
        }
    }

    pub fn check(&self, key: &str) -> Decision {
        self.check_at(key, Instant::now())
    }

    /// Counts one request from `key` at `now`.
    pub fn check_at(&self, key: &str, now: Instant) -> Decision {
        let mut entry = self.windows.entry(key.to_owned()).or_insert(Window {
            count: 0,
            started: now,
        });

        let elapsed = now.saturating_duration_since(entry.started);
        if elapsed >= self.window {
            entry.count = 0;
            entry.started = now;
        }

        entry.count = entry.count.saturating_add(1);

        if entry.count > self.max_requests {
            let retry_after = self
                .window
                .saturating_sub(now.saturating_duration_since(entry.started));
            Decision::Limited { retry_after }
        } else {
            Decision::Allowed {
                remaining: self.max_requests - entry.count,
            }
        }
    }

    /// Sweeps when the map is over its threshold and no sweep ran within
    /// the last window. Returns whether a sweep ran.
    ///
    /// Concurrent callers never wait: whoever loses the race skips the sweep.
    pub fn maybe_sweep(&self, now: Instant) -> bool {
        if self.windows.len() <= self.sweep_threshold {
            return false;
        }

        let Ok(mut last_sweep) = self.last_sweep.try_lock() else {
            return false;
        };
        if now.saturating_duration_since(*last_sweep) < self.window {
            return false;
        }

        *last_sweep = now;
        drop(last_sweep);
        self.sweep(now);
        true
    }

    /// Drops records whose window has elapsed.
    pub fn sweep(&self, now: Instant) {
        self.windows
            .retain(|_, w| now.saturating_duration_since(w.started) < self.window);
    }

    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }
}

/// Identifies the client: the peer address when known, else the first
/// `X-Forwarded-For` hop.
pub fn client_key(req: &Request) -> String {
    if let Some(ConnectInfo(addr)) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    forwarded_for(req.headers()).unwrap_or_else(|| "unknown".to_string())
}

fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub async fn rate_limit(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let limiter = &state.rate_limiter;
    let key = client_key(&req);

    match limiter.check(&key) {
        Decision::Allowed { remaining } => {
            limiter.maybe_sweep(Instant::now());

            let mut response = next.run(req).await;
            response
                .headers_mut()
                .insert(REMAINING_HEADER, HeaderValue::from(remaining));
            response
        }
        Decision::Limited { retry_after } => {
            tracing::warn!(client = %key, path = route_label(req.uri().path()), "Rate limit exceeded");
            track_rate_limited();

            let mut response = AppError::too_many_requests("Too many requests").into_response();
            let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            if let Ok(value) = HeaderValue::from_str(&secs.max(1).to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
            response
        }
    }
}

pub fn rate_limiter(state: &AppState) -> Middleware {
    Middleware::from_layer("rate_limit", from_fn_with_state(state.clone(), rate_limit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn limiter(max_requests: u32, window_secs: u64) -> RateLimiter {
        RateLimiter::new(&RateLimitConfig {
            max_requests,
            window: Duration::from_secs(window_secs),
        })
    }

    #[test]
    fn test_limit_within_window() {
        let limiter = limiter(3, 60);
        let start = Instant::now();

        for i in 0..3 {
            assert!(
                matches!(
                    limiter.check_at("10.0.0.1", start + Duration::from_secs(i)),
                    Decision::Allowed { .. }
                ),
                "request {i} should pass"
            );
        }

        assert!(matches!(
            limiter.check_at("10.0.0.1", start + Duration::from_secs(10)),
            Decision::Limited { .. }
        ));
    }

    #[test]
    fn test_window_elapse_resets_count() {
        let limiter = limiter(3, 60);
        let start = Instant::now();

        for _ in 0..4 {
            limiter.check_at("10.0.0.1", start);
        }

        let after = start + Duration::from_secs(60);
        assert_eq!(
            limiter.check_at("10.0.0.1", after),
            Decision::Allowed { remaining: 2 }
        );
    }

    #[test]
    fn test_first_request_always_allowed() {
        let limiter = limiter(1, 60);
        assert_eq!(limiter.check("fresh"), Decision::Allowed { remaining: 0 });
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = limiter(1, 60);
        let now = Instant::now();

        limiter.check_at("a", now);
        assert!(matches!(limiter.check_at("a", now), Decision::Limited { .. }));
        assert!(matches!(limiter.check_at("b", now), Decision::Allowed { .. }));
    }

    #[test]
    fn test_retry_after_counts_down() {
        let limiter = limiter(1, 60);
        let start = Instant::now();

        limiter.check_at("a", start);
        assert_eq!(
            limiter.check_at("a", start + Duration::from_secs(45)),
            Decision::Limited {
                retry_after: Duration::from_secs(15)
            }
        );
    }

    #[test]
    fn test_sweep_drops_elapsed_windows() {
        let limiter = limiter(5, 60);
        let start = Instant::now();

        limiter.check_at("old", start);
        limiter.check_at("new", start + Duration::from_secs(30));
        limiter.sweep(start + Duration::from_secs(61));

        assert_eq!(limiter.tracked_keys(), 1);
    }

    #[test]
    fn test_zero_limit_still_admits_first_request() {
        let limiter = limiter(0, 60);
        assert!(matches!(limiter.check("a"), Decision::Allowed { .. }));
    }

    #[test]
    fn test_client_key_prefers_peer_address() {
        let mut req = Request::builder()
            .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_key(&req), "203.0.113.9");

        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 168, 1, 5], 4000))));
        assert_eq!(client_key(&req), "192.168.1.5");
    }

    #[test]
    fn test_client_key_unknown() {
        let req = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(client_key(&req), "unknown");
    }

    #[test]
    fn test_sweep_runs_at_most_once_per_window() {
        let mut limiter = limiter(5, 60);
        limiter.sweep_threshold = 1;
        let start = Instant::now();

        limiter.check_at("a", start);
        limiter.check_at("b", start);
        assert!(!limiter.maybe_sweep(start + Duration::from_secs(30)));

        let first = start + Duration::from_secs(61);
        limiter.check_at("c", first);
        limiter.check_at("d", first);
        assert!(limiter.maybe_sweep(first));
        assert_eq!(limiter.tracked_keys(), 2);

        limiter.check_at("e", first + Duration::from_secs(1));
        assert!(!limiter.maybe_sweep(first + Duration::from_secs(1)));
        assert_eq!(limiter.tracked_keys(), 3);
    }

    #[test]
    fn test_no_sweep_below_threshold() {
        let limiter = limiter(5, 60);
        let start = Instant::now();
        limiter.check_at("a", start);
        assert!(!limiter.maybe_sweep(start + Duration::from_secs(120)));
        assert_eq!(limiter.tracked_keys(), 1);
    }

    #[test]
    fn test_concurrent_requests_on_one_key() {
        let limiter = std::sync::Arc::new(limiter(25, 60));
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let limiter = limiter.clone();
                std::thread::spawn(move || {
                    (0..20)
                        .filter(|_| matches!(limiter.check("shared"), Decision::Allowed { .. }))
                        .count()
                })
            })
            .collect();

        let allowed: usize = threads.into_iter().map(|t| t.join().unwrap()).sum();
        assert_eq!(allowed, 25);
    }
}
