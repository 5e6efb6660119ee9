use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    refilled_at: Instant,
}

/// Token bucket shared by every route it wraps. Holds up to `per_second`
/// tokens and refills continuously, so bursts are allowed up to one second's
/// worth of requests.
#[derive(Clone, Debug)]
pub struct RequestBudget {
    capacity: f64,
    bucket: Arc<Mutex<Bucket>>,
}

impl RequestBudget {
    pub fn per_second(per_second: u32) -> Self {
        let capacity = f64::from(per_second.max(1));
        Self {
            capacity,
            bucket: Arc::new(Mutex::new(Bucket {
                tokens: capacity,
                refilled_at: Instant::now(),
            })),
        }
    }

    /// Takes one token, or returns how long until one is available.
    fn try_take_at(&self, now: Instant) -> Result<(), Duration> {
        let mut bucket = self
            .bucket
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let elapsed = now.saturating_duration_since(bucket.refilled_at).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.capacity).min(self.capacity);
        bucket.refilled_at = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            Ok(())
        } else {
            Err(Duration::from_secs_f64((1.0 - bucket.tokens) / self.capacity))
        }
    }
}

pub async fn limit_requests(State(budget): State<RequestBudget>, req: Request, next: Next) -> Response {
    if let Err(wait) = budget.try_take_at(Instant::now()) {
        let retry_after = wait.as_secs().max(1);
        tracing::warn!(path = %req.uri().path(), retry_after, "Request budget exhausted");
        let mut response = (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "error": "rate_limit_exceeded" })),
        )
            .into_response();
        response
            .headers_mut()
            .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
        return response;
    }
    next.run(req).await
}
