//! Inbound rate limiting for the API routes

use super::state::AppState;
use crate::config::LimiterSettings;
use crate::error::ApiError;
use axum::{extract::Request, extract::State, middleware::Next, response::Response};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Type alias for rate limiter
pub type AppRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Build the limiter, or `None` when disabled, configured with zeros, or
/// given a period too long to represent
pub fn create_rate_limiter(settings: &LimiterSettings) -> Option<AppRateLimiter> {
    if !settings.enabled {
        return None;
    }

    let burst = NonZeroU32::new(settings.requests)?;
    let replenish =
        Duration::try_from_secs_f64(settings.period as f64 / settings.requests as f64).ok()?;
    let quota = Quota::with_period(replenish)?.allow_burst(burst);

    Some(Arc::new(RateLimiter::direct(quota)))
}

/// Rate limiting middleware using token bucket algorithm
pub async fn rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(ref limiter) = state.limiter else {
        return Ok(next.run(request).await);
    };

    match limiter.check() {
        Ok(_) => {
            debug!("Rate limit check passed");
            Ok(next.run(request).await)
        }
        Err(_) => {
            warn!("Rate limit exceeded for {}", request.uri().path());
            Err(ApiError::RateLimited)
        }
    }
}
