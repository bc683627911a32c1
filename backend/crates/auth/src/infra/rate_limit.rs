//! PostgreSQL Rate Limit Store
//!
//! Fixed-window counters keyed by an opaque string (the handlers use
//! `<route>:<client_ip>`). Windows align to wall-clock multiples of
//! the configured duration.

use chrono::Utc;
use sqlx::PgPool;

use platform::rate_limit::{RateLimitConfig, RateLimitResult, RateLimitStore};

/// Retention for stale window rows relative to their window start
const STALE_WINDOW_MS: i64 = 3600_000; // 1 hour

/// PostgreSQL-backed rate limit store
#[derive(Clone)]
pub struct PgRateLimitStore {
    pool: PgPool,
}

impl PgRateLimitStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Delete counters from windows long past
    pub async fn cleanup_stale(&self) -> Result<u64, sqlx::Error> {
        let cutoff = Utc::now().timestamp_millis() - STALE_WINDOW_MS;

        let deleted = sqlx::query("DELETE FROM auth_rate_limits WHERE window_start_ms < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

impl RateLimitStore for PgRateLimitStore {
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, Box<dyn std::error::Error + Send + Sync>> {
        let now_ms = Utc::now().timestamp_millis();
        let window_ms = config.window_ms();
        let window_start = (now_ms / window_ms) * window_ms;

        let row = sqlx::query_as::<_, (i32,)>(
            r#"
            INSERT INTO auth_rate_limits (rl_key, window_start_ms, request_count)
            VALUES ($1, $2, 1)
            ON CONFLICT (rl_key, window_start_ms)
            DO UPDATE SET request_count = auth_rate_limits.request_count + 1
            RETURNING request_count
            "#,
        )
        .bind(key)
        .bind(window_start)
        .fetch_one(&self.pool)
        .await?;

        let count = row.0 as u32;
        let allowed = count <= config.max_requests;

        if !allowed {
            tracing::warn!(key = %key, count = count, max = config.max_requests, "Rate limit exceeded");
        }

        Ok(RateLimitResult {
            allowed,
            remaining: config.max_requests.saturating_sub(count),
            reset_at_ms: window_start + window_ms,
        })
    }
}
