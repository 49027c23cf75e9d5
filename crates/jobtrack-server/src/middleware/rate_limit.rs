//! Rate limiting gates backed by `governor`
//!
//! Each policy owns a keyed GCRA limiter. The limiters live in
//! [`RateLimiters`], which is part of the application state, and the gate
//! middlewares consult them before the route handler runs. Over-limit
//! requests are answered with 429 and never reach authentication, audit or
//! storage code.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tower_sessions::Session;

use crate::error::AppError;
use crate::features::auth::session::session_user_id;
use crate::middleware::ClientInfo;

/// Default login/register attempts per client IP per minute.
pub const DEFAULT_AUTH_PER_MINUTE: u32 = 5;

/// Default settings updates per user per minute.
pub const DEFAULT_SETTINGS_PER_MINUTE: u32 = 30;

/// Default company / entry-sheet requests per user per hour.
pub const DEFAULT_RESOURCE_PER_HOUR: u32 = 100;

/// How often idle limiter keys are dropped.
pub const LIMITER_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub auth_per_minute: u32,
    pub settings_per_minute: u32,
    pub resource_per_hour: u32,
    /// Key anonymous callers on `X-Forwarded-For`; only enable behind a
    /// reverse proxy that overwrites the header
    pub trust_forwarded_for: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            auth_per_minute: DEFAULT_AUTH_PER_MINUTE,
            settings_per_minute: DEFAULT_SETTINGS_PER_MINUTE,
            resource_per_hour: DEFAULT_RESOURCE_PER_HOUR,
            trust_forwarded_for: false,
        }
    }
}

impl RateLimitConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let read = |key: &str, default: u32| {
            std::env::var(key)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default)
        };
        let trust_forwarded_for = std::env::var("RATE_LIMIT_TRUST_FORWARDED_FOR")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(false);

        Self {
            auth_per_minute: read("RATE_LIMIT_AUTH_PER_MINUTE", DEFAULT_AUTH_PER_MINUTE),
            settings_per_minute: read("RATE_LIMIT_SETTINGS_PER_MINUTE", DEFAULT_SETTINGS_PER_MINUTE),
            resource_per_hour: read("RATE_LIMIT_RESOURCE_PER_HOUR", DEFAULT_RESOURCE_PER_HOUR),
            trust_forwarded_for,
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.auth_per_minute == 0 || self.settings_per_minute == 0 || self.resource_per_hour == 0
        {
            anyhow::bail!("Rate limits must be greater than 0");
        }
        Ok(())
    }
}

/// Which limiter a gate consults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatePolicy {
    /// Login and registration, keyed by client IP
    Auth,
    /// Settings updates, keyed by user
    Settings,
    /// Company and entry-sheet endpoints, keyed by user
    Resource,
}

type KeyedLimiter = DefaultKeyedRateLimiter<String>;

/// Shared limiter state, one keyed limiter per policy
///
/// Cloning shares the underlying counters.
#[derive(Clone)]
pub struct RateLimiters {
    auth: Arc<KeyedLimiter>,
    settings: Arc<KeyedLimiter>,
    resource: Arc<KeyedLimiter>,
    trust_forwarded_for: bool,
}

fn per_minute(count: u32) -> Quota {
    Quota::per_minute(NonZeroU32::new(count).unwrap_or(NonZeroU32::MIN))
}

fn per_hour(count: u32) -> Quota {
    Quota::per_hour(NonZeroU32::new(count).unwrap_or(NonZeroU32::MIN))
}

impl RateLimiters {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            auth: Arc::new(RateLimiter::keyed(per_minute(config.auth_per_minute))),
            settings: Arc::new(RateLimiter::keyed(per_minute(config.settings_per_minute))),
            resource: Arc::new(RateLimiter::keyed(per_hour(config.resource_per_hour))),
            trust_forwarded_for: config.trust_forwarded_for,
        }
    }

    /// Key for callers identified only by address
    pub fn ip_key(&self, client: &ClientInfo) -> String {
        client.ip_key(self.trust_forwarded_for)
    }

    fn limiter(&self, policy: RatePolicy) -> &KeyedLimiter {
        match policy {
            RatePolicy::Auth => &self.auth,
            RatePolicy::Settings => &self.settings,
            RatePolicy::Resource => &self.resource,
        }
    }

    /// Count one request against `key`, failing once the quota is spent
    pub fn check(&self, policy: RatePolicy, key: &str) -> Result<(), AppError> {
        self.limiter(policy)
            .check_key(&key.to_string())
            .map_err(|_| {
                tracing::warn!(?policy, key, "Rate limit exceeded");
                AppError::RateLimited
            })
    }

    /// Drop keys whose quota has fully replenished
    pub fn retain_recent(&self) {
        for limiter in [&self.auth, &self.settings, &self.resource] {
            limiter.retain_recent();
            limiter.shrink_to_fit();
        }
    }

    /// Number of keys currently tracked across all policies
    pub fn tracked_keys(&self) -> usize {
        self.auth.len() + self.settings.len() + self.resource.len()
    }
}

/// Periodically forget idle keys so the limiter maps stay bounded
pub fn spawn_cleanup(limiters: RateLimiters, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            limiters.retain_recent();
            tracing::debug!(keys = limiters.tracked_keys(), "Rate limiter keys pruned");
        }
    })
}

/// Key for user-scoped policies; anonymous callers fall back to their IP
async fn user_key(
    limiters: &RateLimiters,
    session: &Session,
    client: &ClientInfo,
) -> Result<String, AppError> {
    Ok(match session_user_id(session).await? {
        Some(user_id) => format!("user:{user_id}"),
        None => limiters.ip_key(client),
    })
}

/// Gate for login and registration (per client IP)
pub async fn limit_auth(
    State(limiters): State<RateLimiters>,
    client: ClientInfo,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    limiters.check(RatePolicy::Auth, &limiters.ip_key(&client))?;
    Ok(next.run(request).await)
}

/// Gate for settings updates (per user)
pub async fn limit_settings(
    State(limiters): State<RateLimiters>,
    session: Session,
    client: ClientInfo,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = user_key(&limiters, &session, &client).await?;
    limiters.check(RatePolicy::Settings, &key)?;
    Ok(next.run(request).await)
}

/// Gate for a resource group (per user, counted separately per `scope`)
pub async fn limit_resource(
    State((limiters, scope)): State<(RateLimiters, &'static str)>,
    session: Session,
    client: ClientInfo,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = format!("{scope}:{}", user_key(&limiters, &session, &client).await?);
    limiters.check(RatePolicy::Resource, &key)?;
    Ok(next.run(request).await)
}
