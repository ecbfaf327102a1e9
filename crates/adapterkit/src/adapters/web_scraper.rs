//! Plain HTTP page scraper

use super::request_options;
use crate::base::{Adapter, AdapterCore, AdapterCoreBuilder};
use crate::capabilities::{Options, RateLimitStatus, ScrapedPage, Scraper};
use crate::capability::{CapabilityDescriptor, Tier};
use crate::error::{AdapterResult, ErrorRecord, codes};
use adapterkit_transport::HttpResponse;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use governor::clock::{Clock, DefaultClock};
use governor::middleware::StateInformationMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use serde_json::{Map, Value};
use std::num::NonZeroU32;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

const DEFAULT_RATE_LIMIT: u32 = 60;

/// `X-RateLimit-Reset` values below this are seconds from now, not epoch
/// timestamps.
const EPOCH_RESET_FLOOR: i64 = 1_000_000_000;

type LocalLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock, StateInformationMiddleware>;

#[derive(Debug, Default)]
struct RateState {
    /// Burst capacity left after the last accepted request.
    last: Option<(Instant, u32)>,
    /// Budget last reported by the remote server.
    remote: Option<RateLimitStatus>,
}

/// Scraper that fetches pages with GET and extracts fields with CSS
/// selectors.
///
/// Configuration:
/// - `rate_limit_per_minute`: local request budget, defaults to 60
///
/// Per-call options:
/// - `request`: request option overrides, see [`RequestOptions`](crate::http::RequestOptions)
/// - `selectors`: field to selector map, see [`extract_fields`](crate::capabilities::extract_fields)
///
/// The local budget is a GCRA limiter: the full budget is available at
/// once and one request is replenished every `60 / rate_limit_per_minute`
/// seconds. `X-RateLimit-Limit`, `X-RateLimit-Remaining` and
/// `X-RateLimit-Reset` response headers replace it until the reported
/// reset.
pub struct WebScraper {
    core: AdapterCore,
    quota: Quota,
    limiter: LocalLimiter,
    state: Mutex<RateState>,
}

impl WebScraper {
    /// Descriptor shared by every instance.
    pub fn descriptor() -> CapabilityDescriptor {
        CapabilityDescriptor::new("web-scraper", env!("CARGO_PKG_VERSION"), Tier::Free)
            .with_capabilities(["scrape", "scrape_batch", "extract", "rate_limit"])
    }

    /// Core builder with this adapter's descriptor. Nothing is required.
    pub fn core_builder() -> AdapterCoreBuilder {
        AdapterCore::builder(Self::descriptor())
    }

    /// Build from raw configuration with the default transport and no logging.
    pub fn new(raw: &Map<String, Value>) -> AdapterResult<Self> {
        Ok(Self::from_core(Self::core_builder().config(raw).build()?))
    }

    /// Wrap an already built core.
    pub fn from_core(core: AdapterCore) -> Self {
        let quota = Quota::per_minute(local_limit(&core));
        Self {
            core,
            quota,
            limiter: RateLimiter::direct(quota).with_middleware::<StateInformationMiddleware>(),
            state: Mutex::new(RateState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, RateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drop the server-reported budget once its reset has passed.
    fn active_remote<'a>(
        state: &'a mut RateState,
        now: DateTime<Utc>,
    ) -> Option<&'a mut RateLimitStatus> {
        if state.remote.as_ref().is_some_and(|remote| remote.reset_at <= now) {
            state.remote = None;
        }
        state.remote.as_mut()
    }

    fn local_status(&self, state: &RateState, now: DateTime<Utc>) -> RateLimitStatus {
        let limit = self.quota.burst_size().get();
        let interval = self.quota.replenish_interval();
        let remaining = match state.last {
            None => limit,
            Some((at, remaining)) => {
                let refilled = at.elapsed().as_nanos() / interval.as_nanos().max(1);
                u32::try_from(u128::from(remaining) + refilled)
                    .unwrap_or(u32::MAX)
                    .min(limit)
            }
        };
        let until_full = interval.saturating_mul(limit - remaining);
        RateLimitStatus {
            remaining: remaining.into(),
            limit: limit.into(),
            reset_at: now + Duration::from_std(until_full).unwrap_or(Duration::zero()),
        }
    }

    fn rate_limited(&self, url: &str, reset_at: DateTime<Utc>) -> AdapterResult<()> {
        self.core.fail(
            ErrorRecord::warning(codes::RATE_LIMITED, "Rate limit reached, retry after reset")
                .with_context("url", url)
                .with_context("reset_at", reset_at.to_rfc3339()),
        )
    }

    /// Take one request from the budget.
    fn acquire(&self, url: &str) -> AdapterResult<()> {
        let now = Utc::now();
        let mut state = self.state();
        if let Some(remote) = Self::active_remote(&mut state, now) {
            if remote.remaining == 0 {
                let reset_at = remote.reset_at;
                drop(state);
                return self.rate_limited(url, reset_at);
            }
            remote.remaining -= 1;
            return Ok(());
        }

        match self.limiter.check() {
            Ok(snapshot) => {
                state.last = Some((Instant::now(), snapshot.remaining_burst_capacity()));
                Ok(())
            }
            Err(not_until) => {
                drop(state);
                let wait = not_until.wait_time_from(DefaultClock::default().now());
                self.rate_limited(url, now + Duration::from_std(wait).unwrap_or(Duration::zero()))
            }
        }
    }

    fn observe_headers(&self, response: &HttpResponse) {
        let header = |name: &str| {
            response
                .get_header(name)
                .and_then(|value| value.trim().parse::<u64>().ok())
        };
        let (Some(limit), Some(remaining)) =
            (header("X-RateLimit-Limit"), header("X-RateLimit-Remaining"))
        else {
            return;
        };

        let now = Utc::now();
        let reset_at = header("X-RateLimit-Reset")
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(|secs| {
                if secs < EPOCH_RESET_FLOOR {
                    Some(now + Duration::seconds(secs))
                } else {
                    DateTime::from_timestamp(secs, 0)
                }
            })
            .unwrap_or(now + Duration::minutes(1));
        self.state().remote = Some(RateLimitStatus {
            remaining,
            limit,
            reset_at,
        });
    }
}

fn local_limit(core: &AdapterCore) -> NonZeroU32 {
    core.config()
        .get_u64("rate_limit_per_minute")
        .map(|limit| u32::try_from(limit).unwrap_or(u32::MAX))
        .and_then(NonZeroU32::new)
        .or(NonZeroU32::new(DEFAULT_RATE_LIMIT))
        .unwrap_or(NonZeroU32::MIN)
}

#[async_trait]
impl Scraper for WebScraper {
    async fn scrape(&self, url: &str, options: &Options) -> AdapterResult<ScrapedPage> {
        let request = request_options(&self.core, options)?;
        self.acquire(url)?;

        let response = self.core.execute(url, &request).await?;
        self.observe_headers(&response);

        let html = response.text_lossy();
        let data = match options.get("selectors") {
            Some(Value::Object(selectors)) => Some(self.extract(&html, selectors)?),
            _ => None,
        };
        Ok(ScrapedPage { html, data })
    }

    async fn rate_limit_status(&self) -> RateLimitStatus {
        let now = Utc::now();
        let mut state = self.state();
        if let Some(remote) = Self::active_remote(&mut state, now) {
            return remote.clone();
        }
        self.local_status(&state, now)
    }
}

impl Adapter for WebScraper {
    fn core(&self) -> &AdapterCore {
        &self.core
    }
}
