use serde::{Deserialize, Serialize};
use worker::*;

use crate::core::window::{check, Decision, Window, DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW_SECS};
use crate::worker_wasm::env::env_i64_or;
use crate::worker_wasm::util::now_ts;

const WINDOW_KEY: &str = "window";

/// Wire shape returned by the limiter object and consumed by handlers.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub retry_after: i64,
}

/// Per-key fixed-window limiter, one Durable Object instance per client IP.
///
/// The platform serializes requests per object, which gives the
/// single-writer-per-key guarantee the window counter needs. Object state is
/// not durable across evictions in any way we rely on: a lost window simply
/// opens fresh.
#[durable_object]
pub struct SubmitRateLimiter {
    state: State,
    env: Env,
}

#[durable_object]
impl DurableObject for SubmitRateLimiter {
    fn new(state: State, env: Env) -> Self {
        Self { state, env }
    }

    async fn fetch(&mut self, _req: Request) -> Result<Response> {
        let max_requests = env_i64_or(&self.env, "RATE_LIMIT_MAX_REQUESTS", DEFAULT_MAX_REQUESTS as i64) as u32;
        let window_secs = env_i64_or(&self.env, "RATE_LIMIT_WINDOW_SECS", DEFAULT_WINDOW_SECS);

        let now = now_ts();
        let stored: Option<Window> = self.state.storage().get(WINDOW_KEY).await.ok();

        let (decision, next) = check(stored, now, max_requests, window_secs);

        let body = match decision {
            Decision::Allowed { remaining } => {
                // Denied requests leave the window untouched, so only the
                // allowed path writes.
                self.state.storage().put(WINDOW_KEY, next).await?;
                RateDecision {
                    allowed: true,
                    remaining,
                    retry_after: 0,
                }
            }
            Decision::Denied { retry_after } => RateDecision {
                allowed: false,
                remaining: 0,
                retry_after,
            },
        };

        Response::from_json(&body)
    }
}

/// Ask the limiter object for this key whether the request may proceed.
pub async fn check_submission_allowed(env: &Env, key: &str) -> Result<RateDecision> {
    let namespace = env.durable_object("RATE_LIMITER")?;
    let stub = namespace.id_from_name(key)?.get_stub()?;

    let mut resp = stub
        .fetch_with_str("https://rate-limiter.internal/check")
        .await?;
    resp.json::<RateDecision>().await
}
