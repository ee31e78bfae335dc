use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_REQUESTS: u32 = 5;
pub const DEFAULT_WINDOW_SECS: i64 = 60;

/// Fixed-window counter state for one limiter key.
///
/// `reset_at` is pinned when the window opens (first request), not slid on
/// later requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub count: u32,
    pub reset_at: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: u32 },
    Denied { retry_after: i64 },
}

/// Advance the window machine by one request.
///
/// Returns the decision plus the state to persist. A denied request leaves the
/// state untouched, so callers may skip the write in that case. A missing or
/// expired window always opens fresh (losing state fails open).
pub fn check(current: Option<Window>, now: i64, max_requests: u32, window_secs: i64) -> (Decision, Window) {
    match current {
        Some(w) if now < w.reset_at => {
            if w.count < max_requests {
                let next = Window {
                    count: w.count + 1,
                    reset_at: w.reset_at,
                };
                (
                    Decision::Allowed {
                        remaining: max_requests - next.count,
                    },
                    next,
                )
            } else {
                (
                    Decision::Denied {
                        retry_after: (w.reset_at - now).max(1),
                    },
                    w,
                )
            }
        }
        _ => {
            let next = Window {
                count: 1,
                reset_at: now + window_secs,
            };
            (
                Decision::Allowed {
                    remaining: max_requests.saturating_sub(1),
                },
                next,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: u32 = DEFAULT_MAX_REQUESTS;
    const SECS: i64 = DEFAULT_WINDOW_SECS;

    fn run(n: usize, start: Option<Window>, now: i64) -> (Decision, Window) {
        let mut state = start;
        let mut last = None;
        for _ in 0..n {
            let (d, w) = check(state, now, MAX, SECS);
            if matches!(d, Decision::Allowed { .. }) {
                state = Some(w);
            }
            last = Some((d, w));
        }
        last.expect("at least one request")
    }

    #[test]
    fn first_request_opens_window() {
        let (decision, window) = check(None, 100, MAX, SECS);
        assert_eq!(decision, Decision::Allowed { remaining: 4 });
        assert_eq!(window, Window { count: 1, reset_at: 160 });
    }

    #[test]
    fn sixth_request_in_window_is_denied() {
        let (decision, window) = run(6, None, 100);
        assert!(matches!(decision, Decision::Denied { .. }));
        // Denied requests do not consume budget.
        assert_eq!(window.count, MAX);
    }

    #[test]
    fn denied_reports_seconds_until_reset() {
        let full = Window { count: MAX, reset_at: 160 };
        let (decision, _) = check(Some(full), 130, MAX, SECS);
        assert_eq!(decision, Decision::Denied { retry_after: 30 });
    }

    #[test]
    fn window_expiry_starts_fresh() {
        let full = Window { count: MAX, reset_at: 160 };
        // 61 seconds after the first request: a new window opens.
        let (decision, window) = check(Some(full), 161, MAX, SECS);
        assert_eq!(decision, Decision::Allowed { remaining: 4 });
        assert_eq!(window, Window { count: 1, reset_at: 221 });
    }

    #[test]
    fn reset_boundary_is_not_slid_by_later_requests() {
        let (_, first) = check(None, 100, MAX, SECS);
        let (_, second) = check(Some(first), 130, MAX, SECS);
        assert_eq!(second.reset_at, first.reset_at);
    }
}
