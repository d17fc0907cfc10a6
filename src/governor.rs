//! Shared request budget for every symbol worker.
//!
//! The budget is a fixed window that restarts lazily: the first caller to
//! arrive after the window has elapsed resets the count and opens a new
//! window starting at its own arrival time.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use log::info;
use tokio::time::{sleep, Instant};

use crate::config::HarvestConfig;

struct BudgetState {
    count: u32,
    window_end: Instant,
}

enum Admission {
    Granted,
    Wait(Duration),
}

/// Caps outbound requests per budget window across all tasks sharing it.
pub struct RequestGovernor {
    limit: u32,
    period: Duration,
    state: Mutex<BudgetState>,
}

impl RequestGovernor {
    pub fn new(limit: u32, period: Duration) -> Self {
        Self {
            limit: limit.max(1),
            period,
            state: Mutex::new(BudgetState {
                count: 0,
                window_end: Instant::now() + period,
            }),
        }
    }

    pub fn from_config(config: &HarvestConfig) -> Self {
        Self::new(config.max_requests_per_window, config.budget_window)
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Requests granted so far in the current window.
    pub fn granted_in_window(&self) -> u32 {
        self.lock_state().count
    }

    /// Wait until a request slot is free, then consume it.
    ///
    /// Never fails. Waiters are not queued: whoever re-checks first after the
    /// window rolls over gets the slot.
    pub async fn acquire(&self) {
        loop {
            match self.try_acquire(Instant::now()) {
                Admission::Granted => return,
                Admission::Wait(wait) => {
                    info!("Rate limit reached. Waiting for {:?}...", wait);
                    sleep(wait).await;
                }
            }
        }
    }

    // The lock is only held for the counter update; callers sleep without it.
    fn try_acquire(&self, now: Instant) -> Admission {
        let mut state = self.lock_state();

        if now >= state.window_end {
            info!(
                "--- Request count reset. Previous window's count: {} ---",
                state.count
            );
            state.count = 0;
            state.window_end = now + self.period;
        }

        if state.count < self.limit {
            state.count += 1;
            info!(
                "Request permitted. Current window's count: {}/{}",
                state.count, self.limit
            );
            return Admission::Granted;
        }

        Admission::Wait(state.window_end.saturating_duration_since(now))
    }

    fn lock_state(&self) -> MutexGuard<'_, BudgetState> {
        // Plain counters: a panicked holder cannot leave them half-updated.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn grants_up_to_limit_without_waiting() {
        let governor = RequestGovernor::new(3, Duration::from_secs(61));
        let start = Instant::now();

        for _ in 0..3 {
            governor.acquire().await;
        }

        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(governor.granted_in_window(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn blocks_until_the_window_rolls_over() {
        let period = Duration::from_secs(61);
        let governor = RequestGovernor::new(2, period);
        let start = Instant::now();

        governor.acquire().await;
        governor.acquire().await;
        governor.acquire().await;

        assert!(
            start.elapsed() >= period,
            "third grant came after {:?}",
            start.elapsed()
        );
        assert_eq!(governor.granted_in_window(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_window_resets_on_next_access() {
        let period = Duration::from_secs(10);
        let governor = RequestGovernor::new(1, period);

        governor.acquire().await;
        tokio::time::advance(Duration::from_secs(30)).await;

        let before = Instant::now();
        governor.acquire().await;
        assert_eq!(before.elapsed(), Duration::ZERO);
        assert_eq!(governor.granted_in_window(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_never_exceed_the_window_cap() {
        let period = Duration::from_secs(10);
        let governor = Arc::new(RequestGovernor::new(2, period));
        let start = Instant::now();

        let handles: Vec<_> = (0..5)
            .map(|_| {
                let governor = Arc::clone(&governor);
                tokio::spawn(async move {
                    governor.acquire().await;
                    start.elapsed()
                })
            })
            .collect();

        let mut per_window = [0u32; 8];
        for handle in handles {
            let elapsed = handle.await.expect("task completes");
            let window = (elapsed.as_secs() / period.as_secs()) as usize;
            per_window[window] += 1;
        }

        assert_eq!(per_window.iter().sum::<u32>(), 5);
        assert!(
            per_window.iter().all(|&grants| grants <= 2),
            "window grants: {per_window:?}"
        );
        assert_eq!(per_window[0], 2);
    }

    #[test]
    fn zero_limit_is_clamped() {
        let governor = RequestGovernor::new(0, Duration::from_secs(1));
        assert_eq!(governor.limit(), 1);
    }
}
