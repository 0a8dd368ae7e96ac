//! Bounded fixed-interval polling.
//!
//! Turns a server-side operation that completes asynchronously into an
//! awaitable one: a probe is issued immediately, then once per interval, until
//! the success predicate holds, the failure predicate holds, the probe errors,
//! or the attempt budget runs out.
//!
//! Attempts are strictly serialized. Ticks follow a fixed schedule, but a new
//! attempt never starts before the previous probe's result has been observed;
//! a probe that overruns the interval is followed immediately by the next one.
//! All scheduling lives inside the returned future, so nothing fires after it
//! resolves or is dropped.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};

use crate::{Error, Result};

/// Interval between probes used by every built-in poll.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3_000);
/// Attempt budget for login confirmation.
pub const DEFAULT_LOGIN_POLL_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    pub interval: Duration,
    /// `None` polls until success or failure.
    pub max_attempts: Option<u32>,
}

impl PollOptions {
    pub const fn new(interval: Duration, max_attempts: Option<u32>) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    pub const fn login() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, Some(DEFAULT_LOGIN_POLL_ATTEMPTS))
    }

    pub const fn upload() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, None)
    }

    pub const fn revoke() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, None)
    }

    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub const fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(Error::validation("poll interval must be greater than zero"));
        }
        if self.max_attempts == Some(0) {
            return Err(Error::validation("poll attempt budget must be at least 1"));
        }
        Ok(())
    }
}

impl Default for PollOptions {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, None)
    }
}

/// A named polling loop.
#[derive(Debug, Clone, Copy)]
pub struct Poller {
    operation: &'static str,
    options: PollOptions,
}

impl Poller {
    pub const fn new(operation: &'static str, options: PollOptions) -> Self {
        Self { operation, options }
    }

    pub const fn options(&self) -> PollOptions {
        self.options
    }

    /// Polls until `is_success` holds. There is no failure state; only the
    /// attempt budget or a probe error ends the loop early.
    pub async fn run_until<S, P, Fut, Done>(&self, probe: P, is_success: Done) -> Result<S>
    where
        S: fmt::Debug,
        P: FnMut() -> Fut,
        Fut: Future<Output = Result<S>>,
        Done: Fn(&S) -> bool,
    {
        self.run(probe, is_success, |_| false).await
    }

    /// Runs the loop and returns the first state satisfying `is_success`.
    ///
    /// Fails with `PollFailed` on the first state satisfying `is_failure`,
    /// with `PollTimeout` once the budget is spent, and with the probe's own
    /// error if a probe fails.
    pub async fn run<S, P, Fut, Done, Failed>(
        &self,
        mut probe: P,
        is_success: Done,
        is_failure: Failed,
    ) -> Result<S>
    where
        S: fmt::Debug,
        P: FnMut() -> Fut,
        Fut: Future<Output = Result<S>>,
        Done: Fn(&S) -> bool,
        Failed: Fn(&S) -> bool,
    {
        self.options.validate()?;

        let mut ticker = time::interval(self.options.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut attempts: u32 = 0;
        loop {
            ticker.tick().await;
            attempts = attempts.saturating_add(1);

            let state = probe().await?;
            tracing::debug!(
                operation = self.operation,
                attempt = attempts,
                ?state,
                "poll probe completed"
            );

            if is_success(&state) {
                return Ok(state);
            }
            if is_failure(&state) {
                return Err(Error::PollFailed {
                    operation: self.operation,
                    state: format!("{state:?}"),
                });
            }
            if self.options.max_attempts.is_some_and(|max| attempts >= max) {
                tracing::warn!(
                    operation = self.operation,
                    attempts,
                    "poll attempt budget exhausted"
                );
                return Err(Error::PollTimeout {
                    operation: self.operation,
                    attempts,
                });
            }
        }
    }
}
