//! Poll timing configuration.

use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Default interval between two status queries.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Upper bound for [`Backoff::terraform`], matching Terraform's state-change waiter.
pub const DEFAULT_MAX_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Delay schedule between polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Same delay before every poll.
    Fixed(Duration),
    /// Start at `initial` and double after every poll, capped at `max`.
    Exponential { initial: Duration, max: Duration },
}

impl Backoff {
    /// 100ms doubling up to 10s.
    pub const fn terraform() -> Self {
        Self::Exponential {
            initial: Duration::from_millis(100),
            max: DEFAULT_MAX_POLL_INTERVAL,
        }
    }

    pub(crate) fn first(&self) -> Duration {
        match *self {
            Self::Fixed(d) => d,
            Self::Exponential { initial, max } => initial.min(max),
        }
    }

    pub(crate) fn next(&self, current: Duration) -> Duration {
        match *self {
            Self::Fixed(d) => d,
            Self::Exponential { max, .. } => current.saturating_mul(2).min(max),
        }
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Fixed(DEFAULT_POLL_INTERVAL)
    }
}

/// Timing and cancellation settings for one wait call.
///
/// Timeouts per resource kind belong at the call site:
///
/// ```
/// use resource_waiter_core::{Backoff, PollSettings};
/// use std::time::Duration;
///
/// const PRODUCT_READY_TIMEOUT: Duration = Duration::from_secs(180);
///
/// let settings = PollSettings::new(PRODUCT_READY_TIMEOUT)
///     .with_backoff(Backoff::Fixed(Duration::from_secs(5)))
///     .with_fetch_timeout(Duration::from_secs(30));
/// assert_eq!(settings.timeout(), PRODUCT_READY_TIMEOUT);
/// ```
#[derive(Debug, Clone)]
pub struct PollSettings {
    pub(crate) timeout: Duration,
    pub(crate) backoff: Backoff,
    pub(crate) initial_delay: Duration,
    pub(crate) fetch_timeout: Option<Duration>,
    pub(crate) continuous_target_occurrence: u32,
    pub(crate) cancellation: Option<CancellationToken>,
}

impl PollSettings {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            backoff: Backoff::default(),
            initial_delay: Duration::ZERO,
            fetch_timeout: None,
            continuous_target_occurrence: 1,
            cancellation: None,
        }
    }

    #[must_use]
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Shorthand for `with_backoff(Backoff::Fixed(interval))`.
    #[must_use]
    pub fn with_poll_interval(self, interval: Duration) -> Self {
        self.with_backoff(Backoff::Fixed(interval))
    }

    /// Sleep this long before the first poll.
    #[must_use]
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Bound each individual fetch. A fetch that overruns this bound (but not
    /// the overall deadline) is abandoned and the next poll is scheduled.
    #[must_use]
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    /// Require the target to be observed on this many consecutive polls.
    #[must_use]
    pub fn with_continuous_target_occurrence(mut self, count: u32) -> Self {
        self.continuous_target_occurrence = count;
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn backoff(&self) -> Backoff {
        self.backoff
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.timeout.is_zero() {
            return Err("timeout must be greater than zero".to_string());
        }
        if self.continuous_target_occurrence == 0 {
            return Err("continuous target occurrence must be at least 1".to_string());
        }
        if self.fetch_timeout.is_some_and(|t| t.is_zero()) {
            return Err("fetch timeout must be greater than zero".to_string());
        }
        if self.backoff.first().is_zero() {
            return Err("poll interval must be greater than zero".to_string());
        }
        Ok(())
    }
}
