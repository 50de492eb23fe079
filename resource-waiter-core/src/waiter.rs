//! The poll loop.

use crate::config::PollSettings;
use crate::error::{FetchError, WaitError};
use crate::state::{State, StateSet, StatusSnapshot};
use std::future::Future;
use std::time::Duration;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

/// Roughly 30 years; stands in for durations an `Instant` cannot represent.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// `now + after`, clamped instead of overflowing.
fn instant_after(after: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(after)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}

/// What one invocation of a status fetch resolves to.
pub type FetchResult<P, E> = Result<StatusSnapshot<P>, FetchError<E>>;

/// A successful wait: the target state that was reached and the payload
/// returned by the poll that observed it.
#[derive(Debug, Clone)]
pub struct Reached<P> {
    pub state: State,
    pub payload: Option<P>,
    /// Number of fetch calls made, including the final one.
    pub polls: u32,
}

/// Waits for a resource to move from a pending state into a target state.
///
/// Built fresh for every wait and consumed by [`StateWaiter::wait`]; nothing
/// carries over between two waits.
pub struct StateWaiter<F> {
    pending: StateSet,
    target: StateSet,
    fetch: F,
    settings: PollSettings,
}

impl<F> StateWaiter<F> {
    pub fn new(fetch: F, settings: PollSettings) -> Self {
        Self {
            pending: StateSet::new(),
            target: StateSet::new(),
            fetch,
            settings,
        }
    }

    #[must_use]
    pub fn pending<S: Into<State>>(mut self, states: impl IntoIterator<Item = S>) -> Self {
        self.pending = states.into_iter().collect();
        self
    }

    #[must_use]
    pub fn target<S: Into<State>>(mut self, states: impl IntoIterator<Item = S>) -> Self {
        self.target = states.into_iter().collect();
        self
    }

    fn validate(&self) -> Result<(), String> {
        self.settings.validate()?;
        if self.target.is_empty() {
            return Err("at least one target state is required".to_string());
        }
        let shared: StateSet = self.pending.overlap(&self.target).cloned().collect();
        if !shared.is_empty() {
            return Err(format!("states {shared} are both pending and target"));
        }
        Ok(())
    }

    fn timed_out<E>(&self, last_state: Option<State>) -> WaitError<E> {
        log::debug!(
            "Gave up waiting for {} after {:?}",
            self.target,
            self.settings.timeout
        );
        WaitError::TimeoutExceeded {
            last_state,
            target: self.target.clone(),
            timeout: self.settings.timeout,
        }
    }
}

impl<F, Fut, P, E> StateWaiter<F>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = FetchResult<P, E>>,
{
    /// Poll until a target state is observed, an unexpected state or a fetch
    /// error occurs, the deadline passes, or the wait is cancelled.
    ///
    /// Polls never overlap. The deadline bounds both the fetch calls and the
    /// sleeps between them, so a slow fetch cannot stretch the wait beyond
    /// the configured timeout.
    pub async fn wait(mut self) -> Result<Reached<P>, WaitError<E>> {
        self.validate().map_err(WaitError::InvalidConfig)?;

        let deadline = instant_after(self.settings.timeout);
        let cancel = self.settings.cancellation.clone();
        let mut interval = self.settings.backoff.first();
        let mut last_state: Option<State> = None;
        let mut polls: u32 = 0;
        let mut target_hits: u32 = 0;

        log::debug!(
            "Waiting up to {:?} for target {} (pending: {})",
            self.settings.timeout,
            self.target,
            self.pending
        );

        if !self.settings.initial_delay.is_zero() {
            let wake = deadline.min(instant_after(self.settings.initial_delay));
            if interruptible(cancel.as_ref(), time::sleep_until(wake))
                .await
                .is_none()
            {
                return Err(WaitError::Cancelled { last_state });
            }
            if Instant::now() >= deadline {
                return Err(self.timed_out(last_state));
            }
        }

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let bound = self
                .settings
                .fetch_timeout
                .map_or(remaining, |t| t.min(remaining));
            polls += 1;

            // The fetch is only invoked once the attempt is first polled, so a
            // token that has already fired prevents the call entirely.
            let fetch = &mut self.fetch;
            let attempt = async move { time::timeout(bound, fetch()).await };
            let outcome = interruptible(cancel.as_ref(), attempt).await;
            let fetched = match outcome {
                None => return Err(WaitError::Cancelled { last_state }),
                Some(Ok(result)) => Some(result),
                Some(Err(_)) if Instant::now() >= deadline => {
                    return Err(self.timed_out(last_state));
                }
                Some(Err(_)) => {
                    log::warn!(
                        "Status fetch #{polls} did not complete within {bound:?}, polling again"
                    );
                    None
                }
            };

            if let Some(result) = fetched {
                let snapshot = match result {
                    Ok(snapshot) => snapshot,
                    Err(FetchError::NotFound) => StatusSnapshot::bare(State::NOT_FOUND),
                    Err(FetchError::Failed(e)) => {
                        log::debug!("Status fetch #{polls} failed, stopping");
                        return Err(WaitError::FetchFailed(e));
                    }
                };
                log::debug!("Poll #{polls} observed state {}", snapshot.state);

                if self.target.contains(&snapshot.state) {
                    target_hits += 1;
                    if target_hits >= self.settings.continuous_target_occurrence {
                        return Ok(Reached {
                            state: snapshot.state,
                            payload: snapshot.payload,
                            polls,
                        });
                    }
                } else if self.pending.contains(&snapshot.state) {
                    target_hits = 0;
                } else {
                    return Err(WaitError::UnexpectedState {
                        state: snapshot.state,
                        pending: self.pending,
                        target: self.target,
                    });
                }
                last_state = Some(snapshot.state);
            }

            let wake = deadline.min(instant_after(interval));
            log::trace!(
                "Next poll in {:?}",
                wake.saturating_duration_since(Instant::now())
            );
            if interruptible(cancel.as_ref(), time::sleep_until(wake))
                .await
                .is_none()
            {
                return Err(WaitError::Cancelled { last_state });
            }
            interval = self.settings.backoff.next(interval);

            if Instant::now() >= deadline {
                return Err(self.timed_out(last_state));
            }
        }
    }
}

/// Run `fut` unless `token` fires first.
async fn interruptible<T>(
    token: Option<&CancellationToken>,
    fut: impl Future<Output = T>,
) -> Option<T> {
    match token {
        Some(token) => tokio::select! {
            biased;
            () = token.cancelled() => None,
            out = fut => Some(out),
        },
        None => Some(fut.await),
    }
}

/// Wait until the resource reaches one of `target`, returning the payload
/// from the poll that observed it.
pub async fn wait_until_ready<F, Fut, P, E, S, T>(
    fetch: F,
    pending: impl IntoIterator<Item = S>,
    target: impl IntoIterator<Item = T>,
    settings: PollSettings,
) -> Result<Option<P>, WaitError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = FetchResult<P, E>>,
    S: Into<State>,
    T: Into<State>,
{
    StateWaiter::new(fetch, settings)
        .pending(pending)
        .target(target)
        .wait()
        .await
        .map(|reached| reached.payload)
}

/// Wait until the resource no longer exists.
///
/// The target is fixed to [`State::NOT_FOUND`], so a fetch that reports
/// [`FetchError::NotFound`] ends the wait successfully, including on the
/// very first poll.
pub async fn wait_until_absent<F, Fut, P, E, S>(
    fetch: F,
    pending: impl IntoIterator<Item = S>,
    settings: PollSettings,
) -> Result<(), WaitError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = FetchResult<P, E>>,
    S: Into<State>,
{
    StateWaiter::new(fetch, settings)
        .pending(pending)
        .target([State::NOT_FOUND])
        .wait()
        .await
        .map(|_| ())
}
