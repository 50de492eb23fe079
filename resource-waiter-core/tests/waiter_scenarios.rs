//! End-to-end wait scenarios driven by a scripted status fetch.
//!
//! Every test runs on tokio's paused clock, so sleeps and deadlines advance
//! instantly and timing assertions are exact.

use resource_waiter_core::{
    wait_until_absent, wait_until_ready, Backoff, CancellationToken, FetchError, FetchResult,
    PollSettings, State, StateWaiter, StatusSnapshot, WaitError,
};
use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("scripted failure: {0}")]
struct ScriptError(&'static str);

/// One scripted response.
#[derive(Debug, Clone, Copy)]
enum Step {
    /// Report this state with the given payload.
    State(&'static str, u32),
    NotFound,
    Fail(&'static str),
    /// Never answer within any reasonable deadline, then report the state.
    Hang(&'static str, u32),
}

type ScriptFuture = Pin<Box<dyn Future<Output = FetchResult<u32, ScriptError>>>>;

/// Replays its steps in order, repeating the last one once exhausted.
struct Script {
    steps: Vec<Step>,
    started: Instant,
    calls: Rc<RefCell<Vec<Duration>>>,
}

impl Script {
    fn new(steps: &[Step]) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        Self {
            steps: steps.to_vec(),
            started: Instant::now(),
            calls: Rc::default(),
        }
    }

    fn fetcher(&self) -> impl FnMut() -> ScriptFuture + '_ {
        move || {
            let index = self.calls.borrow().len().min(self.steps.len() - 1);
            self.calls.borrow_mut().push(self.started.elapsed());
            let step = self.steps[index];
            Box::pin(async move {
                match step {
                    Step::State(state, payload) => Ok(StatusSnapshot::new(state, payload)),
                    Step::NotFound => Err(FetchError::NotFound),
                    Step::Fail(msg) => Err(FetchError::Failed(ScriptError(msg))),
                    Step::Hang(state, payload) => {
                        tokio::time::sleep(Duration::from_secs(3600)).await;
                        Ok(StatusSnapshot::new(state, payload))
                    }
                }
            })
        }
    }

    fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    fn call_times(&self) -> Vec<u64> {
        self.calls.borrow().iter().map(Duration::as_secs).collect()
    }
}

fn units(n: u64) -> PollSettings {
    PollSettings::new(Duration::from_secs(n)).with_poll_interval(Duration::from_secs(1))
}

#[tokio::test(start_paused = true)]
async fn test_pending_then_target_succeeds_on_third_call() {
    let script = Script::new(&[
        Step::State("CREATING", 1),
        Step::State("CREATING", 2),
        Step::State("AVAILABLE", 3),
    ]);

    let payload = wait_until_ready(script.fetcher(), ["CREATING"], ["AVAILABLE"], units(3))
        .await
        .expect("should become available");

    assert_eq!(payload, Some(3));
    assert_eq!(script.call_times(), vec![0, 1, 2]);
}

#[tokio::test(start_paused = true)]
async fn test_reached_reports_state_and_poll_count() {
    let script = Script::new(&[
        Step::State("CREATING", 1),
        Step::State("CREATED", 2),
    ]);

    let reached = StateWaiter::new(script.fetcher(), units(10))
        .pending(["CREATING"])
        .target(["AVAILABLE", "CREATED"])
        .wait()
        .await
        .expect("should be created");

    assert_eq!(reached.state, State::from("CREATED"));
    assert_eq!(reached.payload, Some(2));
    assert_eq!(reached.polls, 2);
}

#[tokio::test(start_paused = true)]
async fn test_never_resolving_times_out() {
    let script = Script::new(&[Step::State("CREATING", 1)]);
    let start = Instant::now();

    let result = wait_until_ready(script.fetcher(), ["CREATING"], ["AVAILABLE"], units(3)).await;

    match result {
        Err(WaitError::TimeoutExceeded {
            last_state,
            timeout,
            ..
        }) => {
            assert_eq!(last_state, Some(State::from("CREATING")));
            assert_eq!(timeout, Duration::from_secs(3));
        }
        other => panic!("Expected TimeoutExceeded, got {other:?}"),
    }
    assert_eq!(start.elapsed(), Duration::from_secs(3));
    assert_eq!(script.call_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_unexpected_state_stops_immediately() {
    let script = Script::new(&[
        Step::State("CREATING", 1),
        Step::State("FAILED", 2),
        Step::State("AVAILABLE", 3),
    ]);

    let result = wait_until_ready(script.fetcher(), ["CREATING"], ["AVAILABLE"], units(30)).await;

    let err = result.expect_err("FAILED is not an allowed state");
    assert!(err.is_unexpected_state());
    assert!(!err.is_timeout());
    assert!(err.to_string().contains("'FAILED'"), "{err}");
    assert_eq!(err.last_state(), Some(&State::from("FAILED")));

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(script.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_not_found_is_unexpected_unless_listed() {
    let script = Script::new(&[Step::NotFound]);

    let result = wait_until_ready(script.fetcher(), ["CREATING"], ["AVAILABLE"], units(30)).await;

    match result {
        Err(WaitError::UnexpectedState { state, .. }) => assert!(state.is_not_found()),
        other => panic!("Expected UnexpectedState, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_creation_wait_tolerates_not_found() {
    let script = Script::new(&[
        Step::NotFound,
        Step::State("CREATING", 1),
        Step::State("AVAILABLE", 2),
    ]);

    let payload = wait_until_ready(
        script.fetcher(),
        ["CREATING", "NOT_FOUND"],
        ["AVAILABLE"],
        units(30),
    )
    .await
    .expect("should become available");

    assert_eq!(payload, Some(2));
    assert_eq!(script.call_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_fetch_error_is_not_retried() {
    let script = Script::new(&[
        Step::State("CREATING", 1),
        Step::Fail("access denied"),
        Step::State("AVAILABLE", 2),
    ]);

    let result = wait_until_ready(script.fetcher(), ["CREATING"], ["AVAILABLE"], units(30)).await;

    match result {
        Err(WaitError::FetchFailed(e)) => assert_eq!(e, ScriptError("access denied")),
        other => panic!("Expected FetchFailed, got {other:?}"),
    }
    assert_eq!(script.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_deletion_wait_succeeds_on_not_found() {
    let script = Script::new(&[
        Step::State("AVAILABLE", 1),
        Step::State("DELETING", 2),
        Step::NotFound,
    ]);

    let result = wait_until_absent(script.fetcher(), ["AVAILABLE", "DELETING"], units(30)).await;

    assert!(result.is_ok(), "{result:?}");
    assert_eq!(script.call_times(), vec![0, 1, 2]);
}

#[tokio::test(start_paused = true)]
async fn test_deletion_wait_returns_on_first_not_found() {
    let script = Script::new(&[Step::NotFound, Step::State("AVAILABLE", 1)]);
    let start = Instant::now();

    wait_until_absent(script.fetcher(), ["AVAILABLE", "DELETING"], units(30))
        .await
        .expect("already gone");

    assert_eq!(script.call_count(), 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_deletion_wait_rejects_not_found_as_pending() {
    let script = Script::new(&[Step::NotFound]);

    let result = wait_until_absent(script.fetcher(), ["AVAILABLE", "NOT_FOUND"], units(30)).await;

    assert!(matches!(result, Err(WaitError::InvalidConfig(_))));
    assert_eq!(script.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_identical_sequences_give_identical_outcomes() {
    let steps = [
        Step::State("CREATING", 1),
        Step::State("CREATING", 2),
        Step::State("AVAILABLE", 9),
    ];

    let mut outcomes = Vec::new();
    for _ in 0..2 {
        let script = Script::new(&steps);
        let reached = StateWaiter::new(script.fetcher(), units(30))
            .pending(["CREATING"])
            .target(["AVAILABLE"])
            .wait()
            .await
            .expect("should become available");
        outcomes.push((reached.state, reached.payload, reached.polls, script.call_times()));
    }

    assert_eq!(outcomes[0], outcomes[1]);
}

#[tokio::test(start_paused = true)]
async fn test_slow_fetch_cannot_extend_deadline() {
    let script = Script::new(&[Step::Hang("AVAILABLE", 1)]);
    let start = Instant::now();

    let result = wait_until_ready(script.fetcher(), ["CREATING"], ["AVAILABLE"], units(10)).await;

    match result {
        Err(WaitError::TimeoutExceeded { last_state, .. }) => assert!(last_state.is_none()),
        other => panic!("Expected TimeoutExceeded, got {other:?}"),
    }
    assert_eq!(start.elapsed(), Duration::from_secs(10));
    assert_eq!(script.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_fetch_timeout_moves_on_to_next_poll() {
    let script = Script::new(&[Step::Hang("AVAILABLE", 1), Step::State("AVAILABLE", 2)]);

    let payload = wait_until_ready(
        script.fetcher(),
        ["CREATING"],
        ["AVAILABLE"],
        units(10).with_fetch_timeout(Duration::from_secs(2)),
    )
    .await
    .expect("second poll answers in time");

    assert_eq!(payload, Some(2));
    // 2s abandoned fetch, then the regular 1s interval.
    assert_eq!(script.call_times(), vec![0, 3]);
}

#[tokio::test(start_paused = true)]
async fn test_deadline_cuts_last_sleep_short() {
    let script = Script::new(&[Step::State("CREATING", 1)]);
    let start = Instant::now();
    let settings =
        PollSettings::new(Duration::from_secs(7)).with_poll_interval(Duration::from_secs(5));

    let result = wait_until_ready(script.fetcher(), ["CREATING"], ["AVAILABLE"], settings).await;

    assert!(result.expect_err("never available").is_timeout());
    assert_eq!(start.elapsed(), Duration::from_secs(7));
    assert_eq!(script.call_times(), vec![0, 5]);
}

#[tokio::test(start_paused = true)]
async fn test_exponential_backoff_schedule() {
    let script = Script::new(&[
        Step::State("CREATING", 1),
        Step::State("CREATING", 2),
        Step::State("CREATING", 3),
        Step::State("CREATING", 4),
        Step::State("AVAILABLE", 5),
    ]);
    let settings = PollSettings::new(Duration::from_secs(60)).with_backoff(Backoff::Exponential {
        initial: Duration::from_secs(1),
        max: Duration::from_secs(4),
    });

    let payload = wait_until_ready(script.fetcher(), ["CREATING"], ["AVAILABLE"], settings)
        .await
        .expect("should become available");

    assert_eq!(payload, Some(5));
    assert_eq!(script.call_times(), vec![0, 1, 3, 7, 11]);
}

#[tokio::test(start_paused = true)]
async fn test_continuous_target_occurrence_resets_on_pending() {
    let script = Script::new(&[
        Step::State("AVAILABLE", 1),
        Step::State("CREATING", 2),
        Step::State("AVAILABLE", 3),
        Step::State("AVAILABLE", 4),
    ]);

    let reached = StateWaiter::new(
        script.fetcher(),
        units(30).with_continuous_target_occurrence(2),
    )
    .pending(["CREATING"])
    .target(["AVAILABLE"])
    .wait()
    .await
    .expect("should settle on AVAILABLE");

    assert_eq!(reached.payload, Some(4));
    assert_eq!(reached.polls, 4);
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_stops_polling() {
    let script = Script::new(&[Step::State("CREATING", 1)]);
    let token = CancellationToken::new();
    let canceller = token.clone();

    let (result, ()) = tokio::join!(
        wait_until_ready(
            script.fetcher(),
            ["CREATING"],
            ["AVAILABLE"],
            units(60).with_cancellation(token),
        ),
        async move {
            tokio::time::sleep(Duration::from_millis(5500)).await;
            canceller.cancel();
        }
    );

    match result {
        Err(WaitError::Cancelled { last_state }) => {
            assert_eq!(last_state, Some(State::from("CREATING")));
        }
        other => panic!("Expected Cancelled, got {other:?}"),
    }
    assert_eq!(script.call_count(), 6);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(script.call_count(), 6);
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_interrupts_slow_fetch() {
    let script = Script::new(&[Step::Hang("AVAILABLE", 1)]);
    let token = CancellationToken::new();
    let canceller = token.clone();
    let start = Instant::now();

    let (result, ()) = tokio::join!(
        wait_until_ready(
            script.fetcher(),
            ["CREATING"],
            ["AVAILABLE"],
            units(600).with_cancellation(token),
        ),
        async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            canceller.cancel();
        }
    );

    assert!(result.expect_err("cancelled").is_cancelled());
    assert_eq!(start.elapsed(), Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn test_pre_cancelled_token_never_fetches() {
    let script = Script::new(&[Step::State("AVAILABLE", 1)]);
    let token = CancellationToken::new();
    token.cancel();

    let result = wait_until_ready(
        script.fetcher(),
        ["CREATING"],
        ["AVAILABLE"],
        units(60).with_cancellation(token),
    )
    .await;

    assert!(matches!(result, Err(WaitError::Cancelled { last_state: None })));
    assert_eq!(script.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_unrepresentable_timeout_still_polls() {
    let script = Script::new(&[Step::State("CREATING", 1), Step::State("AVAILABLE", 2)]);

    let payload = wait_until_ready(
        script.fetcher(),
        ["CREATING"],
        ["AVAILABLE"],
        PollSettings::new(Duration::from_secs(u64::MAX)).with_poll_interval(Duration::from_secs(1)),
    )
    .await
    .expect("should become available");

    assert_eq!(payload, Some(2));
    assert_eq!(script.call_times(), vec![0, 1]);
}

#[tokio::test(start_paused = true)]
async fn test_unrepresentable_interval_waits_for_deadline() {
    let script = Script::new(&[Step::State("CREATING", 1), Step::State("AVAILABLE", 2)]);
    let start = Instant::now();

    let result = wait_until_ready(
        script.fetcher(),
        ["CREATING"],
        ["AVAILABLE"],
        PollSettings::new(Duration::from_secs(60)).with_backoff(Backoff::Fixed(Duration::MAX)),
    )
    .await;

    match result {
        Err(err) => {
            assert!(err.is_timeout(), "{err}");
            assert_eq!(err.last_state(), Some(&State::from("CREATING")));
        }
        Ok(payload) => panic!("Expected a timeout, got {payload:?}"),
    }
    assert_eq!(start.elapsed(), Duration::from_secs(60));
    assert_eq!(script.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_unrepresentable_initial_delay_is_cut_by_deadline() {
    let script = Script::new(&[Step::State("AVAILABLE", 1)]);
    let start = Instant::now();

    let result = wait_until_ready(
        script.fetcher(),
        ["CREATING"],
        ["AVAILABLE"],
        units(5).with_initial_delay(Duration::MAX),
    )
    .await;

    assert!(matches!(result, Err(WaitError::TimeoutExceeded { last_state: None, .. })));
    assert_eq!(start.elapsed(), Duration::from_secs(5));
    assert_eq!(script.call_count(), 0);
}
