//! Error types for status fetching and waiting.

use crate::state::{State, StateSet};
use std::time::Duration;
use thiserror::Error;

/// Failure signal returned by a status fetch.
#[derive(Debug, Error)]
pub enum FetchError<E> {
    /// The resource does not exist. The waiter folds this into
    /// [`State::NOT_FOUND`] instead of stopping.
    #[error("resource not found")]
    NotFound,

    /// The status query itself failed and should not be retried.
    #[error(transparent)]
    Failed(E),
}

/// Why a wait stopped without reaching a target state.
#[derive(Debug, Error)]
pub enum WaitError<E> {
    /// The deadline passed while the resource was still pending.
    #[error(
        "timeout after {timeout:?} waiting for state to become {target} (last state: {})",
        .last_state.as_ref().map_or("none", State::as_str)
    )]
    TimeoutExceeded {
        last_state: Option<State>,
        target: StateSet,
        timeout: Duration,
    },

    /// The resource reported a state that is neither pending nor target.
    #[error("unexpected state '{state}', wanted target {target} (pending: {pending})")]
    UnexpectedState {
        state: State,
        pending: StateSet,
        target: StateSet,
    },

    /// The status query returned a non-retryable error.
    #[error("error fetching resource status: {0}")]
    FetchFailed(#[source] E),

    /// The waiter was configured with overlapping or empty state sets, or a
    /// zero timeout.
    #[error("invalid waiter configuration: {0}")]
    InvalidConfig(String),

    /// The caller's cancellation token fired before the wait finished.
    #[error(
        "wait cancelled (last state: {})",
        .last_state.as_ref().map_or("none", State::as_str)
    )]
    Cancelled { last_state: Option<State> },
}

impl<E> WaitError<E> {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimeoutExceeded { .. })
    }

    pub fn is_unexpected_state(&self) -> bool {
        matches!(self, Self::UnexpectedState { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Last state observed before the wait stopped, when the error carries one.
    pub fn last_state(&self) -> Option<&State> {
        match self {
            Self::TimeoutExceeded { last_state, .. } | Self::Cancelled { last_state } => {
                last_state.as_ref()
            }
            Self::UnexpectedState { state, .. } => Some(state),
            Self::FetchFailed(_) | Self::InvalidConfig(_) => None,
        }
    }
}
