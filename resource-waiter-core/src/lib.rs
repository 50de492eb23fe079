//! Generic waiter for remote resources that change state on their own schedule.
//!
//! A resource is polled through a caller-supplied fetch closure until its
//! state lands in a set of *target* states. States in the *pending* set keep
//! the loop going; anything else is an unexpected state and stops it. An
//! overall timeout bounds the whole wait, including slow fetch calls.
//!
//! Absence is modelled as a state: a fetch that reports
//! [`FetchError::NotFound`] is classified as [`State::NOT_FOUND`], so a
//! creation wait lists it as pending and a deletion wait uses it as the target.
//!
//! ```
//! use resource_waiter_core::{wait_until_ready, FetchError, PollSettings, StatusSnapshot};
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let fetch = || async {
//!     Ok::<_, FetchError<std::io::Error>>(StatusSnapshot::new("AVAILABLE", "prod-123"))
//! };
//!
//! let payload = wait_until_ready(
//!     fetch,
//!     ["CREATING"],
//!     ["AVAILABLE"],
//!     PollSettings::new(Duration::from_secs(180)),
//! )
//! .await
//! .expect("product should become available");
//!
//! assert_eq!(payload, Some("prod-123"));
//! # }
//! ```

mod config;
mod error;
mod state;
mod waiter;

pub use config::{Backoff, PollSettings, DEFAULT_MAX_POLL_INTERVAL, DEFAULT_POLL_INTERVAL};
pub use error::{FetchError, WaitError};
pub use state::{State, StateSet, StatusSnapshot};
pub use waiter::{wait_until_absent, wait_until_ready, FetchResult, Reached, StateWaiter};

// Re-exported so callers can cancel a wait without depending on tokio-util directly.
pub use tokio_util::sync::CancellationToken;
