//! Lifecycle state labels and the per-poll status snapshot.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

/// An opaque lifecycle label reported by a remote resource, e.g. `CREATING`.
///
/// Two labels never come from the remote API itself: [`State::NOT_FOUND`] and
/// [`State::UNAVAILABLE`]. They let absence and transient unreadability be
/// classified against the same pending/target sets as real states.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct State(Cow<'static, str>);

impl State {
    /// The resource does not exist.
    pub const NOT_FOUND: Self = Self::from_static("NOT_FOUND");

    /// The resource exists but its status could not be read with confidence.
    pub const UNAVAILABLE: Self = Self::from_static("UNAVAILABLE");

    pub const fn from_static(label: &'static str) -> Self {
        Self(Cow::Borrowed(label))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_not_found(&self) -> bool {
        *self == Self::NOT_FOUND
    }
}

impl From<&str> for State {
    fn from(label: &str) -> Self {
        Self(Cow::Owned(label.to_string()))
    }
}

impl From<String> for State {
    fn from(label: String) -> Self {
        Self(Cow::Owned(label))
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unordered set of state labels, displayed as `[A, B]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateSet(BTreeSet<State>);

impl StateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, state: &State) -> bool {
        self.0.contains(state)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Labels present in both sets.
    pub fn overlap<'a>(&'a self, other: &'a Self) -> impl Iterator<Item = &'a State> {
        self.0.intersection(&other.0)
    }
}

impl<S: Into<State>> FromIterator<S> for StateSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for StateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, state) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{state}")?;
        }
        f.write_str("]")
    }
}

/// The result of one successful status query.
///
/// The payload is whatever the status collaborator returned alongside the
/// state (typically the describe-call output); the waiter never inspects it.
#[derive(Debug, Clone)]
pub struct StatusSnapshot<P> {
    pub state: State,
    pub payload: Option<P>,
}

impl<P> StatusSnapshot<P> {
    pub fn new(state: impl Into<State>, payload: P) -> Self {
        Self {
            state: state.into(),
            payload: Some(payload),
        }
    }

    /// A snapshot that carries only a state, e.g. [`State::UNAVAILABLE`].
    pub fn bare(state: impl Into<State>) -> Self {
        Self {
            state: state.into(),
            payload: None,
        }
    }
}
