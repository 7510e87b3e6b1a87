//! Live data sources over the backend.
//!
//! Each source is an explicit state machine: a one-shot fetch moves it from
//! [`SourceState::Idle`] through [`SourceState::Loading`] to either
//! [`SourceState::Ready`] or [`SourceState::Error`]; change-feed events then
//! mutate the ready value in delivery order. The subscription is held only
//! between `start`/`subscribe` and `stop` (or drop).
//!
//! Fetch errors are terminal for the instance; subscription failures are
//! logged and otherwise ignored.

mod list;
mod single;
mod stats;

pub use list::{ResourceListSource, reconcile};
pub use single::{DetailState, ResourceSource};
pub use stats::{Stats, StatsSource};

use crate::backend::BackendError;

/// Lifecycle of a fetched value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SourceState<T> {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// Initial fetch in flight.
    Loading,
    Ready(T),
    /// Fetch failed; the instance stays here.
    Error(BackendError),
}

impl<T> SourceState<T> {
    /// Returns the ready value, if any.
    #[must_use]
    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the fetch error, if any.
    #[must_use]
    pub fn error(&self) -> Option<&BackendError> {
        match self {
            Self::Error(error) => Some(error),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_idle() {
        let state: SourceState<u32> = SourceState::default();
        assert_eq!(state, SourceState::Idle);
        assert!(state.ready().is_none());
        assert!(state.error().is_none());
    }

    #[test]
    fn test_accessors_match_variant() {
        let ready = SourceState::Ready(3);
        assert_eq!(ready.ready(), Some(&3));
        assert!(!ready.is_loading());

        let failed: SourceState<u32> = SourceState::Error(BackendError::realtime("x"));
        assert!(failed.error().is_some());
        assert!(SourceState::<u32>::Loading.is_loading());
    }
}
