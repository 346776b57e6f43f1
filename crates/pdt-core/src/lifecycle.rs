//! Per-record lifecycle state
//!
//! Each mod record carries a [`Lifecycle`] tag that decides which store
//! operation a commit issues for it. Transitions are explicit methods; any
//! move the state machine does not define is rejected with
//! [`Error::InvalidTransition`].
//!
//! ```text
//! Fresh      -> New         queued for creation
//! Fresh      -> Unmodified  read from the store
//! Unmodified -> Updated     fields changed
//! New        -> Updated     fields changed before the first commit
//! New        -> Unmodified  create acknowledged
//! Updated    -> Unmodified  overwrite acknowledged
//! (any but Deleted) -> Deleted
//! ```

use std::fmt;

use crate::{Error, Result};

/// Lifecycle state of a single record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// Constructed locally, never persisted and not yet queued
    #[default]
    Fresh,
    /// Matches the remote document
    Unmodified,
    /// Created locally, pending a create
    New,
    /// Fields changed locally, pending an overwrite
    Updated,
    /// Removal requested, pending a delete
    Deleted,
}

impl Lifecycle {
    /// Whether a commit has work to do for a record in this state
    pub fn is_pending(self) -> bool {
        match self {
            Lifecycle::New | Lifecycle::Updated | Lifecycle::Deleted => true,
            Lifecycle::Fresh | Lifecycle::Unmodified => false,
        }
    }

    /// A record was read from the store
    pub fn fetched(self) -> Result<Self> {
        match self {
            Lifecycle::Fresh | Lifecycle::Unmodified => Ok(Lifecycle::Unmodified),
            other => Err(other.invalid(Lifecycle::Unmodified)),
        }
    }

    /// A record was queued for creation
    pub fn created(self) -> Result<Self> {
        match self {
            Lifecycle::Fresh | Lifecycle::New => Ok(Lifecycle::New),
            other => Err(other.invalid(Lifecycle::New)),
        }
    }

    /// A record's fields changed
    pub fn edited(self) -> Result<Self> {
        match self {
            Lifecycle::Unmodified | Lifecycle::New | Lifecycle::Updated => Ok(Lifecycle::Updated),
            other => Err(other.invalid(Lifecycle::Updated)),
        }
    }

    /// A record was re-submitted with identical fields
    ///
    /// Pending creates and overwrites are kept: the remote document still
    /// differs from the local one.
    pub fn unchanged(self) -> Result<Self> {
        match self {
            Lifecycle::Fresh | Lifecycle::Unmodified => Ok(Lifecycle::Unmodified),
            Lifecycle::New | Lifecycle::Updated => Ok(self),
            Lifecycle::Deleted => Err(self.invalid(Lifecycle::Unmodified)),
        }
    }

    /// Removal was requested
    pub fn removed(self) -> Result<Self> {
        match self {
            Lifecycle::Fresh | Lifecycle::Unmodified | Lifecycle::New | Lifecycle::Updated => {
                Ok(Lifecycle::Deleted)
            }
            Lifecycle::Deleted => Err(self.invalid(Lifecycle::Deleted)),
        }
    }

    /// The pending create or overwrite was acknowledged by the store
    pub fn committed(self) -> Result<Self> {
        match self {
            Lifecycle::New | Lifecycle::Updated => Ok(Lifecycle::Unmodified),
            other => Err(other.invalid(Lifecycle::Unmodified)),
        }
    }

    fn invalid(self, to: Lifecycle) -> Error {
        Error::InvalidTransition {
            record: String::new(),
            from: self.to_string(),
            to: to.to_string(),
        }
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Lifecycle::Fresh => "Fresh",
            Lifecycle::Unmodified => "Unmodified",
            Lifecycle::New => "New",
            Lifecycle::Updated => "Updated",
            Lifecycle::Deleted => "Deleted",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn default_is_fresh() {
        assert_eq!(Lifecycle::default(), Lifecycle::Fresh);
    }

    #[rstest]
    #[case(Lifecycle::Fresh, false)]
    #[case(Lifecycle::Unmodified, false)]
    #[case(Lifecycle::New, true)]
    #[case(Lifecycle::Updated, true)]
    #[case(Lifecycle::Deleted, true)]
    fn pending_states(#[case] state: Lifecycle, #[case] pending: bool) {
        assert_eq!(state.is_pending(), pending);
    }

    #[rstest]
    #[case(Lifecycle::Fresh, Lifecycle::Unmodified)]
    #[case(Lifecycle::Unmodified, Lifecycle::Unmodified)]
    fn fetched_settles_to_unmodified(#[case] from: Lifecycle, #[case] to: Lifecycle) {
        assert_eq!(from.fetched().unwrap(), to);
    }

    #[test]
    fn fetched_rejects_pending_states() {
        assert!(Lifecycle::New.fetched().is_err());
        assert!(Lifecycle::Deleted.fetched().is_err());
    }

    #[rstest]
    #[case(Lifecycle::Unmodified)]
    #[case(Lifecycle::New)]
    #[case(Lifecycle::Updated)]
    fn edits_become_updated(#[case] from: Lifecycle) {
        assert_eq!(from.edited().unwrap(), Lifecycle::Updated);
    }

    #[test]
    fn editing_fresh_or_deleted_is_rejected() {
        let err = Lifecycle::Deleted.edited().unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidTransition { ref from, ref to, .. } if from == "Deleted" && to == "Updated"
        ));
        assert!(Lifecycle::Fresh.edited().is_err());
    }

    #[test]
    fn unchanged_keeps_pending_writes() {
        assert_eq!(Lifecycle::Unmodified.unchanged().unwrap(), Lifecycle::Unmodified);
        assert_eq!(Lifecycle::Fresh.unchanged().unwrap(), Lifecycle::Unmodified);
        assert_eq!(Lifecycle::New.unchanged().unwrap(), Lifecycle::New);
        assert_eq!(Lifecycle::Updated.unchanged().unwrap(), Lifecycle::Updated);
        assert!(Lifecycle::Deleted.unchanged().is_err());
    }

    #[test]
    fn remove_is_terminal() {
        for state in [
            Lifecycle::Fresh,
            Lifecycle::Unmodified,
            Lifecycle::New,
            Lifecycle::Updated,
        ] {
            assert_eq!(state.removed().unwrap(), Lifecycle::Deleted);
        }
        assert!(Lifecycle::Deleted.removed().is_err());
    }

    #[test]
    fn commit_acknowledges_only_writes() {
        assert_eq!(Lifecycle::New.committed().unwrap(), Lifecycle::Unmodified);
        assert_eq!(Lifecycle::Updated.committed().unwrap(), Lifecycle::Unmodified);
        assert!(Lifecycle::Unmodified.committed().is_err());
        assert!(Lifecycle::Deleted.committed().is_err());
        assert!(Lifecycle::Fresh.committed().is_err());
    }
}
