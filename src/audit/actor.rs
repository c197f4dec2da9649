//! Resolution of the user responsible for a mutation
//!
//! The acting user is resolved once, where a command enters the program, and
//! the resulting `Option<UserId>` is passed explicitly to every mutation.
//! Resolution never fails: anything that is not an authenticated, persisted
//! user resolves to `None`, which audit records show as the system actor.

use std::fmt;

use tracing::debug;

use crate::error::BillTrackerResult;
use crate::models::{User, UserId};

/// Lazily evaluated user lookup
pub type DeferredUser<'a> = Box<dyn FnOnce() -> BillTrackerResult<CurrentUser<'a>> + 'a>;

/// Ambient "current user" as supplied by the caller
pub enum CurrentUser<'a> {
    /// No user context at all (scripts, maintenance jobs)
    Absent,
    /// A lookup that has not been evaluated yet
    Deferred(DeferredUser<'a>),
    /// An unauthenticated placeholder
    Anonymous,
    /// A principal carrying an authentication signal
    ///
    /// `user` is `None` when the principal is not a persisted user (for
    /// example a service credential).
    Principal {
        user: Option<User>,
        is_authenticated: Option<bool>,
    },
}

impl<'a> CurrentUser<'a> {
    /// An authenticated persisted user
    pub fn authenticated(user: User) -> Self {
        CurrentUser::Principal {
            user: Some(user),
            is_authenticated: Some(true),
        }
    }

    pub fn deferred(lookup: impl FnOnce() -> BillTrackerResult<CurrentUser<'a>> + 'a) -> Self {
        CurrentUser::Deferred(Box::new(lookup))
    }
}

impl fmt::Debug for CurrentUser<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurrentUser::Absent => write!(f, "Absent"),
            CurrentUser::Deferred(_) => write!(f, "Deferred(..)"),
            CurrentUser::Anonymous => write!(f, "Anonymous"),
            CurrentUser::Principal {
                user,
                is_authenticated,
            } => f
                .debug_struct("Principal")
                .field("user", user)
                .field("is_authenticated", is_authenticated)
                .finish(),
        }
    }
}

/// Resolve a current-user handle to the persisted user it stands for
///
/// Rules, in order:
/// 1. deferred handles are forced; a failed evaluation counts as absent
/// 2. absent handles, or principals whose authentication signal is missing
///    or false, resolve to `None`
/// 3. principals that are not a persisted user resolve to `None`
/// 4. otherwise the user's id is returned
pub fn resolve_actor(handle: CurrentUser<'_>) -> Option<UserId> {
    let mut handle = handle;
    while let CurrentUser::Deferred(lookup) = handle {
        handle = match lookup() {
            Ok(resolved) => resolved,
            Err(e) => {
                debug!(error = %e, "Deferred user lookup failed; treating actor as absent");
                CurrentUser::Absent
            }
        };
    }

    match handle {
        CurrentUser::Principal {
            user: Some(user),
            is_authenticated: Some(true),
        } => user.id,
        _ => None,
    }
}
