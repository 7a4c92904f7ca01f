//! UI thread affinity.
//!
//! Every [`ElementTree`](crate::tree::ElementTree) is bound to the thread that
//! created it. Touching it from another thread is handled according to a
//! [`ThreadAccessPolicy`]. Marshalling work back onto the UI thread is the
//! host's job; this module only enforces the same-thread contract.

use std::collections::HashSet;
use std::thread::{self, ThreadId};

use parking_lot::Mutex;

use crate::error::{Result, UiError};

// ---------------------------------------------------------------------------
// ThreadAccessPolicy
// ---------------------------------------------------------------------------

/// What happens when UI state is accessed off its owning thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThreadAccessPolicy {
    /// No checks at all.
    Disabled,
    /// Log one warning per operation name, then carry on.
    WarnOnly,
    /// Fallible operations return [`UiError::CrossThreadAccess`]; infallible
    /// ones panic.
    ThrowException,
}

impl Default for ThreadAccessPolicy {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            ThreadAccessPolicy::ThrowException
        } else {
            ThreadAccessPolicy::WarnOnly
        }
    }
}

// ---------------------------------------------------------------------------
// ThreadGuard
// ---------------------------------------------------------------------------

/// Records the owning thread and applies the access policy.
#[derive(Debug)]
pub struct ThreadGuard {
    owner: ThreadId,
    policy: ThreadAccessPolicy,
    warned: Mutex<HashSet<&'static str>>,
}

impl ThreadGuard {
    /// Bind a guard to the current thread.
    pub fn new(policy: ThreadAccessPolicy) -> Self {
        Self {
            owner: thread::current().id(),
            policy,
            warned: Mutex::new(HashSet::new()),
        }
    }

    /// The active policy.
    pub fn policy(&self) -> ThreadAccessPolicy {
        self.policy
    }

    /// Change the policy at runtime.
    pub fn set_policy(&mut self, policy: ThreadAccessPolicy) {
        self.policy = policy;
    }

    /// Whether the calling thread is the owning thread.
    pub fn is_owner(&self) -> bool {
        thread::current().id() == self.owner
    }

    /// Check access for a fallible operation.
    pub fn check(&self, operation: &'static str) -> Result<()> {
        if self.policy == ThreadAccessPolicy::Disabled || self.is_owner() {
            return Ok(());
        }
        match self.policy {
            ThreadAccessPolicy::ThrowException => Err(UiError::CrossThreadAccess { operation }),
            _ => {
                self.warn_once(operation);
                Ok(())
            }
        }
    }

    /// Check access for an infallible operation.
    ///
    /// # Panics
    ///
    /// Panics off-thread when the policy is [`ThreadAccessPolicy::ThrowException`].
    pub fn verify(&self, operation: &'static str) {
        if let Err(err) = self.check(operation) {
            panic!("{err}");
        }
    }

    fn warn_once(&self, operation: &'static str) {
        if self.warned.lock().insert(operation) {
            log::warn!(
                "UI state accessed from {:?} in {operation}; owner is {:?}",
                thread::current().id(),
                self.owner
            );
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
