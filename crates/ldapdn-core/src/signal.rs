//! Sync-signal reporter
//!
//! A host convergence loop only understands "does the entry exist?" followed
//! by create-or-destroy. A partially converged multi-attribute entry does not
//! fit that question, so the answer is derived from the work plan and the
//! declared ensure state here, and nowhere else.

use serde::Serialize;
use std::fmt;

use crate::operation::WorkPlan;
use crate::types::Ensure;

/// Two-valued answer handed to the host present/absent loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Converged,
    ActionRequired,
}

impl Signal {
    /// The boolean "entry exists" form of the signal.
    ///
    /// For `ensure: present` a host loop calls create when this is false; for
    /// `ensure: absent` it calls destroy when this is true. Both routes end
    /// in applying the pending work plan.
    #[must_use]
    pub fn entry_exists(&self) -> bool {
        matches!(self, Signal::Converged)
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Converged => "converged",
            Signal::ActionRequired => "action_required",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Map a work plan and ensure state onto the host loop's signal.
///
/// The mapping is inverted for `ensure: absent`: outstanding work there means
/// the values still exist and must be destroyed, which the host loop learns
/// as `Converged` ("exists").
#[must_use]
pub fn needs_sync(plan: &WorkPlan, ensure: Ensure) -> Signal {
    match (plan.has_work(), ensure) {
        (false, Ensure::Present) | (true, Ensure::Absent) => Signal::Converged,
        (true, Ensure::Present) | (false, Ensure::Absent) => Signal::ActionRequired,
    }
}

/// Whether the host loop would act on this signal for the given ensure state.
#[must_use]
pub fn host_would_apply(signal: Signal, ensure: Ensure) -> bool {
    match ensure {
        Ensure::Present => !signal.entry_exists(),
        Ensure::Absent => signal.entry_exists(),
    }
}
