//! Reconciliation trace hook
//!
//! The engine reports what it compares and concludes through a
//! [`ReconcileObserver`]. Observers only watch: nothing they do can change the
//! resulting [`WorkPlan`].

use crate::observed::ObservedValue;
use crate::operation::WorkPlan;

/// A diagnostic event raised while reconciling one entry.
#[derive(Debug, Clone, Copy)]
pub enum TraceEvent<'a> {
    /// The search found no entry.
    EntryAbsent { dn: &'a str },
    /// An observed value of a declared attribute was compared.
    Compared {
        attribute: &'a str,
        observed: &'a ObservedValue,
        matched: bool,
    },
    /// A declared value was checked for presence.
    Asserted {
        attribute: &'a str,
        value: &'a str,
        added: bool,
    },
    /// The pass reached its result.
    Concluded { dn: &'a str, plan: &'a WorkPlan },
}

/// Receives [`TraceEvent`]s from the engine.
pub trait ReconcileObserver: Send + Sync {
    fn record(&self, event: &TraceEvent<'_>);
}

/// Observer that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ReconcileObserver for NoopObserver {
    fn record(&self, _event: &TraceEvent<'_>) {}
}

/// Observer that forwards events to `tracing` at debug/trace level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ReconcileObserver for TracingObserver {
    fn record(&self, event: &TraceEvent<'_>) {
        match *event {
            TraceEvent::EntryAbsent { dn } => {
                tracing::debug!(dn = %dn, "Could not find object");
            }
            TraceEvent::Compared {
                attribute,
                observed,
                matched,
            } => {
                tracing::trace!(
                    attribute = %attribute,
                    value = %observed.raw(),
                    matched,
                    "Compared observed value"
                );
            }
            TraceEvent::Asserted {
                attribute,
                value,
                added,
            } => {
                tracing::trace!(attribute = %attribute, value = %value, added, "Asserted value");
            }
            TraceEvent::Concluded { dn, plan } => {
                tracing::debug!(dn = %dn, plan = %plan, "Reconciliation concluded");
            }
        }
    }
}
