//! Reconciliation engine
//!
//! Diffs a [`DesiredEntry`] against an [`ObservedEntry`] and produces the
//! [`WorkPlan`] that converges the entry.
//!
//! Attributes the declaration does not name are never touched. Three
//! classification policies apply to declared attributes:
//!
//! - plain: missing declared values are added, extra values are tolerated;
//! - unique: an observed value that matches no declared value means drift,
//!   and the attribute is rewritten with a replace;
//! - indifferent: once the attribute exists at all, its values are left
//!   alone (used for credentials whose stored form differs from the
//!   declared placeholder). Indifferent wins over unique.
//!
//! Values are compared both verbatim and with a leading `{SCHEME}` token
//! stripped, so `{SSHA}digest` and `{CRYPT}digest` are the same value.

use std::collections::{HashMap, HashSet};

use crate::model::DesiredEntry;
use crate::observed::{strip_scheme, ObservedEntry, ObservedValue};
use crate::operation::{AttributeWork, Operation, WorkPlan};
use crate::trace::{NoopObserver, ReconcileObserver, TraceEvent};

/// Compute the work needed to converge `observed` onto `desired`.
pub fn reconcile(desired: &DesiredEntry, observed: &ObservedEntry) -> WorkPlan {
    reconcile_traced(desired, observed, &NoopObserver)
}

/// Same as [`reconcile`], reporting each comparison to `observer`.
pub fn reconcile_traced(
    desired: &DesiredEntry,
    observed: &ObservedEntry,
    observer: &dyn ReconcileObserver,
) -> WorkPlan {
    let plan = match observed {
        ObservedEntry::Absent => {
            observer.record(&TraceEvent::EntryAbsent { dn: desired.dn() });
            plan_creation(desired)
        }
        ObservedEntry::Present(_) => plan_modification(desired, observed, observer),
    };

    observer.record(&TraceEvent::Concluded {
        dn: desired.dn(),
        plan: &plan,
    });
    plan
}

fn plan_creation(desired: &DesiredEntry) -> WorkPlan {
    if !desired.ensure().is_present() {
        return WorkPlan::NoWork;
    }

    let mut work = AttributeWork::new();
    for (name, value) in desired.attributes().pairs() {
        work.push(name, Operation::add(value));
    }
    WorkPlan::Create(work)
}

fn plan_modification(
    desired: &DesiredEntry,
    observed: &ObservedEntry,
    observer: &dyn ReconcileObserver,
) -> WorkPlan {
    let ensure_present = desired.ensure().is_present();
    let declared = desired.attributes();

    let mut work = AttributeWork::new();
    for name in declared.names() {
        work.declare(name);
    }

    // Stripped forms of the observed values that matched a declared value.
    let mut found: HashMap<&str, HashSet<&str>> = HashMap::new();
    // Every attribute name the directory returned.
    let mut found_keys: HashSet<&str> = HashSet::new();

    for (name, value) in observed.pairs() {
        found_keys.insert(name);
        let Some(declared_values) = declared.get(name) else {
            continue;
        };

        let matched = declared_values.iter().any(|d| values_match(value, d));
        observer.record(&TraceEvent::Compared {
            attribute: name,
            observed: value,
            matched,
        });

        if matched {
            if !ensure_present && !has_operation(&work, name, &Operation::Delete) {
                work.push(name, Operation::Delete);
            }
            found.entry(name).or_default().insert(value.stripped());
        } else if ensure_present && desired.is_unique(name) && !desired.is_indifferent(name) {
            work.push(name, Operation::Replace);
        }
    }

    if ensure_present {
        for (name, value) in declared.pairs() {
            // A replace rewrites the whole attribute, so values that are
            // already there have to be supplied again; see
            // `present_converges_after_one_pass` in tests/reconcile_properties.rs.
            let replacing = has_operation(&work, name, &Operation::Replace);
            let already_found = !replacing
                && found
                    .get(name)
                    .is_some_and(|values| values.contains(strip_scheme(value)));
            let left_alone = desired.is_indifferent(name) && found_keys.contains(name);

            let added = !already_found && !left_alone;
            if added {
                work.push(name, Operation::add(value));
            }
            observer.record(&TraceEvent::Asserted {
                attribute: name,
                value,
                added,
            });
        }
    }

    work.prune_empty();
    if work.is_empty() {
        WorkPlan::NoWork
    } else {
        WorkPlan::Modify(work)
    }
}

/// An observed value matches a declared one when either side, verbatim or
/// scheme-stripped, equals the other.
fn values_match(observed: &ObservedValue, declared: &str) -> bool {
    let declared_stripped = strip_scheme(declared);
    [observed.raw(), observed.stripped()]
        .iter()
        .any(|o| *o == declared || *o == declared_stripped)
}

fn has_operation(work: &AttributeWork, name: &str, operation: &Operation) -> bool {
    work.get(name).is_some_and(|ops| ops.contains(operation))
}
