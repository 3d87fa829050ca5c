//! Reconciliation pass driver
//!
//! Runs one pass for one entry: search, parse, reconcile, report the signal,
//! and later apply the evaluated plan. A provider keeps no per-pass state, so
//! one instance can serve concurrent passes for different entries.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::directive::{compile, DirectiveDocument};
use crate::error::{LdapDnError, LdapDnResult};
use crate::ids::PassId;
use crate::model::DesiredEntry;
use crate::observed::ObservedEntry;
use crate::operation::WorkPlan;
use crate::reconcile::reconcile_traced;
use crate::signal::{needs_sync, Signal};
use crate::trace::{ReconcileObserver, TracingObserver};
use crate::traits::Directory;
use crate::types::Ensure;

/// Result of evaluating one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub pass_id: PassId,
    pub ensure: Ensure,
    pub plan: WorkPlan,
    pub signal: Signal,
}

impl Evaluation {
    /// Whether the entry already matches its declaration.
    pub fn is_in_sync(&self) -> bool {
        self.plan.is_no_work()
    }
}

/// Drives reconciliation passes against a directory collaborator.
pub struct LdapDnProvider<D> {
    directory: D,
    observer: Arc<dyn ReconcileObserver>,
}

impl<D: Directory> LdapDnProvider<D> {
    /// Create a provider that traces through `tracing`.
    pub fn new(directory: D) -> Self {
        Self {
            directory,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replace the trace observer.
    pub fn with_observer(mut self, observer: Arc<dyn ReconcileObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Read the live state of the declared entry.
    pub async fn observe(&self, desired: &DesiredEntry) -> LdapDnResult<ObservedEntry> {
        let response = self
            .directory
            .search(desired.dn(), desired.auth_options())
            .await?;
        Ok(ObservedEntry::from_search(response))
    }

    /// Search the entry and work out what a pass would change.
    #[instrument(skip(self, desired), fields(dn = %desired.dn()))]
    pub async fn evaluate(&self, desired: &DesiredEntry) -> LdapDnResult<Evaluation> {
        let pass_id = PassId::new();
        debug!(pass_id = %pass_id, ensure = %desired.ensure(), "Evaluating entry");

        let observed = self.observe(desired).await?;
        let plan = reconcile_traced(desired, &observed, self.observer.as_ref());
        let signal = needs_sync(&plan, desired.ensure());

        debug!(pass_id = %pass_id, signal = %signal, "Entry evaluated");

        Ok(Evaluation {
            pass_id,
            ensure: desired.ensure(),
            plan,
            signal,
        })
    }

    /// Apply an evaluated plan. Returns the submitted document, or `None`
    /// when the plan had no work.
    #[instrument(skip(self, desired, evaluation), fields(dn = %desired.dn(), pass_id = %evaluation.pass_id))]
    pub async fn apply(
        &self,
        desired: &DesiredEntry,
        evaluation: &Evaluation,
    ) -> LdapDnResult<Option<DirectiveDocument>> {
        let Some(document) = compile(desired.dn(), &evaluation.plan) else {
            debug!("Nothing to apply");
            return Ok(None);
        };

        debug!(kind = %document.kind(), document = %document, "Applying directives");

        self.directory
            .apply(&document, desired.auth_options())
            .await
            .map_err(|e| match e {
                LdapDnError::ApplyFailed { .. } => e,
                other => LdapDnError::apply_failed(
                    document.kind(),
                    desired.dn(),
                    document.to_ldif(),
                    other.to_string(),
                ),
            })?;

        info!(kind = %document.kind(), "LDAP entry updated successfully");
        Ok(Some(document))
    }
}

impl<D> std::fmt::Debug for LdapDnProvider<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LdapDnProvider").finish_non_exhaustive()
    }
}
