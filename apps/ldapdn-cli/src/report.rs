//! Per-entry results of a run and their text rendering

use ldapdn_core::prelude::*;
use serde::Serialize;

/// What a run did (or would do) to one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryAction {
    /// Entry is missing and gets created
    Create,
    /// Declared values get added or replaced
    Update,
    /// Declared values get removed
    Delete,
    /// Entry matches its declaration
    Unchanged,
    /// Evaluation or apply failed
    Failed,
}

impl EntryAction {
    /// The action implied by an evaluated plan.
    pub fn for_plan(plan: &WorkPlan, ensure: Ensure) -> Self {
        match (plan, ensure) {
            (WorkPlan::NoWork, _) => EntryAction::Unchanged,
            (WorkPlan::Create(_), _) => EntryAction::Create,
            (WorkPlan::Modify(_), Ensure::Present) => EntryAction::Update,
            (WorkPlan::Modify(_), Ensure::Absent) => EntryAction::Delete,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            EntryAction::Create => "+",
            EntryAction::Update => "~",
            EntryAction::Delete => "-",
            EntryAction::Unchanged => "=",
            EntryAction::Failed => "✗",
        }
    }

    pub fn display(&self) -> &'static str {
        match self {
            EntryAction::Create => "Create",
            EntryAction::Update => "Update",
            EntryAction::Delete => "Delete values",
            EntryAction::Unchanged => "No changes",
            EntryAction::Failed => "Failed",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            EntryAction::Create => "\x1b[32m",    // Green
            EntryAction::Update => "\x1b[33m",    // Yellow
            EntryAction::Delete => "\x1b[35m",    // Magenta
            EntryAction::Unchanged => "\x1b[90m", // Gray
            EntryAction::Failed => "\x1b[31m",    // Red
        }
    }

    pub fn is_change(&self) -> bool {
        matches!(
            self,
            EntryAction::Create | EntryAction::Update | EntryAction::Delete
        )
    }
}

/// Outcome for one declared entry.
#[derive(Debug, Clone, Serialize)]
pub struct EntryReport {
    pub name: String,
    pub dn: String,
    pub ensure: Ensure,
    pub action: EntryAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal: Option<Signal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<WorkPlan>,
    /// LDIF that was (or would be) submitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    /// "applied", "pending" or "failed"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<&'static str>,
}

impl EntryReport {
    /// Report for an entry whose evaluation succeeded.
    pub fn evaluated(declaration: &EntryDeclaration, evaluation: &Evaluation) -> Self {
        let action = EntryAction::for_plan(&evaluation.plan, evaluation.ensure);
        Self {
            name: declaration.name.clone(),
            dn: declaration.dn().to_string(),
            ensure: evaluation.ensure,
            action,
            signal: Some(evaluation.signal),
            plan: Some(evaluation.plan.clone()),
            document: compile(declaration.dn(), &evaluation.plan).map(|d| d.to_ldif()),
            status: action.is_change().then(|| "pending".to_string()),
            error: None,
            error_code: None,
        }
    }

    /// Report for an entry that could not be evaluated.
    pub fn failed(declaration: &EntryDeclaration, error: &LdapDnError) -> Self {
        let mut report = Self {
            name: declaration.name.clone(),
            dn: declaration.dn().to_string(),
            ensure: declaration.ensure,
            action: EntryAction::Failed,
            signal: None,
            plan: None,
            document: None,
            status: None,
            error: None,
            error_code: None,
        };
        report.mark_failed(error);
        report
    }

    pub fn mark_applied(&mut self) {
        self.status = Some("applied".to_string());
    }

    pub fn mark_failed(&mut self, error: &LdapDnError) {
        self.action = EntryAction::Failed;
        self.status = Some("failed".to_string());
        self.error = Some(error.to_string());
        self.error_code = Some(error.error_code());
    }
}

/// Counts over a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub changed: usize,
    pub unchanged: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn from_entries(entries: &[EntryReport]) -> Self {
        let mut summary = Self {
            total: entries.len(),
            ..Self::default()
        };
        for entry in entries {
            match entry.action {
                EntryAction::Unchanged => summary.unchanged += 1,
                EntryAction::Failed => summary.failed += 1,
                EntryAction::Create | EntryAction::Update | EntryAction::Delete => {
                    summary.changed += 1
                }
            }
        }
        summary
    }
}

/// Everything a command reports
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub dry_run: bool,
    pub entries: Vec<EntryReport>,
    pub summary: RunSummary,
}

impl RunReport {
    pub fn new(dry_run: bool, entries: Vec<EntryReport>) -> Self {
        let summary = RunSummary::from_entries(&entries);
        Self {
            dry_run,
            entries,
            summary,
        }
    }

    pub fn print_json(&self) -> serde_json::Result<()> {
        println!("{}", serde_json::to_string_pretty(self)?);
        Ok(())
    }

    /// Print one line per entry, followed by its LDIF when `with_documents`.
    pub fn print_text(&self, with_documents: bool) {
        let use_color = std::env::var("NO_COLOR").is_err();
        let reset = if use_color { "\x1b[0m" } else { "" };

        for entry in &self.entries {
            let color = if use_color { entry.action.color() } else { "" };
            print!(
                "  {color}{}{reset} {}: {}",
                entry.action.symbol(),
                entry.action.display(),
                entry.dn
            );
            if let Some(status) = &entry.status {
                print!(" ({status})");
            }
            println!();

            if let Some(error) = &entry.error {
                for line in error.lines() {
                    println!("      {line}");
                }
            } else if with_documents {
                if let Some(document) = &entry.document {
                    for line in document.lines() {
                        println!("      {line}");
                    }
                }
            }
        }

        println!();
        println!(
            "{} entr(ies): {} changed, {} unchanged, {} failed",
            self.summary.total, self.summary.changed, self.summary.unchanged, self.summary.failed
        );
    }
}
