//! Converge every manifest entry

use clap::Args;
use ldapdn_core::signal::host_would_apply;
use tracing::{info, warn};

use super::{connect, evaluate_all, first_error, load_manifest, ManifestArgs};
use crate::error::CliResult;
use crate::report::RunReport;

/// Apply the changes each entry needs
#[derive(Args, Debug)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub manifest: ManifestArgs,

    /// Preview changes without applying
    #[arg(long)]
    pub dry_run: bool,
}

/// Execute the apply command
///
/// Acts as the host loop: an entry is applied when its signal asks for it
/// under the entry's `ensure` state. A failed entry does not stop the run.
pub async fn execute(args: ApplyArgs) -> CliResult<()> {
    let manifest = load_manifest(&args.manifest.file)?;
    let provider = connect(args.manifest.uri.as_deref())?;

    let passes = evaluate_all(&provider, &manifest).await?;

    let mut failure = None;
    let mut entries = Vec::with_capacity(passes.len());
    for pass in passes {
        let mut report = pass.report();
        match pass.evaluation {
            Ok(evaluation) if host_would_apply(evaluation.signal, evaluation.ensure) => {
                if !args.dry_run {
                    match provider.apply(&pass.desired, &evaluation).await {
                        Ok(_) => report.mark_applied(),
                        Err(e) => {
                            warn!(dn = %pass.desired.dn(), error_code = e.error_code(), "Apply failed");
                            report.mark_failed(&e);
                            first_error(&mut failure, e);
                        }
                    }
                }
            }
            Ok(_) => {}
            Err(e) => first_error(&mut failure, e),
        }
        entries.push(report);
    }

    let report = RunReport::new(args.dry_run, entries);
    info!(
        changed = report.summary.changed,
        failed = report.summary.failed,
        dry_run = args.dry_run,
        "Run finished"
    );

    if args.manifest.json {
        report.print_json()?;
    } else {
        if args.dry_run {
            println!("Dry run - no changes will be made.");
            println!();
        }
        report.print_text(args.dry_run);
    }

    match failure {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}
