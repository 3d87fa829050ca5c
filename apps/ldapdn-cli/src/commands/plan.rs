//! Show what `apply` would submit

use clap::Args;

use super::{connect, evaluate_all, load_manifest, ManifestArgs};
use crate::error::CliResult;
use crate::report::RunReport;

/// Show the LDIF each entry needs, without applying it
#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub manifest: ManifestArgs,
}

/// Execute the plan command
pub async fn execute(args: PlanArgs) -> CliResult<()> {
    let manifest = load_manifest(&args.manifest.file)?;
    let provider = connect(args.manifest.uri.as_deref())?;

    let passes = evaluate_all(&provider, &manifest).await?;
    let entries = passes.iter().map(|pass| pass.report()).collect();
    let report = RunReport::new(true, entries);

    if args.manifest.json {
        report.print_json()?;
    } else {
        report.print_text(true);
    }

    match passes.into_iter().find_map(|pass| pass.evaluation.err()) {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}
