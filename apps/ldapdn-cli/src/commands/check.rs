//! Report whether every entry matches its declaration

use clap::Args;
use ldapdn_core::signal::host_would_apply;

use super::{connect, evaluate_all, first_error, load_manifest, ManifestArgs};
use crate::error::{CliError, CliResult};
use crate::report::RunReport;

/// Exit non-zero when any entry would be changed by `apply`
#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub manifest: ManifestArgs,
}

/// Execute the check command
pub async fn execute(args: CheckArgs) -> CliResult<()> {
    let manifest = load_manifest(&args.manifest.file)?;
    let provider = connect(args.manifest.uri.as_deref())?;

    let passes = evaluate_all(&provider, &manifest).await?;
    let report = RunReport::new(true, passes.iter().map(|pass| pass.report()).collect());

    if args.manifest.json {
        report.print_json()?;
    } else {
        report.print_text(false);
    }

    let mut failure = None;
    let mut drifted = 0;
    for pass in passes {
        match pass.evaluation {
            Ok(evaluation) if host_would_apply(evaluation.signal, evaluation.ensure) => {
                drifted += 1;
            }
            Ok(_) => {}
            Err(e) => first_error(&mut failure, e),
        }
    }

    if let Some(error) = failure {
        return Err(error.into());
    }
    if drifted > 0 {
        return Err(CliError::Drift(drifted));
    }
    Ok(())
}
