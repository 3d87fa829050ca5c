//! CLI command implementations

pub mod apply;
pub mod check;
pub mod plan;

use std::path::{Path, PathBuf};

use clap::Args;
use ldapdn_core::prelude::*;
use ldapdn_openldap::{OpenLdapConfig, OpenLdapTools};
use tracing::debug;

use crate::error::{CliError, CliResult};
use crate::report::EntryReport;

/// Options shared by every command
#[derive(Args, Debug)]
pub struct ManifestArgs {
    /// Path to the manifest file
    #[arg(short = 'f', long = "file")]
    pub file: PathBuf,

    /// Directory URI, overriding LDAPDN_URI
    #[arg(long)]
    pub uri: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Load and validate a manifest file.
pub fn load_manifest(path: &Path) -> CliResult<Manifest> {
    if !path.exists() {
        return Err(CliError::Validation(format!(
            "File not found: {}",
            path.display()
        )));
    }
    let manifest = Manifest::load(path)?;
    debug!(path = %path.display(), entries = manifest.entries.len(), "Manifest loaded");
    Ok(manifest)
}

/// Build a provider over the OpenLDAP tools.
pub fn connect(uri: Option<&str>) -> CliResult<LdapDnProvider<OpenLdapTools>> {
    let mut config = OpenLdapConfig::from_env()?;
    if let Some(uri) = uri {
        config = config.with_uri(uri);
    }
    debug!(uri = %config.uri, "Using OpenLDAP tools");
    Ok(LdapDnProvider::new(OpenLdapTools::new(config)))
}

/// One evaluated manifest entry.
pub struct Pass<'a> {
    pub declaration: &'a EntryDeclaration,
    pub desired: DesiredEntry,
    pub evaluation: LdapDnResult<Evaluation>,
}

impl Pass<'_> {
    pub fn report(&self) -> EntryReport {
        match &self.evaluation {
            Ok(evaluation) => EntryReport::evaluated(self.declaration, evaluation),
            Err(e) => EntryReport::failed(self.declaration, e),
        }
    }
}

/// Evaluate every manifest entry in order.
pub async fn evaluate_all<'a, D: Directory>(
    provider: &LdapDnProvider<D>,
    manifest: &'a Manifest,
) -> CliResult<Vec<Pass<'a>>> {
    let mut passes = Vec::with_capacity(manifest.entries.len());
    for declaration in &manifest.entries {
        let desired = declaration.to_desired()?;
        let evaluation = provider.evaluate(&desired).await;
        passes.push(Pass {
            declaration,
            desired,
            evaluation,
        });
    }
    Ok(passes)
}

/// Keep the first error of a run; later ones are only reported.
pub fn first_error(slot: &mut Option<LdapDnError>, error: LdapDnError) {
    if slot.is_none() {
        *slot = Some(error);
    }
}
