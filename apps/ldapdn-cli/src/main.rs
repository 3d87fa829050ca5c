//! ldapdn - reconcile LDAP entries against a YAML manifest
//!
//! Each manifest entry declares attribute values that must (or must not) be
//! present on one directory entry. The CLI searches every entry through the
//! OpenLDAP tools and reports or applies the LDIF that converges it.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod report;

use error::CliResult;

/// ldapdn - declarative LDAP entry management
#[derive(Parser)]
#[command(name = "ldapdn")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the LDIF each entry needs
    Plan(commands::plan::PlanArgs),

    /// Check whether entries match the manifest
    Check(commands::check::CheckArgs),

    /// Apply the manifest
    Apply(commands::apply::ApplyArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = run(cli).await;

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}

/// Logs go to stderr so `--json` output stays parseable. `RUST_LOG` wins
/// over `-v`.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

async fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Commands::Plan(args) => commands::plan::execute(args).await,
        Commands::Check(args) => commands::check::execute(args).await,
        Commands::Apply(args) => commands::apply::execute(args).await,
    }
}
