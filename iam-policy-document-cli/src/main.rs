//! IAM Policy Document CLI
//!
//! Command-line front end for the iam-policy-document-model library.
//!
//! # Exit Codes
//!
//! - `ExitCode::Success` (0): Operation completed successfully
//! - `ExitCode::Rejected` (1): `check-principals` found an invalid AWS principal
//! - `ExitCode::Error` (2): Input could not be read, decoded or composed
//!
//! See `types::ExitCode` for the enum definition.

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

mod commands;
mod types;

use types::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "iam-policy-document",
    author,
    version,
    about = "Compose, normalize and check AWS IAM policy documents",
    long_about = "Works with AWS IAM policy documents in the JSON shape AWS itself returns. \
Supports three operations:\n\n\
• compose: Build a policy from source documents, configured statements and overrides\n\
• normalize: Re-encode a policy document canonically\n\
• check-principals: Verify that every Principal.AWS value is '*', an ARN or an account ID\n\n\
iam-policy-document compose policy.json --show-id\n  \
iam-policy-document normalize trust-policy.json --minified\n  \
cat trust-policy.json | iam-policy-document check-principals"
)]
struct Cli {
    /// Enable trace logging on stderr
    #[arg(short = 'd', long = "debug", global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compose a policy document from a JSON configuration file
    #[command(long_about = "\
Reads a configuration with `version`, `policy_id`, `source_policy_documents`, `statement` and \
`override_policy_documents`. Source documents are merged first (a Sid may appear only once across \
them), then the configured statements, then overrides, which replace statements with the same Sid.")]
    Compose {
        /// Path to the configuration file
        config: PathBuf,

        /// Print compact JSON instead of indented JSON
        #[arg(short = 'm', long = "minified", env = "IAM_POLICY_DOCUMENT_MINIFIED")]
        minified: bool,

        /// Print the document hash on stderr
        #[arg(long = "show-id")]
        show_id: bool,
    },

    /// Decode a policy document and print its canonical encoding
    Normalize {
        /// Policy file; reads stdin when omitted or '-'
        file: Option<PathBuf>,

        /// Print compact JSON instead of indented JSON
        #[arg(short = 'm', long = "minified", env = "IAM_POLICY_DOCUMENT_MINIFIED")]
        minified: bool,
    },

    /// Check that every AWS principal in a policy is '*', an ARN or a 12-digit account ID
    CheckPrincipals {
        /// Policy file; reads stdin when omitted or '-'
        file: Option<PathBuf>,
    },
}

/// Initialize logging based on configuration
fn init_logging(debug: bool) -> Result<()> {
    let log_level = if debug {
        log::LevelFilter::Trace
    } else {
        log::LevelFilter::Error
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_target(false)
        .format_timestamp_secs()
        .try_init()
        .context("Failed to initialize logger")
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.debug) {
        eprintln!("iam-policy-document: {e}");
        process::exit(ExitCode::Error.into());
    }

    let result = match cli.command {
        Commands::Compose {
            config,
            minified,
            show_id,
        } => commands::compose(&config, minified, show_id).map(|()| ExitCode::Success),
        Commands::Normalize { file, minified } => {
            commands::normalize(file.as_deref(), minified).map(|()| ExitCode::Success)
        }
        Commands::CheckPrincipals { file } => commands::check_principals(file.as_deref()),
    };

    let code = match result {
        Ok(code) => code,
        Err(e) => {
            print_cli_command_error(e);
            ExitCode::Error
        }
    };

    process::exit(code.into());
}

fn print_cli_command_error(e: anyhow::Error) {
    eprintln!("Error: {e}");
    for cause in e.chain().skip(1) {
        eprintln!("  Caused by: {cause}");
    }
}
