//! Subcommand handlers

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};
use iam_policy_document_model::{
    policy_has_valid_aws_principals, validate_policy_json, PolicyComposer, PolicyDocument,
    PolicyDocumentConfig,
};
use log::{debug, info};

use crate::types::ExitCode;

/// Path argument meaning "read from stdin"
const STDIN_PATH: &str = "-";

/// Compose a policy document from a configuration file and print it
pub fn compose(config_path: &Path, minified: bool, show_id: bool) -> Result<()> {
    info!("Composing policy document from {}", config_path.display());

    let raw = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read configuration file: {}", config_path.display()))?;
    let config: PolicyDocumentConfig = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid configuration file: {}", config_path.display()))?;

    let composed = PolicyComposer::compose(&config).context("Failed to compose policy document")?;
    debug!(
        "Composed {} statement(s)",
        composed.document.statements.len()
    );

    if show_id {
        eprintln!("{}", composed.id);
    }
    println!(
        "{}",
        if minified {
            composed.minified_json
        } else {
            composed.json
        }
    );
    Ok(())
}

/// Decode a policy document and print its canonical encoding
pub fn normalize(file: Option<&Path>, minified: bool) -> Result<()> {
    let raw = read_input(file)?;
    let raw = raw.trim();

    validate_policy_json("policy", raw)?;
    let document = PolicyDocument::from_json(raw).context("Failed to decode policy document")?;

    let encoded = if minified {
        document.to_json()?
    } else {
        document.to_json_pretty()?
    };
    println!("{encoded}");
    Ok(())
}

/// Check every AWS principal in a policy document
pub fn check_principals(file: Option<&Path>) -> Result<ExitCode> {
    let raw = read_input(file)?;

    match policy_has_valid_aws_principals(&raw) {
        Ok(true) => {
            println!("valid");
            Ok(ExitCode::Success)
        }
        Ok(false) => {
            println!("invalid");
            Ok(ExitCode::Rejected)
        }
        Err(e) if e.is_syntax() => Err(e).context("Policy is not valid JSON"),
        Err(e) => Err(e).context("Policy has an unexpected structure"),
    }
}

/// Read the whole of `file`, or stdin when no file (or `-`) is given
fn read_input(file: Option<&Path>) -> Result<String> {
    match file.filter(|path| *path != Path::new(STDIN_PATH)) {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read policy file: {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read from stdin")?;
            Ok(buffer)
        }
    }
}
