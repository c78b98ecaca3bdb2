//! Layered policy document composition
//!
//! A composed document is built in three passes, each folded in with
//! [`PolicyDocument::merge`]:
//!
//! 1. `source_policy_documents`, in order. A non-empty Sid may appear only once
//!    across all of them.
//! 2. The statements given in configuration.
//! 3. `override_policy_documents`, in order. These replace same-Sid statements.

use super::config::{ConditionConfig, PolicyDocumentConfig, PrincipalConfig, StatementConfig};
use super::interpolation::interpolate;
use crate::document::{
    Condition, ConditionSet, OneOrMany, PolicyDocument, Principal, PrincipalSet, Statement,
    DEFAULT_VERSION,
};
use crate::error::{PolicyDocumentError, PolicyDocumentResult};
use aws_lc_rs::digest;
use std::collections::{BTreeSet, HashSet};

const SOURCE_POLICY_DOCUMENTS: &str = "source_policy_documents";
const OVERRIDE_POLICY_DOCUMENTS: &str = "override_policy_documents";

/// Result of composing a policy document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPolicy {
    pub document: PolicyDocument,
    /// Canonical encoding with 2-space indentation
    pub json: String,
    pub minified_json: String,
    /// Hex SHA-256 of `json`
    pub id: String,
}

/// Builds a policy document from a [`PolicyDocumentConfig`]
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyComposer;

impl PolicyComposer {
    pub fn compose(config: &PolicyDocumentConfig) -> PolicyDocumentResult<ComposedPolicy> {
        let mut merged = PolicyDocument::default();

        let mut source_sids = HashSet::new();
        for (index, source) in
            decode_documents(SOURCE_POLICY_DOCUMENTS, &config.source_policy_documents)?
        {
            for (statement_index, statement) in source.statements.iter().enumerate() {
                if statement.sid.is_empty() {
                    continue;
                }
                if !source_sids.insert(statement.sid.clone()) {
                    return Err(PolicyDocumentError::DuplicateSid {
                        sid: statement.sid.clone(),
                        document: index,
                        statement: statement_index,
                    });
                }
            }
            log::debug!("Merging source policy document {}", index);
            merged.merge(source);
        }

        merged.merge(Self::current_document(config)?);

        for (index, override_document) in
            decode_documents(OVERRIDE_POLICY_DOCUMENTS, &config.override_policy_documents)?
        {
            log::debug!("Merging override policy document {}", index);
            merged.merge(override_document);
        }

        if merged.version.is_empty() {
            merged.version = DEFAULT_VERSION.to_string();
        }

        let json = merged.to_json_pretty()?;
        let minified_json = merged.to_json()?;
        let id = document_hash(&json);
        log::debug!(
            "Composed policy document {} with {} statement(s)",
            id,
            merged.statements.len()
        );

        Ok(ComposedPolicy {
            document: merged,
            json,
            minified_json,
            id,
        })
    }

    /// The document described directly by configuration fields
    fn current_document(config: &PolicyDocumentConfig) -> PolicyDocumentResult<PolicyDocument> {
        let version = config.version.as_str();
        let mut document = PolicyDocument::new(version);
        if let Some(id) = config.policy_id.as_deref().filter(|id| !id.is_empty()) {
            document.id = Some(id.to_string());
        }

        let mut sids = HashSet::new();
        for statement in &config.statement {
            if !statement.sid.is_empty() && !sids.insert(statement.sid.as_str()) {
                return Err(PolicyDocumentError::DuplicateStatementSid {
                    sid: statement.sid.clone(),
                });
            }
            document.statements.push(build_statement(statement, version)?);
        }
        Ok(document)
    }
}

/// Decode each non-blank entry of a document list, keeping its position
fn decode_documents(
    field: &str,
    documents: &[String],
) -> PolicyDocumentResult<Vec<(usize, PolicyDocument)>> {
    documents
        .iter()
        .enumerate()
        .filter(|(_, json)| !json.trim().is_empty())
        .map(|(index, json)| {
            PolicyDocument::from_json(json)
                .map(|document| (index, document))
                .map_err(|source| PolicyDocumentError::InvalidDocument {
                    field: field.to_string(),
                    index,
                    source: Box::new(source),
                })
        })
        .collect()
}

fn build_statement(config: &StatementConfig, version: &str) -> PolicyDocumentResult<Statement> {
    let mut statement = Statement::new(config.effect).with_sid(config.sid.as_str());

    statement.actions = optional(string_set(&config.actions));
    statement.not_actions = optional(string_set(&config.not_actions));
    statement.resources = interpolated_set(&config.resources, version)
        .map(optional)
        .map_err(|e| PolicyDocumentError::in_field("resources", e))?;
    statement.not_resources = interpolated_set(&config.not_resources, version)
        .map(optional)
        .map_err(|e| PolicyDocumentError::in_field("not_resources", e))?;
    statement.principals = build_principals(&config.principals, version)
        .map_err(|e| PolicyDocumentError::in_field("principals", e))?;
    statement.not_principals = build_principals(&config.not_principals, version)
        .map_err(|e| PolicyDocumentError::in_field("not_principals", e))?;
    statement.conditions = build_conditions(&config.condition, version)
        .map_err(|e| PolicyDocumentError::in_field("condition", e))?;

    Ok(statement)
}

fn build_principals(
    principals: &[PrincipalConfig],
    version: &str,
) -> PolicyDocumentResult<PrincipalSet> {
    principals
        .iter()
        .map(|principal| -> PolicyDocumentResult<Principal> {
            let identifiers = interpolated_set(&principal.identifiers, version)
                .map_err(|e| PolicyDocumentError::in_field("identifiers", e))?;
            Ok(Principal::new(principal.principal_type.as_str(), identifiers))
        })
        .collect()
}

fn build_conditions(
    conditions: &[ConditionConfig],
    version: &str,
) -> PolicyDocumentResult<ConditionSet> {
    conditions
        .iter()
        .map(|condition| -> PolicyDocumentResult<Condition> {
            let values = condition
                .values
                .iter()
                .map(|value| interpolate(value, version))
                .collect::<PolicyDocumentResult<Vec<_>>>()
                .map_err(|e| PolicyDocumentError::in_field("values", e))?;
            Ok(Condition::new(
                condition.test.as_str(),
                condition.variable.as_str(),
                values,
            ))
        })
        .collect()
}

/// Deduplicate `values`; one value stays a scalar, several are sorted descending
fn string_set(values: &[String]) -> OneOrMany<String> {
    let mut unique: Vec<String> = values
        .iter()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .rev()
        .collect();
    if unique.len() == 1 {
        OneOrMany::One(unique.remove(0))
    } else {
        OneOrMany::Many(unique)
    }
}

fn interpolated_set(values: &[String], version: &str) -> PolicyDocumentResult<OneOrMany<String>> {
    string_set(values).try_map(|value| interpolate(&value, version))
}

/// Empty sets leave the corresponding statement field out
fn optional(set: OneOrMany<String>) -> Option<OneOrMany<String>> {
    (!set.is_empty()).then_some(set)
}

fn document_hash(json: &str) -> String {
    digest::digest(&digest::SHA256, json.as_bytes())
        .as_ref()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}
