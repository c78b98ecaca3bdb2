//! Structured configuration for composing a policy document

use crate::document::{Effect, DEFAULT_VERSION};
use serde::{Deserialize, Serialize};

/// Input to [`PolicyComposer::compose`](super::PolicyComposer::compose)
///
/// ```json
/// {
///   "version": "2012-10-17",
///   "policy_id": "example",
///   "source_policy_documents": ["{...}"],
///   "statement": [{"sid": "Read", "actions": ["s3:GetObject"], "resources": ["*"]}],
///   "override_policy_documents": ["{...}"]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyDocumentConfig {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_id: Option<String>,
    /// Documents merged before the configured statements; duplicate Sids across
    /// them are rejected
    pub source_policy_documents: Vec<String>,
    pub statement: Vec<StatementConfig>,
    /// Documents merged last; same-Sid statements replace earlier ones
    pub override_policy_documents: Vec<String>,
}

impl Default for PolicyDocumentConfig {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            policy_id: None,
            source_policy_documents: Vec::new(),
            statement: Vec::new(),
            override_policy_documents: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StatementConfig {
    pub sid: String,
    pub effect: Effect,
    pub actions: Vec<String>,
    pub not_actions: Vec<String>,
    pub resources: Vec<String>,
    pub not_resources: Vec<String>,
    pub principals: Vec<PrincipalConfig>,
    pub not_principals: Vec<PrincipalConfig>,
    pub condition: Vec<ConditionConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrincipalConfig {
    #[serde(rename = "type")]
    pub principal_type: String,
    pub identifiers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConditionConfig {
    pub test: String,
    pub variable: String,
    pub values: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: PolicyDocumentConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.version, DEFAULT_VERSION);
        assert!(config.policy_id.is_none());
        assert!(config.statement.is_empty());

        let statement: StatementConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(statement.effect, Effect::Allow);
        assert!(statement.sid.is_empty());
    }

    #[test]
    fn test_full_config() {
        let config: PolicyDocumentConfig = serde_json::from_str(
            r#"{
                "policy_id": "policy_id",
                "statement": [{
                    "sid": "1",
                    "effect": "Deny",
                    "actions": ["s3:ListBucket"],
                    "principals": [{"type": "AWS", "identifiers": ["*"]}],
                    "condition": [{"test": "StringLike", "variable": "s3:prefix", "values": ["home/"]}]
                }]
            }"#,
        )
        .unwrap();

        let statement = &config.statement[0];
        assert_eq!(statement.effect, Effect::Deny);
        assert_eq!(statement.principals[0].principal_type, "AWS");
        assert_eq!(statement.condition[0].values, ["home/"]);
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let err = serde_json::from_str::<PolicyDocumentConfig>(r#"{"statements": []}"#).unwrap_err();
        assert!(err.to_string().contains("unknown field `statements`"));
    }
}
