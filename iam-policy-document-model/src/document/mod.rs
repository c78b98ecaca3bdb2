//! IAM policy document data model
//!
//! The types in this module mirror AWS's policy JSON grammar and carry the
//! custom encoding rules AWS expects: single-element lists become scalars,
//! principals and conditions are folded by key, and a lone `*`/`*` principal is
//! written as the bare string `"*"`.
//!
//! ```text
//! {
//!   "Version": "2012-10-17",
//!   "Id": "...",
//!   "Statement": <Statement> | [<Statement>, ...]
//! }
//! ```

use crate::error::{PolicyDocumentError, PolicyDocumentResult};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

pub(crate) mod condition;
pub(crate) mod merge;
pub(crate) mod one_or_many;
pub(crate) mod principal;

pub use condition::{Condition, ConditionSet};
pub use one_or_many::OneOrMany;
pub use principal::{Principal, PrincipalSet, WILDCARD};

/// Legacy policy language version; does not support policy variables
pub const VERSION_2008_10_17: &str = "2008-10-17";
/// Current policy language version, used when none is given
pub const VERSION_2012_10_17: &str = "2012-10-17";
pub const DEFAULT_VERSION: &str = VERSION_2012_10_17;

/// Effect of a policy statement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effect {
    #[default]
    Allow,
    Deny,
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => f.write_str("Allow"),
            Self::Deny => f.write_str("Deny"),
        }
    }
}

impl FromStr for Effect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Allow" => Ok(Self::Allow),
            "Deny" => Ok(Self::Deny),
            other => Err(format!(
                "invalid effect '{other}': expected 'Allow' or 'Deny'"
            )),
        }
    }
}

/// One permission rule within a policy document
///
/// An empty `sid` means the statement has no identity for merging: it is always
/// appended, never replaced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Statement {
    #[serde(rename = "Sid", default, skip_serializing_if = "String::is_empty")]
    pub sid: String,
    #[serde(rename = "Effect", default)]
    pub effect: Effect,
    #[serde(rename = "Action", default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<OneOrMany<String>>,
    #[serde(rename = "NotAction", default, skip_serializing_if = "Option::is_none")]
    pub not_actions: Option<OneOrMany<String>>,
    #[serde(rename = "Resource", default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<OneOrMany<String>>,
    #[serde(rename = "NotResource", default, skip_serializing_if = "Option::is_none")]
    pub not_resources: Option<OneOrMany<String>>,
    #[serde(rename = "Principal", default, skip_serializing_if = "PrincipalSet::is_empty")]
    pub principals: PrincipalSet,
    #[serde(rename = "NotPrincipal", default, skip_serializing_if = "PrincipalSet::is_empty")]
    pub not_principals: PrincipalSet,
    #[serde(rename = "Condition", default, skip_serializing_if = "ConditionSet::is_empty")]
    pub conditions: ConditionSet,
}

impl Statement {
    #[must_use]
    pub fn new(effect: Effect) -> Self {
        Self {
            effect,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn allow() -> Self {
        Self::new(Effect::Allow)
    }

    #[must_use]
    pub fn deny() -> Self {
        Self::new(Effect::Deny)
    }

    #[must_use]
    pub fn with_sid(mut self, sid: impl Into<String>) -> Self {
        self.sid = sid.into();
        self
    }

    #[must_use]
    pub fn with_actions(mut self, actions: impl Into<OneOrMany<String>>) -> Self {
        self.actions = Some(actions.into());
        self
    }

    #[must_use]
    pub fn with_not_actions(mut self, not_actions: impl Into<OneOrMany<String>>) -> Self {
        self.not_actions = Some(not_actions.into());
        self
    }

    #[must_use]
    pub fn with_resources(mut self, resources: impl Into<OneOrMany<String>>) -> Self {
        self.resources = Some(resources.into());
        self
    }

    #[must_use]
    pub fn with_not_resources(mut self, not_resources: impl Into<OneOrMany<String>>) -> Self {
        self.not_resources = Some(not_resources.into());
        self
    }

    #[must_use]
    pub fn with_principals(mut self, principals: impl Into<PrincipalSet>) -> Self {
        self.principals = principals.into();
        self
    }

    #[must_use]
    pub fn with_not_principals(mut self, not_principals: impl Into<PrincipalSet>) -> Self {
        self.not_principals = not_principals.into();
        self
    }

    #[must_use]
    pub fn with_conditions(mut self, conditions: impl Into<ConditionSet>) -> Self {
        self.conditions = conditions.into();
        self
    }
}

/// An IAM policy document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDocument {
    /// Policy language version; may be empty
    #[serde(rename = "Version", default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(rename = "Id", default, skip_serializing_if = "is_blank")]
    pub id: Option<String>,
    #[serde(
        rename = "Statement",
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "deserialize_statements"
    )]
    pub statements: Vec<Statement>,
}

impl PolicyDocument {
    #[must_use]
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_statements(mut self, statements: Vec<Statement>) -> Self {
        self.statements = statements;
        self
    }

    /// Decode a policy document from raw JSON bytes.
    ///
    /// Malformed JSON yields [`PolicyDocumentError::Syntax`]; JSON that does not
    /// fit the policy grammar yields [`PolicyDocumentError::Data`].
    pub fn from_slice(bytes: &[u8]) -> PolicyDocumentResult<Self> {
        serde_json::from_slice(bytes).map_err(PolicyDocumentError::from_decode)
    }

    pub fn from_json(json: &str) -> PolicyDocumentResult<Self> {
        Self::from_slice(json.as_bytes())
    }

    /// Canonical compact encoding
    pub fn to_json(&self) -> PolicyDocumentResult<String> {
        serde_json::to_string(self).map_err(PolicyDocumentError::Serialization)
    }

    /// Canonical encoding with 2-space indentation
    pub fn to_json_pretty(&self) -> PolicyDocumentResult<String> {
        serde_json::to_string_pretty(self).map_err(PolicyDocumentError::Serialization)
    }

    /// Find the first statement carrying the given non-empty Sid
    pub fn statement(&self, sid: &str) -> Option<&Statement> {
        if sid.is_empty() {
            return None;
        }
        self.statements.iter().find(|statement| statement.sid == sid)
    }
}

impl FromStr for PolicyDocument {
    type Err = PolicyDocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_json(s)
    }
}

fn is_blank(id: &Option<String>) -> bool {
    id.as_deref().unwrap_or_default().is_empty()
}

/// `Statement` may hold a single statement object or a list of them
fn deserialize_statements<'de, D>(deserializer: D) -> Result<Vec<Statement>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(Vec::new()),
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(|item| Statement::deserialize(item).map_err(D::Error::custom))
            .collect(),
        item @ serde_json::Value::Object(_) => Statement::deserialize(item)
            .map(|statement| vec![statement])
            .map_err(D::Error::custom),
        other => Err(D::Error::custom(format!(
            "unsupported data type {} for Statement",
            value_kind(&other)
        ))),
    }
}

/// JSON type name used in shape error messages
pub(crate) fn value_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
