//! Error types for IAM policy document operations

use serde_json::error::Category;
use thiserror::Error;

/// Main error type for policy document decoding, encoding, composition and validation
#[derive(Error, Debug)]
pub enum PolicyDocumentError {
    /// The input is not syntactically valid JSON
    #[error("{0}")]
    Syntax(#[source] serde_json::Error),

    /// The input is valid JSON but does not match the policy document grammar
    #[error("unexpected policy document structure: {0}")]
    Data(#[source] serde_json::Error),

    #[error("failed to encode policy document: {0}")]
    Serialization(#[source] serde_json::Error),

    /// A value at `Statement[*].Principal.AWS` is neither a string nor a list of strings
    #[error("parsing policy: unexpected result: {0}")]
    UnexpectedShape(String),

    #[error("duplicate Sid ({sid}) in source_policy_documents (item {document}; statement {statement}). Remove the Sid or ensure Sids are unique.")]
    DuplicateSid {
        sid: String,
        document: usize,
        statement: usize,
    },

    #[error("duplicate Sid ({sid}). Remove the Sid or ensure the Sid is unique.")]
    DuplicateStatementSid { sid: String },

    #[error("\"{field}.{index}\" contains an invalid JSON: {source}")]
    InvalidDocument {
        field: String,
        index: usize,
        #[source]
        source: Box<PolicyDocumentError>,
    },

    #[error("\"{field}\" {reason}")]
    InvalidPolicyJson { field: String, reason: String },

    #[error("invalid statement ID ({sid}): {reason}")]
    InvalidStatementId { sid: String, reason: String },

    #[error("found &{{ sequence in ({value}), which is not supported in document version {version}")]
    UnsupportedInterpolation { value: String, version: String },

    /// Adds the configuration field being read to an underlying error
    #[error("reading {field}: {source}")]
    Statement {
        field: &'static str,
        #[source]
        source: Box<PolicyDocumentError>,
    },
}

/// Result type alias
pub type PolicyDocumentResult<T> = Result<T, PolicyDocumentError>;

impl PolicyDocumentError {
    /// Classify a decoder error as either a syntax error or a structural one.
    #[must_use]
    pub fn from_decode(error: serde_json::Error) -> Self {
        match error.classify() {
            Category::Syntax | Category::Eof => Self::Syntax(error),
            Category::Data | Category::Io => Self::Data(error),
        }
    }

    /// Whether this error (or the error it wraps) was caused by malformed JSON.
    #[must_use]
    pub fn is_syntax(&self) -> bool {
        match self {
            Self::Syntax(_) => true,
            Self::InvalidDocument { source, .. } | Self::Statement { source, .. } => {
                source.is_syntax()
            }
            _ => false,
        }
    }

    pub(crate) fn in_field(field: &'static str, source: Self) -> Self {
        Self::Statement {
            field,
            source: Box::new(source),
        }
    }

    pub(crate) fn invalid_policy_json(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPolicyJson {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_classification() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = PolicyDocumentError::from_decode(err);
        assert!(error.is_syntax());
        assert!(error.to_string().contains("EOF while parsing"));
    }

    #[test]
    fn test_data_error_classification() {
        let err = serde_json::from_str::<Vec<String>>("{}").unwrap_err();
        let error = PolicyDocumentError::from_decode(err);
        assert!(!error.is_syntax());
        assert!(matches!(error, PolicyDocumentError::Data(_)));
    }

    #[test]
    fn test_wrapped_syntax_error_is_still_syntax() {
        let err = serde_json::from_str::<serde_json::Value>("").unwrap_err();
        let error = PolicyDocumentError::InvalidDocument {
            field: "source_policy_documents".to_string(),
            index: 0,
            source: Box::new(PolicyDocumentError::from_decode(err)),
        };
        assert!(error.is_syntax());
        assert!(error
            .to_string()
            .starts_with("\"source_policy_documents.0\" contains an invalid JSON"));
    }

    #[test]
    fn test_interpolation_error_message() {
        let error = PolicyDocumentError::UnsupportedInterpolation {
            value: "home/&{aws:username}/".to_string(),
            version: "2008-10-17".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "found &{ sequence in (home/&{aws:username}/), which is not supported in document version 2008-10-17"
        );
    }
}
