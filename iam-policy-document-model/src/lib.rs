//! This crate provides the IAM policy document model:
//! - Policy document types with AWS's JSON encoding rules
//! - Sid-based merging of documents
//! - Composition of source, configured and override documents
//! - Principal and policy JSON validation
//!

mod document;
mod error;
mod synthesis;
mod validation;

// Re-exports for a small, focused public API
pub use document::{
    Condition, ConditionSet, Effect, OneOrMany, PolicyDocument, Principal, PrincipalSet,
    Statement, DEFAULT_VERSION, VERSION_2008_10_17, VERSION_2012_10_17, WILDCARD,
};
pub use error::{PolicyDocumentError, PolicyDocumentResult};
pub use synthesis::{
    interpolate, replace_vars, ComposedPolicy, ConditionConfig, PolicyComposer,
    PolicyDocumentConfig, PrincipalConfig, StatementConfig,
};
pub use validation::{
    is_arn, is_valid_aws_principal, policy_has_valid_aws_principals, validate_policy_json,
    validate_statement_id, Arn,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_merge_encode() {
        let mut document = PolicyDocument::from_json(
            r#"{"Version":"2008-10-17","Statement":[{"Sid":"A","Effect":"Allow","Action":"s3:*"}]}"#,
        )
        .unwrap();
        let update = PolicyDocument::from_json(
            r#"{"Version":"2012-10-17","Statement":{"Sid":"A","Effect":"Deny","Action":"s3:*"}}"#,
        )
        .unwrap();

        document.merge(update);

        assert_eq!(
            document.to_json().unwrap(),
            r#"{"Version":"2012-10-17","Statement":[{"Sid":"A","Effect":"Deny","Action":"s3:*"}]}"#
        );
        assert!(policy_has_valid_aws_principals(&document.to_json().unwrap()).unwrap());
    }
}
