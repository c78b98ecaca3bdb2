//! Validators for policy JSON and AWS principals

pub(crate) mod arn;
pub(crate) mod policy_json;
pub(crate) mod principal;

pub use arn::{is_arn, Arn};
pub use policy_json::{validate_policy_json, validate_statement_id};
pub use principal::{is_valid_aws_principal, policy_has_valid_aws_principals};
