//! Policy variable syntax translation
//!
//! Configuration languages that reserve `${...}` for their own interpolation let
//! users write IAM policy variables as `&{aws:username}`. These are rewritten to
//! `${aws:username}` before the document is built. Version `2008-10-17` does not
//! support policy variables, so the sequence is rejected there.

use crate::document::VERSION_2008_10_17;
use crate::error::{PolicyDocumentError, PolicyDocumentResult};

const CONFIG_VARIABLE_OPEN: &str = "&{";
const POLICY_VARIABLE_OPEN: &str = "${";

/// Rewrite every `&{` in `value` to `${`
pub fn replace_vars(value: &str) -> String {
    value.replace(CONFIG_VARIABLE_OPEN, POLICY_VARIABLE_OPEN)
}

/// Translate `value` for a document of the given `version`.
pub fn interpolate(value: &str, version: &str) -> PolicyDocumentResult<String> {
    if version == VERSION_2008_10_17 && value.contains(CONFIG_VARIABLE_OPEN) {
        return Err(PolicyDocumentError::UnsupportedInterpolation {
            value: value.to_string(),
            version: version.to_string(),
        });
    }
    Ok(replace_vars(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DEFAULT_VERSION;
    use rstest::rstest;

    #[rstest]
    #[case("arn:aws:s3:::foo/home/&{aws:username}", "arn:aws:s3:::foo/home/${aws:username}")]
    #[case("&{a}/&{b}", "${a}/${b}")]
    #[case("plain", "plain")]
    #[case("${already}", "${already}")]
    #[case("&", "&")]
    fn test_replace_vars(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(replace_vars(input), expected);
    }

    #[test]
    fn test_interpolate_current_version() {
        assert_eq!(
            interpolate("home/&{aws:username}/", DEFAULT_VERSION).unwrap(),
            "home/${aws:username}/"
        );
    }

    #[test]
    fn test_interpolate_rejected_for_2008_version() {
        let err = interpolate("home/&{aws:username}/", VERSION_2008_10_17).unwrap_err();
        assert!(matches!(
            err,
            PolicyDocumentError::UnsupportedInterpolation { .. }
        ));
        assert_eq!(interpolate("home/", VERSION_2008_10_17).unwrap(), "home/");
    }
}
