//! `Condition` blocks

use super::one_or_many::OneOrMany;
use super::value_kind;
use serde::de::{Deserializer, Error as _};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

/// A single `{test: {variable: values}}` predicate
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Condition {
    /// Condition operator, e.g. `StringLike`
    pub test: String,
    /// Context key, e.g. `s3:prefix`
    pub variable: String,
    pub values: OneOrMany<String>,
}

impl Condition {
    #[must_use]
    pub fn new(
        test: impl Into<String>,
        variable: impl Into<String>,
        values: impl Into<OneOrMany<String>>,
    ) -> Self {
        Self {
            test: test.into(),
            variable: variable.into(),
            values: values.into(),
        }
    }
}

/// Ordered list of conditions for one statement
///
/// Entries that share a test and variable have their values concatenated in
/// order on encode (no sorting, no deduplication).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ConditionSet(pub Vec<Condition>);

impl ConditionSet {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Condition> {
        self.0.iter()
    }

    pub fn push(&mut self, condition: Condition) {
        self.0.push(condition);
    }
}

impl From<Vec<Condition>> for ConditionSet {
    fn from(conditions: Vec<Condition>) -> Self {
        Self(conditions)
    }
}

impl FromIterator<Condition> for ConditionSet {
    fn from_iter<I: IntoIterator<Item = Condition>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for ConditionSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut tests: BTreeMap<&str, BTreeMap<&str, OneOrMany<&str>>> = BTreeMap::new();
        for condition in &self.0 {
            let values = tests
                .entry(condition.test.as_str())
                .or_default()
                .entry(condition.variable.as_str())
                .or_default();
            for value in &condition.values {
                values.push(value.as_str());
            }
        }
        tests.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ConditionSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<String, BTreeMap<String, serde_json::Value>>::deserialize(deserializer)?;

        let mut conditions = Vec::new();
        for (test, variables) in raw {
            for (variable, value) in variables {
                let values = condition_values(value).map_err(D::Error::custom)?;
                conditions.push(Condition {
                    test: test.clone(),
                    variable,
                    values,
                });
            }
        }
        Ok(ConditionSet(conditions))
    }
}

/// Booleans and numbers are kept as their string form; strings become a
/// one-element list and arrays keep their order.
fn condition_values(value: serde_json::Value) -> Result<OneOrMany<String>, String> {
    match value {
        serde_json::Value::String(value) => Ok(OneOrMany::Many(vec![value])),
        serde_json::Value::Bool(value) => Ok(OneOrMany::One(value.to_string())),
        serde_json::Value::Number(value) => Ok(OneOrMany::One(value.to_string())),
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                serde_json::Value::String(value) => Ok(value),
                serde_json::Value::Bool(value) => Ok(value.to_string()),
                serde_json::Value::Number(value) => Ok(value.to_string()),
                other => Err(unsupported(&other)),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(OneOrMany::Many),
        other => Err(unsupported(&other)),
    }
}

fn unsupported(value: &serde_json::Value) -> String {
    format!(
        "unsupported data type {} for ConditionSet.Values",
        value_kind(value)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_same_test_and_variable_accumulate_in_order() {
        let set = ConditionSet(vec![
            Condition::new("StringLike", "s3:prefix", "one/"),
            Condition::new("StringLike", "s3:prefix", vec!["two/", "three/"]),
        ]);
        assert_eq!(
            serde_json::to_string(&set).unwrap(),
            r#"{"StringLike":{"s3:prefix":["one/","two/","three/"]}}"#
        );
    }

    #[test]
    fn test_same_test_different_variables_share_key() {
        let set = ConditionSet(vec![
            Condition::new("StringEquals", "s3:x-amz-acl", vec!["bucket-owner-full-control"]),
            Condition::new("StringEquals", "aws:SourceArn", vec!["some-other-value"]),
        ]);
        assert_eq!(
            serde_json::to_value(&set).unwrap(),
            json!({"StringEquals": {
                "s3:x-amz-acl": "bucket-owner-full-control",
                "aws:SourceArn": "some-other-value"
            }})
        );
    }

    #[test]
    fn test_values_keep_order_and_empty_strings() {
        let set = ConditionSet(vec![Condition::new(
            "StringLike",
            "s3:prefix",
            vec!["home/", "", "home/${aws:username}/"],
        )]);
        assert_eq!(
            serde_json::to_value(&set).unwrap(),
            json!({"StringLike": {"s3:prefix": ["home/", "", "home/${aws:username}/"]}})
        );
    }

    #[test]
    fn test_decode_bool_and_string_leaves() {
        let set: ConditionSet = serde_json::from_value(json!({
            "Null": {"aws:ResourceTag/SpecialTag": false},
            "StringLike": {
                "aws:ResourceAccount": ["123456"],
                "aws:PrincipalArn": "arn:aws:iam::*:role/AWSAFTExecution"
            }
        }))
        .unwrap();

        assert_eq!(set.len(), 3);
        assert_eq!(
            set.0[0],
            Condition::new("Null", "aws:ResourceTag/SpecialTag", "false")
        );
        assert_eq!(
            set.0[1],
            Condition::new(
                "StringLike",
                "aws:PrincipalArn",
                vec!["arn:aws:iam::*:role/AWSAFTExecution"]
            )
        );
        assert_eq!(
            set.0[2],
            Condition::new("StringLike", "aws:ResourceAccount", vec!["123456"])
        );

        assert_eq!(
            serde_json::to_value(&set).unwrap(),
            json!({
                "Null": {"aws:ResourceTag/SpecialTag": "false"},
                "StringLike": {
                    "aws:ResourceAccount": "123456",
                    "aws:PrincipalArn": "arn:aws:iam::*:role/AWSAFTExecution"
                }
            })
        );
    }

    #[test]
    fn test_decode_array_order_is_preserved() {
        let set: ConditionSet =
            serde_json::from_value(json!({"StringLike": {"s3:prefix": ["b", "a", "c"]}})).unwrap();
        assert_eq!(set.0[0].values.as_slice(), ["b", "a", "c"]);
    }

    #[test]
    fn test_decode_numeric_leaf() {
        let set: ConditionSet =
            serde_json::from_value(json!({"NumericLessThan": {"s3:max-keys": 10}})).unwrap();
        assert_eq!(set.0[0].values.as_slice(), ["10"]);
    }

    #[test]
    fn test_decode_rejects_nested_objects() {
        let err = serde_json::from_value::<ConditionSet>(json!({"StringLike": {"k": {"x": 1}}}))
            .unwrap_err();
        assert!(err
            .to_string()
            .contains("unsupported data type object for ConditionSet.Values"));
    }
}
