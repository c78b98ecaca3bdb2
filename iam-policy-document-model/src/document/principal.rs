//! `Principal` / `NotPrincipal` blocks

use super::one_or_many::OneOrMany;
use super::value_kind;
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Principal type and identifier used for the anonymous principal
pub const WILDCARD: &str = "*";

/// One principal type (`AWS`, `Service`, `Federated`, `*`, ...) with its identifiers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Principal {
    pub principal_type: String,
    pub identifiers: OneOrMany<String>,
}

impl Principal {
    #[must_use]
    pub fn new(
        principal_type: impl Into<String>,
        identifiers: impl Into<OneOrMany<String>>,
    ) -> Self {
        Self {
            principal_type: principal_type.into(),
            identifiers: identifiers.into(),
        }
    }

    /// The anonymous principal, encoded as the bare string `"*"`
    #[must_use]
    pub fn wildcard() -> Self {
        Self::new(WILDCARD, vec![WILDCARD.to_string()])
    }

    fn is_wildcard(&self) -> bool {
        self.principal_type == WILDCARD && self.identifiers.as_slice() == [WILDCARD]
    }
}

/// Ordered list of principals as they appear in one statement
///
/// On the wire, principals sharing a type are folded under a single key. A set
/// holding only the `*`/`*` principal encodes as the bare string `"*"`; this is
/// not done for `{"AWS": "*"}`, which IAM evaluates differently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PrincipalSet(pub Vec<Principal>);

impl PrincipalSet {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Principal> {
        self.0.iter()
    }

    pub fn push(&mut self, principal: Principal) {
        self.0.push(principal);
    }

    /// Identifiers of every principal with the given type, in set order
    pub fn identifiers_for<'a>(
        &'a self,
        principal_type: &'a str,
    ) -> impl Iterator<Item = &'a String> {
        self.0
            .iter()
            .filter(move |principal| principal.principal_type == principal_type)
            .flat_map(|principal| principal.identifiers.iter())
    }
}

impl From<Vec<Principal>> for PrincipalSet {
    fn from(principals: Vec<Principal>) -> Self {
        Self(principals)
    }
}

impl FromIterator<Principal> for PrincipalSet {
    fn from_iter<I: IntoIterator<Item = Principal>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for PrincipalSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if let [only] = self.0.as_slice() {
            if only.is_wildcard() {
                return serializer.serialize_str(WILDCARD);
            }
        }

        let mut by_type: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for principal in &self.0 {
            let identifiers = by_type
                .entry(principal.principal_type.as_str())
                .or_default();
            match &principal.identifiers {
                OneOrMany::One(identifier) => identifiers.push(identifier.as_str()),
                // Lists are appended in reverse lexical order; existing snapshots depend on it.
                OneOrMany::Many(values) => {
                    let mut sorted: Vec<&str> = values.iter().map(String::as_str).collect();
                    sorted.sort_unstable_by(|a, b| b.cmp(a));
                    identifiers.extend(sorted);
                }
            }
        }

        by_type
            .into_iter()
            .map(|(principal_type, identifiers)| (principal_type, OneOrMany::Many(identifiers)))
            .collect::<BTreeMap<_, _>>()
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PrincipalSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(PrincipalSetVisitor)
    }
}

struct PrincipalSetVisitor;

impl<'de> Visitor<'de> for PrincipalSetVisitor {
    type Value = PrincipalSet;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("\"*\" or a map of principal types to identifiers")
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        if value == WILDCARD {
            Ok(PrincipalSet(vec![Principal::wildcard()]))
        } else {
            Err(E::invalid_value(de::Unexpected::Str(value), &self))
        }
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut principals = Vec::new();
        while let Some((principal_type, value)) = map.next_entry::<String, serde_json::Value>()? {
            let identifiers = match value {
                serde_json::Value::String(identifier) => OneOrMany::One(identifier),
                serde_json::Value::Array(items) => {
                    let mut identifiers = items
                        .into_iter()
                        .map(|item| match item {
                            serde_json::Value::String(identifier) => Ok(identifier),
                            other => Err(de::Error::custom(format!(
                                "unsupported data type {} for PrincipalSet.Identifiers",
                                value_kind(&other)
                            ))),
                        })
                        .collect::<Result<Vec<_>, A::Error>>()?;
                    identifiers.sort_unstable();
                    OneOrMany::Many(identifiers)
                }
                other => {
                    return Err(de::Error::custom(format!(
                        "unsupported data type {} for PrincipalSet.Identifiers",
                        value_kind(&other)
                    )))
                }
            };
            principals.push(Principal {
                principal_type,
                identifiers,
            });
        }
        principals.sort_by(|a, b| a.principal_type.cmp(&b.principal_type));
        Ok(PrincipalSet(principals))
    }

    fn visit_seq<A>(self, _seq: A) -> Result<Self::Value, A::Error>
    where
        A: de::SeqAccess<'de>,
    {
        Err(de::Error::custom(
            "unsupported data type array for PrincipalSet",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn encode(set: &PrincipalSet) -> serde_json::Value {
        serde_json::to_value(set).unwrap()
    }

    #[test]
    fn test_wildcard_type_collapses_to_bare_string() {
        let scalar = PrincipalSet(vec![Principal::new("*", "*")]);
        assert_eq!(encode(&scalar), json!("*"));

        let list = PrincipalSet(vec![Principal::new("*", vec!["*"])]);
        assert_eq!(encode(&list), json!("*"));
    }

    #[test]
    fn test_aws_wildcard_is_not_collapsed() {
        let set = PrincipalSet(vec![Principal::new("AWS", "*")]);
        assert_eq!(encode(&set), json!({"AWS": "*"}));
    }

    #[test]
    fn test_same_type_identifiers_are_merged() {
        let set = PrincipalSet(vec![
            Principal::new("AWS", "arn:aws:iam::111111111111:root"),
            Principal::new(
                "AWS",
                vec![
                    "arn:aws:iam::222222222222:root",
                    "arn:aws:iam::333333333333:root",
                ],
            ),
        ]);
        assert_eq!(
            encode(&set),
            json!({"AWS": [
                "arn:aws:iam::111111111111:root",
                "arn:aws:iam::333333333333:root",
                "arn:aws:iam::222222222222:root"
            ]})
        );
    }

    #[test]
    fn test_two_scalars_of_same_type_become_list() {
        let set = PrincipalSet(vec![
            Principal::new("Service", "ec2.amazonaws.com"),
            Principal::new("Service", "lambda.amazonaws.com"),
        ]);
        assert_eq!(
            encode(&set),
            json!({"Service": ["ec2.amazonaws.com", "lambda.amazonaws.com"]})
        );
    }

    #[test]
    fn test_different_types_are_separate_keys() {
        let set = PrincipalSet(vec![
            Principal::new("Service", "ec2.amazonaws.com"),
            Principal::new("AWS", "123456789012"),
        ]);
        assert_eq!(
            serde_json::to_string(&set).unwrap(),
            r#"{"AWS":"123456789012","Service":"ec2.amazonaws.com"}"#
        );
    }

    #[test]
    fn test_decode_bare_wildcard() {
        let set: PrincipalSet = serde_json::from_str("\"*\"").unwrap();
        assert_eq!(set, PrincipalSet(vec![Principal::wildcard()]));
    }

    #[test]
    fn test_decode_rejects_other_bare_strings() {
        assert!(serde_json::from_str::<PrincipalSet>("\"AWS\"").is_err());
    }

    #[test]
    fn test_decode_sorts_identifiers_ascending() {
        let set: PrincipalSet = serde_json::from_value(json!({
            "Service": "ec2.amazonaws.com",
            "AWS": ["arn:aws:iam::222222222222:root", "arn:aws:iam::111111111111:root"]
        }))
        .unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.0[0].principal_type, "AWS");
        assert!(matches!(set.0[0].identifiers, OneOrMany::Many(_)));
        assert_eq!(
            set.0[0].identifiers.as_slice(),
            [
                "arn:aws:iam::111111111111:root",
                "arn:aws:iam::222222222222:root"
            ]
        );
        assert_eq!(set.0[1].principal_type, "Service");
        assert_eq!(set.0[1].identifiers.as_slice(), ["ec2.amazonaws.com"]);
    }

    #[test]
    fn test_decode_rejects_unsupported_identifier_type() {
        let err = serde_json::from_value::<PrincipalSet>(json!({"AWS": 123})).unwrap_err();
        assert!(err
            .to_string()
            .contains("unsupported data type number for PrincipalSet.Identifiers"));
    }

    #[test]
    fn test_identifiers_for_type() {
        let set = PrincipalSet(vec![
            Principal::new("AWS", vec!["a", "b"]),
            Principal::new("Service", "s"),
            Principal::new("AWS", "c"),
        ]);
        let aws: Vec<&String> = set.identifiers_for("AWS").collect();
        assert_eq!(aws, ["a", "b", "c"]);
    }
}
