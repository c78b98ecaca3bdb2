//! Validation of `Principal.AWS` values

use super::arn::is_arn;
use crate::document::{OneOrMany, WILDCARD};
use crate::error::{PolicyDocumentError, PolicyDocumentResult};
use regex::Regex;
use serde::de::value::MapAccessDeserializer;
use serde::de::{Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use std::fmt;
use std::marker::PhantomData;
use std::sync::OnceLock;

static ACCOUNT_ID_REGEX: OnceLock<Regex> = OnceLock::new();

fn account_id_regex() -> &'static Regex {
    ACCOUNT_ID_REGEX
        .get_or_init(|| Regex::new(r"^[0-9]{12}$").expect("Invalid account ID regex"))
}

/// Whether `principal` is acceptable as an AWS principal: `*`, an ARN, or a
/// 12-digit account ID. Unique IDs such as `AROA...` are rejected.
pub fn is_valid_aws_principal(principal: &str) -> bool {
    principal == WILDCARD || is_arn(principal) || account_id_regex().is_match(principal)
}

/// Check every `Statement[*].Principal.AWS` value in `policy_json`.
///
/// Returns `Ok(false)` at the first invalid principal and `Ok(true)` when all are
/// valid, including when no statement names an AWS principal. Fields other than
/// the ones on that path are ignored.
///
/// # Errors
///
/// [`PolicyDocumentError::Syntax`] if `policy_json` is not valid JSON (including
/// empty input), or [`PolicyDocumentError::UnexpectedShape`] if the document is
/// not an object, `Statement` is neither an object nor a list of objects, or an
/// AWS principal is neither a string nor a list of strings.
pub fn policy_has_valid_aws_principals(policy_json: &str) -> PolicyDocumentResult<bool> {
    let ObjectOnly(policy) = serde_json::from_str::<ObjectOnly<PolicyView>>(policy_json)
        .map_err(|e| match PolicyDocumentError::from_decode(e) {
            PolicyDocumentError::Data(e) => PolicyDocumentError::UnexpectedShape(e.to_string()),
            other => other,
        })?;

    let statements = policy.statements.map(|s| s.0).unwrap_or_default();
    let mut principals = statements
        .iter()
        .filter_map(|statement| statement.principal.aws.as_ref())
        .flat_map(OneOrMany::iter);

    if let Some(principal) = principals.find(|principal| !is_valid_aws_principal(principal)) {
        log::debug!("Invalid AWS principal '{}'", principal);
        return Ok(false);
    }
    Ok(true)
}

/// The part of a policy document read by [`policy_has_valid_aws_principals`]
#[derive(Deserialize)]
struct PolicyView {
    #[serde(rename = "Statement", default)]
    statements: Option<StatementsView>,
}

/// `Statement` as a single object or a list of objects
struct StatementsView(Vec<StatementView>);

#[derive(Deserialize)]
struct StatementView {
    #[serde(rename = "Principal", default, deserialize_with = "principal_view")]
    principal: PrincipalView,
}

/// `Principal` keeps only its `AWS` entry; the bare `"*"` form has none
#[derive(Deserialize, Default)]
struct PrincipalView {
    #[serde(rename = "AWS", default)]
    aws: Option<OneOrMany<String>>,
}

/// Deserializes `T` from a JSON object and rejects every other JSON type
struct ObjectOnly<T>(T);

impl<'de, T: Deserialize<'de>> Deserialize<'de> for ObjectOnly<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ObjectVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for ObjectVisitor<T> {
            type Value = T;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("an object")
            }

            fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<T, A::Error> {
                T::deserialize(MapAccessDeserializer::new(map))
            }
        }

        deserializer
            .deserialize_map(ObjectVisitor(PhantomData))
            .map(ObjectOnly)
    }
}

impl<'de> Deserialize<'de> for StatementsView {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct StatementsVisitor;

        impl<'de> Visitor<'de> for StatementsVisitor {
            type Value = StatementsView;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a statement object or a list of statement objects")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut statements = Vec::new();
                while let Some(ObjectOnly(statement)) = seq.next_element()? {
                    statements.push(statement);
                }
                Ok(StatementsView(statements))
            }

            fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
                StatementView::deserialize(MapAccessDeserializer::new(map))
                    .map(|statement| StatementsView(vec![statement]))
            }
        }

        deserializer.deserialize_any(StatementsVisitor)
    }
}

fn principal_view<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PrincipalView, D::Error> {
    struct PrincipalVisitor;

    impl<'de> Visitor<'de> for PrincipalVisitor {
        type Value = PrincipalView;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("\"*\" or a map of principal types")
        }

        fn visit_str<E>(self, _: &str) -> Result<Self::Value, E> {
            Ok(PrincipalView::default())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E> {
            Ok(PrincipalView::default())
        }

        fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
            PrincipalView::deserialize(MapAccessDeserializer::new(map))
        }
    }

    deserializer.deserialize_any(PrincipalVisitor)
}
