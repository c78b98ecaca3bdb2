//! Scalar-or-list values used throughout IAM policy JSON
//!
//! `Action`, `Resource`, principal identifiers and condition values may each be
//! written either as a bare string or as an array of strings. [`OneOrMany`] keeps
//! both shapes and encodes any collection of exactly one element as a bare
//! scalar, which is the shape AWS itself returns.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::hash::{Hash, Hasher};

/// A single value or an ordered list of values.
///
/// Equality and hashing look only at the contained elements, so `One("x")` and
/// `Many(vec!["x"])` compare equal.
#[derive(Debug, Clone)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// View the contained values as a slice, regardless of shape
    pub fn as_slice(&self) -> &[T] {
        match self {
            Self::One(value) => std::slice::from_ref(value),
            Self::Many(values) => values,
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }

    /// Append a value, turning a scalar into a list when needed
    pub fn push(&mut self, value: T) {
        match self {
            Self::Many(values) => values.push(value),
            Self::One(_) => {
                if let Self::One(first) = std::mem::take(self) {
                    *self = Self::Many(vec![first, value]);
                }
            }
        }
    }

    /// Apply `f` to every element while keeping the scalar/list shape
    pub fn try_map<U, E>(self, mut f: impl FnMut(T) -> Result<U, E>) -> Result<OneOrMany<U>, E> {
        Ok(match self {
            Self::One(value) => OneOrMany::One(f(value)?),
            Self::Many(values) => {
                OneOrMany::Many(values.into_iter().map(f).collect::<Result<_, _>>()?)
            }
        })
    }
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl<T: PartialEq> PartialEq for OneOrMany<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq> Eq for OneOrMany<T> {}

impl<T: Hash> Hash for OneOrMany<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl From<String> for OneOrMany<String> {
    fn from(value: String) -> Self {
        Self::One(value)
    }
}

impl From<Vec<String>> for OneOrMany<String> {
    fn from(values: Vec<String>) -> Self {
        Self::Many(values)
    }
}

impl From<&str> for OneOrMany<String> {
    fn from(value: &str) -> Self {
        Self::One(value.to_string())
    }
}

impl From<Vec<&str>> for OneOrMany<String> {
    fn from(values: Vec<&str>) -> Self {
        Self::Many(values.into_iter().map(str::to_string).collect())
    }
}

impl<T> FromIterator<T> for OneOrMany<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::Many(iter.into_iter().collect())
    }
}

impl<T> IntoIterator for OneOrMany<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_vec().into_iter()
    }
}

impl<'a, T> IntoIterator for &'a OneOrMany<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Serialize> Serialize for OneOrMany<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.as_slice() {
            [single] => single.serialize(serializer),
            values => values.serialize(serializer),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged, expecting = "a single value or a list of values")]
enum OneOrManyRepr<T> {
    One(T),
    Many(Vec<T>),
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for OneOrMany<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match OneOrManyRepr::deserialize(deserializer)? {
            OneOrManyRepr::One(value) => Self::One(value),
            OneOrManyRepr::Many(values) => Self::Many(values),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_single_element_list_encodes_as_scalar() {
        let values: OneOrMany<String> = vec!["s3:GetObject"].into();
        assert_eq!(
            serde_json::to_string(&values).unwrap(),
            "\"s3:GetObject\""
        );
    }

    #[test]
    fn test_multiple_elements_encode_as_array() {
        let values: OneOrMany<String> = vec!["s3:GetObject", "s3:PutObject"].into();
        assert_eq!(
            serde_json::to_string(&values).unwrap(),
            r#"["s3:GetObject","s3:PutObject"]"#
        );
    }

    #[test]
    fn test_scalar_and_single_element_list_are_equal() {
        let scalar: OneOrMany<String> = "x".into();
        let list: OneOrMany<String> = vec!["x"].into();
        assert_eq!(scalar, list);
        assert_ne!(scalar, OneOrMany::from(vec!["x", "y"]));
    }

    #[test]
    fn test_push_coerces_scalar_to_list() {
        let mut values: OneOrMany<String> = "a".into();
        values.push("b".to_string());
        assert!(matches!(values, OneOrMany::Many(_)));
        assert_eq!(values.as_slice(), ["a", "b"]);
    }

    #[test]
    fn test_decode_scalar_and_array() {
        let scalar: OneOrMany<String> = serde_json::from_str("\"*\"").unwrap();
        assert_eq!(scalar.as_slice(), ["*"]);

        let list: OneOrMany<String> = serde_json::from_str(r#"["a","b"]"#).unwrap();
        assert_eq!(list.as_slice(), ["a", "b"]);
    }

    #[test]
    fn test_decode_rejects_other_types() {
        let err = serde_json::from_str::<OneOrMany<String>>("42").unwrap_err();
        assert!(err.to_string().contains("a single value or a list of values"));
    }

    proptest! {
        #[test]
        fn prop_single_element_round_trip(value in ".*") {
            let original: OneOrMany<String> = OneOrMany::Many(vec![value.clone()]);
            let encoded = serde_json::to_string(&original).unwrap();
            prop_assert_eq!(&encoded, &serde_json::to_string(&value).unwrap());

            let decoded: OneOrMany<String> = serde_json::from_str(&encoded).unwrap();
            prop_assert_eq!(decoded.as_slice(), [value]);
        }
    }
}
