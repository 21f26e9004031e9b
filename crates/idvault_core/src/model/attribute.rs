//! Attribute domain model.
//!
//! # Responsibility
//! - Define the caller-facing attribute shape (a name plus one or many
//!   string values).
//! - Define the normalized row shape persisted one-value-per-row.
//!
//! # Invariants
//! - Attribute names are non-blank after trimming.
//! - Values travel verbatim; the empty string is a legal value.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{self, Display, Formatter};

/// One normalized attribute fact: a (name, value) pair owned by exactly one
/// identity record.
///
/// A multi-valued attribute is stored as several rows sharing the same name,
/// ordered by their position in the owning collection. Rows are replaced
/// wholesale on write, never edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeRow {
    pub name: String,
    pub value: String,
}

impl AttributeRow {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Attribute value payload: a single string or an ordered list of strings.
///
/// Serialized untagged, so a scalar renders as `"value"` and a list as
/// `["first", "second"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Single(String),
    Many(Vec<String>),
}

impl AttributeValue {
    /// Builds a scalar value from anything displayable.
    pub fn single(value: impl Display) -> Self {
        Self::Single(value.to_string())
    }

    /// Builds an ordered multi-value from displayable elements.
    ///
    /// Element order is preserved and duplicates are kept.
    pub fn many<I>(values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Display,
    {
        Self::Many(values.into_iter().map(|value| value.to_string()).collect())
    }

    /// Number of carried values. A scalar always counts as one.
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Many(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the value is list-shaped, regardless of element count.
    pub fn is_many(&self) -> bool {
        matches!(self, Self::Many(_))
    }

    /// Values as an ordered slice.
    pub fn values(&self) -> &[String] {
        match self {
            Self::Single(value) => std::slice::from_ref(value),
            Self::Many(values) => values.as_slice(),
        }
    }

    /// Consumes the payload into its ordered value list.
    pub fn into_values(self) -> Vec<String> {
        match self {
            Self::Single(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<String>> for AttributeValue {
    fn from(values: Vec<String>) -> Self {
        Self::Many(values)
    }
}

impl From<Vec<&str>> for AttributeValue {
    fn from(values: Vec<&str>) -> Self {
        Self::Many(values.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for AttributeValue {
    fn from(values: &[&str]) -> Self {
        Self::Many(values.iter().map(|value| value.to_string()).collect())
    }
}

/// Caller-facing attribute: a name and its scalar or multi value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: AttributeValue,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Shapes an attribute from grouped values.
    ///
    /// Exactly one value collapses to a scalar; zero or several stay
    /// list-shaped in the given order.
    pub fn from_values(name: impl Into<String>, mut values: Vec<String>) -> Self {
        let value = if values.len() == 1 {
            AttributeValue::Single(values.remove(0))
        } else {
            AttributeValue::Many(values)
        };
        Self {
            name: name.into(),
            value,
        }
    }
}

pub type AttributeResult<T> = Result<T, AttributeError>;

/// Attribute input errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeError {
    /// Attribute name is empty after trimming.
    BlankName,
}

impl Display for AttributeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::BlankName => write!(f, "attribute name must not be blank"),
        }
    }
}

impl Error for AttributeError {}

/// Normalizes an attribute name: surrounding whitespace is dropped and the
/// remainder must be non-empty.
pub fn normalize_attribute_name(name: &str) -> AttributeResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AttributeError::BlankName);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_attribute_name_trims_surrounding_whitespace() {
        assert_eq!(normalize_attribute_name("  mail  ").unwrap(), "mail");
        assert_eq!(normalize_attribute_name("mail").unwrap(), "mail");
    }

    #[test]
    fn normalize_attribute_name_rejects_blank_input() {
        assert_eq!(
            normalize_attribute_name("   "),
            Err(AttributeError::BlankName)
        );
        assert_eq!(normalize_attribute_name(""), Err(AttributeError::BlankName));
    }

    #[test]
    fn from_values_collapses_single_value_to_scalar() {
        let attribute = Attribute::from_values("mail", vec!["a@example.org".to_string()]);
        assert_eq!(
            attribute.value,
            AttributeValue::Single("a@example.org".to_string())
        );
        assert!(!attribute.value.is_many());
    }

    #[test]
    fn from_values_keeps_multiple_values_ordered() {
        let attribute = Attribute::from_values(
            "roles",
            vec!["admin".to_string(), "user".to_string(), "user".to_string()],
        );
        assert_eq!(attribute.value.values(), ["admin", "user", "user"]);
        assert!(attribute.value.is_many());
    }

    #[test]
    fn from_values_keeps_empty_list_shape() {
        let attribute = Attribute::from_values("roles", Vec::new());
        assert!(attribute.value.is_many());
        assert!(attribute.value.is_empty());
    }

    #[test]
    fn value_conversions_cover_scalar_and_list_inputs() {
        assert_eq!(AttributeValue::from("x").len(), 1);
        assert_eq!(AttributeValue::from(vec!["a", "b"]).values(), ["a", "b"]);
        assert_eq!(AttributeValue::single(42).values(), ["42"]);
        assert_eq!(AttributeValue::many(["a", "a"]).into_values(), ["a", "a"]);
    }
}
