//! Identity record domain model.
//!
//! # Responsibility
//! - Define the record envelope shared by user, role, and group identities.
//! - Delegate attribute access to the embedded projection engine.
//!
//! # Invariants
//! - `id` is a stable caller-supplied name, non-blank after trimming.
//! - Records start enabled; expiration never precedes creation.
//! - Attribute rows are reachable only through the projection engine.

use crate::model::attribute::{Attribute, AttributeResult, AttributeRow, AttributeValue};
use crate::projection::AttributeProjector;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{self, Display, Formatter};

static RECORD_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([a-z]+)://(.+)$").expect("valid record key regex"));

/// Identity record category.
///
/// One envelope shape serves every category; the kind drives key derivation
/// and the storage discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    User,
    Role,
    Group,
}

impl RecordKind {
    /// Stable discriminator used in storage and lookup keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Role => "role",
            Self::Group => "group",
        }
    }

    /// Lookup-key prefix for this kind.
    pub fn key_prefix(self) -> &'static str {
        match self {
            Self::User => "user://",
            Self::Role => "role://",
            Self::Group => "group://",
        }
    }
}

/// Parses a kind discriminator as stored in `records.kind`.
pub fn parse_record_kind(value: &str) -> Option<RecordKind> {
    match value {
        "user" => Some(RecordKind::User),
        "role" => Some(RecordKind::Role),
        "group" => Some(RecordKind::Group),
        _ => None,
    }
}

/// Record key parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordKeyError {
    /// Key does not match `<kind>://<id>`.
    MalformedKey(String),
    /// Key prefix names no known record kind.
    UnknownKind(String),
}

impl Display for RecordKeyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedKey(key) => {
                write!(f, "record key `{key}` does not match `<kind>://<id>`")
            }
            Self::UnknownKind(kind) => write!(f, "unknown record kind `{kind}` in key"),
        }
    }
}

impl Error for RecordKeyError {}

/// Splits a lookup key like `user://alice` into its kind and id.
pub fn parse_record_key(key: &str) -> Result<(RecordKind, String), RecordKeyError> {
    let trimmed = key.trim();
    let captures = RECORD_KEY_RE
        .captures(trimmed)
        .ok_or_else(|| RecordKeyError::MalformedKey(key.to_string()))?;
    let kind_text = &captures[1];
    let kind =
        parse_record_kind(kind_text).ok_or_else(|| RecordKeyError::UnknownKind(kind_text.to_string()))?;
    Ok((kind, captures[2].to_string()))
}

/// Record validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    /// Record id is empty after trimming.
    BlankId,
    /// Expiration timestamp precedes the creation timestamp.
    ExpiresBeforeCreation { created_at: i64, expires_at: i64 },
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::BlankId => write!(f, "record id must not be blank"),
            Self::ExpiresBeforeCreation {
                created_at,
                expires_at,
            } => write!(
                f,
                "expiration {expires_at} precedes creation {created_at}"
            ),
        }
    }
}

impl Error for RecordValidationError {}

/// Canonical identity record: envelope fields plus owned attribute rows.
///
/// The id and kind are fixed at creation. Attribute state lives in the
/// embedded [`AttributeProjector`] and is exposed through the delegating
/// methods below, so every caller goes through the same projection rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    id: String,
    kind: RecordKind,
    /// Deactivation flag. Disabled records stay stored and keep their rows.
    pub enabled: bool,
    /// Creation timestamp in epoch milliseconds.
    pub created_at: i64,
    /// Optional expiration timestamp in epoch milliseconds.
    pub expires_at: Option<i64>,
    #[serde(rename = "attribute_rows")]
    attributes: AttributeProjector,
}

impl IdentityRecord {
    /// Creates an enabled record with no attributes.
    ///
    /// `created_at` is epoch milliseconds supplied by the caller, so time
    /// sourcing stays explicit and testable.
    pub fn new(
        kind: RecordKind,
        id: impl Into<String>,
        created_at: i64,
    ) -> Result<Self, RecordValidationError> {
        let record = Self {
            id: id.into().trim().to_string(),
            kind,
            enabled: true,
            created_at,
            expires_at: None,
            attributes: AttributeProjector::new(),
        };
        record.validate()?;
        Ok(record)
    }

    /// Rebuilds a stored record from envelope fields and ordered rows.
    ///
    /// Intended for storage layers. The grouped view starts unmaterialized.
    pub fn from_parts(
        kind: RecordKind,
        id: impl Into<String>,
        enabled: bool,
        created_at: i64,
        expires_at: Option<i64>,
        rows: Vec<AttributeRow>,
    ) -> Result<Self, RecordValidationError> {
        let record = Self {
            id: id.into(),
            kind,
            enabled,
            created_at,
            expires_at,
            attributes: AttributeProjector::from_rows(rows),
        };
        record.validate()?;
        Ok(record)
    }

    /// Stable record id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Record category.
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Derived lookup key, `<kind>://<id>`.
    pub fn key(&self) -> String {
        format!("{}{}", self.kind.key_prefix(), self.id)
    }

    /// Checks the envelope invariants.
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        if self.id.trim().is_empty() {
            return Err(RecordValidationError::BlankId);
        }
        if let Some(expires_at) = self.expires_at {
            if expires_at < self.created_at {
                return Err(RecordValidationError::ExpiresBeforeCreation {
                    created_at: self.created_at,
                    expires_at,
                });
            }
        }
        Ok(())
    }

    /// Whether the record has expired at `now_epoch_ms`.
    ///
    /// A record with no expiration never expires.
    pub fn is_expired_at(&self, now_epoch_ms: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => now_epoch_ms >= expires_at,
            None => false,
        }
    }

    /// Whether the record is usable at `now_epoch_ms`: enabled and not
    /// expired.
    pub fn is_active_at(&self, now_epoch_ms: i64) -> bool {
        self.enabled && !self.is_expired_at(now_epoch_ms)
    }

    /// Assigns an attribute, replacing any previous values for the name.
    pub fn set_attribute(
        &mut self,
        name: &str,
        value: impl Into<AttributeValue>,
    ) -> AttributeResult<()> {
        self.attributes.set_attribute(name, value)
    }

    /// Removes an attribute; returns the number of rows dropped.
    pub fn remove_attribute(&mut self, name: &str) -> usize {
        self.attributes.remove_attribute(name)
    }

    /// Looks up one attribute, materializing the grouped view if needed.
    pub fn attribute(&mut self, name: &str) -> Option<Attribute> {
        self.attributes.attribute(name)
    }

    /// All attributes in first-seen name order.
    pub fn attributes(&mut self) -> Vec<Attribute> {
        self.attributes.attributes()
    }

    /// Normalized rows backing the attributes, in storage order.
    pub fn attribute_rows(&self) -> &[AttributeRow] {
        self.attributes.rows()
    }

    /// Discards the materialized attribute view.
    pub fn invalidate_attribute_view(&mut self) {
        self.attributes.invalidate_view()
    }

    /// Whether the grouped attribute view is currently materialized.
    pub fn is_attribute_view_built(&self) -> bool {
        self.attributes.is_view_built()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_record_key_splits_kind_and_id() {
        assert_eq!(
            parse_record_key("user://alice").unwrap(),
            (RecordKind::User, "alice".to_string())
        );
        assert_eq!(
            parse_record_key(" group://staff/eu ").unwrap(),
            (RecordKind::Group, "staff/eu".to_string())
        );
    }

    #[test]
    fn parse_record_key_rejects_malformed_input() {
        assert_eq!(
            parse_record_key("alice"),
            Err(RecordKeyError::MalformedKey("alice".to_string()))
        );
        assert_eq!(
            parse_record_key("user://"),
            Err(RecordKeyError::MalformedKey("user://".to_string()))
        );
    }

    #[test]
    fn parse_record_key_rejects_unknown_kind() {
        assert_eq!(
            parse_record_key("agent://bond"),
            Err(RecordKeyError::UnknownKind("agent".to_string()))
        );
    }

    #[test]
    fn kind_round_trips_through_discriminator() {
        for kind in [RecordKind::User, RecordKind::Role, RecordKind::Group] {
            assert_eq!(parse_record_kind(kind.as_str()), Some(kind));
        }
        assert_eq!(parse_record_kind("robot"), None);
    }
}
