//! Attribute projection engine over normalized rows.
//!
//! # Responsibility
//! - Own one record's attribute rows and the grouped view derived from them.
//! - Fan logical attribute writes out into single-value rows.
//! - Materialize the grouped view lazily and keep it coherent with the rows.
//!
//! # Invariants
//! - Rows are the source of truth; the view is derived and never persisted.
//! - A built view always matches what a rebuild from the current rows would
//!   produce for every name it serves.
//! - Writes are authoritative: assigning a name again replaces its previous
//!   values in rows and view alike.

use super::view::GroupedAttributeView;
use crate::model::attribute::{
    normalize_attribute_name, Attribute, AttributeResult, AttributeRow, AttributeValue,
};
use serde::{Deserialize, Serialize};

/// Grouped-view cache state.
///
/// An explicit two-state value instead of an optional map, so an evicted
/// view can never be confused with one that simply has no entries.
#[derive(Debug, Clone, Default)]
enum ViewCache {
    /// No view materialized; the next read rebuilds from rows.
    #[default]
    Unbuilt,
    /// Materialized view, updated by every row mutation.
    Built(GroupedAttributeView),
}

/// Projection engine owning one record's attribute rows.
///
/// Callers see logical attributes (name plus scalar or list value); storage
/// sees normalized one-value-per-row facts. Reads take `&mut self` because
/// the first read after construction or invalidation materializes the
/// grouped view from the rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeProjector {
    rows: Vec<AttributeRow>,
    #[serde(skip)]
    view: ViewCache,
}

impl AttributeProjector {
    /// Creates an empty projector with no rows and no materialized view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps rows loaded from storage.
    ///
    /// The view stays unbuilt until the first read, so hydrating many
    /// records costs nothing beyond holding their rows.
    pub fn from_rows(rows: Vec<AttributeRow>) -> Self {
        Self {
            rows,
            view: ViewCache::Unbuilt,
        }
    }

    /// Current rows in collection order.
    pub fn rows(&self) -> &[AttributeRow] {
        &self.rows
    }

    /// Number of normalized rows, not distinct names.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Assigns `value` to `name`, replacing any previous values.
    ///
    /// The value fans out into one row per element. Existing rows for the
    /// name are dropped first and the new rows land at the collection tail,
    /// so each value sequence is stored contiguously. An empty sequence
    /// clears the attribute entirely.
    ///
    /// # Errors
    /// - [`AttributeError::BlankName`] when the name is empty after
    ///   trimming.
    ///
    /// [`AttributeError::BlankName`]: crate::model::attribute::AttributeError::BlankName
    pub fn set_attribute(
        &mut self,
        name: &str,
        value: impl Into<AttributeValue>,
    ) -> AttributeResult<()> {
        let name = normalize_attribute_name(name)?;
        let values = value.into().into_values();

        self.rows.retain(|row| row.name != name);

        if values.is_empty() {
            if let ViewCache::Built(view) = &mut self.view {
                view.remove(&name);
            }
            return Ok(());
        }

        if let ViewCache::Built(view) = &mut self.view {
            view.replace(&name, values.clone());
        }
        for value in values {
            self.rows.push(AttributeRow::new(name.clone(), value));
        }
        Ok(())
    }

    /// Removes every row carrying `name` and evicts the name from the view.
    ///
    /// Returns the number of rows removed. Remaining rows keep their
    /// relative order; an unknown name is a no-op returning zero.
    pub fn remove_attribute(&mut self, name: &str) -> usize {
        let name = name.trim();
        if let ViewCache::Built(view) = &mut self.view {
            view.remove(name);
        }
        let before = self.rows.len();
        self.rows.retain(|row| row.name != name);
        before - self.rows.len()
    }

    /// Looks up one attribute, materializing the view if needed.
    ///
    /// A name backed by a single row yields a scalar value; two or more
    /// rows yield a list value in row order. Unknown names return `None`.
    pub fn attribute(&mut self, name: &str) -> Option<Attribute> {
        self.ensure_view();
        let name = name.trim();
        let ViewCache::Built(view) = &self.view else {
            return None;
        };
        view.get(name)
            .map(|values| Attribute::from_values(name, values.to_vec()))
    }

    /// All attributes in first-seen name order, materializing the view if
    /// needed.
    pub fn attributes(&mut self) -> Vec<Attribute> {
        self.ensure_view();
        let ViewCache::Built(view) = &self.view else {
            return Vec::new();
        };
        let mut attributes = Vec::with_capacity(view.len());
        for (name, values) in view.iter() {
            attributes.push(Attribute::from_values(name, values.to_vec()));
        }
        attributes
    }

    /// Discards the materialized view. The next read rebuilds it from rows.
    pub fn invalidate_view(&mut self) {
        self.view = ViewCache::Unbuilt;
    }

    /// Whether a materialized view currently exists.
    pub fn is_view_built(&self) -> bool {
        matches!(self.view, ViewCache::Built(_))
    }

    fn ensure_view(&mut self) {
        if let ViewCache::Unbuilt = self.view {
            self.view = ViewCache::Built(GroupedAttributeView::from_rows(&self.rows));
        }
    }
}

/// The view is derived state, so equality considers rows only.
impl PartialEq for AttributeProjector {
    fn eq(&self, other: &Self) -> bool {
        self.rows == other.rows
    }
}

impl Eq for AttributeProjector {}
