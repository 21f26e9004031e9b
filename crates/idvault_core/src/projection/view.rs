//! Grouped name-to-values view derived from normalized rows.

use crate::model::attribute::AttributeRow;
use std::collections::HashMap;

/// Derived grouping of attribute rows.
///
/// Each name maps to its values in row order; names iterate in the order
/// they were first seen. The view is a rebuildable cache over the row
/// collection, never a source of truth of its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct GroupedAttributeView {
    /// Names in first-seen order.
    order: Vec<String>,
    /// Ordered values per name; duplicates preserved.
    values: HashMap<String, Vec<String>>,
}

impl GroupedAttributeView {
    /// Builds the view by folding rows in collection order.
    ///
    /// Pure: the same rows always produce the same grouping.
    pub(crate) fn from_rows(rows: &[AttributeRow]) -> Self {
        let mut view = Self::default();
        for row in rows {
            view.push_value(&row.name, row.value.clone());
        }
        view
    }

    /// Appends one value under a name, registering the name on first sight.
    pub(crate) fn push_value(&mut self, name: &str, value: String) {
        match self.values.get_mut(name) {
            Some(existing) => existing.push(value),
            None => {
                self.order.push(name.to_string());
                self.values.insert(name.to_string(), vec![value]);
            }
        }
    }

    /// Replaces the full value list for a name.
    ///
    /// An already known name keeps its iteration slot; a new name is
    /// appended at the end.
    pub(crate) fn replace(&mut self, name: &str, values: Vec<String>) {
        if self.values.insert(name.to_string(), values).is_none() {
            self.order.push(name.to_string());
        }
    }

    /// Drops a name and its values. Remaining names keep their order.
    pub(crate) fn remove(&mut self, name: &str) -> bool {
        if self.values.remove(name).is_none() {
            return false;
        }
        self.order.retain(|existing| existing != name);
        true
    }

    pub(crate) fn get(&self, name: &str) -> Option<&[String]> {
        self.values.get(name).map(Vec::as_slice)
    }

    /// Number of distinct attribute names.
    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    /// Iterates (name, values) pairs in first-seen name order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &[String])> + '_ {
        self.order.iter().map(|name| {
            let values = self.values.get(name).map(Vec::as_slice).unwrap_or_default();
            (name.as_str(), values)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, value: &str) -> AttributeRow {
        AttributeRow::new(name, value)
    }

    #[test]
    fn from_rows_groups_interleaved_names_in_first_seen_order() {
        let view = GroupedAttributeView::from_rows(&[
            row("a", "1"),
            row("b", "x"),
            row("a", "2"),
            row("a", "2"),
        ]);

        let grouped: Vec<(&str, &[String])> = view.iter().collect();
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].0, "a");
        assert_eq!(grouped[0].1, ["1", "2", "2"]);
        assert_eq!(grouped[1].0, "b");
        assert_eq!(grouped[1].1, ["x"]);
    }

    #[test]
    fn replace_keeps_iteration_slot_for_known_name() {
        let mut view = GroupedAttributeView::from_rows(&[row("a", "1"), row("b", "x")]);

        view.replace("a", vec!["9".to_string()]);

        let names: Vec<&str> = view.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(view.get("a"), Some(["9".to_string()].as_slice()));
    }

    #[test]
    fn replace_appends_unknown_name_at_the_end() {
        let mut view = GroupedAttributeView::from_rows(&[row("a", "1")]);

        view.replace("z", vec!["7".to_string()]);

        let names: Vec<&str> = view.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["a", "z"]);
    }

    #[test]
    fn remove_drops_name_and_preserves_remaining_order() {
        let mut view =
            GroupedAttributeView::from_rows(&[row("a", "1"), row("b", "x"), row("c", "y")]);

        assert!(view.remove("b"));
        assert!(!view.remove("b"));

        let names: Vec<&str> = view.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["a", "c"]);
        assert_eq!(view.get("b"), None);
        assert_eq!(view.len(), 2);
    }
}
