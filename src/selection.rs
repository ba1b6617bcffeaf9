//! Selection Sets

use rustc_hash::FxHashMap;

use crate::carts::{Cart, CartLine, CartLineId};

/// Which cart lines are chosen for the next checkout.
///
/// A selection set is local state: it is never read from or written to the
/// server. After [`SelectionSet::reconcile`] it holds exactly one entry per
/// line of the cart it was reconciled against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    entries: FxHashMap<CartLineId, bool>,
}

impl SelectionSet {
    /// An empty selection set.
    pub fn new() -> Self {
        Self::default()
    }

    /// A selection set with every given line selected.
    pub fn for_lines(lines: &[CartLine]) -> Self {
        Self::new().reconciled(lines)
    }

    /// The selection set that results from reconciling against `lines`.
    ///
    /// Lines already present keep their flag, new lines are selected and
    /// entries for lines that vanished are dropped. Reconciling the result
    /// against the same lines again yields an identical set.
    #[must_use]
    pub fn reconciled(&self, lines: &[CartLine]) -> Self {
        let entries = lines
            .iter()
            .map(|line| {
                let selected = self.entries.get(&line.id).copied().unwrap_or(true);

                (line.id.clone(), selected)
            })
            .collect();

        Self { entries }
    }

    /// Reconcile in place against `lines`; see [`SelectionSet::reconciled`].
    pub fn reconcile(&mut self, lines: &[CartLine]) {
        *self = self.reconciled(lines);
    }

    /// Flip a line's flag, returning the new value.
    ///
    /// Unknown lines are ignored and yield `None`.
    pub fn toggle(&mut self, line: &CartLineId) -> Option<bool> {
        let selected = self.entries.get_mut(line)?;

        *selected = !*selected;

        Some(*selected)
    }

    /// Set a line's flag. Returns `false` if the line is unknown.
    pub fn set(&mut self, line: &CartLineId, selected: bool) -> bool {
        let Some(entry) = self.entries.get_mut(line) else {
            return false;
        };

        *entry = selected;

        true
    }

    /// Set every line's flag.
    pub fn set_all(&mut self, selected: bool) {
        self.entries.values_mut().for_each(|entry| *entry = selected);
    }

    /// Whether the line is selected. Unknown lines are not.
    pub fn is_selected(&self, line: &CartLineId) -> bool {
        self.entries.get(line).copied().unwrap_or(false)
    }

    /// Whether the set has an entry for the line.
    pub fn contains(&self, line: &CartLineId) -> bool {
        self.entries.contains_key(line)
    }

    /// Whether every line is selected (and there is at least one).
    pub fn all_selected(&self) -> bool {
        !self.entries.is_empty() && self.entries.values().all(|selected| *selected)
    }

    /// Number of selected lines.
    pub fn selected_count(&self) -> usize {
        self.entries.values().filter(|selected| **selected).count()
    }

    /// Number of entries, selected or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Identifiers of all entries, in no particular order.
    pub fn line_ids(&self) -> impl Iterator<Item = &CartLineId> {
        self.entries.keys()
    }

    /// The cart's selected lines, in cart order.
    pub fn selected_lines<'c>(&self, cart: &'c Cart) -> impl Iterator<Item = &'c CartLine> {
        cart.lines()
            .iter()
            .filter(|line| self.is_selected(&line.id))
    }
}
