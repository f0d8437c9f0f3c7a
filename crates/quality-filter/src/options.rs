//! Toggleable option sets backing the filter stages.

use std::collections::HashSet;
use std::hash::Hash;

/// One toggleable value with its display label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOption<V> {
    pub value: V,
    pub label: String,
}

/// Counts of options added and removed by a universe refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptionsDelta {
    pub added: usize,
    pub removed: usize,
}

impl OptionsDelta {
    pub fn is_empty(&self) -> bool {
        self.added == 0 && self.removed == 0
    }
}

impl std::ops::AddAssign for OptionsDelta {
    fn add_assign(&mut self, other: Self) {
        self.added += other.added;
        self.removed += other.removed;
    }
}

/// The universe of known values of one filter stage plus the accepted
/// subset.
///
/// Options are kept in insertion order unless sorting is enabled, in which
/// case every new option is inserted at its label position.
#[derive(Debug, Clone)]
pub struct FilterOptions<V> {
    options: Vec<FilterOption<V>>,
    accepted: HashSet<V>,
    sorted: bool,
}

impl<V> Default for FilterOptions<V> {
    fn default() -> Self {
        Self {
            options: Vec::new(),
            accepted: HashSet::new(),
            sorted: false,
        }
    }
}

impl<V: Clone + Eq + Hash> FilterOptions<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables label ordering. Enabling sorts the existing
    /// options once; disabling keeps the current order for later appends.
    pub fn set_sorted(&mut self, sorted: bool) {
        if sorted && !self.sorted {
            self.options.sort_by(|a, b| a.label.cmp(&b.label));
        }
        self.sorted = sorted;
    }

    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    pub fn options(&self) -> &[FilterOption<V>] {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn contains(&self, value: &V) -> bool {
        self.options.iter().any(|option| option.value == *value)
    }

    pub fn label(&self, value: &V) -> Option<&str> {
        self.options
            .iter()
            .find(|option| option.value == *value)
            .map(|option| option.label.as_str())
    }

    pub fn accepted(&self) -> &HashSet<V> {
        &self.accepted
    }

    pub fn is_accepted(&self, value: &V) -> bool {
        self.accepted.contains(value)
    }

    /// True when `value` is offered as an option and currently deselected.
    /// Values the stage does not know about are never rejected.
    pub fn rejects(&self, value: &V) -> bool {
        !self.accepted.contains(value) && self.contains(value)
    }

    /// True when every known option is accepted.
    pub fn all_accepted(&self) -> bool {
        self.options
            .iter()
            .all(|option| self.accepted.contains(&option.value))
    }

    /// Replaces the accepted set. Values outside the universe are ignored.
    pub fn set_accepted(&mut self, values: impl IntoIterator<Item = V>) {
        let accepted: HashSet<V> = values
            .into_iter()
            .filter(|value| self.contains(value))
            .collect();
        self.accepted = accepted;
    }

    /// Toggles a single value. Returns false if the value is unknown.
    pub fn set_value_accepted(&mut self, value: &V, accepted: bool) -> bool {
        if !self.contains(value) {
            return false;
        }
        if accepted {
            self.accepted.insert(value.clone());
        } else {
            self.accepted.remove(value);
        }
        true
    }

    pub fn select_all(&mut self) {
        self.accepted = self
            .options
            .iter()
            .map(|option| option.value.clone())
            .collect();
    }

    pub fn deselect_all(&mut self) {
        self.accepted.clear();
    }

    /// Adds a new option, accepted by default. Returns false if the value is
    /// already known.
    pub fn add(&mut self, value: V, label: impl Into<String>) -> bool {
        if self.contains(&value) {
            return false;
        }
        let label = label.into();
        let position = if self.sorted {
            self.options
                .partition_point(|option| option.label.as_str() < label.as_str())
        } else {
            self.options.len()
        };
        self.accepted.insert(value.clone());
        self.options.insert(position, FilterOption { value, label });
        true
    }

    /// Removes an option and its accepted state.
    pub fn remove(&mut self, value: &V) -> bool {
        let Some(position) = self
            .options
            .iter()
            .position(|option| option.value == *value)
        else {
            return false;
        };
        self.options.remove(position);
        self.accepted.remove(value);
        true
    }

    /// Replaces the universe with `known`: vanished values are dropped from
    /// both universe and accepted set, new values are added as accepted and
    /// surviving values keep their accepted state.
    pub fn sync(&mut self, known: Vec<(V, String)>) -> OptionsDelta {
        let known_values: HashSet<&V> = known.iter().map(|(value, _)| value).collect();
        let before = self.options.len();
        self.options
            .retain(|option| known_values.contains(&option.value));
        self.accepted.retain(|value| known_values.contains(value));
        let removed = before - self.options.len();

        let mut added = 0;
        for (value, label) in known {
            if self.add(value, label) {
                added += 1;
            }
        }
        OptionsDelta { added, removed }
    }
}
