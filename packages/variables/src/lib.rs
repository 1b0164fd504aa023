#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Market metric catalog handling.
//!
//! The catalog is fetched once per session. Derived month-over-month and
//! year-over-year variants (`*_mom`, `*_yoy`) are hidden from the picker,
//! the rest is grouped by category and searchable by name, and at most
//! [`MAX_VARIABLES`] metrics can be selected at a time.

use std::collections::BTreeMap;

use homescope_market_models::{AddOutcome, MAX_VARIABLES, Variable};
use serde::{Deserialize, Serialize};

/// Key suffixes of derived variants that are not offered in the picker.
pub const DERIVED_SUFFIXES: &[&str] = &["_mom", "_yoy"];

/// Key substrings of metrics displayed as a precomputed period-over-period
/// change instead of their raw level.
pub const PERIOD_CHANGE_PATTERNS: &[&str] = &["hpi", "price_index", "rent_index"];

/// Group name used for catalog entries without a category.
pub const UNCATEGORIZED: &str = "Other";

/// Returns `true` if `key` names a derived `_mom`/`_yoy` variant.
#[must_use]
pub fn is_derived_variant(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    DERIVED_SUFFIXES.iter().any(|s| key.ends_with(s))
}

/// Returns `true` if the metric with this key is shown as a
/// period-over-period change.
#[must_use]
pub fn is_period_change_metric(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    PERIOD_CHANGE_PATTERNS.iter().any(|p| key.contains(p))
}

/// Drops derived variants, keeping catalog order.
#[must_use]
pub fn visible_variables(catalog: &[Variable]) -> Vec<Variable> {
    catalog
        .iter()
        .filter(|v| !is_derived_variant(&v.key))
        .cloned()
        .collect()
}

/// Groups variables by category. Entries keep their relative order within
/// each group; missing categories go under [`UNCATEGORIZED`].
#[must_use]
pub fn group_by_category(variables: &[Variable]) -> BTreeMap<String, Vec<Variable>> {
    let mut groups: BTreeMap<String, Vec<Variable>> = BTreeMap::new();
    for var in variables {
        let category = var
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(UNCATEGORIZED);
        groups
            .entry(category.to_string())
            .or_default()
            .push(var.clone());
    }
    groups
}

/// Case-insensitive substring search over label and key. An empty query
/// matches everything.
#[must_use]
pub fn filter_by_name<'a>(variables: &'a [Variable], query: &str) -> Vec<&'a Variable> {
    let query = query.trim().to_lowercase();
    variables
        .iter()
        .filter(|v| {
            query.is_empty()
                || v.label.to_lowercase().contains(&query)
                || v.key.to_lowercase().contains(&query)
        })
        .collect()
}

/// Looks up a variable by key.
#[must_use]
pub fn find_by_key<'a>(variables: &'a [Variable], key: &str) -> Option<&'a Variable> {
    variables.iter().find(|v| v.key == key)
}

/// The metrics currently charted, capped at [`MAX_VARIABLES`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableSelection {
    items: Vec<Variable>,
}

impl VariableSelection {
    /// Creates an empty selection.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Selects a variable. No-op if it is already selected or the
    /// selection is full.
    pub fn select(&mut self, variable: Variable) -> AddOutcome {
        if self.contains(&variable.key) {
            return AddOutcome::Duplicate;
        }
        if self.items.len() >= MAX_VARIABLES {
            log::debug!("Variable selection full, ignoring {}", variable.key);
            return AddOutcome::Full;
        }
        self.items.push(variable);
        AddOutcome::Added
    }

    /// Removes the variable with the given key. Always succeeds; returns
    /// `true` if something was removed.
    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|v| v.key != key);
        self.items.len() != before
    }

    /// Returns `true` if a variable with this key is selected.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.items.iter().any(|v| v.key == key)
    }

    /// Returns `true` once [`MAX_VARIABLES`] are selected.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.items.len() >= MAX_VARIABLES
    }

    /// Number of selected variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Selected variables in selection order.
    #[must_use]
    pub fn as_slice(&self) -> &[Variable] {
        &self.items
    }

    /// Removes every variable.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(id: i64, key: &str, label: &str, category: Option<&str>) -> Variable {
        Variable {
            id,
            key: key.to_string(),
            label: label.to_string(),
            category: category.map(str::to_string),
            description: None,
            value_type: None,
        }
    }

    fn catalog() -> Vec<Variable> {
        vec![
            var(1, "median_list_price", "Median List Price", Some("Prices")),
            var(2, "median_list_price_mom", "Median List Price MoM", Some("Prices")),
            var(3, "median_list_price_yoy", "Median List Price YoY", Some("Prices")),
            var(4, "active_listings", "Active Listings", Some("Inventory")),
            var(5, "hpi", "Home Price Index", Some("Prices")),
            var(6, "days_on_market", "Days on Market", None),
        ]
    }

    #[test]
    fn hides_derived_variants() {
        let visible = visible_variables(&catalog());
        let keys: Vec<&str> = visible.iter().map(|v| v.key.as_str()).collect();
        assert_eq!(
            keys,
            ["median_list_price", "active_listings", "hpi", "days_on_market"]
        );
        assert!(is_derived_variant("Rent_YOY"));
    }

    #[test]
    fn groups_by_category_in_catalog_order() {
        let groups = group_by_category(&visible_variables(&catalog()));
        let prices: Vec<&str> = groups["Prices"].iter().map(|v| v.key.as_str()).collect();
        assert_eq!(prices, ["median_list_price", "hpi"]);
        assert_eq!(groups["Inventory"].len(), 1);
        assert_eq!(groups[UNCATEGORIZED][0].key, "days_on_market");
    }

    #[test]
    fn filters_case_insensitively() {
        let cat = catalog();
        let hits = filter_by_name(&cat, "LIST");
        assert_eq!(hits.len(), 4);
        assert_eq!(filter_by_name(&cat, "  ").len(), cat.len());
        assert!(filter_by_name(&cat, "mortgage").is_empty());
    }

    #[test]
    fn period_change_metrics_match_by_substring() {
        assert!(is_period_change_metric("hpi"));
        assert!(is_period_change_metric("zillow_rent_index"));
        assert!(!is_period_change_metric("median_list_price"));
    }

    #[test]
    fn third_variable_is_rejected() {
        let cat = catalog();
        let mut sel = VariableSelection::new();
        assert!(sel.select(cat[0].clone()).is_added());
        assert!(sel.select(cat[3].clone()).is_added());
        let before = sel.clone();
        assert_eq!(sel.select(cat[4].clone()), AddOutcome::Full);
        assert_eq!(sel, before);
    }

    #[test]
    fn reselecting_is_a_no_op() {
        let cat = catalog();
        let mut sel = VariableSelection::new();
        sel.select(cat[0].clone());
        assert_eq!(sel.select(cat[0].clone()), AddOutcome::Duplicate);
        assert_eq!(sel.len(), 1);
    }

    #[test]
    fn remove_always_succeeds() {
        let cat = catalog();
        let mut sel = VariableSelection::new();
        sel.select(cat[0].clone());
        assert!(sel.remove("median_list_price"));
        assert!(!sel.remove("median_list_price"));
        assert!(sel.is_empty());
    }
}
