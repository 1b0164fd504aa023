//! Turning autocomplete selections into [`Location`]s and holding the
//! user's location selection.
//!
//! A place picked from the autocomplete dropdown arrives as a list of
//! address components (`postal_code`, `locality`, `administrative_area_level_1`,
//! ...). The most specific component wins:
//!
//! 1. postal code → [`Granularity::Zip`]
//! 2. locality / sub-locality → [`Granularity::Metro`]
//! 3. county-level administrative area → [`Granularity::County`]
//! 4. state-level administrative area → [`Granularity::State`]
//! 5. the formatted label as-is

use homescope_market_models::{AddOutcome, Granularity, Location, MAX_LOCATIONS};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::states;

/// First standalone run of exactly five digits.
static ZIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^0-9])([0-9]{5})(?:[^0-9]|$)").expect("valid regex"));

/// One component of an autocomplete place breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressComponent {
    /// Full text (e.g. "Texas").
    pub long_name: String,
    /// Abbreviated text (e.g. "TX").
    pub short_name: String,
    /// Component types (e.g. `["administrative_area_level_1", "political"]`).
    pub types: Vec<String>,
}

impl AddressComponent {
    /// Returns `true` if this component carries the given type tag.
    #[must_use]
    pub fn has_type(&self, ty: &str) -> bool {
        self.types.iter().any(|t| t == ty)
    }
}

/// Extracts the first five-digit code from free text.
///
/// `"ZIP 90210"` and `"Beverly Hills, CA 90210, USA"` both yield
/// `"90210"`. Longer digit runs are not split.
#[must_use]
pub fn extract_zip(text: &str) -> Option<String> {
    ZIP_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn find<'a>(components: &'a [AddressComponent], ty: &str) -> Option<&'a AddressComponent> {
    components.iter().find(|c| c.has_type(ty))
}

fn non_empty(s: &str) -> Option<&str> {
    let s = s.trim();
    (!s.is_empty()).then_some(s)
}

/// Resolves an autocomplete selection into a [`Location`].
///
/// Returns `None` if neither the components nor the formatted label
/// carry anything usable.
#[must_use]
pub fn resolve_place(components: &[AddressComponent], formatted: Option<&str>) -> Option<Location> {
    let state = find(components, "administrative_area_level_1");
    let state_short = state.and_then(|s| non_empty(&s.short_name));

    let qualify = |name: &str| match state_short {
        Some(st) => format!("{name}, {st}"),
        None => name.to_string(),
    };

    if let Some(zip) = find(components, "postal_code")
        && let Some(code) = extract_zip(&zip.long_name)
    {
        return Some(Location::new(code, Granularity::Zip));
    }

    if let Some(locality) = find(components, "locality")
        .or_else(|| find(components, "sublocality"))
        .or_else(|| find(components, "sublocality_level_1"))
        && let Some(name) = non_empty(&locality.long_name)
    {
        return Some(Location::new(qualify(name), Granularity::Metro));
    }

    if let Some(county) = find(components, "administrative_area_level_2")
        && let Some(name) = non_empty(&county.long_name)
    {
        return Some(Location::new(qualify(name), Granularity::County));
    }

    if let Some(state) = state {
        let name = non_empty(&state.long_name)
            .map(str::to_string)
            .or_else(|| states::state_name(&state.short_name).map(str::to_string));
        if let Some(name) = name {
            return Some(Location::new(name, Granularity::State));
        }
    }

    let formatted = formatted.and_then(non_empty)?;

    if let Some(code) = extract_zip(formatted) {
        return Some(Location::new(code, Granularity::Zip));
    }

    let only_country = !components.is_empty() && components.iter().all(|c| c.has_type("country"));
    let granularity = if only_country {
        Granularity::National
    } else {
        Granularity::Metro
    };

    Some(Location::new(formatted, granularity))
}

/// Returns `true` if two locations refer to the same place.
///
/// ZIP entries compare their extracted five-digit codes so surrounding
/// text is ignored; everything else compares display names exactly.
#[must_use]
pub fn same_location(a: &Location, b: &Location) -> bool {
    if a.granularity == Granularity::Zip
        && b.granularity == Granularity::Zip
        && let (Some(x), Some(y)) = (extract_zip(&a.name), extract_zip(&b.name))
    {
        return x == y;
    }
    a.name == b.name
}

/// The locations currently being compared, capped at [`MAX_LOCATIONS`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSelection {
    items: Vec<Location>,
}

impl LocationSelection {
    /// Creates an empty selection.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Appends a location unless it duplicates an existing one or the
    /// selection is full.
    pub fn add(&mut self, location: Location) -> AddOutcome {
        if self.items.iter().any(|l| same_location(l, &location)) {
            log::debug!("Ignoring duplicate location {location}");
            return AddOutcome::Duplicate;
        }
        if self.is_full() {
            log::debug!("Location selection full, ignoring {location}");
            return AddOutcome::Full;
        }
        self.items.push(location);
        AddOutcome::Added
    }

    /// Removes the location with the given display name. Returns `true` if
    /// something was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|l| l.name != name);
        self.items.len() != before
    }

    /// Returns `true` if an equivalent location is already selected.
    #[must_use]
    pub fn contains(&self, location: &Location) -> bool {
        self.items.iter().any(|l| same_location(l, location))
    }

    /// Returns `true` once [`MAX_LOCATIONS`] are selected.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.items.len() >= MAX_LOCATIONS
    }

    /// Number of selected locations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates selected locations in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Location> {
        self.items.iter()
    }

    /// Selected locations in insertion order.
    #[must_use]
    pub fn as_slice(&self) -> &[Location] {
        &self.items
    }

    /// Removes every location.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<'a> IntoIterator for &'a LocationSelection {
    type Item = &'a Location;
    type IntoIter = std::slice::Iter<'a, Location>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// The free-text location search box.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchInput {
    text: String,
}

impl SearchInput {
    /// Current input text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replaces the input text (user typing).
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Handles a place picked from the dropdown.
    ///
    /// Resolves the place and offers it to `selection`. The input is
    /// cleared only when the location was actually added. Returns `None`
    /// (and touches nothing) if the place could not be resolved.
    pub fn accept(
        &mut self,
        selection: &mut LocationSelection,
        components: &[AddressComponent],
        formatted: Option<&str>,
    ) -> Option<AddOutcome> {
        let location = resolve_place(components, formatted)?;
        let outcome = selection.add(location);
        if outcome.is_added() {
            self.text.clear();
        }
        Some(outcome)
    }
}
