//! Matching a selected [`Location`] against geo-entities stored in the
//! market database.
//!
//! Candidate rows are fetched with a loose name filter ([`NameFilter`])
//! and then narrowed with a granularity-specific rule ([`matches`]). The
//! first candidate that satisfies the rule wins.

use homescope_market_models::{GeoEntity, Granularity, Location};

use crate::location::extract_zip;
use crate::states;

/// Loose server-side name filter used to fetch candidate geo-entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameFilter {
    /// Name starts with the value (case-insensitive).
    Prefix(String),
    /// Name contains the value (case-insensitive).
    Contains(String),
    /// No name filter.
    Any,
}

impl NameFilter {
    /// Builds the filter for a location.
    #[must_use]
    pub fn for_location(location: &Location) -> Self {
        let name = location.name.trim();
        match location.granularity {
            Granularity::National => Self::Any,
            Granularity::State => Self::Prefix(strip_trailing_word(&expand_state(name), "state")),
            Granularity::Metro => Self::Contains(first_segment(name).to_string()),
            Granularity::County => {
                Self::Contains(strip_trailing_word(first_segment(name), "county"))
            }
            Granularity::Zip => extract_zip(name).map_or_else(
                || Self::Contains(name.to_string()),
                Self::Contains,
            ),
        }
    }

    /// Returns the SQL `ILIKE` pattern for this filter, or `None` for
    /// [`NameFilter::Any`]. `%`, `_` and `\` in the value are escaped.
    #[must_use]
    pub fn like_pattern(&self) -> Option<String> {
        match self {
            Self::Prefix(v) => Some(format!("{}%", escape_like(v))),
            Self::Contains(v) => Some(format!("%{}%", escape_like(v))),
            Self::Any => None,
        }
    }
}

fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Lowercases, trims, and collapses internal whitespace.
fn normalize(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Text before the first `,` or `-`, trimmed.
fn first_segment(s: &str) -> &str {
    s.split([',', '-']).next().unwrap_or(s).trim()
}

/// Removes a trailing standalone `word` (case-insensitive).
fn strip_trailing_word(s: &str, word: &str) -> String {
    let trimmed = s.trim();
    let suffix = format!(" {word}");
    if let Some(cut) = trimmed.len().checked_sub(suffix.len())
        && let Some(tail) = trimmed.get(cut..)
        && tail.eq_ignore_ascii_case(&suffix)
    {
        return trimmed[..cut].trim_end().to_string();
    }
    trimmed.to_string()
}

/// Expands a bare two-letter abbreviation to the state name.
fn expand_state(s: &str) -> String {
    let s = s.trim();
    if s.len() == 2
        && let Some(name) = states::state_name(s)
    {
        return name.to_string();
    }
    s.to_string()
}

fn zip_matches(wanted: &str, candidate: &str) -> bool {
    matches!(
        (extract_zip(wanted), extract_zip(candidate)),
        (Some(a), Some(b)) if a == b
    )
}

fn state_matches(wanted: &str, candidate: &str) -> bool {
    let w = normalize(&expand_state(wanted));
    let c = normalize(&expand_state(candidate));
    let w_bare = strip_trailing_word(&w, "state");
    let c_bare = strip_trailing_word(&c, "state");

    w == c || w_bare == c || w == c_bare || w_bare == c_bare
}

fn metro_matches(wanted: &str, candidate: &str) -> bool {
    let w = normalize(wanted);
    let c = normalize(candidate);
    if w.is_empty() || c.is_empty() {
        return false;
    }
    if w == c || c.contains(&w) || w.contains(&c) {
        return true;
    }
    let w_first = first_segment(&w);
    let c_first = first_segment(&c);
    !w_first.is_empty() && c_first.starts_with(w_first)
}

fn county_matches(wanted: &str, candidate: &str) -> bool {
    let w = normalize(wanted);
    let c = normalize(candidate);
    if w.is_empty() || c.is_empty() {
        return false;
    }
    if w == c || first_segment(&w) == first_segment(&c) {
        return true;
    }
    if c.contains(&w) || w.contains(&c) {
        return true;
    }
    let w_bare = strip_trailing_word(first_segment(&w), "county");
    let c_bare = strip_trailing_word(first_segment(&c), "county");
    !w_bare.is_empty() && w_bare == c_bare
}

fn national_matches(wanted: &str, candidate: &GeoEntity) -> bool {
    candidate.geo_type == Granularity::National.geo_type()
        || normalize(wanted) == normalize(&candidate.name)
}

/// Returns `true` if `candidate` is the geo-entity for `wanted`.
#[must_use]
pub fn matches(wanted: &Location, candidate: &GeoEntity) -> bool {
    let name = wanted.name.as_str();
    match wanted.granularity {
        Granularity::Zip => zip_matches(name, &candidate.name),
        Granularity::State => state_matches(name, &candidate.name),
        Granularity::Metro => metro_matches(name, &candidate.name),
        Granularity::County => county_matches(name, &candidate.name),
        Granularity::National => national_matches(name, candidate),
    }
}

/// Picks the first candidate that matches `wanted`.
#[must_use]
pub fn select_match<'a>(wanted: &Location, candidates: &'a [GeoEntity]) -> Option<&'a GeoEntity> {
    let found = candidates.iter().find(|c| matches(wanted, c));
    if found.is_none() {
        log::debug!(
            "No geo-entity matched {wanted} among {} candidates",
            candidates.len()
        );
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(name: &str, geo_type: &str) -> GeoEntity {
        GeoEntity {
            id: 1,
            name: name.to_string(),
            geo_type: geo_type.to_string(),
        }
    }

    fn loc(name: &str, granularity: Granularity) -> Location {
        Location::new(name, granularity)
    }

    #[test]
    fn state_suffix_is_optional_both_ways() {
        let california = loc("California", Granularity::State);
        assert!(matches(&california, &entity("California", "state")));
        assert!(matches(&california, &entity("California State", "state")));

        let california_state = loc("California State", Granularity::State);
        assert!(matches(&california_state, &entity("california", "state")));
    }

    #[test]
    fn state_does_not_match_substring() {
        let kansas = loc("Kansas", Granularity::State);
        assert!(!matches(&kansas, &entity("Arkansas", "state")));
        assert!(matches(&kansas, &entity("Kansas", "state")));
    }

    #[test]
    fn state_abbreviation_expands() {
        assert!(matches(
            &loc("TX", Granularity::State),
            &entity("Texas", "state")
        ));
    }

    #[test]
    fn zip_requires_exact_code() {
        let zip = loc("90210", Granularity::Zip);
        assert!(matches(&zip, &entity("90210", "zip")));
        assert!(matches(&zip, &entity("ZIP 90210", "zip")));
        assert!(!matches(&zip, &entity("90211", "zip")));
    }

    #[test]
    fn metro_matches_on_first_segment() {
        let austin = loc("Austin, TX", Granularity::Metro);
        assert!(matches(
            &austin,
            &entity("Austin-Round Rock-Georgetown, TX", "msa")
        ));
        assert!(!matches(&austin, &entity("Houston-Pasadena, TX", "msa")));
    }

    #[test]
    fn metro_matches_on_containment() {
        let dallas = loc("Dallas", Granularity::Metro);
        assert!(matches(&dallas, &entity("Dallas-Fort Worth-Arlington, TX", "msa")));
    }

    #[test]
    fn county_variants() {
        let travis = loc("Travis County, TX", Granularity::County);
        assert!(matches(&travis, &entity("Travis County", "county")));
        assert!(matches(&travis, &entity("Travis County, TX", "county")));

        let bare = loc("Travis", Granularity::County);
        assert!(matches(&bare, &entity("Travis County", "county")));

        assert!(!matches(&travis, &entity("Harris County", "county")));
    }

    #[test]
    fn select_match_returns_first_hit() {
        let candidates = vec![
            entity("Arkansas", "state"),
            entity("Kansas", "state"),
            entity("Kansas State", "state"),
        ];
        let hit = select_match(&loc("Kansas", Granularity::State), &candidates).unwrap();
        assert_eq!(hit.name, "Kansas");
        assert!(select_match(&loc("Ohio", Granularity::State), &candidates).is_none());
    }

    #[test]
    fn name_filters_per_granularity() {
        assert_eq!(
            NameFilter::for_location(&loc("California State", Granularity::State)),
            NameFilter::Prefix("California".to_string())
        );
        assert_eq!(
            NameFilter::for_location(&loc("Austin, TX", Granularity::Metro)),
            NameFilter::Contains("Austin".to_string())
        );
        assert_eq!(
            NameFilter::for_location(&loc("Travis County, TX", Granularity::County)),
            NameFilter::Contains("Travis".to_string())
        );
        assert_eq!(
            NameFilter::for_location(&loc("ZIP 90210", Granularity::Zip)),
            NameFilter::Contains("90210".to_string())
        );
        assert_eq!(
            NameFilter::for_location(&loc("United States", Granularity::National)),
            NameFilter::Any
        );
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(
            NameFilter::Contains("50%_off".to_string()).like_pattern(),
            Some("%50\\%\\_off%".to_string())
        );
        assert_eq!(
            NameFilter::Prefix("Ohio".to_string()).like_pattern(),
            Some("Ohio%".to_string())
        );
        assert_eq!(NameFilter::Any.like_pattern(), None);
    }
}
