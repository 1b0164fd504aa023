#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Location handling for homescope.
//!
//! - [`location`] turns autocomplete address breakdowns into
//!   [`Location`](homescope_market_models::Location)s and holds the
//!   capped, de-duplicated selection the user is comparing.
//! - [`matching`] decides which geo-entity in the market database a
//!   selected location refers to.
//! - [`states`] maps US state abbreviations to names.

pub mod location;
pub mod matching;
pub mod states;

pub use location::{AddressComponent, LocationSelection, SearchInput, extract_zip, resolve_place};
pub use matching::{NameFilter, select_match};
