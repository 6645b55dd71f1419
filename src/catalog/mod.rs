//! Catalog
//!
//! Read-only collections of the three things the storefront sells: quantity
//! priced goods (banten), configurable venues and donation-priced officiants.
//! The catalog is seeded once from YAML and never mutated afterwards.

use std::{fs, path::Path};

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{catalog::fixture::CatalogFixture, regions::Region};

pub mod fixture;
pub mod venues;

pub use venues::{VenueOffering, VenuePackage, VenueSelection};

/// Category or sub-category value that matches everything.
pub const ALL: &str = "Semua";

/// Maximum number of search suggestions returned.
pub const SUGGESTION_LIMIT: usize = 5;

const BUNDLED_CATALOG: &str = include_str!("../../fixtures/catalog.yml");

/// Catalog loading and lookup errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// IO error reading a catalog file
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Two entries share an id. Goods and officiants share one id space
    /// because both are cart lines keyed by catalog id.
    #[error("Duplicate {kind} id: {id}")]
    DuplicateId {
        /// Kind of catalog entry
        kind: &'static str,
        /// The repeated id
        id: u32,
    },

    /// A venue was defined without any package
    #[error("Venue {0} has no packages")]
    NoPackages(u32),

    /// A venue has no package with the requested name
    #[error("Venue {venue} has no package named {package:?}")]
    UnknownPackage {
        /// Venue id
        venue: u32,
        /// Requested package name
        package: String,
    },

    /// No entry with the given id
    #[error("{kind} {id} not found")]
    NotFound {
        /// Kind of catalog entry
        kind: &'static str,
        /// Requested id
        id: u32,
    },
}

/// A quantity-priced ceremonial offering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogGood {
    /// Stable catalog id
    pub id: u32,

    /// Display name
    pub name: String,

    /// Top-level category
    pub category: String,

    /// Optional sub-category
    #[serde(default)]
    pub subcategory: Option<String>,

    /// Unit price in whole Rupiah
    pub price: i64,

    /// Description
    #[serde(default)]
    pub description: String,

    /// Image reference
    #[serde(default)]
    pub image: String,
}

/// An officiant (pandita) that can be engaged for a ceremony.
///
/// Officiants are never priced: the purchaser offers a donation directly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficiantProfile {
    /// Stable catalog id
    pub id: u32,

    /// Display name
    pub name: String,

    /// Religious house (griya) affiliation
    pub house: String,

    /// Home regency
    pub region: Region,

    /// Operating area
    #[serde(default)]
    pub location: String,

    /// Specialty tags
    #[serde(default)]
    pub specialties: Vec<String>,

    /// Availability status label
    #[serde(default)]
    pub availability: String,

    /// Image reference
    #[serde(default)]
    pub image: String,

    /// Short biography
    #[serde(default)]
    pub bio: String,
}

/// Inclusive price bounds in whole Rupiah. An absent maximum is unbounded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PriceRange {
    /// Lower bound
    pub min: i64,

    /// Upper bound
    pub max: Option<i64>,
}

impl PriceRange {
    /// Returns true if the price lies within the range.
    pub fn contains(&self, price: i64) -> bool {
        price >= self.min && self.max.is_none_or(|max| price <= max)
    }
}

/// Filter over goods.
#[derive(Clone, Debug, Default)]
pub struct GoodsFilter {
    /// Case-insensitive name search
    pub search: String,

    /// Category, `None` or [`ALL`] for every category
    pub category: Option<String>,

    /// Sub-category, `None` or [`ALL`] for every sub-category
    pub subcategory: Option<String>,

    /// Price bounds
    pub price: PriceRange,
}

/// Filter over venues.
#[derive(Clone, Debug, Default)]
pub struct VenueFilter {
    /// Case-insensitive search over name and location
    pub search: String,

    /// Location, `None` or [`ALL`] for every location
    pub location: Option<String>,

    /// Price bounds on the base rental price
    pub price: PriceRange,
}

/// Catalog
#[derive(Debug, Clone)]
pub struct Catalog {
    goods: Vec<CatalogGood>,
    venues: Vec<VenueOffering>,
    officiants: Vec<OfficiantProfile>,

    /// Catalog id -> position lookups
    good_index: FxHashMap<u32, usize>,
    venue_index: FxHashMap<u32, usize>,
    officiant_index: FxHashMap<u32, usize>,
}

impl Catalog {
    /// Load the catalog bundled with the crate.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled fixture is malformed.
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_yaml(BUNDLED_CATALOG)
    }

    /// Load a catalog from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml(&contents)
    }

    /// Load a catalog from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed YAML, bad prices or duplicate ids.
    pub fn from_yaml(contents: &str) -> Result<Self, CatalogError> {
        let fixture: CatalogFixture = serde_norway::from_str(contents)?;

        let goods = fixture
            .goods
            .into_iter()
            .map(CatalogGood::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let venues = fixture
            .venues
            .into_iter()
            .map(VenueOffering::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let officiants: Vec<OfficiantProfile> = fixture
            .officiants
            .into_iter()
            .map(OfficiantProfile::from)
            .collect();

        let good_index = index_by_id("good", goods.iter().map(|good| good.id))?;
        let officiant_index =
            index_by_id("officiant", officiants.iter().map(|officiant| officiant.id))?;

        if let Some(id) = officiants
            .iter()
            .map(|officiant| officiant.id)
            .find(|id| good_index.contains_key(id))
        {
            return Err(CatalogError::DuplicateId {
                kind: "officiant",
                id,
            });
        }

        Ok(Self {
            good_index,
            venue_index: index_by_id("venue", venues.iter().map(|venue| venue.id))?,
            officiant_index,
            goods,
            venues,
            officiants,
        })
    }

    /// All goods, in catalog order.
    pub fn goods(&self) -> &[CatalogGood] {
        &self.goods
    }

    /// All venues, in catalog order.
    pub fn venues(&self) -> &[VenueOffering] {
        &self.venues
    }

    /// All officiants, in catalog order.
    pub fn officiants(&self) -> &[OfficiantProfile] {
        &self.officiants
    }

    /// Get a good by id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] for unknown ids.
    pub fn good(&self, id: u32) -> Result<&CatalogGood, CatalogError> {
        self.good_index
            .get(&id)
            .and_then(|&idx| self.goods.get(idx))
            .ok_or(CatalogError::NotFound { kind: "good", id })
    }

    /// Get a venue by id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] for unknown ids.
    pub fn venue(&self, id: u32) -> Result<&VenueOffering, CatalogError> {
        self.venue_index
            .get(&id)
            .and_then(|&idx| self.venues.get(idx))
            .ok_or(CatalogError::NotFound { kind: "venue", id })
    }

    /// Get an officiant by id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] for unknown ids.
    pub fn officiant(&self, id: u32) -> Result<&OfficiantProfile, CatalogError> {
        self.officiant_index
            .get(&id)
            .and_then(|&idx| self.officiants.get(idx))
            .ok_or(CatalogError::NotFound {
                kind: "officiant",
                id,
            })
    }

    /// Goods matching every part of the filter.
    pub fn find_goods(&self, filter: &GoodsFilter) -> Vec<&CatalogGood> {
        self.base_goods(filter)
            .filter(|good| {
                matches_choice(filter.subcategory.as_deref(), good.subcategory.as_deref())
            })
            .collect()
    }

    /// Sub-categories present once the category, search and price parts of the
    /// filter are applied, led by [`ALL`].
    pub fn subcategories(&self, filter: &GoodsFilter) -> Vec<&str> {
        let mut seen = FxHashSet::default();
        let mut subcategories = vec![ALL];

        for subcategory in self
            .base_goods(filter)
            .filter_map(|good| good.subcategory.as_deref())
        {
            if seen.insert(subcategory) {
                subcategories.push(subcategory);
            }
        }

        subcategories
    }

    /// Venues matching every part of the filter.
    pub fn find_venues(&self, filter: &VenueFilter) -> Vec<&VenueOffering> {
        let needle = filter.search.to_lowercase();

        self.venues
            .iter()
            .filter(|venue| {
                contains_folded(&venue.name, &needle) || contains_folded(&venue.location, &needle)
            })
            .filter(|venue| matches_choice(filter.location.as_deref(), Some(venue.location.as_str())))
            .filter(|venue| filter.price.contains(venue.price))
            .collect()
    }

    /// Officiants whose name or religious house contains the search term.
    pub fn find_officiants(&self, search: &str) -> Vec<&OfficiantProfile> {
        let needle = search.to_lowercase();

        self.officiants
            .iter()
            .filter(|officiant| {
                contains_folded(&officiant.name, &needle)
                    || contains_folded(&officiant.house, &needle)
            })
            .collect()
    }

    /// Up to [`SUGGESTION_LIMIT`] goods whose name contains the term.
    pub fn suggest_goods(&self, term: &str) -> Vec<&CatalogGood> {
        if term.trim().is_empty() {
            return Vec::new();
        }

        let needle = term.to_lowercase();

        self.goods
            .iter()
            .filter(|good| contains_folded(&good.name, &needle))
            .take(SUGGESTION_LIMIT)
            .collect()
    }

    /// Up to [`SUGGESTION_LIMIT`] venues whose name contains the term.
    pub fn suggest_venues(&self, term: &str) -> Vec<&VenueOffering> {
        if term.trim().is_empty() {
            return Vec::new();
        }

        let needle = term.to_lowercase();

        self.venues
            .iter()
            .filter(|venue| contains_folded(&venue.name, &needle))
            .take(SUGGESTION_LIMIT)
            .collect()
    }

    fn base_goods<'a, 'f>(
        &'a self,
        filter: &'f GoodsFilter,
    ) -> impl Iterator<Item = &'a CatalogGood> {
        let needle = filter.search.to_lowercase();

        self.goods.iter().filter(move |good| {
            contains_folded(&good.name, &needle)
                && matches_choice(filter.category.as_deref(), Some(good.category.as_str()))
                && filter.price.contains(good.price)
        })
    }
}

fn index_by_id(
    kind: &'static str,
    ids: impl Iterator<Item = u32>,
) -> Result<FxHashMap<u32, usize>, CatalogError> {
    let mut index = FxHashMap::default();

    for (position, id) in ids.enumerate() {
        if index.insert(id, position).is_some() {
            return Err(CatalogError::DuplicateId { kind, id });
        }
    }

    Ok(index)
}

fn matches_choice(choice: Option<&str>, value: Option<&str>) -> bool {
    match choice {
        None | Some(ALL) => true,
        Some(choice) => value == Some(choice),
    }
}

fn contains_folded(haystack: &str, folded_needle: &str) -> bool {
    haystack.to_lowercase().contains(folded_needle)
}
