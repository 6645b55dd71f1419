//! Catalog Fixtures

use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::Deserialize;

use crate::{
    catalog::{
        CatalogError, CatalogGood, OfficiantProfile,
        venues::{VenueOffering, VenuePackage},
    },
    pricing,
    regions::Region,
};

/// Top-level catalog document in YAML.
#[derive(Debug, Deserialize)]
pub struct CatalogFixture {
    /// Quantity-priced offerings
    #[serde(default)]
    pub goods: Vec<GoodFixture>,

    /// Bookable venues
    #[serde(default)]
    pub venues: Vec<VenueFixture>,

    /// Officiants available for engagement
    #[serde(default)]
    pub officiants: Vec<OfficiantFixture>,
}

/// Good Fixture
#[derive(Debug, Deserialize)]
pub struct GoodFixture {
    /// Stable catalog id
    pub id: u32,

    /// Display name
    pub name: String,

    /// Top-level category
    pub category: String,

    /// Optional sub-category
    #[serde(default)]
    pub subcategory: Option<String>,

    /// Unit price (e.g. "25000 IDR")
    pub price: String,

    /// Description
    #[serde(default)]
    pub description: String,

    /// Image reference
    #[serde(default)]
    pub image: String,
}

impl TryFrom<GoodFixture> for CatalogGood {
    type Error = CatalogError;

    fn try_from(fixture: GoodFixture) -> Result<Self, Self::Error> {
        Ok(CatalogGood {
            id: fixture.id,
            price: parse_price(&fixture.price)?,
            name: fixture.name,
            category: fixture.category,
            subcategory: fixture.subcategory,
            description: fixture.description,
            image: fixture.image,
        })
    }
}

/// Venue package in YAML.
#[derive(Debug, Deserialize)]
pub struct PackageFixture {
    /// Package name
    pub name: String,

    /// Package price (e.g. "15000000 IDR")
    pub price: String,

    /// Description
    #[serde(default)]
    pub description: String,
}

/// Venue Fixture
#[derive(Debug, Deserialize)]
pub struct VenueFixture {
    /// Stable catalog id
    pub id: u32,

    /// Display name
    pub name: String,

    /// Ceremony category the venue is suited for
    pub category: String,

    /// Base rental price
    pub price: String,

    /// Town or regency
    pub location: String,

    /// Street address
    #[serde(default)]
    pub address: String,

    /// Capacity label (e.g. "Max 500 Pax")
    #[serde(default)]
    pub capacity: String,

    /// Catering price per guest
    pub catering_price: String,

    /// Facilities on site
    #[serde(default)]
    pub facilities: Vec<String>,

    /// Description
    #[serde(default)]
    pub description: String,

    /// Image reference
    #[serde(default)]
    pub image: String,

    /// Selectable packages
    pub packages: Vec<PackageFixture>,

    /// Selectable location options within the venue
    #[serde(default)]
    pub location_options: Vec<String>,
}

impl TryFrom<VenueFixture> for VenueOffering {
    type Error = CatalogError;

    fn try_from(fixture: VenueFixture) -> Result<Self, Self::Error> {
        if fixture.packages.is_empty() {
            return Err(CatalogError::NoPackages(fixture.id));
        }

        let packages = fixture
            .packages
            .into_iter()
            .map(|package| {
                Ok(VenuePackage {
                    price: parse_price(&package.price)?,
                    name: package.name,
                    description: package.description,
                })
            })
            .collect::<Result<Vec<_>, CatalogError>>()?;

        Ok(VenueOffering {
            id: fixture.id,
            price: parse_price(&fixture.price)?,
            catering_price: parse_price(&fixture.catering_price)?,
            name: fixture.name,
            category: fixture.category,
            location: fixture.location,
            address: fixture.address,
            capacity: fixture.capacity,
            facilities: fixture.facilities,
            description: fixture.description,
            image: fixture.image,
            packages,
            location_options: fixture.location_options,
        })
    }
}

/// Officiant Fixture
#[derive(Debug, Deserialize)]
pub struct OfficiantFixture {
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

impl From<OfficiantFixture> for OfficiantProfile {
    fn from(fixture: OfficiantFixture) -> Self {
        OfficiantProfile {
            id: fixture.id,
            name: fixture.name,
            house: fixture.house,
            region: fixture.region,
            location: fixture.location,
            specialties: fixture.specialties,
            availability: fixture.availability,
            image: fixture.image,
            bio: fixture.bio,
        }
    }
}

/// Parse a price string (e.g. "25000 IDR") into whole Rupiah.
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount is not a non-negative whole number, or if the currency is
/// not Rupiah.
pub fn parse_price(s: &str) -> Result<i64, CatalogError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    let [amount, currency_code] = parts.as_slice() else {
        return Err(CatalogError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    if *currency_code != pricing::currency().iso_alpha_code {
        return Err(CatalogError::UnknownCurrency((*currency_code).to_string()));
    }

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| CatalogError::InvalidPrice(s.to_string()))?;

    if amount.is_sign_negative() || amount.fract() != Decimal::ZERO {
        return Err(CatalogError::InvalidPrice(s.to_string()));
    }

    amount
        .to_i64()
        .ok_or_else(|| CatalogError::InvalidPrice(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_price_accepts_whole_rupiah() -> Result<(), CatalogError> {
        assert_eq!(parse_price("25000 IDR")?, 25_000);
        assert_eq!(parse_price("0 IDR")?, 0);

        Ok(())
    }

    #[test]
    fn parse_price_rejects_invalid_format() {
        let result = parse_price("25000IDR");

        assert!(matches!(result, Err(CatalogError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_rejects_other_currencies() {
        let result = parse_price("2.99 GBP");

        assert!(matches!(result, Err(CatalogError::UnknownCurrency(code)) if code == "GBP"));
    }

    #[test]
    fn parse_price_rejects_fractions_and_negatives() {
        assert!(matches!(
            parse_price("1500.50 IDR"),
            Err(CatalogError::InvalidPrice(_))
        ));
        assert!(matches!(
            parse_price("-100 IDR"),
            Err(CatalogError::InvalidPrice(_))
        ));
    }

    #[test]
    fn venue_without_packages_is_rejected() {
        let fixture = VenueFixture {
            id: 900,
            name: "Kosong".to_string(),
            category: "Upacara".to_string(),
            price: "1000 IDR".to_string(),
            location: "Bangli".to_string(),
            address: String::new(),
            capacity: String::new(),
            catering_price: "100 IDR".to_string(),
            facilities: Vec::new(),
            description: String::new(),
            image: String::new(),
            packages: Vec::new(),
            location_options: Vec::new(),
        };

        let result = VenueOffering::try_from(fixture);

        assert!(matches!(result, Err(CatalogError::NoPackages(900))));
    }
}
