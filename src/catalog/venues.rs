//! Venues

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogError;

/// Guest count a fresh venue selection starts with.
pub const DEFAULT_GUEST_COUNT: u32 = 100;

/// Lowest guest count the stepper will go down to.
pub const MIN_STEPPED_GUEST_COUNT: u32 = 50;

/// Guest count change per stepper press.
pub const GUEST_STEP: u32 = 10;

/// A priced package offered by a venue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenuePackage {
    /// Package name
    pub name: String,

    /// Package price in whole Rupiah
    pub price: i64,

    /// Description
    #[serde(default)]
    pub description: String,
}

/// A bookable venue from the catalog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VenueOffering {
    /// Stable catalog id
    pub id: u32,

    /// Display name
    pub name: String,

    /// Ceremony category
    pub category: String,

    /// Base rental price in whole Rupiah
    pub price: i64,

    /// Town or regency
    pub location: String,

    /// Street address
    pub address: String,

    /// Capacity label
    pub capacity: String,

    /// Catering price per guest in whole Rupiah
    pub catering_price: i64,

    /// Facilities
    pub facilities: Vec<String>,

    /// Description
    pub description: String,

    /// Image reference
    pub image: String,

    /// Selectable packages (never empty)
    pub packages: Vec<VenuePackage>,

    /// Selectable location options
    pub location_options: Vec<String>,
}

impl VenueOffering {
    /// Looks up a package by name.
    pub fn package(&self, name: &str) -> Option<&VenuePackage> {
        self.packages.iter().find(|package| package.name == name)
    }

    /// Starts a booking configuration with the default package, location and guest count.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NoPackages`] if the venue has no packages.
    pub fn configure(&self) -> Result<VenueSelection, CatalogError> {
        let package = self
            .packages
            .first()
            .ok_or(CatalogError::NoPackages(self.id))?;

        Ok(VenueSelection {
            venue_id: self.id,
            venue_name: self.name.clone(),
            package: package.clone(),
            location: self.location_options.first().cloned(),
            guest_count: DEFAULT_GUEST_COUNT,
            catering_price: self.catering_price,
        })
    }
}

/// A venue configured for booking: package, location option and guest count.
///
/// The same venue can be booked several times under different configurations,
/// so a selection is identified by [`VenueSelection::unique_id`] rather than the
/// catalog id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueSelection {
    /// Catalog id of the venue
    pub venue_id: u32,

    /// Catalog name of the venue
    pub venue_name: String,

    /// Chosen package
    pub package: VenuePackage,

    /// Chosen location option
    #[serde(default)]
    pub location: Option<String>,

    /// Number of guests to cater for
    pub guest_count: u32,

    /// Catering price per guest in whole Rupiah
    pub catering_price: i64,
}

impl VenueSelection {
    /// Switches to another package of the venue.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownPackage`] if the venue has no package with that name.
    pub fn with_package(
        mut self,
        venue: &VenueOffering,
        name: &str,
    ) -> Result<Self, CatalogError> {
        let package = venue
            .package(name)
            .ok_or_else(|| CatalogError::UnknownPackage {
                venue: venue.id,
                package: name.to_string(),
            })?;

        self.package = package.clone();

        Ok(self)
    }

    /// Picks one of the venue's location options.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Sets the guest count as typed, without clamping.
    #[must_use]
    pub fn with_guests(mut self, guest_count: u32) -> Self {
        self.guest_count = guest_count;
        self
    }

    /// Stepper increment.
    pub fn add_guests(&mut self) {
        self.guest_count = self.guest_count.saturating_add(GUEST_STEP);
    }

    /// Stepper decrement, never below [`MIN_STEPPED_GUEST_COUNT`].
    pub fn remove_guests(&mut self) {
        self.guest_count = self
            .guest_count
            .saturating_sub(GUEST_STEP)
            .max(MIN_STEPPED_GUEST_COUNT);
    }

    /// Composite identity: venue id, package name and guest count.
    pub fn unique_id(&self) -> String {
        format!("{}-{}-{}", self.venue_id, self.package.name, self.guest_count)
    }

    /// Display name including the guest count.
    pub fn display_name(&self) -> String {
        format!("{} ({} pax)", self.venue_name, self.guest_count)
    }

    /// Catering cost for all guests.
    pub fn catering_total(&self) -> i64 {
        self.catering_price
            .saturating_mul(i64::from(self.guest_count))
    }

    /// Package price plus catering for all guests.
    pub fn total(&self) -> i64 {
        self.package.price.saturating_add(self.catering_total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn griya_taksu() -> VenueOffering {
        VenueOffering {
            id: 301,
            name: "Griya Taksu".to_string(),
            category: "Pawiwahan".to_string(),
            price: 15_000_000,
            location: "Gianyar".to_string(),
            address: "Jl. Raya Mas, Ubud".to_string(),
            capacity: "Max 500 Pax".to_string(),
            catering_price: 65_000,
            facilities: vec!["Wantilan Utama".to_string()],
            description: String::new(),
            image: String::new(),
            packages: vec![
                VenuePackage {
                    name: "Sewa Venue Saja".to_string(),
                    price: 15_000_000,
                    description: String::new(),
                },
                VenuePackage {
                    name: "Paket All In".to_string(),
                    price: 45_000_000,
                    description: String::new(),
                },
            ],
            location_options: vec!["Indoor Wantilan".to_string(), "Outdoor Garden".to_string()],
        }
    }

    #[test]
    fn configure_uses_defaults() -> Result<(), CatalogError> {
        let selection = griya_taksu().configure()?;

        assert_eq!(selection.package.name, "Sewa Venue Saja");
        assert_eq!(selection.location.as_deref(), Some("Indoor Wantilan"));
        assert_eq!(selection.guest_count, DEFAULT_GUEST_COUNT);

        Ok(())
    }

    #[test]
    fn total_is_package_plus_catering() -> Result<(), CatalogError> {
        let selection = griya_taksu().configure()?;

        assert_eq!(selection.catering_total(), 6_500_000);
        assert_eq!(selection.total(), 21_500_000);

        Ok(())
    }

    #[test]
    fn identity_and_name_include_configuration() -> Result<(), CatalogError> {
        let venue = griya_taksu();
        let selection = venue
            .configure()?
            .with_package(&venue, "Paket All In")?
            .with_guests(250);

        assert_eq!(selection.unique_id(), "301-Paket All In-250");
        assert_eq!(selection.display_name(), "Griya Taksu (250 pax)");

        Ok(())
    }

    #[test]
    fn unknown_package_is_rejected() -> Result<(), CatalogError> {
        let venue = griya_taksu();
        let result = venue.configure()?.with_package(&venue, "Paket Emas");

        assert!(matches!(
            result,
            Err(CatalogError::UnknownPackage { venue: 301, package }) if package == "Paket Emas"
        ));

        Ok(())
    }

    #[test]
    fn stepper_respects_floor() -> Result<(), CatalogError> {
        let mut selection = griya_taksu().configure()?.with_guests(60);

        selection.remove_guests();
        assert_eq!(selection.guest_count, 50);

        selection.remove_guests();
        assert_eq!(selection.guest_count, 50);

        selection.add_guests();
        assert_eq!(selection.guest_count, 60);

        Ok(())
    }

    #[test]
    fn typed_guest_count_is_not_clamped() -> Result<(), CatalogError> {
        let selection = griya_taksu().configure()?.with_guests(0);

        assert_eq!(selection.guest_count, 0);
        assert_eq!(selection.total(), 15_000_000);

        Ok(())
    }
}
