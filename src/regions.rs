//! Regions

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A regency (kabupaten) of Bali served by the storefront.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    /// Denpasar
    #[default]
    Denpasar,

    /// Badung
    Badung,

    /// Gianyar
    Gianyar,

    /// Tabanan
    Tabanan,

    /// Bangli
    Bangli,

    /// Klungkung
    Klungkung,

    /// Karangasem
    Karangasem,

    /// Buleleng
    Buleleng,

    /// Jembrana
    Jembrana,
}

/// Returned when a region name is not one of the known regencies.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown region: {0}")]
pub struct UnknownRegion(pub String);

impl Region {
    /// Every selectable region, in the order the registration form lists them.
    pub const ALL: [Region; 9] = [
        Region::Denpasar,
        Region::Badung,
        Region::Gianyar,
        Region::Tabanan,
        Region::Bangli,
        Region::Klungkung,
        Region::Karangasem,
        Region::Buleleng,
        Region::Jembrana,
    ];

    /// Display name of the region.
    pub fn name(self) -> &'static str {
        match self {
            Region::Denpasar => "Denpasar",
            Region::Badung => "Badung",
            Region::Gianyar => "Gianyar",
            Region::Tabanan => "Tabanan",
            Region::Bangli => "Bangli",
            Region::Klungkung => "Klungkung",
            Region::Karangasem => "Karangasem",
            Region::Buleleng => "Buleleng",
            Region::Jembrana => "Jembrana",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Region {
    type Err = UnknownRegion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        Region::ALL
            .into_iter()
            .find(|region| region.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownRegion(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("gianyar".parse(), Ok(Region::Gianyar));
        assert_eq!(" Karangasem ".parse(), Ok(Region::Karangasem));
    }

    #[test]
    fn rejects_unknown_names() {
        assert_eq!(
            "Lombok".parse::<Region>(),
            Err(UnknownRegion("Lombok".to_string()))
        );
    }

    #[test]
    fn serializes_as_display_name() -> Result<(), serde_json::Error> {
        assert_eq!(serde_json::to_string(&Region::Buleleng)?, "\"Buleleng\"");

        Ok(())
    }
}
