//! Cart Lines

use std::{convert::Infallible, fmt, str::FromStr};

use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};

use crate::{
    catalog::{CatalogGood, OfficiantProfile, VenueSelection},
    pricing::rupiah,
};

/// Identity of a cart line: the composite id of a venue selection, otherwise
/// the catalog id.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LineId {
    /// Catalog id of a good or officiant
    Catalog(u32),

    /// Composite id of a venue selection
    Composite(String),
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineId::Catalog(id) => write!(f, "{id}"),
            LineId::Composite(id) => f.write_str(id),
        }
    }
}

impl FromStr for LineId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse::<u32>()
            .map_or_else(|_err| LineId::Composite(s.to_string()), LineId::Catalog))
    }
}

impl From<u32> for LineId {
    fn from(id: u32) -> Self {
        LineId::Catalog(id)
    }
}

/// Kind of a cart line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LineKind {
    /// Quantity-priced offering
    Good,

    /// Configured venue booking
    Venue,

    /// Officiant engagement
    Officiant,
}

/// Something the purchaser asked to put in the cart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    /// A good from the catalog
    Good(CatalogGood),

    /// A configured venue
    Venue(VenueSelection),

    /// An officiant from the catalog
    Officiant(OfficiantProfile),
}

impl Selection {
    /// Identity the selection will have once in the cart.
    pub fn id(&self) -> LineId {
        match self {
            Selection::Good(good) => LineId::Catalog(good.id),
            Selection::Venue(selection) => LineId::Composite(selection.unique_id()),
            Selection::Officiant(officiant) => LineId::Catalog(officiant.id),
        }
    }

    /// Kind of line the selection becomes.
    pub fn kind(&self) -> LineKind {
        match self {
            Selection::Good(_) => LineKind::Good,
            Selection::Venue(_) => LineKind::Venue,
            Selection::Officiant(_) => LineKind::Officiant,
        }
    }

    /// Display name of the selection.
    pub fn name(&self) -> String {
        match self {
            Selection::Good(good) => good.name.clone(),
            Selection::Venue(selection) => selection.display_name(),
            Selection::Officiant(officiant) => officiant.name.clone(),
        }
    }
}

impl From<CatalogGood> for Selection {
    fn from(good: CatalogGood) -> Self {
        Selection::Good(good)
    }
}

impl From<VenueSelection> for Selection {
    fn from(selection: VenueSelection) -> Self {
        Selection::Venue(selection)
    }
}

impl From<OfficiantProfile> for Selection {
    fn from(officiant: OfficiantProfile) -> Self {
        Selection::Officiant(officiant)
    }
}

/// A line in the cart, also embedded verbatim in submitted orders.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum CartLine {
    /// A good bought by quantity
    Good {
        /// Catalog entry
        good: CatalogGood,

        /// Quantity, always at least one while in the cart
        quantity: u32,
    },

    /// A configured venue, always quantity one
    Venue {
        /// Configured venue
        selection: VenueSelection,
    },

    /// An engaged officiant, always quantity one and donation priced
    Officiant {
        /// Catalog entry
        officiant: OfficiantProfile,
    },
}

impl CartLine {
    /// Identity used for lookup and removal.
    pub fn id(&self) -> LineId {
        match self {
            CartLine::Good { good, .. } => LineId::Catalog(good.id),
            CartLine::Venue { selection } => LineId::Composite(selection.unique_id()),
            CartLine::Officiant { officiant } => LineId::Catalog(officiant.id),
        }
    }

    /// Kind of the line.
    pub fn kind(&self) -> LineKind {
        match self {
            CartLine::Good { .. } => LineKind::Good,
            CartLine::Venue { .. } => LineKind::Venue,
            CartLine::Officiant { .. } => LineKind::Officiant,
        }
    }

    /// Display name of the line.
    pub fn name(&self) -> String {
        match self {
            CartLine::Good { good, .. } => good.name.clone(),
            CartLine::Venue { selection } => selection.display_name(),
            CartLine::Officiant { officiant } => officiant.name.clone(),
        }
    }

    /// Effective unit price in whole Rupiah.
    pub fn unit_price(&self) -> i64 {
        match self {
            CartLine::Good { good, .. } => good.price,
            CartLine::Venue { selection } => selection.total(),
            CartLine::Officiant { .. } => 0,
        }
    }

    /// Quantity; fixed at one for venues and officiants.
    pub fn quantity(&self) -> u32 {
        match self {
            CartLine::Good { quantity, .. } => *quantity,
            CartLine::Venue { .. } | CartLine::Officiant { .. } => 1,
        }
    }

    /// Contribution of the line to the cart total.
    pub fn line_total(&self) -> Money<'static, Currency> {
        rupiah(
            self.unit_price()
                .saturating_mul(i64::from(self.quantity())),
        )
    }
}

impl From<Selection> for CartLine {
    fn from(selection: Selection) -> Self {
        match selection {
            Selection::Good(good) => CartLine::Good { good, quantity: 1 },
            Selection::Venue(selection) => CartLine::Venue { selection },
            Selection::Officiant(officiant) => CartLine::Officiant { officiant },
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{catalog::Catalog, pricing::whole_rupiah};

    use super::*;

    #[test]
    fn line_id_parses_catalog_and_composite_ids() {
        assert_eq!("42".parse(), Ok(LineId::Catalog(42)));
        assert_eq!(
            "301-Paket All In-100".parse(),
            Ok(LineId::Composite("301-Paket All In-100".to_string()))
        );
    }

    #[test]
    fn officiant_lines_contribute_nothing() -> TestResult {
        let catalog = Catalog::bundled()?;
        let line = CartLine::from(Selection::from(catalog.officiant(201)?.clone()));

        assert_eq!(line.kind(), LineKind::Officiant);
        assert_eq!(line.quantity(), 1);
        assert_eq!(whole_rupiah(&line.line_total()), 0);

        Ok(())
    }

    #[test]
    fn venue_lines_use_the_selection_total() -> TestResult {
        let catalog = Catalog::bundled()?;
        let selection = catalog.venue(301)?.configure()?;
        let line = CartLine::from(Selection::from(selection));

        assert_eq!(line.id(), LineId::Composite("301-Sewa Venue Saja-100".to_string()));
        assert_eq!(line.name(), "Griya Taksu (100 pax)");
        assert_eq!(whole_rupiah(&line.line_total()), 21_500_000);

        Ok(())
    }

    #[test]
    fn good_lines_multiply_by_quantity() -> TestResult {
        let catalog = Catalog::bundled()?;
        let line = CartLine::Good {
            good: catalog.good(2)?.clone(),
            quantity: 3,
        };

        assert_eq!(whole_rupiah(&line.line_total()), 450_000);

        Ok(())
    }

    #[test]
    fn lines_serialize_with_a_kind_tag() -> TestResult {
        let catalog = Catalog::bundled()?;
        let line = CartLine::from(Selection::from(catalog.officiant(203)?.clone()));

        let json = serde_json::to_value(&line)?;

        assert_eq!(json["kind"], "Officiant");
        assert_eq!(json["officiant"]["house"], "Griya Agung Ubud");

        let back: CartLine = serde_json::from_value(json)?;
        assert_eq!(back, line);

        Ok(())
    }
}
