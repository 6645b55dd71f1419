//! Cart
//!
//! The working set of lines pending checkout. Goods merge by quantity while
//! venues and officiants are unique per identity.

use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::debug;

use crate::pricing::{TotalPriceError, total_price};

pub mod line;

pub use line::{CartLine, LineId, LineKind, Selection};

/// Errors raised by cart operations.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// A venue configuration or officiant with this identity is already in the cart
    #[error("{}", .kind.duplicate_message())]
    AlreadyInCart {
        /// Kind of the rejected selection
        kind: LineKind,
        /// Identity already present
        id: LineId,
    },

    /// Wrapped total price error
    #[error(transparent)]
    TotalPrice(#[from] TotalPriceError),
}

impl LineKind {
    fn duplicate_message(self) -> &'static str {
        match self {
            LineKind::Officiant => "Beliau sudah ada di keranjang Anda.",
            LineKind::Venue => "Konfigurasi venue ini sudah ada di keranjang.",
            LineKind::Good => "Item ini sudah ada di keranjang.",
        }
    }
}

/// Result of a successful [`Cart::add`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new line was appended
    Added,

    /// An existing good line was incremented
    Incremented {
        /// Quantity after the increment
        quantity: u32,
    },
}

/// Result of [`Cart::update_quantity`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuantityChange {
    /// The good line now has this quantity
    Updated(u32),

    /// The line reached zero and was dropped
    Removed,

    /// No good line has that identity
    Unchanged,
}

/// Cart
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a selection to the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::AlreadyInCart`] when a venue configuration or an
    /// officiant with the same identity is already present, or when the
    /// identity is taken by a line of another kind. The cart is left
    /// untouched in that case.
    pub fn add(&mut self, selection: impl Into<Selection>) -> Result<AddOutcome, CartError> {
        let selection = selection.into();
        let id = selection.id();
        let kind = selection.kind();

        let existing = self.lines.iter_mut().find(|line| line.id() == id);

        match existing {
            Some(CartLine::Good { quantity, .. }) if kind == LineKind::Good => {
                *quantity = quantity.saturating_add(1);

                debug!(%id, quantity = *quantity, "incremented cart line");

                Ok(AddOutcome::Incremented {
                    quantity: *quantity,
                })
            }
            Some(_) => {
                debug!(%id, ?kind, "rejected duplicate cart line");

                Err(CartError::AlreadyInCart { kind, id })
            }
            None => {
                debug!(%id, ?kind, "added cart line");

                self.lines.push(CartLine::from(selection));

                Ok(AddOutcome::Added)
            }
        }
    }

    /// Changes the quantity of a good line by `delta`, dropping it at zero.
    ///
    /// Venue and officiant lines are never touched.
    pub fn update_quantity(&mut self, id: &LineId, delta: i64) -> QuantityChange {
        let Some(position) = self
            .lines
            .iter()
            .position(|line| line.kind() == LineKind::Good && line.id() == *id)
        else {
            return QuantityChange::Unchanged;
        };

        let Some(CartLine::Good { quantity, .. }) = self.lines.get_mut(position) else {
            return QuantityChange::Unchanged;
        };

        let updated = i64::from(*quantity).saturating_add(delta).max(0);
        let updated = u32::try_from(updated).unwrap_or(u32::MAX);

        if updated == 0 {
            self.lines.remove(position);

            debug!(%id, "removed cart line at zero quantity");

            return QuantityChange::Removed;
        }

        *quantity = updated;

        debug!(%id, quantity = updated, "updated cart line quantity");

        QuantityChange::Updated(updated)
    }

    /// Removes the line with the given identity, whatever its kind.
    pub fn remove(&mut self, id: &LineId) -> Option<CartLine> {
        let position = self.lines.iter().position(|line| line.id() == *id)?;
        let line = self.lines.remove(position);

        debug!(%id, "removed cart line");

        Some(line)
    }

    /// Sum of every line's contribution.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError::TotalPrice`] on a money arithmetic error.
    pub fn total(&self) -> Result<Money<'static, Currency>, CartError> {
        Ok(total_price(self.lines.iter().map(CartLine::line_total))?)
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Copy of the lines, for embedding in an order.
    pub fn snapshot(&self) -> Vec<CartLine> {
        self.lines.clone()
    }

    /// Look up a line by identity.
    pub fn get(&self, id: &LineId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.id() == *id)
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Drops every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{catalog::Catalog, pricing::whole_rupiah};

    use super::*;

    #[test]
    fn repeated_goods_merge_into_one_line() -> TestResult {
        let catalog = Catalog::bundled()?;
        let mut cart = Cart::new();

        for _ in 0..4 {
            cart.add(catalog.good(1)?.clone())?;
        }

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines().first().map(CartLine::quantity), Some(4));

        Ok(())
    }

    #[test]
    fn second_add_reports_increment() -> TestResult {
        let catalog = Catalog::bundled()?;
        let mut cart = Cart::new();

        assert_eq!(cart.add(catalog.good(7)?.clone())?, AddOutcome::Added);
        assert_eq!(
            cart.add(catalog.good(7)?.clone())?,
            AddOutcome::Incremented { quantity: 2 }
        );

        Ok(())
    }

    #[test]
    fn duplicate_officiant_is_rejected() -> TestResult {
        let catalog = Catalog::bundled()?;
        let mut cart = Cart::new();

        cart.add(catalog.officiant(201)?.clone())?;
        let before = cart.clone();

        let result = cart.add(catalog.officiant(201)?.clone());

        assert_eq!(
            result,
            Err(CartError::AlreadyInCart {
                kind: LineKind::Officiant,
                id: LineId::Catalog(201),
            })
        );
        assert_eq!(cart, before);

        let message = result.err().map(|err| err.to_string());
        assert_eq!(message.as_deref(), Some("Beliau sudah ada di keranjang Anda."));

        Ok(())
    }

    #[test]
    fn same_venue_configuration_is_rejected_but_variants_are_not() -> TestResult {
        let catalog = Catalog::bundled()?;
        let venue = catalog.venue(301)?;
        let mut cart = Cart::new();

        cart.add(venue.configure()?)?;

        assert!(matches!(
            cart.add(venue.configure()?),
            Err(CartError::AlreadyInCart {
                kind: LineKind::Venue,
                ..
            })
        ));

        cart.add(venue.configure()?.with_guests(150))?;
        cart.add(venue.configure()?.with_package(venue, "Paket All In")?)?;

        assert_eq!(cart.len(), 3);

        Ok(())
    }

    #[test]
    fn one_line_per_identity_across_kinds() -> TestResult {
        let catalog = Catalog::bundled()?;
        let mut cart = Cart::new();

        let mut officiant = catalog.officiant(201)?.clone();
        officiant.id = 1;

        cart.add(catalog.good(1)?.clone())?;

        assert_eq!(
            cart.add(officiant),
            Err(CartError::AlreadyInCart {
                kind: LineKind::Officiant,
                id: LineId::Catalog(1),
            })
        );
        assert_eq!(cart.len(), 1);

        let removed = cart.remove(&LineId::Catalog(1));

        assert_eq!(removed.map(|line| line.kind()), Some(LineKind::Good));
        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn quantity_never_goes_negative() -> TestResult {
        let catalog = Catalog::bundled()?;
        let mut cart = Cart::new();
        let id = LineId::Catalog(1);

        cart.add(catalog.good(1)?.clone())?;
        cart.add(catalog.good(1)?.clone())?;

        assert_eq!(cart.update_quantity(&id, 1), QuantityChange::Updated(3));
        assert_eq!(cart.update_quantity(&id, -10), QuantityChange::Removed);
        assert!(cart.is_empty());
        assert_eq!(cart.update_quantity(&id, 1), QuantityChange::Unchanged);

        Ok(())
    }

    #[test]
    fn quantity_updates_skip_venues_and_officiants() -> TestResult {
        let catalog = Catalog::bundled()?;
        let selection = catalog.venue(302)?.configure()?;
        let venue_id = LineId::Composite(selection.unique_id());
        let mut cart = Cart::new();

        cart.add(selection)?;
        cart.add(catalog.officiant(202)?.clone())?;

        assert_eq!(cart.update_quantity(&venue_id, -5), QuantityChange::Unchanged);
        assert_eq!(
            cart.update_quantity(&LineId::Catalog(202), -1),
            QuantityChange::Unchanged
        );
        assert_eq!(cart.len(), 2);

        Ok(())
    }

    #[test]
    fn remove_ignores_kind() -> TestResult {
        let catalog = Catalog::bundled()?;
        let selection = catalog.venue(303)?.configure()?;
        let venue_id = LineId::Composite(selection.unique_id());
        let mut cart = Cart::new();

        cart.add(selection)?;
        cart.add(catalog.officiant(205)?.clone())?;

        assert!(cart.remove(&venue_id).is_some());
        assert!(cart.remove(&LineId::Catalog(205)).is_some());
        assert!(cart.remove(&LineId::Catalog(205)).is_none());
        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn total_sums_goods_venues_and_ignores_officiants() -> TestResult {
        let catalog = Catalog::bundled()?;
        let mut cart = Cart::new();

        cart.add(catalog.good(1)?.clone())?;
        cart.add(catalog.good(1)?.clone())?;
        cart.add(catalog.venue(301)?.configure()?)?;
        cart.add(catalog.officiant(204)?.clone())?;

        assert_eq!(whole_rupiah(&cart.total()?), 21_550_000);

        Ok(())
    }

    #[test]
    fn empty_cart_totals_zero() -> TestResult {
        assert_eq!(whole_rupiah(&Cart::new().total()?), 0);

        Ok(())
    }
}
