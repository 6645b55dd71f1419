//! Pricing

use rusty_money::{
    Money, MoneyError,
    iso::{Currency, IDR},
};
use thiserror::Error;

/// Label shown in place of an amount for donation-priced bookings.
pub const DONATION_LABEL: &str = "Dana Punia";

/// Errors that can occur while aggregating prices.
#[derive(Debug, Error, PartialEq)]
pub enum TotalPriceError {
    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// The storefront currency.
pub fn currency() -> &'static Currency {
    IDR
}

/// Creates a money value from a whole Rupiah amount.
pub fn rupiah(amount: i64) -> Money<'static, Currency> {
    Money::from_major(amount, IDR)
}

/// Converts a money value back into whole Rupiah, dropping any minor units.
pub fn whole_rupiah(money: &Money<'_, Currency>) -> i64 {
    money.to_minor_units() / minor_units_per_rupiah(money.currency())
}

fn minor_units_per_rupiah(currency: &Currency) -> i64 {
    10_i64.saturating_pow(currency.exponent)
}

/// Sums a sequence of amounts.
///
/// # Errors
///
/// Returns [`TotalPriceError::Money`] if any amount is not in Rupiah.
pub fn total_price<I>(amounts: I) -> Result<Money<'static, Currency>, TotalPriceError>
where
    I: IntoIterator<Item = Money<'static, Currency>>,
{
    let total = amounts
        .into_iter()
        .try_fold(rupiah(0), |acc, amount| acc.add(amount))?;

    Ok(total)
}

/// Formats a whole Rupiah amount the way `id-ID` currency formatting does (`Rp 25.000`).
pub fn format_idr(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push('.');
        }

        grouped.push(ch);
    }

    let sign = if amount < 0 { "-" } else { "" };

    format!("{sign}Rp {grouped}")
}

/// Formats an amount for display, using the donation label for zero.
pub fn price_label(amount: i64) -> String {
    if amount == 0 {
        DONATION_LABEL.to_string()
    } else {
        format_idr(amount)
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::USD;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn rupiah_round_trips_through_money() {
        let money = rupiah(21_550_000);

        assert_eq!(whole_rupiah(&money), 21_550_000);
        assert_eq!(money.currency(), IDR);
    }

    #[test]
    fn total_price_sums_amounts() -> TestResult {
        let total = total_price([rupiah(50_000), rupiah(15_000_000), rupiah(6_500_000)])?;

        assert_eq!(whole_rupiah(&total), 21_550_000);

        Ok(())
    }

    #[test]
    fn total_price_of_nothing_is_zero() -> TestResult {
        let total = total_price(std::iter::empty())?;

        assert_eq!(whole_rupiah(&total), 0);

        Ok(())
    }

    #[test]
    fn total_price_rejects_foreign_currency() {
        let result = total_price([rupiah(100), Money::from_major(1, USD)]);

        assert!(matches!(result, Err(TotalPriceError::Money(_))));
    }

    #[test]
    fn format_idr_groups_thousands() {
        assert_eq!(format_idr(0), "Rp 0");
        assert_eq!(format_idr(950), "Rp 950");
        assert_eq!(format_idr(25_000), "Rp 25.000");
        assert_eq!(format_idr(21_550_000), "Rp 21.550.000");
        assert_eq!(format_idr(-1_500), "-Rp 1.500");
    }

    #[test]
    fn price_label_uses_donation_for_zero() {
        assert_eq!(price_label(0), "Dana Punia");
        assert_eq!(price_label(150_000), "Rp 150.000");
    }
}
