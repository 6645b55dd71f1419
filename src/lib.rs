//! Griya
//!
//! Griya is the storefront engine behind Griya Banten Online: ceremonial
//! offerings, venue bookings and officiant engagements in one cart, a checkout
//! that ends in a pending order receipt, and the admin review that settles it.

pub mod admin;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod clock;
pub mod config;
pub mod invoice;
pub mod messaging;
pub mod notify;
pub mod observability;
pub mod orders;
pub mod prelude;
pub mod pricing;
pub mod regions;
pub mod search_history;
pub mod session;
pub mod storage;
pub mod storefront;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
