//! Pricing policy seam — tax and shipping computation.
//!
//! The checkout engine takes a policy at construction time instead of
//! hardcoding rates, so a real tax engine is a constructor argument
//! rather than a code change.

use rust_decimal::Decimal;

pub trait PricingPolicy: Send + Sync {
    /// Tax for an order with the given subtotal.
    fn tax(&self, subtotal: Decimal) -> Decimal;

    /// Shipping cost for an order with the given subtotal.
    fn shipping(&self, subtotal: Decimal) -> Decimal;
}

/// The default policy: no tax, no shipping.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroRates;

impl PricingPolicy for ZeroRates {
    fn tax(&self, _subtotal: Decimal) -> Decimal {
        Decimal::ZERO
    }

    fn shipping(&self, _subtotal: Decimal) -> Decimal {
        Decimal::ZERO
    }
}
