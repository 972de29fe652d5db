//! Quantity Tiers
//!
//! Tiers map a quantity threshold to a percentage discount (e.g. buy 5+ for 10% off,
//! 10+ for 20% off). Eligibility is computed first; the tier quantity is summed over
//! eligible lines only, and the single highest qualifying tier applies.

use decimal_percentage::Percentage;

/// A quantity threshold mapping to a percentage discount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantityTier {
    min_quantity: u32,
    percent: Percentage,
}

impl QuantityTier {
    /// Create a tier that applies from `min_quantity` eligible units upward.
    #[must_use]
    pub const fn new(min_quantity: u32, percent: Percentage) -> Self {
        Self {
            min_quantity,
            percent,
        }
    }

    /// The quantity threshold.
    pub fn min_quantity(&self) -> u32 {
        self.min_quantity
    }

    /// The percentage discount granted by this tier.
    pub fn percent(&self) -> &Percentage {
        &self.percent
    }
}

/// Select the tier with the highest threshold not exceeding `quantity`.
///
/// Returns `None` when no tier qualifies. Tiers sharing the highest qualifying threshold
/// resolve to the last such tier in definition order, which keeps selection deterministic.
pub fn select_tier(tiers: &[QuantityTier], quantity: u64) -> Option<&QuantityTier> {
    tiers
        .iter()
        .filter(|tier| u64::from(tier.min_quantity) <= quantity)
        .max_by_key(|tier| tier.min_quantity)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiers() -> Vec<QuantityTier> {
        vec![
            QuantityTier::new(5, Percentage::from(0.10)),
            QuantityTier::new(10, Percentage::from(0.20)),
        ]
    }

    #[test]
    fn highest_qualifying_tier_wins() {
        let tiers = tiers();

        let selected = select_tier(&tiers, 12);

        assert_eq!(selected.map(QuantityTier::min_quantity), Some(10));
        assert_eq!(selected.map(|tier| *tier.percent()), Some(Percentage::from(0.20)));
    }

    #[test]
    fn lower_tier_applies_below_the_next_threshold() {
        let binding = tiers();
        let selected = select_tier(&binding, 7);

        assert_eq!(selected.map(QuantityTier::min_quantity), Some(5));
    }

    #[test]
    fn threshold_is_inclusive() {
        assert_eq!(select_tier(&tiers(), 10).map(QuantityTier::min_quantity), Some(10));
        assert_eq!(select_tier(&tiers(), 5).map(QuantityTier::min_quantity), Some(5));
    }

    #[test]
    fn no_tier_qualifies_below_the_lowest_threshold() {
        assert!(select_tier(&tiers(), 4).is_none());
        assert!(select_tier(&[], 100).is_none());
    }

    #[test]
    fn definition_order_does_not_matter() {
        let reversed = vec![
            QuantityTier::new(10, Percentage::from(0.20)),
            QuantityTier::new(5, Percentage::from(0.10)),
        ];

        assert_eq!(select_tier(&reversed, 12).map(QuantityTier::min_quantity), Some(10));
    }
}
