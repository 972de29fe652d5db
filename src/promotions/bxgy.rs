//! Buy-X-Get-Y Rules
//!
//! A rule grants a percentage discount on a "get" product contingent on the quantity of a
//! "buy" product in the cart. The two may be the same product. Rules on one promotion
//! accumulate independently.

use decimal_percentage::Percentage;

use crate::ids::ProductId;

/// One buy-X-get-Y rule.
#[derive(Debug, Clone, PartialEq)]
pub struct BxgyRule {
    buy_product: ProductId,
    buy_quantity: u32,
    get_product: ProductId,
    get_quantity: u32,
    percent: Percentage,
}

impl BxgyRule {
    /// Create a rule: for every `buy_quantity` of `buy_product`, discount `get_quantity`
    /// of `get_product` by `percent`.
    #[must_use]
    pub const fn new(
        buy_product: ProductId,
        buy_quantity: u32,
        get_product: ProductId,
        get_quantity: u32,
        percent: Percentage,
    ) -> Self {
        Self {
            buy_product,
            buy_quantity,
            get_product,
            get_quantity,
            percent,
        }
    }

    /// The product whose quantity unlocks the discount.
    pub fn buy_product(&self) -> &ProductId {
        &self.buy_product
    }

    /// Units of the buy product per discount set.
    pub fn buy_quantity(&self) -> u32 {
        self.buy_quantity
    }

    /// The product receiving the discount.
    pub fn get_product(&self) -> &ProductId {
        &self.get_product
    }

    /// Units of the get product discounted per set.
    pub fn get_quantity(&self) -> u32 {
        self.get_quantity
    }

    /// The percentage discount applied to the discounted units.
    pub fn percent(&self) -> &Percentage {
        &self.percent
    }
}
