//! Promotion Results
//!
//! The output of one qualifying promotion: the aggregate discount, how it is allocated
//! across cart lines, and a human-readable message. Lines are identified by their index in
//! the evaluation context's ordered line sequence; the engine never reorders lines.

use rusty_money::{Money, iso::Currency};

use crate::ids::PromotionId;

/// The discount a promotion grants to a single cart line.
#[derive(Debug, Clone, PartialEq)]
pub struct LineAllocation<'a> {
    /// Index of the line in the evaluation context.
    pub line_idx: usize,

    /// The line amount before this promotion.
    pub original: Money<'a, Currency>,

    /// The line amount after this promotion.
    pub discounted: Money<'a, Currency>,

    /// The discount granted to this line.
    pub discount: Money<'a, Currency>,
}

impl<'a> LineAllocation<'a> {
    /// Create an allocation granting `discount` off `original`.
    #[must_use]
    pub fn new(line_idx: usize, original: Money<'a, Currency>, discount: Money<'a, Currency>) -> Self {
        let discounted = Money::from_minor(
            original.to_minor_units() - discount.to_minor_units(),
            original.currency(),
        );

        Self {
            line_idx,
            original,
            discounted,
            discount,
        }
    }
}

/// The outcome of one qualifying promotion.
#[derive(Debug, Clone, PartialEq)]
pub struct PromotionResult<'a> {
    /// Id of the promotion that produced this result.
    pub promotion: PromotionId,

    /// Aggregate discount, capped by the calculator when a maximum is configured.
    pub discount: Money<'a, Currency>,

    /// Ordered per-line allocations; empty for free-shipping promotions.
    pub allocations: Vec<LineAllocation<'a>>,

    /// Whether this promotion waives the shipping cost; consumed by the downstream
    /// shipping-cost calculator.
    pub free_shipping: bool,

    /// Human-readable description of what was granted.
    pub message: String,
}

impl PromotionResult<'_> {
    /// Sum of the original line amounts across allocations, in minor units.
    pub fn original_total(&self) -> i64 {
        self.allocations
            .iter()
            .map(|allocation| allocation.original.to_minor_units())
            .sum()
    }
}
