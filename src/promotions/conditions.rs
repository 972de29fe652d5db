//! Promotion Conditions
//!
//! Qualification conditions as tagged variants, one per condition kind, so the qualifier
//! matches exhaustively instead of probing an open-ended conditions bag.

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;

use crate::{context::EvaluationContext, ids::SegmentId};

/// A single qualification condition; a promotion qualifies only when all of its
/// conditions are met.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition<'a> {
    /// The customer must be placing their first order.
    FirstTimeCustomer,

    /// The customer must belong to at least one of the listed segments.
    SegmentMembership(SmallVec<[SegmentId; 4]>),

    /// The cart subtotal must reach this floor. A floor in a currency other than the
    /// basket's never passes.
    MinPurchase(Money<'a, Currency>),
}

impl Condition<'_> {
    /// Whether the context meets this condition.
    pub fn is_met(&self, context: &EvaluationContext<'_>) -> bool {
        match self {
            Condition::FirstTimeCustomer => context.is_first_time_customer(),
            Condition::SegmentMembership(segments) => segments
                .iter()
                .any(|segment| context.segments().contains(segment)),
            Condition::MinPurchase(floor) => {
                floor.currency() == context.currency()
                    && context.subtotal().to_minor_units() >= floor.to_minor_units()
            }
        }
    }
}
