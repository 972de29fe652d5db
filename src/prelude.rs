//! Rialto prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    carts::{CartLine, ProductRef},
    context::{ContextError, EvaluationContext},
    discounts::{DiscountError, compute},
    eligibility::{Exclusion, Target, eligible_lines, is_line_eligible},
    evaluate::{Evaluation, evaluate},
    fixtures::{Fixture, FixtureError},
    ids::{CategoryId, CollectionId, CustomerId, ProductId, PromotionId, SegmentId},
    pricing::PricingError,
    promotions::{
        BxgyRule, Condition, Promotion, PromotionKind, PromotionStatus, QuantityTier, Schedule,
    },
    results::{LineAllocation, PromotionResult},
    stacking::resolve,
};
