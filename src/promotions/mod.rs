//! Promotions
//!
//! A promotion is a named, time-boxed discount definition: exactly one kind, a validity
//! window, a condition set, target/exclusion rules, an optional aggregate cap, and the
//! priority/stackability used by the stacking resolver. Qualification (everything that
//! gates a promotion before any discount is computed) lives here.

use decimal_percentage::Percentage;
use jiff::Timestamp;
use rusty_money::{Money, iso::Currency};

use crate::{
    context::EvaluationContext,
    eligibility::{Exclusion, Target},
    ids::{PromotionId, SegmentId},
};

pub mod bxgy;
pub mod conditions;
pub mod tiers;

pub use bxgy::BxgyRule;
pub use conditions::Condition;
pub use tiers::QuantityTier;

/// Lifecycle status of a promotion.
///
/// Candidate lists arrive pre-filtered to [`Active`](PromotionStatus::Active); the
/// qualifier still re-checks so a stale candidate can never discount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PromotionStatus {
    /// Not yet published.
    Draft,

    /// Live, subject to its schedule.
    #[default]
    Active,

    /// Retired; never applies.
    Archived,
}

/// Validity window of a promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    starts_at: Timestamp,
    ends_at: Option<Timestamp>,
}

impl Schedule {
    /// An open-ended window starting at the given instant.
    #[must_use]
    pub const fn starting(starts_at: Timestamp) -> Self {
        Self {
            starts_at,
            ends_at: None,
        }
    }

    /// A half-open window `[starts_at, ends_at)`.
    #[must_use]
    pub const fn between(starts_at: Timestamp, ends_at: Timestamp) -> Self {
        Self {
            starts_at,
            ends_at: Some(ends_at),
        }
    }

    /// The start of the window.
    pub fn starts_at(&self) -> Timestamp {
        self.starts_at
    }

    /// The end of the window, if bounded.
    pub fn ends_at(&self) -> Option<Timestamp> {
        self.ends_at
    }

    /// Whether the window contains the given instant.
    pub fn is_live(&self, now: Timestamp) -> bool {
        self.starts_at <= now && self.ends_at.is_none_or(|ends_at| now < ends_at)
    }
}

/// The discount kind of a promotion; exactly one per promotion.
#[derive(Debug, Clone, PartialEq)]
pub enum PromotionKind<'a> {
    /// Percentage off every eligible line.
    Percentage(Percentage),

    /// A fixed amount distributed proportionally across eligible lines.
    FixedAmount(Money<'a, Currency>),

    /// Buy-X-get-Y rules granting a discount on one product contingent on another.
    BuyXGetY(Vec<BxgyRule>),

    /// Quantity tiers mapping to percentage discounts.
    TierDiscount(Vec<QuantityTier>),

    /// No item-level discount; flags free shipping for the downstream shipping calculator.
    FreeShipping,
}

impl PromotionKind<'_> {
    /// A stable name for this kind, used in logging.
    #[must_use]
    pub const fn kind_str(&self) -> &'static str {
        match self {
            Self::Percentage(_) => "percentage",
            Self::FixedAmount(_) => "fixed_amount",
            Self::BuyXGetY(_) => "buy_x_get_y",
            Self::TierDiscount(_) => "tier_discount",
            Self::FreeShipping => "free_shipping",
        }
    }
}

/// A named, time-boxed discount definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Promotion<'a> {
    id: PromotionId,
    name: String,
    code: Option<String>,
    status: PromotionStatus,
    kind: PromotionKind<'a>,
    schedule: Schedule,
    conditions: Vec<Condition<'a>>,
    targets: Vec<Target>,
    exclusions: Vec<Exclusion>,
    max_discount: Option<Money<'a, Currency>>,
    priority: i32,
    stackable: bool,
}

impl<'a> Promotion<'a> {
    /// Create an active, stackable, untargeted promotion with no conditions.
    #[must_use]
    pub fn new(
        id: PromotionId,
        name: impl Into<String>,
        kind: PromotionKind<'a>,
        schedule: Schedule,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            code: None,
            status: PromotionStatus::Active,
            kind,
            schedule,
            conditions: Vec::new(),
            targets: Vec::new(),
            exclusions: Vec::new(),
            max_discount: None,
            priority: 0,
            stackable: true,
        }
    }

    /// Require the shopper to enter this redemption code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Set the lifecycle status.
    #[must_use]
    pub fn with_status(mut self, status: PromotionStatus) -> Self {
        self.status = status;
        self
    }

    /// Add a qualification condition.
    #[must_use]
    pub fn with_condition(mut self, condition: Condition<'a>) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Add a target rule.
    #[must_use]
    pub fn with_target(mut self, target: Target) -> Self {
        self.targets.push(target);
        self
    }

    /// Add an exclusion rule.
    #[must_use]
    pub fn with_exclusion(mut self, exclusion: Exclusion) -> Self {
        self.exclusions.push(exclusion);
        self
    }

    /// Cap the aggregate discount this promotion may grant.
    #[must_use]
    pub fn with_max_discount(mut self, max_discount: Money<'a, Currency>) -> Self {
        self.max_discount = Some(max_discount);
        self
    }

    /// Set the priority; higher wins ties in the stacking resolver.
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set whether this promotion may combine with other stackable promotions.
    #[must_use]
    pub fn with_stackable(mut self, stackable: bool) -> Self {
        self.stackable = stackable;
        self
    }

    /// The promotion id.
    pub fn id(&self) -> &PromotionId {
        &self.id
    }

    /// The display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The redemption code, for code-gated promotions.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// The lifecycle status.
    pub fn status(&self) -> PromotionStatus {
        self.status
    }

    /// The discount kind.
    pub fn kind(&self) -> &PromotionKind<'a> {
        &self.kind
    }

    /// The validity window.
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// The qualification conditions.
    pub fn conditions(&self) -> &[Condition<'a>] {
        &self.conditions
    }

    /// The target rules.
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// The exclusion rules.
    pub fn exclusions(&self) -> &[Exclusion] {
        &self.exclusions
    }

    /// The aggregate discount cap, if configured.
    pub fn max_discount(&self) -> Option<&Money<'a, Currency>> {
        self.max_discount.as_ref()
    }

    /// The stacking priority.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Whether this promotion may combine with other stackable promotions.
    pub fn is_stackable(&self) -> bool {
        self.stackable
    }

    /// Whether this promotion is applicable at all for the given context.
    ///
    /// All checks must pass: active status, live schedule, code opt-in (a code-gated
    /// promotion qualifies only when its code was entered; code-less promotions are
    /// automatic), segment-typed targets (OR semantics), and every condition. Failing a
    /// check excludes the promotion silently; it is not an error.
    pub fn qualifies(&self, context: &EvaluationContext<'_>) -> bool {
        if self.status != PromotionStatus::Active {
            return false;
        }

        if !self.schedule.is_live(context.now()) {
            return false;
        }

        if !self.code_entered(context) {
            return false;
        }

        if !self.segment_targets_match(context) {
            return false;
        }

        self.conditions
            .iter()
            .all(|condition| condition.is_met(context))
    }

    fn code_entered(&self, context: &EvaluationContext<'_>) -> bool {
        match &self.code {
            Some(code) => context.codes().iter().any(|entered| entered == code),
            None => true,
        }
    }

    /// Segment-typed targets gate the whole promotion: when present, the customer must be
    /// in at least one of them.
    fn segment_targets_match(&self, context: &EvaluationContext<'_>) -> bool {
        let mut required = self
            .targets
            .iter()
            .filter_map(|target| match target {
                Target::CustomerSegment(segment) => Some(segment),
                _ => None,
            })
            .peekable();

        required.peek().is_none() || required.any(|segment| context.segments().contains(segment))
    }

    /// The segment ids a qualifying customer must intersect, from conditions and targets.
    pub fn required_segments(&self) -> Vec<&SegmentId> {
        let mut segments: Vec<&SegmentId> = self
            .targets
            .iter()
            .filter_map(|target| match target {
                Target::CustomerSegment(segment) => Some(segment),
                _ => None,
            })
            .collect();

        for condition in &self.conditions {
            if let Condition::SegmentMembership(ids) = condition {
                segments.extend(ids.iter());
            }
        }

        segments
    }
}
