//! Promotion Fixtures

use jiff::Timestamp;
use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::{
    eligibility::{Exclusion, Target},
    fixtures::{FixtureError, parse_money, parse_percent_points},
    ids::{CategoryId, CollectionId, ProductId, PromotionId, SegmentId},
    promotions::{BxgyRule, Condition, Promotion, PromotionKind, QuantityTier, Schedule},
};

/// Wrapper for promotions in YAML.
#[derive(Debug, Deserialize)]
pub struct PromotionsFixture {
    /// Map of promotion key to promotion fixture.
    pub promotions: FxHashMap<String, PromotionFixture>,
}

/// One promotion in YAML. The `type` field selects the kind; percentages are written in
/// whole points (`value: 10` is 10%), money as `"9.99 GBP"`.
#[derive(Debug, Deserialize)]
pub struct PromotionFixture {
    /// Display name.
    pub name: String,

    /// The discount kind and its parameters.
    #[serde(flatten)]
    pub kind: PromotionKindFixture,

    /// Redemption code, for code-gated promotions.
    #[serde(default)]
    pub code: Option<String>,

    /// Stacking priority; higher wins ties.
    #[serde(default)]
    pub priority: i32,

    /// Whether this promotion may combine with other stackable promotions.
    #[serde(default = "stackable_default")]
    pub stackable: bool,

    /// Start of the validity window.
    pub starts_at: Timestamp,

    /// End of the validity window, if bounded.
    #[serde(default)]
    pub ends_at: Option<Timestamp>,

    /// Minimum-purchase floor, e.g. `"50.00 GBP"`.
    #[serde(default)]
    pub min_purchase: Option<String>,

    /// Aggregate discount cap, e.g. `"20.00 GBP"`.
    #[serde(default)]
    pub max_discount: Option<String>,

    /// Restrict to first-time customers.
    #[serde(default)]
    pub first_time_only: bool,

    /// Required customer segments (OR semantics).
    #[serde(default)]
    pub segments: Vec<String>,

    /// Target rules.
    #[serde(default, with = "serde_norway::with::singleton_map_recursive")]
    pub targets: Vec<TargetFixture>,

    /// Exclusion rules.
    #[serde(default, with = "serde_norway::with::singleton_map_recursive")]
    pub exclusions: Vec<ExclusionFixture>,
}

fn stackable_default() -> bool {
    true
}

/// The kind-specific parameters of a promotion fixture.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PromotionKindFixture {
    /// Percentage off eligible lines, in points.
    Percentage {
        /// Percentage points.
        value: f64,
    },

    /// Fixed amount off, distributed across eligible lines.
    FixedAmount {
        /// Money string, e.g. `"5.00 GBP"`.
        value: String,
    },

    /// Buy-X-get-Y rules.
    BuyXGetY {
        /// The rules.
        rules: Vec<BxgyRuleFixture>,
    },

    /// Quantity tiers.
    TierDiscount {
        /// The tiers.
        tiers: Vec<TierFixture>,
    },

    /// Free shipping.
    FreeShipping,
}

/// One buy-X-get-Y rule in YAML.
#[derive(Debug, Deserialize)]
pub struct BxgyRuleFixture {
    /// Product whose quantity unlocks the discount.
    pub buy_product: String,

    /// Units of the buy product per discount set.
    pub buy_quantity: u32,

    /// Product receiving the discount.
    pub get_product: String,

    /// Units of the get product discounted per set.
    pub get_quantity: u32,

    /// Discount percentage points on the discounted units.
    pub percent: f64,
}

impl TryFrom<BxgyRuleFixture> for BxgyRule {
    type Error = FixtureError;

    fn try_from(fixture: BxgyRuleFixture) -> Result<Self, Self::Error> {
        Ok(BxgyRule::new(
            ProductId::from(fixture.buy_product),
            fixture.buy_quantity,
            ProductId::from(fixture.get_product),
            fixture.get_quantity,
            parse_percent_points(fixture.percent)?,
        ))
    }
}

/// One quantity tier in YAML.
#[derive(Debug, Deserialize)]
pub struct TierFixture {
    /// Quantity threshold.
    pub min_quantity: u32,

    /// Discount percentage points granted by this tier.
    pub percent: f64,
}

impl TryFrom<TierFixture> for QuantityTier {
    type Error = FixtureError;

    fn try_from(fixture: TierFixture) -> Result<Self, Self::Error> {
        Ok(QuantityTier::new(
            fixture.min_quantity,
            parse_percent_points(fixture.percent)?,
        ))
    }
}

/// A target rule in YAML, e.g. `- category: apparel` or `- all`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetFixture {
    /// Every line.
    All,

    /// A single product.
    Product(String),

    /// A category.
    Category(String),

    /// A collection.
    Collection(String),

    /// A customer segment.
    CustomerSegment(String),
}

impl From<TargetFixture> for Target {
    fn from(fixture: TargetFixture) -> Self {
        match fixture {
            TargetFixture::All => Target::All,
            TargetFixture::Product(id) => Target::Product(ProductId::from(id)),
            TargetFixture::Category(id) => Target::Category(CategoryId::from(id)),
            TargetFixture::Collection(id) => Target::Collection(CollectionId::from(id)),
            TargetFixture::CustomerSegment(id) => Target::CustomerSegment(SegmentId::from(id)),
        }
    }
}

/// An exclusion rule in YAML; the vocabulary has no segment variant.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionFixture {
    /// Every line.
    All,

    /// A single product.
    Product(String),

    /// A category.
    Category(String),

    /// A collection.
    Collection(String),
}

impl From<ExclusionFixture> for Exclusion {
    fn from(fixture: ExclusionFixture) -> Self {
        match fixture {
            ExclusionFixture::All => Exclusion::All,
            ExclusionFixture::Product(id) => Exclusion::Product(ProductId::from(id)),
            ExclusionFixture::Category(id) => Exclusion::Category(CategoryId::from(id)),
            ExclusionFixture::Collection(id) => Exclusion::Collection(CollectionId::from(id)),
        }
    }
}

impl PromotionFixture {
    /// Convert into a [`Promotion`], keyed by its fixture key.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if a money or percentage value is invalid.
    pub fn try_into_promotion(self, key: &str) -> Result<Promotion<'static>, FixtureError> {
        let kind = match self.kind {
            PromotionKindFixture::Percentage { value } => {
                PromotionKind::Percentage(parse_percent_points(value)?)
            }
            PromotionKindFixture::FixedAmount { value } => {
                PromotionKind::FixedAmount(parse_money(&value)?)
            }
            PromotionKindFixture::BuyXGetY { rules } => PromotionKind::BuyXGetY(
                rules
                    .into_iter()
                    .map(BxgyRule::try_from)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            PromotionKindFixture::TierDiscount { tiers } => PromotionKind::TierDiscount(
                tiers
                    .into_iter()
                    .map(QuantityTier::try_from)
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            PromotionKindFixture::FreeShipping => PromotionKind::FreeShipping,
        };

        let schedule = match self.ends_at {
            Some(ends_at) => Schedule::between(self.starts_at, ends_at),
            None => Schedule::starting(self.starts_at),
        };

        let mut promotion = Promotion::new(PromotionId::from(key), self.name, kind, schedule)
            .with_priority(self.priority)
            .with_stackable(self.stackable);

        if let Some(code) = self.code {
            promotion = promotion.with_code(code);
        }

        if let Some(floor) = self.min_purchase {
            promotion = promotion.with_condition(Condition::MinPurchase(parse_money(&floor)?));
        }

        if let Some(cap) = self.max_discount {
            promotion = promotion.with_max_discount(parse_money(&cap)?);
        }

        if self.first_time_only {
            promotion = promotion.with_condition(Condition::FirstTimeCustomer);
        }

        if !self.segments.is_empty() {
            promotion = promotion.with_condition(Condition::SegmentMembership(
                self.segments.into_iter().map(SegmentId::from).collect(),
            ));
        }

        for target in self.targets {
            promotion = promotion.with_target(target.into());
        }

        for exclusion in self.exclusions {
            promotion = promotion.with_exclusion(exclusion.into());
        }

        Ok(promotion)
    }
}
