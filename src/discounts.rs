//! Discounts
//!
//! One computation per promotion kind. Every strategy resolves the eligible-line subset
//! first, then produces a [`PromotionResult`] with per-line allocations; the calculator in
//! [`crate::evaluate`] applies the aggregate cap and the partial-failure policy on top.

use decimal_percentage::Percentage;
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    carts::CartLine,
    context::EvaluationContext,
    eligibility::eligible_lines,
    ids::{ProductId, PromotionId},
    pricing::{PricingError, percent_of_minor, percent_points, proportional_split},
    promotions::{BxgyRule, Promotion, PromotionKind, QuantityTier, tiers::select_tier},
    results::{LineAllocation, PromotionResult},
};

/// Errors raised while computing a single promotion's discount.
///
/// These never abort an evaluation; the calculator drops the offending promotion and
/// carries on.
#[derive(Debug, Error)]
pub enum DiscountError {
    /// Wrapped minor-unit arithmetic error.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// A promotion's monetary parameter is in a different currency than the basket.
    #[error("promotion {promotion} is priced in {expected}, but the basket uses {actual}")]
    CurrencyMismatch {
        /// The offending promotion.
        promotion: PromotionId,
        /// Currency of the promotion's parameter.
        expected: &'static str,
        /// Currency of the basket.
        actual: &'static str,
    },

    /// A buy-X-get-Y rule has a zero buy quantity.
    #[error("buy-x-get-y rule on promotion {0} has a zero buy quantity")]
    ZeroBuyQuantity(PromotionId),
}

/// Compute the discount a single qualifying promotion grants for this context.
///
/// # Errors
///
/// Returns a [`DiscountError`] on malformed rule data, currency mismatches or arithmetic
/// overflow; the caller treats any error as "drop this promotion".
pub fn compute<'a>(
    promotion: &Promotion<'a>,
    context: &EvaluationContext<'a>,
) -> Result<PromotionResult<'a>, DiscountError> {
    match promotion.kind() {
        PromotionKind::Percentage(percent) => percentage(promotion, context, percent),
        PromotionKind::FixedAmount(value) => fixed_amount(promotion, context, *value),
        PromotionKind::BuyXGetY(rules) => buy_x_get_y(promotion, context, rules),
        PromotionKind::TierDiscount(tiers) => tier_discount(promotion, context, tiers),
        PromotionKind::FreeShipping => Ok(free_shipping(promotion, context)),
    }
}

/// Percentage off every eligible line.
fn percentage<'a>(
    promotion: &Promotion<'a>,
    context: &EvaluationContext<'a>,
    percent: &Percentage,
) -> Result<PromotionResult<'a>, DiscountError> {
    let (total, allocations) = percent_allocations(promotion, context, percent)?;

    Ok(PromotionResult {
        promotion: promotion.id().clone(),
        discount: Money::from_minor(total, context.currency()),
        allocations,
        free_shipping: false,
        message: format!(
            "{}: {}% off eligible items",
            promotion.name(),
            percent_points(percent)
        ),
    })
}

/// A fixed amount distributed proportionally across eligible lines by line amount, so the
/// allocations sum to the (clamped) value instead of over-discounting.
fn fixed_amount<'a>(
    promotion: &Promotion<'a>,
    context: &EvaluationContext<'a>,
    value: Money<'a, Currency>,
) -> Result<PromotionResult<'a>, DiscountError> {
    ensure_basket_currency(promotion, &value, context)?;

    let eligible = eligible_lines(promotion, context);

    let mut amounts = Vec::with_capacity(eligible.len());
    for (idx, line) in &eligible {
        amounts.push((*idx, line.amount()?));
    }

    let weights: Vec<i64> = amounts
        .iter()
        .map(|(_, amount)| amount.to_minor_units())
        .collect();

    let shares = proportional_split(value.to_minor_units(), &weights)?;

    let mut total = 0i64;
    let mut allocations = Vec::with_capacity(amounts.len());
    for ((idx, original), share) in amounts.into_iter().zip(shares) {
        // Cumulative rounding can overshoot a line by one minor unit; never discount a
        // line past its own amount.
        let share = share.min(original.to_minor_units());
        if share == 0 {
            continue;
        }

        total += share;
        allocations.push(LineAllocation::new(
            idx,
            original,
            Money::from_minor(share, context.currency()),
        ));
    }

    Ok(PromotionResult {
        promotion: promotion.id().clone(),
        discount: Money::from_minor(total, context.currency()),
        allocations,
        free_shipping: false,
        message: format!("{}: {} off eligible items", promotion.name(), value),
    })
}

/// Buy-X-get-Y: each rule contributes independently; a missing buy or get line contributes
/// zero for that rule. Discounts landing on the same line merge into one allocation.
fn buy_x_get_y<'a>(
    promotion: &Promotion<'a>,
    context: &EvaluationContext<'a>,
    rules: &[BxgyRule],
) -> Result<PromotionResult<'a>, DiscountError> {
    let mut per_line: FxHashMap<usize, i64> = FxHashMap::default();

    for rule in rules {
        if rule.buy_quantity() == 0 {
            return Err(DiscountError::ZeroBuyQuantity(promotion.id().clone()));
        }

        let Some(buy_line) = find_line(context, rule.buy_product()) else {
            continue;
        };
        let Some((get_idx, get_line)) = find_line_indexed(context, rule.get_product()) else {
            continue;
        };

        let sets = u64::from(buy_line.quantity() / rule.buy_quantity());
        let discounted_quantity =
            (sets * u64::from(rule.get_quantity())).min(u64::from(get_line.quantity()));

        if discounted_quantity == 0 {
            continue;
        }

        let Ok(discounted_quantity) = i64::try_from(discounted_quantity) else {
            return Err(PricingError::AmountOverflow.into());
        };

        let base = get_line
            .unit_price()
            .to_minor_units()
            .checked_mul(discounted_quantity)
            .ok_or(PricingError::AmountOverflow)?;

        let discount = percent_of_minor(rule.percent(), base)?;

        *per_line.entry(get_idx).or_default() += discount;
    }

    let mut indices: Vec<usize> = per_line.keys().copied().collect();
    indices.sort_unstable();

    let mut total = 0i64;
    let mut allocations = Vec::with_capacity(indices.len());
    for idx in indices {
        let Some(line) = context.lines().get(idx) else {
            continue;
        };
        let Some(discount) = per_line.get(&idx) else {
            continue;
        };

        let original = line.amount()?;
        let discount = (*discount).clamp(0, original.to_minor_units());
        if discount == 0 {
            continue;
        }

        total += discount;
        allocations.push(LineAllocation::new(
            idx,
            original,
            Money::from_minor(discount, context.currency()),
        ));
    }

    Ok(PromotionResult {
        promotion: promotion.id().clone(),
        discount: Money::from_minor(total, context.currency()),
        allocations,
        free_shipping: false,
        message: format!("{}: multibuy savings", promotion.name()),
    })
}

/// Tiered quantity discount: the single highest tier whose threshold the eligible
/// quantity reaches applies its percentage to every eligible line.
fn tier_discount<'a>(
    promotion: &Promotion<'a>,
    context: &EvaluationContext<'a>,
    tiers: &[QuantityTier],
) -> Result<PromotionResult<'a>, DiscountError> {
    let quantity: u64 = eligible_lines(promotion, context)
        .iter()
        .map(|(_, line)| u64::from(line.quantity()))
        .sum();

    let Some(tier) = select_tier(tiers, quantity) else {
        return Ok(PromotionResult {
            promotion: promotion.id().clone(),
            discount: Money::from_minor(0, context.currency()),
            allocations: Vec::new(),
            free_shipping: false,
            message: format!("{}: no quantity tier reached", promotion.name()),
        });
    };

    let (total, allocations) = percent_allocations(promotion, context, tier.percent())?;

    Ok(PromotionResult {
        promotion: promotion.id().clone(),
        discount: Money::from_minor(total, context.currency()),
        allocations,
        free_shipping: false,
        message: format!(
            "{}: {}% off for buying {}+",
            promotion.name(),
            percent_points(tier.percent()),
            tier.min_quantity()
        ),
    })
}

/// Free shipping: no item-level discount; the flag is consumed by the downstream
/// shipping-cost calculator. A full result is still produced so the stacking resolver can
/// weigh this promotion's priority and stackability.
fn free_shipping<'a>(
    promotion: &Promotion<'a>,
    context: &EvaluationContext<'a>,
) -> PromotionResult<'a> {
    PromotionResult {
        promotion: promotion.id().clone(),
        discount: Money::from_minor(0, context.currency()),
        allocations: Vec::new(),
        free_shipping: true,
        message: format!("{}: free shipping", promotion.name()),
    }
}

/// Apply a percentage to every eligible line, one allocation per line.
fn percent_allocations<'a>(
    promotion: &Promotion<'a>,
    context: &EvaluationContext<'a>,
    percent: &Percentage,
) -> Result<(i64, Vec<LineAllocation<'a>>), DiscountError> {
    let mut total = 0i64;
    let mut allocations = Vec::new();

    for (idx, line) in eligible_lines(promotion, context) {
        let original = line.amount()?;
        let discount = percent_of_minor(percent, original.to_minor_units())?
            .clamp(0, original.to_minor_units());

        if discount == 0 {
            continue;
        }

        total += discount;
        allocations.push(LineAllocation::new(
            idx,
            original,
            Money::from_minor(discount, context.currency()),
        ));
    }

    Ok((total, allocations))
}

fn ensure_basket_currency(
    promotion: &Promotion<'_>,
    value: &Money<'_, Currency>,
    context: &EvaluationContext<'_>,
) -> Result<(), DiscountError> {
    if value.currency() == context.currency() {
        Ok(())
    } else {
        Err(DiscountError::CurrencyMismatch {
            promotion: promotion.id().clone(),
            expected: value.currency().iso_alpha_code,
            actual: context.currency().iso_alpha_code,
        })
    }
}

fn find_line<'ctx, 'a>(
    context: &'ctx EvaluationContext<'a>,
    product: &ProductId,
) -> Option<&'ctx CartLine<'a>> {
    context.lines().iter().find(|line| line.product() == product)
}

fn find_line_indexed<'ctx, 'a>(
    context: &'ctx EvaluationContext<'a>,
    product: &ProductId,
) -> Option<(usize, &'ctx CartLine<'a>)> {
    context
        .lines()
        .iter()
        .enumerate()
        .find(|(_, line)| line.product() == product)
}
