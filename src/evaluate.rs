//! Evaluation
//!
//! The discount calculator: for each candidate promotion, qualify, compute, cap, and
//! collect; then let the stacking resolver pick the applied subset and sum the totals.
//! A failure inside one promotion's computation drops that promotion only — one broken
//! promotion definition must never block checkout for the valid ones.

use rusty_money::{Money, iso::Currency};
use tracing::{debug, warn};

use crate::{context::EvaluationContext, discounts, promotions::Promotion, results::PromotionResult, stacking};

/// The outcome of evaluating a candidate promotion list against a context.
#[derive(Debug, Clone)]
pub struct Evaluation<'a> {
    /// The applied promotion results, in stacking order.
    pub applied: Vec<PromotionResult<'a>>,

    /// Sum of the applied discounts.
    pub total_discount: Money<'a, Currency>,

    /// Whether any applied promotion waives the shipping cost.
    pub free_shipping: bool,
}

/// Evaluate the candidate promotions against the context.
///
/// Pure and deterministic: identical inputs produce identical outputs, and the only time
/// dependence is the single sampled instant carried by the context. Promotions that fail
/// to qualify are skipped silently; promotions whose computation errors are dropped with a
/// warning. An empty outcome is not an error.
pub fn evaluate<'a>(
    promotions: &[Promotion<'a>],
    context: &EvaluationContext<'a>,
) -> Evaluation<'a> {
    let mut results = Vec::new();

    for promotion in promotions {
        if !promotion.qualifies(context) {
            debug!(
                promotion = %promotion.id(),
                kind = promotion.kind().kind_str(),
                "promotion does not qualify"
            );
            continue;
        }

        match discounts::compute(promotion, context) {
            Ok(mut result) => {
                if let Some(cap) = promotion.max_discount() {
                    if cap.currency() != context.currency() {
                        warn!(
                            promotion = %promotion.id(),
                            cap_currency = cap.currency().iso_alpha_code,
                            basket_currency = context.currency().iso_alpha_code,
                            "dropping promotion with a cap in a foreign currency"
                        );
                        continue;
                    }

                    // The cap bounds the aggregate only; allocations are not re-normalised.
                    let capped = result.discount.to_minor_units().min(cap.to_minor_units().max(0));
                    result.discount = Money::from_minor(capped, context.currency());
                }

                results.push(result);
            }
            Err(error) => {
                warn!(
                    promotion = %promotion.id(),
                    kind = promotion.kind().kind_str(),
                    %error,
                    "dropping promotion after a computation failure"
                );
            }
        }
    }

    let applied = stacking::resolve(results, promotions);

    let total = applied
        .iter()
        .fold(0i64, |acc, result| {
            acc.saturating_add(result.discount.to_minor_units())
        });

    let free_shipping = applied.iter().any(|result| result.free_shipping);

    Evaluation {
        applied,
        total_discount: Money::from_minor(total, context.currency()),
        free_shipping,
    }
}

#[cfg(test)]
mod tests {
    use decimal_percentage::Percentage;
    use jiff::Timestamp;
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use crate::{
        carts::{CartLine, ProductRef},
        context::ContextError,
        ids::{CategoryId, ProductId},
        promotions::{BxgyRule, Condition, PromotionKind, Schedule},
    };

    use super::*;

    fn line<'a>(product: &str, unit_minor: i64, quantity: u32) -> CartLine<'a> {
        CartLine::new(
            ProductId::from(product),
            Money::from_minor(unit_minor, GBP),
            quantity,
        )
        .with_product_ref(ProductRef::new([CategoryId::from("apparel")], []))
    }

    fn context<'a>() -> Result<EvaluationContext<'a>, ContextError> {
        // Subtotal 100.00.
        EvaluationContext::new(
            vec![line("tee", 2500, 2), line("hoodie", 5000, 1)],
            GBP,
            Timestamp::UNIX_EPOCH,
        )
    }

    fn promotion<'a>(id: &str, kind: PromotionKind<'a>) -> Promotion<'a> {
        Promotion::new(id.into(), id, kind, Schedule::starting(Timestamp::UNIX_EPOCH))
    }

    #[test]
    fn ten_percent_over_a_hundred_discounts_ten() -> TestResult {
        let ctx = context()?;
        let promotions = vec![
            promotion("ten-off", PromotionKind::Percentage(Percentage::from(0.10)))
                .with_condition(Condition::MinPurchase(Money::from_minor(5000, GBP))),
        ];

        let evaluation = evaluate(&promotions, &ctx);

        assert_eq!(evaluation.applied.len(), 1);
        assert_eq!(evaluation.total_discount, Money::from_minor(1000, GBP));

        Ok(())
    }

    #[test]
    fn below_the_minimum_purchase_nothing_applies() -> TestResult {
        let ctx = EvaluationContext::new(vec![line("tee", 2000, 2)], GBP, Timestamp::UNIX_EPOCH)?;
        let promotions = vec![
            promotion("ten-off", PromotionKind::Percentage(Percentage::from(0.10)))
                .with_condition(Condition::MinPurchase(Money::from_minor(5000, GBP))),
        ];

        let evaluation = evaluate(&promotions, &ctx);

        assert!(evaluation.applied.is_empty());
        assert_eq!(evaluation.total_discount, Money::from_minor(0, GBP));
        assert!(!evaluation.free_shipping);

        Ok(())
    }

    #[test]
    fn the_cap_clamps_the_aggregate_only() -> TestResult {
        let ctx = context()?;
        let promotions = vec![
            promotion("half-off", PromotionKind::Percentage(Percentage::from(0.50)))
                .with_max_discount(Money::from_minor(2000, GBP)),
        ];

        let evaluation = evaluate(&promotions, &ctx);

        let result = evaluation.applied.first().expect("missing result");
        assert_eq!(result.discount, Money::from_minor(2000, GBP));

        // Allocations keep the uncapped split.
        let allocated: i64 = result
            .allocations
            .iter()
            .map(|allocation| allocation.discount.to_minor_units())
            .sum();
        assert_eq!(allocated, 5000);
        assert_eq!(evaluation.total_discount, Money::from_minor(2000, GBP));

        Ok(())
    }

    #[test]
    fn a_broken_promotion_does_not_block_the_others() -> TestResult {
        let ctx = context()?;

        let broken_rule = BxgyRule::new(
            ProductId::from("tee"),
            0,
            ProductId::from("hoodie"),
            1,
            Percentage::from(0.50),
        );

        let promotions = vec![
            promotion("broken", PromotionKind::BuyXGetY(vec![broken_rule])),
            promotion("ten-off", PromotionKind::Percentage(Percentage::from(0.10))),
        ];

        let evaluation = evaluate(&promotions, &ctx);

        assert_eq!(evaluation.applied.len(), 1);
        assert_eq!(
            evaluation.applied.first().map(|result| result.promotion.as_str()),
            Some("ten-off")
        );
        assert_eq!(evaluation.total_discount, Money::from_minor(1000, GBP));

        Ok(())
    }

    #[test]
    fn a_foreign_currency_cap_drops_the_promotion() -> TestResult {
        let ctx = context()?;
        let promotions = vec![
            promotion("ten-off", PromotionKind::Percentage(Percentage::from(0.10)))
                .with_max_discount(Money::from_minor(500, USD)),
        ];

        let evaluation = evaluate(&promotions, &ctx);

        assert!(evaluation.applied.is_empty());

        Ok(())
    }

    #[test]
    fn free_shipping_sets_the_evaluation_flag() -> TestResult {
        let ctx = context()?;
        let promotions = vec![
            promotion("ship-free", PromotionKind::FreeShipping),
            promotion("ten-off", PromotionKind::Percentage(Percentage::from(0.10))),
        ];

        let evaluation = evaluate(&promotions, &ctx);

        assert_eq!(evaluation.applied.len(), 2);
        assert!(evaluation.free_shipping);
        assert_eq!(evaluation.total_discount, Money::from_minor(1000, GBP));

        Ok(())
    }

    #[test]
    fn evaluation_is_deterministic() -> TestResult {
        let ctx = context()?;
        let promotions = vec![
            promotion("ten-off", PromotionKind::Percentage(Percentage::from(0.10))),
            promotion("five-flat", PromotionKind::FixedAmount(Money::from_minor(500, GBP))),
        ];

        let first = evaluate(&promotions, &ctx);
        let second = evaluate(&promotions, &ctx);

        assert_eq!(first.applied, second.applied);
        assert_eq!(first.total_discount, second.total_discount);

        Ok(())
    }

    #[test]
    fn a_non_stackable_winner_excludes_everything_else() -> TestResult {
        let ctx = context()?;
        let promotions = vec![
            promotion(
                "fifteen-exclusive",
                PromotionKind::Percentage(Percentage::from(0.15)),
            )
            .with_stackable(false)
            .with_priority(5),
            promotion("five-flat", PromotionKind::FixedAmount(Money::from_minor(500, GBP)))
                .with_priority(1),
        ];

        let evaluation = evaluate(&promotions, &ctx);

        assert_eq!(evaluation.applied.len(), 1);
        assert_eq!(
            evaluation.applied.first().map(|result| result.promotion.as_str()),
            Some("fifteen-exclusive")
        );
        assert_eq!(evaluation.total_discount, Money::from_minor(1500, GBP));

        Ok(())
    }
}
