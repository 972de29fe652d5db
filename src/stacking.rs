//! Stacking
//!
//! Decides which promotion results actually apply. A non-stackable promotion is exclusive:
//! either it alone applies, or, when none qualifies, any number of stackable promotions may
//! combine. Ordering is a stable sort, so equal-priority promotions keep their original
//! candidate order and evaluations stay reproducible.

use std::cmp::Reverse;

use crate::{promotions::Promotion, results::PromotionResult};

/// Order the results and select the applied subset.
///
/// Results are sorted non-stackable first, then by descending priority; the sort is stable.
/// If the sorted list leads with a non-stackable result, that result applies exclusively.
/// Otherwise every (stackable) result applies, in sorted order.
pub fn resolve<'a>(
    results: Vec<PromotionResult<'a>>,
    promotions: &[Promotion<'a>],
) -> Vec<PromotionResult<'a>> {
    let mut ordered = results;

    ordered.sort_by_key(|result| {
        let (stackable, priority) = flags(promotions, result);
        (stackable, Reverse(priority))
    });

    let leads_with_exclusive = ordered
        .first()
        .is_some_and(|result| !flags(promotions, result).0);

    if leads_with_exclusive {
        ordered.truncate(1);
    }

    ordered
}

/// Stackability and priority for a result, looked up from its promotion.
///
/// A result whose promotion is missing from the candidate list is treated as a stackable
/// promotion of priority zero.
fn flags(promotions: &[Promotion<'_>], result: &PromotionResult<'_>) -> (bool, i32) {
    promotions
        .iter()
        .find(|promotion| promotion.id() == &result.promotion)
        .map_or((true, 0), |promotion| {
            (promotion.is_stackable(), promotion.priority())
        })
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use rusty_money::{Money, iso::GBP};

    use crate::{
        ids::PromotionId,
        promotions::{PromotionKind, Schedule},
    };

    use super::*;

    fn promotion<'a>(id: &str, stackable: bool, priority: i32) -> Promotion<'a> {
        Promotion::new(
            PromotionId::from(id),
            id,
            PromotionKind::FreeShipping,
            Schedule::starting(Timestamp::UNIX_EPOCH),
        )
        .with_stackable(stackable)
        .with_priority(priority)
    }

    fn result<'a>(id: &str, minor: i64) -> PromotionResult<'a> {
        PromotionResult {
            promotion: PromotionId::from(id),
            discount: Money::from_minor(minor, GBP),
            allocations: Vec::new(),
            free_shipping: false,
            message: String::new(),
        }
    }

    fn applied_ids<'a>(results: &'a [PromotionResult<'a>]) -> Vec<&'a str> {
        results
            .iter()
            .map(|result| result.promotion.as_str())
            .collect()
    }

    #[test]
    fn stackable_results_all_apply_in_priority_order() {
        let promotions = vec![
            promotion("low", true, 1),
            promotion("high", true, 5),
            promotion("mid", true, 3),
        ];
        let results = vec![result("low", 100), result("high", 200), result("mid", 300)];

        let applied = resolve(results, &promotions);

        assert_eq!(applied_ids(&applied), vec!["high", "mid", "low"]);
    }

    #[test]
    fn a_non_stackable_result_applies_exclusively() {
        let promotions = vec![
            promotion("exclusive", false, 5),
            promotion("stack-a", true, 9),
            promotion("stack-b", true, 1),
        ];
        let results = vec![
            result("stack-a", 100),
            result("exclusive", 200),
            result("stack-b", 300),
        ];

        let applied = resolve(results, &promotions);

        assert_eq!(applied_ids(&applied), vec!["exclusive"]);
    }

    #[test]
    fn the_highest_priority_non_stackable_wins() {
        let promotions = vec![
            promotion("minor-exclusive", false, 1),
            promotion("major-exclusive", false, 9),
        ];
        let results = vec![result("minor-exclusive", 100), result("major-exclusive", 50)];

        let applied = resolve(results, &promotions);

        assert_eq!(applied_ids(&applied), vec!["major-exclusive"]);
    }

    #[test]
    fn equal_priority_keeps_candidate_order() {
        let promotions = vec![
            promotion("first", true, 2),
            promotion("second", true, 2),
            promotion("third", true, 2),
        ];
        let results = vec![result("first", 1), result("second", 2), result("third", 3)];

        let applied = resolve(results, &promotions);

        assert_eq!(applied_ids(&applied), vec!["first", "second", "third"]);
    }

    #[test]
    fn equal_priority_non_stackables_resolve_to_the_earlier_candidate() {
        let promotions = vec![
            promotion("first-exclusive", false, 5),
            promotion("second-exclusive", false, 5),
        ];
        let results = vec![result("first-exclusive", 1), result("second-exclusive", 2)];

        let applied = resolve(results, &promotions);

        assert_eq!(applied_ids(&applied), vec!["first-exclusive"]);
    }

    #[test]
    fn empty_results_resolve_to_empty() {
        let applied = resolve(Vec::new(), &[promotion("any", true, 0)]);

        assert!(applied.is_empty());
    }

    #[test]
    fn unknown_promotion_defaults_to_stackable_priority_zero() {
        let promotions = vec![promotion("known", true, 5)];
        let results = vec![result("orphan", 100), result("known", 200)];

        let applied = resolve(results, &promotions);

        assert_eq!(applied_ids(&applied), vec!["known", "orphan"]);
    }
}
