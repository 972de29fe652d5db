//! Eligibility
//!
//! Per-line target and exclusion matching. Targets and exclusions are closed enums so the
//! matching is exhaustive at compile time; exclusions are a separate enum because the
//! vocabulary deliberately has no segment variant (a customer segment is not a line-level
//! property).

use crate::{carts::CartLine, context::EvaluationContext, ids, promotions::Promotion};

/// A promotion target: which lines (or customers) a promotion is allowed to discount.
///
/// An empty target list on a promotion means every line is targeted. A
/// [`CustomerSegment`](Target::CustomerSegment) target never matches a line; it gates the
/// whole promotion during qualification instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Every line.
    All,

    /// A single product, by exact id.
    Product(ids::ProductId),

    /// Every product in a category.
    Category(ids::CategoryId),

    /// Every product in a collection.
    Collection(ids::CollectionId),

    /// Carts of customers in a segment; not matched against lines.
    CustomerSegment(ids::SegmentId),
}

impl Target {
    /// Whether this target is matched against individual lines.
    pub const fn is_line_level(&self) -> bool {
        !matches!(self, Target::CustomerSegment(_))
    }

    /// Whether this target matches the given line.
    ///
    /// A line with no resolved product reference matches nothing.
    pub fn matches_line(&self, line: &CartLine<'_>) -> bool {
        let Some(product_ref) = line.product_ref() else {
            return false;
        };

        match self {
            Target::All => true,
            Target::Product(id) => line.product() == id,
            Target::Category(id) => product_ref.in_category(id),
            Target::Collection(id) => product_ref.in_collection(id),
            Target::CustomerSegment(_) => false,
        }
    }
}

/// A promotion exclusion: lines a promotion must never discount, even when targeted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exclusion {
    /// Every line.
    All,

    /// A single product, by exact id.
    Product(ids::ProductId),

    /// Every product in a category.
    Category(ids::CategoryId),

    /// Every product in a collection.
    Collection(ids::CollectionId),
}

impl Exclusion {
    /// Whether this exclusion matches the given line.
    pub fn matches_line(&self, line: &CartLine<'_>) -> bool {
        let Some(product_ref) = line.product_ref() else {
            return false;
        };

        match self {
            Exclusion::All => true,
            Exclusion::Product(id) => line.product() == id,
            Exclusion::Category(id) => product_ref.in_category(id),
            Exclusion::Collection(id) => product_ref.in_collection(id),
        }
    }
}

/// Whether the promotion is allowed to discount this line.
///
/// A line is eligible when it is targeted (the promotion has no line-level targets, or any
/// line-level target matches) and no exclusion matches. A line whose catalog lookup failed
/// is never eligible.
pub fn is_line_eligible(line: &CartLine<'_>, promotion: &Promotion<'_>) -> bool {
    if line.product_ref().is_none() {
        return false;
    }

    let mut line_targets = promotion
        .targets()
        .iter()
        .filter(|target| target.is_line_level())
        .peekable();

    let targeted =
        line_targets.peek().is_none() || line_targets.any(|target| target.matches_line(line));

    let excluded = promotion
        .exclusions()
        .iter()
        .any(|exclusion| exclusion.matches_line(line));

    targeted && !excluded
}

/// The ordered subset of context lines this promotion may discount, with their indices.
pub fn eligible_lines<'ctx, 'a>(
    promotion: &Promotion<'_>,
    context: &'ctx EvaluationContext<'a>,
) -> Vec<(usize, &'ctx CartLine<'a>)> {
    context
        .lines()
        .iter()
        .enumerate()
        .filter(|(_, line)| is_line_eligible(line, promotion))
        .collect()
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use rusty_money::{Money, iso::GBP};
    use testresult::TestResult;

    use crate::{
        carts::ProductRef,
        ids::{CategoryId, CollectionId, ProductId, SegmentId},
        promotions::{Promotion, PromotionKind, Schedule},
    };

    use super::*;

    fn apparel_line<'a>() -> CartLine<'a> {
        CartLine::new(ProductId::from("tee"), Money::from_minor(2000, GBP), 1).with_product_ref(
            ProductRef::new(
                [CategoryId::from("apparel")],
                [CollectionId::from("summer")],
            ),
        )
    }

    fn promotion<'a>() -> Promotion<'a> {
        Promotion::new(
            "promo".into(),
            "Promo",
            PromotionKind::FreeShipping,
            Schedule::starting(Timestamp::UNIX_EPOCH),
        )
    }

    #[test]
    fn empty_target_list_targets_every_line() {
        assert!(is_line_eligible(&apparel_line(), &promotion()));
    }

    #[test]
    fn product_target_matches_by_exact_id() {
        let promo = promotion().with_target(Target::Product(ProductId::from("tee")));
        let other = promotion().with_target(Target::Product(ProductId::from("mug")));

        assert!(is_line_eligible(&apparel_line(), &promo));
        assert!(!is_line_eligible(&apparel_line(), &other));
    }

    #[test]
    fn category_and_collection_targets_match_the_resolved_sets() {
        let by_category = promotion().with_target(Target::Category(CategoryId::from("apparel")));
        let by_collection =
            promotion().with_target(Target::Collection(CollectionId::from("summer")));
        let wrong = promotion().with_target(Target::Category(CategoryId::from("gift")));

        assert!(is_line_eligible(&apparel_line(), &by_category));
        assert!(is_line_eligible(&apparel_line(), &by_collection));
        assert!(!is_line_eligible(&apparel_line(), &wrong));
    }

    #[test]
    fn exclusion_wins_over_an_explicit_target() {
        // Targeted by product id, excluded by category: never discounted.
        let promo = promotion()
            .with_target(Target::Product(ProductId::from("tee")))
            .with_exclusion(Exclusion::Category(CategoryId::from("apparel")));

        assert!(!is_line_eligible(&apparel_line(), &promo));
    }

    #[test]
    fn exclude_all_blocks_every_line() {
        let promo = promotion().with_exclusion(Exclusion::All);

        assert!(!is_line_eligible(&apparel_line(), &promo));
    }

    #[test]
    fn unresolved_line_is_never_eligible() {
        let line = CartLine::new(ProductId::from("tee"), Money::from_minor(2000, GBP), 1);

        assert!(!is_line_eligible(&line, &promotion()));

        let targeted = promotion().with_target(Target::Product(ProductId::from("tee")));

        assert!(!is_line_eligible(&line, &targeted));
    }

    #[test]
    fn segment_target_does_not_match_lines_and_does_not_block_targeting() {
        // A promotion targeted only at a segment still discounts every line; the segment
        // requirement is enforced during qualification.
        let promo = promotion().with_target(Target::CustomerSegment(SegmentId::from("vip")));

        assert!(is_line_eligible(&apparel_line(), &promo));
    }

    #[test]
    fn eligible_lines_preserves_line_order_and_indices() -> TestResult {
        let lines = vec![
            apparel_line(),
            CartLine::new(ProductId::from("card"), Money::from_minor(2500, GBP), 1)
                .with_product_ref(ProductRef::new([CategoryId::from("gift")], [])),
            apparel_line(),
        ];

        let context = EvaluationContext::new(lines, GBP, Timestamp::UNIX_EPOCH)?;
        let promo = promotion().with_target(Target::Category(CategoryId::from("apparel")));

        let eligible = eligible_lines(&promo, &context);
        let indices: Vec<usize> = eligible.iter().map(|(idx, _)| *idx).collect();

        assert_eq!(indices, vec![0, 2]);

        Ok(())
    }
}
