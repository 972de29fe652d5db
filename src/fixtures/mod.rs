//! Fixtures
//!
//! YAML-backed cart and promotion sets for integration tests. A set pairs
//! `fixtures/carts/<name>.yml` with `fixtures/promotions/<name>.yml`; fixture configs are
//! plain serde structs converted into domain types, with money written as `"9.99 GBP"`.

use std::{fs, path::PathBuf};

use decimal_percentage::Percentage;
use jiff::Timestamp;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use thiserror::Error;

use crate::{
    carts::CartLine,
    context::{ContextError, EvaluationContext},
    fixtures::{carts::CartFixture, promotions::PromotionsFixture},
    ids::{CustomerId, SegmentId},
    promotions::Promotion,
};

pub mod carts;
pub mod promotions;

/// Fixture parsing errors.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files.
    #[error("failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format.
    #[error("invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage.
    #[error("invalid percentage: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between cart lines.
    #[error("currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No cart loaded yet; currency unknown.
    #[error("no cart loaded yet; currency unknown")]
    NoCurrency,

    /// Promotion not found.
    #[error("promotion not found: {0}")]
    PromotionNotFound(String),

    /// Context construction error.
    #[error(transparent)]
    Context(#[from] ContextError),
}

/// Parse a `"9.99 GBP"` money string.
///
/// # Errors
///
/// Returns [`FixtureError::InvalidPrice`] for anything but `<amount> <code>`, and
/// [`FixtureError::UnknownCurrency`] for an unrecognised ISO code.
pub fn parse_money(input: &str) -> Result<Money<'static, Currency>, FixtureError> {
    let mut parts = input.split_whitespace();
    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(FixtureError::InvalidPrice(input.to_string()));
    };

    let currency =
        iso::find(code).ok_or_else(|| FixtureError::UnknownCurrency(code.to_string()))?;

    let amount: Decimal = amount
        .parse()
        .map_err(|error| FixtureError::InvalidPrice(format!("{input}: {error}")))?;

    let scale = Decimal::from(10i64.pow(currency.exponent));
    let minor = (amount * scale)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| FixtureError::InvalidPrice(input.to_string()))?;

    Ok(Money::from_minor(minor, currency))
}

/// Convert whole-number percentage points (`10` means 10%) into a [`Percentage`].
///
/// # Errors
///
/// Returns [`FixtureError::InvalidPercentage`] for negative or non-finite values.
pub fn parse_percent_points(points: f64) -> Result<Percentage, FixtureError> {
    if !points.is_finite() || points < 0.0 {
        return Err(FixtureError::InvalidPercentage(points.to_string()));
    }

    Ok(Percentage::from(points / 100.0))
}

/// A loaded fixture set: one cart with its customer facts, plus named promotions.
#[derive(Debug, Default)]
pub struct Fixture {
    base_path: PathBuf,
    lines: Vec<CartLine<'static>>,
    currency: Option<&'static Currency>,
    customer: Option<CustomerId>,
    segments: Vec<SegmentId>,
    first_time_customer: bool,
    codes: Vec<String>,
    promotions: Vec<Promotion<'static>>,
    promotion_keys: FxHashMap<String, usize>,
}

impl Fixture {
    /// Create an empty fixture with the default base path.
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create an empty fixture with a custom base path.
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            ..Self::default()
        }
    }

    /// Load a cart (lines plus customer facts) from a YAML fixture file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if lines mix currencies.
    pub fn load_cart(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("carts").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: CartFixture = serde_norway::from_str(&contents)?;

        self.customer = fixture.customer.map(CustomerId::from);
        self.segments = fixture.segments.into_iter().map(SegmentId::from).collect();
        self.first_time_customer = fixture.first_time_customer;
        self.codes = fixture.codes;

        for line_fixture in fixture.lines {
            let line = line_fixture.try_into_line()?;
            let line_currency = line.unit_price().currency();

            if let Some(existing) = self.currency {
                if existing != line_currency {
                    return Err(FixtureError::CurrencyMismatch(
                        existing.iso_alpha_code.to_string(),
                        line_currency.iso_alpha_code.to_string(),
                    ));
                }
            } else {
                self.currency = Some(line_currency);
            }

            self.lines.push(line);
        }

        Ok(self)
    }

    /// Load promotions from a YAML fixture file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or a promotion config is
    /// invalid.
    pub fn load_promotions(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self
            .base_path
            .join("promotions")
            .join(format!("{name}.yml"));

        let contents = fs::read_to_string(&file_path)?;
        let fixture: PromotionsFixture = serde_norway::from_str(&contents)?;

        // Sort by key so the candidate order, which the stacking resolver uses as the
        // final tie-break, does not depend on map iteration order.
        let mut entries: Vec<_> = fixture.promotions.into_iter().collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));

        for (key, promotion_fixture) in entries {
            let promotion = promotion_fixture.try_into_promotion(&key)?;

            self.promotion_keys.insert(key, self.promotions.len());
            self.promotions.push(promotion);
        }

        Ok(self)
    }

    /// Load a complete fixture set: the cart and the promotions sharing `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if either fixture file cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_cart(name)?.load_promotions(name)?;

        Ok(fixture)
    }

    /// Build the evaluation context for the loaded cart at the given instant.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::NoCurrency`] before a cart is loaded, or a wrapped
    /// [`ContextError`] if context construction fails.
    pub fn context(&self, now: Timestamp) -> Result<EvaluationContext<'static>, FixtureError> {
        let currency = self.currency.ok_or(FixtureError::NoCurrency)?;

        let mut context = EvaluationContext::new(self.lines.clone(), currency, now)?
            .with_segments(self.segments.iter().cloned())
            .with_first_time_customer(self.first_time_customer)
            .with_codes(self.codes.iter().cloned());

        if let Some(customer) = &self.customer {
            context = context.with_customer(customer.clone());
        }

        Ok(context)
    }

    /// All loaded promotions, in key order.
    pub fn promotions(&self) -> &[Promotion<'static>] {
        &self.promotions
    }

    /// Get a promotion by its fixture key.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::PromotionNotFound`] for an unknown key.
    pub fn promotion(&self, key: &str) -> Result<&Promotion<'static>, FixtureError> {
        self.promotion_keys
            .get(key)
            .and_then(|idx| self.promotions.get(*idx))
            .ok_or_else(|| FixtureError::PromotionNotFound(key.to_string()))
    }

    /// The cart lines.
    pub fn lines(&self) -> &[CartLine<'static>] {
        &self.lines
    }

    /// The cart currency.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::NoCurrency`] before a cart is loaded.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }
}

#[cfg(test)]
mod tests {
    use std::{env, fs, path::Path};

    use rusty_money::iso::GBP;
    use testresult::TestResult;

    use super::*;

    fn write_fixture(base: &Path, category: &str, name: &str, contents: &str) -> TestResult {
        let dir = base.join(category);

        fs::create_dir_all(&dir)?;
        fs::write(dir.join(format!("{name}.yml")), contents)?;

        Ok(())
    }

    fn temp_base(tag: &str) -> PathBuf {
        env::temp_dir().join(format!("rialto-fixtures-{tag}-{}", std::process::id()))
    }

    #[test]
    fn parse_money_reads_amount_and_currency() -> TestResult {
        let money = parse_money("9.99 GBP")?;

        assert_eq!(money.to_minor_units(), 999);
        assert_eq!(money.currency(), GBP);

        Ok(())
    }

    #[test]
    fn parse_money_rejects_malformed_input() {
        assert!(matches!(
            parse_money("9.99"),
            Err(FixtureError::InvalidPrice(_))
        ));
        assert!(matches!(
            parse_money("9.99 GBP extra"),
            Err(FixtureError::InvalidPrice(_))
        ));
        assert!(matches!(
            parse_money("nine GBP"),
            Err(FixtureError::InvalidPrice(_))
        ));
        assert!(matches!(
            parse_money("9.99 ZZZ"),
            Err(FixtureError::UnknownCurrency(_))
        ));
    }

    #[test]
    fn parse_percent_points_scales_to_a_fraction() -> TestResult {
        assert_eq!(parse_percent_points(10.0)?, Percentage::from(0.10));
        assert_eq!(parse_percent_points(0.0)?, Percentage::from(0.0));

        Ok(())
    }

    #[test]
    fn parse_percent_points_rejects_bad_values() {
        assert!(matches!(
            parse_percent_points(-1.0),
            Err(FixtureError::InvalidPercentage(_))
        ));
        assert!(matches!(
            parse_percent_points(f64::NAN),
            Err(FixtureError::InvalidPercentage(_))
        ));
    }

    #[test]
    fn from_set_loads_cart_and_promotions() -> TestResult {
        let fixture = Fixture::from_set("standard")?;

        assert_eq!(fixture.lines().len(), 3);
        assert_eq!(fixture.promotions().len(), 4);
        assert_eq!(fixture.currency()?, GBP);
        assert!(fixture.promotion("summer-ten").is_ok());

        Ok(())
    }

    #[test]
    fn promotion_not_found_returns_error() {
        let fixture = Fixture::new();

        assert!(matches!(
            fixture.promotion("missing"),
            Err(FixtureError::PromotionNotFound(_))
        ));
    }

    #[test]
    fn context_before_loading_a_cart_returns_no_currency() {
        let fixture = Fixture::new();

        assert!(matches!(
            fixture.context(Timestamp::UNIX_EPOCH),
            Err(FixtureError::NoCurrency)
        ));
    }

    #[test]
    fn load_cart_rejects_mixed_currencies() -> TestResult {
        let base_path = temp_base("mixed");

        write_fixture(
            &base_path,
            "carts",
            "mixed",
            "lines:\n  - product: tee\n    price: 1.00 GBP\n    quantity: 1\n  - product: cap\n    price: 1.00 USD\n    quantity: 1\n",
        )?;

        let mut fixture = Fixture::with_base_path(&base_path);
        let result = fixture.load_cart("mixed");

        assert!(matches!(result, Err(FixtureError::CurrencyMismatch(_, _))));

        Ok(())
    }

    #[test]
    fn load_promotions_rejects_unknown_kind() -> TestResult {
        let base_path = temp_base("unknown-kind");

        write_fixture(
            &base_path,
            "promotions",
            "bad",
            "promotions:\n  mystery:\n    type: mystery_discount\n    name: Mystery\n    starts_at: \"2025-01-01T00:00:00Z\"\n",
        )?;

        let mut fixture = Fixture::with_base_path(&base_path);
        let result = fixture.load_promotions("bad");

        assert!(matches!(result, Err(FixtureError::Yaml(_))));

        Ok(())
    }
}
