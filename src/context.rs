//! Evaluation Context
//!
//! The full input to one evaluation call: the ordered cart lines, the customer facts the
//! caller resolved up front, any promotion codes the shopper entered, and a single sampled
//! evaluation instant. Built once per request and never mutated by the engine, so repeated
//! evaluations over the same context are byte-identical.

use jiff::Timestamp;
use rustc_hash::FxHashSet;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    carts::CartLine,
    ids::{CustomerId, SegmentId},
    pricing::PricingError,
};

/// Errors related to context construction.
#[derive(Debug, Error)]
pub enum ContextError {
    /// A line's currency differs from the basket currency (index, line currency, basket currency).
    #[error("line {0} has currency {1}, but the basket has currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),

    /// A line amount could not be computed.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// The immutable input to one evaluation call.
#[derive(Debug, Clone)]
pub struct EvaluationContext<'a> {
    lines: Vec<CartLine<'a>>,
    subtotal: Money<'a, Currency>,
    currency: &'static Currency,
    customer: Option<CustomerId>,
    segments: FxHashSet<SegmentId>,
    first_time_customer: bool,
    codes: Vec<String>,
    now: Timestamp,
}

impl<'a> EvaluationContext<'a> {
    /// Create a context over the given lines.
    ///
    /// The subtotal is derived from the lines rather than trusted from the caller, so the
    /// minimum-purchase floor and the fixed-amount distribution can never disagree with
    /// the lines. `now` is sampled once by the caller and used for every validity-window
    /// check in this evaluation.
    ///
    /// # Errors
    ///
    /// Returns a [`ContextError`] if a line's currency differs from the basket currency or
    /// a line amount overflows.
    pub fn new(
        lines: impl Into<Vec<CartLine<'a>>>,
        currency: &'static Currency,
        now: Timestamp,
    ) -> Result<Self, ContextError> {
        let lines = lines.into();

        let mut subtotal = 0i64;
        for (idx, line) in lines.iter().enumerate() {
            let line_currency = line.unit_price().currency();
            if line_currency != currency {
                return Err(ContextError::CurrencyMismatch(
                    idx,
                    line_currency.iso_alpha_code,
                    currency.iso_alpha_code,
                ));
            }

            subtotal = subtotal
                .checked_add(line.amount()?.to_minor_units())
                .ok_or(PricingError::AmountOverflow)?;
        }

        Ok(Self {
            lines,
            subtotal: Money::from_minor(subtotal, currency),
            currency,
            customer: None,
            segments: FxHashSet::default(),
            first_time_customer: false,
            codes: Vec::new(),
            now,
        })
    }

    /// Attach the customer id.
    #[must_use]
    pub fn with_customer(mut self, customer: CustomerId) -> Self {
        self.customer = Some(customer);
        self
    }

    /// Attach the customer's precomputed segment ids.
    #[must_use]
    pub fn with_segments(mut self, segments: impl IntoIterator<Item = SegmentId>) -> Self {
        self.segments = segments.into_iter().collect();
        self
    }

    /// Mark the customer as a first-time customer.
    #[must_use]
    pub fn with_first_time_customer(mut self, first_time_customer: bool) -> Self {
        self.first_time_customer = first_time_customer;
        self
    }

    /// Attach the promotion codes the shopper entered.
    #[must_use]
    pub fn with_codes(mut self, codes: impl IntoIterator<Item = String>) -> Self {
        self.codes = codes.into_iter().collect();
        self
    }

    /// The ordered cart lines.
    pub fn lines(&self) -> &[CartLine<'a>] {
        &self.lines
    }

    /// The cart subtotal, derived from the lines.
    pub fn subtotal(&self) -> Money<'a, Currency> {
        self.subtotal
    }

    /// The basket currency.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// The customer id, when the shopper is signed in.
    pub fn customer(&self) -> Option<&CustomerId> {
        self.customer.as_ref()
    }

    /// The customer's segment ids.
    pub fn segments(&self) -> &FxHashSet<SegmentId> {
        &self.segments
    }

    /// Whether this is the customer's first order.
    pub fn is_first_time_customer(&self) -> bool {
        self.first_time_customer
    }

    /// The promotion codes the shopper entered.
    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    /// The instant this evaluation is running at.
    pub fn now(&self) -> Timestamp {
        self.now
    }
}
