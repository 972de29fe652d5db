//! Cart Fixtures

use serde::Deserialize;

use crate::{
    carts::{CartLine, ProductRef},
    fixtures::{FixtureError, parse_money},
    ids::{CategoryId, CollectionId, ProductId},
};

/// A cart in YAML: the lines plus the customer facts the caller would normally resolve.
#[derive(Debug, Deserialize)]
pub struct CartFixture {
    /// Customer id, when the shopper is signed in.
    #[serde(default)]
    pub customer: Option<String>,

    /// Precomputed segment ids for the customer.
    #[serde(default)]
    pub segments: Vec<String>,

    /// Whether this is the customer's first order.
    #[serde(default)]
    pub first_time_customer: bool,

    /// Promotion codes the shopper entered.
    #[serde(default)]
    pub codes: Vec<String>,

    /// The cart lines.
    pub lines: Vec<CartLineFixture>,
}

/// One cart line in YAML.
#[derive(Debug, Deserialize)]
pub struct CartLineFixture {
    /// Product id.
    pub product: String,

    /// Unit price, e.g. `"9.99 GBP"`.
    pub price: String,

    /// Quantity.
    pub quantity: u32,

    /// Category ids of the resolved product.
    #[serde(default)]
    pub categories: Vec<String>,

    /// Collection ids of the resolved product.
    #[serde(default)]
    pub collections: Vec<String>,
}

impl CartLineFixture {
    /// Convert into a [`CartLine`] with a resolved product reference.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if the price cannot be parsed.
    pub fn try_into_line(self) -> Result<CartLine<'static>, FixtureError> {
        let unit_price = parse_money(&self.price)?;

        let product_ref = ProductRef::new(
            self.categories.into_iter().map(CategoryId::from),
            self.collections.into_iter().map(CollectionId::from),
        );

        Ok(
            CartLine::new(ProductId::from(self.product), unit_price, self.quantity)
                .with_product_ref(product_ref),
        )
    }
}
