//! Cart Lines
//!
//! Immutable cart input to the engine. Each line carries its unit price, quantity and the
//! catalog classification resolved by the caller before evaluation; a line whose catalog
//! lookup failed has no [`ProductRef`] and is never eligible for any promotion.

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;

use crate::{
    ids::{CategoryId, CollectionId, ProductId},
    pricing::PricingError,
};

/// Catalog classification for a cart line's product.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductRef {
    categories: SmallVec<[CategoryId; 4]>,
    collections: SmallVec<[CollectionId; 4]>,
}

impl ProductRef {
    /// Create a classification from category and collection id sets.
    pub fn new(
        categories: impl IntoIterator<Item = CategoryId>,
        collections: impl IntoIterator<Item = CollectionId>,
    ) -> Self {
        Self {
            categories: categories.into_iter().collect(),
            collections: collections.into_iter().collect(),
        }
    }

    /// Whether the product belongs to the given category.
    pub fn in_category(&self, category: &CategoryId) -> bool {
        self.categories.contains(category)
    }

    /// Whether the product belongs to the given collection.
    pub fn in_collection(&self, collection: &CollectionId) -> bool {
        self.collections.contains(collection)
    }

    /// The category ids.
    pub fn categories(&self) -> &[CategoryId] {
        &self.categories
    }

    /// The collection ids.
    pub fn collections(&self) -> &[CollectionId] {
        &self.collections
    }
}

/// One cart entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine<'a> {
    product: ProductId,
    unit_price: Money<'a, Currency>,
    quantity: u32,
    product_ref: Option<ProductRef>,
}

impl<'a> CartLine<'a> {
    /// Create a line with no resolved catalog reference.
    #[must_use]
    pub fn new(product: ProductId, unit_price: Money<'a, Currency>, quantity: u32) -> Self {
        Self {
            product,
            unit_price,
            quantity,
            product_ref: None,
        }
    }

    /// Attach the catalog classification resolved for this line's product.
    #[must_use]
    pub fn with_product_ref(mut self, product_ref: ProductRef) -> Self {
        self.product_ref = Some(product_ref);
        self
    }

    /// The product id.
    pub fn product(&self) -> &ProductId {
        &self.product
    }

    /// The unit price.
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// The quantity.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// The resolved catalog reference, if the lookup succeeded.
    pub fn product_ref(&self) -> Option<&ProductRef> {
        self.product_ref.as_ref()
    }

    /// The line amount: unit price times quantity.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::AmountOverflow`] if the multiplication overflows minor units.
    pub fn amount(&self) -> Result<Money<'a, Currency>, PricingError> {
        let minor = self
            .unit_price
            .to_minor_units()
            .checked_mul(i64::from(self.quantity))
            .ok_or(PricingError::AmountOverflow)?;

        Ok(Money::from_minor(minor, self.unit_price.currency()))
    }
}
