//! Cart lines and the catalog listing they are created from.

use common::{Money, ProductId};
use serde::{Deserialize, Serialize};

/// Maximum quantity used when a listing does not carry stock information.
pub const DEFAULT_MAX_QUANTITY: u32 = 10;

/// Seller label used when a listing has none.
pub const DEFAULT_SELLER: &str = "Bharatshaala Seller";

/// A product as shown in the catalog, the input to "add to cart".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListing {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    #[serde(default)]
    pub original_price: Option<Money>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub seller: Option<String>,
    #[serde(default)]
    pub category: String,
    /// Units in stock; caps the quantity a shopper may hold.
    #[serde(default)]
    pub stock: Option<u32>,
}

impl ProductListing {
    /// Creates a listing with only the required fields set.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Money) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            original_price: None,
            images: Vec::new(),
            image: None,
            seller: None,
            category: String::new(),
            stock: None,
        }
    }

    /// Sets the seller.
    pub fn with_seller(mut self, seller: impl Into<String>) -> Self {
        self.seller = Some(seller.into());
        self
    }

    /// Sets the category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Sets the stock level.
    pub fn with_stock(mut self, stock: u32) -> Self {
        self.stock = Some(stock);
        self
    }

    /// Builds a cart line for this listing.
    ///
    /// The first gallery image wins over the single `image` field, and a zero
    /// or missing stock falls back to [`DEFAULT_MAX_QUANTITY`].
    pub fn to_cart_item(&self, quantity: u32) -> CartItem {
        let max_quantity = match self.stock {
            Some(stock) if stock > 0 => stock,
            _ => DEFAULT_MAX_QUANTITY,
        };
        CartItem {
            id: self.id.clone(),
            name: self.name.clone(),
            price: self.price,
            original_price: self.original_price,
            image: self.images.first().cloned().or_else(|| self.image.clone()),
            seller: self
                .seller
                .clone()
                .unwrap_or_else(|| DEFAULT_SELLER.to_string()),
            category: self.category.clone(),
            quantity: quantity.min(max_quantity),
            max_quantity,
        }
    }
}

/// One line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: ProductId,
    pub name: String,
    /// Unit price.
    pub price: Money,
    #[serde(default)]
    pub original_price: Option<Money>,
    #[serde(default)]
    pub image: Option<String>,
    pub seller: String,
    #[serde(default)]
    pub category: String,
    pub quantity: u32,
    #[serde(default = "default_max_quantity")]
    pub max_quantity: u32,
}

fn default_max_quantity() -> u32 {
    DEFAULT_MAX_QUANTITY
}

impl CartItem {
    /// Returns price × quantity.
    pub fn line_total(&self) -> Money {
        self.price.multiply(self.quantity)
    }

    /// Clamps a requested quantity to this item's maximum.
    pub fn clamp_quantity(&self, requested: u32) -> u32 {
        requested.min(self.max_quantity)
    }
}
