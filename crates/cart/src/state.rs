//! Cart state and its reducer.
//!
//! `CartState` changes only through [`CartState::apply`], which handles a
//! closed set of [`CartAction`]s. Command methods (`add_item`,
//! `update_quantity`, ...) validate an intent against the current state and
//! return the action to apply, mirroring a decide/apply split:
//!
//! ```text
//! intent ──► decide (&self) ──► CartAction ──► apply (&mut self)
//!               │
//!               └──► CartError (state untouched)
//! ```

use common::{Money, ProductId};
use serde::{Deserialize, Serialize};

use crate::coupon::{Coupon, CouponCatalog};
use crate::error::CartError;
use crate::item::{CartItem, ProductListing};
use crate::snapshot::CartSnapshot;
use crate::summary::CartSummary;

/// The typed transitions of the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAction {
    /// A load started.
    Loading,

    /// Cart contents arrived from the remote service or local snapshot.
    Loaded(CartSnapshot),

    /// Neither source could be read.
    LoadFailed(String),

    /// A new line was appended.
    ItemAdded(CartItem),

    /// An existing line's quantity was replaced.
    QuantityUpdated { id: ProductId, quantity: u32 },

    /// A line was removed.
    ItemRemoved { id: ProductId },

    /// A coupon was accepted with the given discount.
    CouponApplied { coupon: Coupon, discount: Money },

    /// The applied coupon was dropped.
    CouponRemoved,

    /// An intent failed local validation.
    Rejected(String),

    /// Reset to the initial empty state.
    Cleared,

    /// The "recently added" feedback was dismissed.
    RecentlyAddedCleared,

    /// The error banner was dismissed.
    ErrorCleared,
}

impl CartAction {
    /// Returns the action name, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            CartAction::Loading => "Loading",
            CartAction::Loaded(_) => "Loaded",
            CartAction::LoadFailed(_) => "LoadFailed",
            CartAction::ItemAdded(_) => "ItemAdded",
            CartAction::QuantityUpdated { .. } => "QuantityUpdated",
            CartAction::ItemRemoved { .. } => "ItemRemoved",
            CartAction::CouponApplied { .. } => "CouponApplied",
            CartAction::CouponRemoved => "CouponRemoved",
            CartAction::Rejected(_) => "Rejected",
            CartAction::Cleared => "Cleared",
            CartAction::RecentlyAddedCleared => "RecentlyAddedCleared",
            CartAction::ErrorCleared => "ErrorCleared",
        }
    }

    /// Returns true if applying this action changes what gets persisted.
    pub fn changes_persisted_state(&self) -> bool {
        matches!(
            self,
            CartAction::ItemAdded(_)
                | CartAction::QuantityUpdated { .. }
                | CartAction::ItemRemoved { .. }
                | CartAction::CouponApplied { .. }
                | CartAction::CouponRemoved
        )
    }
}

/// The aggregate root of the cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartState {
    items: Vec<CartItem>,
    total_items: u32,
    total_amount: Money,
    shipping_cost: Money,
    applied_coupon: Option<Coupon>,
    discount: Money,
    is_loading: bool,
    error: Option<String>,
    recently_added: Option<CartItem>,
}

// Query methods
impl CartState {
    /// Returns the lines in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Returns a line by product ID.
    pub fn get_item(&self, id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Returns the sum of all quantities.
    pub fn total_items(&self) -> u32 {
        self.total_items
    }

    /// Returns the sum of price × quantity.
    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    /// Returns the shipping cost reported by the cart service.
    pub fn shipping_cost(&self) -> Money {
        self.shipping_cost
    }

    /// Returns the applied coupon, if any.
    pub fn applied_coupon(&self) -> Option<&Coupon> {
        self.applied_coupon.as_ref()
    }

    /// Returns the discount granted by the applied coupon.
    pub fn discount(&self) -> Money {
        self.discount
    }

    /// Returns true while a load is in progress.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Returns the last error message, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns the most recently added line.
    pub fn recently_added(&self) -> Option<&CartItem> {
        self.recently_added.as_ref()
    }

    /// Returns true if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns true if a line exists for the product.
    pub fn contains(&self, id: &ProductId) -> bool {
        self.get_item(id).is_some()
    }

    /// Returns the quantity held for a product, zero if absent.
    pub fn quantity_of(&self, id: &ProductId) -> u32 {
        self.get_item(id).map_or(0, |item| item.quantity)
    }

    /// Returns the derived totals.
    pub fn summary(&self) -> CartSummary {
        CartSummary::compute(
            self.total_amount,
            self.shipping_cost,
            self.discount,
            self.total_items,
            self.applied_coupon.clone(),
        )
    }

    /// Returns the payload written to local storage.
    pub fn to_snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            items: self.items.clone(),
            total_items: self.total_items,
            total_amount: self.total_amount,
            applied_coupon: self.applied_coupon.clone(),
            discount: self.discount,
            shipping_cost: None,
        }
    }
}

// Command methods (return actions)
impl CartState {
    /// Decides how to add `quantity` units of a listing.
    ///
    /// An already-present product becomes a quantity update rather than a
    /// second line.
    pub fn add_item(&self, listing: &ProductListing, quantity: u32) -> Result<CartAction, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity { quantity });
        }
        if listing.price.is_negative() {
            return Err(CartError::InvalidPrice {
                product_id: listing.id.clone(),
                price: listing.price,
            });
        }

        if let Some(existing) = self.get_item(&listing.id) {
            let requested = existing.quantity.saturating_add(quantity);
            let clamped = existing.clamp_quantity(requested);
            if clamped < requested {
                tracing::warn!(
                    product_id = %listing.id,
                    requested,
                    max = existing.max_quantity,
                    "quantity clamped to maximum"
                );
            }
            return Ok(CartAction::QuantityUpdated {
                id: listing.id.clone(),
                quantity: clamped,
            });
        }

        Ok(CartAction::ItemAdded(listing.to_cart_item(quantity)))
    }

    /// Decides how to set a line's quantity. Zero or below removes the line.
    pub fn update_quantity(&self, id: &ProductId, new_quantity: i64) -> Result<CartAction, CartError> {
        let existing = self.get_item(id).ok_or_else(|| CartError::ItemNotFound {
            product_id: id.clone(),
        })?;

        if new_quantity <= 0 {
            return Ok(CartAction::ItemRemoved { id: id.clone() });
        }

        let requested = u32::try_from(new_quantity).unwrap_or(u32::MAX);
        Ok(CartAction::QuantityUpdated {
            id: id.clone(),
            quantity: existing.clamp_quantity(requested),
        })
    }

    /// Decides how to remove a line.
    pub fn remove_item(&self, id: &ProductId) -> Result<CartAction, CartError> {
        if !self.contains(id) {
            return Err(CartError::ItemNotFound {
                product_id: id.clone(),
            });
        }
        Ok(CartAction::ItemRemoved { id: id.clone() })
    }

    /// Validates a coupon code against the catalog and the current subtotal.
    pub fn apply_coupon(&self, catalog: &CouponCatalog, code: &str) -> Result<CartAction, CartError> {
        let (coupon, discount) = catalog.validate(code, self.total_amount)?;
        Ok(CartAction::CouponApplied { coupon, discount })
    }
}

// Reducer
impl CartState {
    /// Applies an action. Never fails; invalid intents are rejected before an
    /// action is produced.
    pub fn apply(&mut self, action: CartAction) {
        match action {
            CartAction::Loading => {
                self.is_loading = true;
                self.error = None;
            }
            CartAction::Loaded(snapshot) => self.apply_loaded(snapshot),
            CartAction::LoadFailed(message) => {
                self.is_loading = false;
                self.error = Some(message);
            }
            CartAction::ItemAdded(item) => {
                self.recently_added = Some(item.clone());
                self.items.push(item);
                self.recalculate();
                self.error = None;
            }
            CartAction::QuantityUpdated { id, quantity } => {
                if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
                    item.quantity = quantity;
                }
                self.recalculate();
                self.error = None;
            }
            CartAction::ItemRemoved { id } => self.apply_item_removed(&id),
            CartAction::CouponApplied { coupon, discount } => {
                self.applied_coupon = Some(coupon);
                self.discount = discount;
                self.error = None;
            }
            CartAction::CouponRemoved => {
                self.applied_coupon = None;
                self.discount = Money::zero();
                self.error = None;
            }
            CartAction::Rejected(message) => {
                self.error = Some(message);
            }
            CartAction::Cleared => {
                *self = CartState::default();
            }
            CartAction::RecentlyAddedCleared => {
                self.recently_added = None;
            }
            CartAction::ErrorCleared => {
                self.error = None;
            }
        }
    }

    fn apply_loaded(&mut self, mut snapshot: CartSnapshot) {
        snapshot.items.retain(|item| {
            let usable = item.quantity > 0 && !item.price.is_negative();
            if !usable {
                tracing::warn!(
                    product_id = %item.id,
                    quantity = item.quantity,
                    price = %item.price,
                    "dropping unusable line from loaded cart"
                );
            }
            usable
        });
        if !snapshot.totals_consistent() {
            tracing::warn!(
                stored_items = snapshot.total_items,
                stored_amount = %snapshot.total_amount,
                "loaded cart totals disagree with items, recomputing"
            );
        }
        self.items = snapshot.items;
        self.shipping_cost = snapshot.shipping_cost.unwrap_or_default();
        self.applied_coupon = snapshot.applied_coupon;
        self.discount = snapshot.discount;
        self.recalculate();
        self.is_loading = false;
        self.error = None;
    }

    /// Subtracts exactly the removed line's contribution.
    fn apply_item_removed(&mut self, id: &ProductId) {
        if let Some(pos) = self.items.iter().position(|item| &item.id == id) {
            let removed = self.items.remove(pos);
            self.total_items -= removed.quantity;
            self.total_amount -= removed.line_total();
            if self.recently_added.as_ref().is_some_and(|r| &r.id == id) {
                self.recently_added = None;
            }
        }
        self.error = None;
    }

    fn recalculate(&mut self) {
        self.total_items = self.items.iter().map(|item| item.quantity).sum();
        self.total_amount = self.items.iter().map(CartItem::line_total).sum();
    }
}
