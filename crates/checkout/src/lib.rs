//! Checkout orchestration.
//!
//! A [`CheckoutSession`] walks `Address → Delivery → Payment → Confirmation`
//! over a shared [`cart::CartEngine`]. Entering payment freezes an [`Order`]
//! from the cart; a [`payment::PaymentGateway`] is opened for its total, and a
//! successful outcome is turned into an [`OrderRequest`] for the
//! [`OrderService`]. The cart is cleared only after the order exists.

pub mod address;
pub mod delivery;
pub mod error;
pub mod order;
pub mod services;
pub mod session;
pub mod step;

pub use address::{Address, AddressBook, AddressId, AddressKind, DEFAULT_ADDRESS_KEY, NewAddress};
pub use delivery::{DeliveryOption, DeliveryPricing};
pub use error::{CheckoutError, OrderServiceError, Result};
pub use order::{
    DeliverySelection, Order, OrderLine, OrderRequest, OrderStatus, OrderSummary, PlacedOrder,
};
pub use services::{HttpOrderService, InMemoryOrderService, OrderService};
pub use session::CheckoutSession;
pub use step::CheckoutStep;
