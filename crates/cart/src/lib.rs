//! Shopping cart state engine.
//!
//! [`CartState`] is a reducer over a closed set of [`CartAction`]s; it keeps
//! `total_items` and `total_amount` equal to the fold over its lines after
//! every transition. [`CartEngine`] owns one `CartState`, serializes intents
//! through an async mutex, syncs each mutation to a [`CartRemote`] on a best
//! effort basis and persists a [`CartSnapshot`] to a [`KeyValueStore`].
//!
//! Loading prefers the remote cart, then the local snapshot, then an empty
//! cart. Remote sync failures are logged and never rolled back.

pub mod coupon;
pub mod engine;
pub mod error;
pub mod item;
pub mod remote;
pub mod snapshot;
pub mod state;
pub mod storage;
pub mod summary;

pub use coupon::{Coupon, CouponCatalog};
pub use engine::{CartEngine, CartOutcome, LoadSource};
pub use error::{CartError, RemoteError, Result, StorageError};
pub use item::{CartItem, DEFAULT_MAX_QUANTITY, DEFAULT_SELLER, ProductListing};
pub use remote::{CartRemote, CouponResponse, HttpCartRemote, InMemoryCartRemote, RemoteCall};
pub use snapshot::CartSnapshot;
pub use state::{CartAction, CartState};
pub use storage::{DEFAULT_CART_KEY, InMemoryStore, JsonFileStore, KeyValueStore};
pub use summary::CartSummary;
