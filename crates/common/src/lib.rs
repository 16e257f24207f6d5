//! Shared types for the storefront cart and checkout crates.

pub mod money;
pub mod notify;
pub mod types;
pub mod validation;

pub use money::Money;
pub use notify::{Notice, NoticeLevel, Notifier, RecordingNotifier, TracingNotifier};
pub use types::{CustomerId, OrderId, ProductId, TransactionId};
pub use validation::FieldErrors;
