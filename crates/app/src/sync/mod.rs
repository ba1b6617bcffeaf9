//! Cart synchronization.
//!
//! The [`CartSyncEngine`] owns the client's copy of the cart. Every successful
//! server response replaces that copy as a whole; a failed request leaves it
//! untouched.

pub mod engine;
pub mod errors;
pub mod outcomes;
pub mod state;

pub use engine::CartSyncEngine;
pub use errors::CartSyncError;
pub use outcomes::{IncreaseOutcome, LargeQuantityPrompt, ShortfallOrigin, StockShortfall};
pub use state::{CartAction, CartState, SyncFailure};
