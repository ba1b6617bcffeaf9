//! Kart
//!
//! Kart is the client-side cart domain of a shopping application: product and
//! cart snapshots as served by the remote cart service, checkout selection,
//! large-quantity confirmations and the pre-flight rules evaluated before a
//! quantity change is sent to the server.

pub mod carts;
pub mod checkout;
pub mod confirmations;
pub mod fixtures;
pub mod ids;
pub mod pricing;
pub mod products;
pub mod rules;
pub mod selection;

pub mod prelude;
