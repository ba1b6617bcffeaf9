//! Kart client: remote cart synchronization, review sessions and checkout
//! handoff for the shop API.

pub mod api;
pub mod auth;
pub mod config;
pub mod context;
pub mod messages;
pub mod observability;
pub mod review;
pub mod sync;

#[cfg(test)]
mod test;
