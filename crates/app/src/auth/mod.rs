//! Authentication

mod token;

pub use token::*;
