//! Durable session storage.

pub mod token;

pub use token::TokenStorage;
