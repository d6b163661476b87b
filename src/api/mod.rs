//! Typed surface over the marketplace REST API.

pub mod client;
pub mod error;
pub mod types;
pub mod wire;

pub use client::ApiClient;
pub use error::ApiError;
