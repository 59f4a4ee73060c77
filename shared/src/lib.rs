//! Shared types and models for the Grow Smart garden tracker
//!
//! This crate contains the domain types and pure care logic shared between
//! the backend, the browser client (via WASM), and tests.

pub mod advice;
pub mod library;
pub mod models;
pub mod scheduling;
pub mod types;
pub mod validation;

pub use advice::*;
pub use library::*;
pub use models::*;
pub use scheduling::*;
pub use types::*;
pub use validation::*;
