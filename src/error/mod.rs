//! Error handling for the lottery client
//!
//! This module defines error types and handling patterns used throughout the crate.

pub mod types;

pub use types::{BoxError, Error, PurchaseRejection, Result};
