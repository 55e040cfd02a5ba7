//! Utility functions and helpers
//!
//! This module contains utility functions used throughout the crate.

pub mod clock;
pub mod version;

pub use clock::{Clock, FixedClock, KstClock};
pub use version::{VERSION, get_version};
