//! Ticket purchasing
//!
//! Validation rules, the transaction wire codec, and the engine that runs
//! them against the operator.

pub mod codec;
pub mod engine;
pub mod rules;

pub use codec::{encode_param, encode_slots, parse_game_line, parse_purchase_result};
pub use engine::PurchaseEngine;
pub use rules::SalesWindow;
