//! Type definitions for the lottery client
//!
//! Domain records handed to callers, plus the raw operator payloads they are
//! mapped from.

pub mod account;
pub mod draw;
pub mod pension;
pub mod purchase;
pub mod serde_helpers;
pub mod wire;

pub use account::{
    BalanceSnapshot, Credentials, DateRange, HistoryItem, NOT_YET_DRAWN, ProductCode,
    TicketRecord,
};
pub use draw::{WinningDetails, WinningRecord};
pub use pension::{PensionPurchaseResult, PensionTicket, PensionTicketRecord, PensionWinningRecord};
pub use purchase::{EncodedSlot, Game, PurchaseResult, PurchaseSlot, SLOT_LABELS, SelectionMode};
