//! Purchase data structures
//!
//! Caller-facing slot requests, their wire encoding, and the server-confirmed
//! tickets returned after a transaction.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Slot labels in submission order
pub const SLOT_LABELS: [char; 5] = ['A', 'B', 'C', 'D', 'E'];

/// Lowest and highest pickable Lotto 6/45 numbers
pub const MIN_NUMBER: u8 = 1;
pub const MAX_NUMBER: u8 = 45;

/// Numbers per game
pub const NUMBERS_PER_GAME: usize = 6;

/// How the numbers of a slot are chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Server picks all numbers
    Auto,
    /// Caller picks all numbers
    Manual,
    /// Caller picks some numbers, server fills the rest
    SemiAuto,
}

impl SelectionMode {
    /// `genType` code sent to the transaction endpoint
    pub fn to_wire_code(self) -> &'static str {
        match self {
            Self::Auto => "0",
            Self::Manual => "1",
            Self::SemiAuto => "2",
        }
    }

    /// Mode from a confirmation or receipt code.
    ///
    /// Confirmations and receipts report automatic games as `3`; `0` is
    /// accepted too so that every code produced by [`Self::to_wire_code`]
    /// round-trips.
    pub fn from_wire_code(code: &str) -> Option<Self> {
        match code.trim() {
            "0" | "3" => Some(Self::Auto),
            "1" => Some(Self::Manual),
            "2" => Some(Self::SemiAuto),
            _ => None,
        }
    }

    /// Korean label shown on receipts
    pub fn display_label(self) -> &'static str {
        match self {
            Self::Auto => "자동",
            Self::Manual => "수동",
            Self::SemiAuto => "반자동",
        }
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Auto => "auto",
            Self::Manual => "manual",
            Self::SemiAuto => "semi_auto",
        })
    }
}

/// One requested ticket line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseSlot {
    pub mode: SelectionMode,
    /// Picked numbers; may contain duplicates until the engine dedupes them
    #[serde(default)]
    pub numbers: Vec<u8>,
}

impl PurchaseSlot {
    /// Slot where the server picks every number
    pub fn auto() -> Self {
        Self {
            mode: SelectionMode::Auto,
            numbers: Vec::new(),
        }
    }

    /// Slot with every number chosen by the caller
    pub fn manual(numbers: impl IntoIterator<Item = u8>) -> Self {
        Self {
            mode: SelectionMode::Manual,
            numbers: numbers.into_iter().collect(),
        }
    }

    /// Slot with some numbers chosen and the rest filled by the server
    pub fn semi_auto(numbers: impl IntoIterator<Item = u8>) -> Self {
        Self {
            mode: SelectionMode::SemiAuto,
            numbers: numbers.into_iter().collect(),
        }
    }

    /// Unique numbers in ascending order
    pub fn unique_numbers(&self) -> BTreeSet<u8> {
        self.numbers.iter().copied().collect()
    }
}

/// Wire form of a slot inside the transaction `param` JSON array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedSlot {
    #[serde(rename = "genType")]
    pub gen_type: String,
    /// Comma-joined ascending numbers, `null` for automatic slots
    #[serde(rename = "arrGameChoiceNum")]
    pub chosen_numbers: Option<String>,
    /// Operator spells the key this way
    #[serde(rename = "alpabet")]
    pub label: char,
}

/// One confirmed ticket line
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Game {
    pub slot: char,
    pub mode: SelectionMode,
    pub numbers: BTreeSet<u8>,
}

/// Confirmed purchase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseResult {
    pub round: u32,
    /// Six barcode groups joined by spaces
    pub barcode: String,
    /// `issueDay weekDay issueTime` as reported by the server
    pub issued_at: String,
    /// Lines the server accepted, in label order
    pub games: Vec<Game>,
}
