//! Purchase validation stages
//!
//! Each stage is a pure function returning `Result<_, PurchaseRejection>`, so
//! callers (and tests) can tell exactly which rule rejected a request. The
//! engine runs them in a fixed order and fetches the inputs that need the
//! network.

use crate::error::PurchaseRejection;
use crate::types::purchase::{MAX_NUMBER, MIN_NUMBER, NUMBERS_PER_GAME};
use crate::types::{ProductCode, PurchaseSlot, SLOT_LABELS, SelectionMode};
use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};

type RuleResult<T> = std::result::Result<T, PurchaseRejection>;

/// Opening hour of the daily sales window
const SALES_OPEN_HOUR: u32 = 6;
/// Saturday hour from which Lotto 6/45 sales stop for the draw
const SATURDAY_CUTOFF_HOUR: u32 = 20;
/// Thursday hours during which Pension 720+ sales stop for the draw
const THURSDAY_PAUSE_HOURS: std::ops::Range<u32> = 17..22;

/// Sales hours of a product, in operator-local time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SalesWindow {
    product: ProductCode,
}

impl SalesWindow {
    pub fn for_product(product: ProductCode) -> Self {
        Self { product }
    }

    /// Reject `now` if it falls outside the window
    pub fn check(&self, now: NaiveDateTime) -> RuleResult<()> {
        let hour = now.hour();
        if hour < SALES_OPEN_HOUR {
            return Err(PurchaseRejection::OutsideSalesWindow {
                reason: "sales are closed between 00:00 and 06:00".to_string(),
            });
        }

        match (self.product, now.weekday()) {
            (ProductCode::Lotto645, Weekday::Sat) if hour >= SATURDAY_CUTOFF_HOUR => {
                Err(PurchaseRejection::OutsideSalesWindow {
                    reason: "Saturday sales close at 20:00 and reopen Sunday 06:00".to_string(),
                })
            }
            (ProductCode::Pension720, Weekday::Thu) if THURSDAY_PAUSE_HOURS.contains(&hour) => {
                Err(PurchaseRejection::OutsideSalesWindow {
                    reason: "Thursday sales pause between 17:00 and 22:00".to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}

/// Copy of `slots` with each slot's numbers deduplicated and sorted
pub fn dedupe(slots: &[PurchaseSlot]) -> Vec<PurchaseSlot> {
    slots
        .iter()
        .map(|slot| PurchaseSlot {
            mode: slot.mode,
            numbers: slot.unique_numbers().into_iter().collect(),
        })
        .collect()
}

/// Ticket count within `1..=max_slots` (never more than five per transaction)
pub fn check_ticket_count(count: usize, max_slots: usize) -> RuleResult<()> {
    let max = max_slots.min(SLOT_LABELS.len());
    if count == 0 || count > max {
        return Err(PurchaseRejection::InvalidSlotCount { count, max });
    }
    Ok(())
}

/// Slot count within `1..=max_slots`, and picked numbers within the 6/45 rules
pub fn check_slots(slots: &[PurchaseSlot], max_slots: usize) -> RuleResult<()> {
    check_ticket_count(slots.len(), max_slots)?;

    for (slot, label) in slots.iter().zip(SLOT_LABELS) {
        if slot.mode == SelectionMode::Auto {
            continue;
        }
        if slot.numbers.len() > NUMBERS_PER_GAME {
            return Err(PurchaseRejection::TooManyNumbers {
                slot: label,
                count: slot.numbers.len(),
            });
        }
        if let Some(&number) = slot
            .numbers
            .iter()
            .find(|n| !(MIN_NUMBER..=MAX_NUMBER).contains(*n))
        {
            return Err(PurchaseRejection::NumberOutOfRange {
                slot: label,
                number,
            });
        }
    }
    Ok(())
}

/// Games still purchasable this week
pub fn remaining_quota(purchased: u32, limit: u32) -> RuleResult<u32> {
    if purchased >= limit {
        return Err(PurchaseRejection::WeeklyLimitReached { purchased, limit });
    }
    Ok(limit - purchased)
}

/// Number of slots that will actually be submitted
pub fn effective_count(
    requested: usize,
    available: usize,
    max_games: Option<usize>,
) -> RuleResult<usize> {
    if max_games == Some(0) {
        return Err(PurchaseRejection::InvalidSlotCount {
            count: 0,
            max: requested,
        });
    }
    let count = requested
        .min(available)
        .min(max_games.unwrap_or(requested));
    Ok(count)
}

/// Cost of `count` games, rejected if it exceeds `purchasable`
pub fn check_balance(count: usize, unit_price: i64, purchasable: i64) -> RuleResult<i64> {
    let required = unit_price.saturating_mul(i64::try_from(count).unwrap_or(i64::MAX));
    if required > purchasable {
        return Err(PurchaseRejection::InsufficientBalance {
            required,
            available: purchasable,
        });
    }
    Ok(required)
}
