//! Account data structures
//!
//! Credentials, balance snapshots and purchase-ledger records.

use super::purchase::Game;
use super::wire::{LedgerItem, UserMndp};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ledger result text for tickets whose round has not been drawn yet
pub const NOT_YET_DRAWN: &str = "미추첨";

/// Login credentials. Immutable once built; `Debug` hides the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    identifier: String,
    secret: String,
}

impl Credentials {
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: secret.into(),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Lottery products as identified by the ledger's `ltGdsCd`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductCode {
    /// Lotto 6/45
    Lotto645,
    /// Pension Lottery 720+
    Pension720,
}

impl ProductCode {
    pub fn code(self) -> &'static str {
        match self {
            Self::Lotto645 => "LO40",
            Self::Pension720 => "LT40",
        }
    }
}

/// Inclusive date range for ledger queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The `days` days leading up to and including `end`
    pub fn last_days(end: NaiveDate, days: i64) -> Self {
        Self {
            start: end - Duration::days(days),
            end,
        }
    }

    /// `YYYYMMDD` start/end as the ledger endpoint expects
    pub fn to_query(self) -> (String, String) {
        (
            self.start.format("%Y%m%d").to_string(),
            self.end.format("%Y%m%d").to_string(),
        )
    }
}

/// Account balance at the time of the call. Never cached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    /// Net deposit across all ledgers
    pub total_deposit: i64,
    /// Amount usable for purchases right now
    pub purchasable: i64,
    /// Reserved for scheduled purchases
    pub reserved: i64,
    /// Pending withdrawal requests
    pub withdrawal_pending: i64,
    /// Reserved + pending withdrawal + fees
    pub purchase_blocked: i64,
    /// Purchases accumulated in the current limit period
    pub month_accumulated: i64,
}

impl BalanceSnapshot {
    /// Map the deposit ledger; missing amounts count as zero
    pub fn from_wire(mndp: &UserMndp, month_accumulated: Option<i64>) -> Self {
        let amt = |v: Option<i64>| v.unwrap_or(0);

        let total_deposit = (amt(mndp.pnt_dpst_amt) - amt(mndp.pnt_tkmny_amt))
            + (amt(mndp.ncsbl_dpst_amt) - amt(mndp.ncsbl_tkmny_amt))
            + (amt(mndp.csbl_dpst_amt) - amt(mndp.csbl_tkmny_amt));
        let reserved = amt(mndp.rsvt_ordr_amt);
        let withdrawal_pending = amt(mndp.daw_aply_amt);

        Self {
            total_deposit,
            purchasable: amt(mndp.crnt_entrs_amt),
            reserved,
            withdrawal_pending,
            purchase_blocked: reserved + withdrawal_pending + amt(mndp.fee_amt),
            month_accumulated: amt(month_accumulated),
        }
    }
}

/// One purchase-ledger row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub round: Option<u32>,
    pub barcode: Option<String>,
    pub order_number: Option<String>,
    /// Games in this order; zero when the ledger omits it
    pub quantity: u32,
    /// Draw result text (`미추첨`, `낙첨`, `당첨` ...)
    pub result: String,
    /// Prize amount in KRW; zero when the ledger omits it
    pub prize: i64,
}

impl HistoryItem {
    pub fn is_undrawn(&self) -> bool {
        self.result == NOT_YET_DRAWN
    }
}

impl From<LedgerItem> for HistoryItem {
    fn from(item: LedgerItem) -> Self {
        Self {
            round: item.lt_epsd.and_then(|r| u32::try_from(r).ok()),
            barcode: item.gm_info,
            order_number: item.ntsl_ordr_no,
            quantity: item
                .prchs_qty
                .and_then(|q| u32::try_from(q).ok())
                .unwrap_or(0),
            result: item.lt_wn_result.unwrap_or_default(),
            prize: item.lt_wn_amt.unwrap_or(0),
        }
    }
}

/// A purchased ticket with its receipt lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRecord {
    pub round: Option<u32>,
    pub barcode: Option<String>,
    pub result: String,
    pub games: Vec<Game>,
}
