//! Pension Lottery 720+ data structures
//!
//! A pension ticket number is a group digit (`1`..`5`) followed by six
//! digits, e.g. `4123456`. Numbers are always machine-picked, so purchases
//! only carry a ticket count.

use super::wire::PensionRoundItem;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Digits after the group digit
pub const PENSION_DIGITS: usize = 6;
/// Highest group digit
pub const MAX_GROUP: u8 = 5;

/// Validate a full `group + six digits` ticket number
pub fn parse_pension_number(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let mut chars = raw.chars();
    let group = chars.next()?.to_digit(10)?;
    if !(1..=u32::from(MAX_GROUP)).contains(&group) {
        return None;
    }
    let rest = chars.as_str();
    (rest.len() == PENSION_DIGITS && rest.bytes().all(|b| b.is_ascii_digit()))
        .then(|| raw.to_string())
}

/// Six-digit part of a winning number, restoring leading zeros lost when the
/// operator sends it as a JSON number
fn six_digits(raw: &str) -> Option<String> {
    let raw = raw.trim();
    (!raw.is_empty() && raw.len() <= PENSION_DIGITS && raw.bytes().all(|b| b.is_ascii_digit()))
        .then(|| format!("{:0>width$}", raw, width = PENSION_DIGITS))
}

/// First-prize draw of one pension round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PensionWinningRecord {
    pub round: u32,
    /// Draw date as reported (`YYYYMMDD`)
    pub draw_date: String,
    /// Group digit plus six digits
    pub first_prize_number: String,
    /// Monthly first-prize payout; `None` when the payload omits it
    pub first_prize_amount: Option<i64>,
    /// Six-digit bonus number, valid in every group
    pub bonus_number: Option<String>,
}

impl TryFrom<PensionRoundItem> for PensionWinningRecord {
    type Error = Error;

    fn try_from(item: PensionRoundItem) -> Result<Self> {
        let round = item
            .lt_epsd
            .and_then(|r| u32::try_from(r).ok())
            .ok_or_else(|| Error::internal("missing round number"))?;

        let group = item.lt_no1_wn_no.unwrap_or_default();
        let digits = item
            .tm1_wn_no
            .as_deref()
            .and_then(six_digits)
            .ok_or_else(|| Error::internal("missing or invalid tm1WnNo"))?;
        let first_prize_number = parse_pension_number(&format!("{}{}", group.trim(), digits))
            .ok_or_else(|| Error::internal(format!("invalid winning group {:?}", group)))?;

        Ok(Self {
            round,
            draw_date: item.lt_rfl_ymd.unwrap_or_default(),
            first_prize_number,
            first_prize_amount: item.tm1_prz_amt,
            bonus_number: item.bns_wn_no.as_deref().and_then(six_digits),
        })
    }
}

/// One confirmed pension ticket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PensionTicket {
    pub slot: char,
    pub number: String,
}

/// Confirmed pension purchase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PensionPurchaseResult {
    pub round: u32,
    /// Six barcode groups joined by spaces
    pub barcode: String,
    pub issued_at: String,
    pub tickets: Vec<PensionTicket>,
}

/// A purchased pension order with the numbers from its receipt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PensionTicketRecord {
    pub round: Option<u32>,
    pub barcode: Option<String>,
    pub result: String,
    pub numbers: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case::valid("4123456", Some("4123456"))]
    #[case::leading_zero_digits("1000042", Some("1000042"))]
    #[case::group_zero("0123456", None)]
    #[case::group_six("6123456", None)]
    #[case::too_short("412345", None)]
    #[case::letters("41234a6", None)]
    fn test_parse_pension_number(#[case] raw: &str, #[case] expected: Option<&str>) {
        assert_eq!(parse_pension_number(raw).as_deref(), expected);
    }

    #[test]
    fn test_winning_record_from_round_item() {
        let item: PensionRoundItem = serde_json::from_value(json!({
            "ltEpsd": 214, "ltNo1WnNo": "3", "tm1WnNo": 42817,
            "tm1PrzAmt": 7000000, "bnsWnNo": "120385", "ltRflYmd": "20240523"
        }))
        .unwrap();

        let record = PensionWinningRecord::try_from(item).unwrap();
        assert_eq!(record.round, 214);
        assert_eq!(record.first_prize_number, "3042817");
        assert_eq!(record.first_prize_amount, Some(7_000_000));
        assert_eq!(record.bonus_number.as_deref(), Some("120385"));
        assert_eq!(record.draw_date, "20240523");
    }

    #[test]
    fn test_winning_record_missing_prize_stays_unknown() {
        let item: PensionRoundItem = serde_json::from_value(json!({
            "ltEpsd": 214, "ltNo1WnNo": 3, "tm1WnNo": "042817"
        }))
        .unwrap();

        let record = PensionWinningRecord::try_from(item).unwrap();
        assert_eq!(record.first_prize_amount, None);
        assert_eq!(record.bonus_number, None);
    }

    #[test]
    fn test_winning_record_requires_number() {
        let item: PensionRoundItem =
            serde_json::from_value(json!({"ltEpsd": 214, "ltNo1WnNo": "3"})).unwrap();
        let err = PensionWinningRecord::try_from(item).unwrap_err();
        assert!(err.to_string().contains("tm1WnNo"));
    }
}
