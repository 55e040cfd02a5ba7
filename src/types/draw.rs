//! Draw result data structures

use super::wire::{LottoNumberPayload, RoundItem};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Winning numbers of one round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinningRecord {
    pub round: u32,
    /// Main numbers in draw order
    pub numbers: [u8; 6],
    pub bonus: u8,
    /// Draw date as reported (`YYYYMMDD`)
    pub draw_date: String,
}

/// Round summary from the public results API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinningDetails {
    pub round: u32,
    pub draw_date: String,
    pub numbers: [u8; 6],
    pub bonus: u8,
    /// Sales and prize figures are `None` when the payload omits them
    pub total_sales: Option<i64>,
    /// Prize per first-prize winner
    pub first_prize_amount: Option<i64>,
    pub first_prize_winners: Option<i64>,
    pub first_prize_total: Option<i64>,
}

fn ball(value: Option<i64>, field: &str) -> Result<u8> {
    value
        .and_then(|v| u8::try_from(v).ok())
        .filter(|v| (1..=45).contains(v))
        .ok_or_else(|| Error::internal(format!("missing or invalid {}", field)))
}

fn round_no(value: Option<i64>) -> Result<u32> {
    value
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| Error::internal("missing round number"))
}

impl TryFrom<RoundItem> for WinningRecord {
    type Error = Error;

    fn try_from(item: RoundItem) -> Result<Self> {
        Ok(Self {
            round: round_no(item.lt_epsd)?,
            numbers: [
                ball(item.tm1_wn_no, "tm1WnNo")?,
                ball(item.tm2_wn_no, "tm2WnNo")?,
                ball(item.tm3_wn_no, "tm3WnNo")?,
                ball(item.tm4_wn_no, "tm4WnNo")?,
                ball(item.tm5_wn_no, "tm5WnNo")?,
                ball(item.tm6_wn_no, "tm6WnNo")?,
            ],
            bonus: ball(item.bns_wn_no, "bnsWnNo")?,
            draw_date: item.lt_rfl_ymd.unwrap_or_default(),
        })
    }
}

impl TryFrom<LottoNumberPayload> for WinningDetails {
    type Error = Error;

    fn try_from(p: LottoNumberPayload) -> Result<Self> {
        Ok(Self {
            round: round_no(p.drw_no)?,
            draw_date: p.drw_no_date.unwrap_or_default(),
            numbers: [
                ball(p.drwt_no1, "drwtNo1")?,
                ball(p.drwt_no2, "drwtNo2")?,
                ball(p.drwt_no3, "drwtNo3")?,
                ball(p.drwt_no4, "drwtNo4")?,
                ball(p.drwt_no5, "drwtNo5")?,
                ball(p.drwt_no6, "drwtNo6")?,
            ],
            bonus: ball(p.bnus_no, "bnusNo")?,
            total_sales: p.tot_sellamnt,
            first_prize_amount: p.first_winamnt,
            first_prize_winners: p.first_przwner_co,
            first_prize_total: p.first_accumamnt,
        })
    }
}
