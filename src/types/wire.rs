//! Raw operator payloads
//!
//! These mirror the JSON the operator returns, field for field. Every field
//! is optional: the operator omits keys freely, and the mapping into the
//! domain records in [`crate::types`] decides what a missing value means.

use super::serde_helpers::{
    deserialize_flexible_i64, deserialize_flexible_i64_vec, deserialize_flexible_string,
};
use serde::Deserialize;

/// `data` of `login/selectRsaModulus.do`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RsaModulusData {
    pub rsa_modulus: Option<String>,
    pub public_exponent: Option<String>,
}

/// `data` of `mypage/selectUserMndp.do`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserMndpData {
    pub user_mndp: Option<UserMndp>,
}

/// Deposit ledger block
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserMndp {
    #[serde(deserialize_with = "deserialize_flexible_i64")]
    pub pnt_dpst_amt: Option<i64>,
    #[serde(deserialize_with = "deserialize_flexible_i64")]
    pub pnt_tkmny_amt: Option<i64>,
    #[serde(deserialize_with = "deserialize_flexible_i64")]
    pub ncsbl_dpst_amt: Option<i64>,
    #[serde(deserialize_with = "deserialize_flexible_i64")]
    pub ncsbl_tkmny_amt: Option<i64>,
    #[serde(deserialize_with = "deserialize_flexible_i64")]
    pub csbl_dpst_amt: Option<i64>,
    #[serde(deserialize_with = "deserialize_flexible_i64")]
    pub csbl_tkmny_amt: Option<i64>,
    /// Amount currently usable for purchases
    #[serde(deserialize_with = "deserialize_flexible_i64")]
    pub crnt_entrs_amt: Option<i64>,
    /// Reserved for scheduled purchases
    #[serde(deserialize_with = "deserialize_flexible_i64")]
    pub rsvt_ordr_amt: Option<i64>,
    /// Pending withdrawal
    #[serde(deserialize_with = "deserialize_flexible_i64")]
    pub daw_aply_amt: Option<i64>,
    #[serde(deserialize_with = "deserialize_flexible_i64")]
    pub fee_amt: Option<i64>,
}

/// `data` of `mypage/selectMyHomeInfo.do`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HomeInfoData {
    pub prchs_lmt_info: Option<PurchaseLimitInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PurchaseLimitInfo {
    #[serde(deserialize_with = "deserialize_flexible_i64")]
    pub wly_prchs_acml_amt: Option<i64>,
}

/// `data` of `mypage/selectMyLotteryledger.do`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LedgerData {
    pub list: Vec<LedgerItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LedgerItem {
    #[serde(deserialize_with = "deserialize_flexible_i64")]
    pub lt_epsd: Option<i64>,
    pub gm_info: Option<String>,
    #[serde(deserialize_with = "deserialize_flexible_string")]
    pub ntsl_ordr_no: Option<String>,
    #[serde(deserialize_with = "deserialize_flexible_i64")]
    pub prchs_qty: Option<i64>,
    pub lt_wn_result: Option<String>,
    #[serde(deserialize_with = "deserialize_flexible_i64")]
    pub lt_wn_amt: Option<i64>,
}

/// `data` of `mypage/lotto645TicketDetail.do` and `mypage/lotto720TicketDetail.do`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TicketDetailData {
    pub ticket: Option<TicketDetail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TicketDetail {
    pub game_dtl: Vec<GameDetail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GameDetail {
    #[serde(deserialize_with = "deserialize_flexible_string")]
    pub idx: Option<String>,
    #[serde(rename = "type", deserialize_with = "deserialize_flexible_string")]
    pub kind: Option<String>,
    /// Lotto 6/45 numbers, or the digits of a Pension 720+ number
    #[serde(deserialize_with = "deserialize_flexible_i64_vec")]
    pub num: Vec<i64>,
}

/// `data` of the round-info endpoints (`lt645/...`, `lt720/...`)
#[derive(Debug, Clone, Deserialize)]
pub struct RoundListData<T> {
    #[serde(default = "Vec::new")]
    pub list: Vec<T>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoundItem {
    #[serde(deserialize_with = "deserialize_flexible_i64")]
    pub lt_epsd: Option<i64>,
    #[serde(deserialize_with = "deserialize_flexible_i64")]
    pub tm1_wn_no: Option<i64>,
    #[serde(deserialize_with = "deserialize_flexible_i64")]
    pub tm2_wn_no: Option<i64>,
    #[serde(deserialize_with = "deserialize_flexible_i64")]
    pub tm3_wn_no: Option<i64>,
    #[serde(deserialize_with = "deserialize_flexible_i64")]
    pub tm4_wn_no: Option<i64>,
    #[serde(deserialize_with = "deserialize_flexible_i64")]
    pub tm5_wn_no: Option<i64>,
    #[serde(deserialize_with = "deserialize_flexible_i64")]
    pub tm6_wn_no: Option<i64>,
    #[serde(deserialize_with = "deserialize_flexible_i64")]
    pub bns_wn_no: Option<i64>,
    pub lt_rfl_ymd: Option<String>,
}

/// Item of `lt720/selectPstLt720Info.do`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PensionRoundItem {
    #[serde(deserialize_with = "deserialize_flexible_i64")]
    pub lt_epsd: Option<i64>,
    /// First-prize group digit
    #[serde(deserialize_with = "deserialize_flexible_string")]
    pub lt_no1_wn_no: Option<String>,
    /// First-prize six digits
    #[serde(deserialize_with = "deserialize_flexible_string")]
    pub tm1_wn_no: Option<String>,
    #[serde(deserialize_with = "deserialize_flexible_i64")]
    pub tm1_prz_amt: Option<i64>,
    #[serde(deserialize_with = "deserialize_flexible_string")]
    pub bns_wn_no: Option<String>,
    pub lt_rfl_ymd: Option<String>,
}

/// Public `common.do?method=getLottoNumber` payload (no envelope)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LottoNumberPayload {
    pub return_value: Option<String>,
    #[serde(deserialize_with = "deserialize_flexible_i64")]
    pub drw_no: Option<i64>,
    pub drw_no_date: Option<String>,
    #[serde(deserialize_with = "deserialize_flexible_i64")]
    pub drwt_no1: Option<i64>,
    #[serde(deserialize_with = "deserialize_flexible_i64")]
    pub drwt_no2: Option<i64>,
    #[serde(deserialize_with = "deserialize_flexible_i64")]
    pub drwt_no3: Option<i64>,
    #[serde(deserialize_with = "deserialize_flexible_i64")]
    pub drwt_no4: Option<i64>,
    #[serde(deserialize_with = "deserialize_flexible_i64")]
    pub drwt_no5: Option<i64>,
    #[serde(deserialize_with = "deserialize_flexible_i64")]
    pub drwt_no6: Option<i64>,
    #[serde(deserialize_with = "deserialize_flexible_i64")]
    pub bnus_no: Option<i64>,
    #[serde(deserialize_with = "deserialize_flexible_i64")]
    pub tot_sellamnt: Option<i64>,
    #[serde(deserialize_with = "deserialize_flexible_i64")]
    pub first_winamnt: Option<i64>,
    #[serde(deserialize_with = "deserialize_flexible_i64")]
    pub first_przwner_co: Option<i64>,
    #[serde(deserialize_with = "deserialize_flexible_i64")]
    pub first_accumamnt: Option<i64>,
}

/// `olotto/game/egovUserReadySocket.json`
#[derive(Debug, Clone, Deserialize)]
pub struct ReadySocket {
    pub ready_ip: String,
}

/// `olotto/game/execBuy.do`
#[derive(Debug, Clone, Deserialize)]
pub struct BuyResponse {
    pub result: BuyResult,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuyResult {
    #[serde(deserialize_with = "deserialize_flexible_string")]
    pub result_code: Option<String>,
    pub result_msg: Option<String>,
    #[serde(deserialize_with = "deserialize_flexible_i64")]
    pub buy_round: Option<i64>,
    pub issue_day: Option<String>,
    pub week_day: Option<String>,
    pub issue_time: Option<String>,
    #[serde(deserialize_with = "deserialize_flexible_string")]
    pub bar_code1: Option<String>,
    #[serde(deserialize_with = "deserialize_flexible_string")]
    pub bar_code2: Option<String>,
    #[serde(deserialize_with = "deserialize_flexible_string")]
    pub bar_code3: Option<String>,
    #[serde(deserialize_with = "deserialize_flexible_string")]
    pub bar_code4: Option<String>,
    #[serde(deserialize_with = "deserialize_flexible_string")]
    pub bar_code5: Option<String>,
    #[serde(deserialize_with = "deserialize_flexible_string")]
    pub bar_code6: Option<String>,
    pub arr_game_choice_num: Option<Vec<String>>,
}

impl BuyResult {
    /// Barcode groups in order; `None` if any group is missing
    pub fn barcode_groups(&self) -> Option<[&str; 6]> {
        Some([
            self.bar_code1.as_deref()?,
            self.bar_code2.as_deref()?,
            self.bar_code3.as_deref()?,
            self.bar_code4.as_deref()?,
            self.bar_code5.as_deref()?,
            self.bar_code6.as_deref()?,
        ])
    }
}
