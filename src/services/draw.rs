//! Draw result queries
//!
//! Round information is public, so these calls skip the session gate and may
//! run concurrently with authenticated requests.

use crate::{
    Error, Result,
    session::SessionManager,
    types::{
        PensionWinningRecord, WinningDetails, WinningRecord,
        wire::{LottoNumberPayload, PensionRoundItem, RoundItem, RoundListData},
    },
    utils::clock::cache_buster,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;

const ROUND_INFO_PATH: &str = "lt645/selectPstLt645Info.do";
const PENSION_ROUND_INFO_PATH: &str = "lt720/selectPstLt720Info.do";
const PUBLIC_RESULT_PATH: &str = "common.do";

/// Lotto 6/45 and Pension 720+ draw results
#[derive(Debug, Clone)]
pub struct DrawInfoService {
    session: Arc<SessionManager>,
}

impl DrawInfoService {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    /// First item of a round-info list; `round` of `None` asks for the latest
    async fn first_round<T>(&self, path: &str, round: Option<u32>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let mut params = vec![("_", cache_buster().to_string())];
        if let Some(round) = round {
            params.push(("srchLtEpsd", round.to_string()));
        }

        let data = self.session.public_request(path, &params).await?;
        let rounds: RoundListData<T> = serde_json::from_value(data)
            .map_err(|e| Error::internal(format!("Unexpected round payload: {}", e)))?;

        rounds.list.into_iter().next().ok_or_else(|| match round {
            Some(round) => Error::round_not_found(format!("round {}", round)),
            None => Error::round_not_found("latest round"),
        })
    }

    /// Winning numbers of `round`, or of the latest drawn round when `None`
    pub async fn get_round_info(&self, round: Option<u32>) -> Result<WinningRecord> {
        let item: RoundItem = self.first_round(ROUND_INFO_PATH, round).await?;
        WinningRecord::try_from(item)
    }

    /// Number of the latest drawn round
    pub async fn get_latest_round(&self) -> Result<u32> {
        Ok(self.get_round_info(None).await?.round)
    }

    /// Pension 720+ first-prize number of `round` (latest when `None`)
    pub async fn get_pension_round_info(
        &self,
        round: Option<u32>,
    ) -> Result<PensionWinningRecord> {
        let item: PensionRoundItem = self.first_round(PENSION_ROUND_INFO_PATH, round).await?;
        PensionWinningRecord::try_from(item)
    }

    /// Number of the latest drawn Pension 720+ round
    pub async fn get_latest_pension_round(&self) -> Result<u32> {
        Ok(self.get_pension_round_info(None).await?.round)
    }

    /// Sales and first-prize figures of `round` (latest when `None`)
    pub async fn get_winning_details(&self, round: Option<u32>) -> Result<WinningDetails> {
        let mut params = vec![("method", "getLottoNumber".to_string())];
        if let Some(round) = round {
            params.push(("drwNo", round.to_string()));
        }

        let body = self.session.public_json(PUBLIC_RESULT_PATH, &params).await?;
        let payload: LottoNumberPayload = serde_json::from_value(body)?;
        if payload.return_value.as_deref() != Some("success") {
            let label = round.map_or_else(|| "latest round".to_string(), |r| format!("round {}", r));
            return Err(Error::round_not_found(format!("no winning details for {}", label)));
        }
        WinningDetails::try_from(payload)
    }
}
