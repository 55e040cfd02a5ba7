//! Purchase engine for Lotto 6/45 and Pension 720+
//!
//! Runs the validation stages from [`super::rules`] in order, then resolves
//! the target round, obtains the readiness token and submits the
//! transaction. Everything before the transaction POST is safe to retry;
//! anything going wrong after it is reported as
//! [`Error::AmbiguousPurchase`] because tickets may have been issued.

use super::{codec, rules};
use crate::{
    Error, Result,
    services::{AccountService, DrawInfoService},
    session::SessionManager,
    types::{
        PensionPurchaseResult, ProductCode, PurchaseResult, PurchaseSlot,
        wire::{BuyResponse, BuyResult, ReadySocket},
    },
    utils::{Clock, KstClock},
};
use reqwest::StatusCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const READY_SOCKET_PATH: &str = "olotto/game/egovUserReadySocket.json";
const EXEC_BUY_PATH: &str = "olotto/game/execBuy.do";
/// Internet sales channel
const SALE_MEDIA_CODE: &str = "10";

/// Purchase engine with a pluggable clock
#[derive(Debug)]
pub struct PurchaseEngine<C: Clock = KstClock> {
    session: Arc<SessionManager>,
    account: AccountService,
    draws: DrawInfoService,
    clock: Arc<C>,
}

impl PurchaseEngine<KstClock> {
    /// Engine reading the time in KST
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self::new_with_clock(session, KstClock)
    }
}

impl<C: Clock + 'static> PurchaseEngine<C> {
    /// Engine reading the time from `clock`
    pub fn new_with_clock(session: Arc<SessionManager>, clock: C) -> Self {
        let clock = Arc::new(clock);
        Self {
            account: AccountService::with_clock(session.clone(), clock.clone()),
            draws: DrawInfoService::new(session.clone()),
            session,
            clock,
        }
    }

    /// Buy up to `slots.len()` games for the next round.
    ///
    /// The request is silently capped by the remaining weekly quota and by
    /// `max_games`; inspect `games` on the result for what was bought.
    /// Calling this twice buys twice.
    pub async fn buy(
        &self,
        slots: &[PurchaseSlot],
        max_games: Option<usize>,
    ) -> Result<PurchaseResult> {
        self.buy_with_cancellation(slots, max_games, &CancellationToken::new())
            .await
    }

    /// [`Self::buy`] that stops when `token` is cancelled.
    ///
    /// Cancellation before the transaction is sent yields
    /// [`Error::Cancelled`]; cancellation while it is in flight yields
    /// [`Error::AmbiguousPurchase`].
    pub async fn buy_with_cancellation(
        &self,
        slots: &[PurchaseSlot],
        max_games: Option<usize>,
        token: &CancellationToken,
    ) -> Result<PurchaseResult> {
        let limits = &self.session.settings().purchase;
        tracing::debug!("Buy request: {:?}", slots);

        let slots = rules::dedupe(slots);
        rules::SalesWindow::for_product(ProductCode::Lotto645).check(self.clock.now())?;
        rules::check_slots(&slots, limits.max_slots)?;

        let available = self.weekly_quota(ProductCode::Lotto645, token).await?;
        let count = rules::effective_count(slots.len(), available, max_games)?;
        let amount = self.affordable(count, token).await?;
        let slots = &slots[..count];

        let round =
            SessionManager::cancellable(token, self.draws.get_latest_round()).await? + 1;
        let param = codec::encode_param(slots)?;

        let confirmation = self.transact(round, count, amount, param, token).await?;
        let result = codec::parse_purchase_result(&confirmation).map_err(|e| {
            Error::ambiguous_purchase(round, "incomplete transaction confirmation", Some(e))
        })?;
        tracing::info!(
            "Purchase confirmed: round {}, {} game(s), barcode {}",
            result.round,
            result.games.len(),
            result.barcode
        );
        Ok(result)
    }

    /// Buy up to `count` Pension 720+ tickets for the next pension round.
    ///
    /// Numbers are machine-picked. The count is capped by the remaining
    /// weekly pension quota the same way [`Self::buy`] caps games.
    pub async fn buy_pension(&self, count: usize) -> Result<PensionPurchaseResult> {
        self.buy_pension_with_cancellation(count, &CancellationToken::new())
            .await
    }

    /// [`Self::buy_pension`] that stops when `token` is cancelled
    pub async fn buy_pension_with_cancellation(
        &self,
        count: usize,
        token: &CancellationToken,
    ) -> Result<PensionPurchaseResult> {
        let limits = &self.session.settings().purchase;
        tracing::debug!("Pension buy request: {} ticket(s)", count);

        rules::SalesWindow::for_product(ProductCode::Pension720).check(self.clock.now())?;
        rules::check_ticket_count(count, limits.max_slots)?;

        let available = self.weekly_quota(ProductCode::Pension720, token).await?;
        let count = rules::effective_count(count, available, None)?;
        let amount = self.affordable(count, token).await?;

        let round = SessionManager::cancellable(token, self.draws.get_latest_pension_round())
            .await?
            + 1;
        let param = codec::encode_pension_param(count)?;

        let confirmation = self.transact(round, count, amount, param, token).await?;
        let result = codec::parse_pension_result(&confirmation).map_err(|e| {
            Error::ambiguous_purchase(round, "incomplete transaction confirmation", Some(e))
        })?;
        tracing::info!(
            "Pension purchase confirmed: round {}, {} ticket(s), barcode {}",
            result.round,
            result.tickets.len(),
            result.barcode
        );
        Ok(result)
    }

    async fn weekly_quota(
        &self,
        product: ProductCode,
        token: &CancellationToken,
    ) -> Result<usize> {
        let limit = self.session.settings().purchase.weekly_limit;
        let purchased = SessionManager::cancellable(
            token,
            self.account.get_weekly_purchase_count(product),
        )
        .await?;
        let available = rules::remaining_quota(purchased, limit)?;
        tracing::debug!("Weekly quota: {} bought, {} available", purchased, available);
        Ok(available as usize)
    }

    /// Price of `count` games, checked against a fresh balance
    async fn affordable(&self, count: usize, token: &CancellationToken) -> Result<i64> {
        let unit_price = self.session.settings().purchase.unit_price;
        let balance = SessionManager::cancellable(token, self.account.get_balance()).await?;
        Ok(rules::check_balance(count, unit_price, balance.purchasable)?)
    }

    /// Obtain the readiness token and send the transaction.
    ///
    /// Returns the confirmation once the server accepted it. Every failure
    /// after the POST may have started is [`Error::AmbiguousPurchase`].
    async fn transact(
        &self,
        round: u32,
        count: usize,
        amount: i64,
        param: String,
        token: &CancellationToken,
    ) -> Result<BuyResult> {
        let direct = SessionManager::cancellable(token, self.ready_socket()).await?;
        if token.is_cancelled() {
            return Err(Error::Cancelled);
        }

        tracing::info!(
            "Submitting purchase of {} ticket(s) for round {} ({} KRW)",
            count,
            round,
            amount
        );
        let form = [
            ("round", round.to_string()),
            ("direct", direct),
            ("nBuyAmount", amount.to_string()),
            ("param", param),
            ("gameCnt", count.to_string()),
            ("saleMdaDcd", SALE_MEDIA_CODE.to_string()),
        ];
        let timeout = self.session.settings().network.transaction_timeout();
        let exec = self
            .session
            .submit_game_form(EXEC_BUY_PATH, &form, Some(timeout));

        let response = tokio::select! {
            biased;
            _ = token.cancelled() => {
                return Err(Error::ambiguous_purchase(
                    round,
                    "cancelled while the transaction was in flight",
                    None,
                ));
            }
            response = exec => response,
        };

        let (status, body) = match response {
            Ok(response) => response,
            // Never reached the server
            Err(Error::Network(e)) if e.is_connect() => return Err(Error::Network(e)),
            Err(e @ Error::Login(_)) => return Err(e),
            Err(e) => {
                return Err(Error::ambiguous_purchase(
                    round,
                    "transaction response was lost",
                    Some(e),
                ));
            }
        };

        self.decode_confirmation(round, status, &body)
    }

    fn decode_confirmation(
        &self,
        round: u32,
        status: StatusCode,
        body: &str,
    ) -> Result<BuyResult> {
        if status != StatusCode::OK {
            return Err(Error::ambiguous_purchase(
                round,
                format!("transaction endpoint returned {}", status),
                None,
            ));
        }

        let response: BuyResponse = serde_json::from_str(body).map_err(|e| {
            Error::ambiguous_purchase(round, "unreadable transaction response", Some(e.into()))
        })?;

        let code = response.result.result_code.as_deref().unwrap_or_default();
        if code != codec::SUCCESS_CODE {
            let message = response
                .result
                .result_msg
                .clone()
                .unwrap_or_else(|| format!("result code {:?}", code));
            tracing::warn!("Purchase rejected by server: {}", message);
            return Err(crate::error::PurchaseRejection::ServerRejected { message }.into());
        }

        Ok(response.result)
    }

    /// Session-scoped `direct` token required by the transaction endpoint
    async fn ready_socket(&self) -> Result<String> {
        let (status, body) = self
            .session
            .post_game_form(READY_SOCKET_PATH, &[], None)
            .await?;
        if status != StatusCode::OK {
            return Err(Error::api(
                Some(status.as_u16()),
                format!("readiness endpoint returned {}", status),
            ));
        }
        let socket: ReadySocket = serde_json::from_str(&body)?;
        Ok(socket.ready_ip)
    }
}
