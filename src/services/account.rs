//! Account queries: balance, purchase ledger and ticket receipts

use crate::{
    Error, Result,
    session::SessionManager,
    types::{
        BalanceSnapshot, DateRange, Game, HistoryItem, PensionTicketRecord, ProductCode,
        SelectionMode, TicketRecord,
        pension::parse_pension_number,
        purchase::{MAX_NUMBER, MIN_NUMBER},
        wire::{GameDetail, HomeInfoData, LedgerData, TicketDetailData, UserMndpData},
    },
    utils::{Clock, KstClock, clock::cache_buster},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;

const BALANCE_PATH: &str = "mypage/selectUserMndp.do";
const HOME_INFO_PATH: &str = "mypage/selectMyHomeInfo.do";
const LEDGER_PATH: &str = "mypage/selectMyLotteryledger.do";
const TICKET_DETAIL_PATH: &str = "mypage/lotto645TicketDetail.do";
const PENSION_TICKET_DETAIL_PATH: &str = "mypage/lotto720TicketDetail.do";

/// Ledger page size; one page covers any realistic range
const LEDGER_PAGE_SIZE: u32 = 1000;
/// Receipt walk stops once this many games are collected
const RECENT_GAMES_LIMIT: usize = 5;
/// Pension receipt walk stops after this many orders
const RECENT_PENSION_ORDERS_LIMIT: usize = 5;
/// Receipts omit the type for automatic games
const RECEIPT_AUTO_CODE: &str = "3";

fn decode<T: DeserializeOwned>(data: Value, what: &str) -> Result<T> {
    serde_json::from_value(data)
        .map_err(|e| Error::internal(format!("Unexpected {} payload: {}", what, e)))
}

/// Balance and purchase-ledger queries for one account
#[derive(Clone)]
pub struct AccountService {
    session: Arc<SessionManager>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for AccountService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountService").finish_non_exhaustive()
    }
}

impl AccountService {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self::with_clock(session, Arc::new(KstClock))
    }

    /// Service whose date ranges end on `clock`'s current date
    pub fn with_clock(session: Arc<SessionManager>, clock: Arc<dyn Clock>) -> Self {
        Self { session, clock }
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    /// Fresh balance snapshot (two authenticated calls, never cached)
    pub async fn get_balance(&self) -> Result<BalanceSnapshot> {
        let data = self
            .session
            .authenticated_request(BALANCE_PATH, &[("_", cache_buster().to_string())])
            .await?;
        let mndp = decode::<UserMndpData>(data, "balance")?
            .user_mndp
            .unwrap_or_default();

        let data = self
            .session
            .authenticated_request(HOME_INFO_PATH, &[("_", cache_buster().to_string())])
            .await?;
        let month_accumulated = decode::<HomeInfoData>(data, "home info")?
            .prchs_lmt_info
            .and_then(|info| info.wly_prchs_acml_amt);

        let balance = BalanceSnapshot::from_wire(&mndp, month_accumulated);
        tracing::debug!(
            "Balance: purchasable={} total={}",
            balance.purchasable,
            balance.total_deposit
        );
        Ok(balance)
    }

    /// Purchase ledger for `product` within `range`
    pub async fn get_purchase_history(
        &self,
        product: ProductCode,
        range: DateRange,
    ) -> Result<Vec<HistoryItem>> {
        self.ledger(product, range, false).await
    }

    async fn ledger(
        &self,
        product: ProductCode,
        range: DateRange,
        winners_only: bool,
    ) -> Result<Vec<HistoryItem>> {
        let (start, end) = range.to_query();
        let mut params = vec![
            ("srchStrDt", start),
            ("srchEndDt", end),
            ("ltGdsCd", product.code().to_string()),
            ("pageNum", "1".to_string()),
        ];
        if winners_only {
            params.push(("winResult", "T".to_string()));
        }
        params.push(("recordCountPerPage", LEDGER_PAGE_SIZE.to_string()));
        params.push(("_", cache_buster().to_string()));

        let data = self.session.authenticated_request(LEDGER_PATH, &params).await?;
        let ledger: LedgerData = decode(data, "ledger")?;
        Ok(ledger.list.into_iter().map(HistoryItem::from).collect())
    }

    /// Games bought in the last 7 days that have not been drawn yet
    pub async fn get_weekly_purchase_count(&self, product: ProductCode) -> Result<u32> {
        let range = DateRange::last_days(self.clock.now().date(), 7);
        let history = self.get_purchase_history(product, range).await?;
        let count: u32 = history
            .iter()
            .filter(|item| item.is_undrawn())
            .map(|item| item.quantity)
            .sum();
        tracing::debug!("Weekly purchase count for {}: {}", product.code(), count);
        Ok(count)
    }

    /// Prize total of winning tickets over the last year
    pub async fn get_accumulated_prize(&self, product: ProductCode) -> Result<i64> {
        let range = DateRange::last_days(self.clock.now().date(), 365);
        let winners = self.ledger(product, range, true).await?;
        Ok(winners.iter().map(|item| item.prize).sum())
    }

    /// This week's Lotto 6/45 tickets with their receipt lines.
    ///
    /// Stops fetching receipts once five games have been collected.
    pub async fn get_recent_tickets(&self) -> Result<Vec<TicketRecord>> {
        let range = DateRange::last_days(self.clock.now().date(), 7);
        let history = self
            .get_purchase_history(ProductCode::Lotto645, range)
            .await?;

        let mut tickets = Vec::new();
        let mut collected = 0;
        for item in history {
            let games = match (&item.order_number, &item.barcode) {
                (Some(order), Some(barcode)) => self.fetch_receipt(order, barcode).await?,
                _ => Vec::new(),
            };
            collected += games.len();
            tickets.push(TicketRecord {
                round: item.round,
                barcode: item.barcode,
                result: item.result,
                games,
            });
            if collected >= RECENT_GAMES_LIMIT {
                break;
            }
        }
        Ok(tickets)
    }

    /// This week's Pension 720+ orders with the numbers on their receipts.
    ///
    /// Stops after five orders.
    pub async fn get_pension_tickets(&self) -> Result<Vec<PensionTicketRecord>> {
        let range = DateRange::last_days(self.clock.now().date(), 7);
        let history = self
            .get_purchase_history(ProductCode::Pension720, range)
            .await?;

        let mut tickets = Vec::new();
        for item in history.into_iter().take(RECENT_PENSION_ORDERS_LIMIT) {
            let numbers = match (&item.order_number, &item.barcode) {
                (Some(order), Some(barcode)) => {
                    self.fetch_pension_receipt(order, barcode).await?
                }
                _ => Vec::new(),
            };
            tickets.push(PensionTicketRecord {
                round: item.round,
                barcode: item.barcode,
                result: item.result,
                numbers,
            });
        }
        Ok(tickets)
    }

    async fn receipt_lines(
        &self,
        path: &str,
        order_number: &str,
        barcode: &str,
    ) -> Result<Vec<GameDetail>> {
        let params = [
            ("ntslOrdrNo", order_number.to_string()),
            ("barcd", barcode.to_string()),
            ("_", cache_buster().to_string()),
        ];
        let data = self.session.authenticated_request(path, &params).await?;
        let detail: TicketDetailData = decode(data, "ticket detail")?;
        Ok(detail.ticket.map(|t| t.game_dtl).unwrap_or_default())
    }

    async fn fetch_receipt(&self, order_number: &str, barcode: &str) -> Result<Vec<Game>> {
        let lines = self
            .receipt_lines(TICKET_DETAIL_PATH, order_number, barcode)
            .await?;
        lines
            .into_iter()
            .map(|line| -> Result<Game> {
                let code = line.kind.as_deref().unwrap_or(RECEIPT_AUTO_CODE);
                let mode = SelectionMode::from_wire_code(code).ok_or_else(|| {
                    Error::internal(format!("Unknown receipt game type: {}", code))
                })?;
                let slot = line
                    .idx
                    .as_deref()
                    .and_then(|idx| idx.chars().next())
                    .ok_or_else(|| Error::internal("Receipt game without slot label"))?;
                let numbers: BTreeSet<u8> = line
                    .num
                    .iter()
                    .map(|&n| {
                        u8::try_from(n)
                            .ok()
                            .filter(|n| (MIN_NUMBER..=MAX_NUMBER).contains(n))
                            .ok_or_else(|| {
                                Error::internal(format!("Receipt number out of range: {}", n))
                            })
                    })
                    .collect::<Result<_>>()?;
                Ok(Game {
                    slot,
                    mode,
                    numbers,
                })
            })
            .collect()
    }

    /// Receipt lines of a pension order as `group + six digits` strings
    async fn fetch_pension_receipt(
        &self,
        order_number: &str,
        barcode: &str,
    ) -> Result<Vec<String>> {
        let lines = self
            .receipt_lines(PENSION_TICKET_DETAIL_PATH, order_number, barcode)
            .await?;
        lines
            .into_iter()
            .filter(|line| !line.num.is_empty())
            .map(|line| {
                let joined: String = line.num.iter().map(i64::to_string).collect();
                parse_pension_number(&joined).ok_or_else(|| {
                    Error::internal(format!("Invalid pension receipt number: {}", joined))
                })
            })
            .collect()
    }
}
