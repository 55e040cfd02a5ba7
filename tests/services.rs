//! Account and draw service tests against a mock operator

mod common;

use chrono::NaiveDate;
use common::*;
use dhlottery::{
    AccountService, DrawInfoService, Error,
    types::{BalanceSnapshot, DateRange, ProductCode, SelectionMode},
    utils::FixedClock,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn tuesday_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock(
        NaiveDate::from_ymd_opt(2024, 5, 28)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap(),
    ))
}

#[tokio::test]
async fn test_balance_combines_both_endpoints() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path(BALANCE_PATH))
        .respond_with(envelope(json!({
            "userMndp": {
                "pntDpstAmt": 500, "pntTkmnyAmt": 0,
                "ncsblDpstAmt": "2,000", "ncsblTkmnyAmt": 0,
                "csblDpstAmt": 30000, "csblTkmnyAmt": 10000,
                "crntEntrsAmt": 21500, "rsvtOrdrAmt": 1000,
                "dawAplyAmt": 0, "feeAmt": 0
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(HOME_INFO_PATH))
        .respond_with(envelope(json!({"prchsLmtInfo": {"wlyPrchsAcmlAmt": 4000}})))
        .mount(&server)
        .await;

    let service = AccountService::new(session_for(&server));
    let balance = service.get_balance().await.unwrap();

    assert_eq!(
        balance,
        BalanceSnapshot {
            total_deposit: 22500,
            purchasable: 21500,
            reserved: 1000,
            withdrawal_pending: 0,
            purchase_blocked: 1000,
            month_accumulated: 4000,
        }
    );
    // Cache-busting parameter on every call
    let calls = requests_to(&server, BALANCE_PATH).await;
    assert!(calls[0].url.query_pairs().any(|(k, _)| k == "_"));
}

#[tokio::test]
async fn test_purchase_history_query_and_mapping() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path(LEDGER_PATH))
        .and(query_param("srchStrDt", "20240501"))
        .and(query_param("srchEndDt", "20240528"))
        .and(query_param("ltGdsCd", "LT40"))
        .and(query_param("recordCountPerPage", "1000"))
        .respond_with(envelope(json!({
            "list": [
                {"ltEpsd": 210, "gmInfo": "12345", "ntslOrdrNo": 77, "prchsQty": 5,
                 "ltWnResult": "낙첨", "ltWnAmt": 0},
                {"ltEpsd": "211", "prchsQty": 1, "ltWnResult": "미추첨"}
            ]
        })))
        .mount(&server)
        .await;

    let service = AccountService::new(session_for(&server));
    let range = DateRange::new(
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 5, 28).unwrap(),
    );
    let history = service
        .get_purchase_history(ProductCode::Pension720, range)
        .await
        .unwrap();

    assert_eq!(history.len(), 2);
    assert_eq!(history[0].round, Some(210));
    assert_eq!(history[0].order_number.as_deref(), Some("77"));
    assert!(!history[0].is_undrawn());
    assert_eq!(history[1].round, Some(211));
    assert!(history[1].is_undrawn());
}

#[tokio::test]
async fn test_weekly_count_only_counts_undrawn() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path(LEDGER_PATH))
        .and(query_param("srchStrDt", "20240521"))
        .and(query_param("srchEndDt", "20240528"))
        .respond_with(envelope(json!({
            "list": [
                {"ltEpsd": 1123, "prchsQty": 2, "ltWnResult": "미추첨"},
                {"ltEpsd": 1123, "prchsQty": "1", "ltWnResult": "미추첨"},
                {"ltEpsd": 1122, "prchsQty": 5, "ltWnResult": "낙첨"}
            ]
        })))
        .mount(&server)
        .await;

    let service = AccountService::with_clock(session_for(&server), tuesday_clock());
    let count = service
        .get_weekly_purchase_count(ProductCode::Lotto645)
        .await
        .unwrap();

    assert_eq!(count, 3);
}

#[tokio::test]
async fn test_accumulated_prize_uses_winner_filter() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path(LEDGER_PATH))
        .and(query_param("winResult", "T"))
        .and(query_param("srchStrDt", "20230529"))
        .respond_with(envelope(json!({
            "list": [
                {"ltEpsd": 1100, "ltWnResult": "당첨", "ltWnAmt": 5000},
                {"ltEpsd": 1110, "ltWnResult": "당첨", "ltWnAmt": "50,000"}
            ]
        })))
        .mount(&server)
        .await;

    let service = AccountService::with_clock(session_for(&server), tuesday_clock());
    let prize = service
        .get_accumulated_prize(ProductCode::Lotto645)
        .await
        .unwrap();

    assert_eq!(prize, 55000);
}

#[tokio::test]
async fn test_recent_tickets_stop_after_five_games() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path(LEDGER_PATH))
        .respond_with(envelope(json!({
            "list": [
                {"ltEpsd": 1123, "gmInfo": "B1", "ntslOrdrNo": "O1", "prchsQty": 3, "ltWnResult": "미추첨"},
                {"ltEpsd": 1123, "gmInfo": "B2", "ntslOrdrNo": "O2", "prchsQty": 2, "ltWnResult": "미추첨"},
                {"ltEpsd": 1122, "gmInfo": "B3", "ntslOrdrNo": "O3", "prchsQty": 1, "ltWnResult": "낙첨"}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(TICKET_DETAIL_PATH))
        .and(query_param("barcd", "B1"))
        .and(query_param("ntslOrdrNo", "O1"))
        .respond_with(envelope(json!({
            "ticket": {"game_dtl": [
                {"idx": "A", "type": 1, "num": [3, 9, 15, 27, 34, 41]},
                {"idx": "B", "type": 3, "num": [1, 2, 3, 4, 5, 6]},
                {"idx": "C", "num": [7, 8, 9, 10, 11, 12]}
            ]}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(TICKET_DETAIL_PATH))
        .and(query_param("barcd", "B2"))
        .respond_with(envelope(json!({
            "ticket": {"game_dtl": [
                {"idx": "A", "type": "2", "num": ["01", "10", "20", "30", "40", "45"]},
                {"idx": "B", "type": "3", "num": [2, 4, 6, 8, 10, 12]}
            ]}
        })))
        .mount(&server)
        .await;

    let service = AccountService::new(session_for(&server));
    let tickets = service.get_recent_tickets().await.unwrap();

    assert_eq!(tickets.len(), 2);
    assert_eq!(tickets[0].games.len(), 3);
    assert_eq!(tickets[0].games[0].mode, SelectionMode::Manual);
    assert_eq!(tickets[0].games[1].mode, SelectionMode::Auto);
    assert_eq!(tickets[0].games[2].mode, SelectionMode::Auto);
    assert_eq!(tickets[1].games[0].mode, SelectionMode::SemiAuto);
    assert_eq!(
        tickets[1].games[0].numbers.iter().copied().collect::<Vec<_>>(),
        vec![1, 10, 20, 30, 40, 45]
    );
    assert_eq!(tickets[1].barcode.as_deref(), Some("B2"));
    // Third order never fetched
    assert_eq!(requests_to(&server, TICKET_DETAIL_PATH).await.len(), 2);
}

#[tokio::test]
async fn test_round_info_latest_without_login() {
    let server = MockServer::start().await;
    mount_latest_round(&server, 1122).await;

    let service = DrawInfoService::new(session_for(&server));
    let record = service.get_round_info(None).await.unwrap();

    assert_eq!(record.round, 1122);
    assert_eq!(record.numbers, [3, 6, 21, 30, 34, 35]);
    assert_eq!(record.bonus, 22);
    assert_eq!(service.get_latest_round().await.unwrap(), 1122);
    assert!(requests_to(&server, LOGIN_CHECK_PATH).await.is_empty());
}

#[tokio::test]
async fn test_round_info_for_specific_round() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ROUND_INFO_PATH))
        .and(query_param("srchLtEpsd", "1000"))
        .respond_with(envelope(json!({
            "list": [{
                "ltEpsd": 1000, "tm1WnNo": 2, "tm2WnNo": 8, "tm3WnNo": 19,
                "tm4WnNo": 22, "tm5WnNo": 32, "tm6WnNo": 42, "bnsWnNo": 39,
                "ltRflYmd": "20220129"
            }]
        })))
        .mount(&server)
        .await;

    let service = DrawInfoService::new(session_for(&server));
    let record = service.get_round_info(Some(1000)).await.unwrap();

    assert_eq!(record.round, 1000);
    assert_eq!(record.draw_date, "20220129");
}

#[tokio::test]
async fn test_round_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ROUND_INFO_PATH))
        .respond_with(envelope(json!({"list": []})))
        .mount(&server)
        .await;

    let service = DrawInfoService::new(session_for(&server));
    let err = service.get_round_info(Some(99999)).await.unwrap_err();

    assert!(matches!(err, Error::RoundNotFound(_)), "{err:?}");
    assert!(err.to_string().contains("99999"));
}

#[tokio::test]
async fn test_winning_details() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PUBLIC_RESULT_PATH))
        .and(query_param("method", "getLottoNumber"))
        .and(query_param("drwNo", "1119"))
        .and(header("X-Requested-With", "XMLHttpRequest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totSellamnt": 111840714000i64, "returnValue": "success",
            "drwNoDate": "2024-05-11", "firstWinamnt": 1396028764,
            "firstPrzwnerCo": 19, "firstAccumamnt": 26524546516i64, "drwNo": 1119,
            "drwtNo1": 1, "drwtNo2": 9, "drwtNo3": 12, "drwtNo4": 13,
            "drwtNo5": 20, "drwtNo6": 45, "bnusNo": 3
        })))
        .mount(&server)
        .await;

    let service = DrawInfoService::new(session_for(&server));
    let details = service.get_winning_details(Some(1119)).await.unwrap();

    assert_eq!(details.round, 1119);
    assert_eq!(details.numbers, [1, 9, 12, 13, 20, 45]);
    assert_eq!(details.bonus, 3);
    assert_eq!(details.first_prize_amount, Some(1_396_028_764));
    assert_eq!(details.first_prize_winners, Some(19));
}

#[tokio::test]
async fn test_winning_details_failure_modes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PUBLIC_RESULT_PATH))
        .and(query_param("drwNo", "5000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"returnValue": "fail"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(PUBLIC_RESULT_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html>blocked</html>", "text/html;charset=UTF-8"),
        )
        .mount(&server)
        .await;

    let service = DrawInfoService::new(session_for(&server));

    let err = service.get_winning_details(Some(5000)).await.unwrap_err();
    assert!(matches!(err, Error::RoundNotFound(_)), "{err:?}");

    let err = service.get_winning_details(None).await.unwrap_err();
    assert!(matches!(err, Error::Api { .. }), "{err:?}");
}

#[tokio::test]
async fn test_pension_round_info_latest_without_login() {
    let server = MockServer::start().await;
    mount_latest_pension_round(&server, 214).await;

    let service = DrawInfoService::new(session_for(&server));
    let record = service.get_pension_round_info(None).await.unwrap();

    assert_eq!(record.round, 214);
    assert_eq!(record.first_prize_number, "3042817");
    assert_eq!(record.first_prize_amount, Some(7_000_000));
    assert_eq!(record.bonus_number.as_deref(), Some("120385"));
    assert_eq!(service.get_latest_pension_round().await.unwrap(), 214);
    assert!(requests_to(&server, LOGIN_CHECK_PATH).await.is_empty());
    assert!(requests_to(&server, ROUND_INFO_PATH).await.is_empty());
}

#[tokio::test]
async fn test_pension_round_info_for_specific_round() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PENSION_ROUND_INFO_PATH))
        .and(query_param("srchLtEpsd", "200"))
        .respond_with(envelope(json!({
            "list": [{"ltEpsd": "200", "ltNo1WnNo": 5, "tm1WnNo": "918273", "ltRflYmd": "20240215"}]
        })))
        .mount(&server)
        .await;

    let service = DrawInfoService::new(session_for(&server));
    let record = service.get_pension_round_info(Some(200)).await.unwrap();

    assert_eq!(record.round, 200);
    assert_eq!(record.first_prize_number, "5918273");
    assert_eq!(record.first_prize_amount, None);
}

#[tokio::test]
async fn test_pension_round_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PENSION_ROUND_INFO_PATH))
        .respond_with(envelope(json!({"list": []})))
        .mount(&server)
        .await;

    let service = DrawInfoService::new(session_for(&server));
    let err = service.get_pension_round_info(Some(9999)).await.unwrap_err();

    assert!(matches!(err, Error::RoundNotFound(_)), "{err:?}");
}

#[tokio::test]
async fn test_pension_tickets_stop_after_five_orders() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    let orders: Vec<_> = (1..=6)
        .map(|i| {
            json!({
                "ltEpsd": 215, "gmInfo": format!("P{}", i), "ntslOrdrNo": format!("N{}", i),
                "prchsQty": 1, "ltWnResult": "미추첨"
            })
        })
        .collect();
    Mock::given(method("GET"))
        .and(path(LEDGER_PATH))
        .and(query_param("ltGdsCd", "LT40"))
        .respond_with(envelope(json!({ "list": orders })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(PENSION_TICKET_DETAIL_PATH))
        .and(query_param("barcd", "P1"))
        .respond_with(envelope(json!({
            "ticket": {"game_dtl": [
                {"idx": "A", "num": [4, 1, 2, 3, 4, 5, 6]},
                {"idx": "B", "num": ["1", "0", "0", "0", "0", "4", "2"]},
                {"idx": "C", "num": []}
            ]}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(PENSION_TICKET_DETAIL_PATH))
        .respond_with(envelope(json!({
            "ticket": {"game_dtl": [{"idx": "A", "num": [2, 0, 0, 0, 0, 0, 1]}]}
        })))
        .mount(&server)
        .await;

    let service = AccountService::with_clock(session_for(&server), tuesday_clock());
    let tickets = service.get_pension_tickets().await.unwrap();

    assert_eq!(tickets.len(), 5);
    assert_eq!(tickets[0].numbers, vec!["4123456", "1000042"]);
    assert_eq!(tickets[0].barcode.as_deref(), Some("P1"));
    assert_eq!(tickets[4].numbers, vec!["2000001"]);
    assert_eq!(requests_to(&server, PENSION_TICKET_DETAIL_PATH).await.len(), 5);
    assert!(requests_to(&server, TICKET_DETAIL_PATH).await.is_empty());
}

#[tokio::test]
async fn test_pension_receipt_with_bad_number_fails() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path(LEDGER_PATH))
        .respond_with(envelope(json!({
            "list": [{"ltEpsd": 215, "gmInfo": "P1", "ntslOrdrNo": "N1", "ltWnResult": "미추첨"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(PENSION_TICKET_DETAIL_PATH))
        .respond_with(envelope(json!({
            "ticket": {"game_dtl": [{"idx": "A", "num": [9, 1, 2]}]}
        })))
        .mount(&server)
        .await;

    let service = AccountService::new(session_for(&server));
    let err = service.get_pension_tickets().await.unwrap_err();

    assert!(err.to_string().contains("912"), "{err}");
}
