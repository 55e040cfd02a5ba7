//! Common test utilities and helpers
//!
//! A single wiremock server stands in for both operator hosts. The helpers
//! mount the login protocol and the account/draw endpoints with sensible
//! defaults; individual tests mount overrides first.

#![allow(dead_code)]

use dhlottery::{Settings, session::SessionManager, types::Credentials};
use fake::Fake;
use fake::faker::internet::en::{Password, Username};
use rsa::rand_core::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::{Pkcs1v15Encrypt, RsaPrivateKey};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const RSA_PATH: &str = "/login/selectRsaModulus.do";
pub const LOGIN_PAGE_PATH: &str = "/login";
pub const LOGIN_CHECK_PATH: &str = "/login/securityLoginCheck.do";
pub const LOGIN_SUCCESS_PATH: &str = "/loginSuccess.do";
pub const MAIN_PATH: &str = "/main";
pub const BALANCE_PATH: &str = "/mypage/selectUserMndp.do";
pub const HOME_INFO_PATH: &str = "/mypage/selectMyHomeInfo.do";
pub const LEDGER_PATH: &str = "/mypage/selectMyLotteryledger.do";
pub const TICKET_DETAIL_PATH: &str = "/mypage/lotto645TicketDetail.do";
pub const PENSION_TICKET_DETAIL_PATH: &str = "/mypage/lotto720TicketDetail.do";
pub const ROUND_INFO_PATH: &str = "/lt645/selectPstLt645Info.do";
pub const PENSION_ROUND_INFO_PATH: &str = "/lt720/selectPstLt720Info.do";
pub const PUBLIC_RESULT_PATH: &str = "/common.do";
pub const READY_SOCKET_PATH: &str = "/olotto/game/egovUserReadySocket.json";
pub const EXEC_BUY_PATH: &str = "/olotto/game/execBuy.do";

/// Key pair shared by every test in the binary
pub fn key_pair() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| RsaPrivateKey::new(&mut OsRng, 1024).expect("key generation"))
}

pub fn modulus_hex() -> String {
    hex::encode(key_pair().n().to_bytes_be())
}

pub fn exponent_hex() -> String {
    hex::encode(key_pair().e().to_bytes_be())
}

/// Decrypt a hex ciphertext produced by the client
pub fn decrypt_hex(cipher_hex: &str) -> String {
    let cipher = hex::decode(cipher_hex).expect("hex ciphertext");
    let plain = key_pair()
        .decrypt(Pkcs1v15Encrypt, &cipher)
        .expect("decryptable ciphertext");
    String::from_utf8(plain).expect("utf-8 plaintext")
}

/// Throwaway credentials
pub fn fake_credentials() -> Credentials {
    let username: String = Username().fake();
    let password: String = Password(8..16).fake();
    Credentials::new(username, password)
}

/// Settings pointing both hosts at `server`
pub fn settings_for(server: &MockServer) -> Settings {
    let mut settings = Settings::default();
    settings.network.base_url = server.uri();
    settings.network.game_url = server.uri();
    settings.network.timeout_secs = 5;
    settings.network.transaction_timeout_secs = 5;
    settings
}

pub fn session_for(server: &MockServer) -> Arc<SessionManager> {
    Arc::new(SessionManager::new(settings_for(server), fake_credentials()))
}

/// `{data: ...}` envelope response
pub fn envelope(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "data": data }))
}

/// Decoded `application/x-www-form-urlencoded` body
pub fn form_of(request: &Request) -> HashMap<String, String> {
    url::form_urlencoded::parse(&request.body)
        .into_owned()
        .collect()
}

/// Requests received so far whose path is `wanted`
pub async fn requests_to(server: &MockServer, wanted: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == wanted)
        .collect()
}

/// RSA key endpoint returning the shared test key
pub async fn mount_rsa_api(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(RSA_PATH))
        .respond_with(envelope(json!({
            "rsaModulus": modulus_hex(),
            "publicExponent": exponent_hex(),
        })))
        .mount(server)
        .await;
}

/// Login check redirecting to the success page, and a plain main page
pub async fn mount_login_success(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(LOGIN_CHECK_PATH))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", LOGIN_SUCCESS_PATH))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(LOGIN_SUCCESS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>welcome</html>"))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(MAIN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>main</html>"))
        .mount(server)
        .await;
}

/// Full working login protocol
pub async fn mount_login(server: &MockServer) {
    mount_rsa_api(server).await;
    mount_login_success(server).await;
}

pub async fn mount_balance(server: &MockServer, purchasable: i64) {
    Mock::given(method("GET"))
        .and(path(BALANCE_PATH))
        .respond_with(envelope(json!({
            "userMndp": {
                "pntDpstAmt": 0, "pntTkmnyAmt": 0,
                "ncsblDpstAmt": 0, "ncsblTkmnyAmt": 0,
                "csblDpstAmt": purchasable, "csblTkmnyAmt": 0,
                "crntEntrsAmt": purchasable,
                "rsvtOrdrAmt": 0, "dawAplyAmt": 0, "feeAmt": 0
            }
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(HOME_INFO_PATH))
        .respond_with(envelope(json!({"prchsLmtInfo": {"wlyPrchsAcmlAmt": 0}})))
        .mount(server)
        .await;
}

/// Ledger with one undrawn Lotto 6/45 order of `quantity` games (none when zero)
pub async fn mount_weekly_ledger(server: &MockServer, quantity: u32) {
    mount_product_ledger(server, "LO40", quantity).await;
}

/// Ledger with one undrawn Pension 720+ order of `quantity` tickets
pub async fn mount_pension_ledger(server: &MockServer, quantity: u32) {
    mount_product_ledger(server, "LT40", quantity).await;
}

async fn mount_product_ledger(server: &MockServer, product_code: &str, quantity: u32) {
    let list = if quantity == 0 {
        json!([])
    } else {
        json!([{
            "ltEpsd": 1123, "gmInfo": "59865 36399 04155 63917 56431 42167",
            "ntslOrdrNo": "20240521001", "prchsQty": quantity, "ltWnResult": "미추첨"
        }])
    };
    Mock::given(method("GET"))
        .and(path(LEDGER_PATH))
        .and(query_param("ltGdsCd", product_code))
        .respond_with(envelope(json!({ "list": list })))
        .mount(server)
        .await;
}

pub async fn mount_latest_round(server: &MockServer, round: u32) {
    Mock::given(method("GET"))
        .and(path(ROUND_INFO_PATH))
        .respond_with(envelope(json!({
            "list": [{
                "ltEpsd": round, "tm1WnNo": 3, "tm2WnNo": 6, "tm3WnNo": 21,
                "tm4WnNo": 30, "tm5WnNo": 34, "tm6WnNo": 35, "bnsWnNo": 22,
                "ltRflYmd": "20240525"
            }]
        })))
        .mount(server)
        .await;
}

pub async fn mount_latest_pension_round(server: &MockServer, round: u32) {
    Mock::given(method("GET"))
        .and(path(PENSION_ROUND_INFO_PATH))
        .respond_with(envelope(json!({
            "list": [{
                "ltEpsd": round, "ltNo1WnNo": "3", "tm1WnNo": "042817",
                "tm1PrzAmt": 7000000, "bnsWnNo": "120385", "ltRflYmd": "20240523"
            }]
        })))
        .mount(server)
        .await;
}

pub async fn mount_ready_socket(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(READY_SOCKET_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ready_ip": "172.17.20.52"})))
        .mount(server)
        .await;
}

/// Successful confirmation listing `games`
pub fn confirmation(round: u32, games: &[&str]) -> Value {
    json!({
        "loginYn": "Y",
        "result": {
            "oltInetUserId": "006094875", "issueTime": "10:00:27", "issueDay": "2024/05/28",
            "resultCode": "100", "resultMsg": "SUCCESS", "buyRound": round.to_string(),
            "barCode1": "59865", "barCode2": "36399", "barCode3": "04155",
            "barCode4": "63917", "barCode5": "56431", "barCode6": "42167",
            "arrGameChoiceNum": games, "weekDay": "화", "nBuyAmount": 1000 * games.len()
        }
    })
}

pub async fn mount_exec_buy(server: &MockServer, body: Value) {
    Mock::given(method("POST"))
        .and(path(EXEC_BUY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}
