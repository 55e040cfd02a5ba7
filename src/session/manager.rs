//! # Session Management Module
//!
//! Owns the HTTP client and cookie jar for one account and drives the login
//! protocol against the operator's site.
//!
//! ## Architecture
//!
//! The [`SessionManager`] orchestrates:
//! - RSA key acquisition (JSON endpoint, login-page scraping as fallback)
//! - Encrypted credential submission and redirect-based success detection
//! - Page-mode normalization (the operator sometimes serves a reduced
//!   "simplified" main page that breaks later API calls)
//! - Authenticated requests with a bounded retry/relogin ladder
//!
//! Authenticated calls are single-flight: a relogin replaces the cookie jar,
//! so two authenticated requests on one client never overlap. Unauthenticated
//! draw queries bypass the gate.
//!
//! ## Examples
//!
//! ```rust,no_run
//! use dhlottery::{Settings, SessionManager, types::Credentials};
//!
//! # tokio_test::block_on(async {
//! let manager = SessionManager::new(Settings::default(), Credentials::new("id", "pw"));
//! manager.login().await?;
//!
//! let data = manager
//!     .authenticated_request("mypage/selectUserMndp.do", &[])
//!     .await?;
//! println!("{}", data);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! # });
//! ```

use super::rsa_key::RsaKeyMaterial;
use super::state::{LoginState, RecoveryStep, RetryBudget, SessionState};
use crate::{
    Error, Result,
    config::Settings,
    types::{Credentials, wire::RsaModulusData},
};
use chrono::{DateTime, Utc};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode, cookie::Jar, redirect};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;

const RSA_MODULUS_PATH: &str = "login/selectRsaModulus.do";
const LOGIN_PAGE_PATH: &str = "login";
const LOGIN_CHECK_PATH: &str = "login/securityLoginCheck.do";
const MAIN_PAGE_PATH: &str = "main";
const LOGIN_SUCCESS_MARKERS: [&str; 2] = ["loginSuccess.do", "/mypage/"];

/// Query parameters for an operator request
pub type Params<'a> = [(&'a str, String)];

/// One client pair sharing a cookie jar.
///
/// `follow` follows redirects (login, normal requests); `direct` does not
/// (forcing the normal page variant, AJAX endpoints).
#[derive(Debug)]
pub struct HttpSession {
    follow: Client,
    direct: Client,
    jar: Arc<Jar>,
}

impl HttpSession {
    fn new(settings: &Settings) -> Result<Self> {
        let jar = Arc::new(Jar::default());
        let headers = browser_headers(settings)?;

        let build = |policy: redirect::Policy| {
            Client::builder()
                .user_agent(settings.network.user_agent.clone())
                .default_headers(headers.clone())
                .cookie_provider(jar.clone())
                .redirect(policy)
                .timeout(settings.network.timeout())
                .build()
        };

        Ok(Self {
            follow: build(redirect::Policy::limited(10))?,
            direct: build(redirect::Policy::none())?,
            jar,
        })
    }

    /// Cookie jar shared by both clients
    pub fn jar(&self) -> &Arc<Jar> {
        &self.jar
    }
}

/// Header set of a desktop Chrome navigation; the operator fingerprints bots
fn browser_headers(settings: &Settings) -> Result<HeaderMap> {
    let base = settings.network.base_url.trim_end_matches('/');
    let value = |v: &str| {
        HeaderValue::from_str(v).map_err(|e| Error::config(format!("Invalid header value: {}", e)))
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        value(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,\
             image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7",
        )?,
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        value(&settings.network.accept_language)?,
    );
    headers.insert(header::CACHE_CONTROL, value("max-age=0")?);
    headers.insert(header::ORIGIN, value(base)?);
    headers.insert(header::REFERER, value(&format!("{}/login", base))?);
    headers.insert(header::UPGRADE_INSECURE_REQUESTS, value("1")?);
    headers.insert(header::DNT, value("1")?);
    headers.insert(
        "sec-ch-ua",
        value(r#""Google Chrome";v="143", "Chromium";v="143", "Not A(Brand";v="24""#)?,
    );
    headers.insert("sec-ch-ua-mobile", value("?0")?);
    headers.insert("sec-ch-ua-platform", value(r#""Windows""#)?);
    headers.insert("Sec-Fetch-Site", value("same-origin")?);
    headers.insert("Sec-Fetch-Mode", value("navigate")?);
    headers.insert("Sec-Fetch-User", value("?1")?);
    headers.insert("Sec-Fetch-Dest", value("document")?);
    Ok(headers)
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Session manager for one account
#[derive(Debug)]
pub struct SessionManager {
    /// Configuration settings
    settings: Arc<Settings>,
    /// Account credentials
    credentials: Credentials,
    /// Live client pair; `None` until first use or after `close()`
    http: RwLock<Option<Arc<HttpSession>>>,
    /// Single-flight gate for authenticated calls
    gate: Mutex<SessionState>,
}

impl SessionManager {
    /// Creates a session manager for `credentials`.
    ///
    /// No network traffic happens here; the client is created on first use.
    pub fn new(settings: Settings, credentials: Credentials) -> Self {
        Self {
            settings: Arc::new(settings),
            credentials,
            http: RwLock::new(None),
            gate: Mutex::new(SessionState::new()),
        }
    }

    /// Creates a session manager using the account section of `settings`
    pub fn from_settings(settings: Settings) -> Result<Self> {
        if !settings.has_credentials() {
            return Err(Error::config("username and password are required"));
        }
        let credentials = Credentials::new(
            settings.account.username.clone(),
            settings.account.password.clone(),
        );
        Ok(Self::new(settings, credentials))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Current login state
    pub async fn state(&self) -> LoginState {
        self.gate.lock().await.state()
    }

    /// Time of the last successful login
    pub async fn last_login_at(&self) -> Option<DateTime<Utc>> {
        self.gate.lock().await.last_login_at()
    }

    /// Current client pair, created on demand
    async fn http(&self) -> Result<Arc<HttpSession>> {
        if let Some(http) = self.http.read().await.as_ref() {
            return Ok(http.clone());
        }

        let mut slot = self.http.write().await;
        if let Some(http) = slot.as_ref() {
            return Ok(http.clone());
        }
        tracing::debug!("Creating HTTP session");
        let http = Arc::new(HttpSession::new(&self.settings)?);
        *slot = Some(http.clone());
        Ok(http)
    }

    async fn drop_http(&self) {
        *self.http.write().await = None;
    }

    fn site_url(&self, path: &str) -> String {
        join_url(&self.settings.network.base_url, path)
    }

    fn game_url(&self, path: &str) -> String {
        join_url(&self.settings.network.game_url, path)
    }

    /// Tear down the client and cookie jar; the next call starts over
    pub async fn close(&self) {
        let mut state = self.gate.lock().await;
        self.drop_http().await;
        state.transition(LoginState::LoggedOut);
        tracing::info!("Session closed");
    }

    /// Log in with the configured credentials
    pub async fn login(&self) -> Result<()> {
        let mut state = self.gate.lock().await;
        self.login_locked(&mut state).await
    }

    /// Login protocol; caller holds the gate
    async fn login_locked(&self, state: &mut SessionState) -> Result<()> {
        tracing::info!("Starting login process...");
        state.transition(LoginState::RsaKeyPending);

        let result = self.submit_credentials(state).await;
        if let Err(e) = &result {
            tracing::error!("Login failed: {}", e);
            state.transition(LoginState::Failed);
        }
        result
    }

    async fn submit_credentials(&self, state: &mut SessionState) -> Result<()> {
        let http = self.http().await?;
        let key = self.fetch_rsa_key(&http).await?;

        let encrypted_id = key.encrypt(self.credentials.identifier())?;
        let encrypted_pw = key.encrypt(self.credentials.secret())?;
        state.transition(LoginState::CredentialsSubmitted);

        let resp = http
            .follow
            .post(self.site_url(LOGIN_CHECK_PATH))
            .form(&[
                ("userId", encrypted_id.as_str()),
                ("userPswdEncn", encrypted_pw.as_str()),
                ("inpUserId", self.credentials.identifier()),
            ])
            .send()
            .await?;

        let status = resp.status();
        let final_url = resp.url().to_string();
        tracing::info!("Login final URL: {} ({})", final_url, status);

        let reached_member_area = LOGIN_SUCCESS_MARKERS
            .iter()
            .any(|marker| final_url.contains(marker));
        if status != StatusCode::OK || !reached_member_area {
            return Err(Error::login(format!(
                "unexpected response {} at {} (invalid credentials or too many attempts)",
                status, final_url
            )));
        }

        state.transition(LoginState::LoggedIn);
        tracing::info!("Login successful!");
        self.normalize_mode(&http).await;
        Ok(())
    }

    /// RSA key from the JSON endpoint, falling back to the login page HTML
    async fn fetch_rsa_key(&self, http: &HttpSession) -> Result<RsaKeyMaterial> {
        match self.fetch_rsa_key_from_api(http).await {
            Ok(key) => {
                tracing::info!("RSA key fetched from API");
                return Ok(key);
            }
            Err(e) => tracing::warn!("API RSA key fetch failed: {}, trying login page", e),
        }

        let html = http
            .follow
            .get(self.site_url(LOGIN_PAGE_PATH))
            .send()
            .await
            .map_err(|e| Error::key_acquisition(format!("login page request failed: {}", e)))?
            .text()
            .await
            .map_err(|e| Error::key_acquisition(format!("login page unreadable: {}", e)))?;

        let key = RsaKeyMaterial::from_login_page(&html)
            .ok_or_else(|| Error::key_acquisition("RSA key not found in login page"))?;
        tracing::info!("RSA key parsed from login page");
        Ok(key)
    }

    async fn fetch_rsa_key_from_api(&self, http: &HttpSession) -> Result<RsaKeyMaterial> {
        let body: Value = http
            .follow
            .get(self.site_url(RSA_MODULUS_PATH))
            .send()
            .await?
            .json()
            .await?;

        let data = body
            .get("data")
            .cloned()
            .ok_or_else(|| Error::key_acquisition("response has no data"))?;
        let data: RsaModulusData = serde_json::from_value(data)?;
        RsaKeyMaterial::from_api(&data)
            .ok_or_else(|| Error::key_acquisition("incomplete RSA key in response"))
    }

    /// Make sure the session is on the normal main-page variant.
    ///
    /// Returns whether the final request landed on 200 or 302. Failures are
    /// logged, never raised.
    async fn normalize_mode(&self, http: &HttpSession) -> bool {
        let url = self.site_url(MAIN_PAGE_PATH);
        let query = [("mainMode", "N")];

        let resp = match http.follow.get(&url).query(&query).send().await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!("Failed to ensure normal page mode: {}", e);
                return false;
            }
        };

        let mut status = resp.status();
        if resp.url().as_str().to_ascii_lowercase().contains("mainmode=y") {
            tracing::warn!(
                "Site redirected to simplified page (mainMode=Y). Retrying with explicit mainMode=N."
            );
            match http.direct.get(&url).query(&query).send().await {
                Ok(resp) => status = resp.status(),
                Err(e) => {
                    tracing::warn!("Failed to force normal page mode: {}", e);
                    return false;
                }
            }
        }

        tracing::debug!("Main page mode ensured: {}", status);
        status == StatusCode::OK || status == StatusCode::FOUND
    }

    /// GET `path` and unwrap the `{data: ...}` envelope.
    ///
    /// Transport failures, non-200 statuses, non-JSON bodies and envelopes
    /// without `data` are all `Error::Api` (retryable). A `null` data field
    /// is an empty object.
    async fn fetch_envelope(&self, client: &Client, path: &str, params: &Params<'_>) -> Result<Value> {
        let resp = client
            .get(self.site_url(path))
            .query(params)
            .send()
            .await
            .map_err(|e| {
                let status = e.status().map(|s| s.as_u16());
                Error::api_with_source(status, format!("request to {} failed", path), e)
            })?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(Error::api(
                Some(status.as_u16()),
                format!("{} returned {}", path, status),
            ));
        }

        let body: Value = resp.json().await.map_err(|e| {
            Error::api_with_source(Some(200), format!("{} returned a non-JSON body", path), e)
        })?;

        match body {
            Value::Object(mut map) => match map.remove("data") {
                Some(Value::Null) => Ok(Value::Object(Default::default())),
                Some(data) => Ok(data),
                None => Err(Error::api(Some(200), format!("{} envelope has no data", path))),
            },
            _ => Err(Error::api(Some(200), format!("{} envelope is not an object", path))),
        }
    }

    /// Authenticated GET with the configured retry budget
    pub async fn authenticated_request(&self, path: &str, params: &Params<'_>) -> Result<Value> {
        self.authenticated_request_with_retries(path, params, self.settings.purchase.max_retries)
            .await
    }

    /// Authenticated GET with an explicit retry budget.
    ///
    /// Runs under the single-flight gate. Logs in first if the session is not
    /// authenticated. On a retryable failure every retry but the last
    /// re-normalizes the page mode; the last one recreates the session and
    /// logs in again. Once the budget is spent the result is
    /// [`Error::LoginRequired`]. Non-retryable errors propagate immediately.
    pub async fn authenticated_request_with_retries(
        &self,
        path: &str,
        params: &Params<'_>,
        max_retries: u32,
    ) -> Result<Value> {
        let mut state = self.gate.lock().await;
        if !state.state().is_authenticated() {
            self.login_locked(&mut state).await?;
        }

        let mut budget = RetryBudget::new(max_retries);
        loop {
            let http = self.http().await?;
            let err = match self.fetch_envelope(&http.follow, path, params).await {
                Ok(data) => return Ok(data),
                Err(e) if e.is_retryable() => e,
                Err(e) => return Err(e),
            };

            match budget.next_step() {
                Some(RecoveryStep::NormalizeMode) => {
                    tracing::info!("API error ({}), retrying after page mode check", err);
                    self.normalize_mode(&http).await;
                }
                Some(RecoveryStep::Relogin) => {
                    tracing::info!("API error ({}), recreating session and logging in again", err);
                    self.drop_http().await;
                    state.transition(LoginState::LoggedOut);
                    self.login_locked(&mut state).await?;
                }
                None => {
                    return Err(Error::LoginRequired {
                        attempts: budget.attempts(),
                        last_error: Box::new(err),
                    });
                }
            }
        }
    }

    /// Unauthenticated GET of an enveloped endpoint; no gate, no retries
    pub async fn public_request(&self, path: &str, params: &Params<'_>) -> Result<Value> {
        let http = self.http().await?;
        self.fetch_envelope(&http.follow, path, params).await
    }

    /// Unauthenticated AJAX GET of an endpoint that answers with bare JSON
    pub async fn public_json(&self, path: &str, params: &Params<'_>) -> Result<Value> {
        let http = self.http().await?;
        let resp = http
            .direct
            .get(self.site_url(path))
            .query(params)
            .header("X-Requested-With", "XMLHttpRequest")
            .header(
                header::ACCEPT,
                "application/json, text/javascript, */*; q=0.01",
            )
            .timeout(self.settings.network.transaction_timeout())
            .send()
            .await?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(Error::api(
                Some(status.as_u16()),
                format!("{} returned {}", path, status),
            ));
        }

        let is_json = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("application/json"));
        if !is_json {
            return Err(Error::api(
                Some(200),
                format!("{} returned HTML instead of JSON", path),
            ));
        }

        Ok(resp.json().await?)
    }

    /// POST a form to the game host under the gate and return status + body.
    ///
    /// No retries: game-host calls are either cheap to redo by the caller or
    /// must not be repeated at all (the transaction).
    pub async fn post_game_form(
        &self,
        path: &str,
        form: &Params<'_>,
        timeout: Option<Duration>,
    ) -> Result<(StatusCode, String)> {
        let mut state = self.gate.lock().await;
        if !state.state().is_authenticated() {
            self.login_locked(&mut state).await?;
        }
        self.send_game_form(path, form, timeout).await
    }

    /// POST a form to the game host on the current session, never logging in.
    ///
    /// Fails with [`Error::Login`] before anything is sent when the session
    /// is not logged in, so a failure here is never a lost transaction.
    pub async fn submit_game_form(
        &self,
        path: &str,
        form: &Params<'_>,
        timeout: Option<Duration>,
    ) -> Result<(StatusCode, String)> {
        let state = self.gate.lock().await;
        if !state.state().is_authenticated() {
            return Err(Error::login(format!(
                "not logged in; {} was not sent",
                path
            )));
        }
        self.send_game_form(path, form, timeout).await
    }

    async fn send_game_form(
        &self,
        path: &str,
        form: &Params<'_>,
        timeout: Option<Duration>,
    ) -> Result<(StatusCode, String)> {
        let http = self.http().await?;
        let mut request = http.follow.post(self.game_url(path)).form(form);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let resp = request.send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        Ok((status, body))
    }

    /// Run `fut` unless `token` fires first.
    ///
    /// The future is dropped on cancellation. The login state only reaches
    /// `LoggedIn` at the very end of a login, so an interrupted login is
    /// re-evaluated by the next call.
    pub async fn cancellable<T, F>(token: &CancellationToken, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(Error::Cancelled),
            result = fut => result,
        }
    }
}
