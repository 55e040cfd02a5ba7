//! DH Lottery client - Rust Implementation
//!
//! An async client for the Korean DH Lottery website: logs in with
//! RSA-encrypted credentials, keeps the session usable despite the site's
//! page-variant switching, queries balance, purchase ledger and draw results,
//! and buys Lotto 6/45 and Pension 720+ tickets under the operator's
//! business rules.
//!
//! # Architecture
//!
//! - [`SessionManager`] owns the HTTP client and cookie jar of one account,
//!   drives the login protocol and serializes authenticated requests
//! - [`AccountService`] and [`DrawInfoService`] map operator payloads into
//!   typed records
//! - [`PurchaseEngine`] validates a purchase request stage by stage and
//!   submits the transaction
//!
//! # Usage
//!
//! ```bash
//! DHLOTTERY_USERNAME=player DHLOTTERY_PASSWORD=secret dhlotto balance
//! dhlotto buy --auto 2 --manual "3,9,15,27,34,41"
//! dhlotto pension buy --count 1
//! ```
//!
//! # Examples
//!
//! ```rust,no_run
//! use dhlottery::{PurchaseEngine, SessionManager, Settings, types::PurchaseSlot};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let settings = Settings::from_env()?;
//! let session = Arc::new(SessionManager::from_settings(settings)?);
//!
//! let engine = PurchaseEngine::new(session.clone());
//! let result = engine.buy(&[PurchaseSlot::auto()], None).await?;
//! println!("Bought {} game(s) for round {}", result.games.len(), result.round);
//!
//! session.close().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod purchase;
pub mod services;
pub mod session;
pub mod types;
pub mod utils;

pub use config::Settings;
pub use error::{Error, PurchaseRejection, Result};
pub use purchase::PurchaseEngine;
pub use services::{AccountService, DrawInfoService};
pub use session::{LoginState, SessionManager};
