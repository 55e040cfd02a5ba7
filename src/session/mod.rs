//! Session management for the operator's website
//!
//! This module owns the login protocol: RSA key acquisition, encrypted
//! credential submission, page-mode normalization, and the retry/relogin
//! ladder used by every authenticated request.

pub mod manager;
pub mod rsa_key;
pub mod state;

pub use manager::{HttpSession, Params, SessionManager};
pub use rsa_key::RsaKeyMaterial;
pub use state::{LoginState, RecoveryStep, RetryBudget, SessionState};
