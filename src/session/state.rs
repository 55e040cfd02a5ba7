//! Login state machine and retry budget

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Where the session is in the login protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoginState {
    LoggedOut,
    RsaKeyPending,
    CredentialsSubmitted,
    LoggedIn,
    Failed,
}

impl LoginState {
    pub fn is_authenticated(self) -> bool {
        matches!(self, Self::LoggedIn)
    }

    /// Allowed edges. A login may restart from any state (a cancelled
    /// attempt leaves the session mid-protocol) and `close()` always
    /// returns to `LoggedOut`.
    pub fn can_transition_to(self, next: LoginState) -> bool {
        use LoginState::*;
        match (self, next) {
            (_, LoggedOut) | (_, RsaKeyPending) => true,
            (RsaKeyPending, CredentialsSubmitted) => true,
            (RsaKeyPending | CredentialsSubmitted, Failed) => true,
            (CredentialsSubmitted, LoggedIn) => true,
            _ => false,
        }
    }
}

/// Mutable session bookkeeping guarded by the manager's single-flight lock
#[derive(Debug, Clone)]
pub struct SessionState {
    state: LoginState,
    last_login_at: Option<DateTime<Utc>>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            state: LoginState::LoggedOut,
            last_login_at: None,
        }
    }

    pub fn state(&self) -> LoginState {
        self.state
    }

    pub fn last_login_at(&self) -> Option<DateTime<Utc>> {
        self.last_login_at
    }

    /// Move to `next`, ignoring edges the machine does not allow
    pub fn transition(&mut self, next: LoginState) {
        if !self.state.can_transition_to(next) {
            tracing::warn!("Ignoring login state change {:?} -> {:?}", self.state, next);
            return;
        }
        tracing::debug!("Login state {:?} -> {:?}", self.state, next);
        self.state = next;
        if next == LoginState::LoggedIn {
            self.last_login_at = Some(Utc::now());
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Recovery action taken after a retryable API failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryStep {
    /// Re-request the main page in normal mode, keep the session
    NormalizeMode,
    /// Drop the session and log in from scratch
    Relogin,
}

/// Bounded retry ladder: every retry but the last normalizes the page mode,
/// the last one relogs in.
#[derive(Debug, Clone, Copy)]
pub struct RetryBudget {
    max_retries: u32,
    remaining: u32,
}

impl RetryBudget {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            remaining: max_retries,
        }
    }

    /// Next recovery step, or `None` once the budget is spent
    pub fn next_step(&mut self) -> Option<RecoveryStep> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        if self.remaining == 0 {
            Some(RecoveryStep::Relogin)
        } else {
            Some(RecoveryStep::NormalizeMode)
        }
    }

    /// Requests issued so far, counting the original call
    pub fn attempts(&self) -> u32 {
        self.max_retries - self.remaining + 1
    }
}
