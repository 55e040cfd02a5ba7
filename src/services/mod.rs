//! Thin typed wrappers over the session's request methods

pub mod account;
pub mod draw;

pub use account::AccountService;
pub use draw::DrawInfoService;
