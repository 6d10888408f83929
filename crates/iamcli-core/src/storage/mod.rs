//! Local state kept between command invocations.
//!
//! This module provides:
//! - `SessionStore`: the encrypted backend/SaaS session file with a hard expiry
//! - `SystemSelector`: the plain-text "current system" file written by `use`
//!
//! Sessions expire one hour after login. Nothing here locks the files;
//! concurrent invocations simply race.

pub mod error;
pub mod selector;
pub mod session;

pub use error::StoreError;
pub use selector::SystemSelector;
pub use session::{AppIdentity, SessionCredential, SessionStore};
