//! Symmetric cipher for local session files.
//!
//! The key and nonce are compiled into the binary, so this only keeps the
//! session file from being readable at a glance (for example when pasted
//! into a chat). It is obscurity, not confidentiality: anyone with the binary
//! can decrypt the file.

pub mod cipher;

pub use cipher::{CipherError, SessionCipher};
