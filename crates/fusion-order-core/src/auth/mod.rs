//! Credential handling for the bearer-token session.
//!
//! This module provides:
//! - `CredentialStore`: explicit get/set/clear over the token
//! - `MemoryCredentialStore`, `FileCredentialStore`, `KeyringCredentialStore`: backends
//! - `AuthEvent`: emitted when the server reports the session as unauthenticated

pub mod credentials;
pub mod event;
pub mod session;

pub use credentials::{CredentialStore, KeyringCredentialStore, MemoryCredentialStore};
pub use event::AuthEvent;
pub use session::{FileCredentialStore, SessionData};
