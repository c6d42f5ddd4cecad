use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use keyring::Entry;

use super::SessionData;

const SERVICE_NAME: &str = "fusion-order";

/// Keychain account the bearer token is stored under
const TOKEN_ACCOUNT: &str = "token";

/// Holder of the bearer token for the current session.
///
/// The dispatcher reads it before every request and clears it when the
/// server reports the session as unauthenticated. Login writes it, logout
/// clears it.
pub trait CredentialStore: Send + Sync {
    /// Current token, if any.
    fn get(&self) -> Result<Option<String>>;

    /// Replace the stored token.
    fn set(&self, token: &str) -> Result<()>;

    /// Forget the token. Clearing an empty store is not an error.
    fn clear(&self) -> Result<()>;

    /// The full session record. Backends that keep only the token report
    /// it without a user and stamped with the time of the call.
    fn session(&self) -> Result<Option<SessionData>> {
        Ok(self.get()?.map(SessionData::new))
    }

    /// Store a session. Backends that keep only the token store just that.
    fn set_session(&self, session: &SessionData) -> Result<()> {
        self.set(&session.token)
    }

    fn is_present(&self) -> bool {
        matches!(self.get(), Ok(Some(_)))
    }
}

/// Process-local store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    session: Mutex<Option<SessionData>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            session: Mutex::new(Some(SessionData::new(token))),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Result<Option<String>> {
        Ok(self.session()?.map(|session| session.token))
    }

    fn set(&self, token: &str) -> Result<()> {
        self.set_session(&SessionData::new(token))
    }

    fn clear(&self) -> Result<()> {
        let mut slot = self
            .session
            .lock()
            .map_err(|_| anyhow!("Credential lock poisoned"))?;
        *slot = None;
        Ok(())
    }

    fn session(&self) -> Result<Option<SessionData>> {
        let slot = self
            .session
            .lock()
            .map_err(|_| anyhow!("Credential lock poisoned"))?;
        Ok(slot.clone())
    }

    fn set_session(&self, session: &SessionData) -> Result<()> {
        let mut slot = self
            .session
            .lock()
            .map_err(|_| anyhow!("Credential lock poisoned"))?;
        *slot = Some(session.clone());
        Ok(())
    }
}

/// Token kept in the OS keychain
#[derive(Debug, Default)]
pub struct KeyringCredentialStore;

impl KeyringCredentialStore {
    pub fn new() -> Self {
        Self
    }

    fn entry(&self) -> Result<Entry> {
        Entry::new(SERVICE_NAME, TOKEN_ACCOUNT).context("Failed to create keyring entry")
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn get(&self) -> Result<Option<String>> {
        match self.entry()?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to retrieve token from keychain"),
        }
    }

    fn set(&self, token: &str) -> Result<()> {
        self.entry()?
            .set_password(token)
            .context("Failed to store token in keychain")
    }

    fn clear(&self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete token from keychain"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_set_get_clear() {
        let store = MemoryCredentialStore::new();
        assert_eq!(store.get().unwrap(), None);
        assert!(!store.is_present());

        store.set("abc").unwrap();
        assert_eq!(store.get().unwrap().as_deref(), Some("abc"));
        assert!(store.is_present());

        store.set("def").unwrap();
        assert_eq!(store.get().unwrap().as_deref(), Some("def"));

        store.clear().unwrap();
        assert_eq!(store.get().unwrap(), None);
        // Clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_memory_store_with_token() {
        let store = MemoryCredentialStore::with_token("seeded");
        assert_eq!(store.get().unwrap().as_deref(), Some("seeded"));
        assert_eq!(store.session().unwrap().unwrap().username, None);
    }

    #[test]
    fn test_memory_store_keeps_session_user() {
        let store = MemoryCredentialStore::new();
        let session = SessionData::new("abc").with_user(Some("bob".to_string()), None);
        store.set_session(&session).unwrap();
        assert_eq!(store.get().unwrap().as_deref(), Some("abc"));
        assert_eq!(store.session().unwrap(), Some(session));

        store.clear().unwrap();
        assert_eq!(store.session().unwrap(), None);
    }
}
