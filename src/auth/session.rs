//! Session context: the client's belief about the current actor.
//!
//! One `SessionContext` is constructed per application load and lives for
//! the tab's lifetime. It owns the credential store - nothing else writes
//! to persisted credentials - and exposes synchronous `login`/`logout`
//! transitions plus the derived `is_authenticated` flag.

use tracing::{debug, info, warn};

use crate::auth::credentials::{CredentialRecord, CredentialStore};
use crate::models::{LoginPayload, UserIdentity};

pub struct SessionContext {
    store: CredentialStore,
    user: Option<UserIdentity>,
    is_loading: bool,
}

impl SessionContext {
    /// Create an empty session over the given store. Call [`bootstrap`]
    /// before reading authentication state.
    ///
    /// [`bootstrap`]: SessionContext::bootstrap
    pub fn new(store: CredentialStore) -> Self {
        Self {
            store,
            user: None,
            is_loading: true,
        }
    }

    /// One-time read of the persisted credential record.
    ///
    /// A complete record populates the session; a partial or unparseable
    /// one is purged by the store and the session stays empty. Never
    /// errors outward - the only outcomes are "logged in" and "logged
    /// out". Subsequent calls are no-ops.
    pub fn bootstrap(&mut self) {
        if !self.is_loading {
            return;
        }

        match self.store.load() {
            Some(record) => {
                debug!(username = %record.user.username, "Restored session from storage");
                self.user = Some(record.user);
            }
            None => {
                debug!("No usable credential record, starting logged out");
            }
        }
        self.is_loading = false;
    }

    /// Apply a successful login. Persists the credential record and
    /// populates the session synchronously; consumers observe the new
    /// state without a round trip.
    pub fn login(&mut self, payload: &LoginPayload) {
        let user = payload.identity();
        let record = CredentialRecord {
            access_token: payload.access_token.clone(),
            refresh_token: payload.refresh_token.clone(),
            user: user.clone(),
        };
        if let Err(e) = self.store.write(&record) {
            // In-memory session is still the source of truth for this tab
            warn!(error = %e, "Failed to persist credential record");
        }
        info!(username = %user.username, "Logged in");
        self.user = Some(user);
        self.is_loading = false;
    }

    /// Purge persisted credentials and reset to empty, synchronously.
    /// Idempotent: logging out while logged out is a no-op.
    pub fn logout(&mut self) {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear credential record");
        }
        if self.user.take().is_some() {
            info!("Logged out");
        }
        self.is_loading = false;
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn user(&self) -> Option<&UserIdentity> {
        self.user.as_ref()
    }

    /// True only during the window before [`bootstrap`] has run.
    ///
    /// [`bootstrap`]: SessionContext::bootstrap
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Current persisted access token, if any.
    pub fn access_token(&self) -> Option<String> {
        self.store.access_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::credentials::{
        MemoryStorage, Storage, KEY_ACCESS_TOKEN, KEY_REFRESH_TOKEN, KEY_USER,
    };
    use crate::models::Role;

    fn sample_payload() -> LoginPayload {
        LoginPayload {
            access_token: "at".to_string(),
            refresh_token: "rt".to_string(),
            id: "u1".to_string(),
            username: "reader".to_string(),
            img_url: "img".to_string(),
            vip: false,
            role: Role {
                id: "r1".to_string(),
                name: "USER".to_string(),
            },
        }
    }

    #[test]
    fn test_bootstrap_with_empty_storage() {
        let mut session = SessionContext::new(CredentialStore::in_memory());
        assert!(session.is_loading());
        session.bootstrap();
        assert!(!session.is_loading());
        assert!(!session.is_authenticated());
        assert!(session.user().is_none());
    }

    #[test]
    fn test_bootstrap_restores_complete_record() {
        let mut store = CredentialStore::in_memory();
        let payload = sample_payload();
        let record = CredentialRecord {
            access_token: payload.access_token.clone(),
            refresh_token: payload.refresh_token.clone(),
            user: payload.identity(),
        };
        store.write(&record).unwrap();

        let mut session = SessionContext::new(store);
        session.bootstrap();
        assert!(session.is_authenticated());
        assert_eq!(session.user().unwrap().username, "reader");
        assert_eq!(session.access_token().as_deref(), Some("at"));
    }

    #[test]
    fn test_bootstrap_purges_partial_record() {
        let mut storage = MemoryStorage::new();
        storage.set(KEY_ACCESS_TOKEN, "at").unwrap();
        // refreshToken missing
        storage.set(KEY_USER, r#"{"id":"u1"}"#).unwrap();
        let store = CredentialStore::new(Box::new(storage));

        let mut session = SessionContext::new(store);
        session.bootstrap();
        assert!(!session.is_authenticated());
        assert_eq!(session.access_token(), None);
    }

    #[test]
    fn test_bootstrap_purges_unparseable_user() {
        let mut storage = MemoryStorage::new();
        storage.set(KEY_ACCESS_TOKEN, "at").unwrap();
        storage.set(KEY_REFRESH_TOKEN, "rt").unwrap();
        storage.set(KEY_USER, "{broken").unwrap();
        let store = CredentialStore::new(Box::new(storage));

        let mut session = SessionContext::new(store);
        session.bootstrap();
        assert!(!session.is_authenticated());
        assert_eq!(session.access_token(), None);
    }

    #[test]
    fn test_login_is_immediately_observable() {
        let mut session = SessionContext::new(CredentialStore::in_memory());
        session.bootstrap();
        session.login(&sample_payload());
        assert!(session.is_authenticated());
        assert_eq!(session.access_token().as_deref(), Some("at"));
    }

    #[test]
    fn test_logout_is_immediate_and_idempotent() {
        let mut session = SessionContext::new(CredentialStore::in_memory());
        session.bootstrap();
        session.login(&sample_payload());

        session.logout();
        assert!(!session.is_authenticated());
        assert_eq!(session.access_token(), None);

        // Second logout is a no-op
        session.logout();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_bootstrap_runs_once() {
        let mut session = SessionContext::new(CredentialStore::in_memory());
        session.bootstrap();
        session.login(&sample_payload());
        // A stray second bootstrap must not reset the live session
        session.bootstrap();
        assert!(session.is_authenticated());
    }
}
