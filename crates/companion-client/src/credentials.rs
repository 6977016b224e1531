//! Credential storage for the bearer token and cached user identity.
//!
//! The browser client kept both in window-local storage and cleared them
//! inline whenever the backend answered 401. Here the same capability is an
//! injected trait object so the transport layer never touches a concrete
//! persistence mechanism, and tests can observe exactly when the session is
//! dropped.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::warn;

use crate::errors::ClientError;
use crate::models::UserProfile;

/// Bearer token plus the identity it was issued for.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StoredIdentity {
    /// Opaque bearer token sent with every request.
    pub token: String,
    /// Cached profile of the logged-in user, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
}

/// Read/write access to the current session credential.
///
/// `store` and `clear` are best-effort: implementations log persistence
/// failures instead of surfacing them, because credential bookkeeping runs
/// on error paths (the 401 intercept) where a second failure has nowhere
/// useful to go.
pub trait CredentialStore: Send + Sync {
    /// Returns the current bearer token, if a session exists.
    fn token(&self) -> Option<String>;
    /// Returns the cached identity, if one was stored with the token.
    fn identity(&self) -> Option<UserProfile>;
    /// Replaces the stored session.
    fn store(&self, identity: StoredIdentity);
    /// Replaces only the cached identity, keeping the token.
    fn update_identity(&self, user: UserProfile);
    /// Drops the stored session entirely.
    fn clear(&self);
}

/// In-memory store, the default for library consumers that manage their own
/// persistence.
#[derive(Default)]
pub struct MemoryCredentialStore {
    inner: RwLock<Option<StoredIdentity>>,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store preloaded with a bearer token.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            inner: RwLock::new(Some(StoredIdentity {
                token: token.into(),
                user: None,
            })),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn token(&self) -> Option<String> {
        self.inner
            .read()
            .ok()
            .and_then(|guard| guard.as_ref().map(|id| id.token.clone()))
    }

    fn identity(&self) -> Option<UserProfile> {
        self.inner
            .read()
            .ok()
            .and_then(|guard| guard.as_ref().and_then(|id| id.user.clone()))
    }

    fn store(&self, identity: StoredIdentity) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = Some(identity);
        }
    }

    fn update_identity(&self, user: UserProfile) {
        if let Ok(mut guard) = self.inner.write()
            && let Some(identity) = guard.as_mut()
        {
            identity.user = Some(user);
        }
    }

    fn clear(&self) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = None;
        }
    }
}

/// JSON-file-backed store for CLI-style consumers that want the session to
/// survive process restarts.
pub struct FileCredentialStore {
    path: PathBuf,
    cached: RwLock<Option<StoredIdentity>>,
}

impl FileCredentialStore {
    /// Opens (or initializes) a store at `path`.
    ///
    /// A missing file starts empty; an unreadable or corrupt file is treated
    /// as empty with a warning, matching how the browser client shrugged off
    /// bad local-storage contents.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ClientError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| ClientError::store(format!("create {}: {e}", parent.display())))?;
        }
        let cached = RwLock::new(read_identity_file(&path));
        Ok(Self { path, cached })
    }

    /// Conventional per-user location: `<config dir>/companion/credentials.json`.
    pub fn default_path() -> Result<PathBuf, ClientError> {
        let base = dirs::config_dir()
            .ok_or_else(|| ClientError::store("no config directory available on this platform"))?;
        Ok(base.join("companion").join("credentials.json"))
    }

    fn persist(&self, identity: Option<&StoredIdentity>) {
        let result = match identity {
            Some(identity) => serde_json::to_vec_pretty(identity)
                .map_err(|e| ClientError::store(e.to_string()))
                .and_then(|bytes| {
                    std::fs::write(&self.path, bytes)
                        .map_err(|e| ClientError::store(e.to_string()))
                }),
            None => match std::fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(ClientError::store(e.to_string())),
            },
        };
        if let Err(e) = result {
            warn!(path = %self.path.display(), error = %e, "failed to persist credentials");
        }
    }
}

fn read_identity_file(path: &Path) -> Option<StoredIdentity> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read credential file");
            return None;
        }
    };
    match serde_json::from_slice(&bytes) {
        Ok(identity) => Some(identity),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring corrupt credential file");
            None
        }
    }
}

impl CredentialStore for FileCredentialStore {
    fn token(&self) -> Option<String> {
        self.cached
            .read()
            .ok()
            .and_then(|guard| guard.as_ref().map(|id| id.token.clone()))
    }

    fn identity(&self) -> Option<UserProfile> {
        self.cached
            .read()
            .ok()
            .and_then(|guard| guard.as_ref().and_then(|id| id.user.clone()))
    }

    fn store(&self, identity: StoredIdentity) {
        self.persist(Some(&identity));
        if let Ok(mut guard) = self.cached.write() {
            *guard = Some(identity);
        }
    }

    fn update_identity(&self, user: UserProfile) {
        if let Ok(mut guard) = self.cached.write()
            && let Some(identity) = guard.as_mut()
        {
            identity.user = Some(user);
            self.persist(Some(identity));
        }
    }

    fn clear(&self) {
        if let Ok(mut guard) = self.cached.write() {
            *guard = None;
        }
        self.persist(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(token: &str) -> StoredIdentity {
        StoredIdentity {
            token: token.into(),
            user: None,
        }
    }

    #[test]
    fn memory_store_roundtrip_and_clear() {
        let store = MemoryCredentialStore::new();
        assert_eq!(store.token(), None);

        store.store(identity("tok-1"));
        assert_eq!(store.token().as_deref(), Some("tok-1"));

        store.clear();
        assert_eq!(store.token(), None);
        assert_eq!(store.identity(), None);
    }

    #[test]
    fn update_identity_without_session_is_a_no_op() {
        let store = MemoryCredentialStore::new();
        store.update_identity(UserProfile {
            name: "a".into(),
            email: "a@example.com".into(),
            ..UserProfile::default()
        });
        assert_eq!(store.identity(), None);
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("credentials.json");

        let store = FileCredentialStore::open(&path).expect("open");
        store.store(identity("tok-file"));
        drop(store);

        let reopened = FileCredentialStore::open(&path).expect("reopen");
        assert_eq!(reopened.token().as_deref(), Some("tok-file"));

        reopened.clear();
        assert!(!path.exists());
        let after_clear = FileCredentialStore::open(&path).expect("open after clear");
        assert_eq!(after_clear.token(), None);
    }

    #[test]
    fn corrupt_file_is_treated_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, b"{not json").expect("write");

        let store = FileCredentialStore::open(&path).expect("open");
        assert_eq!(store.token(), None);
    }
}
