//! File-backed session storage.
//!
//! The session file holds the API base URL and the current credential
//! pair. Writes go through a temp file and rename so a concurrent read
//! never observes a half-written pair.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use mondap_client::Session;
use mondap_core::store::CredentialStore;
use mondap_core::{AccessToken, ApiUrl, RefreshToken, StoreError, TokenPair};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Stored session data.
#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    api: ApiUrl,
    access_token: String,
    refresh_token: String,
}

/// Get the session file path.
pub fn session_path() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "mondap").context("Could not determine config directory")?;

    let data_dir = dirs.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data directory")?;

    Ok(data_dir.join("session.json"))
}

/// A [`CredentialStore`] backed by the session file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn read(&self) -> Result<Option<StoredSession>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.path).map_err(|e| StoreError::Io {
            message: e.to_string(),
        })?;
        let stored = serde_json::from_str(&json).map_err(|e| {
            warn!(path = %self.path.display(), "session file is corrupt");
            StoreError::Corrupt {
                message: e.to_string(),
            }
        })?;
        Ok(Some(stored))
    }

    fn write(&self, stored: &StoredSession) -> Result<(), StoreError> {
        let io = |e: std::io::Error| StoreError::Io {
            message: e.to_string(),
        };

        let json = serde_json::to_string_pretty(stored).map_err(|e| StoreError::Corrupt {
            message: e.to_string(),
        })?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &json).map_err(io)?;

        // Set restrictive permissions (Unix only)
        #[cfg(unix)]
        {
            let mut perms = fs::metadata(&tmp).map_err(io)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&tmp, perms).map_err(io)?;
        }

        fs::rename(&tmp, &self.path).map_err(io)?;
        debug!(path = %self.path.display(), "session file written");
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for FileStore {
    async fn get(&self) -> Result<Option<TokenPair>, StoreError> {
        Ok(self.read()?.map(|stored| {
            TokenPair::new(
                AccessToken::new(stored.access_token),
                RefreshToken::new(stored.refresh_token),
            )
        }))
    }

    async fn set(&self, pair: TokenPair) -> Result<(), StoreError> {
        let Some(mut stored) = self.read()? else {
            return Err(StoreError::Io {
                message: "no session file to update".to_string(),
            });
        };

        stored.access_token = pair.access.as_str().to_string();
        stored.refresh_token = pair.refresh.as_str().to_string();
        self.write(&stored)
    }

    async fn clear(&self) -> Result<(), StoreError> {
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| StoreError::Io {
                message: e.to_string(),
            })?;
            debug!(path = %self.path.display(), "session file removed");
        }
        Ok(())
    }
}

/// Write a freshly imported session to disk.
pub fn import_session(api: ApiUrl, pair: TokenPair) -> Result<()> {
    let store = FileStore::new(session_path()?);
    store
        .write(&StoredSession {
            api,
            access_token: pair.access.as_str().to_string(),
            refresh_token: pair.refresh.as_str().to_string(),
        })
        .context("Failed to write session file")
}

/// Show the stored session's API base URL, if any.
pub fn stored_api() -> Result<Option<ApiUrl>> {
    let store = FileStore::new(session_path()?);
    Ok(store
        .read()
        .context("Failed to read session file")?
        .map(|stored| stored.api))
}

/// Load the stored session and build a client over it.
pub fn load_session() -> Result<Session> {
    let store = FileStore::new(session_path()?);
    let stored = store
        .read()
        .context("Failed to read session file")?
        .context("No active session. Run 'mondap session import' first.")?;

    Ok(Session::new(stored.api, Arc::new(store)))
}

/// Remove the stored session.
pub fn clear_session() -> Result<()> {
    let path = session_path()?;

    if path.exists() {
        fs::remove_file(&path).context("Failed to remove session file")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> FileStore {
        FileStore::new(dir.path().join("session.json"))
    }

    fn sample() -> StoredSession {
        StoredSession {
            api: ApiUrl::new("https://api.mondap.example").unwrap(),
            access_token: "access-1".to_string(),
            refresh_token: "refresh-1".to_string(),
        }
    }

    #[tokio::test]
    async fn get_on_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(store.get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_replaces_tokens_and_keeps_api_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.write(&sample()).unwrap();

        store
            .set(TokenPair::new(
                AccessToken::new("access-2"),
                RefreshToken::new("refresh-2"),
            ))
            .await
            .unwrap();

        let stored = store.read().unwrap().unwrap();
        assert_eq!(stored.access_token, "access-2");
        assert_eq!(stored.refresh_token, "refresh-2");
        assert_eq!(stored.api.as_str(), "https://api.mondap.example");
    }

    #[tokio::test]
    async fn clear_removes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.write(&sample()).unwrap();

        store.clear().await.unwrap();
        assert!(store.get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_file_reports_corrupt_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(dir.path().join("session.json"), "not json").unwrap();

        let err = store.get().await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn session_file_has_restrictive_permissions() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.write(&sample()).unwrap();

        let mode = fs::metadata(dir.path().join("session.json"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
