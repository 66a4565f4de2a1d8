//! Persistence for the OAuth access and refresh tokens.
//!
//! A missing token is an ordinary result (`Ok(None)`), distinct from a storage failure. The
//! platform keychain is out of scope; [`FileTokenStore`] keeps tokens in an owner-only JSON
//! file and [`MemoryTokenStore`] keeps them for the lifetime of the process.

use crate::error::Error;
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Which of the two stored secrets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    /// Fixed name the token is stored under.
    pub fn key(self) -> &'static str {
        match self {
            Self::Access => "youtube.access_token",
            Self::Refresh => "youtube.refresh_token",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Tokens obtained from a successful sign-in.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

#[async_trait::async_trait]
pub trait TokenStore: Send + Sync {
    async fn save(&self, kind: TokenKind, value: &str) -> Result<(), Error>;

    async fn read(&self, kind: TokenKind) -> Result<Option<String>, Error>;

    /// Removes both tokens. Used on explicit disconnect.
    async fn clear(&self) -> Result<(), Error>;

    async fn save_credentials(&self, credentials: &Credentials) -> Result<(), Error> {
        self.save(TokenKind::Access, &credentials.access_token)
            .await?;
        self.save(TokenKind::Refresh, &credentials.refresh_token)
            .await
    }

    /// Both tokens, if both are stored.
    async fn credentials(&self) -> Result<Option<Credentials>, Error> {
        let Some(access_token) = self.read(TokenKind::Access).await? else {
            return Ok(None);
        };
        let Some(refresh_token) = self.read(TokenKind::Refresh).await? else {
            return Ok(None);
        };
        Ok(Some(Credentials {
            access_token,
            refresh_token,
        }))
    }

    /// The stored access token, or [`Error::NoAccessToken`] if it is missing or empty.
    async fn access_token(&self) -> Result<String, Error> {
        match self.read(TokenKind::Access).await? {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(Error::NoAccessToken),
        }
    }

    async fn is_signed_in(&self) -> Result<bool, Error> {
        match self.access_token().await {
            Ok(_) => Ok(true),
            Err(Error::NoAccessToken) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Keeps tokens in memory only.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    // never held across an await
    tokens: std::sync::Mutex<HashMap<TokenKind, String>>,
}

impl MemoryTokenStore {
    fn tokens(&self) -> Result<std::sync::MutexGuard<'_, HashMap<TokenKind, String>>, Error> {
        self.tokens
            .lock()
            .map_err(|_| Error::TokenStorage("token store lock poisoned".into()))
    }
}

#[async_trait::async_trait]
impl TokenStore for MemoryTokenStore {
    async fn save(&self, kind: TokenKind, value: &str) -> Result<(), Error> {
        self.tokens()?.insert(kind, value.to_string());
        Ok(())
    }

    async fn read(&self, kind: TokenKind) -> Result<Option<String>, Error> {
        Ok(self.tokens()?.get(&kind).cloned())
    }

    async fn clear(&self) -> Result<(), Error> {
        self.tokens()?.clear();
        Ok(())
    }
}

/// Keeps tokens in a JSON file, keyed by [`TokenKind::key`].
///
/// A missing file reads as "no tokens". Writes replace the file atomically and, on Unix,
/// restrict it to the owner. All file access goes through [`tokio::fs`].
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    // serializes read-modify-write cycles within this process
    lock: tokio::sync::Mutex<()>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<BTreeMap<String, String>, Error> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                Error::TokenStorage(format!("parse {}: {e}", self.path.display()))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(Error::TokenStorage(format!(
                "read {}: {e}",
                self.path.display()
            ))),
        }
    }

    async fn store(&self, tokens: &BTreeMap<String, String>) -> Result<(), Error> {
        let storage_error =
            |what: &str, e: std::io::Error| Error::TokenStorage(format!("{what}: {e}"));

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_error("create token directory", e))?;
        }
        let json = serde_json::to_vec_pretty(tokens)
            .map_err(|e| Error::TokenStorage(format!("serialize tokens: {e}")))?;

        let tmp = self.path.with_extension("tmp");
        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options
            .open(&tmp)
            .await
            .map_err(|e| storage_error("open token file", e))?;
        file.write_all(&json)
            .await
            .map_err(|e| storage_error("write token file", e))?;
        file.sync_all()
            .await
            .map_err(|e| storage_error("sync token file", e))?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| storage_error("replace token file", e))
    }
}

#[async_trait::async_trait]
impl TokenStore for FileTokenStore {
    async fn save(&self, kind: TokenKind, value: &str) -> Result<(), Error> {
        let _guard = self.lock.lock().await;
        let mut tokens = self.load().await?;
        tokens.insert(kind.key().to_string(), value.to_string());
        self.store(&tokens).await?;
        tracing::debug!(token = %kind, path = %self.path.display(), "saved token");
        Ok(())
    }

    async fn read(&self, kind: TokenKind) -> Result<Option<String>, Error> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.remove(kind.key()))
    }

    async fn clear(&self) -> Result<(), Error> {
        let _guard = self.lock.lock().await;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(Error::TokenStorage(format!(
                    "remove {}: {e}",
                    self.path.display()
                )));
            }
        }
        tracing::debug!(path = %self.path.display(), "cleared tokens");
        Ok(())
    }
}
