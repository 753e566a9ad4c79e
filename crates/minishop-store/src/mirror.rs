//! Remote and local backends the cart is mirrored to.

use std::collections::HashMap;
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use minishop_core::{CartEntry, UserId};
use minishop_sheets::SheetClient;

use crate::error::MirrorError;

/// Durable storage for a user's cart, keyed by user id.
///
/// `save` overwrites the whole cart. Implementations are shared with spawned
/// persist tasks, so they must be `Send + Sync + 'static`.
pub trait CartMirror: Send + Sync + 'static {
    fn load(
        &self,
        user_id: &UserId,
    ) -> impl Future<Output = Result<Vec<CartEntry>, MirrorError>> + Send;

    fn save(
        &self,
        user_id: &UserId,
        entries: &[CartEntry],
    ) -> impl Future<Output = Result<(), MirrorError>> + Send;
}

impl CartMirror for SheetClient {
    async fn load(&self, user_id: &UserId) -> Result<Vec<CartEntry>, MirrorError> {
        Ok(self.fetch_cart(user_id).await?)
    }

    async fn save(&self, user_id: &UserId, entries: &[CartEntry]) -> Result<(), MirrorError> {
        Ok(self.update_cart(user_id, entries).await?)
    }
}

/// Process-local mirror. Users with nothing stored load an empty cart.
#[derive(Debug, Default)]
pub struct MemoryCartMirror {
    carts: Mutex<HashMap<UserId, Vec<CartEntry>>>,
    saves: AtomicUsize,
}

impl MemoryCartMirror {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates the stored cart for `user_id`.
    #[must_use]
    pub fn with_cart(self, user_id: UserId, entries: Vec<CartEntry>) -> Self {
        self.lock().insert(user_id, entries);
        self
    }

    /// What a subsequent `load` would return.
    #[must_use]
    pub fn stored(&self, user_id: &UserId) -> Option<Vec<CartEntry>> {
        self.lock().get(user_id).cloned()
    }

    /// Number of completed saves.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<UserId, Vec<CartEntry>>> {
        self.carts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CartMirror for MemoryCartMirror {
    async fn load(&self, user_id: &UserId) -> Result<Vec<CartEntry>, MirrorError> {
        Ok(self.stored(user_id).unwrap_or_default())
    }

    async fn save(&self, user_id: &UserId, entries: &[CartEntry]) -> Result<(), MirrorError> {
        self.lock().insert(user_id.clone(), entries.to_vec());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// One JSON file per user under `dir`, holding `[{"id", "quantity"}]`.
#[derive(Debug, Clone)]
pub struct LocalCartMirror {
    dir: PathBuf,
}

impl LocalCartMirror {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the cart file for `user_id`. Characters outside
    /// `[A-Za-z0-9_-]` are replaced with `_`.
    #[must_use]
    pub fn cart_path(&self, user_id: &UserId) -> PathBuf {
        let stem: String = user_id
            .as_str()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{stem}.json"))
    }
}

impl CartMirror for LocalCartMirror {
    async fn load(&self, user_id: &UserId) -> Result<Vec<CartEntry>, MirrorError> {
        let path = self.cart_path(user_id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(MirrorError::Io { path, source }),
        };
        serde_json::from_slice(&bytes).map_err(|source| MirrorError::Json {
            context: path.display().to_string(),
            source,
        })
    }

    async fn save(&self, user_id: &UserId, entries: &[CartEntry]) -> Result<(), MirrorError> {
        let path = self.cart_path(user_id);
        let body = serde_json::to_vec_pretty(entries).map_err(|source| MirrorError::Json {
            context: path.display().to_string(),
            source,
        })?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| MirrorError::Io {
                path: self.dir.clone(),
                source,
            })?;

        // Write-then-rename so a concurrent load never sees a half-written file.
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &body)
            .await
            .map_err(|source| MirrorError::Io {
                path: tmp.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|source| MirrorError::Io { path, source })?;
        Ok(())
    }
}
