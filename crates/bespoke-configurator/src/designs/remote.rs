//! Account-backed design store.

use crate::designs::{Origin, SavedDesign, SessionToken};
use crate::ids::{DesignId, ProductId};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Errors reported by the remote design store.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RemoteError {
    #[error("Session token rejected")]
    Unauthorized,

    #[error("Remote store unavailable: {0}")]
    Unavailable(String),

    #[error("Remote store rejected request: {0}")]
    Rejected(String),
}

/// The authenticated, authoritative design store.
#[async_trait]
pub trait RemoteDesignStore: Send + Sync {
    /// Designs for `product_id` owned by the session's account.
    async fn list(
        &self,
        token: &SessionToken,
        product_id: &ProductId,
    ) -> Result<Vec<SavedDesign>, RemoteError>;

    /// Persist `design`, returning the stored copy.
    async fn create(
        &self,
        token: &SessionToken,
        design: &SavedDesign,
    ) -> Result<SavedDesign, RemoteError>;

    /// Remove `id`. Removing a missing design is not an error.
    async fn delete(&self, token: &SessionToken, id: &DesignId) -> Result<(), RemoteError>;
}

/// In-memory remote store (for development/testing).
///
/// Accepts any token unless one is pinned with [`with_token`](Self::with_token).
#[derive(Debug, Default)]
pub struct InMemoryRemoteStore {
    designs: Mutex<Vec<SavedDesign>>,
    token: Option<SessionToken>,
    offline: AtomicBool,
}

impl InMemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only accept `token`.
    pub fn with_token(mut self, token: SessionToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Simulate an outage: every call fails with `Unavailable` while set.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Insert a design as if it had been saved from another device.
    pub fn insert(&self, design: SavedDesign) {
        if let Ok(mut designs) = self.designs.lock() {
            designs.retain(|d| d.id != design.id);
            designs.push(design.with_origin(Origin::Remote));
        }
    }

    pub fn len(&self) -> usize {
        self.designs.lock().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check(&self, token: &SessionToken) -> Result<(), RemoteError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RemoteError::Unavailable("offline".to_string()));
        }
        match &self.token {
            Some(expected) if expected != token => Err(RemoteError::Unauthorized),
            _ => Ok(()),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<SavedDesign>>, RemoteError> {
        self.designs
            .lock()
            .map_err(|_| RemoteError::Unavailable("store lock poisoned".to_string()))
    }
}

#[async_trait]
impl RemoteDesignStore for InMemoryRemoteStore {
    async fn list(
        &self,
        token: &SessionToken,
        product_id: &ProductId,
    ) -> Result<Vec<SavedDesign>, RemoteError> {
        self.check(token)?;
        Ok(self
            .lock()?
            .iter()
            .filter(|d| &d.product_id == product_id)
            .cloned()
            .collect())
    }

    async fn create(
        &self,
        token: &SessionToken,
        design: &SavedDesign,
    ) -> Result<SavedDesign, RemoteError> {
        self.check(token)?;
        let stored = design.clone().with_origin(Origin::Remote);
        let mut designs = self.lock()?;
        designs.retain(|d| d.id != stored.id);
        designs.push(stored.clone());
        Ok(stored)
    }

    async fn delete(&self, token: &SessionToken, id: &DesignId) -> Result<(), RemoteError> {
        self.check(token)?;
        self.lock()?.retain(|d| &d.id != id);
        Ok(())
    }
}
