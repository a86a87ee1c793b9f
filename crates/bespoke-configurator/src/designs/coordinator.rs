//! Design persistence coordinator.
//!
//! Fronts the device-local library and the account store. Listing merges
//! both; saving and deleting route to the remote store when the host has
//! supplied a session token and to the local library otherwise.

use crate::catalog::CatalogWatch;
use crate::config::ConfiguratorConfig;
use crate::configuration::ConfigurationStore;
use crate::designs::{
    LocalDesignStore, Origin, RemoteDesignStore, RemoteError, RestoreMachine, RestoreReport,
    SavedDesign, SessionToken,
};
use crate::error::ConfiguratorError;
use crate::ids::{DesignId, ProductId};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Result of listing saved designs.
#[derive(Debug, Clone)]
pub struct DesignListing {
    /// Merged designs, newest first.
    pub designs: Vec<SavedDesign>,
    /// Set when the remote store could not be read; `designs` is then local-only.
    pub remote_error: Option<RemoteError>,
    /// Set when the local library could not be read.
    pub local_error: Option<ConfiguratorError>,
}

impl DesignListing {
    pub fn is_degraded(&self) -> bool {
        self.remote_error.is_some() || self.local_error.is_some()
    }
}

/// Merge both stores' designs for `product_id`, newest first.
///
/// Designs are matched by id only. When an id is present in both stores the
/// remote copy is kept and the local one is left out of the result.
pub fn merge_designs(
    local: Vec<SavedDesign>,
    remote: Vec<SavedDesign>,
    product_id: &ProductId,
) -> Vec<SavedDesign> {
    let remote: Vec<SavedDesign> = remote
        .into_iter()
        .filter(|d| &d.product_id == product_id)
        .map(|d| d.with_origin(Origin::Remote))
        .collect();
    let remote_ids: HashSet<DesignId> = remote.iter().map(|d| d.id.clone()).collect();

    let mut merged: Vec<SavedDesign> = local
        .into_iter()
        .filter(|d| &d.product_id == product_id && !remote_ids.contains(&d.id))
        .map(|d| d.with_origin(Origin::Local))
        .chain(remote)
        .collect();

    merged.sort_by(|a, b| {
        b.saved_at
            .cmp(&a.saved_at)
            .then_with(|| a.id.cmp(&b.id))
    });
    merged
}

/// Routes design reads and writes between the local and remote stores.
pub struct DesignCoordinator {
    local: LocalDesignStore,
    remote: Arc<dyn RemoteDesignStore>,
    session: Option<SessionToken>,
    hydrate_timeout: Duration,
    purge_local_on_remote_save: bool,
}

impl DesignCoordinator {
    pub fn new(
        local: LocalDesignStore,
        remote: Arc<dyn RemoteDesignStore>,
        config: &ConfiguratorConfig,
    ) -> Self {
        Self {
            local,
            remote,
            session: None,
            hydrate_timeout: config.hydrate_timeout(),
            purge_local_on_remote_save: config.purge_local_on_remote_save,
        }
    }

    /// Route writes to the remote store from now on.
    pub fn sign_in(&mut self, token: SessionToken) {
        self.session = Some(token);
    }

    pub fn sign_out(&mut self) {
        self.session = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn local(&self) -> &LocalDesignStore {
        &self.local
    }

    pub fn hydrate_timeout(&self) -> Duration {
        self.hydrate_timeout
    }

    /// Union of both stores for `product_id`, newest first, de-duplicated by id.
    pub async fn list_saved_designs(&self, product_id: &ProductId) -> DesignListing {
        let (local, local_error) = match self.local.list(product_id) {
            Ok(designs) => (designs, None),
            Err(e) => {
                tracing::warn!(product_id = %product_id, error = %e, "Local design library unreadable");
                (Vec::new(), Some(e))
            }
        };

        let (remote, remote_error) = match &self.session {
            Some(token) => match self.remote.list(token, product_id).await {
                Ok(designs) => (designs, None),
                Err(e) => {
                    tracing::warn!(product_id = %product_id, error = %e, "Remote design listing failed, using local only");
                    (Vec::new(), Some(e))
                }
            },
            None => (Vec::new(), None),
        };

        DesignListing {
            designs: merge_designs(local, remote, product_id),
            remote_error,
            local_error,
        }
    }

    /// Find `id` for `product_id`, checking the remote store first.
    ///
    /// `Ok(None)` means the design is absent from every store that could be
    /// read. If the remote store is unreachable and the design is not on
    /// this device either, the outcome is unknown and the remote error is
    /// returned instead.
    pub async fn locate(
        &self,
        id: &DesignId,
        product_id: &ProductId,
    ) -> Result<Option<SavedDesign>, ConfiguratorError> {
        let mut remote_error = None;
        if let Some(token) = &self.session {
            match self.remote.list(token, product_id).await {
                Ok(designs) => {
                    if let Some(found) = designs.into_iter().find(|d| &d.id == id) {
                        return Ok(Some(found.with_origin(Origin::Remote)));
                    }
                }
                Err(e) => {
                    tracing::warn!(design_id = %id, error = %e, "Remote lookup failed, trying local");
                    remote_error = Some(e);
                }
            }
        }

        let local = match self.local.list(product_id) {
            Ok(designs) => designs
                .into_iter()
                .find(|d| &d.id == id)
                .map(|d| d.with_origin(Origin::Local)),
            Err(e) => {
                tracing::warn!(design_id = %id, error = %e, "Local lookup failed");
                None
            }
        };

        match (local, remote_error) {
            (Some(found), _) => Ok(Some(found)),
            (None, Some(e)) => Err(ConfiguratorError::RemoteUnavailable(e.to_string())),
            (None, None) => Ok(None),
        }
    }

    /// Snapshot the store's configuration and persist it.
    ///
    /// The snapshot is taken before any I/O, and a failed write never touches
    /// the live configuration. If the remote write fails the design is kept
    /// locally and the error names the local copy so the host can retry.
    pub async fn save(
        &self,
        store: &ConfigurationStore,
        name: Option<String>,
    ) -> Result<SavedDesign, ConfiguratorError> {
        let design = SavedDesign::capture(store, name, Origin::Local)?;

        let Some(token) = &self.session else {
            self.local
                .save(design.clone())
                .map_err(|e| ConfiguratorError::PersistenceWrite {
                    reason: e.to_string(),
                    local_fallback: None,
                })?;
            tracing::info!(design_id = %design.id, product_id = %design.product_id, "Design saved locally");
            return Ok(design);
        };

        match self.remote.create(token, &design).await {
            Ok(stored) => {
                tracing::info!(design_id = %stored.id, product_id = %stored.product_id, "Design saved remotely");
                if self.purge_local_on_remote_save {
                    self.purge_local_duplicates(&stored);
                }
                Ok(stored.with_origin(Origin::Remote))
            }
            Err(e) => {
                let local_fallback = match self.local.save(design.clone()) {
                    Ok(_) => Some(design.id.clone()),
                    Err(local) => {
                        tracing::warn!(design_id = %design.id, error = %local, "Local fallback save failed");
                        None
                    }
                };
                tracing::warn!(
                    design_id = %design.id,
                    error = %e,
                    kept_locally = local_fallback.is_some(),
                    "Remote design save failed"
                );
                Err(ConfiguratorError::PersistenceWrite {
                    reason: e.to_string(),
                    local_fallback,
                })
            }
        }
    }

    /// Drop local drafts whose snapshot matches a design just saved remotely.
    fn purge_local_duplicates(&self, stored: &SavedDesign) {
        let drafts = match self.local.list(&stored.product_id) {
            Ok(drafts) => drafts,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping local purge");
                return;
            }
        };
        for draft in drafts
            .iter()
            .filter(|d| d.id != stored.id && d.snapshot == stored.snapshot)
        {
            if let Err(e) = self.local.delete(&draft.id) {
                tracing::warn!(design_id = %draft.id, error = %e, "Failed to purge local draft");
            } else {
                tracing::debug!(design_id = %draft.id, "Purged local draft");
            }
        }
    }

    /// Delete `id` locally and, when signed in, remotely.
    pub async fn delete(&self, id: &DesignId) -> Result<(), ConfiguratorError> {
        let removed_locally = self
            .local
            .delete(id)
            .map_err(|e| ConfiguratorError::PersistenceWrite {
                reason: e.to_string(),
                local_fallback: None,
            })?;

        if let Some(token) = &self.session {
            self.remote.delete(token, id).await.map_err(|e| {
                tracing::warn!(design_id = %id, error = %e, "Remote design delete failed");
                ConfiguratorError::PersistenceWrite {
                    reason: e.to_string(),
                    local_fallback: None,
                }
            })?;
        }

        tracing::info!(design_id = %id, removed_locally, "Design deleted");
        Ok(())
    }

    /// Replay design `id` into `store`.
    ///
    /// See [`RestoreMachine`] for the states a restore passes through.
    pub async fn restore(
        &self,
        id: &DesignId,
        product_id: &ProductId,
        store: &mut ConfigurationStore,
        catalog: &mut CatalogWatch,
    ) -> Result<RestoreReport, ConfiguratorError> {
        let mut machine = RestoreMachine::new(id.clone(), product_id.clone(), self.hydrate_timeout);
        machine.run(self, store, catalog).await
    }
}
