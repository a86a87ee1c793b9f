//! Restore state machine.
//!
//! A restore attempt moves through
//! `Idle -> Locating -> Hydrating -> Applying -> Done`, or ends in
//! `Failed` from `Locating` (design not found or remote unreachable) or `Hydrating` (catalog
//! timeout). Nothing touches the configuration before `Applying`.
//!
//! The machine borrows the target [`ConfigurationStore`] for the whole
//! attempt. Dropping the future cancels the restore; since the borrow ends
//! with it, no mutation can reach a store created afterwards.

use crate::catalog::{CatalogWatch, Product};
use crate::configuration::ConfigurationStore;
use crate::designs::{DesignCoordinator, Origin, SavedDesign};
use crate::error::ConfiguratorError;
use crate::ids::{CategoryKey, DesignId, ProductId};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Why a restore ended in `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreFailure {
    NotFound,
    /// The remote store was unreachable and the design is not on this device.
    RemoteUnavailable,
    CatalogTimeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreState {
    Idle,
    Locating,
    Hydrating,
    Applying,
    Done,
    Failed(RestoreFailure),
}

impl RestoreState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RestoreState::Idle => "idle",
            RestoreState::Locating => "locating",
            RestoreState::Hydrating => "hydrating",
            RestoreState::Applying => "applying",
            RestoreState::Done => "done",
            RestoreState::Failed(RestoreFailure::NotFound) => "failed(not_found)",
            RestoreState::Failed(RestoreFailure::RemoteUnavailable) => "failed(remote_unavailable)",
            RestoreState::Failed(RestoreFailure::CatalogTimeout) => "failed(catalog_timeout)",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RestoreState::Done | RestoreState::Failed(_))
    }

    /// Whether `next` is a legal successor of `self`.
    pub fn can_transition_to(&self, next: RestoreState) -> bool {
        use RestoreState::*;
        matches!(
            (self, next),
            (Idle, Locating)
                | (Idle, Done)
                | (Locating, Hydrating)
                | (Locating, Failed(RestoreFailure::NotFound))
                | (Locating, Failed(RestoreFailure::RemoteUnavailable))
                | (Hydrating, Applying)
                | (Hydrating, Failed(RestoreFailure::CatalogTimeout))
                | (Applying, Done)
        )
    }
}

impl fmt::Display for RestoreState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a successful restore.
#[derive(Debug, Clone, PartialEq)]
pub struct RestoreReport {
    pub design_id: DesignId,
    /// Store the design came from; `None` when the restore was a repeat.
    pub origin: Option<Origin>,
    /// The design had already been applied to this store.
    pub already_applied: bool,
    /// Categories whose saved option no longer exists; left empty.
    pub cleared_slots: Vec<CategoryKey>,
    /// Saved categories the current product no longer has.
    pub skipped_categories: Vec<CategoryKey>,
    /// The saved fabric no longer exists and the fabric was cleared.
    pub fabric_cleared: bool,
    /// Every state visited, starting with `Idle`.
    pub transitions: Vec<RestoreState>,
}

/// One restore attempt.
#[derive(Debug)]
pub struct RestoreMachine {
    design_id: DesignId,
    product_id: ProductId,
    hydrate_timeout: Duration,
    state: RestoreState,
    transitions: Vec<RestoreState>,
}

impl RestoreMachine {
    pub fn new(design_id: DesignId, product_id: ProductId, hydrate_timeout: Duration) -> Self {
        Self {
            design_id,
            product_id,
            hydrate_timeout,
            state: RestoreState::Idle,
            transitions: vec![RestoreState::Idle],
        }
    }

    pub fn state(&self) -> RestoreState {
        self.state
    }

    pub fn transitions(&self) -> &[RestoreState] {
        &self.transitions
    }

    fn advance(&mut self, next: RestoreState) -> Result<(), ConfiguratorError> {
        if !self.state.can_transition_to(next) {
            return Err(ConfiguratorError::InvalidRestoreTransition {
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        tracing::debug!(
            design_id = %self.design_id,
            from = %self.state,
            to = %next,
            "Restore transition"
        );
        self.state = next;
        self.transitions.push(next);
        Ok(())
    }

    fn fail(&mut self, failure: RestoreFailure, error: ConfiguratorError) -> ConfiguratorError {
        match self.advance(RestoreState::Failed(failure)) {
            Ok(()) => {
                tracing::warn!(design_id = %self.design_id, error = %error, "Restore failed");
                error
            }
            Err(invalid) => invalid,
        }
    }

    /// Drive the attempt to a terminal state.
    pub async fn run(
        &mut self,
        coordinator: &DesignCoordinator,
        store: &mut ConfigurationStore,
        catalog: &mut CatalogWatch,
    ) -> Result<RestoreReport, ConfiguratorError> {
        let mut report = RestoreReport {
            design_id: self.design_id.clone(),
            origin: None,
            already_applied: false,
            cleared_slots: Vec::new(),
            skipped_categories: Vec::new(),
            fabric_cleared: false,
            transitions: Vec::new(),
        };

        if store.was_restored(&self.design_id) {
            self.advance(RestoreState::Done)?;
            tracing::debug!(design_id = %self.design_id, "Design already restored into this configuration");
            report.already_applied = true;
            report.transitions = self.transitions.clone();
            return Ok(report);
        }

        self.advance(RestoreState::Locating)?;
        let design = match coordinator.locate(&self.design_id, &self.product_id).await {
            Ok(Some(design)) => design,
            Ok(None) => {
                return Err(self.fail(
                    RestoreFailure::NotFound,
                    ConfiguratorError::NotFound(self.design_id.clone()),
                ))
            }
            Err(e) => return Err(self.fail(RestoreFailure::RemoteUnavailable, e)),
        };
        report.origin = Some(design.origin);

        self.advance(RestoreState::Hydrating)?;
        let product = match store.product() {
            Some(current) if current.id == design.product_id => Arc::clone(current),
            _ => match catalog.ready(&design.product_id, self.hydrate_timeout).await {
                Ok(product) => product,
                Err(e) => return Err(self.fail(RestoreFailure::CatalogTimeout, e)),
            },
        };

        self.advance(RestoreState::Applying)?;
        apply(store, product, &design, &mut report)?;
        store.mark_restored(self.design_id.clone());

        self.advance(RestoreState::Done)?;
        tracing::info!(
            design_id = %self.design_id,
            origin = design.origin.as_str(),
            cleared = report.cleared_slots.len(),
            skipped = report.skipped_categories.len(),
            "Design restored"
        );
        report.transitions = self.transitions.clone();
        Ok(report)
    }
}

/// Replay `design` into `store`: fabric, then each category, then measurements.
///
/// Every step is a complete store mutation. Stale ids clear their slot
/// instead of failing the restore.
fn apply(
    store: &mut ConfigurationStore,
    product: Arc<Product>,
    design: &SavedDesign,
    report: &mut RestoreReport,
) -> Result<(), ConfiguratorError> {
    // Start from defaults so nothing edited before the restore survives it.
    store.seed(Arc::clone(&product));

    let snapshot = &design.snapshot;
    store.set_view_mode(snapshot.view_mode);
    match snapshot.fabric_id() {
        Some(id) if product.fabric(id).is_some() => store.set_fabric(Some(id))?,
        Some(id) => {
            tracing::debug!(fabric = %id, "Saved fabric no longer offered");
            report.fabric_cleared = true;
            store.set_fabric(None)?;
        }
        None => store.set_fabric(None)?,
    }

    for (category, selected) in &snapshot.selections {
        let Some(group) = product.group(category) else {
            tracing::debug!(category = %category, "Saved category no longer offered");
            report.skipped_categories.push(category.clone());
            continue;
        };
        match selected.as_ref().map(|o| &o.id) {
            Some(id) if group.option(id).is_none() => {
                tracing::debug!(category = %category, option = %id, "Saved option no longer offered");
                report.cleared_slots.push(category.clone());
                store.set_selection(category, None)?;
            }
            id => store.set_selection(category, id)?,
        }
    }

    for (field, value) in &snapshot.measurements {
        store.set_measurement(field.clone(), value.clone());
    }
    Ok(())
}
