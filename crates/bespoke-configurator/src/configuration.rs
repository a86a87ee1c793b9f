//! The live configuration of one session and the store that mutates it.

use crate::catalog::{CustomizationOption, FabricOption, Product, ViewMode};
use crate::error::ConfiguratorError;
use crate::ids::{CategoryKey, DesignId, FabricId, OptionId, ProductId};
use crate::layers::{resolve_layers, RenderLayer};
use crate::money::Money;
use crate::pricing::price;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Fabric, per-category selections, measurements and view mode.
///
/// Values are owned, so a clone is a deep, independent snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Configuration {
    pub fabric: Option<FabricOption>,
    pub selections: BTreeMap<CategoryKey, Option<CustomizationOption>>,
    pub measurements: BTreeMap<String, String>,
    pub view_mode: ViewMode,
}

impl Configuration {
    /// The option selected for `category`, if any.
    pub fn selection(&self, category: &CategoryKey) -> Option<&CustomizationOption> {
        self.selections.get(category).and_then(Option::as_ref)
    }

    pub fn selected_id(&self, category: &CategoryKey) -> Option<&OptionId> {
        self.selection(category).map(|o| &o.id)
    }

    pub fn fabric_id(&self) -> Option<&FabricId> {
        self.fabric.as_ref().map(|f| &f.id)
    }

    /// Named-field projection for callers still reading the old shape.
    pub fn legacy_view(&self) -> LegacyView<'_> {
        let pick = |key: &str| self.selected_id(&CategoryKey::new(key));
        LegacyView {
            fabric: self.fabric_id(),
            collar: pick("collar"),
            cuff: pick("cuff"),
            sleeve: pick("sleeve"),
            pocket: pick("pocket"),
            placket: pick("placket"),
        }
    }
}

/// Read-only named view over [`Configuration::selections`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyView<'a> {
    pub fabric: Option<&'a FabricId>,
    pub collar: Option<&'a OptionId>,
    pub cuff: Option<&'a OptionId>,
    pub sleeve: Option<&'a OptionId>,
    pub pocket: Option<&'a OptionId>,
    pub placket: Option<&'a OptionId>,
}

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

/// Owner of the mutable [`Configuration`] for one session.
///
/// Mutations are synchronous and either apply fully or leave the
/// configuration untouched. The store is single-owner; hosts sharing it
/// across threads must serialize access themselves.
#[derive(Debug)]
pub struct ConfigurationStore {
    instance: u64,
    product: Option<Arc<Product>>,
    configuration: Configuration,
    revision: u64,
    restored: HashSet<DesignId>,
}

impl ConfigurationStore {
    /// An unseeded store; catalog mutations fail until [`seed`](Self::seed).
    pub fn new() -> Self {
        Self {
            instance: NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed),
            product: None,
            configuration: Configuration::default(),
            revision: 0,
            restored: HashSet::new(),
        }
    }

    /// A store seeded from `product`.
    pub fn seeded(product: Arc<Product>) -> Self {
        let mut store = Self::new();
        store.seed(product);
        store
    }

    /// Attach `product` and seed defaults, discarding previous choices.
    ///
    /// Each category gets its first default-flagged option, else its first
    /// option; the fabric gets the first fabric.
    pub fn seed(&mut self, product: Arc<Product>) {
        let selections = product
            .option_groups
            .iter()
            .map(|g| (g.category_key.clone(), g.default_option().cloned()))
            .collect();

        self.configuration = Configuration {
            fabric: product.fabric_options.first().cloned(),
            selections,
            measurements: BTreeMap::new(),
            view_mode: self.configuration.view_mode,
        };
        tracing::debug!(product_id = %product.id, instance = self.instance, "Configuration seeded");
        self.product = Some(product);
        self.revision += 1;
    }

    /// Session reset: reseed from the current product and forget restores.
    pub fn reset(&mut self) {
        self.restored.clear();
        match self.product.clone() {
            Some(product) => self.seed(product),
            None => {
                self.configuration = Configuration::default();
                self.revision += 1;
            }
        }
    }

    /// Identity of this store instance.
    pub fn instance(&self) -> u64 {
        self.instance
    }

    /// Incremented by every successful mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn product(&self) -> Option<&Arc<Product>> {
        self.product.as_ref()
    }

    pub fn product_id(&self) -> Option<&ProductId> {
        self.product.as_ref().map(|p| &p.id)
    }

    pub fn is_seeded(&self) -> bool {
        self.product.is_some()
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Deep copy of the current configuration.
    pub fn snapshot(&self) -> Configuration {
        self.configuration.clone()
    }

    fn catalog(&self, category: &str) -> Result<&Arc<Product>, ConfiguratorError> {
        self.product.as_ref().ok_or_else(|| {
            ConfiguratorError::invalid_selection(category, None, "catalog not loaded")
        })
    }

    /// Select a fabric, or clear it with `None`.
    pub fn set_fabric(&mut self, fabric: Option<&FabricId>) -> Result<(), ConfiguratorError> {
        let product = self.catalog("fabric")?;
        let fabric = match fabric {
            Some(id) => Some(product.fabric(id).cloned().ok_or_else(|| {
                ConfiguratorError::invalid_selection(
                    "fabric",
                    Some(id.as_str()),
                    format!("fabric {} not offered for {}", id, product.id),
                )
            })?),
            None => None,
        };
        self.configuration.fabric = fabric;
        self.revision += 1;
        Ok(())
    }

    /// Select an option in `category`, or clear the slot with `None`.
    pub fn set_selection(
        &mut self,
        category: &CategoryKey,
        option: Option<&OptionId>,
    ) -> Result<(), ConfiguratorError> {
        let product = self.catalog(category.as_str())?;
        let group = product.group(category).ok_or_else(|| {
            ConfiguratorError::invalid_selection(
                category.as_str(),
                option.map(OptionId::as_str),
                format!("no category {} in {}", category, product.id),
            )
        })?;
        let selected = match option {
            Some(id) => Some(group.option(id).cloned().ok_or_else(|| {
                ConfiguratorError::invalid_selection(
                    category.as_str(),
                    Some(id.as_str()),
                    format!("option {} does not belong to {}", id, category),
                )
            })?),
            None => None,
        };
        self.configuration
            .selections
            .insert(category.clone(), selected);
        self.revision += 1;
        Ok(())
    }

    pub fn set_measurement(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.configuration
            .measurements
            .insert(field.into(), value.into());
        self.revision += 1;
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.configuration.view_mode = mode;
        self.revision += 1;
    }

    /// Current price, or `None` before seeding.
    pub fn price(&self) -> Option<Money> {
        self.product
            .as_ref()
            .map(|p| price(&self.configuration, p))
    }

    /// Current render layers; empty before seeding.
    pub fn layers(&self) -> Vec<RenderLayer> {
        self.product
            .as_ref()
            .map(|p| resolve_layers(&self.configuration, p))
            .unwrap_or_default()
    }

    pub(crate) fn was_restored(&self, id: &DesignId) -> bool {
        self.restored.contains(id)
    }

    pub(crate) fn mark_restored(&mut self, id: DesignId) {
        self.restored.insert(id);
    }
}

impl Default for ConfigurationStore {
    fn default() -> Self {
        Self::new()
    }
}
