//! Configuration engine for made-to-measure garments.
//!
//! A customer picks a fabric and one option per customization category
//! (collar, cuff, sleeve and so on). The engine keeps that configuration
//! consistent with the product catalog and derives everything else from it:
//!
//! - **Catalog**: product descriptors, normalization, loading with retry
//! - **Configuration**: the single mutable selection state per session
//! - **Pricing**: deterministic totals in integer minor units
//! - **Layers**: ordered image layers for the front and back previews
//! - **Designs**: saved designs across device and account stores, plus restore
//! - **Cart**: frozen line items and order submission
//!
//! # Example
//!
//! ```rust,ignore
//! use bespoke_configurator::prelude::*;
//!
//! let slot = CatalogSlot::new();
//! let loader = CatalogLoader::new(source, config.clone());
//! let product = loader.load_into(&ProductId::new("oxford-shirt"), &slot).await?;
//!
//! let mut store = ConfigurationStore::seeded(product);
//! store.set_fabric(Some(&FabricId::new("champagne")))?;
//! store.set_selection(&CategoryKey::new("collar"), Some(&OptionId::new("spread")))?;
//!
//! if let Some(total) = store.price() {
//!     println!("Total: {}", total.display());
//! }
//! for layer in store.layers() {
//!     draw(&layer.image, layer.z_index);
//! }
//! ```

pub mod config;
pub mod error;
pub mod ids;
pub mod money;

pub mod cart;
pub mod catalog;
pub mod configuration;
pub mod designs;
pub mod layers;
pub mod pricing;

pub use config::ConfiguratorConfig;
pub use error::ConfiguratorError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::{ConfiguratorConfig, RetrySettings};
    pub use crate::error::ConfiguratorError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    // Catalog
    pub use crate::catalog::{
        CatalogLoader, CatalogSlot, CatalogSource, CatalogWatch, CustomizationOption,
        FabricOption, OptionGroup, Product, ProductDescriptor, ViewMode,
    };

    // Configuration
    pub use crate::configuration::{Configuration, ConfigurationStore};
    pub use crate::layers::{resolve_layers, RenderLayer};
    pub use crate::pricing::{price, PriceMemo};

    // Designs
    pub use crate::designs::{
        DesignCoordinator, DesignListing, LocalDesignStore, Origin, RemoteDesignStore,
        RestoreReport, RestoreState, SavedDesign, SessionToken,
    };

    // Cart
    pub use crate::cart::{
        submit_order, to_line_item, Cart, Customer, LineItem, OrderService, PaymentMethod,
    };
}
