//! Product catalog module.
//!
//! Contains the canonical product shapes, descriptor normalization, the
//! catalog loader and the publication slot restores wait on.

mod convention;
mod descriptor;
mod loader;
mod product;
mod retry;
mod watch;

pub use convention::ConventionTable;
pub use descriptor::{
    normalize, FabricDescriptor, GroupDescriptor, OptionDescriptor, ProductDescriptor,
};
pub use loader::{CatalogLoader, CatalogSource, SourceError, StaticCatalogSource};
pub use product::{
    CustomizationOption, ExclusionRule, FabricOption, OptionGroup, Product, ViewImages, ViewMode,
};
pub use retry::{Backoff, RetryPolicy};
pub use watch::{CatalogSlot, CatalogWatch};
