//! Product, fabric and option types.

use crate::catalog::ConventionTable;
use crate::ids::{CategoryKey, ColorToken, FabricId, OptionId, ProductId};
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Camera angle of the composited preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Front,
    Back,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Front => "front",
            ViewMode::Back => "back",
        }
    }

    pub const ALL: [ViewMode; 2] = [ViewMode::Front, ViewMode::Back];
}

/// Optional front and back image references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ViewImages {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back: Option<String>,
}

impl ViewImages {
    pub fn new(front: Option<String>, back: Option<String>) -> Self {
        Self { front, back }
    }

    /// The image for `view`, if one is set.
    pub fn for_view(&self, view: ViewMode) -> Option<&str> {
        match view {
            ViewMode::Front => self.front.as_deref(),
            ViewMode::Back => self.back.as_deref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.front.is_none() && self.back.is_none()
    }
}

/// A fabric the garment can be cut from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FabricOption {
    pub id: FabricId,
    pub name: String,
    pub price_modifier: Money,
    /// Base garment image for the front view.
    pub front_image: Option<String>,
    /// Base garment image for the back view.
    pub back_image: Option<String>,
    /// Color family used by convention-derived option images.
    pub color_token: ColorToken,
}

impl FabricOption {
    /// The base garment image for `view`.
    pub fn image_for(&self, view: ViewMode) -> Option<&str> {
        match view {
            ViewMode::Front => self.front_image.as_deref(),
            ViewMode::Back => self.back_image.as_deref(),
        }
    }
}

/// Carried by an option; while that option is selected, the layer of
/// `category` is suppressed if its selection is one of `option_ids`.
///
/// An empty `option_ids` list matches any selection in `category`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionRule {
    pub category: CategoryKey,
    #[serde(default)]
    pub option_ids: Vec<OptionId>,
}

impl ExclusionRule {
    /// Whether the rule suppresses `selected`, the current choice in its category.
    pub fn matches(&self, selected: Option<&OptionId>) -> bool {
        match selected {
            None => false,
            Some(id) => self.option_ids.is_empty() || self.option_ids.contains(id),
        }
    }
}

/// One choice within a customization category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomizationOption {
    pub id: OptionId,
    pub category_key: CategoryKey,
    pub name: String,
    pub price_modifier: Money,
    /// Front-view asset used when nothing more specific applies.
    pub default_image: Option<String>,
    pub per_fabric_override: BTreeMap<FabricId, ViewImages>,
    pub per_view_override: ViewImages,
    pub is_default_choice: bool,
    /// Overrides the category's stacking order.
    pub z_index: Option<i32>,
    pub mutually_exclusive_with: Vec<ExclusionRule>,
}

/// A customization category and its options.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionGroup {
    pub category_key: CategoryKey,
    pub name: String,
    pub display_order: i32,
    pub z_index: i32,
    /// Whether the category is drawn in the back view.
    pub back_visible: bool,
    /// Whether option images derive from fabric color and option id.
    pub convention_based: bool,
    pub options: Vec<CustomizationOption>,
}

impl OptionGroup {
    pub fn option(&self, id: &OptionId) -> Option<&CustomizationOption> {
        self.options.iter().find(|o| &o.id == id)
    }

    /// First option flagged as default, else the first option.
    pub fn default_option(&self) -> Option<&CustomizationOption> {
        self.options
            .iter()
            .find(|o| o.is_default_choice)
            .or_else(|| self.options.first())
    }

    pub fn is_visible_in(&self, view: ViewMode) -> bool {
        match view {
            ViewMode::Front => true,
            ViewMode::Back => self.back_visible,
        }
    }
}

/// A customizable garment, immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub base_price: Money,
    pub fabric_options: Vec<FabricOption>,
    /// Sorted by display order.
    pub option_groups: Vec<OptionGroup>,
    pub(crate) conventions: ConventionTable,
}

impl Product {
    pub fn currency(&self) -> Currency {
        self.base_price.currency
    }

    pub fn group(&self, key: &CategoryKey) -> Option<&OptionGroup> {
        self.option_groups.iter().find(|g| &g.category_key == key)
    }

    pub fn has_category(&self, key: &CategoryKey) -> bool {
        self.group(key).is_some()
    }

    pub fn fabric(&self, id: &FabricId) -> Option<&FabricOption> {
        self.fabric_options.iter().find(|f| &f.id == id)
    }

    pub fn option(&self, category: &CategoryKey, id: &OptionId) -> Option<&CustomizationOption> {
        self.group(category).and_then(|g| g.option(id))
    }

    /// Convention-derived image for an option, if the combination is in the table.
    pub fn convention_image(
        &self,
        category: &CategoryKey,
        color: &ColorToken,
        option: &OptionId,
        view: ViewMode,
    ) -> Option<&str> {
        self.conventions.get(category, color, option, view)
    }

    pub fn category_keys(&self) -> impl Iterator<Item = &CategoryKey> {
        self.option_groups.iter().map(|g| &g.category_key)
    }
}
