//! Wire shape of a product descriptor and its normalization.
//!
//! Catalog records arrive in two historical shapes: a generic list of
//! option groups, and named per-category fields (`collars`, `cuffs`, ...).
//! Normalization folds both into one `OptionGroup` per category key.

use crate::catalog::{
    ConventionTable, CustomizationOption, ExclusionRule, FabricOption, OptionGroup, Product,
    ViewImages,
};
use crate::config::ConfiguratorConfig;
use crate::error::ConfiguratorError;
use crate::ids::{CategoryKey, ColorToken, FabricId, OptionId, ProductId};
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Product record as returned by the catalog service.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductDescriptor {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Base price in minor units.
    pub base_price: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default)]
    pub fabrics: Vec<FabricDescriptor>,
    #[serde(default)]
    pub option_groups: Vec<GroupDescriptor>,

    // Legacy named per-category fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub collars: Vec<OptionDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cuffs: Vec<OptionDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sleeves: Vec<OptionDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pockets: Vec<OptionDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plackets: Vec<OptionDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FabricDescriptor {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price_modifier: i64,
    #[serde(default)]
    pub front_image: Option<String>,
    #[serde(default)]
    pub back_image: Option<String>,
    #[serde(default)]
    pub color_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GroupDescriptor {
    pub category_key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_order: Option<i32>,
    #[serde(default)]
    pub z_index: Option<i32>,
    #[serde(default)]
    pub back_visible: Option<bool>,
    #[serde(default)]
    pub options: Vec<OptionDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OptionDescriptor {
    pub id: String,
    /// Optional in the wire shape; must agree with the enclosing group.
    #[serde(default)]
    pub category_key: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price_modifier: i64,
    #[serde(default)]
    pub default_image: Option<String>,
    #[serde(default)]
    pub per_fabric_override: BTreeMap<String, ViewImages>,
    #[serde(default)]
    pub per_view_override: ViewImages,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub z_index: Option<i32>,
    #[serde(default)]
    pub mutually_exclusive_with: Vec<ExclusionRule>,
}

impl ProductDescriptor {
    /// Legacy fields paired with the category key they stand for.
    fn legacy_groups(&self) -> [(&'static str, &Vec<OptionDescriptor>); 5] {
        [
            ("collar", &self.collars),
            ("cuff", &self.cuffs),
            ("sleeve", &self.sleeves),
            ("pocket", &self.pockets),
            ("placket", &self.plackets),
        ]
    }
}

fn malformed(product: &str, reason: impl Into<String>) -> ConfiguratorError {
    ConfiguratorError::CatalogLoad(format!("malformed product {}: {}", product, reason.into()))
}

/// Treat empty and whitespace-only image references as absent.
fn non_empty(image: &Option<String>) -> Option<String> {
    image
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn normalize_images(images: &ViewImages) -> ViewImages {
    ViewImages::new(non_empty(&images.front), non_empty(&images.back))
}

/// Convert a descriptor into the canonical, validated [`Product`].
pub fn normalize(
    descriptor: &ProductDescriptor,
    config: &ConfiguratorConfig,
) -> Result<Product, ConfiguratorError> {
    let product_id = descriptor.id.trim();
    if product_id.is_empty() {
        return Err(malformed("<unnamed>", "empty product id"));
    }

    let currency = match descriptor.currency.as_deref() {
        Some(code) => Currency::from_code(code)
            .ok_or_else(|| malformed(product_id, format!("unknown currency {}", code)))?,
        None => config.currency,
    };

    if descriptor.base_price < 0 {
        return Err(malformed(product_id, "negative base price"));
    }

    let fabric_options = normalize_fabrics(product_id, &descriptor.fabrics, currency)?;
    let fabric_ids: HashSet<&FabricId> = fabric_options.iter().map(|f| &f.id).collect();

    // Generic groups first, then legacy named fields folded in.
    let mut raw_groups: Vec<(String, &GroupDescriptor)> = Vec::new();
    let mut seen_keys = HashSet::new();
    for group in &descriptor.option_groups {
        let key = group.category_key.trim().to_string();
        if key.is_empty() {
            return Err(malformed(product_id, "empty category key"));
        }
        if !seen_keys.insert(key.clone()) {
            return Err(malformed(product_id, format!("duplicate category {}", key)));
        }
        raw_groups.push((key, group));
    }

    let mut option_groups = Vec::with_capacity(raw_groups.len() + 5);
    for (index, (key, group)) in raw_groups.iter().enumerate() {
        let display_order = group.display_order.unwrap_or(index as i32);
        option_groups.push(OptionGroup {
            category_key: CategoryKey::new(key.clone()),
            name: if group.name.is_empty() { key.clone() } else { group.name.clone() },
            display_order,
            z_index: group.z_index.unwrap_or((display_order + 1) * 10),
            back_visible: group
                .back_visible
                .unwrap_or_else(|| config.is_back_visible_by_default(key)),
            convention_based: config.is_convention_category(key),
            options: Vec::new(),
        });
    }

    for (key, options) in descriptor.legacy_groups() {
        if options.is_empty() || seen_keys.contains(key) {
            continue;
        }
        let display_order = option_groups.len() as i32;
        option_groups.push(OptionGroup {
            category_key: CategoryKey::new(key),
            name: key.to_string(),
            display_order,
            z_index: (display_order + 1) * 10,
            back_visible: config.is_back_visible_by_default(key),
            convention_based: config.is_convention_category(key),
            options: Vec::new(),
        });
    }

    for group in option_groups.iter_mut() {
        let mut option_ids = HashSet::new();
        let key = group.category_key.as_str().to_string();
        let generic = raw_groups
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, g)| g.options.as_slice())
            .unwrap_or(&[]);
        let legacy = descriptor
            .legacy_groups()
            .into_iter()
            .find(|(k, _)| *k == key)
            .map(|(_, opts)| opts.as_slice())
            .unwrap_or(&[]);

        for raw in generic.iter().chain(legacy.iter()) {
            let option = normalize_option(product_id, &group.category_key, raw, currency, &fabric_ids)?;
            if !option_ids.insert(option.id.clone()) {
                return Err(malformed(
                    product_id,
                    format!("duplicate option {} in {}", option.id, key),
                ));
            }
            group.options.push(option);
        }
    }

    option_groups.sort_by_key(|g| g.display_order);

    let conventions = ConventionTable::build(&fabric_options, &option_groups, &config.asset_root);
    tracing::debug!(
        product_id,
        groups = option_groups.len(),
        fabrics = fabric_options.len(),
        convention_paths = conventions.len(),
        "Normalized product descriptor"
    );

    Ok(Product {
        id: ProductId::new(product_id),
        name: descriptor.name.clone(),
        base_price: Money::new(descriptor.base_price, currency),
        fabric_options,
        option_groups,
        conventions,
    })
}

fn normalize_fabrics(
    product_id: &str,
    fabrics: &[FabricDescriptor],
    currency: Currency,
) -> Result<Vec<FabricOption>, ConfiguratorError> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(fabrics.len());
    for raw in fabrics {
        let id = raw.id.trim();
        if id.is_empty() {
            return Err(malformed(product_id, "empty fabric id"));
        }
        if !seen.insert(id.to_string()) {
            return Err(malformed(product_id, format!("duplicate fabric {}", id)));
        }
        out.push(FabricOption {
            id: FabricId::new(id),
            name: if raw.name.is_empty() { id.to_string() } else { raw.name.clone() },
            price_modifier: Money::new(raw.price_modifier, currency),
            front_image: non_empty(&raw.front_image),
            back_image: non_empty(&raw.back_image),
            color_token: ColorToken::new(raw.color_token.as_deref().unwrap_or("").trim()),
        });
    }
    Ok(out)
}

fn normalize_option(
    product_id: &str,
    category: &CategoryKey,
    raw: &OptionDescriptor,
    currency: Currency,
    fabric_ids: &HashSet<&FabricId>,
) -> Result<CustomizationOption, ConfiguratorError> {
    let id = raw.id.trim();
    if id.is_empty() {
        return Err(malformed(product_id, format!("empty option id in {}", category)));
    }
    if let Some(declared) = raw.category_key.as_deref() {
        if declared != category.as_str() {
            return Err(malformed(
                product_id,
                format!("option {} declares {} but is listed under {}", id, declared, category),
            ));
        }
    }

    let mut per_fabric_override = BTreeMap::new();
    for (fabric, images) in &raw.per_fabric_override {
        let fabric = FabricId::new(fabric.as_str());
        if !fabric_ids.contains(&fabric) {
            tracing::warn!(product_id, option = id, fabric = %fabric, "Dropping override for unknown fabric");
            continue;
        }
        let images = normalize_images(images);
        if !images.is_empty() {
            per_fabric_override.insert(fabric, images);
        }
    }

    Ok(CustomizationOption {
        id: OptionId::new(id),
        category_key: category.clone(),
        name: if raw.name.is_empty() { id.to_string() } else { raw.name.clone() },
        price_modifier: Money::new(raw.price_modifier, currency),
        default_image: non_empty(&raw.default_image),
        per_fabric_override,
        per_view_override: normalize_images(&raw.per_view_override),
        is_default_choice: raw.is_default,
        z_index: raw.z_index,
        mutually_exclusive_with: raw
            .mutually_exclusive_with
            .iter()
            .filter(|rule| &rule.category != category)
            .cloned()
            .collect(),
    })
}
