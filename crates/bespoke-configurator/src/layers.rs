//! Layer resolver.
//!
//! Turns a configuration into the ordered image layers of the composited
//! preview. Visibility is decided before any image lookup; an option that is
//! visible then takes the first image that applies:
//!
//! 1. the per-fabric override for the active fabric and view,
//! 2. the per-view override,
//! 3. a convention-derived path, for convention-based categories,
//! 4. the default image, in the front view only.
//!
//! Nothing here fails: a missing image simply yields no layer.

use crate::catalog::{CustomizationOption, OptionGroup, Product, ViewMode};
use crate::configuration::Configuration;
use crate::ids::CategoryKey;
use serde::{Deserialize, Serialize};

/// Stacking order of the base garment; below every category.
pub const BASE_LAYER_Z_INDEX: i32 = i32::MIN;

/// One image in the composited preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderLayer {
    /// `None` for the base garment layer.
    pub category_key: Option<CategoryKey>,
    pub image: String,
    pub z_index: i32,
}

impl RenderLayer {
    pub fn is_base(&self) -> bool {
        self.category_key.is_none()
    }
}

/// Resolve every layer for `configuration`, bottom-most first.
pub fn resolve_layers(configuration: &Configuration, product: &Product) -> Vec<RenderLayer> {
    let mut layers: Vec<(i32, RenderLayer)> = product
        .option_groups
        .iter()
        .filter_map(|group| {
            let option = visible_selection(configuration, group)?;
            let image = resolve_image(configuration, product, group, option)?;
            Some((
                group.display_order,
                RenderLayer {
                    category_key: Some(group.category_key.clone()),
                    image,
                    z_index: option.z_index.unwrap_or(group.z_index),
                },
            ))
        })
        .collect();

    layers.sort_by(|(order_a, a), (order_b, b)| {
        a.z_index
            .cmp(&b.z_index)
            .then(order_a.cmp(order_b))
            .then_with(|| a.category_key.cmp(&b.category_key))
    });

    resolve_base_layer(configuration)
        .into_iter()
        .chain(layers.into_iter().map(|(_, layer)| layer))
        .collect()
}

/// The base garment image from the active fabric.
pub fn resolve_base_layer(configuration: &Configuration) -> Option<RenderLayer> {
    let fabric = configuration.fabric.as_ref()?;
    fabric
        .image_for(configuration.view_mode)
        .map(|image| RenderLayer {
            category_key: None,
            image: image.to_string(),
            z_index: BASE_LAYER_Z_INDEX,
        })
}

/// The selection of `group`, if it should be drawn at all.
fn visible_selection<'a>(
    configuration: &'a Configuration,
    group: &OptionGroup,
) -> Option<&'a CustomizationOption> {
    let option = configuration.selection(&group.category_key)?;
    if !group.is_visible_in(configuration.view_mode) {
        return None;
    }
    if is_suppressed(configuration, option) {
        return None;
    }
    Some(option)
}

/// Whether a rule carried by another category's current selection excludes
/// `option`.
pub fn is_suppressed(configuration: &Configuration, option: &CustomizationOption) -> bool {
    configuration
        .selections
        .iter()
        .filter(|(category, _)| **category != option.category_key)
        .filter_map(|(_, selected)| selected.as_ref())
        .flat_map(|selected| selected.mutually_exclusive_with.iter())
        .any(|rule| rule.category == option.category_key && rule.matches(Some(&option.id)))
}

/// First-match image for a visible option.
pub fn resolve_image(
    configuration: &Configuration,
    product: &Product,
    group: &OptionGroup,
    option: &CustomizationOption,
) -> Option<String> {
    let view = configuration.view_mode;

    let per_fabric = configuration
        .fabric
        .as_ref()
        .and_then(|f| option.per_fabric_override.get(&f.id))
        .and_then(|images| images.for_view(view));
    if let Some(image) = per_fabric {
        return Some(image.to_string());
    }

    if let Some(image) = option.per_view_override.for_view(view) {
        return Some(image.to_string());
    }

    if group.convention_based {
        let derived = configuration
            .fabric
            .as_ref()
            .and_then(|f| {
                product.convention_image(&group.category_key, &f.color_token, &option.id, view)
            });
        if let Some(image) = derived {
            return Some(image.to_string());
        }
    }

    match view {
        ViewMode::Front => option.default_image.clone(),
        ViewMode::Back => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{normalize, ProductDescriptor};
    use crate::config::ConfiguratorConfig;
    use crate::configuration::ConfigurationStore;
    use serde_json::json;
    use std::sync::Arc;

    fn product() -> Arc<Product> {
        let descriptor: ProductDescriptor = serde_json::from_value(json!({
            "id": "shirt",
            "base_price": 8500,
            "fabrics": [
                { "id": "navy", "color_token": "navy", "front_image": "navy_front.png", "back_image": "navy_back.png" },
                { "id": "white", "color_token": "white", "front_image": "white_front.png" }
            ],
            "option_groups": [
                { "category_key": "collar", "display_order": 2, "z_index": 40, "back_visible": true, "options": [
                    {
                        "id": "spread",
                        "default_image": "collar_spread.png",
                        "per_fabric_override": { "navy": { "back": "X" } },
                        "per_view_override": { "back": "Y" }
                    },
                    { "id": "band", "per_view_override": { "front": "band_front.png" }, "z_index": 5 },
                    { "id": "none" }
                ]},
                { "category_key": "sleeve", "display_order": 0, "z_index": 20, "options": [
                    { "id": "long", "default_image": "sleeve_long.png" },
                    {
                        "id": "short",
                        "default_image": "sleeve_short.png",
                        "mutually_exclusive_with": [{ "category": "cuff" }]
                    },
                    {
                        "id": "three-quarter",
                        "default_image": "sleeve_34.png",
                        "mutually_exclusive_with": [{ "category": "cuff", "option_ids": ["french"] }]
                    }
                ]},
                { "category_key": "cuff", "display_order": 1, "z_index": 30, "options": [
                    { "id": "french" },
                    { "id": "none" }
                ]},
                { "category_key": "monogram", "display_order": 3, "options": [
                    { "id": "none" }
                ]},
                { "category_key": "yoke", "display_order": 4, "z_index": 50, "options": [
                    { "id": "split", "default_image": "yoke_split.png" }
                ]}
            ]
        }))
        .unwrap();
        Arc::new(normalize(&descriptor, &ConfiguratorConfig::default()).unwrap())
    }

    fn images(layers: &[RenderLayer]) -> Vec<&str> {
        layers.iter().map(|l| l.image.as_str()).collect()
    }

    #[test]
    fn test_front_view_ordering() {
        let store = ConfigurationStore::seeded(product());
        let layers = store.layers();
        // Cuff uses the convention path for the navy fabric.
        assert_eq!(
            images(&layers),
            vec![
                "navy_front.png",
                "sleeve_long.png",
                "/assets/garments/cuff/navy/french_front.png",
                "/assets/garments/collar/navy/spread_front.png",
                "yoke_split.png",
            ]
        );
        assert!(layers[0].is_base());
        assert_eq!(layers[0].z_index, BASE_LAYER_Z_INDEX);
    }

    #[test]
    fn test_fabric_override_wins_over_view_override() {
        let mut store = ConfigurationStore::seeded(product());
        store.set_view_mode(ViewMode::Back);
        let layers = store.layers();
        let collar = layers
            .iter()
            .find(|l| l.category_key == Some("collar".into()))
            .unwrap();
        assert_eq!(collar.image, "X");
    }

    #[test]
    fn test_view_override_when_fabric_override_empty() {
        let mut store = ConfigurationStore::seeded(product());
        store.set_fabric(Some(&"white".into())).unwrap();
        store.set_view_mode(ViewMode::Back);
        let layers = store.layers();
        // White has no back image, so there is no base layer either.
        assert_eq!(images(&layers), vec!["Y"]);
    }

    #[test]
    fn test_back_view_hides_front_only_categories() {
        let mut store = ConfigurationStore::seeded(product());
        store.set_view_mode(ViewMode::Back);
        let keys: Vec<Option<CategoryKey>> =
            store.layers().into_iter().map(|l| l.category_key).collect();
        assert_eq!(keys, vec![None, Some("collar".into())]);
    }

    #[test]
    fn test_default_image_never_used_for_back() {
        // Yoke is back-visible but only has a front-view default image.
        let mut store = ConfigurationStore::seeded(product());
        assert!(images(&store.layers()).contains(&"yoke_split.png"));
        store.set_view_mode(ViewMode::Back);
        assert!(store
            .layers()
            .iter()
            .all(|l| l.category_key != Some("yoke".into())));
    }

    #[test]
    fn test_short_sleeve_suppresses_cuff() {
        let mut store = ConfigurationStore::seeded(product());
        store.set_selection(&"sleeve".into(), Some(&"short".into())).unwrap();
        let layers = store.layers();
        assert!(layers.iter().all(|l| l.category_key != Some("cuff".into())));
        assert!(images(&layers).contains(&"sleeve_short.png"));
    }

    #[test]
    fn test_exclusion_limited_to_listed_options() {
        let mut store = ConfigurationStore::seeded(product());
        store
            .set_selection(&"sleeve".into(), Some(&"three-quarter".into()))
            .unwrap();
        assert!(store
            .layers()
            .iter()
            .all(|l| l.category_key != Some("cuff".into())));

        store.set_selection(&"cuff".into(), Some(&"none".into())).unwrap();
        let layers = store.layers();
        assert!(images(&layers).contains(&"/assets/garments/cuff/navy/none_front.png"));
        assert!(images(&layers).contains(&"sleeve_34.png"));
    }

    #[test]
    fn test_shared_option_id_resolves_per_category() {
        let mut store = ConfigurationStore::seeded(product());
        store.set_selection(&"collar".into(), Some(&"none".into())).unwrap();
        store.set_selection(&"cuff".into(), Some(&"none".into())).unwrap();
        let layers = store.layers();

        let image_for = |key: &str| {
            layers
                .iter()
                .find(|l| l.category_key == Some(key.into()))
                .map(|l| l.image.as_str())
        };
        assert_eq!(image_for("collar"), Some("/assets/garments/collar/navy/none_front.png"));
        assert_eq!(image_for("cuff"), Some("/assets/garments/cuff/navy/none_front.png"));
    }

    #[test]
    fn test_empty_slot_yields_no_layer() {
        let mut store = ConfigurationStore::seeded(product());
        store.set_selection(&"sleeve".into(), None).unwrap();
        assert!(store
            .layers()
            .iter()
            .all(|l| l.category_key != Some("sleeve".into())));
    }

    #[test]
    fn test_option_without_any_image_yields_no_layer() {
        let store = ConfigurationStore::seeded(product());
        assert!(store
            .layers()
            .iter()
            .all(|l| l.category_key != Some("monogram".into())));
    }

    #[test]
    fn test_option_z_index_override() {
        let mut store = ConfigurationStore::seeded(product());
        store.set_selection(&"collar".into(), Some(&"band".into())).unwrap();
        let layers = store.layers();
        assert_eq!(layers[1].image, "band_front.png");
        assert_eq!(layers[1].z_index, 5);
    }

    #[test]
    fn test_no_fabric_means_no_base_and_no_convention() {
        let mut store = ConfigurationStore::seeded(product());
        store.set_fabric(None).unwrap();
        let layers = store.layers();
        assert!(layers.iter().all(|l| !l.is_base()));
        // Collar falls back to its default image; cuff has none.
        assert_eq!(images(&layers), vec!["sleeve_long.png", "collar_spread.png", "yoke_split.png"]);
    }
}
