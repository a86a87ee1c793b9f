#![allow(dead_code)]

use bespoke_cache::Cache;
use bespoke_configurator::catalog::{normalize, OptionDescriptor, Product, ProductDescriptor};
use bespoke_configurator::designs::{DesignCoordinator, InMemoryRemoteStore, LocalDesignStore};
use bespoke_configurator::ConfiguratorConfig;
use serde_json::json;
use std::sync::Arc;

pub fn config() -> ConfiguratorConfig {
    ConfiguratorConfig {
        hydrate_timeout_ms: 100,
        ..ConfiguratorConfig::default()
    }
}

pub fn shirt_descriptor() -> ProductDescriptor {
    serde_json::from_value(json!({
        "id": "oxford-shirt",
        "name": "Oxford Shirt",
        "base_price": 8500,
        "fabrics": [
            { "id": "white", "color_token": "white", "front_image": "white_front.png", "back_image": "white_back.png" },
            { "id": "champagne", "price_modifier": 200, "color_token": "champagne", "front_image": "champagne_front.png" },
            { "id": "navy", "price_modifier": 300, "color_token": "navy", "front_image": "navy_front.png", "back_image": "navy_back.png" }
        ],
        "option_groups": [
            { "category_key": "sleeve", "display_order": 0, "z_index": 20, "options": [
                { "id": "long", "default_image": "sleeve_long.png" },
                { "id": "short", "price_modifier": -500, "default_image": "sleeve_short.png" }
            ]},
            { "category_key": "collar", "display_order": 1, "z_index": 40, "back_visible": true, "options": [
                { "id": "point" },
                {
                    "id": "spread",
                    "price_modifier": 250,
                    "per_fabric_override": { "navy": { "back": "X" } },
                    "per_view_override": { "back": "Y" }
                }
            ]},
            { "category_key": "pocket", "display_order": 2, "z_index": 30, "options": [
                { "id": "patch", "is_default": true },
                { "id": "flap", "price_modifier": 150 }
            ]}
        ]
    }))
    .expect("fixture descriptor")
}

pub fn shirt() -> Arc<Product> {
    normalized(&shirt_descriptor())
}

pub fn normalized(descriptor: &ProductDescriptor) -> Arc<Product> {
    Arc::new(normalize(descriptor, &config()).expect("fixture normalizes"))
}

/// The shirt without the `category` group.
pub fn shirt_without_category(category: &str) -> Arc<Product> {
    let mut descriptor = shirt_descriptor();
    descriptor.option_groups.retain(|g| g.category_key != category);
    normalized(&descriptor)
}

/// The shirt without the `fabric` fabric.
pub fn shirt_without_fabric(fabric: &str) -> Arc<Product> {
    let mut descriptor = shirt_descriptor();
    descriptor.fabrics.retain(|f| f.id != fabric);
    normalized(&descriptor)
}

/// The shirt with a plain `option` appended to each of `categories`.
pub fn shirt_with_option(categories: &[&str], option: &str) -> Arc<Product> {
    let mut descriptor = shirt_descriptor();
    for group in descriptor
        .option_groups
        .iter_mut()
        .filter(|g| categories.contains(&g.category_key.as_str()))
    {
        group.options.push(OptionDescriptor {
            id: option.to_string(),
            ..OptionDescriptor::default()
        });
    }
    normalized(&descriptor)
}

/// The shirt with `option` removed from `category`.
pub fn shirt_without(category: &str, option: &str) -> Arc<Product> {
    let mut descriptor = shirt_descriptor();
    for group in descriptor
        .option_groups
        .iter_mut()
        .filter(|g| g.category_key == category)
    {
        group.options.retain(|o| o.id != option);
    }
    normalized(&descriptor)
}

pub fn coordinator(remote: Arc<InMemoryRemoteStore>) -> DesignCoordinator {
    coordinator_with(remote, config())
}

pub fn coordinator_with(remote: Arc<InMemoryRemoteStore>, config: ConfiguratorConfig) -> DesignCoordinator {
    let local = LocalDesignStore::new(Cache::in_memory(), &config.device_scope, config.local_capacity);
    DesignCoordinator::new(local, remote, &config)
}
