//! Convention-derived image paths for legacy option families.
//!
//! Some categories ship assets laid out by naming convention rather than
//! listing per-option images. The full set of valid paths is enumerated once
//! when the catalog loads; anything outside it resolves to no image.

use crate::catalog::{FabricOption, OptionGroup, ViewMode};
use crate::ids::{CategoryKey, ColorToken, OptionId};
use std::collections::HashMap;

type ConventionKey = (CategoryKey, ColorToken, OptionId, ViewMode);

/// Lookup table from (category, color, option, view) to an asset path.
///
/// Option ids are only unique within a category, so the category is part
/// of the key.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConventionTable {
    paths: HashMap<ConventionKey, String>,
}

impl ConventionTable {
    /// Enumerate every convention path for the given catalog.
    ///
    /// The domain is every fabric color token crossed with every option of a
    /// convention-based category, in the views that category is visible in.
    pub fn build(fabrics: &[FabricOption], groups: &[OptionGroup], asset_root: &str) -> Self {
        let root = asset_root.trim_end_matches('/');
        let mut paths = HashMap::new();

        let colors: Vec<&ColorToken> = fabrics
            .iter()
            .map(|f| &f.color_token)
            .filter(|c| !c.as_str().is_empty())
            .collect();

        for group in groups.iter().filter(|g| g.convention_based) {
            for option in &group.options {
                for view in ViewMode::ALL {
                    if !group.is_visible_in(view) {
                        continue;
                    }
                    for color in &colors {
                        let path = format!(
                            "{}/{}/{}/{}_{}.png",
                            root,
                            group.category_key,
                            color,
                            option.id,
                            view.as_str()
                        );
                        let key = (
                            group.category_key.clone(),
                            (*color).clone(),
                            option.id.clone(),
                            view,
                        );
                        paths.insert(key, path);
                    }
                }
            }
        }

        Self { paths }
    }

    pub fn get(
        &self,
        category: &CategoryKey,
        color: &ColorToken,
        option: &OptionId,
        view: ViewMode,
    ) -> Option<&str> {
        self.paths
            .get(&(category.clone(), color.clone(), option.clone(), view))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CustomizationOption;
    use crate::ids::FabricId;
    use crate::money::{Currency, Money};
    use std::collections::BTreeMap;

    fn fabric(id: &str, color: &str) -> FabricOption {
        FabricOption {
            id: FabricId::new(id),
            name: id.to_string(),
            price_modifier: Money::zero(Currency::USD),
            front_image: None,
            back_image: None,
            color_token: ColorToken::new(color),
        }
    }

    fn group(key: &str, convention: bool, back_visible: bool, options: &[&str]) -> OptionGroup {
        OptionGroup {
            category_key: CategoryKey::new(key),
            name: key.to_string(),
            display_order: 0,
            z_index: 10,
            back_visible,
            convention_based: convention,
            options: options
                .iter()
                .map(|id| CustomizationOption {
                    id: OptionId::new(*id),
                    category_key: CategoryKey::new(key),
                    name: id.to_string(),
                    price_modifier: Money::zero(Currency::USD),
                    default_image: None,
                    per_fabric_override: BTreeMap::new(),
                    per_view_override: Default::default(),
                    is_default_choice: false,
                    z_index: None,
                    mutually_exclusive_with: Vec::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_enumerates_front_only_domain() {
        let fabrics = vec![fabric("navy-twill", "navy"), fabric("plain", "")];
        let groups = vec![
            group("collar", true, false, &["spread", "button-down"]),
            group("sleeve", false, false, &["long"]),
        ];
        let table = ConventionTable::build(&fabrics, &groups, "/assets/");

        // One color, two options, front view only.
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.get(&"collar".into(), &ColorToken::new("navy"), &OptionId::new("spread"), ViewMode::Front),
            Some("/assets/collar/navy/spread_front.png")
        );
        assert_eq!(
            table.get(&"collar".into(), &ColorToken::new("navy"), &OptionId::new("spread"), ViewMode::Back),
            None
        );
        assert_eq!(
            table.get(&"sleeve".into(), &ColorToken::new("navy"), &OptionId::new("long"), ViewMode::Front),
            None
        );
    }

    #[test]
    fn test_back_visible_group_includes_back_view() {
        let fabrics = vec![fabric("navy-twill", "navy")];
        let groups = vec![group("collar", true, true, &["spread"])];
        let table = ConventionTable::build(&fabrics, &groups, "/a");
        assert_eq!(
            table.get(&"collar".into(), &ColorToken::new("navy"), &OptionId::new("spread"), ViewMode::Back),
            Some("/a/collar/navy/spread_back.png")
        );
    }

    #[test]
    fn test_unknown_color_outside_domain() {
        let fabrics = vec![fabric("navy-twill", "navy")];
        let groups = vec![group("cuff", true, false, &["french"])];
        let table = ConventionTable::build(&fabrics, &groups, "/a");
        assert!(table
            .get(&"cuff".into(), &ColorToken::new("crimson"), &OptionId::new("french"), ViewMode::Front)
            .is_none());
    }

    #[test]
    fn test_shared_option_id_kept_per_category() {
        let fabrics = vec![fabric("navy-twill", "navy")];
        let groups = vec![
            group("collar", true, false, &["none"]),
            group("pocket", true, false, &["none"]),
        ];
        let table = ConventionTable::build(&fabrics, &groups, "/a");

        assert_eq!(table.len(), 2);
        assert_eq!(
            table.get(&"collar".into(), &ColorToken::new("navy"), &OptionId::new("none"), ViewMode::Front),
            Some("/a/collar/navy/none_front.png")
        );
        assert_eq!(
            table.get(&"pocket".into(), &ColorToken::new("navy"), &OptionId::new("none"), ViewMode::Front),
            Some("/a/pocket/navy/none_front.png")
        );
    }
}
