use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub const UNCATEGORIZED: &str = "Uncategorized";
pub const SINGLE_SERVING: &str = "1 serving";

// ── Stage 1: restaurants ──

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restaurant {
    pub name: String,
    pub url: String,
}

// ── Stage 2: menu items ──

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItemRef {
    pub name: String,
    pub url: String,
    pub category: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RestaurantMenu {
    pub url: String,
    #[serde(default)]
    pub restaurant_logo: String,
    #[serde(default)]
    pub items: Vec<MenuItemRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Restaurant name → menu, in scrape order.
pub type MenuIndex = IndexMap<String, RestaurantMenu>;

// ── Stage 3: nutrition detail ──

/// Snake-cased nutrient name → raw value text ("25g"). Open key set.
pub type Nutrition = IndexMap<String, String>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServingVariant {
    pub size_label: String,
    #[serde(default)]
    pub nutrition: Nutrition,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllergenInfo {
    #[serde(default)]
    pub contains: Vec<String>,
    #[serde(default)]
    pub does_not_contain: Vec<String>,
    #[serde(default)]
    pub unknown: Vec<String>,
    #[serde(default)]
    pub allergy_information: String,
}

impl AllergenInfo {
    /// True when any of the three allergen buckets has an entry.
    pub fn has_allergens(&self) -> bool {
        !(self.contains.is_empty() && self.does_not_contain.is_empty() && self.unknown.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionalValues {
    #[serde(default)]
    pub serving_sizes: Vec<ServingVariant>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedMenuItem {
    pub name: String,
    pub url: String,
    pub category: String,
    #[serde(default)]
    pub nutritional_values: NutritionalValues,
    #[serde(default)]
    pub allergens: AllergenInfo,
    #[serde(default)]
    pub ingredients: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EnrichedMenuItem {
    /// An item with no detail data yet.
    pub fn bare(item: &MenuItemRef) -> Self {
        EnrichedMenuItem {
            name: item.name.clone(),
            url: item.url.clone(),
            category: item.category.clone(),
            nutritional_values: NutritionalValues::default(),
            allergens: AllergenInfo::default(),
            ingredients: String::new(),
            error: None,
        }
    }

    /// Placeholder kept in the output when detail extraction failed.
    pub fn failed(item: &MenuItemRef, error: impl Into<String>) -> Self {
        EnrichedMenuItem {
            error: Some(error.into()),
            ..Self::bare(item)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRestaurant {
    pub url: String,
    #[serde(default)]
    pub restaurant_logo: String,
    #[serde(default)]
    pub items: Vec<EnrichedMenuItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EnrichedRestaurant {
    pub fn variation_count(&self) -> usize {
        self.items
            .iter()
            .map(|i| i.nutritional_values.serving_sizes.len())
            .sum()
    }
}

/// Restaurant name → enriched menu, in scrape order.
pub type EnrichedIndex = IndexMap<String, EnrichedRestaurant>;
