use std::path::PathBuf;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::Result;
use crate::models::{
    AllergenInfo, EnrichedIndex, EnrichedMenuItem, EnrichedRestaurant, Nutrition, ServingVariant,
};
use crate::store::DataStore;

static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([0-9]+\.?[0-9]*)").unwrap());

const ID_LEN: usize = 32;

/// sha256 over the non-empty parts joined with `|`, cut to 32 hex chars.
pub fn generate_id(parts: &[&str]) -> String {
    let composite = parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("|");
    let mut id = hex::encode(Sha256::digest(composite.as_bytes()));
    id.truncate(ID_LEN);
    id
}

/// First number in a nutrient value: "1,230mg" → 1230.0, "<1g" → 1.0.
pub fn parse_number(text: &str) -> Option<f64> {
    let cleaned = text.replace([',', '<', '>'], "");
    NUMBER
        .captures(cleaned.trim())
        .and_then(|c| c[1].parse().ok())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantBrand {
    #[serde(rename = "_id")]
    pub id: String,
    pub brand_name: String,
    pub brand_image_url: Option<String>,
    pub source_url: Option<String>,
    pub eatery_full_verification_status: bool,
    pub creation_date: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    #[serde(rename = "_id")]
    pub id: String,
    pub restaurant_brand_id: String,
    pub name: String,
    pub category: String,
    pub is_active: bool,
    pub source_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServingInfo {
    pub serving_text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein_g: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbs_g: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fat_g: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saturated_fat_g: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trans_fat_g: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cholesterol_mg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sodium_mg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiber_g: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sugars_g: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added_sugars_g: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vitamin_d_mcg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calcium_mg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iron_mg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub potassium_mg: Option<f64>,
}

impl NutritionInfo {
    /// Map scraped nutrient keys onto numeric fields. Unknown keys and
    /// values without a number are dropped.
    pub fn from_scraped(nutrition: &Nutrition) -> Self {
        let mut info = NutritionInfo::default();
        for (key, value) in nutrition {
            let Some(slot) = info.field_mut(key) else {
                continue;
            };
            if let Some(n) = parse_number(value) {
                *slot = Some(n);
            }
        }
        info
    }

    fn field_mut(&mut self, scraped_key: &str) -> Option<&mut Option<f64>> {
        let slot = match scraped_key {
            "calories" => &mut self.calories,
            "protein" => &mut self.protein_g,
            "total_carbohydrates" | "carbohydrates" => &mut self.carbs_g,
            "total_fat" | "fat" => &mut self.fat_g,
            "saturated_fat" => &mut self.saturated_fat_g,
            "trans_fat" => &mut self.trans_fat_g,
            "cholesterol" => &mut self.cholesterol_mg,
            "sodium" => &mut self.sodium_mg,
            "dietary_fiber" | "fiber" => &mut self.fiber_g,
            "sugars" | "total_sugars" => &mut self.sugars_g,
            "added_sugars" => &mut self.added_sugars_g,
            "vitamin_d" => &mut self.vitamin_d_mcg,
            "calcium" => &mut self.calcium_mg,
            "iron" => &mut self.iron_mg,
            "potassium" => &mut self.potassium_mg,
            _ => return None,
        };
        Some(slot)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItemVariation {
    #[serde(rename = "_id")]
    pub id: String,
    pub menu_item_id: String,
    pub restaurant_brand_id: String,
    pub label: String,
    pub serving: ServingInfo,
    pub nutrition: NutritionInfo,
    pub allergens: AllergenInfo,
    pub ingredients: Option<String>,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct Collections {
    pub brands: Vec<RestaurantBrand>,
    pub items: Vec<MenuItem>,
    pub variations: Vec<MenuItemVariation>,
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

fn brand(name: &str, data: &EnrichedRestaurant, now: DateTime<Utc>) -> RestaurantBrand {
    RestaurantBrand {
        id: generate_id(&[name]),
        brand_name: name.to_string(),
        brand_image_url: non_empty(&data.restaurant_logo),
        source_url: non_empty(&data.url),
        eatery_full_verification_status: false,
        creation_date: now,
        last_updated: now,
    }
}

fn menu_item(brand_id: &str, item: &EnrichedMenuItem) -> MenuItem {
    MenuItem {
        id: generate_id(&[brand_id, &item.name, &item.url]),
        restaurant_brand_id: brand_id.to_string(),
        name: item.name.clone(),
        category: item.category.clone(),
        is_active: true,
        source_url: non_empty(&item.url),
    }
}

fn variation(
    item: &MenuItem,
    source: &EnrichedMenuItem,
    serving: &ServingVariant,
    now: DateTime<Utc>,
) -> MenuItemVariation {
    MenuItemVariation {
        id: generate_id(&[&item.id, &serving.size_label]),
        menu_item_id: item.id.clone(),
        restaurant_brand_id: item.restaurant_brand_id.clone(),
        label: serving.size_label.clone(),
        serving: ServingInfo {
            serving_text: serving.nutrition.get("serving_size").cloned(),
        },
        nutrition: NutritionInfo::from_scraped(&serving.nutrition),
        allergens: source.allergens.clone(),
        ingredients: non_empty(&source.ingredients),
        image_url: serving.image_url.clone(),
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

/// Flatten the enriched index into brand, item and variation collections.
pub fn transform(index: &EnrichedIndex, now: DateTime<Utc>) -> Collections {
    info!("Transforming {} restaurants", index.len());
    let mut out = Collections::default();

    for (name, data) in index {
        let brand = brand(name, data, now);
        debug!("{}: {} items", name, data.items.len());

        for source in &data.items {
            let item = menu_item(&brand.id, source);
            for serving in &source.nutritional_values.serving_sizes {
                out.variations.push(variation(&item, source, serving, now));
            }
            out.items.push(item);
        }
        out.brands.push(brand);
    }

    info!(
        "Transformed {} brands, {} items, {} variations",
        out.brands.len(),
        out.items.len(),
        out.variations.len()
    );
    out
}

/// Write the three collections with a shared timestamp suffix.
pub fn export(collections: &Collections, store: &DataStore, now: DateTime<Utc>) -> Result<Vec<PathBuf>> {
    let ts = now.format("%Y%m%d_%H%M%S").to_string();
    let files = [
        format!("restaurant_brands_{}.json", ts),
        format!("menu_items_{}.json", ts),
        format!("menu_item_variations_{}.json", ts),
    ];

    store.save_json(&collections.brands, &files[0])?;
    store.save_json(&collections.items, &files[1])?;
    store.save_json(&collections.variations, &files[2])?;

    Ok(files.iter().map(|f| store.path(f)).collect())
}
