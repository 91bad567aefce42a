use std::time::Duration;

use tracing::{debug, error, info, warn};
use url::Url;

use super::progress_bar;
use crate::error::Result;
use crate::fetch::{PageFetcher, Transport};
use crate::models::{
    AllergenInfo, EnrichedIndex, EnrichedMenuItem, EnrichedRestaurant, MenuIndex, MenuItemRef,
    NutritionalValues, ServingVariant, SINGLE_SERVING,
};
use crate::parser;
use crate::parser::detail::SizeOption;
use crate::store::CheckpointStore;

/// Pauses applied on top of the fetcher's own rate limit.
#[derive(Debug, Clone, Copy)]
pub struct Delays {
    pub item: Duration,
    pub restaurant: Duration,
}

/// Stage 3: nutrition, allergens, ingredients and photos for every item.
///
/// Item failures become placeholder items with an `error`; each finished
/// restaurant is checkpointed when a store is given.
pub async fn scrape<T: Transport>(
    fetcher: &mut PageFetcher<T>,
    base: &Url,
    menus: &MenuIndex,
    delays: Delays,
    checkpoints: Option<&CheckpointStore>,
) -> EnrichedIndex {
    let total = menus.len();
    let total_items: usize = menus.values().map(|m| m.items.len()).sum();
    info!(
        "Scraping nutrition for {} restaurants ({} items)",
        total, total_items
    );

    let pb = progress_bar(total_items as u64);
    let mut enriched = EnrichedIndex::new();

    for (i, (name, menu)) in menus.iter().enumerate() {
        info!("[{}/{}] {} ({} items)", i + 1, total, name, menu.items.len());

        let mut items = Vec::with_capacity(menu.items.len());
        for (j, item) in menu.items.iter().enumerate() {
            debug!("[{}/{}] Item: {}", j + 1, menu.items.len(), item.name);

            match process_item(fetcher, base, item).await {
                Ok(done) => items.push(done),
                Err(e) => {
                    error!("Failed to process item '{}': {}", item.name, e);
                    items.push(EnrichedMenuItem::failed(item, e.to_string()));
                }
            }
            pb.inc(1);
            tokio::time::sleep(delays.item).await;
        }

        let restaurant = EnrichedRestaurant {
            url: menu.url.clone(),
            restaurant_logo: menu.restaurant_logo.clone(),
            items,
            error: menu.error.clone(),
        };
        info!("Completed {}: {} items processed", name, restaurant.items.len());

        // A restaurant whose menu failed is left for the next run to retry.
        if let Some(store) = checkpoints.filter(|_| restaurant.error.is_none()) {
            store.save(name, &restaurant);
        }
        enriched.insert(name.clone(), restaurant);

        if i + 1 < total {
            tokio::time::sleep(delays.restaurant).await;
        }
    }

    pb.finish_and_clear();
    enriched
}

/// Every serving size of one item.
pub async fn process_item<T: Transport>(
    fetcher: &mut PageFetcher<T>,
    base: &Url,
    item: &MenuItemRef,
) -> Result<EnrichedMenuItem> {
    if item.url.is_empty() {
        warn!("Skipping item '{}': no URL", item.name);
        return Ok(EnrichedMenuItem::bare(item));
    }

    let options = {
        let doc = fetcher.fetch(&item.url).await?;
        parser::detail::extract_size_options(&doc, base)
    };
    let variants = if options.is_empty() {
        vec![SizeOption {
            title: SINGLE_SERVING.to_string(),
            url: item.url.clone(),
        }]
    } else {
        info!("'{}' has {} serving sizes", item.name, options.len());
        options
    };

    let mut details = Vec::with_capacity(variants.len());
    for (i, variant) in variants.iter().enumerate() {
        debug!(
            "Serving size {}/{}: {}",
            i + 1,
            variants.len(),
            variant.title
        );
        details.push(fetch_variant(fetcher, base, variant, &item.name).await?);
    }

    let (serving_sizes, allergens, ingredients) = aggregate(details);
    Ok(EnrichedMenuItem {
        nutritional_values: NutritionalValues { serving_sizes },
        allergens,
        ingredients,
        ..EnrichedMenuItem::bare(item)
    })
}

/// Everything read from one serving-size page.
#[derive(Debug, Clone)]
pub struct VariantDetail {
    pub serving: ServingVariant,
    pub allergens: AllergenInfo,
    pub ingredients: String,
}

async fn fetch_variant<T: Transport>(
    fetcher: &mut PageFetcher<T>,
    base: &Url,
    variant: &SizeOption,
    item_name: &str,
) -> Result<VariantDetail> {
    let doc = fetcher.fetch(&variant.url).await?;

    let size_label = if variant.title.is_empty() {
        let title = parser::detail::extract_title(&doc);
        if title.is_empty() {
            item_name.to_string()
        } else {
            title
        }
    } else {
        variant.title.clone()
    };

    Ok(VariantDetail {
        serving: ServingVariant {
            size_label,
            nutrition: parser::nutrition::extract_table(&doc),
            image_url: parser::detail::extract_item_image(&doc, base),
        },
        allergens: parser::allergens::extract(&doc),
        ingredients: parser::detail::extract_ingredients(&doc),
    })
}

/// Nutrition and image stay per variant. Allergens and ingredients are taken
/// from the last variant that had any; a single variant is used as is.
pub fn aggregate(details: Vec<VariantDetail>) -> (Vec<ServingVariant>, AllergenInfo, String) {
    let single = details.len() == 1;
    let mut allergens = AllergenInfo::default();
    let mut ingredients = String::new();
    let mut servings = Vec::with_capacity(details.len());

    for detail in details {
        if single || detail.allergens.has_allergens() {
            allergens = detail.allergens;
        }
        if !detail.ingredients.is_empty() {
            ingredients = detail.ingredients;
        }
        servings.push(detail.serving);
    }

    (servings, allergens, ingredients)
}

/// Total serving-size variations across all restaurants.
pub fn variation_count(index: &EnrichedIndex) -> usize {
    index.values().map(EnrichedRestaurant::variation_count).sum()
}
