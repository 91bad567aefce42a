use tracing::{error, info, warn};
use url::Url;

use super::progress_bar;
use crate::error::Result;
use crate::fetch::{PageFetcher, Transport};
use crate::models::{MenuIndex, Restaurant, RestaurantMenu};
use crate::parser;

/// Stage 2: menu items for each restaurant. A restaurant that cannot be
/// fetched is kept as a placeholder carrying the error.
pub async fn scrape<T: Transport>(
    fetcher: &mut PageFetcher<T>,
    base: &Url,
    restaurants: &[Restaurant],
) -> MenuIndex {
    let total = restaurants.len();
    info!("Scraping menu items for {} restaurants", total);

    let pb = progress_bar(total as u64);
    let mut index = MenuIndex::new();

    for (i, restaurant) in restaurants.iter().enumerate() {
        if restaurant.name.is_empty() || restaurant.url.is_empty() {
            warn!("Skipping invalid restaurant entry: {:?}", restaurant);
            pb.inc(1);
            continue;
        }
        info!("[{}/{}] {}", i + 1, total, restaurant.name);

        let menu = match scrape_restaurant(fetcher, base, &restaurant.url).await {
            Ok(menu) => {
                info!("Completed {}: {} items", restaurant.name, menu.items.len());
                menu
            }
            Err(e) => {
                error!("Failed to scrape {}: {}", restaurant.name, e);
                RestaurantMenu {
                    url: restaurant.url.clone(),
                    error: Some(e.to_string()),
                    ..Default::default()
                }
            }
        };
        index.insert(restaurant.name.clone(), menu);
        pb.inc(1);
    }

    pb.finish_and_clear();
    info!("Completed menu scraping for {} restaurants", index.len());
    index
}

async fn scrape_restaurant<T: Transport>(
    fetcher: &mut PageFetcher<T>,
    base: &Url,
    url: &str,
) -> Result<RestaurantMenu> {
    let doc = fetcher.fetch(url).await?;
    Ok(RestaurantMenu {
        url: url.to_string(),
        restaurant_logo: parser::menu::extract_logo_url(&doc, base),
        items: parser::menu::extract_items(&doc, base),
        error: None,
    })
}

/// Keep at most `max` items per restaurant. 0 means no limit.
pub fn limit_items(index: &mut MenuIndex, max: usize) {
    if max == 0 {
        return;
    }
    for (name, menu) in index.iter_mut() {
        if menu.items.len() > max {
            menu.items.truncate(max);
            info!("Limited {} to {} items", name, max);
        }
    }
}
