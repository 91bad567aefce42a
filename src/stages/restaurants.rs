use tracing::info;
use url::Url;

use crate::error::Result;
use crate::fetch::{PageFetcher, Transport};
use crate::models::Restaurant;
use crate::parser;

const LISTING_PATH: &str = "/fast-food-restaurants";

pub fn listing_url(base: &Url) -> String {
    format!("{}{}", base.as_str().trim_end_matches('/'), LISTING_PATH)
}

/// Stage 1: every restaurant on the listing page.
pub async fn scrape<T: Transport>(fetcher: &mut PageFetcher<T>, base: &Url) -> Result<Vec<Restaurant>> {
    let url = listing_url(base);
    info!("Scraping restaurants from: {}", url);

    let doc = fetcher.fetch(&url).await?;
    let restaurants = parser::restaurants::extract(&doc, base);

    info!("Scraped {} restaurants", restaurants.len());
    Ok(restaurants)
}
