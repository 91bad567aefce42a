use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

use super::{absolute_url, full_text, label_text};
use crate::models::{MenuItemRef, UNCATEGORIZED};

static LOGO: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img.logo_float[src]").unwrap());
static CATEGORY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.category").unwrap());
static HEADING: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("a.toggle_category.topround.nomobileround.toggle_div h2").unwrap()
});
static ITEM_ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("ul.list.rest_item_list.ab1 a[href]").unwrap());

/// Absolute logo URL, or "" when the page has none.
pub fn extract_logo_url(doc: &Html, base: &Url) -> String {
    let logo = doc
        .select(&LOGO)
        .next()
        .and_then(|img| img.value().attr("src"))
        .and_then(|src| absolute_url(base, src));

    match logo {
        Some(url) => {
            debug!("Found logo: {}", url);
            url
        }
        None => {
            warn!("No logo found");
            String::new()
        }
    }
}

/// Menu items grouped by category block, deduplicated by URL across the
/// whole page (first occurrence wins).
pub fn extract_items(doc: &Html, base: &Url) -> Vec<MenuItemRef> {
    let blocks: Vec<_> = doc.select(&CATEGORY).collect();
    info!("Found {} category blocks", blocks.len());

    let mut items = Vec::new();
    for block in blocks {
        let category = block
            .select(&HEADING)
            .next()
            .map(|h| full_text(h))
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| UNCATEGORIZED.to_string());

        let mut count = 0;
        for anchor in block.select(&ITEM_ANCHOR) {
            let Some(url) = anchor
                .value()
                .attr("href")
                .and_then(|href| absolute_url(base, href))
            else {
                continue;
            };
            items.push(MenuItemRef {
                name: label_text(anchor),
                url,
                category: category.clone(),
            });
            count += 1;
        }
        debug!("{}: {} items", category, count);
    }

    let total = items.len();
    let unique = dedup_by_url(items);
    if unique.len() < total {
        info!("Removed {} duplicate items", total - unique.len());
    }
    info!("Extracted {} unique menu items", unique.len());
    unique
}

fn dedup_by_url(items: Vec<MenuItemRef>) -> Vec<MenuItemRef> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.url.clone()))
        .collect()
}
