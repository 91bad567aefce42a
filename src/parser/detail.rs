use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use super::{absolute_url, full_text};

static H1: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h1").unwrap());
static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());
static DROPDOWN: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.dropdown-menu").unwrap());
static OPTION: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
static INGREDIENTS: LazyLock<Selector> = LazyLock::new(|| Selector::parse("#ingredients2").unwrap());
static ITEM_PHOTO: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img[src^='/item-photos/']").unwrap());
static CONTENT_IMG: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.col-12 img, div.col-md-6 img").unwrap());

/// One entry of the serving-size dropdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeOption {
    pub title: String,
    pub url: String,
}

/// Page heading: `<h1>` if present, else `<title>`, else "".
pub fn extract_title(doc: &Html) -> String {
    if let Some(h1) = doc.select(&H1).next() {
        return full_text(h1);
    }
    doc.select(&TITLE).next().map(full_text).unwrap_or_default()
}

/// Serving-size options from the dropdown, deduplicated by URL. Empty when
/// the item has a single size.
pub fn extract_size_options(doc: &Html, base: &Url) -> Vec<SizeOption> {
    let Some(menu) = doc.select(&DROPDOWN).next() else {
        debug!("No dropdown menu found, single option item");
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let options: Vec<SizeOption> = menu
        .select(&OPTION)
        .filter_map(|a| {
            let url = absolute_url(base, a.value().attr("href")?)?;
            Some(SizeOption {
                title: full_text(a),
                url,
            })
        })
        .filter(|opt| seen.insert(opt.url.clone()))
        .collect();

    debug!("Found {} unique dropdown options", options.len());
    options
}

pub fn extract_ingredients(doc: &Html) -> String {
    doc.select(&INGREDIENTS)
        .next()
        .map(full_text)
        .unwrap_or_default()
}

/// Item photo URL. Prefers `/item-photos/` images, then any content-column
/// image that is not a logo or icon.
pub fn extract_item_image(doc: &Html, base: &Url) -> Option<String> {
    let photo = doc
        .select(&ITEM_PHOTO)
        .find_map(|img| img.value().attr("src"))
        .and_then(|src| absolute_url(base, src));
    if photo.is_some() {
        return photo;
    }

    let fallback = doc
        .select(&CONTENT_IMG)
        .filter_map(|img| img.value().attr("src"))
        .find(|src| !src.is_empty() && !src.contains("/logos/") && !src.contains("/icons/"))
        .and_then(|src| absolute_url(base, src));
    if fallback.is_none() {
        debug!("No item image found");
    }
    fallback
}
