use std::sync::LazyLock;

use indexmap::IndexMap;
use scraper::{Html, Selector};
use tracing::{info, warn};
use url::Url;

use super::{absolute_url, direct_text, full_text};
use crate::models::Restaurant;

static CONTAINER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".rest_item_list.category").unwrap());
static CARD: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".filter_target").unwrap());
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
static LABEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.logo_box_text").unwrap());

/// Restaurant cards on the listing page, deduplicated by absolute URL.
///
/// A repeated URL keeps its first position; the later card's name wins.
pub fn extract(doc: &Html, base: &Url) -> Vec<Restaurant> {
    let Some(container) = doc.select(&CONTAINER).next() else {
        warn!("Restaurant container not found on page");
        return Vec::new();
    };

    let cards: Vec<_> = container.select(&CARD).collect();
    info!("Found {} restaurant cards", cards.len());

    let mut by_url: IndexMap<String, Restaurant> = IndexMap::new();
    for card in cards {
        let Some(url) = card
            .select(&ANCHOR)
            .next()
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| absolute_url(base, href))
        else {
            continue;
        };

        let Some(name) = card.select(&LABEL).next().and_then(restaurant_name) else {
            continue;
        };

        by_url.insert(url.clone(), Restaurant { name, url });
    }

    info!("Extracted {} unique restaurants", by_url.len());
    by_url.into_values().collect()
}

/// "Taco Bell<span> Nutrition</span>" → "Taco Bell".
fn restaurant_name(label: scraper::ElementRef) -> Option<String> {
    let name = direct_text(label).unwrap_or_else(|| {
        full_text(label)
            .replace(" Nutrition", "")
            .trim()
            .to_string()
    });
    (!name.is_empty()).then_some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{base, fixture};

    #[test]
    fn listing_fixture_dedups_by_url() {
        let doc = Html::parse_document(&fixture("listing"));
        let r = extract(&doc, &base());
        let names: Vec<&str> = r.iter().map(|x| x.name.as_str()).collect();
        assert_eq!(names, ["Taco Bell", "Wendy's", "Arby's"]);
        assert_eq!(r[0].url, "https://fastfoodnutrition.org/taco-bell");
    }

    #[test]
    fn duplicate_url_collapses_to_one_entry() {
        let html = r#"<div class="rest_item_list category">
            <div class="filter_target"><a href="/kfc"><div class="logo_box_text">KFC<span> Nutrition</span></div></a></div>
            <div class="filter_target"><a href="https://fastfoodnutrition.org/kfc"><div class="logo_box_text">kfc</div></a></div>
        </div>"#;
        let r = extract(&Html::parse_document(html), &base());
        assert_eq!(r.len(), 1);
        assert_eq!(r[0].url, "https://fastfoodnutrition.org/kfc");
    }

    #[test]
    fn nested_label_falls_back_and_strips_suffix() {
        let html = r#"<div class="rest_item_list category">
            <div class="filter_target"><a href="/sonic"><div class="logo_box_text"><b>Sonic Nutrition</b></div></a></div>
        </div>"#;
        let r = extract(&Html::parse_document(html), &base());
        assert_eq!(r[0].name, "Sonic");
    }

    #[test]
    fn cards_without_link_or_name_are_dropped() {
        let html = r#"<div class="rest_item_list category">
            <div class="filter_target"><div class="logo_box_text">No Link</div></div>
            <div class="filter_target"><a href="/nameless"></a></div>
        </div>"#;
        assert!(extract(&Html::parse_document(html), &base()).is_empty());
    }

    #[test]
    fn missing_container_yields_nothing() {
        let doc = Html::parse_document("<html><body><p>maintenance</p></body></html>");
        assert!(extract(&doc, &base()).is_empty());
    }
}
