use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::debug;

use super::{full_text, text_with};
use crate::models::AllergenInfo;

static SECTION: LazyLock<Selector> = LazyLock::new(|| Selector::parse("#allergens").unwrap());
static COLUMN: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".col-12").unwrap());
static STRONG: LazyLock<Selector> = LazyLock::new(|| Selector::parse("strong").unwrap());
static DOT: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".dot").unwrap());
static PARAGRAPH: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());

#[derive(Debug, PartialEq, Eq)]
enum Bucket {
    Contains,
    DoesNotContain,
    Unknown,
}

fn classify(header: &str) -> Option<Bucket> {
    let h = header.to_lowercase();
    if h.contains("contains") && !h.contains("not") && !h.contains("may") {
        Some(Bucket::Contains)
    } else if h.contains("does not contain") {
        Some(Bucket::DoesNotContain)
    } else if h.contains("unknown") || h.contains("aren't sure") {
        Some(Bucket::Unknown)
    } else {
        None
    }
}

pub fn extract(doc: &Html) -> AllergenInfo {
    let Some(section) = doc.select(&SECTION).next() else {
        debug!("No allergen section found");
        return AllergenInfo::default();
    };

    let mut info = AllergenInfo::default();
    for col in section.select(&COLUMN) {
        let Some(header) = col.select(&STRONG).next() else {
            continue;
        };
        let header = text_with(header, "");
        let dots: Vec<String> = col
            .select(&DOT)
            .map(|d| text_with(d, ""))
            .filter(|t| !t.is_empty())
            .collect();

        match classify(&header) {
            Some(Bucket::Contains) => info.contains = dots,
            Some(Bucket::DoesNotContain) => info.does_not_contain = dots,
            Some(Bucket::Unknown) => info.unknown = dots,
            None => debug!("Ignoring allergen column '{}'", header),
        }
    }

    for p in section.select(&PARAGRAPH) {
        let text = full_text(p);
        let lower = text.to_lowercase();
        if lower.contains("allergy") || lower.contains("allergen") {
            info.allergy_information = text;
        }
    }

    info
}
