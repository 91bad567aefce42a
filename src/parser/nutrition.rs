use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::{debug, warn};

use super::full_text;
use crate::models::Nutrition;

static TABLES: LazyLock<[Selector; 3]> = LazyLock::new(|| {
    [
        Selector::parse("table.item_nutrition").unwrap(),
        Selector::parse("table#item_nutrition").unwrap(),
        Selector::parse("table.nutrition").unwrap(),
    ]
});
static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static TH: LazyLock<Selector> = LazyLock::new(|| Selector::parse("th").unwrap());
static TD: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());

const HEADER_PREFIXES: [&str; 3] = ["amount per serving", "% daily value", "percent daily"];
const PLACEHOLDERS: [&str; 4] = ["", "?", "&nbsp;", "-"];

/// Nutrient rows of the first matching nutrition table, keyed by
/// snake-cased nutrient name. The % daily value column is never read.
pub fn extract_table(doc: &Html) -> Nutrition {
    let Some(table) = TABLES.iter().find_map(|sel| doc.select(sel).next()) else {
        warn!("No nutrition table found");
        return Nutrition::new();
    };

    let mut nutrition = Nutrition::new();
    for row in table.select(&ROW) {
        let header = row.select(&TH).next().map(full_text);
        let cells: Vec<String> = row.select(&TD).map(full_text).collect();

        let pair = match (header, cells.as_slice()) {
            (Some(key), [value, ..]) => Some((key, value.clone())),
            (None, [key, value, ..]) => Some((key.clone(), value.clone())),
            _ => None,
        };
        let Some((key, value)) = pair else {
            continue;
        };

        if is_header_row(&key) || is_placeholder(&value) {
            continue;
        }
        nutrition.insert(snake_case(&key), value.trim().to_string());
    }

    debug!("Extracted {} nutrition values", nutrition.len());
    nutrition
}

fn is_header_row(key: &str) -> bool {
    let lower = key.to_lowercase();
    lower.is_empty() || HEADER_PREFIXES.iter().any(|p| lower.starts_with(p))
}

fn is_placeholder(value: &str) -> bool {
    PLACEHOLDERS.contains(&value.trim())
}

/// "Total Fat (g)" → "total_fat_g".
pub fn snake_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.trim().to_lowercase().chars() {
        if ch.is_alphanumeric() {
            out.push(ch);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_matches('_').to_string()
}
