pub mod allergens;
pub mod detail;
pub mod menu;
pub mod nutrition;
pub mod restaurants;

use scraper::{ElementRef, Node};
use url::Url;

/// Text of all descendants, each piece trimmed, empty pieces dropped,
/// joined with `sep`.
pub fn text_with(el: ElementRef, sep: &str) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

pub fn full_text(el: ElementRef) -> String {
    text_with(el, " ")
}

/// First non-blank text node that is a direct child of `el`, trimmed.
pub fn direct_text(el: ElementRef) -> Option<String> {
    el.children().find_map(|child| match child.value() {
        Node::Text(t) if !t.trim().is_empty() => Some(t.trim().to_string()),
        _ => None,
    })
}

/// Direct text node if there is one, otherwise the full text.
pub fn label_text(el: ElementRef) -> String {
    direct_text(el).unwrap_or_else(|| full_text(el))
}

pub fn absolute_url(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    base.join(href).ok().map(String::from)
}

#[cfg(test)]
pub(crate) fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}.html", name)).unwrap()
}

#[cfg(test)]
pub(crate) fn base() -> Url {
    Url::parse(crate::config::DEFAULT_BASE_URL).unwrap()
}
