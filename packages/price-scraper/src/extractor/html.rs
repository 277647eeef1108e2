//! Text and pattern helpers shared by the site strategies.
//!
//! Element text follows the "stripped strings" convention: every descendant
//! text node is trimmed and the non-empty pieces are joined without
//! separators, so `<span>$59.95</span><span>/kg</span>` reads as `$59.95/kg`.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

lazy_static! {
    /// `$59.95/kg`, tolerating a left-to-right mark (raw or as an entity)
    /// between the amount and the unit.
    pub static ref PER_KG_PRICE: Regex =
        Regex::new(r"\$(\d+\.\d+)(?:\x{200E}|&lrm;)?\s*/kg").unwrap();

    /// Any dollar-prefixed decimal amount, thousands separators allowed.
    pub static ref CURRENCY_AMOUNT: Regex = Regex::new(r"\$\s*(\d[\d,]*\.\d+)").unwrap();

    /// A mass figure in kilograms, e.g. `2.27kg` or `1 KG`.
    pub static ref MASS_KG: Regex = Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*kg").unwrap();
}

const RATING_MARKER: &str = "out of 5";

pub fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// Descendant text, trimmed per node and concatenated.
pub fn stripped_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect()
}

/// Text from the element's direct text children only.
pub fn own_text(element: ElementRef<'_>) -> String {
    element
        .children()
        .filter_map(|node| node.value().as_text().map(|text| text.trim().to_string()))
        .filter(|piece| !piece.is_empty())
        .collect()
}

/// Stripped text of every element matching `css`, in document order.
pub fn select_texts(document: &Html, css: &str) -> Vec<String> {
    let Some(selector) = selector(css) else {
        return Vec::new();
    };
    document.select(&selector).map(stripped_text).collect()
}

/// Value of `attr` on every element matching `css` that carries it.
pub fn select_attrs(document: &Html, css: &str, attr: &str) -> Vec<String> {
    let Some(selector) = selector(css) else {
        return Vec::new();
    };
    document
        .select(&selector)
        .filter_map(|element| element.value().attr(attr))
        .map(str::to_string)
        .collect()
}

/// Review widgets render scores like "4.5 out of 5" next to prices.
pub fn is_rating_text(text: &str) -> bool {
    text.contains(RATING_MARKER)
}

const CURRENCY_PREFIXES: &[&str] = &["AUD", "A$", "$"];

/// Parse a bare amount such as an attribute value: `54.90`, `$54.90`,
/// `A$ 1,299.00`. Only currency prefixes are stripped.
pub fn parse_amount(text: &str) -> Option<f64> {
    let mut rest = text.trim();
    while let Some(stripped) = CURRENCY_PREFIXES
        .iter()
        .find_map(|prefix| rest.strip_prefix(prefix))
    {
        rest = stripped.trim_start();
    }

    let cleaned: String = rest.chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// First capture group of `pattern` in `text`, parsed as an amount.
pub fn first_amount(pattern: &Regex, text: &str) -> Option<f64> {
    let captures = pattern.captures(text)?;
    parse_amount(captures.get(1)?.as_str())
}

/// First dollar-prefixed decimal in element text. Bare numbers are not prices.
pub fn currency_amount(text: &str) -> Option<f64> {
    first_amount(&CURRENCY_AMOUNT, text)
}

/// Amounts embedded in JSON show up both as numbers and as strings.
pub fn json_amount(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(number) => number.as_f64(),
        serde_json::Value::String(text) => parse_amount(text),
        _ => None,
    }
    .filter(|amount| amount.is_finite())
}
