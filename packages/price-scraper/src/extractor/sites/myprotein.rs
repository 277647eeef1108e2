//! MyProtein lists a per-kg price (`$59.95/kg`) beside the pack price.
//! Review widgets also use `$`-adjacent decimals, so every attempt skips
//! rating text.

use scraper::Html;

use crate::extractor::html::{
    currency_amount, first_amount, is_rating_text, own_text, select_texts, selector,
    stripped_text, CURRENCY_AMOUNT, PER_KG_PRICE,
};
use crate::extractor::{Attempt, Site, Strategy};
use crate::models::PlausibilityBand;

const ATTEMPTS: &[Attempt] = &[
    per_kg_in_divs,
    per_kg_in_text_elements,
    price_owning_divs,
    price_near_kg_mention,
];

pub(crate) static STRATEGY: Strategy = Strategy {
    site: Site::MyProtein,
    band: PlausibilityBand::new(20.0, 200.0),
    attempts: ATTEMPTS,
    unit_mass: None,
};

fn is_per_kg_text(text: &str) -> bool {
    text.contains("/kg") && text.contains('$') && !is_rating_text(text)
}

fn per_kg_prices(document: &Html, css: &str) -> Vec<f64> {
    select_texts(document, css)
        .iter()
        .filter(|text| is_per_kg_text(text))
        .filter_map(|text| first_amount(&PER_KG_PRICE, text))
        .collect()
}

fn per_kg_in_divs(document: &Html) -> Vec<f64> {
    per_kg_prices(document, "div")
}

fn per_kg_in_text_elements(document: &Html) -> Vec<f64> {
    per_kg_prices(document, "div, span, p")
}

/// Divs whose own text is a price, read from their `/kg` context.
fn price_owning_divs(document: &Html) -> Vec<f64> {
    let Some(divs) = selector("div") else {
        return Vec::new();
    };
    document
        .select(&divs)
        .filter(|div| CURRENCY_AMOUNT.is_match(&own_text(*div)))
        .map(stripped_text)
        .filter(|text| text.contains("/kg") && !is_rating_text(text))
        .filter_map(|text| currency_amount(&text))
        .collect()
}

fn price_near_kg_mention(document: &Html) -> Vec<f64> {
    select_texts(document, "div, span, p, h1, h2, h3")
        .iter()
        .filter(|text| {
            text.contains('$') && text.to_lowercase().contains("kg") && !is_rating_text(text)
        })
        .filter_map(|text| currency_amount(text))
        .collect()
}
