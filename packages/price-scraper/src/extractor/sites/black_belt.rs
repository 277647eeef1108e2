//! Black Belt Protein is a Shopify storefront. Bulk tubs run well past the
//! other sites' prices, so the band reaches 500.

use scraper::Html;
use serde_json::Value;
use tracing::debug;

use crate::extractor::html::{
    currency_amount, is_rating_text, json_amount, parse_amount, select_attrs, select_texts,
};
use crate::extractor::{Attempt, Site, Strategy};
use crate::models::PlausibilityBand;

const ATTEMPTS: &[Attempt] = &[
    sale_price,
    regular_price,
    structured_data_offer,
    price_meta_tag,
    any_currency_amount,
];

pub(crate) static STRATEGY: Strategy = Strategy {
    site: Site::BlackBeltProtein,
    band: PlausibilityBand::new(20.0, 500.0),
    attempts: ATTEMPTS,
    unit_mass: None,
};

fn amounts(document: &Html, css: &str) -> Vec<f64> {
    select_texts(document, css)
        .iter()
        .filter_map(|text| currency_amount(text))
        .collect()
}

fn sale_price(document: &Html) -> Vec<f64> {
    amounts(document, ".price-item--sale")
}

fn regular_price(document: &Html) -> Vec<f64> {
    amounts(document, ".price-item--regular, span.money")
}

/// `offers.price` from JSON-LD product blocks.
fn structured_data_offer(document: &Html) -> Vec<f64> {
    let mut prices = Vec::new();
    for block in select_texts(document, "script[type='application/ld+json']") {
        match serde_json::from_str::<Value>(&block) {
            Ok(value) => collect_offer_prices(&value, &mut prices),
            Err(e) => debug!(error = %e, "Unreadable JSON-LD block"),
        }
    }
    prices
}

fn collect_offer_prices(value: &Value, prices: &mut Vec<f64>) {
    match value {
        Value::Array(items) => {
            for item in items {
                collect_offer_prices(item, prices);
            }
        }
        Value::Object(map) => {
            if let Some(graph) = map.get("@graph") {
                collect_offer_prices(graph, prices);
            }
            let offers: Vec<&Value> = match map.get("offers") {
                Some(Value::Array(offers)) => offers.iter().collect(),
                Some(offer) => vec![offer],
                None => Vec::new(),
            };
            prices.extend(offers.into_iter().filter_map(|offer| {
                offer
                    .get("price")
                    .or_else(|| offer.get("lowPrice"))
                    .and_then(json_amount)
            }));
        }
        _ => {}
    }
}

fn price_meta_tag(document: &Html) -> Vec<f64> {
    select_attrs(document, "meta[property='product:price:amount']", "content")
        .iter()
        .filter_map(|content| parse_amount(content))
        .collect()
}

fn any_currency_amount(document: &Html) -> Vec<f64> {
    select_texts(document, "span, p, div")
        .iter()
        .filter(|text| !is_rating_text(text))
        .filter_map(|text| currency_amount(text))
        .collect()
}
