//! Cost Price Supplements runs WooCommerce. Variable products embed their
//! variations as JSON on the add-to-cart form; the tracking plugin also
//! renders the current price into a hidden input.

use scraper::Html;
use serde::Deserialize;
use tracing::debug;

use crate::extractor::html::{
    currency_amount, json_amount, parse_amount, select_attrs, select_texts,
};
use crate::extractor::{Attempt, Site, Strategy};
use crate::models::PlausibilityBand;

const ATTEMPTS: &[Attempt] = &[in_stock_variation, tracking_input, woocommerce_amount];

pub(crate) static STRATEGY: Strategy = Strategy {
    site: Site::CostPriceSupplements,
    band: PlausibilityBand::new(20.0, 200.0),
    attempts: ATTEMPTS,
    unit_mass: None,
};

#[derive(Debug, Deserialize)]
struct Variation {
    #[serde(default)]
    is_in_stock: bool,
    #[serde(default)]
    display_price: Option<serde_json::Value>,
}

/// Display price of the first in-stock variation. Later variations are not
/// consulted even when the first one has no usable price.
fn in_stock_variation(document: &Html) -> Vec<f64> {
    let Some(raw) = select_attrs(document, "form.variations_form", "data-product_variations")
        .into_iter()
        .next()
    else {
        return Vec::new();
    };

    let variations: Vec<Variation> = match serde_json::from_str(&raw.replace("&quot;", "\"")) {
        Ok(variations) => variations,
        Err(e) => {
            debug!(error = %e, "Unreadable product variations");
            return Vec::new();
        }
    };

    variations
        .into_iter()
        .find(|variation| variation.is_in_stock)
        .and_then(|variation| variation.display_price)
        .and_then(|amount| json_amount(&amount))
        .into_iter()
        .collect()
}

fn tracking_input(document: &Html) -> Vec<f64> {
    select_attrs(document, "input[name='gtm4wp_price']", "value")
        .iter()
        .filter_map(|value| parse_amount(value))
        .collect()
}

fn woocommerce_amount(document: &Html) -> Vec<f64> {
    select_texts(document, ".price .woocommerce-Price-amount")
        .iter()
        .filter_map(|text| currency_amount(text))
        .collect()
}
