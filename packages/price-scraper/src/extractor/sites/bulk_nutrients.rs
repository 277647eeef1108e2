use scraper::Html;

use crate::extractor::html::{currency_amount, parse_amount, select_attrs, select_texts};
use crate::extractor::{Attempt, Site, Strategy};
use crate::models::PlausibilityBand;

const ATTEMPTS: &[Attempt] = &[product_price, microdata_price];

pub(crate) static STRATEGY: Strategy = Strategy {
    site: Site::BulkNutrients,
    band: PlausibilityBand::new(20.0, 200.0),
    attempts: ATTEMPTS,
    unit_mass: None,
};

fn product_price(document: &Html) -> Vec<f64> {
    select_texts(document, ".product-price")
        .iter()
        .filter_map(|text| currency_amount(text))
        .collect()
}

fn microdata_price(document: &Html) -> Vec<f64> {
    select_attrs(document, "[itemprop='price']", "content")
        .iter()
        .filter_map(|content| parse_amount(content))
        .collect()
}
