//! Chemist Warehouse shows the pack price only. The pack mass is read from
//! the product title and the price is compared per kg.

use scraper::Html;

use crate::extractor::html::{currency_amount, first_amount, select_texts, MASS_KG};
use crate::extractor::{Attempt, Site, Strategy};
use crate::models::PlausibilityBand;

const ATTEMPTS: &[Attempt] = &[product_price, actual_price_label, price_heading];

pub(crate) static STRATEGY: Strategy = Strategy {
    site: Site::ChemistWarehouse,
    band: PlausibilityBand::new(20.0, 200.0),
    attempts: ATTEMPTS,
    unit_mass: Some(title_mass_kg),
};

fn amounts(document: &Html, css: &str) -> Vec<f64> {
    select_texts(document, css)
        .iter()
        .filter_map(|text| currency_amount(text))
        .collect()
}

fn product_price(document: &Html) -> Vec<f64> {
    amounts(document, "span.product__price")
}

fn actual_price_label(document: &Html) -> Vec<f64> {
    amounts(document, "span[id*='lblActualPrice']")
}

fn price_heading(document: &Html) -> Vec<f64> {
    amounts(document, "h2.display-l.text-colour-title-light")
}

fn title_mass_kg(document: &Html) -> Option<f64> {
    select_texts(document, "h1.product__title")
        .first()
        .and_then(|title| first_amount(&MASS_KG, title))
        .filter(|kg| *kg > 0.0)
}
