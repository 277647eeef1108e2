//! Per-site price extraction.
//!
//! A product URL selects a [`Site`] by domain substring. Each site owns a
//! [`Strategy`]: an ordered cascade of matcher functions, each more permissive
//! than the last. Matchers return raw candidates in document order; the first
//! candidate inside the site's plausibility band wins and nothing after it is
//! evaluated. Pages on unknown domains, and pages where every candidate is
//! rejected, yield `None`.

pub mod html;
mod sites;

use scraper::Html;
use serde::Serialize;
use std::fmt;
use tracing::{debug, trace};

use crate::models::{PlausibilityBand, Price};

/// One step of a cascade: candidate amounts found in the document.
pub type Attempt = fn(&Html) -> Vec<f64>;

/// Reads a mass figure (kg) used to turn a total price into a per-kg price.
pub type MassReader = fn(&Html) -> Option<f64>;

pub struct Strategy {
    pub site: Site,
    pub band: PlausibilityBand,
    pub attempts: &'static [Attempt],
    pub unit_mass: Option<MassReader>,
}

impl Strategy {
    /// Run the cascade against a parsed document.
    pub fn run(&self, document: &Html) -> Option<Price> {
        let mass = self.unit_mass.and_then(|read| read(document));
        if let Some(kg) = mass {
            trace!(site = %self.site, kg, "Normalizing candidates to per-kg");
        }

        for (index, attempt) in self.attempts.iter().enumerate() {
            for candidate in attempt(document) {
                let value = match mass {
                    Some(kg) => candidate / kg,
                    None => candidate,
                };

                match self.band.check(value) {
                    Some(price) => {
                        debug!(
                            site = %self.site,
                            attempt = index + 1,
                            price = %price,
                            "Price candidate accepted"
                        );
                        return Some(price);
                    }
                    None => trace!(
                        site = %self.site,
                        attempt = index + 1,
                        value,
                        "Candidate outside plausibility band"
                    ),
                }
            }
        }

        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Site {
    MyProtein,
    ChemistWarehouse,
    CostPriceSupplements,
    BulkNutrients,
    BlackBeltProtein,
}

const SITES: &[Site] = &[
    Site::MyProtein,
    Site::ChemistWarehouse,
    Site::CostPriceSupplements,
    Site::BulkNutrients,
    Site::BlackBeltProtein,
];

impl Site {
    pub fn from_url(url: &str) -> Option<Site> {
        SITES.iter().copied().find(|site| url.contains(site.domain()))
    }

    pub fn domain(self) -> &'static str {
        match self {
            Site::MyProtein => "myprotein.com",
            Site::ChemistWarehouse => "chemistwarehouse.com.au",
            Site::CostPriceSupplements => "costpricesupplements.com.au",
            Site::BulkNutrients => "bulknutrients.com.au",
            Site::BlackBeltProtein => "blackbeltprotein.com.au",
        }
    }

    pub fn strategy(self) -> &'static Strategy {
        match self {
            Site::MyProtein => &sites::myprotein::STRATEGY,
            Site::ChemistWarehouse => &sites::chemist_warehouse::STRATEGY,
            Site::CostPriceSupplements => &sites::cost_price::STRATEGY,
            Site::BulkNutrients => &sites::bulk_nutrients::STRATEGY,
            Site::BlackBeltProtein => &sites::black_belt::STRATEGY,
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.domain())
    }
}

/// Extract a price from `html`, fetched from `url`.
pub fn extract(url: &str, html: &str) -> Option<Price> {
    let Some(site) = Site::from_url(url) else {
        debug!(url = %url, "No price strategy for URL");
        return None;
    };

    let document = Html::parse_document(html);
    let price = site.strategy().run(&document);
    if price.is_none() {
        debug!(url = %url, site = %site, "No plausible price on page");
    }
    price
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_dispatch() {
        let myprotein = "https://au.myprotein.com/p/impact-whey-isolate/12313192/";
        assert_eq!(Site::from_url(myprotein), Some(Site::MyProtein));
        assert_eq!(
            Site::from_url("https://www.chemistwarehouse.com.au/buy/1234/whey"),
            Some(Site::ChemistWarehouse)
        );
        assert_eq!(
            Site::from_url("https://www.costpricesupplements.com.au/product/wpi"),
            Some(Site::CostPriceSupplements)
        );
        assert_eq!(
            Site::from_url("https://www.bulknutrients.com.au/products/wpi"),
            Some(Site::BulkNutrients)
        );
        assert_eq!(
            Site::from_url("https://blackbeltprotein.com.au/products/wpi"),
            Some(Site::BlackBeltProtein)
        );
        assert_eq!(Site::from_url("https://example.com/whey"), None);
    }

    #[test]
    fn test_unknown_domain_is_absent() {
        let html = r#"<div class="product-price">$54.90</div>"#;
        assert_eq!(extract("https://example.com/whey", html), None);
    }

    #[test]
    fn test_empty_document_is_absent() {
        for site in SITES {
            let url = format!("https://{}/product", site.domain());
            assert_eq!(extract(&url, ""), None, "{}", site);
        }
    }

    fn always(_: &Html) -> Vec<f64> {
        vec![500.0, 42.0, 43.0]
    }

    fn never(_: &Html) -> Vec<f64> {
        panic!("cascade should have stopped");
    }

    fn two_kg(_: &Html) -> Option<f64> {
        Some(2.0)
    }

    const STOPS_EARLY: &[Attempt] = &[always, never];
    const SINGLE: &[Attempt] = &[always];

    #[test]
    fn test_first_in_band_candidate_wins() {
        let strategy = Strategy {
            site: Site::MyProtein,
            band: PlausibilityBand::new(20.0, 200.0),
            attempts: STOPS_EARLY,
            unit_mass: None,
        };
        let price = strategy.run(&Html::parse_document("")).unwrap();
        assert_eq!(price.value(), 42.0);
    }

    #[test]
    fn test_mass_normalizes_before_band_check() {
        let strategy = Strategy {
            site: Site::ChemistWarehouse,
            band: PlausibilityBand::new(20.0, 200.0),
            attempts: SINGLE,
            unit_mass: Some(two_kg),
        };
        // 500 / 2 = 250 is rejected, 42 / 2 = 21 is accepted.
        let price = strategy.run(&Html::parse_document("")).unwrap();
        assert_eq!(price.value(), 21.0);
    }
}
