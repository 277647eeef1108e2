use price_scraper::testing::{MemoryStore, MockFetcher};
use price_scraper::{PriceUpdater, Product, ProductId, UpdateReport, UpdaterOptions};
use serde_json::json;

const MYPROTEIN_URL: &str =
    "https://au.myprotein.com/p/sports-nutrition/impact-whey-isolate/12313192/";
const MYPROTEIN_PAGE: &str = r#"<html><body>
  <div class="athenaProductPage">
    <div class="reviews">4.6 out of 5</div>
    <p class="productPrice_price">$89.95</p>
    <div class="productPrice_perUnit">$59.95&lrm;/kg</div>
  </div>
</body></html>"#;

const BULK_URL: &str = "https://www.bulknutrients.com.au/products/whey-protein-isolate";
const BULK_PAGE: &str = r#"<html><body><div class="product-price">$54.90</div></body></html>"#;
const BULK_PAGE_NO_PRICE: &str = r#"<html><body><h1>Whey Protein Isolate</h1></body></html>"#;

const CHEMIST_URL: &str = "https://www.chemistwarehouse.com.au/buy/101740/gold-standard-whey";
const CHEMIST_PAGE: &str = r#"<html><body>
  <h1 class="product__title">Optimum Nutrition Gold Standard Whey 2.27kg</h1>
  <span class="product__price">$119.99</span>
</body></html>"#;

fn error_of(report: &UpdateReport, index: usize) -> Option<String> {
    report.results.as_ref().unwrap()[index].error.clone()
}

#[tokio::test]
async fn test_mixed_product_list() {
    let store = MemoryStore::new().with_products(vec![
        Product::new(1, MYPROTEIN_URL),
        Product::new(2, BULK_URL),
        Product::new(3, ""),
    ]);
    let fetcher = MockFetcher::new()
        .with_page(MYPROTEIN_URL, MYPROTEIN_PAGE)
        .with_page(BULK_URL, BULK_PAGE_NO_PRICE);

    let updater = PriceUpdater::new(store.clone(), fetcher.clone());
    let report = updater.update_all_prices().await;

    // Product 3 has no link and is never fetched.
    assert_eq!(fetcher.calls(), vec![MYPROTEIN_URL, BULK_URL]);

    assert_eq!(
        serde_json::to_value(&report).unwrap(),
        json!({
            "success": true,
            "results": [
                {"id": 1, "success": true, "price": 59.95},
                {"id": 2, "success": false, "error": "Price not found"}
            ],
            "summary": {"total": 2, "updated": 1, "failed": 1}
        })
    );

    let updated = store.product(1).unwrap();
    assert_eq!(updated.price, Some(59.95));
    assert!(updated.updated_at.is_some());
    assert_eq!(store.product(2).unwrap().price, None);
}

#[tokio::test]
async fn test_empty_product_list() {
    let fetcher = MockFetcher::new();
    let updater = PriceUpdater::new(MemoryStore::new(), fetcher.clone());

    let report = updater.update_all_prices().await;

    assert_eq!(
        serde_json::to_string(&report).unwrap(),
        r#"{"success":true,"results":[],"summary":{"total":0,"updated":0,"failed":0}}"#
    );
    assert_eq!(fetcher.call_count(), 0);
}

#[tokio::test]
async fn test_only_linkless_products_is_empty_run() {
    let mut linkless = Product::new(7, "");
    linkless.link = None;
    let fetcher = MockFetcher::new();
    let updater = PriceUpdater::new(
        MemoryStore::new().with_products(vec![linkless, Product::new(8, "  ")]),
        fetcher.clone(),
    );

    let report = updater.update_all_prices().await;

    assert_eq!(report.summary.unwrap().total, 0);
    assert_eq!(fetcher.call_count(), 0);
}

#[tokio::test]
async fn test_timeout_does_not_stop_the_run() {
    let store = MemoryStore::new().with_products(vec![
        Product::new(1, MYPROTEIN_URL),
        Product::new(2, BULK_URL),
    ]);
    let fetcher = MockFetcher::new()
        .with_timeout(MYPROTEIN_URL)
        .with_page(BULK_URL, BULK_PAGE);

    let report = PriceUpdater::new(store.clone(), fetcher.clone())
        .update_all_prices()
        .await;

    assert!(report.success);
    assert_eq!(fetcher.call_count(), 2);
    assert_eq!(error_of(&report, 0).as_deref(), Some("Failed to fetch page"));
    assert_eq!(error_of(&report, 1), None);

    let summary = report.summary.unwrap();
    assert_eq!((summary.total, summary.updated, summary.failed), (2, 1, 1));
    assert_eq!(store.product(2).unwrap().price, Some(54.90));
}

#[tokio::test]
async fn test_http_error_status_is_a_fetch_failure() {
    let store = MemoryStore::new().with_products(vec![Product::new(1, BULK_URL)]);
    let fetcher = MockFetcher::new().with_status(BULK_URL, 503);

    let report = PriceUpdater::new(store, fetcher).update_all_prices().await;

    assert_eq!(error_of(&report, 0).as_deref(), Some("Failed to fetch page"));
}

#[tokio::test]
async fn test_persistence_failure_is_distinct() {
    let store = MemoryStore::new()
        .with_products(vec![
            Product::new(1, MYPROTEIN_URL),
            Product::new(2, CHEMIST_URL),
        ])
        .with_failing_update(1);
    let fetcher = MockFetcher::new()
        .with_page(MYPROTEIN_URL, MYPROTEIN_PAGE)
        .with_page(CHEMIST_URL, CHEMIST_PAGE);

    let report = PriceUpdater::new(store.clone(), fetcher)
        .update_all_prices()
        .await;

    assert_eq!(
        error_of(&report, 0).as_deref(),
        Some("Failed to update database")
    );
    assert_eq!(store.product(1).unwrap().price, None);

    let chemist = store.product(2).unwrap().price.unwrap();
    assert!((chemist - 119.99 / 2.27).abs() < 1e-9);
}

#[tokio::test]
async fn test_product_list_failure_aborts() {
    let fetcher = MockFetcher::new();
    let store = MemoryStore::new()
        .with_products(vec![Product::new(1, MYPROTEIN_URL)])
        .with_list_error("connection refused");

    let report = PriceUpdater::new(store, fetcher.clone())
        .update_all_prices()
        .await;

    assert_eq!(
        serde_json::to_value(&report).unwrap(),
        json!({"success": false, "error": "connection refused"})
    );
    assert_eq!(fetcher.call_count(), 0);
}

#[tokio::test]
async fn test_panic_is_isolated_to_one_product() {
    let store = MemoryStore::new().with_products(vec![
        Product::new(1, MYPROTEIN_URL),
        Product::new(2, BULK_URL),
    ]);
    let fetcher = MockFetcher::new()
        .with_panic(MYPROTEIN_URL)
        .with_page(BULK_URL, BULK_PAGE);

    let report = PriceUpdater::new(store.clone(), fetcher)
        .update_all_prices()
        .await;

    let error = error_of(&report, 0).unwrap();
    assert!(error.starts_with("Unexpected error: mock fetcher panicked"), "{}", error);
    assert_eq!(store.product(2).unwrap().price, Some(54.90));
    assert_eq!(report.summary.unwrap().updated, 1);
}

#[tokio::test]
async fn test_unsupported_domain_is_price_not_found() {
    let url = "https://www.example.com/whey";
    let store = MemoryStore::new().with_products(vec![Product::new("a1b2", url)]);
    let fetcher = MockFetcher::new().with_page(url, BULK_PAGE);

    let report = PriceUpdater::new(store, fetcher).update_all_prices().await;

    let result = &report.results.unwrap()[0];
    assert_eq!(result.id, ProductId::from("a1b2"));
    assert_eq!(result.error.as_deref(), Some("Price not found"));
}

#[tokio::test]
async fn test_running_twice_is_idempotent() {
    let store = MemoryStore::new().with_products(vec![
        Product::new(1, MYPROTEIN_URL),
        Product::new(2, BULK_URL),
    ]);
    let fetcher = MockFetcher::new()
        .with_page(MYPROTEIN_URL, MYPROTEIN_PAGE)
        .with_page(BULK_URL, BULK_PAGE);
    let updater = PriceUpdater::new(store.clone(), fetcher);

    let first = updater.update_all_prices().await;
    let prices_after_first: Vec<_> = [1, 2]
        .iter()
        .map(|id| store.product(*id).unwrap().price)
        .collect();

    let second = updater.update_all_prices().await;
    let prices_after_second: Vec<_> = [1, 2]
        .iter()
        .map(|id| store.product(*id).unwrap().price)
        .collect();

    assert_eq!(prices_after_first, prices_after_second);
    assert_eq!(first.summary, second.summary);
    assert_eq!(second.summary.unwrap().updated, 2);
    assert_eq!(store.updates().len(), 4);
}

#[tokio::test]
async fn test_dry_run_skips_persistence() {
    let store = MemoryStore::new().with_products(vec![Product::new(1, MYPROTEIN_URL)]);
    let fetcher = MockFetcher::new().with_page(MYPROTEIN_URL, MYPROTEIN_PAGE);

    let report = PriceUpdater::new(store.clone(), fetcher)
        .with_options(UpdaterOptions { dry_run: true })
        .update_all_prices()
        .await;

    assert_eq!(report.summary.unwrap().updated, 1);
    assert!(store.updates().is_empty());
    assert_eq!(store.product(1).unwrap().price, None);
}
