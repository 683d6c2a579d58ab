use product_finder::catalog::FileCatalogLoader;
use product_finder::finder::{LoadSettings, ProductFinder, load_catalog};
use product_finder::search::filter::{QueryState, filter_products};
use product_finder::search::tantivy::{FieldBoosts, TantivySearchIndex};

mod util;
use util::{TestTracing, scenario_catalog};

#[tokio::test]
async fn catalog_load_emits_span_and_counts() {
    let trace = TestTracing::new();
    let _guard = trace.install();

    let loader = FileCatalogLoader::new("tests/fixtures/catalog.json");
    let (catalog, _index) = load_catalog(&loader, &LoadSettings::default()).await.unwrap();
    assert_eq!(catalog.len(), 5);

    let out = trace.output();
    assert!(out.contains("load_products"));
    assert!(out.contains("catalog loaded"));
    assert!(out.contains("products=5"));
    assert!(out.contains("search index built"));
}

#[test]
fn search_logs_backend() {
    let trace = TestTracing::new();
    let _guard = trace.install();

    let catalog = scenario_catalog();
    let index = TantivySearchIndex::build(&catalog, FieldBoosts::default()).unwrap();
    filter_products(&catalog, Some(&index), &QueryState::new("phone", None)).unwrap();

    let out = trace.output();
    assert!(out.contains("backend=tantivy"));
    assert!(out.contains("filter applied"));
    assert!(out.contains("visible=2"));
}

#[test]
fn failed_load_is_logged() {
    let trace = TestTracing::new();
    let _guard = trace.install();

    let mut finder = ProductFinder::new();
    finder.begin_loading().unwrap();
    finder.fail_loading("connection refused").unwrap();

    let out = trace.output();
    assert!(out.contains("ERROR"));
    assert!(out.contains("error fetching products: connection refused"));
}

#[test]
fn rejected_price_is_logged() {
    let trace = TestTracing::new();
    let _guard = trace.install();

    let mut finder = ProductFinder::new();
    assert!(finder.set_price_input("abc").is_err());

    let out = trace.output();
    assert!(out.contains("WARN"));
    assert!(out.contains("rejected price input"));
}
