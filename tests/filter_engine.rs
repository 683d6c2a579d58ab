use product_finder::model::types::Product;
use product_finder::search::filter::{IndexUnavailable, QueryState, filter_products};
use product_finder::search::index::SearchIndex;
use product_finder::search::tantivy::{FieldBoosts, TantivySearchIndex};
use std::collections::HashSet;

mod util;
use util::{ids, scenario_catalog};

fn build(catalog: &[Product]) -> TantivySearchIndex {
    TantivySearchIndex::build(catalog, FieldBoosts::default()).unwrap()
}

fn run<'a>(
    catalog: &'a [Product],
    index: &TantivySearchIndex,
    text: &str,
    max_price: Option<f64>,
) -> Vec<&'a Product> {
    filter_products(catalog, Some(index), &QueryState::new(text, max_price)).unwrap()
}

/// Deterministic catalogs of varying size with a spread of prices.
fn generated_catalogs() -> Vec<Vec<Product>> {
    let words = ["phone", "laptop", "cable", "charger", "lamp", "desk", "case"];
    (0..6)
        .map(|n| {
            (0..n * 7)
                .map(|i| {
                    let title = format!("{} {}", words[i % words.len()], words[(i * 3) % words.len()]);
                    let price = ((i * 37) % 250) as f64 + 0.5;
                    Product::new(i as u64 + 1, title, format!("item number {i}"), price)
                })
                .collect()
        })
        .collect()
}

#[test]
fn phone_query_matches_phone_and_case() {
    let catalog = scenario_catalog();
    let index = build(&catalog);
    let visible = run(&catalog, &index, "phone", None);
    let found: HashSet<String> = ids(&visible).into_iter().collect();
    assert_eq!(found, HashSet::from(["1".to_string(), "2".to_string()]));
}

#[test]
fn price_only_returns_cheap_products() {
    let catalog = scenario_catalog();
    let index = build(&catalog);
    assert_eq!(ids(&run(&catalog, &index, "", Some(100.0))), vec!["2"]);
}

#[test]
fn whitespace_query_with_price_bound_filters_by_price_only() {
    let catalog = scenario_catalog();
    let index = build(&catalog);
    assert_eq!(ids(&run(&catalog, &index, "  ", Some(100.0))), vec!["2"]);
}

#[test]
fn stop_word_in_query_does_not_widen_results() {
    let mut catalog = scenario_catalog();
    catalog[0].description = "A smart device".to_string();
    let index = build(&catalog);
    assert_eq!(ids(&run(&catalog, &index, "a laptop", None)), vec!["3"]);
}

#[test]
fn plural_query_matches_singular_titles() {
    let mut catalog = scenario_catalog();
    catalog[0].description = "A smart device".to_string();
    let index = build(&catalog);
    let found: HashSet<String> = ids(&run(&catalog, &index, "phones", None)).into_iter().collect();
    assert_eq!(found, HashSet::from(["1".to_string(), "2".to_string()]));
}

#[test]
fn text_match_failing_price_is_excluded() {
    let catalog = scenario_catalog();
    let index = build(&catalog);
    assert!(run(&catalog, &index, "laptop", Some(100.0)).is_empty());
}

#[test]
fn prefix_query_expands() {
    let catalog = scenario_catalog();
    let index = build(&catalog);
    let found: HashSet<String> = ids(&run(&catalog, &index, "pho", None)).into_iter().collect();
    assert_eq!(found, HashSet::from(["1".to_string(), "2".to_string()]));
}

#[test]
fn ranked_order_follows_index() {
    let catalog = scenario_catalog();
    let index = build(&catalog);
    let expected: Vec<String> = index
        .search("phone")
        .unwrap()
        .iter()
        .map(|id| id.to_string())
        .collect();
    assert_eq!(ids(&run(&catalog, &index, "phone", None)), expected);
}

#[test]
fn empty_query_and_price_bound_preserves_catalog_order() {
    for catalog in generated_catalogs() {
        let index = build(&catalog);
        for bound in [0.0, 0.5, 50.0, 125.5, 249.5, 1_000.0] {
            let visible = run(&catalog, &index, "", Some(bound));
            let expected: Vec<&Product> = catalog.iter().filter(|p| p.price <= bound).collect();
            assert_eq!(visible, expected, "bound {bound}");
        }
    }
}

#[test]
fn unfiltered_is_identity() {
    for catalog in generated_catalogs() {
        let visible = filter_products(&catalog, None, &QueryState::default()).unwrap();
        let expected: Vec<&Product> = catalog.iter().collect();
        assert_eq!(visible, expected);
    }
}

#[test]
fn results_are_subset_without_duplicates_and_respect_bound() {
    for catalog in generated_catalogs() {
        let index = build(&catalog);
        for query in ["phone", "ca", "desk lamp", "item", "zzz", ""] {
            for bound in [None, Some(10.0), Some(120.0)] {
                let visible = run(&catalog, &index, query, bound);
                let mut seen = HashSet::new();
                for product in &visible {
                    assert!(catalog.iter().any(|p| std::ptr::eq(p, *product)));
                    assert!(seen.insert(product.id.clone()), "duplicate {}", product.id);
                    if let Some(bound) = bound {
                        assert!(product.price <= bound);
                    }
                }
            }
        }
    }
}

#[test]
fn repeated_filter_is_idempotent() {
    for catalog in generated_catalogs() {
        let index = build(&catalog);
        for query in ["phone", "charger cable", ""] {
            let first = run(&catalog, &index, query, Some(200.0));
            let second = run(&catalog, &index, query, Some(200.0));
            assert_eq!(first, second);
        }
    }
}

#[test]
fn filtering_before_index_exists_reports_unavailable() {
    let catalog = scenario_catalog();
    let result = filter_products(&catalog, None, &QueryState::new("phone", Some(10.0)));
    assert_eq!(result, Err(IndexUnavailable));
}
