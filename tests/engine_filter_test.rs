use striking_distance::config::{DuplicatePolicy, FilterConfig};
use striking_distance::engine::filter::{filter, KeywordFilter};
use striking_distance::PerformanceRow;

// * Test Suite for the Keyword Filter

const RANGE: (f64, f64) = (4.0, 20.0);

fn row(url: &str, keyword: &str, position: f64) -> PerformanceRow {
    PerformanceRow::new(url, keyword, 10, position)
}

#[test]
fn test_exclusion_is_exact_match_only() {
    let rows = vec![
        row("/blogs/news", "shoe news", 8.0),
        row("/blogs/news/article-title", "shoe article", 8.0),
    ];
    let kept = filter(&rows, &[], &["/blogs/news".to_string()], RANGE);

    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].url, "/blogs/news/article-title");
}

#[test]
fn test_parameterized_urls_always_dropped() {
    let rows = vec![
        row("/shop?color=red", "red shoes", 8.0),
        row("/shop/size=10", "size 10 shoes", 8.0),
        row("/shop#reviews", "shoe reviews", 8.0),
        row("/shop", "shoes", 8.0),
    ];
    let kept = filter(&rows, &[], &[], RANGE);

    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].url, "/shop");
}

#[test]
fn test_position_bounds_inclusive() {
    let rows = vec![
        row("/a", "three", 3.0),
        row("/a", "four", 4.0),
        row("/a", "twenty", 20.0),
        row("/a", "twenty one", 21.0),
        row("/a", "almost four", 3.99),
    ];
    let kept: Vec<String> = filter(&rows, &[], &[], RANGE)
        .into_iter()
        .map(|r| r.keyword)
        .collect();

    assert_eq!(kept, vec!["four", "twenty"]);
}

#[test]
fn test_branded_terms_normalized() {
    let rows = vec![
        row("/a", "Acme Running Shoes", 8.0),
        row("/a", "acmes trail shoes", 8.0),
        row("/a", "trail shoes", 8.0),
    ];
    let kept = filter(&rows, &["ACME".to_string()], &[], RANGE);

    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].keyword, "trail shoes");
}

#[test]
fn test_relative_order_preserved() {
    let rows = vec![
        row("/c", "c", 5.0),
        row("/a", "a", 50.0),
        row("/b", "b", 6.0),
        row("/a", "a2", 7.0),
    ];
    let kept: Vec<String> = filter(&rows, &[], &[], RANGE)
        .into_iter()
        .map(|r| r.keyword)
        .collect();

    assert_eq!(kept, vec!["c", "b", "a2"]);
}

#[test]
fn test_missing_position_is_configurable() {
    let rows = vec![row("/a", "no position", 8.0).without_position()];

    let default_outcome = KeywordFilter::from_config(&FilterConfig::default()).apply(&rows);
    assert!(default_outcome.rows.is_empty());
    assert_eq!(default_outcome.dropped.missing_position, 1);

    let config = FilterConfig {
        retain_missing_position: true,
        ..Default::default()
    };
    let retained = KeywordFilter::from_config(&config).apply(&rows);
    assert_eq!(retained.rows.len(), 1);
}

#[test]
fn test_duplicate_policies() {
    let rows = vec![
        PerformanceRow::new("/a", "running shoes", 100, 8.0),
        PerformanceRow::new("/a", "running shoes", 50, 6.0),
    ];

    let summed = KeywordFilter::from_config(&FilterConfig::default()).apply(&rows);
    assert_eq!(summed.merged_duplicates, 1);
    assert_eq!(summed.rows.len(), 1);
    assert_eq!(summed.rows[0].clicks, 150);
    assert_eq!(summed.rows[0].position, Some(6.0));

    let config = FilterConfig {
        duplicate_policy: DuplicatePolicy::KeepFirst,
        ..Default::default()
    };
    let first = KeywordFilter::from_config(&config).apply(&rows);
    assert_eq!(first.rows.len(), 1);
    assert_eq!(first.rows[0].clicks, 100);
    assert_eq!(first.rows[0].position, Some(8.0));
}
