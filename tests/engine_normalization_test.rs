use striking_distance::engine::matcher::{contains, join_fields};
use striking_distance::engine::normalization::{clean_url, normalize_text, resolve_url};

// * Test Suite for Text Normalization and Keyword Matching

#[test]
fn test_normalization_idempotent() {
    let samples = [
        "",
        "The Best Running Shoes!",
        "  a  Boxes of   BATTERIES ",
        "Men's trail-running shoes (2024)",
        "the thes",
        "Glasses & Dresses",
        "ÉCOLES françaises",
        "an apple a day",
        "sss ss s",
        "İstanbul hotels",
        "news buses analysis",
    ];

    for s in samples {
        let once = normalize_text(s);
        assert_eq!(normalize_text(&once), once, "not idempotent for {:?}", s);
    }
}

#[test]
fn test_case_punctuation_and_whitespace() {
    assert_eq!(normalize_text("Best RUNNING-SHOES   store"), "best running shoe store");
    // * "mens" loses its trailing s like any other plural
    assert_eq!(normalize_text("Men's Shoes"), "men shoe");
    assert_eq!(normalize_text("   "), "");
}

#[test]
fn test_leading_articles_only() {
    assert_eq!(normalize_text("The running shoes"), "running shoe");
    assert_eq!(normalize_text("a the an shoe"), "shoe");
    // * Articles inside the phrase stay
    assert_eq!(normalize_text("shoes for the road"), "shoe for the road");
}

#[test]
fn test_known_stemming_limits() {
    // * Irregular plurals are not reduced
    assert_eq!(normalize_text("children"), "children");
    assert_eq!(normalize_text("mice"), "mice");
    // * Short tokens and -ss/-us/-is endings are left alone
    assert_eq!(normalize_text("bus gas"), "bus gas");
    assert_eq!(normalize_text("glass analysis"), "glass analysis");
}

#[test]
fn test_matcher_absence_safety() {
    for keyword in ["running shoes", "", "the"] {
        assert!(!contains(keyword, None));
    }
    assert!(!contains("shoes", Some("")));
}

#[test]
fn test_matcher_case_punctuation_tolerance() {
    assert!(contains("Running Shoes", Some("Best RUNNING-SHOES store")));
}

#[test]
fn test_matcher_plural_tolerance() {
    assert!(contains("running shoe", Some("our running shoes are great")));
    assert!(contains("running shoes", Some("one running shoe")));
}

#[test]
fn test_matcher_requires_contiguous_phrase() {
    assert!(!contains("best running shoes", Some("Running Shoes Guide")));
    assert!(!contains("running shoes", Some("shoes for running")));
    assert!(contains("best running shoes", Some("Find the best running shoes here")));
}

#[test]
fn test_matcher_empty_keyword_never_matches() {
    assert!(!contains("", Some("anything")));
    assert!(!contains("the", Some("the shoe store")));
}

#[test]
fn test_headings_joined_into_one_field() {
    let headings = ["Trail Running", "Shoes for Women"];
    let joined = join_fields(&headings);
    assert!(contains("shoes for women", joined.as_deref()));
    // * Consecutive headings read as one field
    assert!(contains("running shoes", joined.as_deref()));
    assert!(!contains("women trail", joined.as_deref()));
    assert!(!contains("running", join_fields(&[] as &[&str]).as_deref()));
}

#[test]
fn test_clean_url() {
    assert_eq!(clean_url("  https://example.com/a/ "), "https://example.com/a");
    assert_eq!(clean_url("/blogs/news/"), "/blogs/news");
}

#[test]
fn test_resolve_url() {
    assert_eq!(
        resolve_url("https://example.com/a", None).as_deref(),
        Some("https://example.com/a")
    );
    assert_eq!(
        resolve_url("/blogs/news", Some("https://example.com")).as_deref(),
        Some("https://example.com/blogs/news")
    );
    assert_eq!(resolve_url("/blogs/news", None), None);
    assert_eq!(resolve_url("ftp://example.com/file", None), None);
}
