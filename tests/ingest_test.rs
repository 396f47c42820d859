use std::io::Write;

use striking_distance::ingest::{read_performance_csv, read_performance_file, InputFormatError};

// * Test Suite for Search Console export ingestion

#[test]
fn test_gsc_export_with_bom_and_aliases() {
    let text = "\u{feff}Top queries,Landing Page,Clicks,Impressions,CTR,Position\n\
                running shoes,https://example.com/shoes/,\"1,234\",20000,6.17%,8.3\n\
                trail boots,https://example.com/boots,12,400,3%,\n";

    let data = read_performance_csv(text).unwrap();

    assert_eq!(data.rows.len(), 2);
    assert!(data.has_position_column);

    let first = &data.rows[0];
    assert_eq!(first.keyword, "running shoes");
    assert_eq!(first.url, "https://example.com/shoes");
    assert_eq!(first.clicks, 1234);
    assert_eq!(first.impressions, Some(20000));
    assert_eq!(first.position, Some(8.3));
    assert!((first.ctr.unwrap() - 0.0617).abs() < 1e-9);

    // * Blank position cell reads as absent
    assert_eq!(data.rows[1].position, None);
}

#[test]
fn test_semicolon_and_tab_exports() {
    let semicolon = "Keyword;URL;Clicks;Position\nshoes;/a;3;5,5\n";
    let data = read_performance_csv(semicolon).unwrap();
    assert_eq!(data.rows[0].position, Some(5.5));

    let tab = "Query\tPage\tClicks\nshoes\t/a\t3\n";
    let data = read_performance_csv(tab).unwrap();
    assert_eq!(data.rows[0].url, "/a");
    assert!(!data.has_position_column);
}

#[test]
fn test_missing_columns_named() {
    let err = read_performance_csv("Query,Impressions\nshoes,10\n").unwrap_err();

    match err {
        InputFormatError::MissingColumns { missing, available } => {
            assert_eq!(missing, vec!["URL", "Clicks"]);
            assert_eq!(available, vec!["Query", "Impressions"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_blank_cells_and_bad_clicks() {
    let text = "Query,Page,Clicks\n\
                ,/a,3\n\
                shoes,,3\n\
                boots,/b,n/a\n\
                socks,/c,4\n";

    let data = read_performance_csv(text).unwrap();

    assert_eq!(data.summary.rows_read, 4);
    assert_eq!(data.summary.rows_blank, 2);
    assert_eq!(data.summary.clicks_coerced, 1);
    assert_eq!(data.summary.rows_kept, 2);
    assert_eq!(data.rows[0].clicks, 0);
}

#[test]
fn test_empty_input() {
    assert!(matches!(read_performance_csv("\n  \n"), Err(InputFormatError::Empty)));
}

#[test]
fn test_excel_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("export.xlsx");
    std::fs::write(&path, b"PK\x03\x04").unwrap();

    let err = read_performance_file(&path).unwrap_err();
    assert!(matches!(err, InputFormatError::UnsupportedFormat(ref ext) if ext == "xlsx"));
}

#[test]
fn test_read_from_disk() {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "Query,Page,Clicks,Position").unwrap();
    writeln!(file, "running shoes,/shoes,150,8").unwrap();

    let data = read_performance_file(file.path()).unwrap();
    assert_eq!(data.rows.len(), 1);
    assert_eq!(data.rows[0].position, Some(8.0));
}
