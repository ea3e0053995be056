//! End-to-end runs of the exploration pipeline over the fixture files.

use std::path::PathBuf;
use tablescope::config::{ExplorerConfig, ReaderSettings};
use tablescope::error::ExploreError;
use tablescope::explorer::{
    ChartKind, CleaningDirective, ColumnKind, MissingValueStrategy, PIE_MAX_CATEGORIES, Session,
    SessionRequest, run_session, validate_csv,
};

fn fixture(name: &str) -> Vec<u8> {
    let path = PathBuf::from("testdata").join(name);
    std::fs::read(&path).unwrap_or_else(|e| panic!("missing fixture {}: {e}", path.display()))
}

#[test]
fn test_sales_loads_with_expected_shape() -> anyhow::Result<()> {
    let table = validate_csv(&fixture("sales.csv"), &ReaderSettings::default())?;
    assert_eq!(table.height(), 8, "Should have 8 rows");
    assert_eq!(table.width(), 5, "Should have 5 columns");
    assert_eq!(table.kind_of("units"), Some(ColumnKind::Numeric));
    assert_eq!(table.kind_of("price"), Some(ColumnKind::Numeric));
    assert_eq!(table.kind_of("rep"), Some(ColumnKind::Categorical));

    let missing: usize = table.profile().columns.iter().map(|c| c.missing).sum();
    assert_eq!(missing, 3, "units, price and rep each miss one value");
    Ok(())
}

#[test]
fn test_header_only_fixture_is_empty() {
    let err = validate_csv(&fixture("header_only.csv"), &ReaderSettings::default())
        .expect_err("header without rows");
    assert!(matches!(err, ExploreError::EmptyDataset), "got {err:?}");
}

#[test]
fn test_ragged_fixture_is_malformed() {
    let err = validate_csv(&fixture("ragged.csv"), &ReaderSettings::default())
        .expect_err("row 2 is short");
    assert!(matches!(err, ExploreError::MalformedInput(_)), "got {err:?}");
    assert_eq!(err.kind(), "MalformedInputError");
}

#[test]
fn test_full_session_drop_and_dedupe() -> anyhow::Result<()> {
    let request = SessionRequest {
        x: Some("region".into()),
        y: Some("units".into()),
        directive: CleaningDirective {
            missing: MissingValueStrategy::DropRowsWithMissing,
            dedupe: true,
        },
    };
    let report = run_session(&fixture("sales.csv"), &request, &ExplorerConfig::default());
    assert!(report.loaded());

    let summary = report.summary.as_ref().expect("summary runs after load");
    assert_eq!(summary.failures().count(), 0);

    let charts = match &report.charts {
        Some(Ok(charts)) => charts,
        other => panic!("charts should render: {other:?}"),
    };
    assert_eq!(
        charts.attempted(),
        ChartKind::BATTERY.to_vec(),
        "4 regions keep the pie chart"
    );
    assert_eq!(charts.failed().count(), 0, "two numeric columns, every chart renders");

    let steps = match &report.cleaning {
        Some(Ok(steps)) => steps,
        other => panic!("cleaning should succeed: {other:?}"),
    };
    let rows: Vec<(usize, usize)> = steps.iter().map(|s| (s.rows_before, s.rows_after)).collect();
    assert_eq!(rows, vec![(8, 5), (5, 4)]);
    assert_eq!(steps[0].message, "Rows with missing values have been removed.");
    assert_eq!(steps[1].message, "Duplicate rows have been removed.");

    let export = match &report.export {
        Some(Ok(export)) => export,
        other => panic!("export should succeed: {other:?}"),
    };
    assert_eq!(export.file_name, "cleaned_data.csv");
    let reloaded = validate_csv(&export.bytes, &ReaderSettings::default())?;
    assert_eq!(reloaded.height(), 4);
    assert_eq!(reloaded.width(), 5);
    Ok(())
}

#[test]
fn test_fill_with_zero_then_export() -> anyhow::Result<()> {
    let session = Session::open(&fixture("sales.csv"), &ReaderSettings::default())?;
    let (cleaned, _) = session.clean(&CleaningDirective {
        missing: MissingValueStrategy::FillMissingWithZero,
        dedupe: false,
    })?;
    assert_eq!(cleaned.table().height(), 8);

    let text = String::from_utf8(cleaned.export()?.bytes)?;
    assert!(text.contains("East,Widget,0,2.5,Cat"), "got {text}");
    assert!(text.contains("East,Gizmo,5,10.0,0"), "got {text}");
    Ok(())
}

#[test]
fn test_dedupe_fixture() -> anyhow::Result<()> {
    let session = Session::open(&fixture("duplicates.csv"), &ReaderSettings::default())?;
    let (cleaned, steps) = session.clean(&CleaningDirective {
        missing: MissingValueStrategy::NoOp,
        dedupe: true,
    })?;
    assert_eq!(steps.len(), 1);
    let text = String::from_utf8(cleaned.export()?.bytes)?;
    assert_eq!(text, "k,v\na,1\nb,2\n");
    Ok(())
}

#[test]
fn test_pie_chart_skipped_for_many_categories() -> anyhow::Result<()> {
    let session = Session::open(&fixture("many_categories.csv"), &ReaderSettings::default())?;
    assert!(session.profile().rows > PIE_MAX_CATEGORIES);

    let charts = session.visualize(
        &"city".into(),
        &"visits".into(),
        &ExplorerConfig::default().charts,
    )?;
    assert!(charts.outcome(ChartKind::PieChart).is_none());
    assert!(charts.outcome(ChartKind::KdePlot).is_some_and(|o| o.is_ok()));
    Ok(())
}

#[test]
fn test_report_serializes_to_json() -> anyhow::Result<()> {
    let report = run_session(
        &fixture("sales.csv"),
        &SessionRequest::default(),
        &ExplorerConfig::default(),
    );
    let json = serde_json::to_value(&report)?;
    assert!(json.get("summary").is_some());
    assert_eq!(json["export"]["Ok"]["file_name"], "cleaned_data.csv");

    let rejected = run_session(
        &fixture("ragged.csv"),
        &SessionRequest::default(),
        &ExplorerConfig::default(),
    );
    let json = serde_json::to_value(&rejected)?;
    let message = json["profile"]["Err"].as_str().unwrap_or_default();
    assert!(message.starts_with("Dataset validation failed"), "got {message}");
    Ok(())
}
