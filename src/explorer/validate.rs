//! Turns uploaded bytes into a [`Table`], or says why it can't.
//!
//! Two passes over the input. A structural pass with the `csv` crate rejects
//! ragged records and invalid UTF-8, skips blank lines and writes every
//! accepted record back out through a `csv::Writer`. Polars then reads only
//! that re-encoded buffer and infers column types, so the frame holds exactly
//! the rows the structural pass counted. There is no partial success: either
//! every row is loaded or none is.

use super::table::Table;
use crate::config::ReaderSettings;
use crate::error::{ExploreError, Result};
use polars::prelude::*;
use std::collections::HashSet;
use std::io::Cursor;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

fn malformed(cause: impl std::fmt::Display) -> ExploreError {
    ExploreError::MalformedInput(cause.to_string())
}

/// Input that passed the structural check, re-encoded record by record.
struct Normalized {
    bytes: Vec<u8>,
    rows: usize,
}

/// Unique, non-empty column names.
///
/// A blank header becomes `Unnamed: <index>`. A repeated name gets the first
/// free `.1`, `.2`, ... suffix, skipping names used elsewhere in the header.
fn header_names(raw: &csv::StringRecord) -> Vec<String> {
    let named: Vec<String> = raw
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            if name.trim().is_empty() {
                format!("Unnamed: {idx}")
            } else {
                name.to_owned()
            }
        })
        .collect();
    let in_header: HashSet<&str> = named.iter().map(String::as_str).collect();

    let mut used: HashSet<String> = HashSet::new();
    let mut names = Vec::with_capacity(named.len());
    for name in &named {
        let mut unique = name.clone();
        let mut suffix = 0;
        while used.contains(&unique) || (suffix > 0 && in_header.contains(unique.as_str())) {
            suffix += 1;
            unique = format!("{name}.{suffix}");
        }
        if suffix > 0 {
            tracing::warn!("Duplicate column name '{name}' renamed to '{unique}'");
        }
        used.insert(unique.clone());
        names.push(unique);
    }
    names
}

// " 1" reads as a number; " x" keeps its spaces
fn trim_numeric(field: &str) -> &str {
    let trimmed = field.trim();
    if trimmed.len() != field.len() && trimmed.parse::<f64>().is_ok() {
        trimmed
    } else {
        field
    }
}

/// Checks the record structure and re-encodes the accepted records.
fn normalize(input: &[u8], settings: &ReaderSettings) -> Result<Normalized> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(settings.delimiter)
        .has_headers(true)
        .flexible(false)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| malformed(format!("failed to read the header row: {e}")))?
        .clone();
    if headers.is_empty() {
        return Err(ExploreError::EmptyDataset);
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(settings.delimiter)
        .from_writer(Vec::with_capacity(input.len()));
    writer
        .write_record(header_names(&headers))
        .map_err(malformed)?;

    let mut rows = 0;
    for record in reader.records() {
        let record =
            record.map_err(|e| malformed(format!("failed to parse row {}: {e}", rows + 1)))?;
        writer
            .write_record(record.iter().map(trim_numeric))
            .map_err(malformed)?;
        rows += 1;
    }

    let bytes = writer.into_inner().map_err(malformed)?;
    Ok(Normalized { bytes, rows })
}

fn read_frame(input: &[u8], settings: &ReaderSettings) -> Result<DataFrame> {
    let null_values = NullValues::AllColumns(
        settings
            .null_tokens
            .iter()
            .map(|t| PlSmallStr::from(t.as_str()))
            .collect(),
    );

    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(settings.infer_schema_rows)
        .map_parse_options(|opts| {
            opts.with_separator(settings.delimiter)
                .with_null_values(Some(null_values.clone()))
        })
        .into_reader_with_file_handle(Cursor::new(input))
        .finish()
        .map_err(malformed)
}

/// Parses raw CSV bytes into a table.
///
/// # Errors
///
/// - [`ExploreError::EmptyDataset`] for blank input or a header with no rows.
/// - [`ExploreError::MalformedInput`] for anything that does not parse cleanly.
pub fn validate_csv(input: &[u8], settings: &ReaderSettings) -> Result<Table> {
    let input = input.strip_prefix(UTF8_BOM).unwrap_or(input);
    if input.iter().all(u8::is_ascii_whitespace) {
        return Err(ExploreError::EmptyDataset);
    }
    std::str::from_utf8(input)
        .map_err(|e| malformed(format!("input is not valid UTF-8: {e}")))?;

    let normalized = normalize(input, settings)?;
    if normalized.rows == 0 {
        return Err(ExploreError::EmptyDataset);
    }

    let df = read_frame(&normalized.bytes, settings)?;
    if df.height() != normalized.rows {
        return Err(malformed(format!(
            "expected {} rows but read {}",
            normalized.rows,
            df.height()
        )));
    }

    let table = Table::from_frame(df);
    tracing::info!(
        "Loaded dataset: {} rows, {} columns",
        table.height(),
        table.width()
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explorer::cleaning::fill_missing_with_zero;
    use crate::explorer::export::encode_csv;
    use crate::explorer::table::ColumnKind;

    fn load(input: &str) -> Result<Table> {
        validate_csv(input.as_bytes(), &ReaderSettings::default())
    }

    #[test]
    fn test_preserves_shape() -> anyhow::Result<()> {
        let table = load("name,age,city\nAnn,30,SYD\nBob,,MEL\nCat,40,\n")?;
        assert_eq!(table.height(), 3);
        assert_eq!(table.width(), 3);
        assert_eq!(table.column_names(), vec!["name", "age", "city"]);
        assert_eq!(table.kind_of("age"), Some(ColumnKind::Numeric));
        assert_eq!(table.kind_of("name"), Some(ColumnKind::Categorical));
        Ok(())
    }

    #[test]
    fn test_header_only_is_empty() {
        let err = load("a,b,c\n").expect_err("no rows");
        assert!(matches!(err, ExploreError::EmptyDataset));
    }

    #[test]
    fn test_blank_input_is_empty() {
        assert!(matches!(load(""), Err(ExploreError::EmptyDataset)));
        assert!(matches!(load("  \n\n"), Err(ExploreError::EmptyDataset)));
    }

    #[test]
    fn test_ragged_rows_are_malformed() {
        let err = load("a,b\n1,2\n3,4,5\n").expect_err("ragged");
        assert!(matches!(err, ExploreError::MalformedInput(_)), "got {err:?}");
        let err = load("a,b,c\n1,2,3\n4,5\n").expect_err("short row");
        assert!(matches!(err, ExploreError::MalformedInput(_)), "got {err:?}");
    }

    #[test]
    fn test_blank_lines_are_not_rows() -> anyhow::Result<()> {
        let table = load("a,b\n1,2\n\n3,4\n\n\n")?;
        assert_eq!(table.height(), 2, "blank lines must not become rows");
        assert_eq!(table.profile().columns[0].missing, 0);
        assert_eq!(table.numeric_columns(), vec!["a", "b"]);

        let single = load("a\n1\n\n2\n")?;
        assert_eq!(single.height(), 2);
        assert_eq!(single.profile().columns[0].missing, 0);
        Ok(())
    }

    #[test]
    fn test_blank_lines_do_not_reach_cleaning() -> anyhow::Result<()> {
        let table = load("a,b\n1,2\n\n3,4\n")?;
        let filled = fill_missing_with_zero(&table)?;
        let export = encode_csv(&filled)?;
        assert_eq!(export.as_text(), Some("a,b\n1,2\n3,4\n"));
        Ok(())
    }

    #[test]
    fn test_duplicate_headers_are_renamed() -> anyhow::Result<()> {
        let table = load("a,a,b\n1,2,x\n")?;
        assert_eq!(table.column_names(), vec!["a", "a.1", "b"]);

        let table = load("a,a,a.1\n1,2,3\n")?;
        assert_eq!(table.column_names(), vec!["a", "a.2", "a.1"]);
        Ok(())
    }

    #[test]
    fn test_blank_header_gets_a_name() -> anyhow::Result<()> {
        let table = load(",v\n0,1\n1,2\n")?;
        assert_eq!(table.column_names(), vec!["Unnamed: 0", "v"]);
        Ok(())
    }

    #[test]
    fn test_spaces_around_numbers_are_ignored() -> anyhow::Result<()> {
        let table = load("a,b,c\n 1, 2, x\n3,4 ,y\n")?;
        assert_eq!(table.kind_of("a"), Some(ColumnKind::Numeric));
        assert_eq!(table.kind_of("b"), Some(ColumnKind::Numeric));
        assert_eq!(table.kind_of("c"), Some(ColumnKind::Categorical));
        let preview = table.preview_text(1)?;
        assert_eq!(preview.rows[0][2].as_deref(), Some(" x"));
        Ok(())
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        let err = validate_csv(b"a,b\n\xff\xfe,1\n", &ReaderSettings::default())
            .expect_err("not UTF-8");
        assert!(matches!(err, ExploreError::MalformedInput(_)));
    }

    #[test]
    fn test_null_tokens_and_unknown_columns() -> anyhow::Result<()> {
        let table = load("score,notes\nNA,\n2.5,N/A\nnull,\n")?;
        assert_eq!(table.kind_of("score"), Some(ColumnKind::Numeric));
        assert_eq!(table.kind_of("notes"), Some(ColumnKind::Unknown));
        let profile = table.profile();
        assert_eq!(profile.columns[0].missing, 2);
        assert_eq!(profile.columns[1].missing, 3);
        Ok(())
    }

    #[test]
    fn test_custom_delimiter() -> anyhow::Result<()> {
        let settings = ReaderSettings {
            delimiter: b';',
            ..ReaderSettings::default()
        };
        let table = validate_csv(b"x;y\n1;2\n3;4\n", &settings)?;
        assert_eq!(table.width(), 2);
        assert_eq!(table.numeric_columns(), vec!["x", "y"]);
        Ok(())
    }
}
