//! CSV encoding of the current snapshot for download.

use super::table::Table;
use crate::error::{ExploreError, Result};
use polars::prelude::*;
use serde::Serialize;

pub const EXPORT_FILE_NAME: &str = "cleaned_data.csv";
pub const EXPORT_MEDIA_TYPE: &str = "text/csv";

/// Encoded table plus what a browser needs to offer it as a file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExportArtifact {
    pub file_name: String,
    pub media_type: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub size: usize,
}

impl ExportArtifact {
    /// The encoded CSV as text.
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }
}

/// Comma-separated, header row, no index column, missing values as empty fields.
///
/// # Errors
///
/// Returns [`ExploreError::ExportEncoding`] if polars cannot write the frame.
pub fn encode_csv(table: &Table) -> Result<ExportArtifact> {
    // the writer needs a mutable frame; clones share column buffers
    let mut df = table.frame().clone();
    let mut bytes = Vec::new();
    CsvWriter::new(&mut bytes)
        .include_header(true)
        .with_separator(b',')
        .with_null_value(String::new())
        .finish(&mut df)
        .map_err(|e| ExploreError::ExportEncoding(e.to_string()))?;

    tracing::info!(
        "Encoded {} rows as {} ({} bytes)",
        table.height(),
        EXPORT_FILE_NAME,
        bytes.len()
    );
    Ok(ExportArtifact {
        file_name: EXPORT_FILE_NAME.to_owned(),
        media_type: EXPORT_MEDIA_TYPE.to_owned(),
        size: bytes.len(),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReaderSettings;
    use crate::explorer::validate::validate_csv;

    const INPUT: &str = "name,score,visits\n\"Smith, Ann\",2.5,3\nBob,,4\n,7.25,\n";

    #[test]
    fn test_export_is_deterministic() -> anyhow::Result<()> {
        let table = validate_csv(INPUT.as_bytes(), &ReaderSettings::default())?;
        let first = encode_csv(&table)?;
        let second = encode_csv(&table)?;
        assert_eq!(first, second);
        assert_eq!(first.file_name, "cleaned_data.csv");
        assert_eq!(first.media_type, "text/csv");
        Ok(())
    }

    #[test]
    fn test_export_round_trips() -> anyhow::Result<()> {
        let settings = ReaderSettings::default();
        let table = validate_csv(INPUT.as_bytes(), &settings)?;
        let exported = encode_csv(&table)?;
        let text = exported.as_text().expect("utf-8");
        assert!(text.starts_with("name,score,visits\n"), "got {text}");
        assert!(text.contains("\"Smith, Ann\""));

        let reloaded = validate_csv(&exported.bytes, &settings)?;
        assert!(reloaded.same_contents(&table));
        Ok(())
    }
}
