//! One exploration session over one uploaded dataset.
//!
//! A [`Session`] owns the current table snapshot. Read-only stages (summary,
//! charts, export) borrow it; cleaning returns a new session and leaves the
//! old one usable. [`run_session`] drives every stage for a single request
//! and collects each stage's result separately, so one failing stage never
//! hides the output of the others.

use super::charts::{ChartBattery, render_battery};
use super::cleaning::{CleaningDirective, StepReport, apply_directive};
use super::export::{ExportArtifact, encode_csv};
use super::summary::{SummaryReport, summarize};
use super::table::{ColumnRef, Table, TablePreview, TableProfile};
use super::validate::validate_csv;
use crate::config::{ChartSettings, ExplorerConfig, ReaderSettings};
use crate::error::{ExploreError, Result};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug)]
pub struct Session {
    table: Table,
}

impl Session {
    /// Validates the upload and starts a session on it.
    ///
    /// # Errors
    ///
    /// Whatever [`validate_csv`] rejects.
    pub fn open(input: &[u8], settings: &ReaderSettings) -> Result<Self> {
        validate_csv(input, settings).map(Self::from_table)
    }

    pub fn from_table(table: Table) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn profile(&self) -> TableProfile {
        self.table.profile()
    }

    pub fn preview(&self, rows: usize) -> Result<TablePreview> {
        self.table
            .preview_text(rows)
            .map_err(|e| ExploreError::MalformedInput(e.to_string()))
    }

    pub fn summarize(&self) -> SummaryReport {
        summarize(&self.table)
    }

    pub fn visualize(
        &self,
        x: &ColumnRef,
        y: &ColumnRef,
        settings: &ChartSettings,
    ) -> Result<ChartBattery> {
        render_battery(&self.table, x, y, settings)
    }

    /// Applies a cleaning directive, producing the next session.
    ///
    /// # Errors
    ///
    /// Returns the failing step's error; `self` is still the valid snapshot.
    pub fn clean(&self, directive: &CleaningDirective) -> Result<(Self, Vec<StepReport>)> {
        let outcome = apply_directive(&self.table, directive)?;
        Ok((Self::from_table(outcome.table), outcome.steps))
    }

    pub fn export(&self) -> Result<ExportArtifact> {
        encode_csv(&self.table)
    }
}

/// What the user picked on the page.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionRequest {
    /// Defaults to the first column.
    pub x: Option<ColumnRef>,
    /// Defaults to the first column.
    pub y: Option<ColumnRef>,
    pub directive: CleaningDirective,
}

/// Every stage's result for one request. Stages after validation are `None`
/// only when validation failed.
#[derive(Debug, Serialize)]
pub struct SessionReport {
    pub profile: Result<TableProfile>,
    pub preview: Option<Result<TablePreview>>,
    pub summary: Option<SummaryReport>,
    pub charts: Option<Result<ChartBattery>>,
    pub cleaning: Option<Result<Vec<StepReport>>>,
    /// Export of the cleaned table, or of the uncleaned one if cleaning failed.
    pub export: Option<Result<ExportArtifact>>,
}

impl SessionReport {
    fn rejected(err: ExploreError) -> Self {
        Self {
            profile: Err(err),
            preview: None,
            summary: None,
            charts: None,
            cleaning: None,
            export: None,
        }
    }

    pub fn loaded(&self) -> bool {
        self.profile.is_ok()
    }
}

fn default_column(table: &Table) -> ColumnRef {
    table
        .column_names()
        .into_iter()
        .next()
        .map(ColumnRef::from)
        .unwrap_or_else(|| ColumnRef::new(""))
}

/// Runs validation, preview, summary, charts, cleaning and export in order.
pub fn run_session(input: &[u8], request: &SessionRequest, config: &ExplorerConfig) -> SessionReport {
    let session = match Session::open(input, &config.reader) {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!("{e}");
            return SessionReport::rejected(e);
        }
    };

    let preview = session.preview(config.preview_rows);
    let summary = session.summarize();

    let fallback = default_column(session.table());
    let x = request.x.clone().unwrap_or_else(|| fallback.clone());
    let y = request.y.clone().unwrap_or(fallback);
    let charts = session.visualize(&x, &y, &config.charts);
    if let Err(e) = &charts {
        tracing::warn!("{e}");
    }

    let (current, cleaning) = match session.clean(&request.directive) {
        Ok((cleaned, steps)) => (cleaned, Ok(steps)),
        Err(e) => {
            tracing::warn!("{e}");
            (session.clone(), Err(e))
        }
    };

    let export = current.export();
    if let Err(e) = &export {
        tracing::warn!("{e}");
    }

    SessionReport {
        profile: Ok(session.profile()),
        preview: Some(preview),
        summary: Some(summary),
        charts: Some(charts),
        cleaning: Some(cleaning),
        export: Some(export),
    }
}
