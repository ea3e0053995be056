//! Chart selection and rendering for a chosen X/Y column pair.
//!
//! [`render_battery`] attempts a fixed list of chart kinds against one table
//! snapshot and returns one [`ChartOutcome`] per attempted kind. Every kind is
//! its own fault domain: a chart that cannot be built records its error and
//! the next kind still runs. The pie chart is gated on the cardinality of X
//! before it is attempted; a closed gate produces no outcome at all.
//!
//! Rendering here means computing the plotted data (see [`artifacts`]);
//! drawing is the display layer's job.

pub mod artifacts;
mod builders;

pub use artifacts::{
    AxisScale, BarGroup, BoxGroup, BoxStats, ChartArtifact, CorrelationMatrix, DensityCurve,
    Histogram, MatrixCell, MatrixPanel, PieSlice, Point, PointSeries, ScatterMatrix, ViolinGroup,
};

use super::table::{ColumnRef, Table};
use crate::config::ChartSettings;
use crate::error::{ExploreError, Result};
use serde::{Deserialize, Serialize};

/// A pie chart is only attempted when X has at most this many distinct values
/// (a missing value counts as one). Beyond that the slices are unreadable.
pub const PIE_MAX_CATEGORIES: usize = 10;

/// Every chart the selector knows about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartKind {
    Scatter,
    Line,
    Bar,
    Histogram,
    BoxPlot,
    ViolinPlot,
    CorrelationHeatmap,
    ScatterMatrix,
    PieChart,
    KdePlot,
}

impl ChartKind {
    /// Attempt order for a battery.
    pub const BATTERY: [Self; 10] = [
        Self::Scatter,
        Self::Line,
        Self::Bar,
        Self::Histogram,
        Self::BoxPlot,
        Self::ViolinPlot,
        Self::CorrelationHeatmap,
        Self::ScatterMatrix,
        Self::PieChart,
        Self::KdePlot,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scatter => "Scatter Plot",
            Self::Line => "Line Plot",
            Self::Bar => "Bar Plot",
            Self::Histogram => "Histogram",
            Self::BoxPlot => "Box Plot",
            Self::ViolinPlot => "Violin Plot",
            Self::CorrelationHeatmap => "Correlation Heatmap",
            Self::ScatterMatrix => "Scatterplot Matrix",
            Self::PieChart => "Pie Chart",
            Self::KdePlot => "KDE Plot",
        }
    }

    /// Whether the chart reads the X selection.
    pub fn uses_x(&self) -> bool {
        matches!(
            self,
            Self::Scatter
                | Self::Line
                | Self::Bar
                | Self::BoxPlot
                | Self::ViolinPlot
                | Self::PieChart
        )
    }

    /// Whether the chart reads the Y selection.
    pub fn uses_y(&self) -> bool {
        matches!(
            self,
            Self::Scatter
                | Self::Line
                | Self::Bar
                | Self::Histogram
                | Self::BoxPlot
                | Self::ViolinPlot
                | Self::KdePlot
        )
    }
}

impl std::fmt::Display for ChartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-specific presentation parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ChartParams {
    Points { alpha: f32, marker: Option<char> },
    Aggregate { statistic: String },
    Bins { bins: usize, alpha: f32 },
    Whiskers { iqr_factor: f64 },
    Density { grid_points: usize, cut: f64 },
    /// Computed over every numeric column, independent of the X/Y choice.
    Correlation {
        method: String,
        precision: usize,
        colormap: String,
    },
    Matrix { diagonal: String, grid_points: usize },
    Pie {
        max_categories: usize,
        label_format: String,
    },
}

/// Description of one requested visualization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x: Option<ColumnRef>,
    pub y: Option<ColumnRef>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub params: ChartParams,
}

impl ChartSpec {
    pub fn for_kind(kind: ChartKind, x: &ColumnRef, y: &ColumnRef, settings: &ChartSettings) -> Self {
        let density = ChartParams::Density {
            grid_points: settings.kde_grid_points,
            cut: super::stats::KDE_CUT,
        };
        let (title, x_label, y_label, params) = match kind {
            ChartKind::Scatter => (
                format!("{y} vs {x} - Scatter Plot"),
                Some(x.to_string()),
                Some(y.to_string()),
                ChartParams::Points {
                    alpha: settings.point_alpha,
                    marker: None,
                },
            ),
            ChartKind::Line => (
                format!("{y} vs {x} - Line Plot"),
                Some(x.to_string()),
                Some(y.to_string()),
                ChartParams::Points {
                    alpha: 1.0,
                    marker: Some('o'),
                },
            ),
            ChartKind::Bar => (
                format!("Average {y} by {x} - Bar Plot"),
                Some(x.to_string()),
                None,
                ChartParams::Aggregate {
                    statistic: "mean".to_owned(),
                },
            ),
            ChartKind::Histogram => (
                format!("Histogram of {y}"),
                None,
                Some("Frequency".to_owned()),
                ChartParams::Bins {
                    bins: settings.histogram_bins,
                    alpha: settings.point_alpha,
                },
            ),
            ChartKind::BoxPlot => (
                format!("Box Plot of {y} by {x}"),
                Some(x.to_string()),
                Some(y.to_string()),
                ChartParams::Whiskers {
                    iqr_factor: builders::WHISKER_IQR_FACTOR,
                },
            ),
            ChartKind::ViolinPlot => (
                format!("Violin Plot of {y} by {x}"),
                Some(x.to_string()),
                Some(y.to_string()),
                density,
            ),
            ChartKind::CorrelationHeatmap => (
                "Correlation Heatmap".to_owned(),
                None,
                None,
                ChartParams::Correlation {
                    method: "pearson".to_owned(),
                    precision: 2,
                    colormap: "coolwarm".to_owned(),
                },
            ),
            ChartKind::ScatterMatrix => (
                "Scatterplot Matrix".to_owned(),
                None,
                None,
                ChartParams::Matrix {
                    diagonal: "kde".to_owned(),
                    grid_points: settings.kde_grid_points,
                },
            ),
            ChartKind::PieChart => (
                format!("Distribution of {x}"),
                None,
                None,
                ChartParams::Pie {
                    max_categories: PIE_MAX_CATEGORIES,
                    label_format: "%1.1f%%".to_owned(),
                },
            ),
            ChartKind::KdePlot => (
                format!("KDE Plot of {y}"),
                Some(y.to_string()),
                Some("Density".to_owned()),
                density,
            ),
        };

        Self {
            kind,
            title,
            x: kind.uses_x().then(|| x.clone()),
            y: kind.uses_y().then(|| y.clone()),
            x_label,
            y_label,
            params,
        }
    }
}

/// One attempted chart: its spec and either the plotted data or the reason it failed.
#[derive(Debug, Serialize)]
pub struct ChartOutcome {
    pub spec: ChartSpec,
    pub result: Result<ChartArtifact>,
}

impl ChartOutcome {
    pub fn kind(&self) -> ChartKind {
        self.spec.kind
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug, Serialize)]
pub struct ChartBattery {
    pub x: ColumnRef,
    pub y: ColumnRef,
    pub outcomes: Vec<ChartOutcome>,
}

impl ChartBattery {
    pub fn outcome(&self, kind: ChartKind) -> Option<&ChartOutcome> {
        self.outcomes.iter().find(|o| o.kind() == kind)
    }

    pub fn attempted(&self) -> Vec<ChartKind> {
        self.outcomes.iter().map(ChartOutcome::kind).collect()
    }

    pub fn failed(&self) -> impl Iterator<Item = &ChartOutcome> {
        self.outcomes.iter().filter(|o| !o.is_ok())
    }
}

/// Result of the pie-chart cardinality check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PieGate {
    Open { distinct: usize },
    Closed { distinct: usize },
    /// X does not resolve; the chart is attempted so the selection error is reported.
    Unresolved,
}

/// Decides, before any rendering, whether the pie chart of `x` is attempted.
pub fn pie_gate(table: &Table, x: &ColumnRef) -> PieGate {
    let Ok((column, _)) = table.resolve(x) else {
        return PieGate::Unresolved;
    };
    match column.as_materialized_series().n_unique() {
        Ok(distinct) if distinct <= PIE_MAX_CATEGORIES => PieGate::Open { distinct },
        Ok(distinct) => PieGate::Closed { distinct },
        Err(e) => {
            tracing::debug!("Could not count distinct values of '{x}': {e}");
            PieGate::Unresolved
        }
    }
}

/// Builds the plotted data for a single chart kind.
///
/// # Errors
///
/// [`ExploreError::InvalidColumnSelection`] when a column the chart reads does
/// not resolve, [`ExploreError::ChartGeneration`] for anything else.
pub fn render_chart(
    table: &Table,
    kind: ChartKind,
    x: &ColumnRef,
    y: &ColumnRef,
    settings: &ChartSettings,
) -> Result<ChartArtifact> {
    match kind {
        ChartKind::Scatter | ChartKind::Line => builders::points(table, kind, x, y),
        ChartKind::Bar => builders::bar_means(table, x, y),
        ChartKind::Histogram => builders::histogram(table, y, settings.histogram_bins),
        ChartKind::BoxPlot => builders::boxes(table, x, y),
        ChartKind::ViolinPlot => builders::violins(table, x, y, settings.kde_grid_points),
        ChartKind::CorrelationHeatmap => builders::correlation(table),
        ChartKind::ScatterMatrix => builders::scatter_matrix(table, settings.kde_grid_points),
        ChartKind::PieChart => builders::pie(table, x),
        ChartKind::KdePlot => builders::kde(table, y, settings.kde_grid_points),
    }
}

/// Attempts the whole chart battery for the X/Y pair.
///
/// # Errors
///
/// Only [`ExploreError::InsufficientColumns`], when the table has fewer than
/// two columns. Per-chart failures are recorded in the returned outcomes.
pub fn render_battery(
    table: &Table,
    x: &ColumnRef,
    y: &ColumnRef,
    settings: &ChartSettings,
) -> Result<ChartBattery> {
    if table.width() < 2 {
        return Err(ExploreError::InsufficientColumns {
            found: table.width(),
        });
    }

    let mut outcomes = Vec::with_capacity(ChartKind::BATTERY.len());
    for kind in ChartKind::BATTERY {
        if kind == ChartKind::PieChart {
            let gate = pie_gate(table, x);
            tracing::debug!("Pie chart gate for '{x}': {gate:?}");
            if let PieGate::Closed { .. } = gate {
                continue;
            }
        }

        let spec = ChartSpec::for_kind(kind, x, y, settings);
        let result = render_chart(table, kind, x, y, settings);
        if let Err(e) = &result {
            tracing::warn!("{e}");
        }
        outcomes.push(ChartOutcome { spec, result });
    }

    let ok = outcomes.iter().filter(|o| o.is_ok()).count();
    tracing::info!(
        "Chart battery for x='{x}', y='{y}': {ok} of {} charts generated",
        outcomes.len()
    );

    Ok(ChartBattery {
        x: x.clone(),
        y: y.clone(),
        outcomes,
    })
}
