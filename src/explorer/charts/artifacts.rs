//! Plotted data for each chart kind.
//!
//! The display layer owns drawing; these types carry everything it needs
//! (coordinates, bins, group statistics) and nothing about pixels.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// How an axis maps cell values onto coordinates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisScale {
    /// Values are used as-is.
    Numeric,
    /// Category `i` of `categories` is plotted at coordinate `i`.
    Categorical { categories: Vec<String> },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointSeries {
    pub x_scale: AxisScale,
    pub y_scale: AxisScale,
    /// Row order, rows missing either coordinate skipped.
    pub points: Vec<Point>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BarGroup {
    pub label: String,
    /// Mean of the present values; `None` when the group had none.
    pub value: Option<f64>,
    pub count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    /// `counts.len() + 1` bin edges.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_low: f64,
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoxGroup {
    pub label: String,
    pub count: usize,
    /// `None` when the group had no values.
    pub stats: Option<BoxStats>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DensityCurve {
    pub bandwidth: f64,
    pub points: Vec<Point>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViolinGroup {
    pub label: String,
    pub count: usize,
    /// Quartiles of the group (q1, median, q3), when it has values.
    pub quartiles: Option<(f64, f64, f64)>,
    /// Empty when the group has fewer than two values or no spread.
    pub density: Option<DensityCurve>,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major; `None` where the coefficient is undefined.
    pub data: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: &str, col: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == row)?;
        let j = self.columns.iter().position(|c| c == col)?;
        self.data.get(i)?.get(j).copied().flatten()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum MatrixPanel {
    /// Off-diagonal: row variable on y, column variable on x.
    Scatter(Vec<Point>),
    /// Diagonal: density of the variable, `None` when it has no spread.
    Density(Option<DensityCurve>),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatrixCell {
    pub row: String,
    pub col: String,
    pub panel: MatrixPanel,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScatterMatrix {
    pub columns: Vec<String>,
    /// Row-major, `columns.len()²` cells.
    pub cells: Vec<MatrixCell>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PieSlice {
    pub label: String,
    pub count: usize,
    pub fraction: f64,
    /// Percentage text, e.g. `"33.3%"`.
    pub percent_label: String,
}

/// Output of one successfully generated chart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ChartArtifact {
    Points(PointSeries),
    Bars(Vec<BarGroup>),
    Histogram(Histogram),
    Boxes(Vec<BoxGroup>),
    Violins(Vec<ViolinGroup>),
    Heatmap(CorrelationMatrix),
    Matrix(ScatterMatrix),
    Pie(Vec<PieSlice>),
    Density(DensityCurve),
}
