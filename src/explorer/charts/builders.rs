use super::ChartKind;
use super::artifacts::{
    AxisScale, BarGroup, BoxGroup, BoxStats, ChartArtifact, CorrelationMatrix, DensityCurve,
    Histogram, MatrixCell, MatrixPanel, PieSlice, Point, PointSeries, ScatterMatrix, ViolinGroup,
};
use crate::error::{ExploreError, Result};
use crate::explorer::stats;
use crate::explorer::table::{ColumnKind, ColumnRef, Table, numeric_values, text_values};
use polars::prelude::*;
use std::collections::HashMap;

/// Whiskers reach the furthest value within this many IQRs of the box.
pub(super) const WHISKER_IQR_FACTOR: f64 = 1.5;

const GROUP_KEY: &str = "group";
const GROUP_MEAN: &str = "mean";
const GROUP_COUNT: &str = "count";
const GROUP_VALUES: &str = "values";

/// Values of one column mapped onto plot coordinates.
struct Axis {
    scale: AxisScale,
    values: Vec<Option<f64>>,
}

/// Values collected for one group of X.
struct Group {
    label: String,
    values: Vec<f64>,
}

/// Rows of a grouped frame, with X rendered as a label.
struct GroupedFrame {
    df: DataFrame,
    labels: Vec<String>,
}

fn present(values: &[Option<f64>]) -> Vec<f64> {
    values
        .iter()
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .collect()
}

fn require_numeric<'a>(table: &'a Table, chart: ChartKind, column: &ColumnRef) -> Result<&'a Column> {
    let (col, kind) = table.resolve(column)?;
    if kind != ColumnKind::Numeric {
        return Err(ExploreError::chart(
            chart,
            format!("column '{column}' is {kind}, a numeric column is required"),
        ));
    }
    Ok(col)
}

fn numeric_column(table: &Table, chart: ChartKind, column: &ColumnRef) -> Result<Vec<Option<f64>>> {
    let col = require_numeric(table, chart, column)?;
    numeric_values(col).map_err(|e| ExploreError::chart(chart, e))
}

fn axis(table: &Table, chart: ChartKind, column: &ColumnRef) -> Result<Axis> {
    let (col, kind) = table.resolve(column)?;
    if kind == ColumnKind::Numeric {
        let values = numeric_values(col).map_err(|e| ExploreError::chart(chart, e))?;
        return Ok(Axis {
            scale: AxisScale::Numeric,
            values,
        });
    }

    let text = text_values(col).map_err(|e| ExploreError::chart(chart, e))?;
    let mut categories: Vec<String> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut values = Vec::with_capacity(text.len());
    for cell in text {
        let Some(cell) = cell else {
            values.push(None);
            continue;
        };
        let idx = match index.get(&cell) {
            Some(idx) => *idx,
            None => {
                let idx = categories.len();
                index.insert(cell.clone(), idx);
                categories.push(cell);
                idx
            }
        };
        values.push(Some(idx as f64));
    }

    Ok(Axis {
        scale: AxisScale::Categorical { categories },
        values,
    })
}

/// Rows with a present X, grouped by X in first-appearance order.
///
/// Numeric keys are grouped as floats, anything else as text.
fn group_by_x(table: &Table, x: &ColumnRef) -> Result<(LazyGroupBy, bool)> {
    let (_, kind) = table.resolve(x)?;
    let numeric = kind == ColumnKind::Numeric;
    let key_type = if numeric {
        DataType::Float64
    } else {
        DataType::String
    };
    let by = table
        .frame()
        .clone()
        .lazy()
        .filter(col(x.name()).is_not_null())
        .group_by_stable([col(x.name()).cast(key_type).alias(GROUP_KEY)]);
    Ok((by, numeric))
}

fn group_labels(df: &DataFrame, numeric: bool) -> PolarsResult<Vec<String>> {
    let key = df.column(GROUP_KEY)?.as_materialized_series();
    let labels = if numeric {
        key.f64()?
            .into_iter()
            .map(|v| v.map(|v| v.to_string()).unwrap_or_default())
            .collect()
    } else {
        key.str()?
            .into_iter()
            .map(|v| v.unwrap_or_default().to_owned())
            .collect()
    };
    Ok(labels)
}

/// Aggregates each X group and renders the keys.
///
/// Groups keep first-appearance order unless `sort_keys` is set or X is
/// numeric, in which case they are ascending.
fn aggregate(
    table: &Table,
    chart: ChartKind,
    x: &ColumnRef,
    y: &ColumnRef,
    sort_keys: bool,
    aggs: Vec<Expr>,
) -> Result<GroupedFrame> {
    let (by, numeric) = group_by_x(table, x)?;
    require_numeric(table, chart, y)?;

    let mut lf = by.agg(aggs);
    if sort_keys || numeric {
        lf = lf.sort_by_exprs([col(GROUP_KEY)], SortMultipleOptions::default());
    }
    let df = lf.collect().map_err(|e| ExploreError::chart(chart, e))?;
    let labels = group_labels(&df, numeric).map_err(|e| ExploreError::chart(chart, e))?;
    Ok(GroupedFrame { df, labels })
}

fn no_pairs(chart: ChartKind, x: &ColumnRef, y: &ColumnRef) -> ExploreError {
    ExploreError::chart(
        chart,
        format!("no rows have values for both '{x}' and '{y}'"),
    )
}

/// Y values of every X group, missing and non-finite values dropped.
fn grouped(table: &Table, chart: ChartKind, x: &ColumnRef, y: &ColumnRef) -> Result<Vec<Group>> {
    let values = col(y.name())
        .cast(DataType::Float64)
        .drop_nulls()
        .alias(GROUP_VALUES);
    let grouped = aggregate(table, chart, x, y, false, vec![values])?;

    let lists = grouped
        .df
        .column(GROUP_VALUES)
        .and_then(|c| c.as_materialized_series().list().cloned())
        .map_err(|e| ExploreError::chart(chart, e))?;
    let groups: Vec<Group> = grouped
        .labels
        .into_iter()
        .zip(lists.into_iter())
        .map(|(label, values)| {
            let values: Vec<f64> = match values {
                Some(series) => series
                    .f64()
                    .map(|ca| ca.into_iter().flatten().filter(|v| v.is_finite()).collect())
                    .map_err(|e| ExploreError::chart(chart, e))?,
                None => Vec::new(),
            };
            Ok(Group { label, values })
        })
        .collect::<Result<_>>()?;

    if groups.iter().all(|g| g.values.is_empty()) {
        return Err(no_pairs(chart, x, y));
    }
    Ok(groups)
}

fn density(values: &[f64], grid_points: usize) -> Option<DensityCurve> {
    stats::gaussian_kde(values, grid_points).map(|(bandwidth, curve)| DensityCurve {
        bandwidth,
        points: curve.into_iter().map(Point::from).collect(),
    })
}

fn box_stats(values: &[f64]) -> Option<BoxStats> {
    let (q1, median, q3) = stats::quartiles(values)?;
    let iqr = q3 - q1;
    let low_fence = q1 - WHISKER_IQR_FACTOR * iqr;
    let high_fence = q3 + WHISKER_IQR_FACTOR * iqr;

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let (inside, outliers): (Vec<f64>, Vec<f64>) = sorted
        .into_iter()
        .partition(|v| (low_fence..=high_fence).contains(v));

    Some(BoxStats {
        q1,
        median,
        q3,
        whisker_low: inside.first().copied().unwrap_or(q1),
        whisker_high: inside.last().copied().unwrap_or(q3),
        outliers,
    })
}

/// Scatter and line plots: one point per row with both coordinates present.
pub(super) fn points(
    table: &Table,
    chart: ChartKind,
    x: &ColumnRef,
    y: &ColumnRef,
) -> Result<ChartArtifact> {
    let x_axis = axis(table, chart, x)?;
    let y_axis = axis(table, chart, y)?;
    let points = x_axis
        .values
        .iter()
        .zip(&y_axis.values)
        .filter_map(|(x, y)| Some(Point { x: (*x)?, y: (*y)? }))
        .filter(|p| p.x.is_finite() && p.y.is_finite())
        .collect();

    Ok(ChartArtifact::Points(PointSeries {
        x_scale: x_axis.scale,
        y_scale: y_axis.scale,
        points,
    }))
}

/// Mean of Y per distinct X, groups in ascending key order.
pub(super) fn bar_means(table: &Table, x: &ColumnRef, y: &ColumnRef) -> Result<ChartArtifact> {
    let chart = ChartKind::Bar;
    let values = col(y.name()).cast(DataType::Float64);
    let grouped = aggregate(
        table,
        chart,
        x,
        y,
        true,
        vec![
            values.clone().mean().alias(GROUP_MEAN),
            values.count().cast(DataType::UInt64).alias(GROUP_COUNT),
        ],
    )?;

    let fail = |e: PolarsError| ExploreError::chart(chart, e);
    let means = grouped
        .df
        .column(GROUP_MEAN)
        .and_then(|c| c.as_materialized_series().f64().cloned())
        .map_err(fail)?;
    let counts = grouped
        .df
        .column(GROUP_COUNT)
        .and_then(|c| c.as_materialized_series().u64().cloned())
        .map_err(fail)?;
    if means.null_count() == means.len() {
        return Err(no_pairs(chart, x, y));
    }

    Ok(ChartArtifact::Bars(
        grouped
            .labels
            .into_iter()
            .zip(means.into_iter().zip(counts.into_iter()))
            .map(|(label, (value, count))| BarGroup {
                label,
                value,
                count: usize::try_from(count.unwrap_or(0)).unwrap_or(usize::MAX),
            })
            .collect(),
    ))
}

pub(super) fn histogram(table: &Table, y: &ColumnRef, bins: usize) -> Result<ChartArtifact> {
    let values = present(&numeric_column(table, ChartKind::Histogram, y)?);
    let (edges, counts) = stats::histogram(&values, bins).ok_or_else(|| {
        ExploreError::chart(ChartKind::Histogram, format!("column '{y}' has no values to plot"))
    })?;
    Ok(ChartArtifact::Histogram(Histogram { edges, counts }))
}

pub(super) fn boxes(table: &Table, x: &ColumnRef, y: &ColumnRef) -> Result<ChartArtifact> {
    let groups = grouped(table, ChartKind::BoxPlot, x, y)?;
    Ok(ChartArtifact::Boxes(
        groups
            .into_iter()
            .map(|g| BoxGroup {
                label: g.label,
                count: g.values.len(),
                stats: box_stats(&g.values),
            })
            .collect(),
    ))
}

pub(super) fn violins(
    table: &Table,
    x: &ColumnRef,
    y: &ColumnRef,
    grid_points: usize,
) -> Result<ChartArtifact> {
    let groups = grouped(table, ChartKind::ViolinPlot, x, y)?;
    Ok(ChartArtifact::Violins(
        groups
            .into_iter()
            .map(|g| ViolinGroup {
                label: g.label,
                count: g.values.len(),
                quartiles: stats::quartiles(&g.values),
                density: density(&g.values, grid_points),
            })
            .collect(),
    ))
}

/// Pairwise Pearson correlation across every numeric column of the table.
pub(super) fn correlation(table: &Table) -> Result<ChartArtifact> {
    let chart = ChartKind::CorrelationHeatmap;
    let columns = table.numeric_columns();
    if columns.len() < 2 {
        return Err(ExploreError::chart(
            chart,
            format!(
                "at least two numeric columns are required, found {}",
                columns.len()
            ),
        ));
    }

    let values = columns
        .iter()
        .map(|name| numeric_column(table, chart, &ColumnRef::new(name.as_str())))
        .collect::<Result<Vec<_>>>()?;

    let data = values
        .iter()
        .map(|row| {
            values
                .iter()
                .map(|col| stats::pearson(row, col))
                .collect::<Vec<_>>()
        })
        .collect();

    Ok(ChartArtifact::Heatmap(CorrelationMatrix { columns, data }))
}

/// Pairwise scatter panels over the numeric columns, KDE on the diagonal.
pub(super) fn scatter_matrix(table: &Table, grid_points: usize) -> Result<ChartArtifact> {
    let chart = ChartKind::ScatterMatrix;
    let columns = table.numeric_columns();
    if columns.is_empty() {
        return Err(ExploreError::chart(chart, "the table has no numeric columns"));
    }

    let values = columns
        .iter()
        .map(|name| numeric_column(table, chart, &ColumnRef::new(name.as_str())))
        .collect::<Result<Vec<_>>>()?;

    let mut cells = Vec::with_capacity(columns.len() * columns.len());
    for (row, row_values) in columns.iter().zip(&values) {
        for (col, col_values) in columns.iter().zip(&values) {
            let panel = if row == col {
                MatrixPanel::Density(density(&present(row_values), grid_points))
            } else {
                MatrixPanel::Scatter(
                    col_values
                        .iter()
                        .zip(row_values)
                        .filter_map(|(x, y)| Some(Point { x: (*x)?, y: (*y)? }))
                        .filter(|p| p.x.is_finite() && p.y.is_finite())
                        .collect(),
                )
            };
            cells.push(MatrixCell {
                row: row.clone(),
                col: col.clone(),
                panel,
            });
        }
    }

    Ok(ChartArtifact::Matrix(ScatterMatrix { columns, cells }))
}

/// Share of each distinct X value, largest first.
pub(super) fn pie(table: &Table, x: &ColumnRef) -> Result<ChartArtifact> {
    let chart = ChartKind::PieChart;
    let fail = |e: PolarsError| ExploreError::chart(chart, e);
    let (by, numeric) = group_by_x(table, x)?;

    // ties keep first-appearance order
    let df = by
        .agg([len().cast(DataType::UInt64).alias(GROUP_COUNT)])
        .sort_by_exprs(
            [col(GROUP_COUNT)],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_maintain_order(true),
        )
        .collect()
        .map_err(fail)?;
    let labels = group_labels(&df, numeric).map_err(fail)?;
    let counts: Vec<usize> = df
        .column(GROUP_COUNT)
        .and_then(|c| c.as_materialized_series().u64().cloned())
        .map_err(fail)?
        .into_iter()
        .map(|c| usize::try_from(c.unwrap_or(0)).unwrap_or(usize::MAX))
        .collect();

    let total: usize = counts.iter().sum();
    if total == 0 {
        return Err(ExploreError::chart(
            chart,
            format!("column '{x}' has no values to plot"),
        ));
    }

    Ok(ChartArtifact::Pie(
        labels
            .into_iter()
            .zip(counts)
            .map(|(label, count)| {
                let fraction = count as f64 / total as f64;
                PieSlice {
                    label,
                    count,
                    fraction,
                    percent_label: format!("{:.1}%", fraction * 100.0),
                }
            })
            .collect(),
    ))
}

pub(super) fn kde(table: &Table, y: &ColumnRef, grid_points: usize) -> Result<ChartArtifact> {
    let chart = ChartKind::KdePlot;
    let values = present(&numeric_column(table, chart, y)?);
    if values.len() < 2 {
        return Err(ExploreError::chart(
            chart,
            format!("column '{y}' needs at least two values for a density estimate"),
        ));
    }
    let curve = density(&values, grid_points).ok_or_else(|| {
        ExploreError::chart(chart, format!("values in '{y}' have no spread"))
    })?;
    Ok(ChartArtifact::Density(curve))
}
