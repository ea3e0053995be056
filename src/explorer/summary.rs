//! Descriptive statistics per column.
//!
//! Numeric columns report count, mean, standard deviation, min, quartiles and
//! max. Every other column reports count, number of distinct values and the
//! most frequent value. Missing values are excluded everywhere and counted
//! separately. A column whose statistics cannot be computed gets its own
//! error; the other columns are unaffected.

use super::table::{ColumnKind, Table, text_values};
use crate::error::{ExploreError, Result};
use polars::prelude::*;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation; `None` below two values.
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TopValue {
    pub value: String,
    pub freq: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum ColumnSummary {
    Numeric(NumericSummary),
    Categorical {
        count: usize,
        unique: usize,
        /// Most frequent value; ties go to the value seen first.
        top: Option<TopValue>,
    },
}

#[derive(Debug, Serialize)]
pub struct ColumnReport {
    pub name: String,
    pub kind: ColumnKind,
    pub missing: usize,
    pub summary: Result<ColumnSummary>,
}

#[derive(Debug, Serialize)]
pub struct SummaryReport {
    pub rows: usize,
    pub columns: usize,
    pub sections: Vec<ColumnReport>,
}

impl SummaryReport {
    pub fn section(&self, name: &str) -> Option<&ColumnReport> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ColumnReport> {
        self.sections.iter().filter(|s| s.summary.is_err())
    }

    pub fn total_missing(&self) -> usize {
        self.sections.iter().map(|s| s.missing).sum()
    }
}

fn stat_error(name: &str, cause: impl std::fmt::Display) -> ExploreError {
    ExploreError::StatisticsComputation {
        column: name.to_owned(),
        cause: cause.to_string(),
    }
}

fn check_finite(name: &str, label: &str, value: Option<f64>) -> Result<Option<f64>> {
    match value {
        Some(v) if !v.is_finite() => Err(stat_error(
            name,
            format!("{label} is not a finite number ({v})"),
        )),
        other => Ok(other),
    }
}

pub fn summarize_numeric(name: &str, column: &Column) -> Result<NumericSummary> {
    let series = column
        .as_materialized_series()
        .cast(&DataType::Float64)
        .map_err(|e| stat_error(name, e))?;
    let ca = series.f64().map_err(|e| stat_error(name, e))?;

    let quantile = |q: f64| {
        ca.quantile(q, QuantileMethod::Linear)
            .map_err(|e| stat_error(name, e))
    };

    Ok(NumericSummary {
        count: ca.len() - ca.null_count(),
        mean: check_finite(name, "mean", ca.mean())?,
        std: check_finite(name, "standard deviation", ca.std(1))?,
        min: ca.min(),
        q25: quantile(0.25)?,
        median: quantile(0.5)?,
        q75: quantile(0.75)?,
        max: ca.max(),
    })
}

pub fn summarize_categorical(name: &str, column: &Column) -> Result<ColumnSummary> {
    let values = text_values(column).map_err(|e| stat_error(name, e))?;

    let mut order: Vec<String> = Vec::new();
    let mut freq: HashMap<String, usize> = HashMap::new();
    for value in values.into_iter().flatten() {
        let count = freq.entry(value.clone()).or_insert(0);
        if *count == 0 {
            order.push(value);
        }
        *count += 1;
    }

    let count = freq.values().sum();
    let mut top: Option<TopValue> = None;
    for value in &order {
        let n = freq.get(value).copied().unwrap_or(0);
        if top.as_ref().is_none_or(|t| n > t.freq) {
            top = Some(TopValue {
                value: value.clone(),
                freq: n,
            });
        }
    }

    Ok(ColumnSummary::Categorical {
        count,
        unique: order.len(),
        top,
    })
}

/// Summary statistics for every column of the table.
pub fn summarize(table: &Table) -> SummaryReport {
    let sections = table
        .frame()
        .get_columns()
        .iter()
        .map(|column| {
            let name = column.name().to_string();
            let kind = ColumnKind::of(column);
            let summary = match kind {
                ColumnKind::Numeric => summarize_numeric(&name, column).map(ColumnSummary::Numeric),
                ColumnKind::Categorical | ColumnKind::Unknown => {
                    summarize_categorical(&name, column)
                }
            };
            if let Err(e) = &summary {
                tracing::warn!("{e}");
            }
            ColumnReport {
                name,
                kind,
                missing: column.null_count(),
                summary,
            }
        })
        .collect();

    let report = SummaryReport {
        rows: table.height(),
        columns: table.width(),
        sections,
    };
    tracing::debug!(
        "Summarized {} columns ({} missing values), {} failed",
        report.columns,
        report.total_missing(),
        report.failures().count()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeric(report: &SummaryReport, name: &str) -> NumericSummary {
        match report.section(name).map(|s| &s.summary) {
            Some(Ok(ColumnSummary::Numeric(n))) => n.clone(),
            other => panic!("expected numeric summary for {name}, got {other:?}"),
        }
    }

    #[test]
    fn test_numeric_summary() -> anyhow::Result<()> {
        let table = Table::from_frame(df!(
            "age" => [Some(20.0), Some(30.0), None, Some(40.0), Some(50.0)],
        )?);
        let report = summarize(&table);
        let age = numeric(&report, "age");

        assert_eq!(age.count, 4);
        assert_eq!(age.mean, Some(35.0));
        assert_eq!(age.min, Some(20.0));
        assert_eq!(age.q25, Some(27.5));
        assert_eq!(age.median, Some(35.0));
        assert_eq!(age.q75, Some(42.5));
        assert_eq!(age.max, Some(50.0));
        let std = age.std.expect("four values");
        assert!((std - 12.909_944_487_358_056).abs() < 1e-9, "std was {std}");
        assert_eq!(report.section("age").map(|s| s.missing), Some(1));
        Ok(())
    }

    #[test]
    fn test_categorical_summary() -> anyhow::Result<()> {
        let table = Table::from_frame(df!(
            "city" => [Some("SYD"), Some("MEL"), Some("MEL"), None, Some("SYD"), Some("BNE")],
        )?);
        let report = summarize(&table);
        let city = report.section("city").expect("present");
        assert_eq!(city.kind, ColumnKind::Categorical);
        assert_eq!(
            city.summary.as_ref().ok(),
            Some(&ColumnSummary::Categorical {
                count: 5,
                unique: 3,
                top: Some(TopValue {
                    value: "SYD".to_owned(),
                    freq: 2,
                }),
            })
        );
        Ok(())
    }

    #[test]
    fn test_failing_column_is_isolated() -> anyhow::Result<()> {
        let table = Table::from_frame(df!(
            "broken" => [1.0, f64::INFINITY, 3.0],
            "fine" => [1.0, 2.0, 3.0],
        )?);
        let report = summarize(&table);

        let broken = report.section("broken").expect("present");
        assert!(matches!(
            broken.summary,
            Err(ExploreError::StatisticsComputation { ref column, .. }) if column == "broken"
        ));
        assert_eq!(numeric(&report, "fine").mean, Some(2.0));
        assert_eq!(report.failures().count(), 1);
        Ok(())
    }

    #[test]
    fn test_all_missing_column() -> anyhow::Result<()> {
        let table = Table::from_frame(df!(
            "empty" => [None::<&str>, None],
            "n" => [1, 2],
        )?);
        let report = summarize(&table);
        let empty = report.section("empty").expect("present");
        assert_eq!(empty.kind, ColumnKind::Unknown);
        assert_eq!(empty.missing, 2);
        assert_eq!(
            empty.summary.as_ref().ok(),
            Some(&ColumnSummary::Categorical {
                count: 0,
                unique: 0,
                top: None,
            })
        );
        assert_eq!(report.total_missing(), 2);
        Ok(())
    }
}
