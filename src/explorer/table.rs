//! The in-memory table snapshot shared by every stage.
//!
//! A [`Table`] wraps a polars `DataFrame` together with the semantic kind of
//! each column. Tables are never mutated in place: cleaning produces a new
//! `Table`, and because polars columns are reference counted, holding on to an
//! older snapshot costs nothing.

use crate::error::{ExploreError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Semantic type of a column, inferred once per snapshot.
#[derive(Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Debug, Hash)]
pub enum ColumnKind {
    /// Every non-missing value parsed as a number.
    Numeric,
    /// Text, booleans, or anything else with at least one value.
    Categorical,
    /// No value to infer from (all missing).
    Unknown,
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "Numeric",
            Self::Categorical => "Categorical",
            Self::Unknown => "Unknown",
        }
    }

    pub fn of(column: &Column) -> Self {
        if column.dtype().is_primitive_numeric() {
            Self::Numeric
        } else if column.null_count() == column.len() {
            Self::Unknown
        } else {
            Self::Categorical
        }
    }
}

/// A column selected by name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnRef(String);

impl ColumnRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ColumnRef {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ColumnRef {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl std::fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub kind: ColumnKind,
    pub missing: usize,
}

/// Shape and column listing, handed to the display layer after upload.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableProfile {
    pub rows: usize,
    pub columns: Vec<ColumnInfo>,
}

/// The first rows of a table as text, ready for display.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TablePreview {
    pub columns: Vec<String>,
    /// Row-major cells; `None` is a missing value.
    pub rows: Vec<Vec<Option<String>>>,
}

#[derive(Clone, Debug)]
pub struct Table {
    df: DataFrame,
    kinds: Vec<ColumnKind>,
}

impl Table {
    /// Wraps a frame, inferring the kind of every column.
    pub fn from_frame(df: DataFrame) -> Self {
        let kinds = df.get_columns().iter().map(ColumnKind::of).collect();
        Self { df, kinds }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn width(&self) -> usize {
        self.df.width()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.df
            .get_columns()
            .iter()
            .position(|c| c.name().as_str() == name)
    }

    pub fn kind_of(&self, name: &str) -> Option<ColumnKind> {
        self.position(name)
            .and_then(|idx| self.kinds.get(idx).copied())
    }

    /// Looks a column up by reference.
    ///
    /// # Errors
    ///
    /// Returns [`ExploreError::InvalidColumnSelection`] when the name is not
    /// part of this snapshot.
    pub fn resolve(&self, column: &ColumnRef) -> Result<(&Column, ColumnKind)> {
        let invalid = || ExploreError::InvalidColumnSelection {
            column: column.name().to_owned(),
        };
        let idx = self.position(column.name()).ok_or_else(invalid)?;
        let col = self.df.get_columns().get(idx).ok_or_else(invalid)?;
        let kind = self.kinds.get(idx).copied().ok_or_else(invalid)?;
        Ok((col, kind))
    }

    /// Names of every numeric column, in table order.
    pub fn numeric_columns(&self) -> Vec<String> {
        self.df
            .get_columns()
            .iter()
            .zip(&self.kinds)
            .filter(|(_, kind)| **kind == ColumnKind::Numeric)
            .map(|(c, _)| c.name().to_string())
            .collect()
    }

    pub fn profile(&self) -> TableProfile {
        TableProfile {
            rows: self.height(),
            columns: self
                .df
                .get_columns()
                .iter()
                .zip(&self.kinds)
                .map(|(c, kind)| ColumnInfo {
                    name: c.name().to_string(),
                    kind: *kind,
                    missing: c.null_count(),
                })
                .collect(),
        }
    }

    /// First `rows` rows rendered as text, as shown right after upload.
    pub fn preview_text(&self, rows: usize) -> PolarsResult<TablePreview> {
        let head = self.df.head(Some(rows));
        let cells = head
            .get_columns()
            .iter()
            .map(text_values)
            .collect::<PolarsResult<Vec<_>>>()?;
        let rows = (0..head.height())
            .map(|i| {
                cells
                    .iter()
                    .map(|col| col.get(i).cloned().flatten())
                    .collect::<Vec<_>>()
            })
            .collect();
        Ok(TablePreview {
            columns: self.column_names(),
            rows,
        })
    }

    /// Cell-by-cell equality, treating two missing values as equal.
    pub fn same_contents(&self, other: &Self) -> bool {
        self.df.equals_missing(&other.df)
    }
}

/// Reads a column as floats; non-numeric values become `None`.
pub(crate) fn numeric_values(column: &Column) -> PolarsResult<Vec<Option<f64>>> {
    let series = column.as_materialized_series().cast(&DataType::Float64)?;
    Ok(series.f64()?.into_iter().collect())
}

/// Reads a column as text.
pub(crate) fn text_values(column: &Column) -> PolarsResult<Vec<Option<String>>> {
    let series = column.as_materialized_series().cast(&DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_owned))
        .collect())
}
