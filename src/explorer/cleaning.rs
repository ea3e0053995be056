//! Missing-value handling and duplicate removal.
//!
//! A [`CleaningDirective`] names one missing-value strategy and whether to
//! drop duplicates. Steps run in that order, each on a lazy frame built from
//! the previous snapshot, and each produces a brand new [`Table`]. The input
//! table is never touched.

use super::table::Table;
use crate::error::{ExploreError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// What to do about missing values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissingValueStrategy {
    #[default]
    NoOp,
    DropRowsWithMissing,
    FillMissingWithZero,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningDirective {
    pub missing: MissingValueStrategy,
    pub dedupe: bool,
}

impl CleaningDirective {
    pub fn is_noop(&self) -> bool {
        self.missing == MissingValueStrategy::NoOp && !self.dedupe
    }

    /// The steps this directive runs, in order.
    pub fn steps(&self) -> Vec<Box<dyn CleaningStep>> {
        let mut steps: Vec<Box<dyn CleaningStep>> = Vec::new();
        match self.missing {
            MissingValueStrategy::NoOp => {}
            MissingValueStrategy::DropRowsWithMissing => steps.push(Box::new(DropMissingStep)),
            MissingValueStrategy::FillMissingWithZero => steps.push(Box::new(FillZeroStep)),
        }
        if self.dedupe {
            steps.push(Box::new(DedupStep));
        }
        steps
    }
}

/// One table-to-table cleaning transformation.
pub trait CleaningStep {
    fn apply(&self, lf: LazyFrame) -> PolarsResult<LazyFrame>;

    fn name(&self) -> &'static str;

    /// Names the work in progress, for error messages ("removing duplicate rows").
    fn activity(&self) -> &'static str;

    /// Shown to the user once the step has run.
    fn message(&self) -> &'static str;
}

/// Removes every row with at least one missing value.
#[derive(Debug, Clone, Copy)]
pub struct DropMissingStep;

impl CleaningStep for DropMissingStep {
    fn apply(&self, lf: LazyFrame) -> PolarsResult<LazyFrame> {
        Ok(lf.drop_nulls(None))
    }

    fn name(&self) -> &'static str {
        "drop_rows_with_missing"
    }

    fn activity(&self) -> &'static str {
        "removing rows with missing values"
    }

    fn message(&self) -> &'static str {
        "Rows with missing values have been removed."
    }
}

/// Replaces every missing value with zero.
///
/// Numeric columns get a 0 of their own type. Every other column is turned
/// into text and gets the string `"0"`.
#[derive(Debug, Clone, Copy)]
pub struct FillZeroStep;

impl CleaningStep for FillZeroStep {
    fn apply(&self, mut lf: LazyFrame) -> PolarsResult<LazyFrame> {
        let schema = lf.collect_schema()?;
        let exprs: Vec<Expr> = schema
            .iter()
            .map(|(name, dtype)| {
                let expr = col(name.clone());
                if dtype.is_primitive_numeric() {
                    expr.fill_null(lit(0).cast(dtype.clone()))
                } else {
                    expr.cast(DataType::String).fill_null(lit("0"))
                }
            })
            .collect();
        Ok(lf.select(exprs))
    }

    fn name(&self) -> &'static str {
        "fill_missing_with_zero"
    }

    fn activity(&self) -> &'static str {
        "filling missing values with zeros"
    }

    fn message(&self) -> &'static str {
        "Missing values have been filled with zeros."
    }
}

/// Drops exact duplicate rows, keeping the first occurrence in place.
#[derive(Debug, Clone, Copy)]
pub struct DedupStep;

impl CleaningStep for DedupStep {
    fn apply(&self, lf: LazyFrame) -> PolarsResult<LazyFrame> {
        Ok(lf.unique_stable(None, UniqueKeepStrategy::First))
    }

    fn name(&self) -> &'static str {
        "remove_duplicates"
    }

    fn activity(&self) -> &'static str {
        "removing duplicate rows"
    }

    fn message(&self) -> &'static str {
        "Duplicate rows have been removed."
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    pub step: String,
    pub rows_before: usize,
    pub rows_after: usize,
    pub message: String,
}

impl StepReport {
    pub fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }
}

#[derive(Debug)]
pub struct CleaningOutcome {
    pub table: Table,
    pub steps: Vec<StepReport>,
}

/// Runs one step against a snapshot.
///
/// # Errors
///
/// Returns [`ExploreError::CleaningOperation`] naming the step.
pub fn run_step(table: &Table, step: &dyn CleaningStep) -> Result<(Table, StepReport)> {
    let fail = |e: PolarsError| ExploreError::CleaningOperation {
        step: step.activity().to_owned(),
        cause: e.to_string(),
    };

    let rows_before = table.height();
    let df = step
        .apply(table.frame().clone().lazy())
        .and_then(LazyFrame::collect)
        .map_err(fail)?;
    let cleaned = Table::from_frame(df);

    let report = StepReport {
        step: step.name().to_owned(),
        rows_before,
        rows_after: cleaned.height(),
        message: step.message().to_owned(),
    };
    tracing::info!(
        "{}: {} -> {} rows ({} removed)",
        report.step,
        report.rows_before,
        report.rows_after,
        report.rows_removed()
    );
    Ok((cleaned, report))
}

pub fn drop_rows_with_missing(table: &Table) -> Result<Table> {
    run_step(table, &DropMissingStep).map(|(t, _)| t)
}

pub fn fill_missing_with_zero(table: &Table) -> Result<Table> {
    run_step(table, &FillZeroStep).map(|(t, _)| t)
}

pub fn remove_duplicates(table: &Table) -> Result<Table> {
    run_step(table, &DedupStep).map(|(t, _)| t)
}

/// Applies the directive's steps in order.
///
/// # Errors
///
/// Stops at the first failing step and returns its error; the input table is
/// unaffected either way.
pub fn apply_directive(table: &Table, directive: &CleaningDirective) -> Result<CleaningOutcome> {
    if directive.is_noop() {
        tracing::debug!("No cleaning requested, keeping the current snapshot");
    }
    let mut current = table.clone();
    let mut steps = Vec::new();
    for step in directive.steps() {
        let (next, report) = run_step(&current, step.as_ref())?;
        current = next;
        steps.push(report);
    }
    Ok(CleaningOutcome {
        table: current,
        steps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explorer::table::{ColumnKind, numeric_values, text_values};

    fn people() -> anyhow::Result<Table> {
        Ok(Table::from_frame(df!(
            "name" => [Some("Ann"), Some("Bob"), None, Some("Ann")],
            "age" => [Some(30i64), None, Some(40), Some(30)],
        )?))
    }

    #[test]
    fn test_fill_with_zero_keeps_numeric_type() -> anyhow::Result<()> {
        let table = Table::from_frame(df!("age" => [Some(30i64), None, Some(40)])?);
        let filled = fill_missing_with_zero(&table)?;
        let (age, kind) = filled.resolve(&"age".into())?;
        assert_eq!(kind, ColumnKind::Numeric);
        assert_eq!(age.dtype(), &DataType::Int64);
        assert_eq!(numeric_values(age)?, vec![Some(30.0), Some(0.0), Some(40.0)]);
        Ok(())
    }

    #[test]
    fn test_fill_with_zero_writes_text_zero() -> anyhow::Result<()> {
        let filled = fill_missing_with_zero(&people()?)?;
        let (name, _) = filled.resolve(&"name".into())?;
        assert_eq!(
            text_values(name)?,
            vec![
                Some("Ann".to_owned()),
                Some("Bob".to_owned()),
                Some("0".to_owned()),
                Some("Ann".to_owned())
            ]
        );
        assert_eq!(filled.profile().columns.iter().map(|c| c.missing).sum::<usize>(), 0);
        Ok(())
    }

    #[test]
    fn test_drop_rows_is_idempotent() -> anyhow::Result<()> {
        let once = drop_rows_with_missing(&people()?)?;
        assert_eq!(once.height(), 2);
        let twice = drop_rows_with_missing(&once)?;
        assert!(once.same_contents(&twice));
        Ok(())
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() -> anyhow::Result<()> {
        let table = Table::from_frame(df!(
            "k" => ["a", "b", "a"],
            "v" => [1, 2, 1],
        )?);
        let deduped = remove_duplicates(&table)?;
        let expected = Table::from_frame(df!("k" => ["a", "b"], "v" => [1, 2])?);
        assert!(deduped.same_contents(&expected));
        assert!(remove_duplicates(&deduped)?.same_contents(&deduped));
        Ok(())
    }

    #[test]
    fn test_directive_runs_in_order() -> anyhow::Result<()> {
        let table = people()?;
        let directive = CleaningDirective {
            missing: MissingValueStrategy::FillMissingWithZero,
            dedupe: true,
        };
        let outcome = apply_directive(&table, &directive)?;

        let names: Vec<&str> = outcome.steps.iter().map(|s| s.step.as_str()).collect();
        assert_eq!(names, vec!["fill_missing_with_zero", "remove_duplicates"]);
        assert_eq!(outcome.steps[1].rows_removed(), 1);
        assert_eq!(outcome.table.height(), 3);
        assert_eq!(table.height(), 4, "input snapshot is unchanged");
        Ok(())
    }

    #[test]
    fn test_noop_directive() -> anyhow::Result<()> {
        let table = people()?;
        let directive = CleaningDirective::default();
        assert!(directive.is_noop());
        let outcome = apply_directive(&table, &directive)?;
        assert!(outcome.steps.is_empty());
        assert!(outcome.table.same_contents(&table));
        Ok(())
    }
}
