//! # Tablescope
//!
//! Load a CSV upload into memory, describe it, chart any two of its columns,
//! clean it and hand it back as CSV.
//!
//! ## Quick Start
//!
//! ```
//! use tablescope::config::ExplorerConfig;
//! use tablescope::explorer::{SessionRequest, run_session};
//!
//! let csv = b"city,sales\nSYD,10\nMEL,20\nSYD,15\n";
//! let report = run_session(csv, &SessionRequest::default(), &ExplorerConfig::default());
//! assert!(report.loaded());
//! assert!(report.export.is_some());
//! ```
//!
//! ## Core Modules
//!
//! - [`explorer`]: the pipeline stages and the session that drives them
//!   - [`explorer::validate`]: bytes to [`explorer::Table`]
//!   - [`explorer::summary`]: descriptive statistics per column
//!   - [`explorer::charts`]: chart selection and plotted data
//!   - [`explorer::cleaning`]: missing values and duplicates
//!   - [`explorer::export`]: CSV encoding for download
//! - [`error`]: the error taxonomy shared by every stage
//! - [`config`]: reader, chart and logging settings
//! - [`logging`]: subscriber setup for the binary
//!
//! ## Fault isolation
//!
//! Only a rejected upload stops the pipeline. Everything after it reports its
//! own `Result`, and inside the chart battery every chart kind does too:
//!
//! ```
//! use tablescope::config::ChartSettings;
//! use tablescope::explorer::{ChartKind, Session};
//!
//! # fn main() -> Result<(), tablescope::error::ExploreError> {
//! let session = Session::open(b"team,score\nA,1\nB,3\nA,2\n", &Default::default())?;
//! let charts = session.visualize(&"team".into(), &"score".into(), &ChartSettings::default())?;
//!
//! // one numeric column: no correlation heatmap, everything else still renders
//! assert!(!charts.outcome(ChartKind::CorrelationHeatmap).is_some_and(|o| o.is_ok()));
//! assert!(charts.outcome(ChartKind::Bar).is_some_and(|o| o.is_ok()));
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all, rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod explorer;
pub mod logging;
