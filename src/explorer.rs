//! The exploration pipeline: validate, summarize, chart, clean, export.
//!
//! Each stage lives in its own module and takes the current [`Table`]
//! snapshot by reference. [`session`] ties them together.

pub mod charts;
pub mod cleaning;
pub mod export;
pub mod session;
pub mod stats;
pub mod summary;
pub mod table;
pub mod validate;

pub use charts::{ChartBattery, ChartKind, ChartOutcome, ChartSpec, PIE_MAX_CATEGORIES, render_battery};
pub use cleaning::{CleaningDirective, MissingValueStrategy, StepReport, apply_directive};
pub use export::{EXPORT_FILE_NAME, EXPORT_MEDIA_TYPE, ExportArtifact, encode_csv};
pub use session::{Session, SessionReport, SessionRequest, run_session};
pub use summary::{ColumnSummary, SummaryReport, summarize};
pub use table::{ColumnKind, ColumnRef, Table, TablePreview, TableProfile};
pub use validate::validate_csv;
