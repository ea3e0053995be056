use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tablescope::config::{ExplorerConfig, load_config};
use tablescope::explorer::{
    CleaningDirective, ColumnRef, EXPORT_FILE_NAME, MissingValueStrategy, Session, SessionRequest,
    run_session,
};

#[derive(Parser)]
#[command(name = "tablescope", about = "Explore, chart, clean and export a CSV dataset")]
pub struct Cli {
    /// Path to a JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Missing-value handling, as offered on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum MissingArg {
    /// Leave missing values alone
    None,
    /// Remove rows that contain any missing value
    Drop,
    /// Fill missing values with zero
    Zero,
}

impl From<MissingArg> for MissingValueStrategy {
    fn from(arg: MissingArg) -> Self {
        match arg {
            MissingArg::None => Self::NoOp,
            MissingArg::Drop => Self::DropRowsWithMissing,
            MissingArg::Zero => Self::FillMissingWithZero,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run every stage and print the full report as JSON
    Explore {
        /// CSV file to explore
        file: PathBuf,

        /// Column for the X axis. Defaults to the first column.
        #[arg(short, long)]
        x: Option<String>,

        /// Column for the Y axis. Defaults to the first column.
        #[arg(short, long)]
        y: Option<String>,

        /// How to handle missing values
        #[arg(long, value_enum, default_value_t = MissingArg::None)]
        missing: MissingArg,

        /// Remove duplicate rows after handling missing values
        #[arg(long)]
        dedupe: bool,

        /// Where to write the cleaned CSV
        #[arg(short, long, default_value = EXPORT_FILE_NAME)]
        output: PathBuf,
    },
    /// Print summary statistics as JSON
    Describe {
        /// CSV file to describe
        file: PathBuf,
    },
    /// Print the first rows as JSON
    Preview {
        /// CSV file to preview
        file: PathBuf,

        /// Number of rows. Defaults to `preview_rows` from the config.
        #[arg(short = 'n', long)]
        rows: Option<usize>,
    },
}

/// Loads the config file when given, otherwise the defaults.
pub fn resolve_config(path: Option<&Path>) -> Result<ExplorerConfig> {
    match path {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(ExplorerConfig::default()),
    }
}

fn read_input(file: &Path) -> Result<Vec<u8>> {
    std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}

pub fn run_command(command: Commands, config: &ExplorerConfig) -> Result<()> {
    match command {
        Commands::Explore {
            file,
            x,
            y,
            missing,
            dedupe,
            output,
        } => {
            let request = SessionRequest {
                x: x.map(ColumnRef::from),
                y: y.map(ColumnRef::from),
                directive: CleaningDirective {
                    missing: missing.into(),
                    dedupe,
                },
            };
            handle_explore(&file, &request, &output, config)
        }
        Commands::Describe { file } => {
            let session = Session::open(&read_input(&file)?, &config.reader)?;
            print_json(&session.summarize())
        }
        Commands::Preview { file, rows } => {
            let session = Session::open(&read_input(&file)?, &config.reader)?;
            print_json(&session.preview(rows.unwrap_or(config.preview_rows))?)
        }
    }
}

fn handle_explore(
    file: &Path,
    request: &SessionRequest,
    output: &Path,
    config: &ExplorerConfig,
) -> Result<()> {
    let input = read_input(file)?;
    let report = run_session(&input, request, config);
    print_json(&report)?;

    if let Err(e) = &report.profile {
        anyhow::bail!("{} was rejected: {e}", file.display());
    }

    if let Some(Ok(export)) = &report.export {
        std::fs::write(output, &export.bytes)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        tracing::info!("Wrote {} ({} bytes)", output.display(), export.size);
    }
    Ok(())
}
