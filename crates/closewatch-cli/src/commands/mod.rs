mod reconcile;
mod reference_date;

use closewatch_core::{ReconcileConfig, ReconciliationRun};
use serde::Serialize;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub use reference_date::ReferenceDateReport;

/// Output of one command, rendered by [`crate::output`].
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Report {
    Run(ReconciliationRun),
    ReferenceDate(ReferenceDateReport),
}

impl Report {
    pub fn failed_count(&self) -> usize {
        match self {
            Self::Run(run) => run.errors.len(),
            Self::ReferenceDate(_) => 0,
        }
    }
}

pub async fn run(cli: &Cli) -> Result<Report, CliError> {
    let config = load_config(cli)?;

    match &cli.command {
        Command::Reconcile(args) => reconcile::run(args, config).await.map(Report::Run),
        Command::ReferenceDate(args) => reference_date::run(args, &config).map(Report::ReferenceDate),
    }
}

/// Defaults, then `--config`, then `CLOSEWATCH_*` environment variables.
fn load_config(cli: &Cli) -> Result<ReconcileConfig, CliError> {
    let config = match &cli.config {
        Some(path) => ReconcileConfig::from_json_file(path).map_err(CliError::Config)?,
        None => ReconcileConfig::default(),
    };
    Ok(config.with_env_overrides()?)
}
