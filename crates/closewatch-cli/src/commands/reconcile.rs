use closewatch_core::{
    dedup_by_code, orchestrator_from_config, Instrument, ReconcileConfig, ReconciliationRun,
    ReferenceDate,
};
use tracing::info;

use crate::cli::ReconcileArgs;
use crate::error::CliError;

pub async fn run(
    args: &ReconcileArgs,
    config: ReconcileConfig,
) -> Result<ReconciliationRun, CliError> {
    let config = apply_flags(config, args);
    let orchestrator = orchestrator_from_config(&config)?;
    let instruments = parse_instruments(&args.instruments);

    let progress = |completed: usize, total: usize, detail: &str| {
        info!(completed, total, detail, "progress");
    };

    let run = match &args.reference_date {
        Some(raw) => {
            let reference = ReferenceDate::parse(raw)?;
            orchestrator
                .run_for_date(reference, &instruments, &progress)
                .await?
        }
        None => orchestrator.run(&instruments, &progress).await?,
    };

    Ok(run)
}

fn apply_flags(mut config: ReconcileConfig, args: &ReconcileArgs) -> ReconcileConfig {
    if let Some(batch_size) = args.batch_size {
        config.batch_size = batch_size;
    }
    if let Some(batch_delay_ms) = args.batch_delay_ms {
        config.batch_delay_ms = batch_delay_ms;
    }
    if args.timeout_ms.is_some() {
        config.request_timeout_ms = args.timeout_ms;
    }
    config
}

/// `CODE` or `CODE=NAME`; the first occurrence of a code wins.
fn parse_instruments(raw: &[String]) -> Vec<Instrument> {
    let instruments = raw.iter().map(|entry| match entry.split_once('=') {
        Some((code, name)) => Instrument::from_code(code.trim(), name.trim()),
        None => Instrument::from_code(entry.trim(), ""),
    });
    dedup_by_code(instruments)
}
