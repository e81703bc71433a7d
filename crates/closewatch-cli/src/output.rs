use std::fmt::Write as _;

use closewatch_core::{PriceResult, ReconciliationRun};

use crate::cli::OutputFormat;
use crate::commands::{ReferenceDateReport, Report};
use crate::error::CliError;

pub fn render(report: &Report, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(report)?
            } else {
                serde_json::to_string(report)?
            };
            println!("{payload}");
        }
        OutputFormat::Table => print!("{}", render_table(report)),
    }

    Ok(())
}

fn render_table(report: &Report) -> String {
    match report {
        Report::Run(run) => run_table(run),
        Report::ReferenceDate(report) => reference_date_table(report),
    }
}

fn reference_date_table(report: &ReferenceDateReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "at            : {}", report.at);
    let _ = writeln!(out, "in_session    : {}", report.in_session);
    let _ = writeln!(out, "reference_date: {}", report.reference_date);
    out
}

fn run_table(run: &ReconciliationRun) -> String {
    let summary = run.summary();
    let mut out = String::new();

    let _ = writeln!(out, "run_id        : {}", run.run_id);
    let _ = writeln!(out, "reference_date: {}", run.reference_date);
    let _ = writeln!(
        out,
        "summary       : total={} succeeded={} failed={} batches={} pauses={}",
        summary.total, summary.succeeded, summary.failed, summary.batches, summary.pauses
    );
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{:<8} {:>10} {:<10} {:>8} {:>8} {:>8} {:>8} {:>8}",
        "CODE", "PRICE", "DATE", "1D%", "7D%", "14D%", "30D%", "180D%"
    );

    for (code, result) in &run.results {
        let _ = writeln!(out, "{}", result_row(code, result));
    }

    if !run.errors.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "errors:");
        for error in &run.errors {
            let _ = writeln!(out, "  - {} {} ({}): {}", error.code, error.name, error.ticker, error.error);
        }
    }

    out
}

fn result_row(code: &str, result: &PriceResult) -> String {
    let price = result
        .price
        .map(|p| format!("{p:.1}"))
        .unwrap_or_else(|| String::from("-"));
    let date = result.actual_date.as_deref().unwrap_or("-");

    format!(
        "{:<8} {:>10} {:<10} {:>8} {:>8} {:>8} {:>8} {:>8}",
        code,
        price,
        date,
        percent(result.change_1d),
        percent(result.change_7d),
        percent(result.change_14d),
        percent(result.change_30d),
        percent(result.change_180d),
    )
}

fn percent(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:+.2}"))
        .unwrap_or_else(|| String::from("-"))
}
