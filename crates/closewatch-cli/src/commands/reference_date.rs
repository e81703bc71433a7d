use closewatch_core::{ReconcileConfig, ReferenceDate, ValidationError};
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::cli::ReferenceDateArgs;
use crate::error::CliError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceDateReport {
    /// Evaluated instant in exchange-local time, RFC 3339.
    pub at: String,
    pub in_session: bool,
    pub reference_date: ReferenceDate,
}

pub fn run(args: &ReferenceDateArgs, config: &ReconcileConfig) -> Result<ReferenceDateReport, CliError> {
    let now = match &args.at {
        Some(raw) => parse_instant(raw)?,
        None => OffsetDateTime::now_utc(),
    };
    report_at(now, config)
}

fn report_at(now: OffsetDateTime, config: &ReconcileConfig) -> Result<ReferenceDateReport, CliError> {
    let calendar = config.calendar()?;
    let local = now.to_offset(calendar.utc_offset());

    Ok(ReferenceDateReport {
        at: local.format(&Rfc3339)?,
        in_session: calendar.is_in_session(now),
        reference_date: calendar.reference_date(now),
    })
}

fn parse_instant(raw: &str) -> Result<OffsetDateTime, ValidationError> {
    OffsetDateTime::parse(raw.trim(), &Rfc3339).map_err(|_| ValidationError::InvalidTimestamp {
        value: raw.to_owned(),
    })
}
