// src/normalize.rs
//
// Turns a batch of raw per-page field sets into a typed, ordered table.
// Column names are canonicalized to snake_case, booleans and dates coerced,
// and a `time_taken` day count derived against an explicit `today` so the
// whole batch is measured at one instant.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

use crate::extract::RawFieldSet;

/// Dates on ABP pages are day/month/year.
const DATE_FORMAT: &str = "%d/%m/%Y";

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("record {record}: missing required column `{column}`")]
    MissingColumn { record: String, column: &'static str },
    #[error("record {record}: column `{column}` has unparsable date {value:?}")]
    InvalidDate {
        record: String,
        column: &'static str,
        value: String,
    },
}

/// One normalized row of the project table.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectRecord {
    pub short_name: String,
    pub infrastructure_type: String,
    /// `short_name` with acronyms expanded to full project names.
    pub project_name: String,
    pub parties: Option<String>,
    pub eiar: bool,
    pub nis: bool,
    pub lodged: NaiveDate,
    pub make_railway_order_w_cons: Option<NaiveDate>,
    pub date_signed: Option<NaiveDate>,
    /// Days from lodgement to decision, or to `today` while pending.
    pub time_taken: i64,
    /// Any remaining columns, normalized but untyped. Absent columns are
    /// simply absent keys.
    pub extra: BTreeMap<String, String>,
}

/// Canonicalize a raw column label: lowercase, collapse runs of spaces, then
/// spaces to underscores. Total and idempotent.
pub fn normalize_column_name(raw: &str) -> String {
    let lower = raw.to_lowercase();
    let mut out = String::with_capacity(lower.len());
    let mut in_gap = false;
    for ch in lower.chars() {
        if ch == ' ' {
            if !in_gap {
                out.push('_');
            }
            in_gap = true;
        } else {
            out.push(ch);
            in_gap = false;
        }
    }
    out
}

/// Normalize a batch of raw field sets into the final project table, sorted
/// by `time_taken` descending (stable on ties).
///
/// Each field set must carry the caller-attached `short_name` and
/// `infrastructure_type` fields, plus a parsable `lodged` date; anything
/// else may be absent. `today` is evaluated once by the caller so pending
/// projects across the batch are measured against the same day.
pub fn normalize(
    raw: Vec<RawFieldSet>,
    acronyms: &BTreeMap<String, String>,
    today: NaiveDate,
) -> Result<Vec<ProjectRecord>, NormalizeError> {
    let mut table = Vec::with_capacity(raw.len());
    for (idx, fields) in raw.into_iter().enumerate() {
        table.push(normalize_record(idx, fields, acronyms, today)?);
    }
    // Stable, so equal day counts keep their input order.
    table.sort_by(|a, b| b.time_taken.cmp(&a.time_taken));
    Ok(table)
}

fn normalize_record(
    idx: usize,
    fields: RawFieldSet,
    acronyms: &BTreeMap<String, String>,
    today: NaiveDate,
) -> Result<ProjectRecord, NormalizeError> {
    let mut columns: BTreeMap<String, String> = fields
        .into_iter()
        .map(|(label, value)| (normalize_column_name(&label), value))
        .collect();

    let short_name = columns
        .remove("short_name")
        .ok_or_else(|| NormalizeError::MissingColumn {
            record: format!("#{}", idx),
            column: "short_name",
        })?;
    let record_id = format!("#{} ({})", idx, short_name);

    let infrastructure_type =
        columns
            .remove("infrastructure_type")
            .ok_or_else(|| NormalizeError::MissingColumn {
                record: record_id.clone(),
                column: "infrastructure_type",
            })?;

    let eiar = truthy(columns.remove("eiar"));
    let nis = truthy(columns.remove("nis"));

    let lodged_raw = columns
        .remove("lodged")
        .ok_or_else(|| NormalizeError::MissingColumn {
            record: record_id.clone(),
            column: "lodged",
        })?;
    let lodged = parse_date(&lodged_raw).ok_or_else(|| NormalizeError::InvalidDate {
        record: record_id.clone(),
        column: "lodged",
        value: lodged_raw,
    })?;

    // Decisions may still be pending, so these two stay nullable.
    let make_railway_order_w_cons = columns
        .remove("make_railway_order_w_cons")
        .and_then(|v| parse_date(&v));
    let date_signed = columns.remove("date_signed").and_then(|v| parse_date(&v));

    let parties = columns.remove("parties").map(|v| {
        v.trim_matches(|c| matches!(c, '\r' | '\n' | ' ' | '~'))
            .to_string()
    });

    let time_taken = (date_signed.unwrap_or(today) - lodged).num_days();
    let project_name = expand_acronyms(&short_name, acronyms);

    debug!(
        record = %record_id,
        days = time_taken,
        decided = date_signed.is_some(),
        "normalized record"
    );

    Ok(ProjectRecord {
        short_name,
        infrastructure_type,
        project_name,
        parties,
        eiar,
        nis,
        lodged,
        make_railway_order_w_cons,
        date_signed,
        time_taken,
        extra: columns,
    })
}

fn truthy(value: Option<String>) -> bool {
    value.map_or(false, |v| !v.is_empty())
}

/// Parse a `dd/mm/yyyy` date after stripping trailing CR/LF artifacts.
fn parse_date(value: &str) -> Option<NaiveDate> {
    let cleaned = value.trim_matches(|c| c == '\r' || c == '\n');
    NaiveDate::parse_from_str(cleaned, DATE_FORMAT).ok()
}

/// Replace every acronym occurring in `short_name` with its full name,
/// longest acronym first so a short acronym never clobbers part of a longer
/// one it is contained in.
fn expand_acronyms(short_name: &str, acronyms: &BTreeMap<String, String>) -> String {
    let mut keys: Vec<&String> = acronyms.keys().collect();
    keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    let mut name = short_name.to_string();
    for key in keys {
        name = name.replace(key.as_str(), &acronyms[key.as_str()]);
    }
    name
}
