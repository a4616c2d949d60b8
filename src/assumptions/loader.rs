//! CSV-based rate and schedule loaders
//!
//! Two formats are supported:
//!
//! - **Rate tables**: a headed CSV with an age column and one column per
//!   gender (`age,male,female`; the insurer's `年齡,男性,女性` headers are
//!   accepted as well). A missing gender column is allowed at load time and
//!   reported when that gender is looked up.
//!
//! - **PDATA**: the insurer's headerless policy-data export, located by
//!   marker cells and fixed column positions. See [`PdataLayout`] for the
//!   expected layout.

use super::{GuaranteedSchedule, RateTable, ScheduleSet};
use crate::error::{ProjectionError, Result};
use crate::policy::Gender;
use csv::{ReaderBuilder, StringRecord};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const AGE_HEADERS: &[&str] = &["age", "年齡", "年龄"];
const MALE_HEADERS: &[&str] = &["male", "m", "男性", "男"];
const FEMALE_HEADERS: &[&str] = &["female", "f", "女性", "女"];

fn find_column(headers: &StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
}

/// Parse a number, tolerating thousands separators and surrounding spaces
fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

/// Parse an integral field that may have been exported as a float ("31.0")
fn parse_integer(raw: &str) -> Option<i64> {
    let value = parse_number(raw)?;
    if value.fract() == 0.0 {
        Some(value as i64)
    } else {
        None
    }
}

fn parse_age(raw: &str) -> Option<u8> {
    parse_integer(raw).and_then(|v| u8::try_from(v).ok())
}

/// Load a rate table from a CSV file
pub fn load_rate_table<P: AsRef<Path>>(path: P) -> Result<RateTable> {
    let file = File::open(path)?;
    load_rate_table_from_reader(file)
}

/// Load a rate table from any reader
pub fn load_rate_table_from_reader<R: Read>(reader: R) -> Result<RateTable> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = reader.headers()?.clone();

    let age_col = find_column(&headers, AGE_HEADERS).ok_or_else(|| {
        ProjectionError::Configuration("rate table has no age column".to_string())
    })?;
    let male_col = find_column(&headers, MALE_HEADERS);
    let female_col = find_column(&headers, FEMALE_HEADERS);

    let mut ages = Vec::new();
    let mut male = Vec::new();
    let mut female = Vec::new();

    for (line, result) in reader.records().enumerate() {
        let record = result?;
        let field = |col: usize| record.get(col).unwrap_or("");
        let strict = |col: usize, what: &str| -> Result<f64> {
            parse_number(field(col)).ok_or_else(|| ProjectionError::Parse {
                context: format!("rate table row {} ({})", line + 2, what),
                value: field(col).to_string(),
            })
        };

        let age = parse_age(field(age_col)).ok_or_else(|| ProjectionError::Parse {
            context: format!("rate table row {} (age)", line + 2),
            value: field(age_col).to_string(),
        })?;
        ages.push(age);
        if let Some(col) = male_col {
            male.push(strict(col, "male")?);
        }
        if let Some(col) = female_col {
            female.push(strict(col, "female")?);
        }
    }

    log::info!(
        "Loaded rate table: {} ages (male column: {}, female column: {})",
        ages.len(),
        male_col.is_some(),
        female_col.is_some()
    );

    RateTable::from_columns(
        &ages,
        male_col.map(|_| male.as_slice()),
        female_col.map(|_| female.as_slice()),
    )
}

/// Positional layout of a PDATA export
///
/// The file has no header. Column `marker_col` carries block markers:
///
/// ```text
/// row 0              header of the premium block
/// rows 1..DIE        premium rates: sex at premium_sex_col, age at
///                    premium_age_col, rate per unit at premium_rate_col
/// row DIE            "DIE" marker; next row is a header
/// rows DIE+2..end    death benefits per unit: sex at schedule_sex_col, age
///                    at schedule_age_col, policy years 1.. from
///                    schedule_first_value_col; the block ends at "PV0"
///                    (or "PV" when there is no PV0 block)
/// row PV             "PV" marker; next row is a header
/// rows PV+2..        cash values per unit, same columns as DIE
/// ```
///
/// Sex codes are 1 (male) and 2 (female).
#[derive(Debug, Clone)]
pub struct PdataLayout {
    pub marker_col: usize,
    pub death_marker: String,
    pub pv0_marker: String,
    pub cash_value_marker: String,
    pub premium_sex_col: usize,
    pub premium_age_col: usize,
    pub premium_rate_col: usize,
    pub schedule_sex_col: usize,
    pub schedule_age_col: usize,
    pub schedule_first_value_col: usize,
    /// Rows between a marker and its first data row (marker + header)
    pub block_header_rows: usize,
}

impl Default for PdataLayout {
    fn default() -> Self {
        Self {
            marker_col: 129,
            death_marker: "DIE".to_string(),
            pv0_marker: "PV0".to_string(),
            cash_value_marker: "PV".to_string(),
            premium_sex_col: 5,
            premium_age_col: 7,
            premium_rate_col: 10,
            schedule_sex_col: 131,
            schedule_age_col: 132,
            schedule_first_value_col: 134,
            block_header_rows: 2,
        }
    }
}

/// Contents of a PDATA export
#[derive(Debug, Clone)]
pub struct PolicyDataSet {
    /// Annual premium per unit of face, by gender and issue age
    pub premium_rates: RateTable,
    /// Guaranteed values per unit of face, by gender and issue age
    pub schedules: ScheduleSet,
}

impl PolicyDataSet {
    /// Guaranteed schedule for a gender and issue age
    pub fn schedule(&self, gender: Gender, issue_age: u8) -> Result<&GuaranteedSchedule> {
        self.schedules.get(gender, issue_age)
    }
}

/// Load a PDATA export from a file using the default layout
pub fn load_pdata<P: AsRef<Path>>(path: P) -> Result<PolicyDataSet> {
    let file = File::open(path)?;
    load_pdata_from_reader(file, &PdataLayout::default())
}

/// Load a PDATA export from any reader
pub fn load_pdata_from_reader<R: Read>(reader: R, layout: &PdataLayout) -> Result<PolicyDataSet> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let rows: Vec<StringRecord> = reader.records().collect::<std::result::Result<_, _>>()?;

    let find_marker = |marker: &str| {
        rows.iter().position(|r| {
            r.get(layout.marker_col)
                .map(|cell| cell.trim() == marker)
                .unwrap_or(false)
        })
    };
    let missing = |marker: &str| {
        ProjectionError::Configuration(format!(
            "PDATA has no '{}' marker in column {}",
            marker, layout.marker_col
        ))
    };

    let death_start = find_marker(&layout.death_marker).ok_or_else(|| missing(&layout.death_marker))?;
    let cash_start = find_marker(&layout.cash_value_marker)
        .ok_or_else(|| missing(&layout.cash_value_marker))?;
    let death_end = find_marker(&layout.pv0_marker).unwrap_or(cash_start);

    if death_end < death_start || cash_start < death_start {
        return Err(ProjectionError::Configuration(format!(
            "PDATA blocks out of order: {} at row {}, {} at row {}",
            layout.death_marker, death_start, layout.cash_value_marker, cash_start
        )));
    }

    let premium_entries: Vec<(Gender, u8, f64)> = rows[1.min(death_start)..death_start]
        .iter()
        .enumerate()
        .filter_map(|(i, row)| {
            let entry = parse_premium_row(row, layout);
            if entry.is_none() {
                log::debug!("Skipping unparsable premium row {}", i + 1);
            }
            entry
        })
        .collect();

    let death_rows = block_rows(&rows, death_start, death_end, layout.block_header_rows);
    let cash_rows = block_rows(&rows, cash_start, rows.len(), layout.block_header_rows);
    let death_benefits = parse_schedule_block(death_rows, layout, "death benefit");
    let cash_values = parse_schedule_block(cash_rows, layout, "cash value");

    let mut schedules = ScheduleSet::new();
    for (key, cash) in cash_values {
        match death_benefits.get(&key) {
            Some(death) => schedules.insert(key.0, key.1, GuaranteedSchedule::new(cash, death.clone())),
            None => log::debug!("Cash values for {:?} age {} have no death benefit row", key.0, key.1),
        }
    }

    if premium_entries.is_empty() {
        log::warn!("PDATA premium block yielded no rates");
    }
    if schedules.is_empty() {
        log::warn!("PDATA yielded no complete guaranteed schedules");
    }
    log::info!(
        "Loaded PDATA: {} premium rates, {} guaranteed schedules",
        premium_entries.len(),
        schedules.len()
    );

    Ok(PolicyDataSet {
        premium_rates: RateTable::from_entries(premium_entries),
        schedules,
    })
}

/// Data rows of a block starting at a marker row
fn block_rows(rows: &[StringRecord], marker: usize, end: usize, header_rows: usize) -> &[StringRecord] {
    let first = (marker + header_rows).min(end);
    &rows[first..end]
}

fn parse_premium_row(row: &StringRecord, layout: &PdataLayout) -> Option<(Gender, u8, f64)> {
    let gender = Gender::from_code(parse_integer(row.get(layout.premium_sex_col)?)?)?;
    let age = parse_age(row.get(layout.premium_age_col)?)?;
    let rate = parse_number(row.get(layout.premium_rate_col)?)?;
    Some((gender, age, rate))
}

fn parse_schedule_row(row: &StringRecord, layout: &PdataLayout) -> Option<((Gender, u8), Vec<f64>)> {
    let gender = Gender::from_code(parse_integer(row.get(layout.schedule_sex_col)?)?)?;
    let age = parse_age(row.get(layout.schedule_age_col)?)?;
    let values = row
        .iter()
        .skip(layout.schedule_first_value_col)
        .filter(|cell| !cell.trim().is_empty())
        .map(parse_number)
        .collect::<Option<Vec<f64>>>()?;
    Some(((gender, age), values))
}

fn parse_schedule_block(
    rows: &[StringRecord],
    layout: &PdataLayout,
    what: &str,
) -> HashMap<(Gender, u8), Vec<f64>> {
    let mut parsed = HashMap::new();
    for (i, row) in rows.iter().enumerate() {
        match parse_schedule_row(row, layout) {
            Some((key, values)) => {
                parsed.insert(key, values);
            }
            None => log::debug!("Skipping unparsable {} row {} of block", what, i),
        }
    }
    if parsed.is_empty() {
        log::warn!("PDATA {} block yielded no rows", what);
    }
    parsed
}
