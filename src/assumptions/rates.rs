//! Per-age, per-gender rate tables (cost of insurance or premium rates)
//!
//! A table holds one column per gender. A column may be absent entirely
//! (e.g. a male-only rate file); looking it up is a configuration error.
//! Ages beyond a column's maximum tabulated age resolve to the column's
//! maximum rate (flat extrapolation), which is product policy rather than
//! missing data. Ages below the maximum that are not tabulated are missing
//! data.

use crate::error::{ProjectionError, Result};
use crate::policy::Gender;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Source of per-age, per-gender rates
pub trait RateSource {
    /// Rate for an attained age and gender
    fn rate(&self, age: u8, gender: Gender) -> Result<f64>;
}

impl<T: RateSource + ?Sized> RateSource for &T {
    fn rate(&self, age: u8, gender: Gender) -> Result<f64> {
        (**self).rate(age, gender)
    }
}

/// One tabulated age with both gender rates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateRow {
    pub age: u8,
    pub male_rate: f64,
    pub female_rate: f64,
}

#[derive(Debug, Clone, Default)]
struct RateColumn {
    rates: BTreeMap<u8, f64>,
}

impl RateColumn {
    fn insert(&mut self, age: u8, rate: f64, gender: Gender) {
        if let Some(previous) = self.rates.insert(age, rate) {
            log::warn!(
                "Duplicate {} rate for age {}: {} replaced by {}",
                gender, age, previous, rate
            );
        }
    }

    fn max_age(&self) -> Option<u8> {
        self.rates.keys().next_back().copied()
    }

    fn max_rate(&self) -> Option<f64> {
        self.rates.values().copied().reduce(f64::max)
    }
}

/// Immutable lookup table keyed by integer age
#[derive(Debug, Clone, Default)]
pub struct RateTable {
    male: Option<RateColumn>,
    female: Option<RateColumn>,
}

impl RateTable {
    /// Build a table with both gender columns
    pub fn from_rows(rows: impl IntoIterator<Item = RateRow>) -> Self {
        let mut male = RateColumn::default();
        let mut female = RateColumn::default();
        for row in rows {
            male.insert(row.age, row.male_rate, Gender::Male);
            female.insert(row.age, row.female_rate, Gender::Female);
        }
        Self {
            male: Some(male),
            female: Some(female),
        }
    }

    /// Build a table from (gender, age, rate) entries
    ///
    /// A gender column exists only if at least one entry for it is supplied.
    pub fn from_entries(entries: impl IntoIterator<Item = (Gender, u8, f64)>) -> Self {
        let mut table = Self::default();
        for (gender, age, rate) in entries {
            let column = match gender {
                Gender::Male => table.male.get_or_insert_with(RateColumn::default),
                Gender::Female => table.female.get_or_insert_with(RateColumn::default),
            };
            column.insert(age, rate, gender);
        }
        table
    }

    /// Build a table from parallel columns; `None` marks an absent column
    pub fn from_columns(
        ages: &[u8],
        male: Option<&[f64]>,
        female: Option<&[f64]>,
    ) -> Result<Self> {
        let build = |values: Option<&[f64]>, gender: Gender| -> Result<Option<RateColumn>> {
            let Some(values) = values else {
                return Ok(None);
            };
            if values.len() != ages.len() {
                return Err(ProjectionError::Configuration(format!(
                    "{} column has {} rates for {} ages",
                    gender,
                    values.len(),
                    ages.len()
                )));
            }
            let mut column = RateColumn::default();
            for (&age, &rate) in ages.iter().zip(values) {
                column.insert(age, rate, gender);
            }
            Ok(Some(column))
        };

        Ok(Self {
            male: build(male, Gender::Male)?,
            female: build(female, Gender::Female)?,
        })
    }

    fn column(&self, gender: Gender) -> Result<&RateColumn> {
        let column = match gender {
            Gender::Male => self.male.as_ref(),
            Gender::Female => self.female.as_ref(),
        };
        column.ok_or_else(|| {
            ProjectionError::Configuration(format!("rate table has no {} column", gender))
        })
    }

    /// Whether the table carries a column for the gender
    pub fn has_column(&self, gender: Gender) -> bool {
        self.column(gender).is_ok()
    }

    /// Highest tabulated age for a gender
    pub fn max_age(&self, gender: Gender) -> Option<u8> {
        self.column(gender).ok().and_then(RateColumn::max_age)
    }

    /// Number of tabulated ages across both columns
    pub fn len(&self) -> usize {
        let male = self.male.as_ref().map_or(0, |c| c.rates.len());
        let female = self.female.as_ref().map_or(0, |c| c.rates.len());
        male.max(female)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up the rate for an age and gender
    ///
    /// Exact value for tabulated ages, maximum column rate beyond the last
    /// tabulated age.
    pub fn lookup(&self, age: u8, gender: Gender) -> Result<f64> {
        let column = self.column(gender)?;
        let not_found = || ProjectionError::DataNotFound {
            table: "rate table",
            age,
            gender,
        };

        let max_age = column.max_age().ok_or_else(not_found)?;
        if age > max_age {
            let rate = column.max_rate().ok_or_else(not_found)?;
            log::debug!(
                "Age {} beyond {} table maximum {}; using max rate {}",
                age, gender, max_age, rate
            );
            return Ok(rate);
        }

        column.rates.get(&age).copied().ok_or_else(not_found)
    }
}

impl RateSource for RateTable {
    fn rate(&self, age: u8, gender: Gender) -> Result<f64> {
        self.lookup(age, gender)
    }
}
