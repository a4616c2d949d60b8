//! Guaranteed cash-value and death-benefit schedules of participating products

use crate::error::{ProjectionError, Result};
use crate::policy::Gender;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Guaranteed values by policy year, indexed from policy year 1
///
/// Years past the final entry resolve to the final entry; year 0 is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuaranteedSchedule {
    cash_values: Vec<f64>,
    death_benefits: Vec<f64>,
}

impl GuaranteedSchedule {
    /// Pair a cash-value series with a death-benefit series
    ///
    /// Series of unequal length are truncated to the shorter one.
    pub fn new(mut cash_values: Vec<f64>, mut death_benefits: Vec<f64>) -> Self {
        let years = cash_values.len().min(death_benefits.len());
        if cash_values.len() != death_benefits.len() {
            log::debug!(
                "Schedule series lengths differ ({} cash values, {} death benefits); using {} years",
                cash_values.len(),
                death_benefits.len(),
                years
            );
        }
        cash_values.truncate(years);
        death_benefits.truncate(years);
        Self {
            cash_values,
            death_benefits,
        }
    }

    /// Number of tabulated policy years
    pub fn len(&self) -> usize {
        self.cash_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cash_values.is_empty()
    }

    fn value_at(values: &[f64], policy_year: u32) -> f64 {
        if policy_year == 0 || values.is_empty() {
            return 0.0;
        }
        let idx = (policy_year as usize - 1).min(values.len() - 1);
        values[idx]
    }

    /// Guaranteed cash value at the end of a policy year
    pub fn cash_value(&self, policy_year: u32) -> f64 {
        Self::value_at(&self.cash_values, policy_year)
    }

    /// Guaranteed death benefit during a policy year
    pub fn death_benefit(&self, policy_year: u32) -> f64 {
        Self::value_at(&self.death_benefits, policy_year)
    }

    pub fn cash_values(&self) -> &[f64] {
        &self.cash_values
    }

    pub fn death_benefits(&self) -> &[f64] {
        &self.death_benefits
    }
}

/// Guaranteed schedules keyed by gender and issue age
#[derive(Debug, Clone, Default)]
pub struct ScheduleSet {
    schedules: HashMap<(Gender, u8), GuaranteedSchedule>,
}

impl ScheduleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, gender: Gender, issue_age: u8, schedule: GuaranteedSchedule) {
        self.schedules.insert((gender, issue_age), schedule);
    }

    /// Schedule for a gender and issue age
    pub fn get(&self, gender: Gender, issue_age: u8) -> Result<&GuaranteedSchedule> {
        self.schedules
            .get(&(gender, issue_age))
            .ok_or(ProjectionError::DataNotFound {
                table: "guaranteed schedule",
                age: issue_age,
                gender,
            })
    }

    pub fn len(&self) -> usize {
        self.schedules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schedules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_indexed_from_year_one() {
        let schedule = GuaranteedSchedule::new(vec![100.0, 250.0, 400.0], vec![1000.0, 1000.0, 1200.0]);

        assert_eq!(schedule.cash_value(0), 0.0);
        assert_eq!(schedule.cash_value(1), 100.0);
        assert_eq!(schedule.cash_value(3), 400.0);
        assert_eq!(schedule.death_benefit(2), 1000.0);
    }

    #[test]
    fn test_flat_beyond_last_year() {
        let schedule = GuaranteedSchedule::new(vec![100.0, 250.0], vec![1000.0, 1100.0]);
        assert_eq!(schedule.cash_value(10), 250.0);
        assert_eq!(schedule.death_benefit(10), 1100.0);
    }

    #[test]
    fn test_unequal_series_truncated() {
        let schedule = GuaranteedSchedule::new(vec![1.0, 2.0, 3.0], vec![10.0, 20.0]);
        assert_eq!(schedule.len(), 2);
        assert_eq!(schedule.cash_value(3), 2.0);
    }

    #[test]
    fn test_schedule_set_lookup() {
        let mut set = ScheduleSet::new();
        set.insert(Gender::Female, 37, GuaranteedSchedule::new(vec![1.0], vec![2.0]));

        assert!(set.get(Gender::Female, 37).is_ok());
        let err = set.get(Gender::Male, 37).unwrap_err();
        assert!(matches!(err, ProjectionError::DataNotFound { age: 37, gender: Gender::Male, .. }));
    }
}
