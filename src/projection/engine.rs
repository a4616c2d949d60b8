//! Core projection engine for non-participating universal life

use crate::assumptions::RateSource;
use crate::error::{ProjectionError, Result};
use crate::policy::PolicyParameters;
use super::cashflows::{ProjectionResult, ProjectionRow};
use super::config::UniversalLifeConfig;
use super::state::RunningState;

/// Produces a year-by-year projection for one policy
pub trait PolicyProjector {
    fn project(&self, policy: &PolicyParameters) -> Result<ProjectionResult>;
}

/// Universal-life account-value projector
///
/// Each policy year credits the net premium, deducts the admin fee and the
/// cost of insurance on the net amount at risk, then credits interest at the
/// declared rate. A negative balance is carried as zero rather than lapsing.
#[derive(Debug, Clone)]
pub struct UniversalLifeProjector<R> {
    rates: R,
    config: UniversalLifeConfig,
}

impl<R: RateSource> UniversalLifeProjector<R> {
    /// Create a projector over a COI rate source
    pub fn new(rates: R, config: UniversalLifeConfig) -> Self {
        Self { rates, config }
    }

    pub fn config(&self) -> &UniversalLifeConfig {
        &self.config
    }

    /// Resolve the COI rate of every year up front so a missing entry
    /// fails the run before any row is produced
    fn resolve_rates(&self, policy: &PolicyParameters, years: u32) -> Result<Vec<f64>> {
        (1..=years)
            .map(|year| self.rates.rate(policy.attained_age(year), policy.gender))
            .collect()
    }

    fn check_config(&self) -> Result<()> {
        if self.config.coi_unit.is_nan() || self.config.coi_unit <= 0.0 {
            return Err(ProjectionError::Configuration(format!(
                "COI unit must be positive, got {}",
                self.config.coi_unit
            )));
        }
        if self.config.coi_loading.is_nan() || self.config.coi_loading < 0.0 {
            return Err(ProjectionError::Configuration(format!(
                "COI loading must be non-negative, got {}",
                self.config.coi_loading
            )));
        }
        Ok(())
    }

    /// Calculate a single policy year and advance the state
    fn project_year(
        &self,
        policy: &PolicyParameters,
        state: &mut RunningState,
        coi_rate: f64,
    ) -> ProjectionRow {
        let year = state.policy_year;
        let mut row = ProjectionRow::new(year, policy.attained_age(year));

        // Premium and premium expense
        row.gross_premium = policy.premium_for_year(year);
        row.premium_expense = self.config.expense_schedule.expense(year, row.gross_premium);
        row.net_premium = row.gross_premium - row.premium_expense;
        row.admin_fee = self.config.admin_fee;
        state.cumulative_premium += row.gross_premium;
        row.cumulative_premium = state.cumulative_premium;

        // Cost of insurance on the net amount at risk at the start of the year
        row.coi_rate = coi_rate;
        row.net_amount_at_risk = (policy.face_amount - state.account_value).max(0.0);
        row.insurance_cost =
            row.net_amount_at_risk * (coi_rate / self.config.coi_unit) * self.config.coi_loading;

        let mut balance =
            state.account_value + row.net_premium - row.admin_fee - row.insurance_cost;
        if balance < 0.0 {
            log::warn!(
                "Policy {} year {}: balance {:.2} before interest clamped to zero",
                policy.policy_id,
                year,
                balance
            );
            balance = 0.0;
        }

        row.account_value_end = balance * (1.0 + policy.declared_rate);
        row.death_benefit = policy.face_amount.max(row.account_value_end);
        row.settle_unleveraged();

        state.account_value = row.account_value_end;
        row
    }
}

impl<R: RateSource> PolicyProjector for UniversalLifeProjector<R> {
    /// Run projection for a single policy
    ///
    /// Stops at the horizon age, or once the account value is exhausted after
    /// the premium-paying term.
    fn project(&self, policy: &PolicyParameters) -> Result<ProjectionResult> {
        self.check_config()?;
        policy.validate(self.config.max_age)?;

        let years = policy.years_to_age(self.config.max_age);
        let coi_rates = self.resolve_rates(policy, years)?;

        log::debug!(
            "UL projection: policy {} age {} {} for up to {} years",
            policy.policy_id,
            policy.issue_age,
            policy.gender,
            years
        );

        let mut result = ProjectionResult::new(policy.policy_id, policy.issue_age);
        let mut state = RunningState::new();

        for coi_rate in coi_rates {
            let year = state.advance_year();
            let row = self.project_year(policy, &mut state, coi_rate);
            result.add_row(row);

            if state.account_value <= 0.0 && year > policy.payment_term_years {
                break;
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::{default_coi_table, RateRow, RateTable};
    use crate::policy::Gender;
    use approx::assert_abs_diff_eq;

    fn flat_table(rate: f64) -> RateTable {
        RateTable::from_rows((0..=100).map(|age| RateRow {
            age,
            male_rate: rate,
            female_rate: rate / 2.0,
        }))
    }

    fn test_policy() -> PolicyParameters {
        PolicyParameters::new(31, Gender::Male, 120_000.0, 12_000_000.0, 20, 0.08, 0.0)
    }

    #[test]
    fn test_first_year_hand_computed() {
        let projector = UniversalLifeProjector::new(flat_table(1.25), UniversalLifeConfig::default());
        let result = projector.project(&test_policy()).unwrap();
        let row = &result.rows[0];

        assert_eq!(row.policy_year, 1);
        assert_eq!(row.attained_age, 31);
        assert_abs_diff_eq!(row.premium_expense, 69_600.0, epsilon = 1e-9);
        assert_abs_diff_eq!(row.net_premium, 50_400.0, epsilon = 1e-9);
        assert_abs_diff_eq!(row.net_amount_at_risk, 12_000_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(row.insurance_cost, 18_000.0, epsilon = 1e-6);
        // (50,400 - 1,200 - 18,000) * 1.08
        assert_abs_diff_eq!(row.account_value_end, 33_696.00, epsilon = 0.005);
        assert_eq!(row.death_benefit, 12_000_000.0);
    }

    #[test]
    fn test_second_year_uses_prior_account_value() {
        let projector = UniversalLifeProjector::new(flat_table(1.25), UniversalLifeConfig::default());
        let result = projector.project(&test_policy()).unwrap();
        let row = &result.rows[1];

        assert_abs_diff_eq!(row.premium_expense, 39_600.0, epsilon = 1e-9);
        assert_abs_diff_eq!(row.net_amount_at_risk, 11_966_304.0, epsilon = 1e-6);
        assert_abs_diff_eq!(row.insurance_cost, 17_949.456, epsilon = 1e-6);
        assert_abs_diff_eq!(row.account_value_end, 102_542.27, epsilon = 0.005);
    }

    #[test]
    fn test_runs_to_horizon_age() {
        let projector = UniversalLifeProjector::new(default_coi_table(), UniversalLifeConfig::default());
        let policy = PolicyParameters::new(40, Gender::Female, 50_000.0, 1_000_000.0, 61, 0.04, 0.0);
        let result = projector.project(&policy).unwrap();

        assert_eq!(result.rows.len(), 61);
        assert_eq!(result.rows.last().unwrap().attained_age, 100);
        for (i, row) in result.rows.iter().enumerate() {
            assert_eq!(row.policy_year, i as u32 + 1);
        }
    }

    #[test]
    fn test_invariants_hold_every_year() {
        let projector = UniversalLifeProjector::new(default_coi_table(), UniversalLifeConfig::default());
        let policy = PolicyParameters::new(45, Gender::Male, 30_000.0, 2_000_000.0, 10, 0.03, 0.0);
        let result = projector.project(&policy).unwrap();

        let mut prior_av = 0.0;
        for row in &result.rows {
            assert!(row.account_value_end >= 0.0);
            assert!(row.death_benefit >= policy.face_amount);
            assert!(row.net_amount_at_risk >= 0.0);
            assert_abs_diff_eq!(
                row.net_amount_at_risk,
                (policy.face_amount - prior_av).max(0.0),
                epsilon = 1e-6
            );
            prior_av = row.account_value_end;
        }
    }

    #[test]
    fn test_stops_when_exhausted_after_term() {
        let projector = UniversalLifeProjector::new(flat_table(5.0), UniversalLifeConfig::default());
        let policy = PolicyParameters::new(50, Gender::Male, 1_000.0, 5_000_000.0, 5, 0.05, 0.0);
        let result = projector.project(&policy).unwrap();

        // Clamped to zero each year but kept in force through the premium term
        assert_eq!(result.rows.len(), 6);
        assert!(result.rows.iter().all(|r| r.account_value_end == 0.0));
    }

    #[test]
    fn test_missing_age_fails_before_any_row() {
        let table = RateTable::from_rows((40..=100).map(|age| RateRow {
            age,
            male_rate: 1.0,
            female_rate: 1.0,
        }));
        let projector = UniversalLifeProjector::new(table, UniversalLifeConfig::default());
        let err = projector.project(&test_policy()).unwrap_err();

        assert!(matches!(err, ProjectionError::DataNotFound { age: 31, gender: Gender::Male, .. }));
    }

    #[test]
    fn test_missing_gender_column_is_configuration_error() {
        let table = RateTable::from_entries((0..=100).map(|age| (Gender::Male, age, 1.0)));
        let projector = UniversalLifeProjector::new(table, UniversalLifeConfig::default());
        let mut policy = test_policy();
        policy.gender = Gender::Female;

        assert!(matches!(
            projector.project(&policy),
            Err(ProjectionError::Configuration(_))
        ));
    }

    #[test]
    fn test_ages_past_table_use_max_rate() {
        let table = RateTable::from_rows((30..=60).map(|age| RateRow {
            age,
            male_rate: age as f64 / 10.0,
            female_rate: 0.0,
        }));
        let projector = UniversalLifeProjector::new(&table, UniversalLifeConfig::default());
        let policy = PolicyParameters::new(55, Gender::Male, 100_000.0, 1_000_000.0, 46, 0.02, 0.0);
        let result = projector.project(&policy).unwrap();

        assert_eq!(result.rows[5].attained_age, 60);
        assert_eq!(result.rows[5].coi_rate, 6.0);
        assert_eq!(result.rows[20].coi_rate, 6.0);
    }
}
