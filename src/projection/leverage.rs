//! Policy-loan leverage overlay
//!
//! Runs over a finished projection. Each year a loan may be drawn against the
//! cash value and invested in a side fund. The fund's income either offsets
//! the premium (excess paid out) or compounds. Loans are never repaid.

use crate::assumptions::LoanLimitSchedule;
use crate::error::{ProjectionError, Result};
use crate::policy::PolicyParameters;
use super::cashflows::{ProjectionResult, ProjectionRow};
use super::config::{LeverageConfig, WithdrawalMode};
use super::state::RunningState;

/// Outcome of the borrowing check for one year
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoanDecision {
    /// Loan limit as a fraction of cash value
    pub limit_rate: f64,
    /// Borrowing triggered this year; the draw restarts the interval even when `amount` is zero
    pub draw: bool,
    /// New loan to draw
    pub amount: f64,
}

/// Decides when and how much to borrow
pub trait LoanPolicy {
    fn decide(&self, policy: &PolicyParameters, row: &ProjectionRow, state: &RunningState) -> LoanDecision;
}

/// Never borrows
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLoans;

impl LoanPolicy for NoLoans {
    fn decide(&self, _policy: &PolicyParameters, _row: &ProjectionRow, _state: &RunningState) -> LoanDecision {
        LoanDecision::default()
    }
}

/// Borrow up to the loan limit in large, spaced-out draws
#[derive(Debug, Clone)]
pub struct StepLoanPolicy {
    pub limits: LoanLimitSchedule,
    pub min_loan_threshold: f64,
    pub loan_interval_years: u32,
    pub max_borrow_age: u8,
}

impl StepLoanPolicy {
    pub fn from_config(config: &LeverageConfig) -> Self {
        Self {
            limits: config.loan_limits.clone(),
            min_loan_threshold: config.min_loan_threshold,
            loan_interval_years: config.loan_interval_years,
            max_borrow_age: config.max_borrow_age,
        }
    }
}

impl LoanPolicy for StepLoanPolicy {
    fn decide(&self, policy: &PolicyParameters, row: &ProjectionRow, state: &RunningState) -> LoanDecision {
        let year = row.policy_year;
        let limit_rate = self.limits.rate(year);

        if policy.age_at_year_end(year) > self.max_borrow_age {
            return LoanDecision { limit_rate, ..Default::default() };
        }

        let max_loan = row.account_value_end * limit_rate;
        let borrowable = max_loan - state.current_loan;
        let interval_elapsed = state
            .years_since_borrow(year)
            .map_or(true, |since| since >= self.loan_interval_years);

        if borrowable >= self.min_loan_threshold && interval_elapsed {
            LoanDecision { limit_rate, draw: true, amount: borrowable }
        } else {
            LoanDecision { limit_rate, ..Default::default() }
        }
    }
}

/// Settles one year's fund income into the running accumulators
pub trait WithdrawalPolicy {
    fn settle(&self, row: &mut ProjectionRow, state: &mut RunningState, fund_income: f64);
}

/// Fund income pays the premium; a shortfall is real cost, an excess is paid out
#[derive(Debug, Clone, Copy, Default)]
pub struct OffsetWithdrawal;

impl WithdrawalPolicy for OffsetWithdrawal {
    fn settle(&self, row: &mut ProjectionRow, state: &mut RunningState, fund_income: f64) {
        let actual_payment = row.gross_premium - fund_income;
        if actual_payment > 0.0 {
            state.cumulative_real_cost += actual_payment;
        } else {
            state.cumulative_cash_out -= actual_payment;
        }
        row.actual_payment = actual_payment;

        row.net_worth = row.account_value_end + state.fund_principal + state.cumulative_cash_out
            - state.current_loan;
        row.total_death_benefit = row.death_benefit + state.fund_principal - state.current_loan;
    }
}

/// Fund income is reinvested at the fund yield; premiums are paid in full
#[derive(Debug, Clone, Copy)]
pub struct CompoundReinvestment {
    pub fund_yield_rate: f64,
}

impl WithdrawalPolicy for CompoundReinvestment {
    fn settle(&self, row: &mut ProjectionRow, state: &mut RunningState, fund_income: f64) {
        state.accumulated_wealth = state.accumulated_wealth * (1.0 + self.fund_yield_rate) + fund_income;
        state.cumulative_real_cost += row.gross_premium;
        row.actual_payment = row.gross_premium;

        row.net_worth = row.account_value_end + state.fund_principal + state.accumulated_wealth
            - state.current_loan;
        row.total_death_benefit =
            row.death_benefit + state.fund_principal + state.accumulated_wealth - state.current_loan;
    }
}

/// Loan drawdown and withdrawal strategy applied over a projection
pub struct LoanLeverageStrategy {
    loans: Box<dyn LoanPolicy + Send + Sync>,
    withdrawals: Box<dyn WithdrawalPolicy + Send + Sync>,
    fund_yield_rate: f64,
    loan_fee_rate: f64,
    loan_interest_rate: f64,
}

impl LoanLeverageStrategy {
    /// Assemble a strategy from explicit loan and withdrawal policies
    pub fn new(
        loans: Box<dyn LoanPolicy + Send + Sync>,
        withdrawals: Box<dyn WithdrawalPolicy + Send + Sync>,
        fund_yield_rate: f64,
        loan_fee_rate: f64,
    ) -> Self {
        Self {
            loans,
            withdrawals,
            fund_yield_rate,
            loan_fee_rate,
            loan_interest_rate: 0.0,
        }
    }

    /// Step-limit borrowing with the configured withdrawal mode
    pub fn from_config(config: &LeverageConfig) -> Result<Self> {
        validate_config(config)?;

        let withdrawals: Box<dyn WithdrawalPolicy + Send + Sync> = match config.mode {
            WithdrawalMode::Offset => Box::new(OffsetWithdrawal),
            WithdrawalMode::Compound => Box::new(CompoundReinvestment {
                fund_yield_rate: config.fund_yield_rate,
            }),
        };

        Ok(Self {
            loans: Box::new(StepLoanPolicy::from_config(config)),
            withdrawals,
            fund_yield_rate: config.fund_yield_rate,
            loan_fee_rate: config.loan_fee_rate,
            loan_interest_rate: config.loan_interest_rate,
        })
    }

    /// Overlay loans and fund income onto every row of a projection
    pub fn apply(&self, policy: &PolicyParameters, result: &mut ProjectionResult) {
        let mut state = RunningState::new();

        for row in result.rows.iter_mut() {
            let year = state.advance_year();

            if self.loan_interest_rate > 0.0 {
                state.current_loan *= 1.0 + self.loan_interest_rate;
            }

            let decision = self.loans.decide(policy, row, &state);
            row.loan_limit_rate = decision.limit_rate;
            if decision.draw {
                log::debug!(
                    "Policy {} year {}: drawing loan {:.2} at limit {:.0}%",
                    policy.policy_id,
                    year,
                    decision.amount,
                    decision.limit_rate * 100.0
                );
                state.draw_loan(year, decision.amount, self.loan_fee_rate);
                row.borrowed = true;
                row.loan_drawn = decision.amount;
            }

            let fund_income = state.fund_principal * self.fund_yield_rate;
            row.fund_income = fund_income;
            self.withdrawals.settle(row, &mut state, fund_income);

            row.loan_balance = state.current_loan;
            row.fund_principal = state.fund_principal;
            row.cumulative_cash_out = state.cumulative_cash_out;
            row.cumulative_real_cost = state.cumulative_real_cost;
            row.accumulated_wealth = state.accumulated_wealth;
        }
    }
}

fn validate_config(config: &LeverageConfig) -> Result<()> {
    if config.loan_fee_rate.is_nan() || !(0.0..=1.0).contains(&config.loan_fee_rate) {
        return Err(ProjectionError::Configuration(format!(
            "loan fee rate {} outside [0, 1]",
            config.loan_fee_rate
        )));
    }
    if config.min_loan_threshold.is_nan() || config.min_loan_threshold < 0.0 {
        return Err(ProjectionError::Configuration(format!(
            "minimum loan threshold must be non-negative, got {}",
            config.min_loan_threshold
        )));
    }
    if config.loan_interest_rate.is_nan() || config.loan_interest_rate < 0.0 {
        return Err(ProjectionError::Configuration(format!(
            "loan interest rate must be non-negative, got {}",
            config.loan_interest_rate
        )));
    }
    if config.fund_yield_rate.is_nan() || config.fund_yield_rate <= -1.0 {
        return Err(ProjectionError::Configuration(format!(
            "fund yield rate {} must be greater than -100%",
            config.fund_yield_rate
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::GuaranteedSchedule;
    use crate::policy::Gender;
    use crate::projection::config::{Horizon, ParticipatingConfig, ScheduleBasis};
    use crate::projection::dividend::{NoDividends, ParticipatingProjector};
    use crate::projection::engine::PolicyProjector;
    use approx::assert_abs_diff_eq;

    fn project(cash_values: Vec<f64>, issue_age: u8) -> (PolicyParameters, ProjectionResult) {
        let years = cash_values.len() as u32;
        let death_benefits = vec![5_000_000.0; cash_values.len()];
        let config = ParticipatingConfig {
            horizon: Horizon::PolicyYears(years),
            schedule_basis: ScheduleBasis::Absolute,
            dividends: None,
        };
        let projector = ParticipatingProjector::new(
            GuaranteedSchedule::new(cash_values, death_benefits),
            config,
            NoDividends,
        );
        let policy = PolicyParameters::new(issue_age, Gender::Male, 100_000.0, 5_000_000.0, 5, 0.0, 0.0);
        let result = projector.project(&policy).unwrap();
        (policy, result)
    }

    fn flat_limit_config(mode: WithdrawalMode) -> LeverageConfig {
        LeverageConfig {
            mode,
            loan_limits: LoanLimitSchedule::flat(0.8),
            ..Default::default()
        }
    }

    #[test]
    fn test_offset_first_draw() {
        let (policy, mut result) = project(vec![500_000.0, 1_000_000.0, 1_500_000.0, 2_000_000.0], 40);
        let strategy = LoanLeverageStrategy::from_config(&flat_limit_config(WithdrawalMode::Offset)).unwrap();
        strategy.apply(&policy, &mut result);

        let row = &result.rows[0];
        assert!(row.borrowed);
        assert_abs_diff_eq!(row.loan_drawn, 400_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(row.fund_principal, 380_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(row.fund_income, 26_600.0, epsilon = 1e-6);
        assert_abs_diff_eq!(row.actual_payment, 73_400.0, epsilon = 1e-6);
        assert_abs_diff_eq!(row.cumulative_real_cost, 73_400.0, epsilon = 1e-6);
        assert_abs_diff_eq!(row.net_worth, 480_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(row.total_death_benefit, 4_980_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_draws_respect_interval() {
        let (policy, mut result) = project(vec![500_000.0, 1_000_000.0, 1_500_000.0, 2_000_000.0], 40);
        let strategy = LoanLeverageStrategy::from_config(&flat_limit_config(WithdrawalMode::Offset)).unwrap();
        strategy.apply(&policy, &mut result);

        let borrowed: Vec<u32> = result.rows.iter().filter(|r| r.borrowed).map(|r| r.policy_year).collect();
        assert_eq!(borrowed, vec![1, 4]);
        assert_abs_diff_eq!(result.rows[3].loan_balance, 1_600_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(result.rows[3].fund_principal, 1_520_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_no_new_loans_past_max_age() {
        let cash_values: Vec<f64> = (1..=8).map(|y| 1_000_000.0 * y as f64).collect();
        let (policy, mut result) = project(cash_values, 63);
        let config = LeverageConfig {
            loan_interval_years: 1,
            ..flat_limit_config(WithdrawalMode::Offset)
        };
        LoanLeverageStrategy::from_config(&config).unwrap().apply(&policy, &mut result);

        // Year-end ages 64 and 65 are eligible, 66 onward are not
        assert!(result.rows[0].borrowed);
        assert!(result.rows[1].borrowed);
        assert!(result.rows[2..].iter().all(|r| !r.borrowed));
        assert!(result.rows[2..].iter().all(|r| r.loan_balance == result.rows[1].loan_balance));
    }

    #[test]
    fn test_below_threshold_never_borrows() {
        let (policy, mut result) = project(vec![100_000.0, 200_000.0, 300_000.0], 40);
        let strategy = LoanLeverageStrategy::from_config(&flat_limit_config(WithdrawalMode::Offset)).unwrap();
        strategy.apply(&policy, &mut result);

        for row in &result.rows {
            assert_eq!(row.loan_balance, 0.0);
            assert_eq!(row.fund_principal, 0.0);
            assert_eq!(row.net_worth, row.account_value_end);
        }
    }

    #[test]
    fn test_compound_without_borrowing_keeps_wealth_zero() {
        let (policy, mut result) = project(vec![100_000.0, 200_000.0, 300_000.0], 40);
        let strategy = LoanLeverageStrategy::from_config(&flat_limit_config(WithdrawalMode::Compound)).unwrap();
        strategy.apply(&policy, &mut result);

        assert!(result.rows.iter().all(|r| r.accumulated_wealth == 0.0));
    }

    #[test]
    fn test_compound_reinvests_income() {
        let (policy, mut result) = project(vec![500_000.0, 600_000.0], 40);
        let strategy = LoanLeverageStrategy::from_config(&flat_limit_config(WithdrawalMode::Compound)).unwrap();
        strategy.apply(&policy, &mut result);

        assert_abs_diff_eq!(result.rows[0].accumulated_wealth, 26_600.0, epsilon = 1e-6);
        assert_abs_diff_eq!(result.rows[1].accumulated_wealth, 26_600.0 * 1.07 + 26_600.0, epsilon = 1e-6);
        assert_abs_diff_eq!(
            result.rows[1].net_worth,
            600_000.0 + 380_000.0 + 26_600.0 * 2.07 - 400_000.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_loan_interest_keeps_balance_non_decreasing() {
        let cash_values: Vec<f64> = (1..=10).map(|y| 600_000.0 * y as f64).collect();
        let (policy, mut result) = project(cash_values, 40);
        let config = LeverageConfig {
            loan_interest_rate: 0.03,
            ..flat_limit_config(WithdrawalMode::Offset)
        };
        LoanLeverageStrategy::from_config(&config).unwrap().apply(&policy, &mut result);

        for pair in result.rows.windows(2) {
            assert!(pair[1].loan_balance >= pair[0].loan_balance);
        }
        assert!(result.rows[1].loan_balance > result.rows[0].loan_balance);
    }

    #[test]
    fn test_explicit_policies_without_loans() {
        let (policy, mut result) = project(vec![5_000_000.0; 4], 40);
        let strategy = LoanLeverageStrategy::new(
            Box::new(NoLoans),
            Box::new(CompoundReinvestment { fund_yield_rate: 0.07 }),
            0.07,
            0.05,
        );
        strategy.apply(&policy, &mut result);

        for row in &result.rows {
            assert!(!row.borrowed);
            assert_eq!(row.loan_balance, 0.0);
            assert_eq!(row.net_worth, row.account_value_end);
        }
        assert_eq!(result.rows[3].cumulative_real_cost, 400_000.0);
    }

    #[test]
    fn test_zero_threshold_draws_still_restart_interval() {
        // Cash value stops growing after year 1, so later draws are empty
        let (policy, mut result) = project(vec![500_000.0, 500_000.0, 500_000.0, 500_000.0, 1_000_000.0], 40);
        let config = LeverageConfig {
            min_loan_threshold: 0.0,
            loan_interval_years: 2,
            ..flat_limit_config(WithdrawalMode::Offset)
        };
        LoanLeverageStrategy::from_config(&config).unwrap().apply(&policy, &mut result);

        let borrowed: Vec<u32> = result.rows.iter().filter(|r| r.borrowed).map(|r| r.policy_year).collect();
        assert_eq!(borrowed, vec![1, 3, 5]);
        assert_eq!(result.rows[2].loan_drawn, 0.0);
        assert_abs_diff_eq!(result.rows[4].loan_drawn, 400_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(result.rows[4].loan_balance, 800_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_rejects_negative_threshold() {
        let config = LeverageConfig {
            min_loan_threshold: -1.0,
            ..Default::default()
        };
        assert!(LoanLeverageStrategy::from_config(&config).is_err());
    }

    #[test]
    fn test_rejects_bad_fee_rate() {
        let config = LeverageConfig {
            loan_fee_rate: 1.5,
            ..Default::default()
        };
        assert!(LoanLeverageStrategy::from_config(&config).is_err());
    }
}
