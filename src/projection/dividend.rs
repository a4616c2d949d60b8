//! Dividend accrual and the participating projector
//!
//! A participating policy's values are its guaranteed schedule plus the
//! dividends accumulated on it. Each year's dividend is the declared-minus-
//! assumed rate spread applied to the prior guaranteed cash value, the prior
//! accumulated dividends and this year's premium. Accumulated dividends earn
//! the declared rate. A terminal dividend, ramped in over the early policy
//! years, is payable from a minimum duration onward.

use crate::assumptions::GuaranteedSchedule;
use crate::error::Result;
use crate::policy::PolicyParameters;
use super::cashflows::{ProjectionResult, ProjectionRow};
use super::config::{DividendConfig, ParticipatingConfig};
use super::engine::PolicyProjector;
use super::state::RunningState;

/// Inputs to one year of dividend accrual
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccrualInput {
    pub policy_year: u32,
    /// Guaranteed cash value at the end of the prior year
    pub prior_guaranteed_cash_value: f64,
    pub guaranteed_cash_value: f64,
    pub premium: f64,
    pub declared_rate: f64,
    pub assumed_rate: f64,
}

/// Dividend amounts for one policy year
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DividendYear {
    pub dividend: f64,
    pub accumulated_dividend: f64,
    pub terminal_dividend: f64,
}

/// Dividend scale applied year by year
pub trait DividendPolicy {
    /// Accrue one year given the accumulated dividend carried in
    fn accrue(&self, input: &AccrualInput, accumulated_dividend: f64) -> DividendYear;
}

/// Guaranteed values only
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDividends;

impl DividendPolicy for NoDividends {
    fn accrue(&self, _input: &AccrualInput, _accumulated_dividend: f64) -> DividendYear {
        DividendYear::default()
    }
}

/// Annual and terminal dividends driven by the declared/assumed rate spread
#[derive(Debug, Clone, Default)]
pub struct DividendAccrual {
    config: DividendConfig,
}

impl DividendAccrual {
    pub fn new(config: DividendConfig) -> Self {
        Self { config }
    }

    /// Rate applied to the dividend base, never negative
    pub fn spread(&self, declared_rate: f64, assumed_rate: f64) -> f64 {
        (declared_rate - assumed_rate + self.config.bonus_loading).max(0.0)
    }

    /// Fraction of the terminal rate earned in a policy year
    pub fn terminal_ramp(&self, policy_year: u32) -> f64 {
        if policy_year < self.config.terminal_start_year {
            return 0.0;
        }
        if self.config.terminal_ramp_years == 0 {
            return 1.0;
        }
        let elapsed = policy_year as f64 - self.config.terminal_ramp_offset as f64;
        (elapsed / self.config.terminal_ramp_years as f64).clamp(0.0, 1.0)
    }
}

impl DividendPolicy for DividendAccrual {
    fn accrue(&self, input: &AccrualInput, accumulated_dividend: f64) -> DividendYear {
        let base = input.prior_guaranteed_cash_value + accumulated_dividend + input.premium;
        let dividend = base * self.spread(input.declared_rate, input.assumed_rate);
        let accumulated = accumulated_dividend * (1.0 + input.declared_rate) + dividend;

        let terminal_dividend = (input.guaranteed_cash_value + accumulated)
            * self.config.terminal_rate
            * self.terminal_ramp(input.policy_year);

        DividendYear {
            dividend,
            accumulated_dividend: accumulated,
            terminal_dividend,
        }
    }
}

/// Projects a guaranteed schedule plus dividends
///
/// The schedule is stated on the basis in the config and scaled to the
/// policy at projection time.
#[derive(Debug, Clone)]
pub struct ParticipatingProjector<D> {
    schedule: GuaranteedSchedule,
    config: ParticipatingConfig,
    dividends: D,
}

impl<D: DividendPolicy> ParticipatingProjector<D> {
    pub fn new(schedule: GuaranteedSchedule, config: ParticipatingConfig, dividends: D) -> Self {
        Self {
            schedule,
            config,
            dividends,
        }
    }

    pub fn config(&self) -> &ParticipatingConfig {
        &self.config
    }

    fn project_year(
        &self,
        policy: &PolicyParameters,
        state: &mut RunningState,
        scale: f64,
    ) -> ProjectionRow {
        let year = state.policy_year;
        let mut row = ProjectionRow::new(year, policy.attained_age(year));

        row.gross_premium = policy.premium_for_year(year);
        row.net_premium = row.gross_premium;
        state.cumulative_premium += row.gross_premium;
        row.cumulative_premium = state.cumulative_premium;

        row.guaranteed_cash_value = self.schedule.cash_value(year) * scale;
        row.guaranteed_death_benefit = self.schedule.death_benefit(year) * scale;

        let input = AccrualInput {
            policy_year: year,
            prior_guaranteed_cash_value: self.schedule.cash_value(year - 1) * scale,
            guaranteed_cash_value: row.guaranteed_cash_value,
            premium: row.gross_premium,
            declared_rate: policy.declared_rate,
            assumed_rate: policy.assumed_rate,
        };
        let accrued = self.dividends.accrue(&input, state.accumulated_dividend);
        state.accumulated_dividend = accrued.accumulated_dividend;

        row.dividend = accrued.dividend;
        row.accumulated_dividend = accrued.accumulated_dividend;
        row.terminal_dividend = accrued.terminal_dividend;

        let non_guaranteed = accrued.accumulated_dividend + accrued.terminal_dividend;
        row.account_value_end = row.guaranteed_cash_value + non_guaranteed;
        row.death_benefit =
            row.guaranteed_death_benefit.max(state.cumulative_premium) + non_guaranteed;
        row.settle_unleveraged();

        state.account_value = row.account_value_end;
        row
    }
}

impl<D: DividendPolicy> PolicyProjector for ParticipatingProjector<D> {
    fn project(&self, policy: &PolicyParameters) -> Result<ProjectionResult> {
        self.config.horizon.validate(policy)?;
        let scale = self.config.schedule_basis.scale(policy)?;
        let years = self.config.horizon.years(policy);

        log::debug!(
            "Participating projection: policy {} age {} {} for {} years (scale {:.4})",
            policy.policy_id,
            policy.issue_age,
            policy.gender,
            years,
            scale
        );

        let mut result = ProjectionResult::new(policy.policy_id, policy.issue_age);
        let mut state = RunningState::new();

        for _ in 0..years {
            state.advance_year();
            let row = self.project_year(policy, &mut state, scale);
            result.add_row(row);
        }

        Ok(result)
    }
}
