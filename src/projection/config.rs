//! Run configuration for projections
//!
//! Every calibration constant of the products lives here rather than in the
//! projection code, so a product vintage can be re-calibrated from a JSON file
//! without touching the engine. Missing fields fall back to the defaults.

use crate::assumptions::{LoanLimitSchedule, PremiumExpenseSchedule};
use crate::error::{ProjectionError, Result};
use crate::policy::PolicyParameters;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Last policy year of a projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Horizon {
    /// Project through the policy year in which the insured is this age
    AttainedAge(u8),
    /// Project a fixed number of policy years
    PolicyYears(u32),
}

impl Horizon {
    /// Number of policy years for a policy
    pub fn years(&self, policy: &PolicyParameters) -> u32 {
        match *self {
            Horizon::AttainedAge(age) => policy.years_to_age(age),
            Horizon::PolicyYears(years) => years,
        }
    }

    /// Reject a horizon that leaves nothing to project
    pub fn validate(&self, policy: &PolicyParameters) -> Result<()> {
        match *self {
            Horizon::AttainedAge(age) => policy.validate(age),
            Horizon::PolicyYears(0) => Err(ProjectionError::InvalidParameter {
                name: "horizon",
                reason: "projection must cover at least one policy year".to_string(),
            }),
            Horizon::PolicyYears(_) => policy.validate(u8::MAX),
        }
    }
}

/// Non-participating universal-life product constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniversalLifeConfig {
    /// Oldest attained age projected (100 or 110 depending on product)
    pub max_age: u8,

    /// Multiplier on tabulated COI rates
    pub coi_loading: f64,

    /// Face-amount unit the COI table is quoted per
    pub coi_unit: f64,

    /// Flat administration charge per policy year
    pub admin_fee: f64,

    /// Premium expense rates by policy year
    pub expense_schedule: PremiumExpenseSchedule,
}

impl Default for UniversalLifeConfig {
    fn default() -> Self {
        Self {
            max_age: 100,
            coi_loading: 1.2,
            coi_unit: 1000.0,
            admin_fee: 1200.0,
            expense_schedule: PremiumExpenseSchedule::default_ul(),
        }
    }
}

/// Dividend scale constants of a participating product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DividendConfig {
    /// Added to the declared-minus-assumed rate spread
    pub bonus_loading: f64,

    /// Terminal dividend rate at full ramp
    pub terminal_rate: f64,

    /// First policy year a terminal dividend is payable
    pub terminal_start_year: u32,

    /// Ramp multiplier is (year - offset) / ramp_years, capped at 1
    pub terminal_ramp_offset: u32,

    pub terminal_ramp_years: u32,
}

impl Default for DividendConfig {
    fn default() -> Self {
        Self {
            bonus_loading: 0.0,
            terminal_rate: 0.0,
            terminal_start_year: 11,
            terminal_ramp_offset: 5,
            terminal_ramp_years: 15,
        }
    }
}

/// How guaranteed schedule values relate to the policy being projected
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleBasis {
    /// Values are per `unit_face` of face amount
    PerUnitFace { unit_face: f64 },
    /// Values correspond to an annual premium of `base_premium`
    PerBasePremium { base_premium: f64 },
    /// Values are already in policy currency
    Absolute,
}

impl ScheduleBasis {
    /// Multiplier taking schedule values to policy values
    pub fn scale(&self, policy: &PolicyParameters) -> Result<f64> {
        match *self {
            ScheduleBasis::PerUnitFace { unit_face } if unit_face > 0.0 => {
                Ok(policy.face_amount / unit_face)
            }
            ScheduleBasis::PerBasePremium { base_premium } if base_premium > 0.0 => {
                Ok(policy.target_premium / base_premium)
            }
            ScheduleBasis::Absolute => Ok(1.0),
            _ => Err(ProjectionError::Configuration(format!(
                "schedule basis {:?} must have a positive unit",
                self
            ))),
        }
    }
}

/// Participating product settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticipatingConfig {
    pub horizon: Horizon,

    pub schedule_basis: ScheduleBasis,

    /// Dividend scale; `None` projects guaranteed values only
    pub dividends: Option<DividendConfig>,
}

impl Default for ParticipatingConfig {
    fn default() -> Self {
        Self {
            horizon: Horizon::AttainedAge(100),
            schedule_basis: ScheduleBasis::PerUnitFace { unit_face: 10_000.0 },
            dividends: Some(DividendConfig::default()),
        }
    }
}

/// What happens to the income of the loan-funded investment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalMode {
    /// Fund income pays the premium; any excess is paid out
    Offset,
    /// Fund income is reinvested at the fund yield
    Compound,
}

impl fmt::Display for WithdrawalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WithdrawalMode::Offset => f.write_str("offset"),
            WithdrawalMode::Compound => f.write_str("compound"),
        }
    }
}

impl FromStr for WithdrawalMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "offset" => Ok(WithdrawalMode::Offset),
            "compound" => Ok(WithdrawalMode::Compound),
            other => Err(format!("unknown withdrawal mode: {}", other)),
        }
    }
}

/// Policy-loan leverage strategy settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeverageConfig {
    pub mode: WithdrawalMode,

    /// Smallest new loan worth drawing; at 0 an empty draw still restarts the interval
    pub min_loan_threshold: f64,

    /// Minimum policy years between draws
    pub loan_interval_years: u32,

    /// Fraction of each draw lost to fees before investment
    pub loan_fee_rate: f64,

    /// Annual yield of the investment fund
    pub fund_yield_rate: f64,

    /// No new loans once the insured is older than this at year end
    pub max_borrow_age: u8,

    pub loan_limits: LoanLimitSchedule,

    /// Annual interest compounded onto the outstanding loan (0 = interest free)
    pub loan_interest_rate: f64,
}

impl Default for LeverageConfig {
    fn default() -> Self {
        Self {
            mode: WithdrawalMode::Offset,
            min_loan_threshold: 300_000.0,
            loan_interval_years: 3,
            loan_fee_rate: 0.05,
            fund_yield_rate: 0.07,
            max_borrow_age: 65,
            loan_limits: LoanLimitSchedule::pai(),
            loan_interest_rate: 0.0,
        }
    }
}

/// Complete configuration of a projection run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub universal_life: UniversalLifeConfig,
    pub participating: ParticipatingConfig,
    /// Leverage overlay; `None` leaves the policy unleveraged
    pub leverage: Option<LeverageConfig>,
}

impl RunConfig {
    /// Parse a run configuration from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a run configuration from a JSON file
    pub fn from_json_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}
