//! Projection engines for single and multi-policy projections

mod state;
mod engine;
mod cashflows;
mod dividend;
mod leverage;
pub mod config;

pub use state::RunningState;
pub use engine::{PolicyProjector, UniversalLifeProjector};
pub use cashflows::{ProjectionResult, ProjectionRow, ProjectionSummary, SettlementSnapshot};
pub use dividend::{
    AccrualInput, DividendAccrual, DividendPolicy, DividendYear, NoDividends, ParticipatingProjector,
};
pub use leverage::{
    CompoundReinvestment, LoanDecision, LoanLeverageStrategy, LoanPolicy, NoLoans, OffsetWithdrawal,
    StepLoanPolicy, WithdrawalPolicy,
};
pub use config::{
    DividendConfig, Horizon, LeverageConfig, ParticipatingConfig, RunConfig, ScheduleBasis,
    UniversalLifeConfig, WithdrawalMode,
};
