//! Policy Projection - year-by-year projections for universal-life and participating policies
//!
//! This library provides:
//! - Universal-life account-value projections driven by a COI rate table
//! - Participating projections of guaranteed schedules plus dividend accrual
//! - Policy-loan leverage overlays (dividend offset or compounding reinvestment)
//! - Rate-table, PDATA schedule and policy batch loaders
//! - Batch and multi-scenario runs across threads

pub mod error;
pub mod policy;
pub mod assumptions;
pub mod projection;
pub mod scenario;

// Re-export commonly used types
pub use error::{ProjectionError, Result};
pub use policy::{Gender, PolicyParameters};
pub use assumptions::{Assumptions, GuaranteedSchedule, RateSource, RateTable, ReferenceProduct};
pub use projection::{
    LoanLeverageStrategy, ParticipatingProjector, PolicyProjector, ProjectionResult, ProjectionRow,
    RunConfig, UniversalLifeProjector,
};
pub use scenario::ScenarioRunner;
