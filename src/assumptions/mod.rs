//! Rate tables, guaranteed schedules and product constants

mod rates;
mod product;
mod schedule;
mod reference;
pub mod loader;

pub use rates::{RateSource, RateTable, RateRow};
pub use product::{PremiumExpenseSchedule, LoanLimitSchedule, LoanLimitStep};
pub use schedule::{GuaranteedSchedule, ScheduleSet};
pub use reference::{ReferenceProduct, default_coi_table};
pub use loader::{PdataLayout, PolicyDataSet};

use crate::error::Result;
use std::path::Path;

/// Container for the tables a projection run reads
///
/// Loaded once; never mutated while projections run.
#[derive(Debug, Clone)]
pub struct Assumptions {
    /// Cost-of-insurance rates per 1,000 of net amount at risk
    pub coi_rates: RateTable,

    /// Premium rates and guaranteed schedules of a participating product
    pub policy_data: Option<PolicyDataSet>,
}

impl Assumptions {
    /// Embedded default COI table, no participating data
    pub fn default_pricing() -> Self {
        Self {
            coi_rates: default_coi_table(),
            policy_data: None,
        }
    }

    /// Load the COI table from a specific file
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        Ok(Self {
            coi_rates: loader::load_rate_table(path)?,
            policy_data: None,
        })
    }

    /// Attach a PDATA export for participating projections
    pub fn with_policy_data(mut self, policy_data: PolicyDataSet) -> Self {
        self.policy_data = Some(policy_data);
        self
    }
}

impl Default for Assumptions {
    fn default() -> Self {
        Self::default_pricing()
    }
}
