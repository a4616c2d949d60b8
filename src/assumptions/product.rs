//! Product constants: premium expense tiers and policy-loan limits

use serde::{Deserialize, Serialize};

/// Premium expense rates by policy year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PremiumExpenseSchedule {
    /// Expense rates by policy year (1-indexed); zero beyond the last entry
    rates: Vec<f64>,
}

impl PremiumExpenseSchedule {
    pub fn new(rates: Vec<f64>) -> Self {
        Self { rates }
    }

    /// Five-year front-loaded schedule of the reference UL product
    pub fn default_ul() -> Self {
        Self {
            rates: vec![
                0.58, // Year 1
                0.33, // Year 2
                0.23, // Year 3
                0.13, // Year 4
                0.13, // Year 5
            ],
        }
    }

    /// Expense rate for a policy year
    pub fn get_rate(&self, policy_year: u32) -> f64 {
        if policy_year == 0 {
            return 0.0;
        }
        let idx = (policy_year - 1) as usize;
        self.rates.get(idx).copied().unwrap_or(0.0)
    }

    /// Premium expense charged on a gross premium
    pub fn expense(&self, policy_year: u32, gross_premium: f64) -> f64 {
        gross_premium * self.get_rate(policy_year)
    }
}

impl Default for PremiumExpenseSchedule {
    fn default() -> Self {
        Self::default_ul()
    }
}

/// One step of a loan-limit schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanLimitStep {
    /// First policy year the rate applies to
    pub from_year: u32,
    /// Maximum loan as a fraction of cash value
    pub rate: f64,
}

/// Maximum loan-to-cash-value ratio as a step function of policy year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanLimitSchedule {
    /// Steps in ascending `from_year` order
    steps: Vec<LoanLimitStep>,
}

impl LoanLimitSchedule {
    pub fn new(mut steps: Vec<LoanLimitStep>) -> Self {
        steps.sort_by_key(|s| s.from_year);
        Self { steps }
    }

    /// Single rate for every policy year
    pub fn flat(rate: f64) -> Self {
        Self::new(vec![LoanLimitStep { from_year: 0, rate }])
    }

    /// PAI: 70% below year 6, rising two years at a time to 90% from year 12
    pub fn pai() -> Self {
        Self::new(vec![
            LoanLimitStep { from_year: 0, rate: 0.70 },
            LoanLimitStep { from_year: 6, rate: 0.75 },
            LoanLimitStep { from_year: 8, rate: 0.80 },
            LoanLimitStep { from_year: 10, rate: 0.85 },
            LoanLimitStep { from_year: 12, rate: 0.90 },
        ])
    }

    /// IAT2: 75/80/85% in years 1/2/3, 90% from year 4
    pub fn iat2() -> Self {
        Self::new(vec![
            LoanLimitStep { from_year: 1, rate: 0.75 },
            LoanLimitStep { from_year: 2, rate: 0.80 },
            LoanLimitStep { from_year: 3, rate: 0.85 },
            LoanLimitStep { from_year: 4, rate: 0.90 },
        ])
    }

    /// Loan limit rate for a policy year (0 before the first step)
    pub fn rate(&self, policy_year: u32) -> f64 {
        self.steps
            .iter()
            .filter(|s| s.from_year <= policy_year)
            .max_by_key(|s| s.from_year)
            .map(|s| s.rate)
            .unwrap_or(0.0)
    }
}

impl Default for LoanLimitSchedule {
    fn default() -> Self {
        Self::pai()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expense_tiers() {
        let schedule = PremiumExpenseSchedule::default_ul();

        assert_eq!(schedule.get_rate(1), 0.58);
        assert_eq!(schedule.get_rate(3), 0.23);
        assert_eq!(schedule.get_rate(5), 0.13);
        assert_eq!(schedule.get_rate(6), 0.0);
        assert_eq!(schedule.get_rate(0), 0.0);
        assert_eq!(schedule.expense(1, 120_000.0), 69_600.0);
    }

    #[test]
    fn test_pai_loan_limits() {
        let limits = LoanLimitSchedule::pai();

        assert_eq!(limits.rate(1), 0.70);
        assert_eq!(limits.rate(5), 0.70);
        assert_eq!(limits.rate(6), 0.75);
        assert_eq!(limits.rate(9), 0.80);
        assert_eq!(limits.rate(11), 0.85);
        assert_eq!(limits.rate(12), 0.90);
        assert_eq!(limits.rate(40), 0.90);
    }

    #[test]
    fn test_iat2_loan_limits() {
        let limits = LoanLimitSchedule::iat2();

        assert_eq!(limits.rate(0), 0.0);
        assert_eq!(limits.rate(1), 0.75);
        assert_eq!(limits.rate(2), 0.80);
        assert_eq!(limits.rate(3), 0.85);
        assert_eq!(limits.rate(4), 0.90);
        assert_eq!(limits.rate(30), 0.90);
    }

    #[test]
    fn test_steps_sorted_on_construction() {
        let limits = LoanLimitSchedule::new(vec![
            LoanLimitStep { from_year: 5, rate: 0.9 },
            LoanLimitStep { from_year: 1, rate: 0.5 },
        ]);
        assert_eq!(limits.rate(3), 0.5);
        assert_eq!(limits.rate(5), 0.9);
    }
}
