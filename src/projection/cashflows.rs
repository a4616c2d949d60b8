//! Projection output structures

use serde::{Deserialize, Serialize};

/// A single row of projection output for one policy year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionRow {
    // Timing
    pub policy_year: u32,
    pub attained_age: u8,

    // Premium and charges
    pub gross_premium: f64,
    pub premium_expense: f64,
    pub net_premium: f64,
    pub admin_fee: f64,
    pub coi_rate: f64,
    pub net_amount_at_risk: f64,
    pub insurance_cost: f64,
    pub cumulative_premium: f64,

    // Values (account value is the total cash value for participating policies)
    pub account_value_end: f64,
    pub death_benefit: f64,
    pub guaranteed_cash_value: f64,
    pub guaranteed_death_benefit: f64,

    // Dividends
    pub dividend: f64,
    pub accumulated_dividend: f64,
    pub terminal_dividend: f64,

    // Policy loan
    pub loan_limit_rate: f64,
    pub loan_drawn: f64,
    pub borrowed: bool,
    pub loan_balance: f64,

    // Side fund
    pub fund_principal: f64,
    pub fund_income: f64,
    /// Premium less fund income; negative when income is paid out
    pub actual_payment: f64,
    pub cumulative_real_cost: f64,
    pub cumulative_cash_out: f64,
    pub accumulated_wealth: f64,

    // Summary
    pub net_worth: f64,
    pub total_death_benefit: f64,
}

impl ProjectionRow {
    /// Create a new row with zeroed values
    pub fn new(policy_year: u32, attained_age: u8) -> Self {
        Self {
            policy_year,
            attained_age,
            gross_premium: 0.0,
            premium_expense: 0.0,
            net_premium: 0.0,
            admin_fee: 0.0,
            coi_rate: 0.0,
            net_amount_at_risk: 0.0,
            insurance_cost: 0.0,
            cumulative_premium: 0.0,
            account_value_end: 0.0,
            death_benefit: 0.0,
            guaranteed_cash_value: 0.0,
            guaranteed_death_benefit: 0.0,
            dividend: 0.0,
            accumulated_dividend: 0.0,
            terminal_dividend: 0.0,
            loan_limit_rate: 0.0,
            loan_drawn: 0.0,
            borrowed: false,
            loan_balance: 0.0,
            fund_principal: 0.0,
            fund_income: 0.0,
            actual_payment: 0.0,
            cumulative_real_cost: 0.0,
            cumulative_cash_out: 0.0,
            accumulated_wealth: 0.0,
            net_worth: 0.0,
            total_death_benefit: 0.0,
        }
    }

    /// Net worth and total death benefit of a policy without leverage
    pub fn settle_unleveraged(&mut self) {
        self.net_worth = self.account_value_end;
        self.total_death_benefit = self.death_benefit;
    }
}

/// Complete projection result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    /// Policy identifier
    pub policy_id: u32,

    pub issue_age: u8,

    /// Rows in policy-year order
    pub rows: Vec<ProjectionRow>,
}

impl ProjectionResult {
    pub fn new(policy_id: u32, issue_age: u8) -> Self {
        Self {
            policy_id,
            issue_age,
            rows: Vec::new(),
        }
    }

    /// Add a projection row
    pub fn add_row(&mut self, row: ProjectionRow) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cash value series, one entry per policy year
    pub fn cash_values(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.account_value_end).collect()
    }

    /// Death benefit series, one entry per policy year
    pub fn death_benefits(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.death_benefit).collect()
    }

    /// Get summary statistics
    pub fn summary(&self) -> ProjectionSummary {
        let total_premium: f64 = self.rows.iter().map(|r| r.gross_premium).sum();
        let total_insurance_cost: f64 = self.rows.iter().map(|r| r.insurance_cost).sum();
        let total_dividends: f64 = self.rows.iter().map(|r| r.dividend).sum();
        let total_fund_income: f64 = self.rows.iter().map(|r| r.fund_income).sum();
        let max_loan = self.rows.iter().map(|r| r.loan_balance).fold(0.0, f64::max);

        let last = self.rows.last();

        ProjectionSummary {
            policy_id: self.policy_id,
            years_projected: self.rows.len() as u32,
            total_premium,
            total_insurance_cost,
            total_dividends,
            total_fund_income,
            final_account_value: last.map(|r| r.account_value_end).unwrap_or(0.0),
            final_death_benefit: last.map(|r| r.total_death_benefit).unwrap_or(0.0),
            final_loan: last.map(|r| r.loan_balance).unwrap_or(0.0),
            max_loan,
            final_net_worth: last.map(|r| r.net_worth).unwrap_or(0.0),
        }
    }

    /// Position at the end of the policy year in which the insured reaches `age`
    pub fn snapshot_at_age(&self, age: u8) -> Option<SettlementSnapshot> {
        self.rows
            .iter()
            .find(|r| self.issue_age as u32 + r.policy_year == age as u32)
            .map(|r| SettlementSnapshot {
                policy_year: r.policy_year,
                age,
                cash_value: r.account_value_end,
                loan_balance: r.loan_balance,
                fund_principal: r.fund_principal,
                cumulative_cash_out: r.cumulative_cash_out,
                cumulative_real_cost: r.cumulative_real_cost,
                accumulated_wealth: r.accumulated_wealth,
                net_worth: r.net_worth,
            })
    }
}

/// Summary statistics for a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub policy_id: u32,
    pub years_projected: u32,
    pub total_premium: f64,
    pub total_insurance_cost: f64,
    pub total_dividends: f64,
    pub total_fund_income: f64,
    pub final_account_value: f64,
    pub final_death_benefit: f64,
    pub final_loan: f64,
    pub max_loan: f64,
    pub final_net_worth: f64,
}

/// Balance-sheet view of a leveraged policy at a given age
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementSnapshot {
    pub policy_year: u32,
    pub age: u8,
    pub cash_value: f64,
    pub loan_balance: f64,
    pub fund_principal: f64,
    pub cumulative_cash_out: f64,
    pub cumulative_real_cost: f64,
    pub accumulated_wealth: f64,
    pub net_worth: f64,
}
