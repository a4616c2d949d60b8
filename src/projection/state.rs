//! Running state carried from one policy year to the next

/// Mutable accumulators of a single projection run
///
/// Owned by exactly one run and reset per run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunningState {
    /// Policy year just completed (0 before the first year)
    pub policy_year: u32,

    /// Account value carried into the next year
    pub account_value: f64,

    /// Outstanding policy loan
    pub current_loan: f64,

    /// Net loan proceeds invested in the side fund
    pub fund_principal: f64,

    pub accumulated_dividend: f64,

    /// Excess fund income paid out (offset mode)
    pub cumulative_cash_out: f64,

    /// Premium shortfall not covered by fund income (offset mode)
    pub cumulative_real_cost: f64,

    /// Reinvested fund income (compound mode)
    pub accumulated_wealth: f64,

    pub cumulative_premium: f64,

    /// Policy year of the most recent loan draw
    pub last_borrow_year: Option<u32>,
}

impl RunningState {
    /// Fresh state for a new run
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to the next policy year and return it
    pub fn advance_year(&mut self) -> u32 {
        self.policy_year += 1;
        self.policy_year
    }

    /// Whether a loan has ever been drawn
    pub fn has_borrowed(&self) -> bool {
        self.last_borrow_year.is_some()
    }

    /// Policy years since the last loan draw
    pub fn years_since_borrow(&self, policy_year: u32) -> Option<u32> {
        self.last_borrow_year
            .map(|last| policy_year.saturating_sub(last))
    }

    /// Record a loan draw and invest the proceeds net of fees
    pub fn draw_loan(&mut self, policy_year: u32, amount: f64, fee_rate: f64) {
        self.current_loan += amount;
        self.fund_principal += amount * (1.0 - fee_rate);
        self.last_borrow_year = Some(policy_year);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_state() {
        let state = RunningState::new();
        assert_eq!(state.policy_year, 0);
        assert_eq!(state.account_value, 0.0);
        assert!(!state.has_borrowed());
        assert_eq!(state.years_since_borrow(5), None);
    }

    #[test]
    fn test_advance_year() {
        let mut state = RunningState::new();
        assert_eq!(state.advance_year(), 1);
        assert_eq!(state.advance_year(), 2);
    }

    #[test]
    fn test_draw_loan_nets_fee() {
        let mut state = RunningState::new();
        state.draw_loan(4, 400_000.0, 0.05);

        assert_eq!(state.current_loan, 400_000.0);
        assert_eq!(state.fund_principal, 380_000.0);
        assert_eq!(state.last_borrow_year, Some(4));
        assert_eq!(state.years_since_borrow(7), Some(3));
    }
}
