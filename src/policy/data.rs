//! Policy data structures for a single projection run

use crate::error::{ProjectionError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Gender of the insured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Decode the numeric sex code used by insurer rate files (1 = male, 2 = female)
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Gender::Male),
            2 => Some(Gender::Female),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = ProjectionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "Male" | "male" | "M" | "m" | "1" | "男" | "男性" => Ok(Gender::Male),
            "Female" | "female" | "F" | "f" | "2" | "女" | "女性" => Ok(Gender::Female),
            other => Err(ProjectionError::Parse {
                context: "gender".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Immutable inputs to one projection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyParameters {
    /// Identifier carried through to results (0 for ad-hoc runs)
    #[serde(default)]
    pub policy_id: u32,

    /// Age at issue
    pub issue_age: u8,

    pub gender: Gender,

    /// Annual target premium (or annual deposit)
    pub target_premium: f64,

    /// Basic sum assured
    pub face_amount: f64,

    /// Number of years premiums are payable
    pub payment_term_years: u32,

    /// Declared crediting rate (UL interest, participating declared rate)
    pub declared_rate: f64,

    /// Assumed (pricing) rate of a participating product
    pub assumed_rate: f64,
}

impl PolicyParameters {
    pub fn new(
        issue_age: u8,
        gender: Gender,
        target_premium: f64,
        face_amount: f64,
        payment_term_years: u32,
        declared_rate: f64,
        assumed_rate: f64,
    ) -> Self {
        Self {
            policy_id: 0,
            issue_age,
            gender,
            target_premium,
            face_amount,
            payment_term_years,
            declared_rate,
            assumed_rate,
        }
    }

    /// Premium payable in a policy year (1-indexed)
    pub fn premium_for_year(&self, policy_year: u32) -> f64 {
        if policy_year <= self.payment_term_years {
            self.target_premium
        } else {
            0.0
        }
    }

    /// Attained age during a policy year
    pub fn attained_age(&self, policy_year: u32) -> u8 {
        self.issue_age.saturating_add(policy_year.saturating_sub(1).min(u8::MAX as u32) as u8)
    }

    /// Attained age at the end of a policy year
    pub fn age_at_year_end(&self, policy_year: u32) -> u8 {
        self.issue_age.saturating_add(policy_year.min(u8::MAX as u32) as u8)
    }

    /// Number of policy years from issue up to and including `max_age`
    pub fn years_to_age(&self, max_age: u8) -> u32 {
        (max_age as u32 + 1).saturating_sub(self.issue_age as u32)
    }

    /// Reject parameters no projection can run on
    pub fn validate(&self, max_age: u8) -> Result<()> {
        if self.issue_age > max_age {
            return Err(ProjectionError::InvalidParameter {
                name: "issue_age",
                reason: format!("{} exceeds projection horizon age {}", self.issue_age, max_age),
            });
        }
        if self.target_premium.is_nan() || self.target_premium < 0.0 {
            return Err(ProjectionError::InvalidParameter {
                name: "target_premium",
                reason: format!("{} is negative or not a number", self.target_premium),
            });
        }
        if self.face_amount.is_nan() || self.face_amount < 0.0 {
            return Err(ProjectionError::InvalidParameter {
                name: "face_amount",
                reason: format!("{} is negative or not a number", self.face_amount),
            });
        }
        if self.payment_term_years == 0 {
            return Err(ProjectionError::InvalidParameter {
                name: "payment_term_years",
                reason: "must be at least one year".to_string(),
            });
        }
        for (name, rate) in [("declared_rate", self.declared_rate), ("assumed_rate", self.assumed_rate)] {
            if rate.is_nan() || rate <= -1.0 {
                return Err(ProjectionError::InvalidParameter {
                    name,
                    reason: format!("{} must be greater than -100%", rate),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PolicyParameters {
        PolicyParameters::new(31, Gender::Male, 120_000.0, 12_000_000.0, 20, 0.08, 0.0)
    }

    #[test]
    fn test_premium_stops_after_term() {
        let policy = sample();
        assert_eq!(policy.premium_for_year(1), 120_000.0);
        assert_eq!(policy.premium_for_year(20), 120_000.0);
        assert_eq!(policy.premium_for_year(21), 0.0);
    }

    #[test]
    fn test_attained_ages() {
        let policy = sample();
        assert_eq!(policy.attained_age(1), 31);
        assert_eq!(policy.age_at_year_end(1), 32);
        assert_eq!(policy.years_to_age(100), 70);
    }

    #[test]
    fn test_gender_parsing() {
        assert_eq!("男性".parse::<Gender>().unwrap(), Gender::Male);
        assert_eq!("Female".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!(Gender::from_code(2), Some(Gender::Female));
        assert!("X".parse::<Gender>().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_inputs() {
        assert!(sample().validate(100).is_ok());

        let mut too_old = sample();
        too_old.issue_age = 101;
        assert!(too_old.validate(100).is_err());

        let mut no_term = sample();
        no_term.payment_term_years = 0;
        assert!(no_term.validate(100).is_err());

        let mut negative = sample();
        negative.target_premium = -1.0;
        assert!(negative.validate(100).is_err());
    }
}
