//! Load batches of policy parameters from CSV

use super::{Gender, PolicyParameters};
use crate::error::Result;
use csv::Reader;
use std::path::Path;

/// Raw CSV row matching the policy batch columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "PolicyId")]
    policy_id: u32,
    #[serde(rename = "IssueAge")]
    issue_age: u8,
    #[serde(rename = "Gender")]
    gender: String,
    #[serde(rename = "TargetPremium")]
    target_premium: f64,
    #[serde(rename = "FaceAmount")]
    face_amount: f64,
    #[serde(rename = "PaymentTerm")]
    payment_term: u32,
    #[serde(rename = "DeclaredRate")]
    declared_rate: f64,
    #[serde(rename = "AssumedRate", default)]
    assumed_rate: f64,
}

impl CsvRow {
    fn to_policy(self) -> Result<PolicyParameters> {
        let gender: Gender = self.gender.parse()?;
        Ok(PolicyParameters {
            policy_id: self.policy_id,
            issue_age: self.issue_age,
            gender,
            target_premium: self.target_premium,
            face_amount: self.face_amount,
            payment_term_years: self.payment_term,
            declared_rate: self.declared_rate,
            assumed_rate: self.assumed_rate,
        })
    }
}

/// Load all policies from a CSV file
pub fn load_policies<P: AsRef<Path>>(path: P) -> Result<Vec<PolicyParameters>> {
    let file = std::fs::File::open(path)?;
    load_policies_from_reader(file)
}

/// Load policies from any reader (e.g., string buffer, network stream)
pub fn load_policies_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<PolicyParameters>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut policies = Vec::new();

    for result in csv_reader.deserialize() {
        let row: CsvRow = result?;
        policies.push(row.to_policy()?);
    }

    log::info!("Loaded {} policies", policies.len());
    Ok(policies)
}
