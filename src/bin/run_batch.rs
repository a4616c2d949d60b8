//! Run universal-life projections for every policy in a policy CSV
//!
//! Outputs one summary row per policy

use anyhow::{Context, Result};
use clap::Parser;
use policy_projection::policy::load_policies;
use policy_projection::projection::ProjectionSummary;
use policy_projection::{RunConfig, ScenarioRunner};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "run_batch", about = "Project a block of universal-life policies")]
struct Cli {
    /// Policy CSV (PolicyId,IssueAge,Gender,TargetPremium,FaceAmount,PaymentTerm,DeclaredRate,AssumedRate)
    #[arg(long, default_value = "data/policies.csv")]
    policies: PathBuf,

    /// COI rate table CSV; embedded table when omitted
    #[arg(long)]
    rate_table: Option<PathBuf>,

    /// JSON run configuration
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value = "batch_summary.csv")]
    output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let start = Instant::now();
    println!("Loading policies from {}...", cli.policies.display());

    let policies = load_policies(&cli.policies)
        .with_context(|| format!("Failed to load policies from {}", cli.policies.display()))?;
    println!("Loaded {} policies in {:?}", policies.len(), start.elapsed());

    let runner = match &cli.rate_table {
        Some(path) => ScenarioRunner::from_csv_path(path)
            .with_context(|| format!("Failed to load rate table {}", path.display()))?,
        None => ScenarioRunner::new(),
    };
    let config = match &cli.config {
        Some(path) => RunConfig::from_json_path(path)
            .with_context(|| format!("Failed to load run configuration {}", path.display()))?,
        None => RunConfig::default(),
    };
    let runner = runner.with_config(config);

    println!("Running projections...");
    let proj_start = Instant::now();
    let results = runner.run_ul_batch(&policies);
    println!("Projections complete in {:?}", proj_start.elapsed());

    let mut summaries: Vec<ProjectionSummary> = Vec::with_capacity(results.len());
    let mut failures = 0usize;
    for (policy, result) in policies.iter().zip(results) {
        match result {
            Ok(result) => summaries.push(result.summary()),
            Err(err) => {
                failures += 1;
                log::warn!("Policy {} failed: {}", policy.policy_id, err);
            }
        }
    }

    let mut writer = csv::Writer::from_path(&cli.output)
        .with_context(|| format!("Unable to create {}", cli.output.display()))?;
    for summary in &summaries {
        writer.serialize(summary)?;
    }
    writer.flush()?;

    let total_premium: f64 = summaries.iter().map(|s| s.total_premium).sum();
    let total_coi: f64 = summaries.iter().map(|s| s.total_insurance_cost).sum();
    let total_av: f64 = summaries.iter().map(|s| s.final_account_value).sum();

    println!("\nResults written to: {}", cli.output.display());
    println!("\nBlock Summary:");
    println!("  Policies Projected: {}", summaries.len());
    println!("  Policies Failed: {}", failures);
    println!("  Total Premium: ${:.2}", total_premium);
    println!("  Total COI: ${:.2}", total_coi);
    println!("  Total Final AV: ${:.2}", total_av);
    println!("\nTotal time: {:?}", start.elapsed());

    Ok(())
}
