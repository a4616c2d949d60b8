//! Policy Projection CLI
//!
//! Command-line interface for running single-policy projections

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use policy_projection::assumptions::loader::{load_pdata, load_rate_table};
use policy_projection::projection::{LeverageConfig, WithdrawalMode};
use policy_projection::{
    Assumptions, Gender, PolicyParameters, ProjectionResult, ReferenceProduct, RunConfig,
    ScenarioRunner,
};
use std::path::{Path, PathBuf};

/// Age at which the leveraged position is settled for the summary
const SETTLEMENT_AGE: u8 = 65;

#[derive(Parser, Debug)]
#[command(
    name = "policy_projection",
    version,
    about = "Year-by-year projections for universal-life and participating policies"
)]
struct Cli {
    /// JSON run configuration; flags below override its values
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Where to write the full projection
    #[arg(long, global = true, default_value = "projection_output.csv")]
    output: PathBuf,

    /// Number of rows printed to the console
    #[arg(long, global = true, default_value_t = 20)]
    show_rows: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Non-participating universal-life projection
    Ul(UlArgs),
    /// Participating projection with dividend accrual
    Participating(ParticipatingArgs),
    /// Policy-loan leverage on a reference illustration
    Leverage(LeverageArgs),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliGender {
    Male,
    Female,
}

impl From<CliGender> for Gender {
    fn from(value: CliGender) -> Self {
        match value {
            CliGender::Male => Gender::Male,
            CliGender::Female => Gender::Female,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliMode {
    Offset,
    Compound,
}

impl From<CliMode> for WithdrawalMode {
    fn from(value: CliMode) -> Self {
        match value {
            CliMode::Offset => WithdrawalMode::Offset,
            CliMode::Compound => WithdrawalMode::Compound,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliProduct {
    Pai,
    Iat2,
}

impl From<CliProduct> for ReferenceProduct {
    fn from(value: CliProduct) -> Self {
        match value {
            CliProduct::Pai => ReferenceProduct::Pai,
            CliProduct::Iat2 => ReferenceProduct::Iat2,
        }
    }
}

#[derive(Args, Debug)]
struct UlArgs {
    #[arg(long)]
    age: u8,
    #[arg(long, value_enum, default_value_t = CliGender::Male)]
    gender: CliGender,
    /// Annual target premium
    #[arg(long)]
    premium: f64,
    #[arg(long)]
    face: f64,
    /// Premium-paying term in years
    #[arg(long, default_value_t = 20)]
    term: u32,
    /// Declared crediting rate, e.g. 0.045
    #[arg(long, default_value_t = 0.045)]
    rate: f64,
    /// COI rate table CSV (Age, Male, Female); embedded table when omitted
    #[arg(long)]
    rate_table: Option<PathBuf>,
    #[arg(long)]
    max_age: Option<u8>,
    #[arg(long)]
    coi_loading: Option<f64>,
}

#[derive(Args, Debug)]
struct ParticipatingArgs {
    #[arg(long)]
    age: u8,
    #[arg(long, value_enum, default_value_t = CliGender::Male)]
    gender: CliGender,
    #[arg(long)]
    face: f64,
    /// Annual premium; priced from the PDATA premium rates when omitted
    #[arg(long)]
    premium: Option<f64>,
    #[arg(long, default_value_t = 20)]
    term: u32,
    /// PDATA export with premium rates and guaranteed schedules
    #[arg(long)]
    pdata: Option<PathBuf>,
    /// Embedded illustration used when no PDATA file is given
    #[arg(long, value_enum, default_value_t = CliProduct::Pai)]
    product: CliProduct,
    #[arg(long, default_value_t = 0.0)]
    declared: f64,
    #[arg(long, default_value_t = 0.0)]
    assumed: f64,
    #[arg(long)]
    bonus_loading: Option<f64>,
    #[arg(long)]
    terminal_rate: Option<f64>,
}

#[derive(Args, Debug)]
struct LeverageArgs {
    #[arg(long, value_enum, default_value_t = CliProduct::Pai)]
    product: CliProduct,
    #[arg(long)]
    age: u8,
    #[arg(long, value_enum, default_value_t = CliGender::Male)]
    gender: CliGender,
    #[arg(long)]
    monthly_deposit: f64,
    #[arg(long, value_enum, default_value_t = CliMode::Offset)]
    mode: CliMode,
    #[arg(long)]
    min_loan: Option<f64>,
    #[arg(long)]
    loan_interval: Option<u32>,
    #[arg(long)]
    loan_fee: Option<f64>,
    #[arg(long)]
    fund_yield: Option<f64>,
    #[arg(long)]
    loan_interest: Option<f64>,
}

fn load_config(path: Option<&Path>) -> Result<RunConfig> {
    match path {
        Some(path) => RunConfig::from_json_path(path)
            .with_context(|| format!("Failed to load run configuration {}", path.display())),
        None => Ok(RunConfig::default()),
    }
}

fn run_ul(args: &UlArgs, mut config: RunConfig) -> Result<ProjectionResult> {
    if let Some(max_age) = args.max_age {
        config.universal_life.max_age = max_age;
    }
    if let Some(coi_loading) = args.coi_loading {
        config.universal_life.coi_loading = coi_loading;
    }

    let assumptions = match &args.rate_table {
        Some(path) => Assumptions {
            coi_rates: load_rate_table(path)
                .with_context(|| format!("Failed to load rate table {}", path.display()))?,
            policy_data: None,
        },
        None => Assumptions::default_pricing(),
    };

    let policy = PolicyParameters::new(
        args.age,
        args.gender.into(),
        args.premium,
        args.face,
        args.term,
        args.rate,
        0.0,
    );
    print_policy(&policy);

    let runner = ScenarioRunner::with_assumptions(assumptions).with_config(config);
    Ok(runner.run_ul(&policy)?)
}

fn run_participating(args: &ParticipatingArgs, mut config: RunConfig) -> Result<ProjectionResult> {
    let mut dividends = config.participating.dividends.take().unwrap_or_default();
    if let Some(bonus_loading) = args.bonus_loading {
        dividends.bonus_loading = bonus_loading;
    }
    if let Some(terminal_rate) = args.terminal_rate {
        dividends.terminal_rate = terminal_rate;
    }
    config.participating.dividends = Some(dividends);

    let policy = PolicyParameters::new(
        args.age,
        args.gender.into(),
        args.premium.unwrap_or(0.0),
        args.face,
        args.term,
        args.declared,
        args.assumed,
    );

    match &args.pdata {
        Some(path) => {
            let data = load_pdata(path)
                .with_context(|| format!("Failed to load PDATA file {}", path.display()))?;
            let runner = ScenarioRunner::with_assumptions(
                Assumptions::default_pricing().with_policy_data(data),
            )
            .with_config(config);

            let policy = match args.premium {
                Some(_) => policy,
                None => runner.priced_policy(&policy)?,
            };
            print_policy(&policy);
            Ok(runner.run_participating(&policy)?)
        }
        None => {
            let product = ReferenceProduct::from(args.product);
            let policy = PolicyParameters {
                target_premium: args.premium.unwrap_or_else(|| product.base_premium()),
                ..policy
            };
            print_policy(&policy);
            let runner = ScenarioRunner::new().with_config(config);
            Ok(runner.run_reference(product, &policy)?)
        }
    }
}

fn run_leverage(args: &LeverageArgs, mut config: RunConfig) -> Result<ProjectionResult> {
    let mut leverage: LeverageConfig = config.leverage.take().unwrap_or_default();
    leverage.mode = args.mode.into();
    if let Some(min_loan) = args.min_loan {
        leverage.min_loan_threshold = min_loan;
    }
    if let Some(loan_interval) = args.loan_interval {
        leverage.loan_interval_years = loan_interval;
    }
    if let Some(loan_fee) = args.loan_fee {
        leverage.loan_fee_rate = loan_fee;
    }
    if let Some(fund_yield) = args.fund_yield {
        leverage.fund_yield_rate = fund_yield;
    }
    if let Some(loan_interest) = args.loan_interest {
        leverage.loan_interest_rate = loan_interest;
    }
    config.leverage = Some(leverage);

    let product = ReferenceProduct::from(args.product);
    println!("Product: {}", product);
    println!("  Issue Age: {}", args.age);
    println!("  Monthly Deposit: ${:.2}", args.monthly_deposit);
    println!("  Mode: {}", WithdrawalMode::from(args.mode));
    println!();

    let runner = ScenarioRunner::new().with_config(config);
    Ok(runner.run_reference_leverage(product, args.age, args.gender.into(), args.monthly_deposit)?)
}

fn print_policy(policy: &PolicyParameters) {
    println!("Policy:");
    println!("  Issue Age: {}", policy.issue_age);
    println!("  Gender: {}", policy.gender);
    println!("  Annual Premium: ${:.2}", policy.target_premium);
    println!("  Face Amount: ${:.2}", policy.face_amount);
    println!("  Payment Term: {} years", policy.payment_term_years);
    println!();
}

fn print_rows(result: &ProjectionResult, show_rows: usize) {
    println!("Projection Results ({} years):", result.rows.len());
    println!(
        "{:>4} {:>4} {:>12} {:>12} {:>14} {:>14} {:>14} {:>14} {:>14}",
        "PY", "Age", "Premium", "COI", "Cash Value", "Death Benefit", "Loan", "Fund", "Net Worth"
    );
    println!("{}", "-".repeat(112));

    for row in result.rows.iter().take(show_rows) {
        println!(
            "{:>4} {:>4} {:>12.2} {:>12.2} {:>14.2} {:>14.2} {:>14.2} {:>14.2} {:>14.2}",
            row.policy_year,
            row.attained_age,
            row.gross_premium,
            row.insurance_cost,
            row.account_value_end,
            row.total_death_benefit,
            row.loan_balance,
            row.fund_principal,
            row.net_worth,
        );
    }

    if result.rows.len() > show_rows {
        println!("... ({} more years)", result.rows.len() - show_rows);
    }
}

fn write_csv(path: &Path, result: &ProjectionResult) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Unable to create {}", path.display()))?;
    for row in &result.rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn print_summary(result: &ProjectionResult) {
    let summary = result.summary();
    println!("\nSummary:");
    println!("  Years Projected: {}", summary.years_projected);
    println!("  Total Premium: ${:.2}", summary.total_premium);
    println!("  Total COI: ${:.2}", summary.total_insurance_cost);
    println!("  Total Dividends: ${:.2}", summary.total_dividends);
    println!("  Final Cash Value: ${:.2}", summary.final_account_value);
    println!("  Final Death Benefit: ${:.2}", summary.final_death_benefit);
    println!("  Max Loan: ${:.2}", summary.max_loan);
    println!("  Final Net Worth: ${:.2}", summary.final_net_worth);

    if summary.max_loan > 0.0 {
        match result.snapshot_at_age(SETTLEMENT_AGE) {
            Some(snapshot) => {
                println!("\nSettlement at age {} (policy year {}):", snapshot.age, snapshot.policy_year);
                println!("  Cash Value: ${:.2}", snapshot.cash_value);
                println!("  Loan Balance: ${:.2}", snapshot.loan_balance);
                println!("  Fund Principal: ${:.2}", snapshot.fund_principal);
                println!("  Cumulative Cash Out: ${:.2}", snapshot.cumulative_cash_out);
                println!("  Cumulative Real Cost: ${:.2}", snapshot.cumulative_real_cost);
                println!("  Accumulated Wealth: ${:.2}", snapshot.accumulated_wealth);
                println!("  Net Worth: ${:.2}", snapshot.net_worth);
            }
            None => println!("\nAge {} is outside the projection", SETTLEMENT_AGE),
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    println!("Policy Projection v{}", env!("CARGO_PKG_VERSION"));
    println!("======================\n");

    let config = load_config(cli.config.as_deref())?;
    let result = match &cli.command {
        Command::Ul(args) => run_ul(args, config)?,
        Command::Participating(args) => run_participating(args, config)?,
        Command::Leverage(args) => run_leverage(args, config)?,
    };

    print_rows(&result, cli.show_rows);
    write_csv(&cli.output, &result)?;
    println!("\nFull results written to: {}", cli.output.display());
    print_summary(&result);

    Ok(())
}
