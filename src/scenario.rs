//! Scenario runner for efficient batch projections
//!
//! Pre-loads assumptions once, then runs many independent projections
//! against them. Runs share no mutable state, so batches are spread across
//! threads with rayon; a single run is always sequential.

use crate::assumptions::{Assumptions, GuaranteedSchedule, PolicyDataSet, ReferenceProduct};
use crate::error::{ProjectionError, Result};
use crate::policy::{Gender, PolicyParameters};
use crate::projection::{
    DividendAccrual, LoanLeverageStrategy, NoDividends, ParticipatingConfig, ParticipatingProjector,
    PolicyProjector, ProjectionResult, RunConfig, ScheduleBasis, UniversalLifeProjector,
};
use rayon::prelude::*;
use std::path::Path;

/// Pre-loaded scenario runner for batch projections
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::from_csv_path(Path::new("rates/coi_2024.csv"))?
///     .with_config(RunConfig::from_json_path(Path::new("run.json"))?);
///
/// let results = runner.run_ul_batch(&policies);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    assumptions: Assumptions,
    config: RunConfig,
}

impl ScenarioRunner {
    /// Create runner with the embedded default tables and configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create runner by loading the COI table from a CSV file
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        Ok(Self::with_assumptions(Assumptions::from_csv_path(path)?))
    }

    /// Create runner with pre-built assumptions
    pub fn with_assumptions(assumptions: Assumptions) -> Self {
        Self {
            assumptions,
            config: RunConfig::default(),
        }
    }

    /// Replace the run configuration
    pub fn with_config(mut self, config: RunConfig) -> Self {
        self.config = config;
        self
    }

    pub fn assumptions(&self) -> &Assumptions {
        &self.assumptions
    }

    /// Get mutable reference to assumptions for customization
    pub fn assumptions_mut(&mut self) -> &mut Assumptions {
        &mut self.assumptions
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut RunConfig {
        &mut self.config
    }

    /// Project, then overlay the configured leverage strategy if any
    fn project_with<P: PolicyProjector>(
        &self,
        projector: &P,
        policy: &PolicyParameters,
        config: &RunConfig,
    ) -> Result<ProjectionResult> {
        let strategy = config
            .leverage
            .as_ref()
            .map(LoanLeverageStrategy::from_config)
            .transpose()?;

        let mut result = projector.project(policy)?;
        if let Some(strategy) = strategy {
            strategy.apply(policy, &mut result);
        }
        Ok(result)
    }

    fn run_ul_with(&self, policy: &PolicyParameters, config: &RunConfig) -> Result<ProjectionResult> {
        let projector =
            UniversalLifeProjector::new(&self.assumptions.coi_rates, config.universal_life.clone());
        self.project_with(&projector, policy, config)
    }

    /// Run a universal-life projection for one policy
    pub fn run_ul(&self, policy: &PolicyParameters) -> Result<ProjectionResult> {
        self.run_ul_with(policy, &self.config)
    }

    /// Run universal-life projections for many policies in parallel
    ///
    /// Results come back in input order; one policy failing does not stop
    /// the others.
    pub fn run_ul_batch(&self, policies: &[PolicyParameters]) -> Vec<Result<ProjectionResult>> {
        let results: Vec<_> = policies.par_iter().map(|p| self.run_ul(p)).collect();
        log::info!(
            "Projected {} of {} policies",
            results.iter().filter(|r| r.is_ok()).count(),
            policies.len()
        );
        results
    }

    /// Run one policy under several configurations in parallel
    pub fn run_scenarios(
        &self,
        policy: &PolicyParameters,
        configs: &[RunConfig],
    ) -> Vec<Result<ProjectionResult>> {
        configs
            .par_iter()
            .map(|config| self.run_ul_with(policy, config))
            .collect()
    }

    /// Set the premium from the loaded premium-rate table
    ///
    /// Rates are per unit of face amount when the schedule basis is
    /// per unit face, otherwise per 1 of face.
    pub fn priced_policy(&self, policy: &PolicyParameters) -> Result<PolicyParameters> {
        let data = self.policy_data()?;
        let rate = data.premium_rates.lookup(policy.issue_age, policy.gender)?;
        let units = match self.config.participating.schedule_basis {
            ScheduleBasis::PerUnitFace { unit_face } if unit_face > 0.0 => {
                policy.face_amount / unit_face
            }
            _ => policy.face_amount,
        };
        Ok(PolicyParameters {
            target_premium: rate * units,
            ..policy.clone()
        })
    }

    fn policy_data(&self) -> Result<&PolicyDataSet> {
        self.assumptions.policy_data.as_ref().ok_or_else(|| {
            ProjectionError::Configuration(
                "participating projection requires a loaded policy data set".to_string(),
            )
        })
    }

    fn run_participating_with(
        &self,
        policy: &PolicyParameters,
        schedule: GuaranteedSchedule,
        participating: ParticipatingConfig,
        config: &RunConfig,
    ) -> Result<ProjectionResult> {
        match participating.dividends.clone() {
            Some(dividends) => {
                let projector =
                    ParticipatingProjector::new(schedule, participating, DividendAccrual::new(dividends));
                self.project_with(&projector, policy, config)
            }
            None => {
                let projector = ParticipatingProjector::new(schedule, participating, NoDividends);
                self.project_with(&projector, policy, config)
            }
        }
    }

    /// Run a participating projection from the loaded policy data set
    pub fn run_participating(&self, policy: &PolicyParameters) -> Result<ProjectionResult> {
        let schedule = self.policy_data()?.schedule(policy.gender, policy.issue_age)?.clone();
        self.run_participating_with(policy, schedule, self.config.participating.clone(), &self.config)
    }

    /// Run a participating projection on a reference illustration
    ///
    /// Values scale with the policy's premium relative to the illustration's.
    pub fn run_reference(
        &self,
        product: ReferenceProduct,
        policy: &PolicyParameters,
    ) -> Result<ProjectionResult> {
        let participating = ParticipatingConfig {
            horizon: product.horizon(policy.issue_age),
            schedule_basis: ScheduleBasis::PerBasePremium {
                base_premium: product.base_premium(),
            },
            dividends: self.config.participating.dividends.clone(),
        };
        self.run_participating_with(policy, product.schedule(), participating, &self.config)
    }

    /// Leverage a reference illustration for a monthly deposit
    ///
    /// The illustration's values are scaled by the annual deposit and its own
    /// loan limits replace the configured ones.
    pub fn run_reference_leverage(
        &self,
        product: ReferenceProduct,
        issue_age: u8,
        gender: Gender,
        monthly_deposit: f64,
    ) -> Result<ProjectionResult> {
        let policy = PolicyParameters::new(
            issue_age,
            gender,
            monthly_deposit * 12.0,
            0.0,
            product.deposit_years(),
            0.0,
            0.0,
        );

        let participating = ParticipatingConfig {
            horizon: product.horizon(issue_age),
            schedule_basis: ScheduleBasis::PerBasePremium {
                base_premium: product.base_premium(),
            },
            dividends: None,
        };

        let mut leverage = self.config.leverage.clone().unwrap_or_default();
        leverage.loan_limits = product.loan_limits();
        let config = RunConfig {
            leverage: Some(leverage),
            ..self.config.clone()
        };

        self.run_participating_with(&policy, product.schedule(), participating, &config)
    }
}
