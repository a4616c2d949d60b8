//! End-to-end projection scenarios across projectors and the leverage overlay

use approx::assert_abs_diff_eq;
use policy_projection::assumptions::{default_coi_table, GuaranteedSchedule, RateRow, RateTable};
use policy_projection::policy::load_policies_from_reader;
use policy_projection::projection::{
    DividendAccrual, DividendConfig, Horizon, LeverageConfig, LoanLeverageStrategy, NoDividends,
    ParticipatingConfig, ParticipatingProjector, PolicyProjector, ScheduleBasis,
    UniversalLifeConfig, UniversalLifeProjector, WithdrawalMode,
};
use policy_projection::{
    Assumptions, Gender, PolicyParameters, ProjectionError, RunConfig, ScenarioRunner,
};

fn reference_table() -> RateTable {
    let mut rows: Vec<RateRow> = (0..=100)
        .map(|age| RateRow {
            age,
            male_rate: 0.5 + age as f64 * 0.1,
            female_rate: 0.4 + age as f64 * 0.08,
        })
        .collect();
    rows[31].male_rate = 1.25;
    RateTable::from_rows(rows)
}

fn reference_policy() -> PolicyParameters {
    PolicyParameters::new(31, Gender::Male, 120_000.0, 12_000_000.0, 20, 0.08, 0.0)
}

#[test]
fn ul_reference_scenario_first_year() {
    let projector = UniversalLifeProjector::new(reference_table(), UniversalLifeConfig::default());
    let result = projector.project(&reference_policy()).unwrap();
    let first = &result.rows[0];

    assert_abs_diff_eq!(first.premium_expense, 69_600.0, epsilon = 1e-9);
    assert_abs_diff_eq!(first.net_premium, 50_400.0, epsilon = 1e-9);
    assert_abs_diff_eq!(first.insurance_cost, 18_000.0, epsilon = 1e-6);
    assert_abs_diff_eq!(first.account_value_end, 33_696.00, epsilon = 0.005);
}

#[test]
fn ul_first_year_on_embedded_table() {
    let projector = UniversalLifeProjector::new(default_coi_table(), UniversalLifeConfig::default());
    let result = projector.project(&reference_policy()).unwrap();
    let first = &result.rows[0];

    assert_eq!(first.coi_rate, 0.834);
    assert_abs_diff_eq!(first.insurance_cost, 12_009.60, epsilon = 1e-6);
    assert_abs_diff_eq!(first.account_value_end, 40_165.63, epsilon = 0.005);
}

#[test]
fn ul_values_stay_within_invariants() {
    let projector = UniversalLifeProjector::new(default_coi_table(), UniversalLifeConfig::default());
    for age in [0u8, 25, 50, 75, 100] {
        for gender in [Gender::Male, Gender::Female] {
            let policy = PolicyParameters::new(age, gender, 20_000.0, 1_000_000.0, 10, 0.04, 0.0);
            let result = projector.project(&policy).unwrap();

            assert!(!result.rows.is_empty());
            for (i, row) in result.rows.iter().enumerate() {
                assert_eq!(row.policy_year, i as u32 + 1);
                assert!(row.account_value_end >= 0.0);
                assert!(row.net_amount_at_risk >= 0.0);
                assert!(row.death_benefit >= policy.face_amount);
            }
        }
    }
}

#[test]
fn missing_rate_fails_before_any_output() {
    let table = RateTable::from_rows((40..=100).map(|age| RateRow {
        age,
        male_rate: 1.0,
        female_rate: 1.0,
    }));
    let runner = ScenarioRunner::with_assumptions(Assumptions {
        coi_rates: table,
        policy_data: None,
    });

    let err = runner.run_ul(&reference_policy()).unwrap_err();
    assert!(matches!(err, ProjectionError::DataNotFound { age: 31, .. }));
}

#[test]
fn ul_output_round_trips_through_participating_projector() {
    let ul = UniversalLifeProjector::new(reference_table(), UniversalLifeConfig::default())
        .project(&reference_policy())
        .unwrap();
    // Premiums paid never exceed the death benefit, so the premium floor stays idle
    assert!(ul.rows.iter().all(|r| r.death_benefit >= r.cumulative_premium));

    let schedule = GuaranteedSchedule::new(ul.cash_values(), ul.death_benefits());
    let config = ParticipatingConfig {
        horizon: Horizon::PolicyYears(ul.rows.len() as u32),
        schedule_basis: ScheduleBasis::Absolute,
        dividends: Some(DividendConfig::default()),
    };
    let mut policy = reference_policy();
    policy.assumed_rate = policy.declared_rate;

    let projector = ParticipatingProjector::new(schedule, config, DividendAccrual::new(DividendConfig::default()));
    let replayed = projector.project(&policy).unwrap();

    assert_eq!(replayed.cash_values(), ul.cash_values());
    assert_eq!(replayed.death_benefits(), ul.death_benefits());
}

#[test]
fn replayed_death_benefit_is_floored_at_premiums_paid() {
    let policy = PolicyParameters::new(40, Gender::Male, 100_000.0, 200_000.0, 20, 0.04, 0.0);
    let ul = UniversalLifeProjector::new(default_coi_table(), UniversalLifeConfig::default())
        .project(&policy)
        .unwrap();

    let config = ParticipatingConfig {
        horizon: Horizon::PolicyYears(ul.rows.len() as u32),
        schedule_basis: ScheduleBasis::Absolute,
        dividends: None,
    };
    let schedule = GuaranteedSchedule::new(ul.cash_values(), ul.death_benefits());
    let replayed = ParticipatingProjector::new(schedule, config, NoDividends)
        .project(&policy)
        .unwrap();

    assert_eq!(replayed.cash_values(), ul.cash_values());
    for (u, r) in ul.rows.iter().zip(&replayed.rows) {
        assert_eq!(r.cumulative_premium, u.cumulative_premium);
        assert_eq!(r.death_benefit, u.death_benefit.max(u.cumulative_premium));
    }
    // Year 3: 300,000 paid against a 200,000 face
    assert_eq!(ul.rows[2].death_benefit, 200_000.0);
    assert_eq!(replayed.rows[2].death_benefit, 300_000.0);
}

#[test]
fn leveraged_ul_loan_balance_never_decreases() {
    let runner = ScenarioRunner::new().with_config(RunConfig {
        leverage: Some(LeverageConfig {
            loan_interest_rate: 0.02,
            ..Default::default()
        }),
        ..Default::default()
    });
    let policy = PolicyParameters::new(35, Gender::Female, 500_000.0, 10_000_000.0, 20, 0.05, 0.0);
    let result = runner.run_ul(&policy).unwrap();

    assert!(result.rows.iter().any(|r| r.borrowed));
    for pair in result.rows.windows(2) {
        assert!(pair[1].loan_balance >= pair[0].loan_balance);
    }
    // No draws once the insured is past 65 at year end
    assert!(result
        .rows
        .iter()
        .filter(|r| policy.age_at_year_end(r.policy_year) > 65)
        .all(|r| !r.borrowed));
}

#[test]
fn offset_and_compound_share_the_same_loans() {
    let schedule = GuaranteedSchedule::new(
        (1..=30).map(|y| 250_000.0 * y as f64).collect(),
        vec![20_000_000.0; 30],
    );
    let config = ParticipatingConfig {
        horizon: Horizon::PolicyYears(30),
        schedule_basis: ScheduleBasis::Absolute,
        dividends: None,
    };
    let projector = ParticipatingProjector::new(schedule, config, NoDividends);
    let policy = PolicyParameters::new(30, Gender::Male, 120_000.0, 0.0, 20, 0.0, 0.0);

    let mut offset = projector.project(&policy).unwrap();
    let mut compound = offset.clone();
    let offset_config = LeverageConfig::default();
    let compound_config = LeverageConfig {
        mode: WithdrawalMode::Compound,
        ..Default::default()
    };
    LoanLeverageStrategy::from_config(&offset_config).unwrap().apply(&policy, &mut offset);
    LoanLeverageStrategy::from_config(&compound_config).unwrap().apply(&policy, &mut compound);

    for (o, c) in offset.rows.iter().zip(&compound.rows) {
        assert_eq!(o.loan_balance, c.loan_balance);
        assert_eq!(o.fund_principal, c.fund_principal);
        assert_eq!(o.accumulated_wealth, 0.0);
        assert_eq!(c.cumulative_cash_out, 0.0);
    }

    // Offset: every unit of income either reduces real cost or is paid out
    for row in &offset.rows {
        assert_abs_diff_eq!(row.actual_payment, row.gross_premium - row.fund_income, epsilon = 1e-9);
    }
    let last = offset.rows.last().unwrap();
    assert_abs_diff_eq!(
        last.net_worth,
        last.account_value_end + last.fund_principal + last.cumulative_cash_out - last.loan_balance,
        epsilon = 1e-6
    );
}

#[test]
fn batch_from_csv() {
    let csv = "\
PolicyId,IssueAge,Gender,TargetPremium,FaceAmount,PaymentTerm,DeclaredRate,AssumedRate
1,31,Male,120000,12000000,20,0.08,0.0
2,45,Female,50000,3000000,20,0.04,0.0
3,60,M,80000,2000000,10,0.035,0.0
";
    let policies = load_policies_from_reader(csv.as_bytes()).unwrap();
    let results = ScenarioRunner::new().run_ul_batch(&policies);

    assert_eq!(results.len(), 3);
    for (policy, result) in policies.iter().zip(&results) {
        let result = result.as_ref().unwrap();
        assert_eq!(result.policy_id, policy.policy_id);
        assert_eq!(result.rows[0].attained_age, policy.issue_age);
    }
}
