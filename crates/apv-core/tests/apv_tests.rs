use apv_core::apv::{
    calculate_apv, concessional_loan_benefit, depreciation_shields, expected_spot_rates,
    interest_tax_shields, leverage_factor, project_operating_cash_flows, repatriation_arbitrage,
    DecliningBalance, LeverageSource, ProjectParameters,
};
use apv_core::types::Currency;
use apv_core::ApvError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Centralia Corporation's Spanish plant (home USD, foreign EUR).
fn centralia() -> ProjectParameters {
    ProjectParameters {
        home_currency: Currency::USD,
        foreign_currency: Currency::EUR,
        spot_rate: dec!(1.32),
        domestic_inflation: dec!(0.03),
        foreign_inflation: dec!(0.021),
        project_life: 8,
        initial_investment: dec!(5500000),
        unlevered_cost_of_capital: dec!(0.12),
        domestic_borrowing_rate: dec!(0.08),
        corporate_tax_rate: dec!(0.35),
        foreign_tax_rate: dec!(0.20),
        concessional_loan_rate: dec!(0.05),
        concessional_loan_principal: dec!(4000000),
        borrowing_capacity: Some(dec!(2904000)),
        target_debt_ratio: None,
        lambda_override: None,
        unit_volume: dec!(25000),
        volume_growth: dec!(0.12),
        contribution_margin: None,
        unit_price: Some(dec!(200)),
        unit_cost: Some(dec!(160)),
        margin_growth: Some(dec!(0.021)),
        displaced_volume: dec!(9600),
        displaced_volume_growth: dec!(0.05),
        displaced_margin: dec!(35),
        displaced_margin_growth: dec!(0.03),
        affiliate_retained_funds: dec!(750000),
        retained_funds_tax_rate: None,
    }
}

// ===========================================================================
// Regression fixture
// ===========================================================================

#[test]
fn test_centralia_exhibit_values() {
    let out = calculate_apv(&centralia()).unwrap();
    let r = &out.result;

    assert_eq!(r.pv_operating_cash_flows, dec!(5374685.35));
    assert_eq!(r.pv_depreciation_shields, dec!(1892501.82));
    assert_eq!(r.loan_benefit, dec!(392689.29));
    assert_eq!(r.pv_interest_shields, dec!(183806.58));
    assert_eq!(r.repatriation_arbitrage, dec!(185625));
    assert_eq!(r.initial_investment_home, dec!(7260000));
    assert_eq!(r.apv, dec!(769308.04));
    assert!(
        (r.lambda - dec!(0.55)).abs() < dec!(0.0000000001),
        "Expected lambda 0.55, got {}",
        r.lambda
    );
    assert_eq!(r.leverage.source, LeverageSource::BorrowingCapacity);
}

#[test]
fn test_components_match_standalone_calculators() {
    let p = centralia();
    let r = calculate_apv(&p).unwrap().result;

    assert_eq!(
        r.pv_operating_cash_flows,
        project_operating_cash_flows(&p).unwrap().pv_operating_cash_flows
    );
    assert_eq!(
        r.pv_depreciation_shields,
        depreciation_shields(&p).unwrap().pv_depreciation_shields
    );
    assert_eq!(r.loan_benefit, concessional_loan_benefit(&p).unwrap().loan_benefit);
    assert_eq!(
        r.pv_interest_shields,
        interest_tax_shields(&p).unwrap().pv_interest_shields
    );
    assert_eq!(r.repatriation_arbitrage, repatriation_arbitrage(&p).unwrap().arbitrage);
    assert_eq!(r.lambda, leverage_factor(&p).unwrap().lambda);
}

// ===========================================================================
// Properties
// ===========================================================================

#[test]
fn test_apv_identity_holds_across_scenarios() {
    let mut scenarios = vec![centralia()];

    let mut high_foreign_tax = centralia();
    high_foreign_tax.retained_funds_tax_rate = Some(dec!(0.45));
    scenarios.push(high_foreign_tax);

    let mut deflation = centralia();
    deflation.foreign_inflation = dec!(-0.01);
    deflation.domestic_inflation = dec!(-0.02);
    scenarios.push(deflation);

    let mut short = centralia();
    short.project_life = 1;
    scenarios.push(short);

    let mut subsidy = centralia();
    subsidy.concessional_loan_rate = dec!(-0.01);
    scenarios.push(subsidy);

    for p in &scenarios {
        let r = calculate_apv(p).unwrap().result;
        let expected = r.pv_operating_cash_flows
            + r.pv_depreciation_shields
            + r.loan_benefit
            + r.pv_interest_shields
            + r.repatriation_arbitrage
            - r.initial_investment_home;
        assert_eq!(r.apv, expected.round_dp(2));
    }
}

#[test]
fn test_spot_path_follows_parity() {
    let p = centralia();
    let path = expected_spot_rates(&p).unwrap();
    let drift = (Decimal::ONE + p.domestic_inflation) / (Decimal::ONE + p.foreign_inflation);

    assert!((path[0].spot_rate - p.spot_rate * drift).abs() < dec!(0.000000000000000001));
    for w in path.windows(2) {
        let ratio = w[1].spot_rate / w[0].spot_rate;
        assert!((ratio - drift).abs() < dec!(0.000000000000000001));
    }
}

#[test]
fn test_every_table_uses_the_same_spot_rates() {
    let p = centralia();
    let r = calculate_apv(&p).unwrap().result;
    let path = expected_spot_rates(&p).unwrap();
    for (i, point) in path.iter().enumerate() {
        assert_eq!(r.operating_cash_flows[i].spot_rate, point.spot_rate);
        assert_eq!(r.depreciation_shields[i].spot_rate, point.spot_rate);
        assert_eq!(r.loan_payments[i].spot_rate, point.spot_rate);
        assert_eq!(r.interest_shields[i].spot_rate, point.spot_rate);
    }
}

#[test]
fn test_loan_principal_sums_to_face_value() {
    let r = calculate_apv(&centralia()).unwrap().result;
    let repaid: Decimal = r.loan_payments.iter().map(|p| p.principal).sum();
    assert_eq!(repaid, dec!(4000000));

    let mut balance = DecliningBalance::new(dec!(4000000), dec!(0.05), 8).unwrap();
    for _ in 0..8 {
        balance.next_installment().unwrap();
    }
    assert_eq!(balance.remaining(), Decimal::ZERO);
}

#[test]
fn test_idempotent_results() {
    let p = centralia();
    let first = calculate_apv(&p).unwrap();
    let second = calculate_apv(&p).unwrap();
    assert_eq!(first.result, second.result);
    assert_eq!(
        serde_json::to_string(&first.result).unwrap(),
        serde_json::to_string(&second.result).unwrap()
    );
}

#[test]
fn test_negative_arbitrage_reduces_apv() {
    let base = calculate_apv(&centralia()).unwrap().result;

    let mut p = centralia();
    p.foreign_tax_rate = dec!(0.45);
    let out = calculate_apv(&p).unwrap();
    let r = &out.result;

    assert!(r.repatriation_arbitrage < Decimal::ZERO);
    assert!(r.apv < base.apv);
    assert_eq!(
        base.apv - r.apv,
        (base.repatriation_arbitrage - r.repatriation_arbitrage).round_dp(2)
    );
}

// ===========================================================================
// Supplemented inputs
// ===========================================================================

#[test]
fn test_explicit_margin_matches_price_cost_pair() {
    let from_pair = calculate_apv(&centralia()).unwrap().result;

    let mut p = centralia();
    p.contribution_margin = Some(dec!(40));
    p.unit_price = None;
    p.unit_cost = None;
    let explicit = calculate_apv(&p).unwrap().result;

    assert_eq!(from_pair.apv, explicit.apv);
}

#[test]
fn test_lambda_override_skips_capacity() {
    let mut p = centralia();
    p.borrowing_capacity = None;
    p.lambda_override = Some(dec!(0.55));
    let r = calculate_apv(&p).unwrap().result;
    assert_eq!(r.leverage.source, LeverageSource::Override);
    assert_eq!(r.pv_interest_shields, dec!(183806.58));
}

#[test]
fn test_parameters_from_json_document() {
    let json = r#"{
        "home_currency": "USD",
        "foreign_currency": "EUR",
        "spot_rate": "1.32",
        "domestic_inflation": "0.03",
        "foreign_inflation": "0.021",
        "project_life": 8,
        "initial_investment": "5500000",
        "unlevered_cost_of_capital": "0.12",
        "domestic_borrowing_rate": "0.08",
        "corporate_tax_rate": "0.35",
        "foreign_tax_rate": "0.20",
        "concessional_loan_rate": "0.05",
        "concessional_loan_principal": "4000000",
        "borrowing_capacity": "2904000",
        "unit_volume": "25000",
        "volume_growth": "0.12",
        "contribution_margin": "40",
        "displaced_volume": "9600",
        "displaced_volume_growth": "0.05",
        "displaced_margin": "35",
        "displaced_margin_growth": "0.03",
        "affiliate_retained_funds": "750000"
    }"#;
    let p: ProjectParameters = serde_json::from_str(json).unwrap();
    // Margin growth falls back to foreign inflation (2.1%), as in the case
    let r = calculate_apv(&p).unwrap().result;
    assert_eq!(r.apv, dec!(769308.04));
}

// ===========================================================================
// Failures
// ===========================================================================

#[test]
fn test_zero_life_is_invalid() {
    let mut p = centralia();
    p.project_life = 0;
    match calculate_apv(&p) {
        Err(ApvError::InvalidParameter { field, .. }) => assert_eq!(field, "project_life"),
        other => panic!("expected InvalidParameter, got {other:?}"),
    }
}

#[test]
fn test_discount_rate_at_minus_100_is_invalid() {
    let mut p = centralia();
    p.unlevered_cost_of_capital = dec!(-1);
    assert!(matches!(
        calculate_apv(&p),
        Err(ApvError::InvalidParameter { .. })
    ));
}

#[test]
fn test_no_loan_is_undefined_leverage() {
    let mut p = centralia();
    p.concessional_loan_principal = Decimal::ZERO;
    assert!(matches!(
        calculate_apv(&p),
        Err(ApvError::UndefinedLeverageFactor(_))
    ));
}

#[test]
fn test_extreme_growth_overflows_cleanly() {
    let mut p = centralia();
    p.project_life = 40;
    p.volume_growth = dec!(10);
    assert!(matches!(
        calculate_apv(&p),
        Err(ApvError::NumericOverflow { .. })
    ));
}

#[test]
fn test_extreme_tax_rate_overflows_cleanly() {
    let mut p = centralia();
    p.corporate_tax_rate = Decimal::MIN;
    assert!(matches!(
        calculate_apv(&p),
        Err(ApvError::NumericOverflow { .. })
    ));
}
