use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::error::ApvError;
use crate::time_value::{product, round_cents, subtract};
use crate::types::{with_metadata, ComputationOutput, Currency, Money, Ratio};
use crate::ApvResult;

use super::concessional_loan::{concessional_loan_benefit, ConcessionalLoanOutput, LoanPaymentPeriod};
use super::depreciation::{depreciation_shields, DepreciationShieldPeriod};
use super::interest_shield::{interest_tax_shields, InterestShieldPeriod};
use super::leverage::LeverageFactor;
use super::operating::{project_operating_cash_flows, OperatingCashFlowPeriod};
use super::parameters::ProjectParameters;
use super::repatriation::{repatriation_arbitrage, RepatriationOutput};

/// Adjusted present value and everything it was built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApvOutput {
    pub home_currency: Currency,
    pub foreign_currency: Currency,

    pub pv_operating_cash_flows: Money,
    pub pv_depreciation_shields: Money,
    pub loan_benefit: Money,
    pub pv_interest_shields: Money,
    pub repatriation_arbitrage: Money,
    /// Initial investment converted at S0
    pub initial_investment_home: Money,
    pub apv: Money,
    pub lambda: Ratio,

    pub leverage: LeverageFactor,
    pub loan: LoanSummary,
    pub repatriation: RepatriationOutput,

    pub operating_cash_flows: Vec<OperatingCashFlowPeriod>,
    pub depreciation_shields: Vec<DepreciationShieldPeriod>,
    pub loan_payments: Vec<LoanPaymentPeriod>,
    pub interest_shields: Vec<InterestShieldPeriod>,
}

/// Scalar lines of the concessional loan valuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSummary {
    pub principal_payment: Money,
    pub loan_value_home: Money,
    pub pv_loan_payments: Money,
}

/// Compute the adjusted present value of the project.
///
/// APV = PV(operating) + PV(depreciation shields) + loan benefit
///       + PV(interest shields) + repatriation arbitrage − initial investment × S0
///
/// Every component is added unconditionally, whatever its sign. Any component
/// failure fails the whole computation.
pub fn calculate_apv(params: &ProjectParameters) -> ApvResult<ComputationOutput<ApvOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    params.validate()?;

    let operating = project_operating_cash_flows(params)?;
    let depreciation = depreciation_shields(params)?;
    let loan = concessional_loan_benefit(params)?;
    let interest = interest_tax_shields(params)?;
    let repatriation = repatriation_arbitrage(params)?;

    let initial_investment_home = product(
        &[params.initial_investment, params.spot_rate],
        "initial investment at spot",
    )?;

    let components = [
        operating.pv_operating_cash_flows,
        depreciation.pv_depreciation_shields,
        loan.loan_benefit,
        interest.pv_interest_shields,
        repatriation.arbitrage,
    ];
    let gross = components.iter().try_fold(Decimal::ZERO, |acc, c| {
        acc.checked_add(*c)
            .ok_or_else(|| ApvError::overflow("sum of APV components"))
    })?;
    let net = subtract(gross, initial_investment_home, "APV less initial investment")?;
    let apv = round_cents(net);

    collect_warnings(params, &operating.periods, &interest.leverage, &repatriation, &mut warnings);
    for w in &warnings {
        warn!("{w}");
    }
    debug!(%apv, lambda = %interest.leverage.lambda, "APV computed");

    let ConcessionalLoanOutput {
        periods: loan_payments,
        principal_payment,
        loan_value_home,
        pv_loan_payments,
        loan_benefit,
    } = loan;

    let output = ApvOutput {
        home_currency: params.home_currency.clone(),
        foreign_currency: params.foreign_currency.clone(),
        pv_operating_cash_flows: operating.pv_operating_cash_flows,
        pv_depreciation_shields: depreciation.pv_depreciation_shields,
        loan_benefit,
        pv_interest_shields: interest.pv_interest_shields,
        repatriation_arbitrage: repatriation.arbitrage,
        initial_investment_home,
        apv,
        lambda: interest.leverage.lambda,
        leverage: interest.leverage,
        loan: LoanSummary {
            principal_payment,
            loan_value_home,
            pv_loan_payments,
        },
        repatriation,
        operating_cash_flows: operating.periods,
        depreciation_shields: depreciation.periods,
        loan_payments,
        interest_shields: interest.periods,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Adjusted Present Value (PPP-converted, equal-principal concessional loan)",
        params,
        warnings,
        elapsed,
        output,
    ))
}

fn collect_warnings(
    params: &ProjectParameters,
    operating: &[OperatingCashFlowPeriod],
    leverage: &LeverageFactor,
    repatriation: &RepatriationOutput,
    warnings: &mut Vec<String>,
) {
    if repatriation.arbitrage < Decimal::ZERO {
        warnings.push(format!(
            "Retained-funds tax rate ({}) exceeds the corporate tax rate ({}); repatriation arbitrage is negative",
            repatriation.retained_funds_tax_rate, params.corporate_tax_rate
        ));
    }
    if leverage.lambda > Decimal::ONE {
        warnings.push(format!(
            "Lambda ({:.4}) exceeds 1: parent borrowing capacity exceeds the project's local leverage",
            leverage.lambda
        ));
    }
    if params.concessional_loan_principal > params.initial_investment.abs() {
        warnings.push(format!(
            "Concessional loan ({}) exceeds the initial investment ({})",
            params.concessional_loan_principal, params.initial_investment
        ));
    }
    let negative: Vec<String> = operating
        .iter()
        .filter(|p| p.pre_tax_cash_flow < Decimal::ZERO)
        .map(|p| p.period.to_string())
        .collect();
    if !negative.is_empty() {
        warnings.push(format!(
            "Pre-tax operating cash flow is negative in period(s) {}",
            negative.join(", ")
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::super::parameters::fixtures::centralia;
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_centralia_apv() {
        let out = calculate_apv(&centralia()).unwrap();
        let r = &out.result;
        assert_eq!(r.pv_operating_cash_flows, dec!(5374685.35));
        assert_eq!(r.pv_depreciation_shields, dec!(1892501.82));
        assert_eq!(r.loan_benefit, dec!(392689.29));
        assert_eq!(r.pv_interest_shields, dec!(183806.58));
        assert_eq!(r.repatriation_arbitrage, dec!(185625.00));
        assert_eq!(r.initial_investment_home, dec!(7260000));
        assert_eq!(r.apv, dec!(769308.04));
        assert!((r.lambda - dec!(0.55)).abs() < dec!(0.0000000001));
        assert!(out.warnings.is_empty(), "{:?}", out.warnings);
    }

    #[test]
    fn test_apv_is_sum_of_components() {
        let r = calculate_apv(&centralia()).unwrap().result;
        let expected = r.pv_operating_cash_flows
            + r.pv_depreciation_shields
            + r.loan_benefit
            + r.pv_interest_shields
            + r.repatriation_arbitrage
            - r.initial_investment_home;
        assert_eq!(r.apv, expected.round_dp(2));
    }

    #[test]
    fn test_tables_cover_project_life() {
        let r = calculate_apv(&centralia()).unwrap().result;
        assert_eq!(r.operating_cash_flows.len(), 8);
        assert_eq!(r.depreciation_shields.len(), 8);
        assert_eq!(r.loan_payments.len(), 8);
        assert_eq!(r.interest_shields.len(), 8);
    }

    #[test]
    fn test_negative_arbitrage_is_added_not_floored() {
        let mut p = centralia();
        p.retained_funds_tax_rate = Some(dec!(0.40));
        let out = calculate_apv(&p).unwrap();
        let r = &out.result;
        assert_eq!(r.repatriation_arbitrage, dec!(-82500));
        // Only the arbitrage line moved: 769,308.04 − 185,625 − 82,500
        assert_eq!(r.apv, dec!(501183.04));
        assert!(out.warnings.iter().any(|w| w.contains("negative")));
    }

    #[test]
    fn test_invalid_life_returns_no_result() {
        let mut p = centralia();
        p.project_life = 0;
        assert!(matches!(
            calculate_apv(&p),
            Err(ApvError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_zero_loan_fails_whole_computation() {
        let mut p = centralia();
        p.concessional_loan_principal = Decimal::ZERO;
        assert!(matches!(
            calculate_apv(&p),
            Err(ApvError::UndefinedLeverageFactor(_))
        ));
    }

    #[test]
    fn test_sub_cent_arbitrage_enters_the_sum_unrounded() {
        let mut p = centralia();
        p.affiliate_retained_funds = dec!(750000.0123);
        let r = calculate_apv(&p).unwrap().result;
        assert_eq!(r.repatriation_arbitrage, dec!(185625.00304425));
        assert_eq!(r.repatriation, repatriation_arbitrage(&p).unwrap());
        assert_eq!(r.apv, dec!(769308.04));
    }

    #[test]
    fn test_extreme_tax_rate_is_an_overflow_not_a_panic() {
        let mut p = centralia();
        p.corporate_tax_rate = Decimal::MIN;
        assert!(matches!(
            calculate_apv(&p),
            Err(ApvError::NumericOverflow { .. })
        ));
    }

    #[test]
    fn test_lambda_above_one_warns() {
        let mut p = centralia();
        p.borrowing_capacity = Some(dec!(7000000));
        let out = calculate_apv(&p).unwrap();
        assert!(out.result.lambda > Decimal::ONE);
        assert!(out.warnings.iter().any(|w| w.contains("Lambda")));
    }
}
