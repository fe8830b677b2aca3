use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::time_value::{discounted_series, product, round_cents};
use crate::types::{Money, Ratio};
use crate::ApvResult;

use super::concessional_loan::DecliningBalance;
use super::leverage::{leverage_factor, LeverageFactor};
use super::parameters::ProjectParameters;
use super::parity::ParityModel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterestShieldPeriod {
    pub period: u32,
    pub spot_rate: Decimal,
    /// Interest on the concessional loan, foreign currency
    pub interest: Money,
    /// S(t) × interest × λ × τ, home currency
    pub tax_shield: Money,
    pub discount_factor: Ratio,
    pub present_value: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterestShieldOutput {
    pub periods: Vec<InterestShieldPeriod>,
    pub leverage: LeverageFactor,
    pub pv_interest_shields: Money,
}

/// Interest tax shields on the concessional loan, scaled by λ so that only
/// the share backed by the parent's borrowing capacity is counted.
pub fn interest_tax_shields(params: &ProjectParameters) -> ApvResult<InterestShieldOutput> {
    params.validate()?;

    let leverage = leverage_factor(params)?;
    let parity = ParityModel::from_params(params);
    let mut schedule = DecliningBalance::from_params(params)?;
    let lambda = leverage.lambda;

    let series = discounted_series(
        params.project_life,
        params.domestic_borrowing_rate,
        "interest tax shield",
        |t| {
            let installment = schedule.next_installment()?;
            let spot_rate = parity.spot_at(t)?;
            let shield = product(
                &[spot_rate, installment.interest, lambda, params.corporate_tax_rate],
                "interest tax shield",
            )?;
            Ok(((spot_rate, installment.interest), shield))
        },
    )?;

    let pv_interest_shields = round_cents(series.total_present_value);
    debug!(%lambda, %pv_interest_shields, "interest tax shields computed");

    let periods = series
        .periods
        .into_iter()
        .enumerate()
        .map(|(idx, ((spot_rate, interest), flow))| InterestShieldPeriod {
            period: idx as u32 + 1,
            spot_rate,
            interest,
            tax_shield: flow.amount,
            discount_factor: flow.discount_factor,
            present_value: flow.present_value,
        })
        .collect();

    Ok(InterestShieldOutput {
        periods,
        leverage,
        pv_interest_shields,
    })
}
