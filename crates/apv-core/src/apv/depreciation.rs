use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::time_value::{discounted_series, divide, product, round_cents};
use crate::types::{Money, Ratio};
use crate::ApvResult;

use super::parameters::ProjectParameters;
use super::parity::ParityModel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepreciationShieldPeriod {
    pub period: u32,
    pub spot_rate: Decimal,
    /// Straight-line depreciation, foreign currency
    pub depreciation: Money,
    /// τ × depreciation × S(t), home currency
    pub tax_shield: Money,
    pub discount_factor: Ratio,
    pub present_value: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepreciationShieldOutput {
    pub periods: Vec<DepreciationShieldPeriod>,
    pub annual_depreciation: Money,
    pub pv_depreciation_shields: Money,
}

/// Tax shields from straight-line depreciation of the initial investment,
/// converted at the same-period expected spot rate and discounted at the
/// domestic borrowing rate.
pub fn depreciation_shields(params: &ProjectParameters) -> ApvResult<DepreciationShieldOutput> {
    params.validate()?;

    let parity = ParityModel::from_params(params);
    let annual_depreciation = divide(
        params.initial_investment,
        Decimal::from(params.project_life),
        "straight-line depreciation",
    )?;

    let series = discounted_series(
        params.project_life,
        params.domestic_borrowing_rate,
        "depreciation shield",
        |t| {
            let spot_rate = parity.spot_at(t)?;
            let shield = product(
                &[params.corporate_tax_rate, annual_depreciation, spot_rate],
                "depreciation tax shield",
            )?;
            Ok((spot_rate, shield))
        },
    )?;

    let pv_depreciation_shields = round_cents(series.total_present_value);
    debug!(%annual_depreciation, %pv_depreciation_shields, "depreciation shields computed");

    let periods = series
        .periods
        .into_iter()
        .enumerate()
        .map(|(idx, (spot_rate, flow))| DepreciationShieldPeriod {
            period: idx as u32 + 1,
            spot_rate,
            depreciation: annual_depreciation,
            tax_shield: flow.amount,
            discount_factor: flow.discount_factor,
            present_value: flow.present_value,
        })
        .collect();

    Ok(DepreciationShieldOutput {
        periods,
        annual_depreciation,
        pv_depreciation_shields,
    })
}
