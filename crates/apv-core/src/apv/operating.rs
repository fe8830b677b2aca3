use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApvError;
use crate::time_value::{discounted_series, grow, product, round_cents, subtract};
use crate::types::{Money, Ratio};
use crate::ApvResult;

use super::parameters::ProjectParameters;
use super::parity::ParityModel;

/// One period of the after-tax operating cash flow projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatingCashFlowPeriod {
    pub period: u32,
    pub spot_rate: Decimal,
    /// Contribution margin per unit, foreign currency
    pub contribution_margin: Money,
    pub unit_volume: Decimal,
    /// S(t) × volume × margin, home currency
    pub incremental_sales: Money,
    pub displaced_volume: Decimal,
    /// Margin lost per displaced unit, home currency
    pub displaced_margin: Money,
    /// −displaced volume × displaced margin, home currency
    pub lost_contribution: Money,
    pub pre_tax_cash_flow: Money,
    pub after_tax_cash_flow: Money,
    pub discount_factor: Ratio,
    pub present_value: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatingCashFlowOutput {
    pub periods: Vec<OperatingCashFlowPeriod>,
    /// Sum of per-period PVs, rounded to cents only after summing
    pub pv_operating_cash_flows: Money,
}

struct OperatingDetail {
    spot_rate: Decimal,
    contribution_margin: Money,
    unit_volume: Decimal,
    incremental_sales: Money,
    displaced_volume: Decimal,
    displaced_margin: Money,
    lost_contribution: Money,
    pre_tax_cash_flow: Money,
}

/// Project after-tax operating cash flows in home currency and discount them
/// at the unlevered cost of capital.
///
/// Incremental volume and margin compound from period 1 (exponent t − 1);
/// displaced volume and margin compound from period 0 (exponent t).
pub fn project_operating_cash_flows(
    params: &ProjectParameters,
) -> ApvResult<OperatingCashFlowOutput> {
    params.validate()?;

    let parity = ParityModel::from_params(params);
    let base_margin = params.base_contribution_margin()?;
    let margin_growth = params.effective_margin_growth();
    let after_tax_share = subtract(Decimal::ONE, params.corporate_tax_rate, "after-tax share")?;

    let series = discounted_series(
        params.project_life,
        params.unlevered_cost_of_capital,
        "operating cash flow",
        |t| {
            let spot_rate = parity.spot_at(t)?;
            let contribution_margin = grow(base_margin, margin_growth, t - 1)?;
            let unit_volume = grow(params.unit_volume, params.volume_growth, t - 1)?;
            let incremental_sales = product(
                &[spot_rate, unit_volume, contribution_margin],
                "incremental sales",
            )?;

            let displaced_volume =
                grow(params.displaced_volume, params.displaced_volume_growth, t)?;
            let displaced_margin =
                grow(params.displaced_margin, params.displaced_margin_growth, t)?;
            let lost_contribution = -product(
                &[displaced_volume, displaced_margin],
                "lost contribution",
            )?;

            let pre_tax_cash_flow = incremental_sales
                .checked_add(lost_contribution)
                .ok_or_else(|| ApvError::overflow(format!("pre-tax cash flow, period {t}")))?;
            let after_tax = product(&[pre_tax_cash_flow, after_tax_share], "after-tax cash flow")?;

            Ok((
                OperatingDetail {
                    spot_rate,
                    contribution_margin,
                    unit_volume,
                    incremental_sales,
                    displaced_volume,
                    displaced_margin,
                    lost_contribution,
                    pre_tax_cash_flow,
                },
                after_tax,
            ))
        },
    )?;

    let pv_operating_cash_flows = round_cents(series.total_present_value);
    debug!(%pv_operating_cash_flows, "operating cash flows projected");

    let periods = series
        .periods
        .into_iter()
        .enumerate()
        .map(|(idx, (d, flow))| OperatingCashFlowPeriod {
            period: idx as u32 + 1,
            spot_rate: d.spot_rate,
            contribution_margin: d.contribution_margin,
            unit_volume: d.unit_volume,
            incremental_sales: d.incremental_sales,
            displaced_volume: d.displaced_volume,
            displaced_margin: d.displaced_margin,
            lost_contribution: d.lost_contribution,
            pre_tax_cash_flow: d.pre_tax_cash_flow,
            after_tax_cash_flow: flow.amount,
            discount_factor: flow.discount_factor,
            present_value: flow.present_value,
        })
        .collect();

    Ok(OperatingCashFlowOutput {
        periods,
        pv_operating_cash_flows,
    })
}
