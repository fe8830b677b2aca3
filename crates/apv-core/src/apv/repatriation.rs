use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::time_value::{divide, product, subtract};
use crate::types::{Money, Rate};
use crate::ApvResult;

use super::parameters::ProjectParameters;

/// Freed-up affiliate funds: the home tax differential on the grossed-up
/// retained balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepatriationOutput {
    /// After-foreign-tax retained funds, foreign currency
    pub retained_funds: Money,
    /// Foreign tax rate the funds were taxed at
    pub retained_funds_tax_rate: Rate,
    /// retained / (1 − foreign tax), foreign currency
    pub grossed_up_funds: Money,
    /// grossed-up funds at S0, home currency
    pub grossed_up_funds_home: Money,
    /// corporate tax − foreign tax; sign is kept
    pub tax_rate_differential: Rate,
    /// Full precision; negative when the foreign rate exceeds the home rate
    pub arbitrage: Money,
}

pub fn repatriation_arbitrage(params: &ProjectParameters) -> ApvResult<RepatriationOutput> {
    params.validate()?;

    let foreign_tax = params.effective_retained_funds_tax_rate();
    let grossed_up_funds = divide(
        params.affiliate_retained_funds,
        subtract(Decimal::ONE, foreign_tax, "retained funds gross-up")?,
        "retained funds gross-up",
    )?;
    let grossed_up_funds_home = product(
        &[grossed_up_funds, params.spot_rate],
        "grossed-up funds at spot",
    )?;
    let tax_rate_differential = subtract(
        params.corporate_tax_rate,
        foreign_tax,
        "tax rate differential",
    )?;
    let arbitrage = product(
        &[tax_rate_differential, grossed_up_funds_home],
        "repatriation arbitrage",
    )?;
    debug!(%grossed_up_funds_home, %arbitrage, "repatriation arbitrage computed");

    Ok(RepatriationOutput {
        retained_funds: params.affiliate_retained_funds,
        retained_funds_tax_rate: foreign_tax,
        grossed_up_funds,
        grossed_up_funds_home,
        tax_rate_differential,
        arbitrage,
    })
}
