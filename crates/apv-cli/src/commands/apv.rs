use clap::Args;
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;

use apv_core::apv::{self, ProjectParameters};
use apv_core::types::with_metadata;

use crate::input;

/// Arguments shared by every command that reads a project parameter set
#[derive(Args)]
pub struct ProjectArgs {
    /// Path to a JSON or YAML parameter file (reads stdin when omitted)
    #[arg(long)]
    pub input: Option<String>,
}

impl ProjectArgs {
    fn load(&self) -> Result<ProjectParameters, Box<dyn std::error::Error>> {
        input::load_document(self.input.as_deref())
    }
}

pub fn run_apv(args: ProjectArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let params = args.load()?;
    let result = apv::calculate_apv(&params)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_operating(args: ProjectArgs) -> Result<Value, Box<dyn std::error::Error>> {
    run_component(
        args,
        "Operating cash flows converted at PPP spot rates, discounted at the unlevered cost of capital",
        apv::project_operating_cash_flows,
    )
}

pub fn run_depreciation(args: ProjectArgs) -> Result<Value, Box<dyn std::error::Error>> {
    run_component(
        args,
        "Straight-line depreciation tax shields at PPP spot rates, discounted at the domestic borrowing rate",
        apv::depreciation_shields,
    )
}

pub fn run_loan_benefit(args: ProjectArgs) -> Result<Value, Box<dyn std::error::Error>> {
    run_component(
        args,
        "Concessional loan benefit: loan at spot less PV of equal-principal repayments",
        apv::concessional_loan_benefit,
    )
}

pub fn run_interest_shield(args: ProjectArgs) -> Result<Value, Box<dyn std::error::Error>> {
    run_component(
        args,
        "Interest tax shields on the concessional loan, scaled by the leverage factor",
        apv::interest_tax_shields,
    )
}

pub fn run_leverage(args: ProjectArgs) -> Result<Value, Box<dyn std::error::Error>> {
    run_component(
        args,
        "Leverage factor: firm-wide optimal debt ratio over project debt ratio",
        apv::leverage_factor,
    )
}

pub fn run_repatriation(args: ProjectArgs) -> Result<Value, Box<dyn std::error::Error>> {
    run_component(
        args,
        "Repatriation arbitrage on grossed-up retained affiliate funds",
        apv::repatriation_arbitrage,
    )
}

/// Run one APV component and wrap it in the standard output envelope.
fn run_component<T, F>(
    args: ProjectArgs,
    methodology: &str,
    calc: F,
) -> Result<Value, Box<dyn std::error::Error>>
where
    T: Serialize,
    F: FnOnce(&ProjectParameters) -> apv_core::ApvResult<T>,
{
    let params = args.load()?;
    let start = Instant::now();
    let result = calc(&params)?;
    let elapsed = start.elapsed().as_micros() as u64;
    let output = with_metadata(methodology, &params, Vec::new(), elapsed, result);
    Ok(serde_json::to_value(output)?)
}
