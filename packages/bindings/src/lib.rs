use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Serialize;

use apv_core::apv::{self, ProjectParameters};
use apv_core::ApvResult;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Parse a project parameter document, run one calculation, return its JSON.
fn run_json<T, F>(params_json: &str, calc: F) -> NapiResult<String>
where
    T: Serialize,
    F: FnOnce(&ProjectParameters) -> ApvResult<T>,
{
    let params = ProjectParameters::from_json(params_json).map_err(to_napi_error)?;
    let output = calc(&params).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Full APV
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_apv(params_json: String) -> NapiResult<String> {
    run_json(&params_json, apv::calculate_apv)
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[napi]
pub fn project_operating_cash_flows(params_json: String) -> NapiResult<String> {
    run_json(&params_json, apv::project_operating_cash_flows)
}

#[napi]
pub fn depreciation_shields(params_json: String) -> NapiResult<String> {
    run_json(&params_json, apv::depreciation_shields)
}

#[napi]
pub fn concessional_loan_benefit(params_json: String) -> NapiResult<String> {
    run_json(&params_json, apv::concessional_loan_benefit)
}

#[napi]
pub fn interest_tax_shields(params_json: String) -> NapiResult<String> {
    run_json(&params_json, apv::interest_tax_shields)
}

#[napi]
pub fn leverage_factor(params_json: String) -> NapiResult<String> {
    run_json(&params_json, apv::leverage_factor)
}

#[napi]
pub fn repatriation_arbitrage(params_json: String) -> NapiResult<String> {
    run_json(&params_json, apv::repatriation_arbitrage)
}

// ---------------------------------------------------------------------------
// Exchange rates
// ---------------------------------------------------------------------------

#[napi]
pub fn expected_spot_rates(params_json: String) -> NapiResult<String> {
    run_json(&params_json, apv::expected_spot_rates)
}
