use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::time::Instant;

use apv_core::apv::{self, ParityModel, ProjectParameters};
use apv_core::types::with_metadata;

use crate::input;

const METHODOLOGY: &str = "Relative purchasing power parity: S(t) = S0 x (1 + domestic)^t / (1 + foreign)^t";

/// Arguments for the expected spot-rate path
#[derive(Args)]
pub struct SpotRateArgs {
    /// Current spot rate, home currency per unit of foreign currency
    #[arg(long)]
    pub spot_rate: Option<Decimal>,

    /// Expected domestic inflation rate (e.g. 0.03)
    #[arg(long, allow_negative_numbers = true)]
    pub domestic_inflation: Option<Decimal>,

    /// Expected foreign inflation rate (e.g. 0.021)
    #[arg(long, allow_negative_numbers = true)]
    pub foreign_inflation: Option<Decimal>,

    /// Number of periods to forecast
    #[arg(long)]
    pub periods: Option<u32>,

    /// Path to a JSON or YAML project parameter file
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_spot_rates(args: SpotRateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();

    let (assumptions, model, spot_rates) = match (
        args.spot_rate,
        args.domestic_inflation,
        args.foreign_inflation,
        args.periods,
    ) {
        (Some(spot_rate), Some(domestic_inflation), Some(foreign_inflation), Some(periods)) => {
            if periods == 0 {
                return Err("--periods must be at least 1".into());
            }
            if spot_rate <= Decimal::ZERO {
                return Err("--spot-rate must be positive".into());
            }
            let model = ParityModel {
                spot_rate,
                domestic_inflation,
                foreign_inflation,
            };
            let assumptions = json!({
                "spot_rate": spot_rate,
                "domestic_inflation": domestic_inflation,
                "foreign_inflation": foreign_inflation,
                "periods": periods,
            });
            let path = model.path(periods)?;
            (assumptions, model, path)
        }
        _ => {
            let params: ProjectParameters = input::load_document(args.input.as_deref())
                .map_err(|e| {
                    format!(
                        "{e} (or pass --spot-rate, --domestic-inflation, --foreign-inflation and --periods)"
                    )
                })?;
            let path = apv::expected_spot_rates(&params)?;
            (serde_json::to_value(&params)?, ParityModel::from_params(&params), path)
        }
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let output = with_metadata(
        METHODOLOGY,
        &assumptions,
        Vec::new(),
        elapsed,
        json!({ "drift": model.drift()?, "spot_rates": spot_rates }),
    );
    Ok(serde_json::to_value(output)?)
}
