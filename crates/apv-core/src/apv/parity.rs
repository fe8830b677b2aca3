use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ApvError;
use crate::time_value::{compound_factor, divide};
use crate::types::Rate;
use crate::ApvResult;

use super::parameters::ProjectParameters;

/// Expected spot rate for one future period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpotRatePoint {
    pub period: u32,
    pub spot_rate: Decimal,
}

/// Relative purchasing-power parity forecast of the home/foreign rate.
///
/// S(t) = S0 × (1 + π_d)^t / (1 + π_f)^t
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParityModel {
    pub spot_rate: Decimal,
    pub domestic_inflation: Rate,
    pub foreign_inflation: Rate,
}

impl ParityModel {
    pub fn from_params(params: &ProjectParameters) -> Self {
        ParityModel {
            spot_rate: params.spot_rate,
            domestic_inflation: params.domestic_inflation,
            foreign_inflation: params.foreign_inflation,
        }
    }

    /// Expected spot rate at period `t` (t ≥ 1).
    pub fn spot_at(&self, t: u32) -> ApvResult<Decimal> {
        if t == 0 {
            return Err(ApvError::invalid(
                "period",
                "Expected spot rates start at period 1; use the current spot rate for period 0",
            ));
        }
        let domestic = compound_factor(self.domestic_inflation, t)?;
        let foreign = compound_factor(self.foreign_inflation, t)?;
        let scaled = self
            .spot_rate
            .checked_mul(domestic)
            .ok_or_else(|| ApvError::overflow(format!("expected spot rate, period {t}")))?;
        divide(scaled, foreign, &format!("expected spot rate, period {t}"))
    }

    /// Per-period drift of the expected spot rate, (1 + π_d) / (1 + π_f).
    pub fn drift(&self) -> ApvResult<Decimal> {
        divide(
            compound_factor(self.domestic_inflation, 1)?,
            compound_factor(self.foreign_inflation, 1)?,
            "parity drift",
        )
    }

    /// S(1)..S(life)
    pub fn path(&self, life: u32) -> ApvResult<Vec<SpotRatePoint>> {
        (1..=life)
            .map(|period| {
                Ok(SpotRatePoint {
                    period,
                    spot_rate: self.spot_at(period)?,
                })
            })
            .collect()
    }
}

/// Expected spot rates over the whole project life.
pub fn expected_spot_rates(params: &ProjectParameters) -> ApvResult<Vec<SpotRatePoint>> {
    params.validate()?;
    ParityModel::from_params(params).path(params.project_life)
}
