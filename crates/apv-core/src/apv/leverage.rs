use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApvError;
use crate::time_value::{divide, product};
use crate::types::Ratio;
use crate::ApvResult;

use super::parameters::ProjectParameters;

/// Where the firm-wide debt capacity (and hence λ) came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeverageSource {
    /// λ supplied directly
    Override,
    /// Borrowing capacity in home currency over the project cost at S0
    BorrowingCapacity,
    /// Firm-wide optimal debt ratio supplied directly
    TargetDebtRatio,
}

/// λ and the two debt ratios it relates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeverageFactor {
    pub source: LeverageSource,
    /// Firm-wide optimal debt ratio (absent when λ is overridden)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimal_debt_ratio: Option<Ratio>,
    /// Concessional loan over initial investment, both in foreign currency
    pub project_debt_ratio: Ratio,
    pub lambda: Ratio,
}

/// λ = firm-wide optimal debt ratio / project debt ratio.
///
/// The override takes precedence, then borrowing capacity, then a target
/// debt ratio. With no source at all the parameter set is rejected.
pub fn leverage_factor(params: &ProjectParameters) -> ApvResult<LeverageFactor> {
    params.validate()?;

    let project_debt_ratio = if params.initial_investment.is_zero() {
        Decimal::ZERO
    } else {
        divide(
            params.concessional_loan_principal,
            params.initial_investment,
            "project debt ratio",
        )?
    };

    if let Some(lambda) = params.lambda_override {
        debug!(%lambda, "leverage factor supplied directly");
        return Ok(LeverageFactor {
            source: LeverageSource::Override,
            optimal_debt_ratio: None,
            project_debt_ratio,
            lambda,
        });
    }

    let (source, optimal_debt_ratio) = match (params.borrowing_capacity, params.target_debt_ratio) {
        (Some(capacity), _) => {
            let project_cost_home = product(
                &[params.initial_investment, params.spot_rate],
                "project cost at spot",
            )?;
            let ratio = divide(capacity, project_cost_home, "firm-wide optimal debt ratio")?;
            (LeverageSource::BorrowingCapacity, ratio)
        }
        (None, Some(ratio)) => (LeverageSource::TargetDebtRatio, ratio),
        (None, None) => {
            return Err(ApvError::invalid(
                "borrowing_capacity",
                "Provide borrowing_capacity, target_debt_ratio or lambda_override",
            ));
        }
    };

    if project_debt_ratio.is_zero() {
        return Err(ApvError::UndefinedLeverageFactor(
            "project debt ratio is zero (no concessional loan); the interest shield cannot be attributed".into(),
        ));
    }

    let lambda = divide(optimal_debt_ratio, project_debt_ratio, "leverage factor")?;
    debug!(?source, %optimal_debt_ratio, %project_debt_ratio, %lambda, "leverage factor derived");

    Ok(LeverageFactor {
        source,
        optimal_debt_ratio: Some(optimal_debt_ratio),
        project_debt_ratio,
        lambda,
    })
}
