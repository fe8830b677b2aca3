use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::ApvError;
use crate::time_value::subtract;
use crate::types::{Currency, Money, Rate};
use crate::ApvResult;

/// Full parameter set for one APV run.
///
/// Exchange rates are quoted as home currency per unit of foreign currency
/// (e.g. 1.32 USD/EUR). All rates are decimals, never percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectParameters {
    /// Parent's reporting currency
    #[serde(default = "Currency::default_home")]
    pub home_currency: Currency,
    /// Project's functional currency
    #[serde(default = "Currency::default_foreign")]
    pub foreign_currency: Currency,

    /// Current spot rate S0 (home per foreign)
    pub spot_rate: Decimal,
    /// Expected domestic (home) inflation
    pub domestic_inflation: Rate,
    /// Expected foreign inflation
    pub foreign_inflation: Rate,

    /// Project life in whole periods
    pub project_life: u32,
    /// Initial investment in foreign currency
    pub initial_investment: Money,

    /// Unlevered cost of capital, discounts operating cash flows
    pub unlevered_cost_of_capital: Rate,
    /// Domestic borrowing rate, discounts tax shields and loan payments
    pub domestic_borrowing_rate: Rate,
    /// Parent's corporate tax rate
    pub corporate_tax_rate: Rate,
    /// Affiliate's (foreign) tax rate
    pub foreign_tax_rate: Rate,

    /// Interest rate on the concessional loan
    pub concessional_loan_rate: Rate,
    /// Concessional loan principal in foreign currency
    pub concessional_loan_principal: Money,

    /// Parent's borrowing capacity created by the project, in home currency
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub borrowing_capacity: Option<Money>,
    /// Firm-wide optimal debt ratio, used when no borrowing capacity is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_debt_ratio: Option<Rate>,
    /// Lambda supplied directly; skips the debt-ratio derivation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lambda_override: Option<Decimal>,

    /// Year-1 incremental unit volume
    pub unit_volume: Decimal,
    /// Growth of incremental volume per period
    pub volume_growth: Rate,
    /// Year-1 contribution margin per unit (foreign currency)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contribution_margin: Option<Money>,
    /// Year-1 selling price per unit (foreign currency)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Money>,
    /// Year-1 production cost per unit (foreign currency)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_cost: Option<Money>,
    /// Growth of the contribution margin; defaults to foreign inflation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_growth: Option<Rate>,

    /// Year-1 displaced (cannibalized) unit volume
    pub displaced_volume: Decimal,
    /// Growth of displaced volume per period
    pub displaced_volume_growth: Rate,
    /// Year-1 margin lost per displaced unit (home currency)
    pub displaced_margin: Money,
    /// Growth of the displaced margin per period
    pub displaced_margin_growth: Rate,

    /// Affiliate's accumulated funds, after foreign tax (foreign currency)
    pub affiliate_retained_funds: Money,
    /// Tax rate the retained funds were taxed at; defaults to `foreign_tax_rate`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retained_funds_tax_rate: Option<Rate>,
}

impl ProjectParameters {
    /// Parse a JSON parameter document.
    pub fn from_json(document: &str) -> ApvResult<Self> {
        Ok(serde_json::from_str(document)?)
    }

    /// Year-1 contribution margin: explicit margin, else price less cost.
    pub fn base_contribution_margin(&self) -> ApvResult<Money> {
        match (self.contribution_margin, self.unit_price, self.unit_cost) {
            (Some(margin), _, _) => Ok(margin),
            (None, Some(price), Some(cost)) => subtract(price, cost, "unit price less unit cost"),
            _ => Err(ApvError::invalid(
                "contribution_margin",
                "Provide contribution_margin or both unit_price and unit_cost",
            )),
        }
    }

    /// Margin growth, falling back to foreign inflation.
    pub fn effective_margin_growth(&self) -> Rate {
        self.margin_growth.unwrap_or(self.foreign_inflation)
    }

    /// Tax rate applied to the affiliate's retained funds.
    pub fn effective_retained_funds_tax_rate(&self) -> Rate {
        self.retained_funds_tax_rate.unwrap_or(self.foreign_tax_rate)
    }

    /// Type and range acceptance. No cross-field business rules.
    pub fn validate(&self) -> ApvResult<()> {
        if self.project_life < 1 {
            return Err(ApvError::invalid(
                "project_life",
                "Project life must be at least one period",
            ));
        }
        if self.spot_rate <= Decimal::ZERO {
            return Err(ApvError::invalid("spot_rate", "Spot rate must be positive"));
        }

        let above_total_loss = [
            ("domestic_inflation", self.domestic_inflation),
            ("foreign_inflation", self.foreign_inflation),
            ("unlevered_cost_of_capital", self.unlevered_cost_of_capital),
            ("domestic_borrowing_rate", self.domestic_borrowing_rate),
            ("concessional_loan_rate", self.concessional_loan_rate),
        ];
        for (field, rate) in above_total_loss {
            if rate <= dec!(-1) {
                return Err(ApvError::invalid(field, "Rate must be greater than -100%"));
            }
        }

        if self.effective_retained_funds_tax_rate() == Decimal::ONE {
            return Err(ApvError::invalid(
                "retained_funds_tax_rate",
                "A 100% tax rate leaves nothing to gross up",
            ));
        }

        Ok(())
    }
}
