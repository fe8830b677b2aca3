//! Adjusted present value of a cross-border project.
//!
//! Each component is a pure function of [`ProjectParameters`]; the aggregator
//! runs them all and sums the results.

pub mod aggregator;
pub mod concessional_loan;
pub mod depreciation;
pub mod interest_shield;
pub mod leverage;
pub mod operating;
pub mod parameters;
pub mod parity;
pub mod repatriation;

pub use aggregator::{calculate_apv, ApvOutput, LoanSummary};
pub use concessional_loan::{concessional_loan_benefit, ConcessionalLoanOutput, DecliningBalance};
pub use depreciation::{depreciation_shields, DepreciationShieldOutput};
pub use interest_shield::{interest_tax_shields, InterestShieldOutput};
pub use leverage::{leverage_factor, LeverageFactor, LeverageSource};
pub use operating::{project_operating_cash_flows, OperatingCashFlowOutput};
pub use parameters::ProjectParameters;
pub use parity::{expected_spot_rates, ParityModel, SpotRatePoint};
pub use repatriation::{repatriation_arbitrage, RepatriationOutput};
