use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApvError;
use crate::time_value::{discounted_series, divide, product, round_cents, subtract};
use crate::types::{Money, Rate, Ratio};
use crate::ApvResult;

use super::parameters::ProjectParameters;
use super::parity::ParityModel;

/// One installment of an equal-principal loan, foreign currency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    pub opening_balance: Money,
    pub interest: Money,
    pub principal: Money,
}

impl Installment {
    pub fn payment(&self) -> ApvResult<Money> {
        self.principal
            .checked_add(self.interest)
            .ok_or_else(|| ApvError::overflow("loan payment"))
    }
}

/// Equal-principal amortization: a flat principal slice each period, interest
/// on the balance outstanding at the start of the period.
#[derive(Debug, Clone)]
pub struct DecliningBalance {
    remaining: Money,
    principal_payment: Money,
    rate: Rate,
}

impl DecliningBalance {
    pub fn new(principal: Money, rate: Rate, life: u32) -> ApvResult<Self> {
        let principal_payment = divide(
            principal,
            Decimal::from(life),
            "loan principal payment",
        )?;
        Ok(DecliningBalance {
            remaining: principal,
            principal_payment,
            rate,
        })
    }

    pub fn from_params(params: &ProjectParameters) -> ApvResult<Self> {
        Self::new(
            params.concessional_loan_principal,
            params.concessional_loan_rate,
            params.project_life,
        )
    }

    pub fn principal_payment(&self) -> Money {
        self.principal_payment
    }

    pub fn remaining(&self) -> Money {
        self.remaining
    }

    /// Interest accrues on the current balance; the balance is reduced afterwards.
    pub fn next_installment(&mut self) -> ApvResult<Installment> {
        let opening_balance = self.remaining;
        let interest = opening_balance
            .checked_mul(self.rate)
            .ok_or_else(|| ApvError::overflow("loan interest"))?;
        self.remaining = subtract(self.remaining, self.principal_payment, "loan balance")?;
        Ok(Installment {
            opening_balance,
            interest,
            principal: self.principal_payment,
        })
    }
}

/// One row of the concessional loan payment schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanPaymentPeriod {
    pub period: u32,
    pub opening_balance: Money,
    pub interest: Money,
    pub principal: Money,
    /// principal + interest, foreign currency
    pub payment: Money,
    pub spot_rate: Decimal,
    /// payment × S(t), home currency
    pub payment_home: Money,
    pub discount_factor: Ratio,
    pub present_value: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcessionalLoanOutput {
    pub periods: Vec<LoanPaymentPeriod>,
    pub principal_payment: Money,
    /// Loan principal converted at the current spot rate
    pub loan_value_home: Money,
    /// PV of the home-currency payments at the domestic borrowing rate (unrounded)
    pub pv_loan_payments: Money,
    /// loan_value_home − pv_loan_payments, rounded to cents
    pub loan_benefit: Money,
}

/// Value of borrowing at the concessional rate: the loan is worth its face
/// value today but is repaid at the subsidized rate, discounted at the
/// domestic borrowing rate.
pub fn concessional_loan_benefit(params: &ProjectParameters) -> ApvResult<ConcessionalLoanOutput> {
    params.validate()?;

    let parity = ParityModel::from_params(params);
    let mut schedule = DecliningBalance::from_params(params)?;
    let principal_payment = schedule.principal_payment();

    let series = discounted_series(
        params.project_life,
        params.domestic_borrowing_rate,
        "concessional loan payment",
        |t| {
            let installment = schedule.next_installment()?;
            let spot_rate = parity.spot_at(t)?;
            let payment = installment.payment()?;
            let payment_home = product(&[payment, spot_rate], "loan payment in home currency")?;
            Ok(((installment, payment, spot_rate), payment_home))
        },
    )?;

    let loan_value_home = product(
        &[params.concessional_loan_principal, params.spot_rate],
        "loan value at spot",
    )?;
    let pv_loan_payments = series.total_present_value;
    let loan_benefit = round_cents(subtract(loan_value_home, pv_loan_payments, "loan benefit")?);
    debug!(%loan_value_home, %pv_loan_payments, %loan_benefit, "concessional loan valued");

    let periods = series
        .periods
        .into_iter()
        .enumerate()
        .map(|(idx, ((installment, payment, spot_rate), flow))| LoanPaymentPeriod {
            period: idx as u32 + 1,
            opening_balance: installment.opening_balance,
            interest: installment.interest,
            principal: installment.principal,
            payment,
            spot_rate,
            payment_home: flow.amount,
            discount_factor: flow.discount_factor,
            present_value: flow.present_value,
        })
        .collect();

    Ok(ConcessionalLoanOutput {
        periods,
        principal_payment,
        loan_value_home,
        pv_loan_payments,
        loan_benefit,
    })
}
