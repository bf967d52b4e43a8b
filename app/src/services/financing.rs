// app/src/services/financing.rs

use crate::errors::{AppError, Result};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct FinancePlan {
  pub name: &'static str,
  pub description: &'static str,
  pub down_payment_percent: f64,
  pub tenure_months: u32,
  pub annual_rate_percent: f64,
  pub features: &'static [&'static str],
}

pub const PLANS: &[FinancePlan] = &[
  FinancePlan {
    name: "EV Starter Plan",
    description: "Perfect for first-time EV buyers",
    down_payment_percent: 20.0,
    tenure_months: 36,
    annual_rate_percent: 9.5,
    features: &["Low down payment", "Flexible monthly payments", "Insurance included", "Battery warranty coverage"],
  },
  FinancePlan {
    name: "Premium Flex Plan",
    description: "Maximum flexibility with competitive rates",
    down_payment_percent: 15.0,
    tenure_months: 48,
    annual_rate_percent: 8.5,
    features: &["Extended payment terms", "Rate protection guarantee", "Upgrade options available"],
  },
  FinancePlan {
    name: "Executive Plan",
    description: "Premium financing for luxury EVs",
    down_payment_percent: 10.0,
    tenure_months: 60,
    annual_rate_percent: 7.5,
    features: &["Lowest down payment", "Premium customer service", "Vehicle upgrade program"],
  },
];

#[derive(Debug, Clone, Serialize)]
pub struct FinanceQuote {
  pub plan: &'static str,
  pub vehicle_price: i64,
  pub down_payment: i64,
  pub principal: i64,
  pub tenure_months: u32,
  pub annual_rate_percent: f64,
  pub monthly_payment: i64,
  pub total_repayment: i64,
}

pub fn find_plan(tenure_months: u32) -> Result<&'static FinancePlan> {
  PLANS
    .iter()
    .find(|p| p.tenure_months == tenure_months)
    .ok_or_else(|| AppError::Validation(format!("No finance plan with a {}-month tenure.", tenure_months)))
}

fn whole_naira(amount: f64) -> Option<i64> {
  let rounded = amount.round();
  (rounded.is_finite() && rounded >= 0.0 && rounded < i64::MAX as f64).then_some(rounded as i64)
}

/// Standard amortised repayment, rounded to whole naira.
pub fn quote(plan: &'static FinancePlan, vehicle_price: i64) -> Result<FinanceQuote> {
  if vehicle_price <= 0 {
    return Err(AppError::Validation("Vehicle price must be greater than zero.".to_string()));
  }
  let too_large = || AppError::Validation("Vehicle price is too large to finance.".to_string());

  let price = vehicle_price as f64;
  let down_payment = (price * plan.down_payment_percent / 100.0).round();
  let principal = price - down_payment;
  let n = f64::from(plan.tenure_months);
  let r = plan.annual_rate_percent / 100.0 / 12.0;
  let monthly = if r == 0.0 {
    principal / n
  } else {
    principal * r / (1.0 - (1.0 + r).powf(-n))
  };

  let monthly_payment = whole_naira(monthly).ok_or_else(too_large)?;
  let total_repayment = monthly_payment
    .checked_mul(i64::from(plan.tenure_months))
    .ok_or_else(too_large)?;

  Ok(FinanceQuote {
    plan: plan.name,
    vehicle_price,
    down_payment: whole_naira(down_payment).ok_or_else(too_large)?,
    principal: whole_naira(principal).ok_or_else(too_large)?,
    tenure_months: plan.tenure_months,
    annual_rate_percent: plan.annual_rate_percent,
    monthly_payment,
    total_repayment,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn plans_cover_three_tenures() {
    assert_eq!(find_plan(36).unwrap().annual_rate_percent, 9.5);
    assert_eq!(find_plan(48).unwrap().annual_rate_percent, 8.5);
    assert_eq!(find_plan(60).unwrap().annual_rate_percent, 7.5);
    assert!(find_plan(12).is_err());
  }

  #[test]
  fn amortised_monthly_payment() {
    let q = quote(find_plan(36).unwrap(), 10_000_000).unwrap();
    assert_eq!(q.down_payment, 2_000_000);
    assert_eq!(q.principal, 8_000_000);
    // 8,000,000 at 9.5% over 36 months
    assert!((q.monthly_payment - 256_264).abs() <= 2, "got {}", q.monthly_payment);
    assert!(q.total_repayment > q.principal);
  }

  #[test]
  fn oversized_price_is_a_validation_error() {
    let result = quote(find_plan(60).unwrap(), i64::MAX);
    assert!(matches!(result, Err(AppError::Validation(_))));

    // The shortest plan still fits in range at the same price.
    let q = quote(find_plan(36).unwrap(), i64::MAX).unwrap();
    assert_eq!(q.total_repayment, q.monthly_payment * 36);
    assert!(matches!(quote(find_plan(60).unwrap(), 0), Err(AppError::Validation(_))));
  }
}
