//! Installment planning and monthly expense aggregation (pure).

use chrono::{DateTime, Duration, Utc};
use models::expense::{self, ExpenseCategory, ExpenseStatus};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::pricing::round_money;

/// Smallest share an installment can carry.
pub const MIN_INSTALLMENT: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

pub const DEFAULT_INTERVAL_DAYS: u32 = 30;

/// One row of an installment plan, numbered from 1.
#[derive(Debug, Clone, PartialEq)]
pub struct Installment {
    pub number: u32,
    pub count: u32,
    pub description: String,
    pub amount: Decimal,
    pub due_date: DateTime<Utc>,
}

/// Split `amount` into `count` shares spaced `interval_days` apart.
///
/// Every share is `amount / count` truncated to cents; the last share takes the
/// remainder so the plan always sums to `amount` and no share is negative.
/// `count == 0` is treated as 1.
///
/// ```
/// use chrono::Utc;
/// use rust_decimal::Decimal;
/// use service::forecast::plan_installments;
/// let plan = plan_installments("Oven", Decimal::from(100), 3, Utc::now(), 30);
/// let total: Decimal = plan.iter().map(|i| i.amount).sum();
/// assert_eq!(total, Decimal::from(100));
/// assert_eq!(plan[2].description, "Oven (3/3)");
/// ```
pub fn plan_installments(
    description: &str,
    amount: Decimal,
    count: u32,
    first_due: DateTime<Utc>,
    interval_days: u32,
) -> Vec<Installment> {
    let count = count.max(1);
    let share = (amount / Decimal::from(count)).round_dp_with_strategy(2, RoundingStrategy::ToZero);
    let mut allocated = Decimal::ZERO;
    (1..=count)
        .map(|number| {
            let amount_i = if number == count { amount - allocated } else { share };
            allocated += amount_i;
            let description = if count > 1 {
                format!("{} ({}/{})", description.trim(), number, count)
            } else {
                description.trim().to_string()
            };
            Installment {
                number,
                count,
                description,
                amount: amount_i,
                due_date: first_due + Duration::days(i64::from(interval_days) * i64::from(number - 1)),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryTotals {
    pub fixed: Decimal,
    pub variable: Decimal,
    pub debt: Decimal,
    pub investment: Decimal,
}

impl CategoryTotals {
    fn add(&mut self, category: ExpenseCategory, amount: Decimal) {
        let slot = match category {
            ExpenseCategory::Fixed => &mut self.fixed,
            ExpenseCategory::Variable => &mut self.variable,
            ExpenseCategory::Debt => &mut self.debt,
            ExpenseCategory::Investment => &mut self.investment,
        };
        *slot += amount;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExpenseTotals {
    pub total: Decimal,
    pub pending: Decimal,
    pub paid: Decimal,
    pub by_category: CategoryTotals,
}

pub fn summarize_expenses<'a, I>(expenses: I) -> ExpenseTotals
where
    I: IntoIterator<Item = &'a expense::Model>,
{
    let mut t = ExpenseTotals::default();
    for e in expenses {
        t.total += e.amount;
        match e.status {
            ExpenseStatus::Pending => t.pending += e.amount,
            ExpenseStatus::Paid => t.paid += e.amount,
        }
        t.by_category.add(e.category, e.amount);
    }
    t
}

/// `revenue - fixed cost - expenses`, may be negative.
pub fn projected_balance(revenue: Decimal, fixed_cost: Decimal, expenses_total: Decimal) -> Decimal {
    round_money(revenue - fixed_cost - expenses_total)
}
