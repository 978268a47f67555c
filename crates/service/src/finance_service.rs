use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, ModelTrait, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use models::expense::{self, ExpenseCategory, ExpenseStatus};
use models::monthly_revenue;
use crate::company_service::get_company;
use crate::errors::ServiceError;
use crate::forecast::{self, ExpenseTotals, DEFAULT_INTERVAL_DAYS, MIN_INSTALLMENT};
use crate::pricing::{self, round_money};

pub const MAX_INSTALLMENTS: u32 = 360;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateExpenseInput {
    pub description: String,
    pub amount: Decimal,
    pub due_date: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub status: Option<ExpenseStatus>,
    pub category: ExpenseCategory,
    pub is_recurring: Option<bool>,
    /// Number of rows to split `amount` into (default 1)
    pub installments: Option<u32>,
    /// Days between installment due dates (default 30)
    pub interval_days: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateExpenseInput {
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub due_date: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub status: Option<ExpenseStatus>,
    pub category: Option<ExpenseCategory>,
    pub is_recurring: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForecastReport {
    pub month: u32,
    pub year: i32,
    pub revenue: Decimal,
    pub fixed_cost: Decimal,
    pub expenses: ExpenseTotals,
    pub projected_balance: Decimal,
    pub pending_expenses: Vec<expense::Model>,
}

fn validate_create(input: &CreateExpenseInput) -> Result<(u32, u32), ServiceError> {
    expense::validate_description(&input.description)?;
    expense::validate_amount(input.amount)?;
    let installments = input.installments.unwrap_or(1);
    if !(1..=MAX_INSTALLMENTS).contains(&installments) {
        return Err(ServiceError::Validation(format!("installments must be between 1 and {MAX_INSTALLMENTS}")));
    }
    if round_money(input.amount) < MIN_INSTALLMENT * Decimal::from(installments) {
        return Err(ServiceError::Validation("amount is too small for the number of installments".into()));
    }
    let interval = input.interval_days.unwrap_or(DEFAULT_INTERVAL_DAYS);
    if interval == 0 {
        return Err(ServiceError::Validation("interval_days must be at least 1".into()));
    }
    Ok((installments, interval))
}

/// Create an expense, split into installments when requested.
///
/// All rows share one `installment_group_id` and are written in a single
/// transaction. Returns every created row ordered by due date.
#[instrument(skip(db, input), fields(company_id = %company_id))]
pub async fn create_expense(db: &DatabaseConnection, company_id: Uuid, input: CreateExpenseInput) -> Result<Vec<expense::Model>, ServiceError> {
    let (installments, interval) = validate_create(&input)?;
    let status = input.status.unwrap_or(ExpenseStatus::Pending);
    let paid_at = match status {
        ExpenseStatus::Paid => Some(input.paid_at.unwrap_or_else(Utc::now)),
        ExpenseStatus::Pending => None,
    };
    let plan = forecast::plan_installments(&input.description, round_money(input.amount), installments, input.due_date, interval);
    let group_id = (installments > 1).then(Uuid::new_v4);

    let txn = db.begin().await.map_err(ServiceError::db)?;
    let now = Utc::now().into();
    let mut created = Vec::with_capacity(plan.len());
    for share in plan {
        let am = expense::ActiveModel {
            id: Set(Uuid::new_v4()),
            company_id: Set(company_id),
            description: Set(share.description),
            amount: Set(share.amount),
            due_date: Set(share.due_date.into()),
            paid_at: Set(paid_at.map(Into::into)),
            status: Set(status),
            category: Set(input.category),
            is_recurring: Set(input.is_recurring.unwrap_or(false)),
            installment_number: Set(share.number as i32),
            installment_count: Set(share.count as i32),
            installment_group_id: Set(group_id),
            created_at: Set(now),
            updated_at: Set(now),
        };
        created.push(am.insert(&txn).await.map_err(ServiceError::db)?);
    }
    txn.commit().await.map_err(ServiceError::db)?;
    info!(rows = created.len(), group_id = ?group_id, "expense_created");
    Ok(created)
}

pub async fn list_expenses(db: &DatabaseConnection, company_id: Uuid) -> Result<Vec<expense::Model>, ServiceError> {
    Ok(expense::list_by_company(db, company_id).await?)
}

pub async fn get_expense(db: &DatabaseConnection, company_id: Uuid, id: Uuid) -> Result<expense::Model, ServiceError> {
    expense::find_for_company(db, company_id, id)
        .await?
        .ok_or_else(|| ServiceError::not_found("expense"))
}

#[instrument(skip(db, input), fields(company_id = %company_id, expense_id = %id))]
pub async fn update_expense(db: &DatabaseConnection, company_id: Uuid, id: Uuid, input: UpdateExpenseInput) -> Result<expense::Model, ServiceError> {
    if let Some(d) = &input.description { expense::validate_description(d)?; }
    if let Some(a) = input.amount { expense::validate_amount(a)?; }

    let existing = get_expense(db, company_id, id).await?;
    let mut am: expense::ActiveModel = existing.into();
    if let Some(d) = input.description { am.description = Set(d.trim().to_string()); }
    if let Some(a) = input.amount { am.amount = Set(round_money(a)); }
    if let Some(d) = input.due_date { am.due_date = Set(d.into()); }
    if let Some(c) = input.category { am.category = Set(c); }
    if let Some(r) = input.is_recurring { am.is_recurring = Set(r); }
    match input.status {
        Some(ExpenseStatus::Pending) => {
            am.status = Set(ExpenseStatus::Pending);
            am.paid_at = Set(None);
        }
        Some(ExpenseStatus::Paid) => {
            am.status = Set(ExpenseStatus::Paid);
            am.paid_at = Set(Some(input.paid_at.unwrap_or_else(Utc::now).into()));
        }
        None => {
            if let Some(p) = input.paid_at { am.paid_at = Set(Some(p.into())); }
        }
    }
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await.map_err(ServiceError::db)?)
}

#[instrument(skip(db), fields(company_id = %company_id, expense_id = %id))]
pub async fn delete_expense(db: &DatabaseConnection, company_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
    let existing = get_expense(db, company_id, id).await?;
    existing.delete(db).await.map_err(ServiceError::db)?;
    Ok(())
}

/// Mark an expense as paid; `paid_at` defaults to now.
#[instrument(skip(db), fields(company_id = %company_id, expense_id = %id))]
pub async fn pay_expense(db: &DatabaseConnection, company_id: Uuid, id: Uuid, paid_at: Option<DateTime<Utc>>) -> Result<expense::Model, ServiceError> {
    let existing = get_expense(db, company_id, id).await?;
    let mut am: expense::ActiveModel = existing.into();
    am.status = Set(ExpenseStatus::Paid);
    am.paid_at = Set(Some(paid_at.unwrap_or_else(Utc::now).into()));
    am.updated_at = Set(Utc::now().into());
    let paid = am.update(db).await.map_err(ServiceError::db)?;
    info!("expense_paid");
    Ok(paid)
}

/// Revenue against fixed cost and the month's expenses.
#[instrument(skip(db), fields(company_id = %company_id))]
pub async fn monthly_forecast(db: &DatabaseConnection, company_id: Uuid, month: u32, year: i32) -> Result<ForecastReport, ServiceError> {
    let c = get_company(db, company_id).await?;
    let (start, end) = pricing::month_bounds(year, month)
        .ok_or_else(|| ServiceError::Validation("invalid month".into()))?;
    let rows = expense::list_for_period(db, company_id, start.into(), end.into()).await?;
    let totals = forecast::summarize_expenses(&rows);
    let revenue = monthly_revenue::find_by_month(db, company_id, month as i16, year)
        .await?
        .map(|r| r.total_revenue)
        .unwrap_or(Decimal::ZERO);

    let projected_balance = forecast::projected_balance(revenue, c.monthly_fixed_cost, totals.total);
    let pending_expenses = rows.into_iter().filter(|e| e.status == ExpenseStatus::Pending).collect();
    Ok(ForecastReport {
        month,
        year,
        revenue,
        fixed_cost: c.monthly_fixed_cost,
        expenses: totals,
        projected_balance,
        pending_expenses,
    })
}
