use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, ModelTrait, QueryFilter, Set, SqlErr};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use models::monthly_revenue;
use crate::errors::ServiceError;
use crate::pricing::{round_money, shift_month};

/// Months shown by the chart when no range is given, current month included.
pub const DEFAULT_CHART_MONTHS: i32 = 6;
pub const MAX_CHART_MONTHS: i32 = 120;

const DUPLICATE_MONTH: &str = "Revenue for this month and year already exists";

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRevenueInput {
    pub month: i16,
    pub year: i32,
    pub total_revenue: Decimal,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRevenueInput {
    pub month: Option<i16>,
    pub year: Option<i32>,
    pub total_revenue: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ChartQuery {
    pub start_month: Option<u32>,
    pub start_year: Option<i32>,
    pub end_month: Option<u32>,
    pub end_year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenuePoint {
    pub month: u32,
    pub year: i32,
    pub total_revenue: Decimal,
}

/// The unique (company, month, year) index catches a concurrent write of the same month.
fn revenue_write_error(e: DbErr) -> ServiceError {
    let unique = matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
        || e.to_string().contains("duplicate key");
    if unique {
        return ServiceError::Conflict(DUPLICATE_MONTH.into());
    }
    ServiceError::db(e)
}

fn validate_total(v: Decimal) -> Result<(), ServiceError> {
    if v <= Decimal::ZERO {
        return Err(ServiceError::Validation("total_revenue must be positive".into()));
    }
    Ok(())
}

/// Record a month manually; a month can only be created once.
#[instrument(skip(db, input), fields(company_id = %company_id, month = input.month, year = input.year))]
pub async fn create_revenue(db: &DatabaseConnection, company_id: Uuid, input: CreateRevenueInput) -> Result<monthly_revenue::Model, ServiceError> {
    monthly_revenue::validate_month(input.month)?;
    monthly_revenue::validate_year(input.year)?;
    validate_total(input.total_revenue)?;
    if monthly_revenue::find_by_month(db, company_id, input.month, input.year).await?.is_some() {
        return Err(ServiceError::Conflict(DUPLICATE_MONTH.into()));
    }
    let now = Utc::now().into();
    let am = monthly_revenue::ActiveModel {
        id: Set(Uuid::new_v4()),
        company_id: Set(company_id),
        month: Set(input.month),
        year: Set(input.year),
        total_revenue: Set(round_money(input.total_revenue)),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let created = am.insert(db).await.map_err(revenue_write_error)?;
    info!(revenue_id = %created.id, "revenue_created");
    Ok(created)
}

pub async fn list_revenues(db: &DatabaseConnection, company_id: Uuid, year: Option<i32>) -> Result<Vec<monthly_revenue::Model>, ServiceError> {
    Ok(monthly_revenue::list_by_company(db, company_id, year).await?)
}

/// Revenue of the month containing `today`, zero when nothing was booked.
pub async fn current_revenue(db: &DatabaseConnection, company_id: Uuid, today: NaiveDate) -> Result<RevenuePoint, ServiceError> {
    let (month, year) = (today.month(), today.year());
    let total = monthly_revenue::find_by_month(db, company_id, month as i16, year)
        .await?
        .map(|r| r.total_revenue)
        .unwrap_or(Decimal::ZERO);
    Ok(RevenuePoint { month, year, total_revenue: total })
}

/// Inclusive `(start, end)` range of the chart, validated.
pub fn chart_range(q: ChartQuery, today: NaiveDate) -> Result<((u32, i32), (u32, i32)), ServiceError> {
    let end = (q.end_month.unwrap_or(today.month()), q.end_year.unwrap_or(today.year()));
    monthly_revenue::validate_year(end.1)?;
    if let Some(y) = q.start_year { monthly_revenue::validate_year(y)?; }
    let default_start = shift_month(end.0, end.1, -(DEFAULT_CHART_MONTHS - 1));
    let start = (q.start_month.unwrap_or(default_start.0), q.start_year.unwrap_or(default_start.1));
    for (m, _) in [start, end] {
        if !(1..=12).contains(&m) {
            return Err(ServiceError::Validation("month must be between 1 and 12".into()));
        }
    }
    let span = (end.1 * 12 + end.0 as i32) - (start.1 * 12 + start.0 as i32);
    if span < 0 {
        return Err(ServiceError::Validation("chart start must not be after end".into()));
    }
    if span >= MAX_CHART_MONTHS {
        return Err(ServiceError::Validation(format!("chart range is limited to {MAX_CHART_MONTHS} months")));
    }
    Ok((start, end))
}

/// One point per month of the range; months without a row are zero.
pub fn fill_chart(rows: &[monthly_revenue::Model], start: (u32, i32), end: (u32, i32)) -> Vec<RevenuePoint> {
    let by_month: HashMap<(u32, i32), Decimal> = rows
        .iter()
        .map(|r| ((r.month as u32, r.year), r.total_revenue))
        .collect();
    let mut out = Vec::new();
    let mut cur = start;
    loop {
        out.push(RevenuePoint {
            month: cur.0,
            year: cur.1,
            total_revenue: by_month.get(&cur).copied().unwrap_or(Decimal::ZERO),
        });
        if cur == end {
            break;
        }
        cur = shift_month(cur.0, cur.1, 1);
    }
    out
}

pub async fn revenue_chart(db: &DatabaseConnection, company_id: Uuid, q: ChartQuery, today: NaiveDate) -> Result<Vec<RevenuePoint>, ServiceError> {
    let (start, end) = chart_range(q, today)?;
    let rows = monthly_revenue::Entity::find()
        .filter(monthly_revenue::Column::CompanyId.eq(company_id))
        .filter(monthly_revenue::Column::Year.between(start.1, end.1))
        .all(db)
        .await
        .map_err(ServiceError::db)?;
    Ok(fill_chart(&rows, start, end))
}

pub async fn get_revenue(db: &DatabaseConnection, company_id: Uuid, id: Uuid) -> Result<monthly_revenue::Model, ServiceError> {
    monthly_revenue::find_for_company(db, company_id, id)
        .await?
        .ok_or_else(|| ServiceError::not_found("revenue"))
}

/// Partial update; moving onto a month that already has a row conflicts.
#[instrument(skip(db, input), fields(company_id = %company_id, revenue_id = %id))]
pub async fn update_revenue(db: &DatabaseConnection, company_id: Uuid, id: Uuid, input: UpdateRevenueInput) -> Result<monthly_revenue::Model, ServiceError> {
    if let Some(m) = input.month { monthly_revenue::validate_month(m)?; }
    if let Some(y) = input.year { monthly_revenue::validate_year(y)?; }
    if let Some(t) = input.total_revenue { validate_total(t)?; }

    let existing = get_revenue(db, company_id, id).await?;
    let month = input.month.unwrap_or(existing.month);
    let year = input.year.unwrap_or(existing.year);
    if (month, year) != (existing.month, existing.year) {
        if let Some(other) = monthly_revenue::find_by_month(db, company_id, month, year).await? {
            if other.id != existing.id {
                return Err(ServiceError::Conflict(DUPLICATE_MONTH.into()));
            }
        }
    }

    let mut am: monthly_revenue::ActiveModel = existing.into();
    am.month = Set(month);
    am.year = Set(year);
    if let Some(t) = input.total_revenue { am.total_revenue = Set(round_money(t)); }
    am.updated_at = Set(Utc::now().into());
    am.update(db).await.map_err(revenue_write_error)
}

#[instrument(skip(db), fields(company_id = %company_id, revenue_id = %id))]
pub async fn delete_revenue(db: &DatabaseConnection, company_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
    let existing = get_revenue(db, company_id, id).await?;
    existing.delete(db).await.map_err(ServiceError::db)?;
    Ok(())
}
