use axum::{extract::{Path, Query, State}, http::StatusCode, Extension, Json};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use models::expense;
use service::auth::domain::AuthContext;
use service::company_service::resolve_period;
use service::finance_service::{self, CreateExpenseInput, ForecastReport, UpdateExpenseInput};

use crate::errors::{AppJson, JsonApiError};
use crate::routes::auth::ServerState;
use crate::routes::companies::PeriodQuery;

#[derive(Debug, Default, Deserialize)]
pub struct PayExpenseInput {
    pub paid_at: Option<DateTime<Utc>>,
}

#[utoipa::path(post, path = "/finance/expenses", tag = "finance", request_body = crate::openapi::CreateExpenseRequest, responses((status = 201, description = "Created; every installment row is returned"), (status = 400, description = "Validation Error")))]
pub async fn create_expense(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    AppJson(input): AppJson<CreateExpenseInput>,
) -> Result<(StatusCode, Json<Vec<expense::Model>>), JsonApiError> {
    let rows = finance_service::create_expense(&state.db, ctx.company_id, input).await?;
    info!(rows = rows.len(), "expense created");
    Ok((StatusCode::CREATED, Json(rows)))
}

#[utoipa::path(get, path = "/finance/expenses", tag = "finance", responses((status = 200, description = "Expenses by due date")))]
pub async fn list_expenses(State(state): State<ServerState>, Extension(ctx): Extension<AuthContext>) -> Result<Json<Vec<expense::Model>>, JsonApiError> {
    Ok(Json(finance_service::list_expenses(&state.db, ctx.company_id).await?))
}

#[utoipa::path(get, path = "/finance/expenses/{id}", tag = "finance", params(("id" = Uuid, Path, description = "Expense ID")), responses((status = 200, description = "OK"), (status = 404, description = "Not Found")))]
pub async fn get_expense(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<expense::Model>, JsonApiError> {
    Ok(Json(finance_service::get_expense(&state.db, ctx.company_id, id).await?))
}

#[utoipa::path(put, path = "/finance/expenses/{id}", tag = "finance", params(("id" = Uuid, Path, description = "Expense ID")), request_body = crate::openapi::UpdateExpenseRequest, responses((status = 200, description = "Updated"), (status = 400, description = "Validation Error"), (status = 404, description = "Not Found")))]
pub async fn update_expense(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    AppJson(input): AppJson<UpdateExpenseInput>,
) -> Result<Json<expense::Model>, JsonApiError> {
    Ok(Json(finance_service::update_expense(&state.db, ctx.company_id, id, input).await?))
}

#[utoipa::path(delete, path = "/finance/expenses/{id}", tag = "finance", params(("id" = Uuid, Path, description = "Expense ID")), responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found")))]
pub async fn delete_expense(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    finance_service::delete_expense(&state.db, ctx.company_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// The body is optional; without `paid_at` the expense is paid now.
#[utoipa::path(patch, path = "/finance/expenses/{id}/pay", tag = "finance", params(("id" = Uuid, Path, description = "Expense ID")), responses((status = 200, description = "Marked as paid"), (status = 404, description = "Not Found")))]
pub async fn pay_expense(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    body: Option<Json<PayExpenseInput>>,
) -> Result<Json<expense::Model>, JsonApiError> {
    let paid_at = body.and_then(|Json(b)| b.paid_at);
    Ok(Json(finance_service::pay_expense(&state.db, ctx.company_id, id, paid_at).await?))
}

#[utoipa::path(get, path = "/finance/forecast", tag = "finance", params(PeriodQuery), responses((status = 200, description = "Monthly forecast"), (status = 400, description = "Validation Error")))]
pub async fn forecast(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Query(q): Query<PeriodQuery>,
) -> Result<Json<ForecastReport>, JsonApiError> {
    let (month, year) = resolve_period(q.month, q.year, Utc::now().date_naive())?;
    Ok(Json(finance_service::monthly_forecast(&state.db, ctx.company_id, month, year).await?))
}
