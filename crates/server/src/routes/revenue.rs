use axum::{extract::{Path, Query, State}, http::StatusCode, Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use models::monthly_revenue;
use service::auth::domain::AuthContext;
use service::revenue_service::{self, ChartQuery, CreateRevenueInput, RevenuePoint, UpdateRevenueInput};

use crate::errors::{AppJson, JsonApiError};
use crate::routes::auth::ServerState;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct YearQuery { pub year: Option<i32> }

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ChartParams {
    pub start_month: Option<u32>,
    pub start_year: Option<i32>,
    pub end_month: Option<u32>,
    pub end_year: Option<i32>,
}

impl From<ChartParams> for ChartQuery {
    fn from(p: ChartParams) -> Self {
        ChartQuery { start_month: p.start_month, start_year: p.start_year, end_month: p.end_month, end_year: p.end_year }
    }
}

#[utoipa::path(post, path = "/revenue", tag = "revenue", request_body = crate::openapi::CreateRevenueRequest, responses((status = 201, description = "Created"), (status = 400, description = "Validation Error"), (status = 409, description = "Month already recorded")))]
pub async fn create(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    AppJson(input): AppJson<CreateRevenueInput>,
) -> Result<(StatusCode, Json<monthly_revenue::Model>), JsonApiError> {
    let created = revenue_service::create_revenue(&state.db, ctx.company_id, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/revenue", tag = "revenue", params(YearQuery), responses((status = 200, description = "Newest month first")))]
pub async fn list(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Query(q): Query<YearQuery>,
) -> Result<Json<Vec<monthly_revenue::Model>>, JsonApiError> {
    Ok(Json(revenue_service::list_revenues(&state.db, ctx.company_id, q.year).await?))
}

#[utoipa::path(get, path = "/revenue/current", tag = "revenue", responses((status = 200, description = "Current month, zero when nothing is booked")))]
pub async fn current(State(state): State<ServerState>, Extension(ctx): Extension<AuthContext>) -> Result<Json<RevenuePoint>, JsonApiError> {
    Ok(Json(revenue_service::current_revenue(&state.db, ctx.company_id, Utc::now().date_naive()).await?))
}

#[utoipa::path(get, path = "/revenue/chart", tag = "revenue", params(ChartParams), responses((status = 200, description = "One point per month"), (status = 400, description = "Invalid range")))]
pub async fn chart(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Query(q): Query<ChartParams>,
) -> Result<Json<Vec<RevenuePoint>>, JsonApiError> {
    let points = revenue_service::revenue_chart(&state.db, ctx.company_id, q.into(), Utc::now().date_naive()).await?;
    Ok(Json(points))
}

#[utoipa::path(get, path = "/revenue/{id}", tag = "revenue", params(("id" = Uuid, Path, description = "Revenue ID")), responses((status = 200, description = "OK"), (status = 404, description = "Not Found")))]
pub async fn get(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<monthly_revenue::Model>, JsonApiError> {
    Ok(Json(revenue_service::get_revenue(&state.db, ctx.company_id, id).await?))
}

#[utoipa::path(patch, path = "/revenue/{id}", tag = "revenue", params(("id" = Uuid, Path, description = "Revenue ID")), request_body = crate::openapi::UpdateRevenueRequest, responses((status = 200, description = "Updated"), (status = 404, description = "Not Found"), (status = 409, description = "Month already recorded")))]
pub async fn update(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    AppJson(input): AppJson<UpdateRevenueInput>,
) -> Result<Json<monthly_revenue::Model>, JsonApiError> {
    Ok(Json(revenue_service::update_revenue(&state.db, ctx.company_id, id, input).await?))
}

#[utoipa::path(delete, path = "/revenue/{id}", tag = "revenue", params(("id" = Uuid, Path, description = "Revenue ID")), responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found")))]
pub async fn delete(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    revenue_service::delete_revenue(&state.db, ctx.company_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
