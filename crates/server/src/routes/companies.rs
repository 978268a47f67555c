use axum::{extract::{Query, State}, Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use models::company;
use service::auth::domain::AuthContext;
use service::company_service::{self, SalesTargetReport, UpdateSettingsInput};

use crate::errors::{AppJson, JsonApiError};
use crate::routes::auth::ServerState;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct PeriodQuery {
    /// 1..=12, defaults to the current month
    pub month: Option<u32>,
    pub year: Option<i32>,
}

#[utoipa::path(get, path = "/companies/me", tag = "companies", responses((status = 200, description = "Current company"), (status = 404, description = "Not Found")))]
pub async fn me(State(state): State<ServerState>, Extension(ctx): Extension<AuthContext>) -> Result<Json<company::Model>, JsonApiError> {
    Ok(Json(company_service::get_company(&state.db, ctx.company_id).await?))
}

#[utoipa::path(put, path = "/companies/settings", tag = "companies", request_body = crate::openapi::CompanySettingsRequest, responses((status = 200, description = "Updated"), (status = 400, description = "Validation Error")))]
pub async fn update_settings(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    AppJson(input): AppJson<UpdateSettingsInput>,
) -> Result<Json<company::Model>, JsonApiError> {
    let updated = company_service::update_settings(&state.db, ctx.company_id, input).await?;
    info!(company_id = %updated.id, "company settings updated");
    Ok(Json(updated))
}

#[utoipa::path(get, path = "/companies/targets", tag = "companies", params(PeriodQuery), responses((status = 200, description = "Sales target for the month"), (status = 400, description = "Validation Error")))]
pub async fn targets(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Query(q): Query<PeriodQuery>,
) -> Result<Json<SalesTargetReport>, JsonApiError> {
    let today = Utc::now().date_naive();
    let (month, year) = company_service::resolve_period(q.month, q.year, today)?;
    Ok(Json(company_service::sales_targets(&state.db, ctx.company_id, month, year, today).await?))
}
