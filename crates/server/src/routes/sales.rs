use axum::{extract::{Query, State}, http::StatusCode, Extension, Json};
use tracing::info;

use service::auth::domain::AuthContext;
use service::sales_service::{self, CreateSaleInput, SaleWithItems};

use crate::errors::{AppJson, JsonApiError};
use crate::routes::auth::ServerState;
use crate::routes::companies::PeriodQuery;

#[utoipa::path(post, path = "/sales", tag = "sales", request_body = crate::openapi::CreateSaleRequest, responses((status = 201, description = "Sale recorded, stock and monthly revenue updated"), (status = 400, description = "Validation Error or insufficient stock"), (status = 404, description = "Product not found")))]
pub async fn create(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    AppJson(input): AppJson<CreateSaleInput>,
) -> Result<(StatusCode, Json<SaleWithItems>), JsonApiError> {
    let sale = sales_service::create_sale(&state.db, ctx.company_id, input).await?;
    info!(sale_id = %sale.sale.id, total = %sale.sale.total_amount, "sale created");
    Ok((StatusCode::CREATED, Json(sale)))
}

/// Unlike the other period endpoints, no filter means every sale.
#[utoipa::path(get, path = "/sales", tag = "sales", params(PeriodQuery), responses((status = 200, description = "Sales with items, newest first"), (status = 400, description = "month without year")))]
pub async fn list(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Query(q): Query<PeriodQuery>,
) -> Result<Json<Vec<SaleWithItems>>, JsonApiError> {
    Ok(Json(sales_service::list_sales(&state.db, ctx.company_id, q.month, q.year).await?))
}
