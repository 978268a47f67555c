use axum::{extract::{Path, State}, http::StatusCode, Extension, Json};
use tracing::info;
use uuid::Uuid;

use models::product;
use service::auth::domain::AuthContext;
use service::pricing::PricingResult;
use service::product_service::{self, CreateProductInput, PricingSimulationInput, UpdateProductInput};

use crate::errors::{AppJson, JsonApiError};
use crate::routes::auth::ServerState;

#[utoipa::path(post, path = "/products", tag = "products", request_body = crate::openapi::CreateProductRequest, responses((status = 201, description = "Created with smart pricing"), (status = 400, description = "Validation Error"), (status = 404, description = "Category not found")))]
pub async fn create(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    AppJson(input): AppJson<CreateProductInput>,
) -> Result<(StatusCode, Json<product::Model>), JsonApiError> {
    let created = product_service::create_product(&state.db, ctx.company_id, input).await?;
    info!(product_id = %created.id, "product created");
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(post, path = "/products/pricing", tag = "products", request_body = crate::openapi::PricingRequest, responses((status = 200, description = "Simulated price, nothing stored"), (status = 400, description = "Validation Error")))]
pub async fn simulate(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    AppJson(input): AppJson<PricingSimulationInput>,
) -> Result<Json<PricingResult>, JsonApiError> {
    Ok(Json(product_service::simulate_pricing(&state.db, ctx.company_id, input).await?))
}

#[utoipa::path(get, path = "/products", tag = "products", responses((status = 200, description = "List OK")))]
pub async fn list(State(state): State<ServerState>, Extension(ctx): Extension<AuthContext>) -> Result<Json<Vec<product::Model>>, JsonApiError> {
    Ok(Json(product_service::list_products(&state.db, ctx.company_id).await?))
}

#[utoipa::path(get, path = "/products/{id}", tag = "products", params(("id" = Uuid, Path, description = "Product ID")), responses((status = 200, description = "OK"), (status = 404, description = "Not Found")))]
pub async fn get(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<product::Model>, JsonApiError> {
    Ok(Json(product_service::get_product(&state.db, ctx.company_id, id).await?))
}

#[utoipa::path(put, path = "/products/{id}", tag = "products", params(("id" = Uuid, Path, description = "Product ID")), request_body = crate::openapi::UpdateProductRequest, responses((status = 200, description = "Updated and re-priced"), (status = 400, description = "Validation Error"), (status = 404, description = "Not Found")))]
pub async fn update(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    AppJson(input): AppJson<UpdateProductInput>,
) -> Result<Json<product::Model>, JsonApiError> {
    Ok(Json(product_service::update_product(&state.db, ctx.company_id, id, input).await?))
}

#[utoipa::path(delete, path = "/products/{id}", tag = "products", params(("id" = Uuid, Path, description = "Product ID")), responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"), (status = 409, description = "Product has sales")))]
pub async fn delete(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    product_service::delete_product(&state.db, ctx.company_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
