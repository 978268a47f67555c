use axum::{extract::{Path, State}, http::StatusCode, Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use common::types::DataEnvelope;
use models::category;
use service::auth::domain::AuthContext;
use service::category_service;

use crate::errors::{AppJson, JsonApiError};
use crate::routes::auth::ServerState;

#[derive(Debug, Deserialize)]
pub struct CreateCategoryInput { pub name: String }

#[utoipa::path(post, path = "/categories", tag = "categories", request_body = crate::openapi::CategoryRequest, responses((status = 201, description = "Created"), (status = 400, description = "Validation Error"), (status = 409, description = "Duplicate name")))]
pub async fn create(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    AppJson(input): AppJson<CreateCategoryInput>,
) -> Result<(StatusCode, Json<category::Model>), JsonApiError> {
    let created = category_service::create_category(&state.db, ctx.company_id, &input.name).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(get, path = "/categories", tag = "categories", responses((status = 200, description = "`{ data: [...] }`")))]
pub async fn list(State(state): State<ServerState>, Extension(ctx): Extension<AuthContext>) -> Result<Json<DataEnvelope<Vec<category::Model>>>, JsonApiError> {
    let rows = category_service::list_categories(&state.db, ctx.company_id).await?;
    Ok(Json(DataEnvelope::new(rows)))
}

#[utoipa::path(delete, path = "/categories/{id}", tag = "categories", params(("id" = Uuid, Path, description = "Category ID")), responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found"), (status = 409, description = "Category in use")))]
pub async fn delete(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    category_service::delete_category(&state.db, ctx.company_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
