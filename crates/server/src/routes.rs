use axum::{
    middleware,
    response::IntoResponse,
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use common::types::Health;

pub mod auth;
pub mod categories;
pub mod companies;
pub mod finance;
pub mod products;
pub mod revenue;
pub mod sales;

use auth::ServerState;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "Service is up", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

#[utoipa::path(get, path = "/metrics", tag = "health", responses((status = 200, description = "Prometheus text format")))]
pub async fn metrics() -> impl IntoResponse {
    common::metrics::encode_metrics()
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(crate::openapi::ApiDoc::openapi())
}

/// Build the full application router: public endpoints plus the company-scoped API
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/api-docs/openapi.json", get(openapi_json))
        .route("/auth/sign-up", post(auth::sign_up))
        .route("/auth/signup", post(auth::sign_up))
        .route("/auth/sign-in", post(auth::sign_in))
        .route("/auth/signin", post(auth::sign_in));

    let api = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/auth/logout", post(auth::logout))
        .route("/companies/me", get(companies::me))
        .route("/companies/settings", put(companies::update_settings))
        .route("/companies/targets", get(companies::targets))
        .route("/categories", get(categories::list).post(categories::create))
        .route("/categories/:id", delete(categories::delete))
        .route("/products", get(products::list).post(products::create))
        .route("/products/pricing", post(products::simulate))
        .route("/products/:id", get(products::get).put(products::update).delete(products::delete))
        .route("/finance/expenses", get(finance::list_expenses).post(finance::create_expense))
        .route(
            "/finance/expenses/:id",
            get(finance::get_expense).put(finance::update_expense).delete(finance::delete_expense),
        )
        .route("/finance/expenses/:id/pay", patch(finance::pay_expense))
        .route("/finance/forecast", get(finance::forecast))
        .route("/revenue", get(revenue::list).post(revenue::create))
        .route("/revenue/current", get(revenue::current))
        .route("/revenue/chart", get(revenue::chart))
        .route("/revenue/:id", get(revenue::get).patch(revenue::update).delete(revenue::delete))
        .route("/sales", get(sales::list).post(sales::create));

    public
        .merge(api)
        .layer(middleware::from_fn_with_state(state.clone(), auth::require_bearer_token_state))
        .layer(middleware::from_fn(common::metrics::track_http))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // 每次请求创建 span，包含方法和路径等，日志级别为 INFO
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // 响应返回时打点，包含状态码与耗时
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 失败（5xx 等）时以 ERROR 记录
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
