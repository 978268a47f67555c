use serde::Serialize;
use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

// Money, percentages and quantities travel as decimal strings ("76.92").

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct SignUpRequest { pub name: String, pub email: String, pub password: String, pub company_name: String }

#[derive(ToSchema)]
pub struct SignInRequest { pub email: String, pub password: String }

#[derive(ToSchema)]
pub struct CompanySettingsRequest {
    pub name: Option<String>,
    pub monthly_fixed_cost: Option<String>,
    /// Percent, 0..=100
    pub default_tax_rate: Option<String>,
    /// Percent, 0..=100
    pub default_card_fee: Option<String>,
    /// Percent, 0..=100
    pub desired_margin: Option<String>,
    pub target_profit_value: Option<String>,
}

#[derive(ToSchema)]
pub struct CategoryRequest { pub name: String }

#[derive(ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    /// Defaults to the company's "General" category
    pub category_id: Option<Uuid>,
    pub unit: Option<String>,
    pub cost_price: String,
    /// Omit to get the suggested smart price
    pub sale_price: Option<String>,
    pub stock: Option<String>,
}

#[derive(ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub unit: Option<String>,
    pub cost_price: Option<String>,
    pub sale_price: Option<String>,
    pub stock: Option<String>,
}

#[derive(ToSchema)]
pub struct PricingRequest {
    pub cost_price: String,
    pub sale_price: Option<String>,
    pub tax_rate: Option<String>,
    pub card_fee: Option<String>,
    pub desired_margin: Option<String>,
}

#[derive(ToSchema)]
pub struct CreateExpenseRequest {
    pub description: String,
    pub amount: String,
    pub due_date: String,
    pub paid_at: Option<String>,
    /// PENDING or PAID
    pub status: Option<String>,
    /// FIXED, VARIABLE, DEBT or INVESTMENT
    pub category: String,
    pub is_recurring: Option<bool>,
    pub installments: Option<u32>,
    pub interval_days: Option<u32>,
}

#[derive(ToSchema)]
pub struct UpdateExpenseRequest {
    pub description: Option<String>,
    pub amount: Option<String>,
    pub due_date: Option<String>,
    pub paid_at: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub is_recurring: Option<bool>,
}

#[derive(ToSchema)]
pub struct CreateRevenueRequest { pub month: i16, pub year: i32, pub total_revenue: String }

#[derive(ToSchema)]
pub struct UpdateRevenueRequest { pub month: Option<i16>, pub year: Option<i32>, pub total_revenue: Option<String> }

#[derive(ToSchema, Serialize)]
pub struct SaleItemRequest { pub product_id: Uuid, pub quantity: String }

#[derive(ToSchema, Serialize)]
pub struct CreateSaleRequest {
    pub date: String,
    /// ITEMIZED or DAILY_TOTAL
    #[serde(rename = "type")]
    pub sale_type: String,
    /// DAILY_TOTAL only
    pub total_amount: Option<String>,
    /// ITEMIZED only
    pub items: Vec<SaleItemRequest>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::metrics,
        crate::routes::auth::sign_up,
        crate::routes::auth::sign_in,
        crate::routes::auth::me,
        crate::routes::auth::logout,
        crate::routes::companies::me,
        crate::routes::companies::update_settings,
        crate::routes::companies::targets,
        crate::routes::categories::create,
        crate::routes::categories::list,
        crate::routes::categories::delete,
        crate::routes::products::create,
        crate::routes::products::simulate,
        crate::routes::products::list,
        crate::routes::products::get,
        crate::routes::products::update,
        crate::routes::products::delete,
        crate::routes::finance::create_expense,
        crate::routes::finance::list_expenses,
        crate::routes::finance::get_expense,
        crate::routes::finance::update_expense,
        crate::routes::finance::delete_expense,
        crate::routes::finance::pay_expense,
        crate::routes::finance::forecast,
        crate::routes::revenue::create,
        crate::routes::revenue::list,
        crate::routes::revenue::current,
        crate::routes::revenue::chart,
        crate::routes::revenue::get,
        crate::routes::revenue::update,
        crate::routes::revenue::delete,
        crate::routes::sales::create,
        crate::routes::sales::list,
    ),
    components(
        schemas(
            HealthResponse,
            SignUpRequest,
            SignInRequest,
            CompanySettingsRequest,
            CategoryRequest,
            CreateProductRequest,
            UpdateProductRequest,
            PricingRequest,
            CreateExpenseRequest,
            UpdateExpenseRequest,
            CreateRevenueRequest,
            UpdateRevenueRequest,
            SaleItemRequest,
            CreateSaleRequest,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "companies"),
        (name = "categories"),
        (name = "products"),
        (name = "finance"),
        (name = "revenue"),
        (name = "sales"),
    )
)]
pub struct ApiDoc;
