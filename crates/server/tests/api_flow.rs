use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use migration::MigratorTrait;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::Service;
use uuid::Uuid;

struct Session {
    app: Router,
    token: String,
}

impl Session {
    async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> anyhow::Result<(StatusCode, Value)> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", format!("Bearer {}", self.token));
        let req = match body {
            Some(b) => builder.header("content-type", "application/json").body(Body::from(serde_json::to_vec(&b)?))?,
            None => builder.body(Body::empty())?,
        };
        let resp = self.app.clone().call(req).await?;
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await?;
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
        Ok((status, value))
    }
}

fn dec(v: &Value) -> Decimal {
    v.as_str().and_then(|s| s.parse().ok()).unwrap_or_else(|| panic!("not a decimal: {v}"))
}

/// Fresh company with a signed-in owner, or `None` when Postgres is unavailable.
async fn session() -> anyhow::Result<Option<Session>> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(None); }
    let db = match models::db::connect().await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("database unavailable, skipping: {e}");
            return Ok(None);
        }
    };
    if let Err(e) = migration::Migrator::up(&db, None).await {
        eprintln!("migrations notice: {e}");
    }
    let cfg = configs::AuthConfig { jwt_secret: "api-flow-test-secret".into(), token_ttl_hours: 1 };
    let app = server::build_app(db, &cfg);

    let email = format!("flow_{}@example.com", Uuid::new_v4());
    let sign_up = json!({"name": "Owner", "email": email, "password": "S3curePass!", "company_name": "Flow Shop"});
    let req = Request::builder()
        .method("POST")
        .uri("/auth/sign-up")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&sign_up)?))?;
    assert_eq!(app.clone().call(req).await?.status(), StatusCode::CREATED);

    let req = Request::builder()
        .method("POST")
        .uri("/auth/sign-in")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&json!({"email": email, "password": "S3curePass!"}))?))?;
    let resp = app.clone().call(req).await?;
    let bytes = to_bytes(resp.into_body(), usize::MAX).await?;
    let body: Value = serde_json::from_slice(&bytes)?;
    let token = body["token"].as_str().unwrap_or_default().to_string();
    Ok(Some(Session { app, token }))
}

#[tokio::test]
async fn pricing_settings_and_products() -> anyhow::Result<()> {
    let Some(s) = session().await? else { return Ok(()) };

    let (status, company) = s.send("PUT", "/companies/settings", Some(json!({
        "default_tax_rate": "10", "default_card_fee": "5", "desired_margin": "20", "monthly_fixed_cost": "1000"
    }))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dec(&company["desired_margin"]), Decimal::from(20));

    let (status, _) = s.send("PUT", "/companies/settings", Some(json!({"default_tax_rate": "150"}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, product) = s.send("POST", "/products", Some(json!({"name": "Cake", "cost_price": "50", "stock": "10"}))).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(dec(&product["sale_price"]), Decimal::new(7692, 2));

    let (status, sim) = s.send("POST", "/products/pricing", Some(json!({"cost_price": "50", "sale_price": "100"}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dec(&sim["markup"]), Decimal::from(100));

    let id = product["id"].as_str().unwrap_or_default();
    let (status, updated) = s.send("PUT", &format!("/products/{id}"), Some(json!({"sale_price": "80"}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dec(&updated["markup"]), Decimal::from(60));

    let (status, list) = s.send("GET", "/products", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().map(Vec::len), Some(1));

    let (status, _) = s.send("GET", &format!("/products/{}", Uuid::new_v4()), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn sales_update_stock_and_monthly_revenue() -> anyhow::Result<()> {
    let Some(s) = session().await? else { return Ok(()) };
    let (_, product) = s.send("POST", "/products", Some(json!({"name": "Bread", "cost_price": "4", "sale_price": "7.50", "stock": "10"}))).await?;
    let pid = product["id"].as_str().unwrap_or_default().to_string();

    let (status, sale) = s.send("POST", "/sales", Some(json!({
        "date": "2024-05-10T12:00:00Z", "type": "ITEMIZED", "items": [{"product_id": pid, "quantity": "2"}]
    }))).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(dec(&sale["total_amount"]), Decimal::from(15));
    assert_eq!(sale["items"].as_array().map(Vec::len), Some(1));

    let (status, _) = s.send("POST", "/sales", Some(json!({
        "date": "2024-05-11T12:00:00Z", "sale_type": "DAILY_TOTAL", "total_amount": "100"
    }))).await?;
    assert_eq!(status, StatusCode::CREATED);

    let (status, err) = s.send("POST", "/sales", Some(json!({
        "date": "2024-05-12T12:00:00Z", "type": "ITEMIZED", "items": [{"product_id": pid, "quantity": "50"}]
    }))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(err["details"].as_str().unwrap_or_default().contains("Insufficient stock"));

    let (_, product) = s.send("GET", &format!("/products/{pid}"), None).await?;
    assert_eq!(dec(&product["stock"]), Decimal::from(8));

    let (_, revenue) = s.send("GET", "/revenue?year=2024", None).await?;
    let rows = revenue.as_array().cloned().unwrap_or_default();
    assert_eq!(rows.len(), 1);
    assert_eq!(dec(&rows[0]["total_revenue"]), Decimal::from(115));

    let (status, sales) = s.send("GET", "/sales?month=5&year=2024", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sales.as_array().map(Vec::len), Some(2));

    let (status, _) = s.send("GET", "/sales?month=5", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = s.send("DELETE", &format!("/products/{pid}"), None).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn manual_revenue_conflicts_and_chart() -> anyhow::Result<()> {
    let Some(s) = session().await? else { return Ok(()) };
    let (status, jan) = s.send("POST", "/revenue", Some(json!({"month": 1, "year": 2023, "total_revenue": "500"}))).await?;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = s.send("POST", "/revenue", Some(json!({"month": 1, "year": 2023, "total_revenue": "1"}))).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, chart) = s.send("GET", "/revenue/chart?start_month=12&start_year=2022&end_month=2&end_year=2023", None).await?;
    assert_eq!(status, StatusCode::OK);
    let totals: Vec<Decimal> = chart.as_array().cloned().unwrap_or_default().iter().map(|p| dec(&p["total_revenue"])).collect();
    assert_eq!(totals, vec![Decimal::ZERO, Decimal::from(500), Decimal::ZERO]);

    let (status, current) = s.send("GET", "/revenue/current", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(current["month"].is_number());

    let id = jan["id"].as_str().unwrap_or_default();
    let (status, patched) = s.send("PATCH", &format!("/revenue/{id}"), Some(json!({"total_revenue": "650"}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dec(&patched["total_revenue"]), Decimal::from(650));

    let (status, _) = s.send("DELETE", &format!("/revenue/{id}"), None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    Ok(())
}

#[tokio::test]
async fn expenses_forecast_and_targets() -> anyhow::Result<()> {
    let Some(s) = session().await? else { return Ok(()) };
    let (_, _) = s.send("PUT", "/companies/settings", Some(json!({"monthly_fixed_cost": "1000", "target_profit_value": "5000"}))).await?;

    let (status, rows) = s.send("POST", "/finance/expenses", Some(json!({
        "description": "Oven", "amount": "1000", "due_date": "2024-03-05T12:00:00Z",
        "category": "INVESTMENT", "installments": 3
    }))).await?;
    assert_eq!(status, StatusCode::CREATED);
    let rows = rows.as_array().cloned().unwrap_or_default();
    assert_eq!(rows.len(), 3);
    let sum: Decimal = rows.iter().map(|r| dec(&r["amount"])).sum();
    assert_eq!(sum, Decimal::from(1000));

    let first = rows[0]["id"].as_str().unwrap_or_default();
    let (status, paid) = s.send("PATCH", &format!("/finance/expenses/{first}/pay"), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["status"], "PAID");

    let (status, forecast) = s.send("GET", "/finance/forecast?month=3&year=2024", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dec(&forecast["fixed_cost"]), Decimal::from(1000));
    assert_eq!(dec(&forecast["expenses"]["paid"]), dec(&rows[0]["amount"]));

    let (status, target) = s.send("GET", "/companies/targets?month=3&year=2024", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(target["month"], 3);
    assert!(target["total_to_sell"].is_string());

    let (status, _) = s.send("GET", "/finance/forecast?month=13", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let second = rows[1]["id"].as_str().unwrap_or_default();
    let (status, _) = s.send("DELETE", &format!("/finance/expenses/{second}"), None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, list) = s.send("GET", "/finance/expenses", None).await?;
    assert_eq!(list.as_array().map(Vec::len), Some(2));
    Ok(())
}

#[tokio::test]
async fn companies_are_isolated() -> anyhow::Result<()> {
    let Some(a) = session().await? else { return Ok(()) };
    let Some(b) = session().await? else { return Ok(()) };

    let (_, cat) = a.send("POST", "/categories", Some(json!({"name": "Drinks"}))).await?;
    let (status, _) = a.send("POST", "/categories", Some(json!({"name": "Drinks"}))).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    let id = cat["id"].as_str().unwrap_or_default();
    let (status, _) = b.send("DELETE", &format!("/categories/{id}"), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = b.send("GET", "/categories", None).await?;
    assert!(list["data"].as_array().cloned().unwrap_or_default().iter().all(|c| c["name"] != "Drinks"));

    let (status, _) = a.send("DELETE", &format!("/categories/{id}"), None).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    Ok(())
}
