use std::net::SocketAddr;

use migration::MigratorTrait;
use reqwest::StatusCode as HttpStatusCode;
use serde_json::json;
use tokio::net::TcpListener;
use uuid::Uuid;

const SECRET: &str = "e2e-test-secret-long-enough";

struct TestApp {
    base_url: String,
}

async fn start_server() -> anyhow::Result<TestApp> {
    let db = models::db::connect().await?;
    if let Err(e) = migration::Migrator::up(&db, None).await { eprintln!("migrations notice: {}", e); }

    let cfg = configs::AuthConfig { jwt_secret: SECRET.into(), token_ttl_hours: 1 };
    let app = server::build_app(db, &cfg);
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url })
}

async fn app_or_skip() -> Option<TestApp> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return None; }
    match start_server().await {
        Ok(a) => Some(a),
        Err(e) => {
            eprintln!("e2e skipped: {e}");
            None
        }
    }
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("reqwest client")
}

#[tokio::test]
async fn e2e_public_health_and_metrics() -> anyhow::Result<()> {
    let Some(app) = app_or_skip().await else { return Ok(()) };
    let res = client().get(format!("{}/health", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["status"], "ok");

    let res = client().get(format!("{}/metrics", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert!(res.text().await?.contains("bizfin_http_requests_total"));
    Ok(())
}

#[tokio::test]
async fn e2e_cookie_session_reaches_protected_routes() -> anyhow::Result<()> {
    let Some(app) = app_or_skip().await else { return Ok(()) };
    let c = client();
    let email = format!("e2e_{}@example.com", Uuid::new_v4());
    let password = "S3curePass!";

    let res = c.post(format!("{}/auth/sign-up", app.base_url))
        .json(&json!({"name": "E2E", "email": email, "password": password, "company_name": "E2E Store"}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);

    let res = c.post(format!("{}/auth/signin", app.base_url))
        .json(&json!({"email": email, "password": password}))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert!(res.headers().get("set-cookie").is_some());

    // no Authorization header: the auth_token cookie is enough
    let res = c.get(format!("{}/companies/me", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let company = res.json::<serde_json::Value>().await?;
    assert_eq!(company["name"], "E2E Store");

    let res = c.post(format!("{}/auth/logout", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NO_CONTENT);
    let res = c.get(format!("{}/companies/me", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn e2e_protected_without_token_denied() -> anyhow::Result<()> {
    let Some(app) = app_or_skip().await else { return Ok(()) };
    let res = reqwest::Client::new().get(format!("{}/sales", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::UNAUTHORIZED);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["error"], "Unauthorized");
    Ok(())
}

#[tokio::test]
async fn e2e_protected_with_expired_token_unauthorized() -> anyhow::Result<()> {
    let Some(app) = app_or_skip().await else { return Ok(()) };
    let user = service::auth::domain::AuthUser {
        id: Uuid::new_v4(),
        company_id: Uuid::new_v4(),
        email: "old@example.com".into(),
        name: "Old".into(),
    };
    let token = service::auth::token::issue_token(SECRET, &user, -1)?;

    let res = reqwest::Client::new()
        .get(format!("{}/finance/expenses", app.base_url))
        .header("Authorization", format!("Bearer {}", token))
        .send().await?;
    assert_eq!(res.status(), HttpStatusCode::UNAUTHORIZED);
    Ok(())
}
