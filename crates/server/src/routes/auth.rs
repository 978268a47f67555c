use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, Method, StatusCode},
    middleware::Next,
    response::Response,
    Extension, Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use uuid::Uuid;

use service::auth::domain::{AuthCompany, AuthContext, AuthUser, SignInInput, SignUpInput};
use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::service::{AuthConfig, AuthService};
use service::auth::token;

use crate::errors::{AppJson, JsonApiError};

pub const AUTH_COOKIE: &str = "auth_token";

#[derive(Clone)]
pub struct ServerAuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: ServerAuthConfig,
}

impl ServerState {
    pub fn auth_service(&self) -> AuthService<SeaOrmAuthRepository> {
        let repo = Arc::new(SeaOrmAuthRepository { db: self.db.clone() });
        AuthService::new(repo, AuthConfig {
            jwt_secret: self.auth.jwt_secret.clone(),
            token_ttl_hours: self.auth.token_ttl_hours,
            password_algorithm: "argon2".into(),
        })
    }
}

#[derive(Serialize)]
pub struct UserSummary { pub id: Uuid, pub name: String, pub email: String }

#[derive(Serialize)]
pub struct SignUpOutput { pub message: &'static str, pub user: UserSummary, pub company: AuthCompany }

#[derive(Serialize)]
pub struct SignInOutput { pub token: String, pub user: AuthUser }

#[derive(Serialize)]
pub struct MeOutput { pub user: AuthUser, pub company: AuthCompany }

#[utoipa::path(post, path = "/auth/sign-up", tag = "auth", request_body = crate::openapi::SignUpRequest, responses((status = 201, description = "Created"), (status = 400, description = "Bad Request"), (status = 409, description = "User already exists")))]
pub async fn sign_up(State(state): State<ServerState>, AppJson(input): AppJson<SignUpInput>) -> Result<(StatusCode, Json<SignUpOutput>), JsonApiError> {
    let account = state.auth_service().sign_up(input).await?;
    let user = account.user;
    let out = SignUpOutput {
        message: "User created successfully",
        user: UserSummary { id: user.id, name: user.name, email: user.email },
        company: account.company,
    };
    Ok((StatusCode::CREATED, Json(out)))
}

#[utoipa::path(post, path = "/auth/sign-in", tag = "auth", request_body = crate::openapi::SignInRequest, responses((status = 200, description = "Signed in, token returned and auth_token cookie set"), (status = 401, description = "Invalid credentials")))]
pub async fn sign_in(State(state): State<ServerState>, jar: CookieJar, AppJson(input): AppJson<SignInInput>) -> Result<(CookieJar, Json<SignInOutput>), JsonApiError> {
    let session = state.auth_service().sign_in(input).await?;
    let mut cookie = Cookie::new(AUTH_COOKIE, session.token.clone());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(false);
    cookie.set_same_site(SameSite::Lax);
    let jar = jar.add(cookie);
    Ok((jar, Json(SignInOutput { token: session.token, user: session.user })))
}

#[utoipa::path(get, path = "/auth/me", tag = "auth", responses((status = 200, description = "Current user and company"), (status = 401, description = "Unauthorized")))]
pub async fn me(State(state): State<ServerState>, Extension(ctx): Extension<AuthContext>) -> Result<Json<MeOutput>, JsonApiError> {
    let (user, company) = state.auth_service().me(ctx.user_id).await?;
    Ok(Json(MeOutput { user, company }))
}

#[utoipa::path(post, path = "/auth/logout", tag = "auth", responses((status = 204, description = "Cookie cleared")))]
pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let mut cookie = Cookie::from(AUTH_COOKIE);
    cookie.set_path("/");
    (jar.remove(cookie), StatusCode::NO_CONTENT)
}

fn is_public(path: &str, method: &Method) -> bool {
    matches!(
        path,
        "/health" | "/metrics" | "/auth/sign-up" | "/auth/sign-in" | "/auth/signup" | "/auth/signin"
    ) || path.starts_with("/api-docs")
        || method == Method::OPTIONS
}

fn cookie_token(req: &Request) -> Option<String> {
    let raw = req.headers().get(header::COOKIE)?.to_str().ok()?;
    raw.split(';')
        .filter_map(|part| part.trim().strip_prefix("auth_token="))
        .find(|v| !v.is_empty())
        .map(str::to_string)
}

/// 全局中间件：除白名单外，校验 Authorization: Bearer <token>，缺失时回退到 auth_token Cookie
/// 缺失 token 或非法、过期均返回 401；校验通过后把 AuthContext 放入请求扩展
pub async fn require_bearer_token_state(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    let path = req.uri().path().to_string();
    if is_public(&path, req.method()) {
        return Ok(next.run(req).await);
    }

    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let token = match bearer {
        Some(h) => match h.strip_prefix("Bearer ") {
            Some(t) if !t.trim().is_empty() => t.trim().to_string(),
            _ => {
                tracing::warn!(path = %path, "invalid Authorization format (expect Bearer)");
                return Err(JsonApiError::unauthorized("expected Authorization: Bearer <token>"));
            }
        },
        None => match cookie_token(&req) {
            Some(t) => t,
            None => {
                tracing::warn!(path = %path, "missing Authorization header and auth_token cookie");
                return Err(JsonApiError::unauthorized("missing bearer token"));
            }
        },
    };

    let ctx = token::verify_token(&state.auth.jwt_secret, &token).map_err(|e| {
        tracing::warn!(path = %path, err = %e, "token validation failed");
        JsonApiError::unauthorized("invalid or expired token")
    })?;
    req.extensions_mut().insert(ctx);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn whitelist_covers_public_endpoints() {
        assert!(is_public("/health", &Method::GET));
        assert!(is_public("/auth/signin", &Method::POST));
        assert!(is_public("/api-docs/openapi.json", &Method::GET));
        assert!(is_public("/products", &Method::OPTIONS));
        assert!(!is_public("/products", &Method::GET));
        assert!(!is_public("/auth/me", &Method::GET));
    }

    #[test]
    fn token_is_read_from_cookie_header() {
        let req = Request::builder()
            .uri("/products")
            .header(header::COOKIE, "theme=dark; auth_token=abc.def.ghi")
            .body(Body::empty())
            .unwrap();
        assert_eq!(cookie_token(&req).as_deref(), Some("abc.def.ghi"));

        let req = Request::builder().uri("/products").header(header::COOKIE, "auth_token=").body(Body::empty()).unwrap();
        assert!(cookie_token(&req).is_none());
    }
}
