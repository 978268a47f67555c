use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sign-up input: the owner account plus the company it creates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignUpInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub company_name: String,
}

/// Sign-in input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

/// Domain user (business view)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub company_id: Uuid,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthCompany {
    pub id: Uuid,
    pub name: String,
}

/// Domain credentials (hashed)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub user_id: Uuid,
    pub password_hash: String,
    pub password_algorithm: String,
}

/// Everything persisted by a sign-up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    pub user: AuthUser,
    pub company: AuthCompany,
}

/// Sign-in result (session)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub user: AuthUser,
    pub token: String,
}

/// JWT payload. `sub` is the user id, `cid` the company id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub cid: String,
    pub email: String,
    pub iat: usize,
    pub exp: usize,
}

/// Caller identity resolved from a verified token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub company_id: Uuid,
}
