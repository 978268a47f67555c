use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use rand::rngs::OsRng;
use tracing::{info, debug, instrument};
use uuid::Uuid;

use super::domain::{AuthCompany, AuthContext, AuthSession, AuthUser, NewAccount, SignInInput, SignUpInput};
use super::errors::AuthError;
use super::repository::AuthRepository;
use super::token;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub password_algorithm: String,
}

impl AuthConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self { jwt_secret: jwt_secret.into(), token_ttl_hours: 12, password_algorithm: "argon2".into() }
    }
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self { Self { repo, cfg } }

    /// Create a company with its owner account.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::SignUpInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig::new("secret"));
    /// let input = SignUpInput { name: "Ana".into(), email: "ana@bakery.com".into(), password: "secret1".into(), company_name: "Bakery".into() };
    /// let account = tokio_test::block_on(svc.sign_up(input)).unwrap();
    /// assert_eq!(account.user.email, "ana@bakery.com");
    /// assert_eq!(account.user.company_id, account.company.id);
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn sign_up(&self, input: SignUpInput) -> Result<NewAccount, AuthError> {
        models::user::validate_email(&input.email)?;
        models::user::validate_name(&input.name)?;
        models::company::validate_name(&input.company_name)?;
        if input.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!("password must be at least {MIN_PASSWORD_LEN} characters")));
        }
        let email = models::user::normalize_email(&input.email);
        if let Some(existing) = self.repo.find_user_by_email(&email).await? {
            debug!("user exists: {}", existing.email);
            return Err(AuthError::Conflict);
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(input.password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();

        let account = self.repo
            .create_account(input.company_name.trim(), &email, input.name.trim(), hash, self.cfg.password_algorithm.clone())
            .await?;
        info!(user_id = %account.user.id, company_id = %account.company.id, "account_created");
        Ok(account)
    }

    /// Authenticate a user and issue a token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::{SignUpInput, SignInInput};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo.clone(), AuthConfig::new("secret"));
    /// let _ = tokio_test::block_on(svc.sign_up(SignUpInput { name: "N".into(), email: "u@e.com".into(), password: "Passw0rd".into(), company_name: "Shop".into() }));
    /// let session = tokio_test::block_on(svc.sign_in(SignInInput { email: "u@e.com".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(session.user.email, "u@e.com");
    /// assert!(!session.token.is_empty());
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn sign_in(&self, input: SignInInput) -> Result<AuthSession, AuthError> {
        let email = models::user::normalize_email(&input.email);
        let user = self.repo
            .find_user_by_email(&email)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let cred = self.repo
            .get_credentials(user.id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let parsed = PasswordHash::new(&cred.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            return Err(AuthError::Unauthorized);
        }

        let token = token::issue_token(&self.cfg.jwt_secret, &user, self.cfg.token_ttl_hours)?;
        info!(user_id = %user.id, company_id = %user.company_id, "signed_in");
        Ok(AuthSession { user, token })
    }

    /// Resolve a bearer token to the caller ids.
    pub fn verify(&self, token: &str) -> Result<AuthContext, AuthError> {
        token::verify_token(&self.cfg.jwt_secret, token)
    }

    /// Current user with the company it belongs to.
    pub async fn me(&self, user_id: Uuid) -> Result<(AuthUser, AuthCompany), AuthError> {
        let user = self.repo.find_user(user_id).await?.ok_or(AuthError::NotFound)?;
        let company = self.repo.find_company(user.company_id).await?.ok_or(AuthError::NotFound)?;
        Ok((user, company))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::mock::MockAuthRepository;

    fn svc() -> AuthService<MockAuthRepository> {
        AuthService::new(Arc::new(MockAuthRepository::default()), AuthConfig::new("unit-test-secret"))
    }

    fn sign_up_input(email: &str) -> SignUpInput {
        SignUpInput { name: "Owner".into(), email: email.into(), password: "secret1".into(), company_name: "Shop".into() }
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let svc = svc();
        svc.sign_up(sign_up_input("dup@shop.com")).await.unwrap();
        let err = svc.sign_up(sign_up_input("DUP@shop.com")).await.unwrap_err();
        assert!(matches!(err, AuthError::Conflict));
        assert_eq!(err.code(), 1002);
    }

    #[tokio::test]
    async fn short_password_is_rejected() {
        let mut input = sign_up_input("short@shop.com");
        input.password = "12345".into();
        assert!(matches!(svc().sign_up(input).await, Err(AuthError::Validation(_))));
    }

    #[tokio::test]
    async fn invalid_email_is_rejected() {
        assert!(matches!(svc().sign_up(sign_up_input("nope")).await, Err(AuthError::Validation(_))));
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let svc = svc();
        svc.sign_up(sign_up_input("who@shop.com")).await.unwrap();
        let res = svc.sign_in(SignInInput { email: "who@shop.com".into(), password: "wrong-pass".into() }).await;
        assert!(matches!(res, Err(AuthError::Unauthorized)));
        let res = svc.sign_in(SignInInput { email: "ghost@shop.com".into(), password: "secret1".into() }).await;
        assert!(matches!(res, Err(AuthError::Unauthorized)));
    }

    #[tokio::test]
    async fn token_round_trips_to_context_and_me() {
        let svc = svc();
        let account = svc.sign_up(sign_up_input("me@shop.com")).await.unwrap();
        let session = svc.sign_in(SignInInput { email: "me@shop.com".into(), password: "secret1".into() }).await.unwrap();
        let ctx = svc.verify(&session.token).unwrap();
        assert_eq!(ctx.user_id, account.user.id);
        assert_eq!(ctx.company_id, account.company.id);

        let (user, company) = svc.me(ctx.user_id).await.unwrap();
        assert_eq!(user.email, "me@shop.com");
        assert_eq!(company.name, "Shop");
    }
}
