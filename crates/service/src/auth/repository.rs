use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{AuthCompany, AuthUser, Credentials, NewAccount};
use super::errors::AuthError;

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError>;
    async fn find_user(&self, user_id: Uuid) -> Result<Option<AuthUser>, AuthError>;
    async fn find_company(&self, company_id: Uuid) -> Result<Option<AuthCompany>, AuthError>;

    /// Persist company, user, credentials and the default category atomically.
    async fn create_account(
        &self,
        company_name: &str,
        email: &str,
        name: &str,
        password_hash: String,
        password_algorithm: String,
    ) -> Result<NewAccount, AuthError>;

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<HashMap<String, AuthUser>>,        // key: email
        companies: Mutex<HashMap<Uuid, AuthCompany>>,   // key: company_id
        creds: Mutex<HashMap<Uuid, Credentials>>,       // key: user_id
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.get(email).cloned())
        }

        async fn find_user(&self, user_id: Uuid) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.values().find(|u| u.id == user_id).cloned())
        }

        async fn find_company(&self, company_id: Uuid) -> Result<Option<AuthCompany>, AuthError> {
            let companies = self.companies.lock().unwrap();
            Ok(companies.get(&company_id).cloned())
        }

        async fn create_account(
            &self,
            company_name: &str,
            email: &str,
            name: &str,
            password_hash: String,
            password_algorithm: String,
        ) -> Result<NewAccount, AuthError> {
            let mut users = self.users.lock().unwrap();
            if users.contains_key(email) {
                return Err(AuthError::Conflict);
            }
            let company = AuthCompany { id: Uuid::new_v4(), name: company_name.to_string() };
            let user = AuthUser { id: Uuid::new_v4(), company_id: company.id, email: email.to_string(), name: name.to_string() };
            users.insert(email.to_string(), user.clone());
            self.companies.lock().unwrap().insert(company.id, company.clone());
            self.creds.lock().unwrap().insert(user.id, Credentials { user_id: user.id, password_hash, password_algorithm });
            Ok(NewAccount { user, company })
        }

        async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
            let creds = self.creds.lock().unwrap();
            Ok(creds.get(&user_id).cloned())
        }
    }
}
