use sea_orm::{DatabaseConnection, EntityTrait, TransactionTrait};
use uuid::Uuid;

use crate::auth::domain::{AuthCompany, AuthUser, Credentials, NewAccount};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;

pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

fn to_user(u: models::user::Model) -> AuthUser {
    AuthUser { id: u.id, company_id: u.company_id, email: u.email, name: u.name }
}

#[async_trait::async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
        let res = models::user::find_by_email(&self.db, email).await?;
        Ok(res.map(to_user))
    }

    async fn find_user(&self, user_id: Uuid) -> Result<Option<AuthUser>, AuthError> {
        let res = models::user::Entity::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.filter(|u| u.deleted_at.is_none()).map(to_user))
    }

    async fn find_company(&self, company_id: Uuid) -> Result<Option<AuthCompany>, AuthError> {
        let res = models::company::Entity::find_by_id(company_id)
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(|c| AuthCompany { id: c.id, name: c.name }))
    }

    async fn create_account(
        &self,
        company_name: &str,
        email: &str,
        name: &str,
        password_hash: String,
        password_algorithm: String,
    ) -> Result<NewAccount, AuthError> {
        let txn = self.db.begin().await.map_err(|e| AuthError::Repository(e.to_string()))?;

        let company = models::company::create(&txn, company_name).await?;
        let user = match models::user::create(&txn, company.id, email, name).await {
            Ok(u) => u,
            // the unique index on email catches a concurrent sign-up
            Err(models::errors::ModelError::Db(m)) if m.contains("duplicate key") => return Err(AuthError::Conflict),
            Err(e) => return Err(e.into()),
        };
        models::user_credentials::upsert_password(&txn, user.id, password_hash, &password_algorithm).await?;
        models::category::create(&txn, company.id, models::category::DEFAULT_CATEGORY_NAME).await?;

        txn.commit().await.map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(NewAccount { user: to_user(user), company: AuthCompany { id: company.id, name: company.name } })
    }

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
        let res = models::user_credentials::find_by_user(&self.db, user_id).await?;
        Ok(res.map(|c| Credentials { user_id: c.user_id, password_hash: c.password_hash, password_algorithm: c.password_algorithm }))
    }
}
