use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use super::domain::{AuthContext, AuthUser, Claims};
use super::errors::AuthError;

/// Sign an HS256 token for `user`, valid for `ttl_hours`.
pub fn issue_token(secret: &str, user: &AuthUser, ttl_hours: i64) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user.id.to_string(),
        cid: user.company_id.to_string(),
        email: user.email.clone(),
        iat: now.timestamp() as usize,
        exp: (now + Duration::hours(ttl_hours)).timestamp() as usize,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| AuthError::TokenError(e.to_string()))
}

/// Check signature and expiry, then resolve the caller ids.
pub fn verify_token(secret: &str, token: &str) -> Result<AuthContext, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map_err(|e| AuthError::TokenError(e.to_string()))?;
    let user_id = Uuid::parse_str(&data.claims.sub).map_err(|e| AuthError::TokenError(e.to_string()))?;
    let company_id = Uuid::parse_str(&data.claims.cid).map_err(|e| AuthError::TokenError(e.to_string()))?;
    Ok(AuthContext { user_id, company_id })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> AuthUser {
        AuthUser { id: Uuid::new_v4(), company_id: Uuid::new_v4(), email: "a@b.com".into(), name: "A".into() }
    }

    #[test]
    fn issued_token_verifies() {
        let u = user();
        let t = issue_token("secret", &u, 1).unwrap();
        let ctx = verify_token("secret", &t).unwrap();
        assert_eq!(ctx.user_id, u.id);
        assert_eq!(ctx.company_id, u.company_id);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let t = issue_token("secret", &user(), 1).unwrap();
        assert!(matches!(verify_token("other", &t), Err(AuthError::TokenError(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        // well past the default 60s leeway
        let t = issue_token("secret", &user(), -2).unwrap();
        assert!(verify_token("secret", &t).is_err());
    }
}
