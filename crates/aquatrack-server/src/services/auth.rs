//! Authentication service

use crate::storage::Database;
use anyhow::Result;
use aquatrack_types::AuthTokens;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const ACCESS_TOKEN_DAYS: i64 = 7;
const REFRESH_TOKEN_DAYS: i64 = 30;

pub struct AuthService {
    db: Arc<Database>,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(db: Arc<Database>, jwt_secret: String) -> Self {
        Self { db, jwt_secret }
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<AuthTokens> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
            .to_string();

        let user_id = self.db.create_user(email, &password_hash, name).await?;

        self.generate_tokens(&user_id)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthTokens> {
        let user = self.db.get_user_by_email(email).await?;

        if let Some((user_id, password_hash)) = user {
            let parsed_hash = PasswordHash::new(&password_hash)
                .map_err(|e| anyhow::anyhow!("Invalid password hash: {}", e))?;
            let argon2 = Argon2::default();

            if argon2
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok()
            {
                return self.generate_tokens(&user_id);
            }
        }

        anyhow::bail!("Invalid credentials")
    }

    /// Validate an access token and return its subject (the user id).
    pub async fn validate_token(&self, token: &str) -> Result<String> {
        let claims = self.decode_claims(token)?;
        if claims.token_type != "access" {
            anyhow::bail!("Not an access token");
        }
        Ok(claims.sub)
    }

    /// Exchange a refresh token for a fresh token pair.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthTokens> {
        let claims = self.decode_claims(refresh_token)?;
        if claims.token_type != "refresh" {
            anyhow::bail!("Not a refresh token");
        }

        // The user may have been deleted since the token was issued.
        if self.db.get_user_by_id(&claims.sub).await?.is_none() {
            anyhow::bail!("Unknown user");
        }

        self.generate_tokens(&claims.sub)
    }

    fn decode_claims(&self, token: &str) -> Result<Claims> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &validation,
        )?;

        Ok(token_data.claims)
    }

    fn generate_tokens(&self, user_id: &str) -> Result<AuthTokens> {
        let now = Utc::now();

        let access_exp = now + Duration::days(ACCESS_TOKEN_DAYS);
        let access_claims = Claims {
            sub: user_id.to_string(),
            exp: access_exp.timestamp(),
            iat: now.timestamp(),
            token_type: "access".to_string(),
        };

        let access_token = encode(
            &Header::default(),
            &access_claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?;

        let refresh_exp = now + Duration::days(REFRESH_TOKEN_DAYS);
        let refresh_claims = Claims {
            sub: user_id.to_string(),
            exp: refresh_exp.timestamp(),
            iat: now.timestamp(),
            token_type: "refresh".to_string(),
        };

        let refresh_token = encode(
            &Header::default(),
            &refresh_claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?;

        Ok(AuthTokens {
            access_token,
            refresh_token,
            expires_in: (access_exp - now).num_seconds(),
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String, // user_id
    exp: i64,    // expiration time
    iat: i64,    // issued at
    token_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn service() -> AuthService {
        let db = Arc::new(Database::in_memory().await.unwrap());
        AuthService::new(db, "test-secret".to_string())
    }

    #[tokio::test]
    async fn register_login_round_trip() {
        let auth = service().await;

        let tokens = auth
            .register("keeper@example.com", "hunter22", Some("Keeper"))
            .await
            .unwrap();
        let registered_id = auth.validate_token(&tokens.access_token).await.unwrap();

        let tokens = auth.login("keeper@example.com", "hunter22").await.unwrap();
        let logged_in_id = auth.validate_token(&tokens.access_token).await.unwrap();

        assert_eq!(registered_id, logged_in_id);
        assert!(tokens.expires_in > 0);
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let auth = service().await;

        auth.register("keeper@example.com", "hunter22", None)
            .await
            .unwrap();

        assert!(auth.login("keeper@example.com", "wrong").await.is_err());
        assert!(auth.login("nobody@example.com", "hunter22").await.is_err());
    }

    #[tokio::test]
    async fn refresh_token_is_not_an_access_token() {
        let auth = service().await;

        let tokens = auth
            .register("keeper@example.com", "hunter22", None)
            .await
            .unwrap();

        assert!(auth.validate_token(&tokens.refresh_token).await.is_err());

        let renewed = auth.refresh(&tokens.refresh_token).await.unwrap();
        assert!(auth.validate_token(&renewed.access_token).await.is_ok());

        // And the access token cannot be used for refresh.
        assert!(auth.refresh(&tokens.access_token).await.is_err());
    }
}
