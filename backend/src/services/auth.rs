//! Authentication service for user registration, login, and token management

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use shared::{crop_suggestions, ExperienceLevel, UserRole};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::Claims;

type HmacSha256 = Hmac<Sha256>;

/// Revokes a live refresh token and returns its owner, if active
const ROTATE_REFRESH_TOKEN: &str = r#"
    WITH rotated AS (
        UPDATE refresh_tokens
        SET revoked_at = NOW()
        WHERE token_hash = $1
          AND revoked_at IS NULL
          AND expires_at > NOW()
        RETURNING user_id
    )
    SELECT u.id, u.email, u.role
    FROM rotated
    JOIN users u ON u.id = rotated.user_id
    WHERE u.is_active = true
"#;

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
}

/// Input for registering a new gardener account
#[derive(Debug, Deserialize)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub location: Option<String>,
    #[serde(default)]
    pub preferred_crops: Vec<String>,
    pub garden_type: Option<String>,
    pub experience: Option<ExperienceLevel>,
}

/// Response after successful registration
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    #[serde(flatten)]
    pub tokens: AuthTokens,
    /// Crops that suit the registered location
    pub suggested_crops: Vec<String>,
}

/// Authentication tokens
#[derive(Debug, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// User info from database
#[derive(Debug, sqlx::FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
            refresh_token_expiry: config.jwt.refresh_token_expiry,
        }
    }

    /// Register a new account
    pub async fn register(&self, input: RegisterInput) -> AppResult<RegisterResponse> {
        shared::validate_required(&input.name).map_err(|m| AppError::validation("name", m))?;
        shared::validate_email(&input.email).map_err(|m| AppError::validation("email", m))?;
        shared::validate_password(&input.password).map_err(|m| AppError::validation("password", m))?;
        shared::validate_password_confirmation(&input.password, &input.confirm_password)
            .map_err(|m| AppError::validation("confirm_password", m))?;

        let email = input.email.trim().to_lowercase();

        let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = $1")
            .bind(&email)
            .fetch_one(&self.db)
            .await?;

        if existing > 0 {
            return Err(AppError::Conflict {
                resource: "email".to_string(),
                message: "An account with this email already exists".to_string(),
            });
        }

        let password_hash = hash(&input.password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let user_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO users (email, password_hash, name, location, preferred_crops, garden_type, experience)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&email)
        .bind(&password_hash)
        .bind(input.name.trim())
        .bind(&input.location)
        .bind(&input.preferred_crops)
        .bind(&input.garden_type)
        .bind(input.experience.map(|e| e.as_str()))
        .fetch_one(&self.db)
        .await?;

        tracing::info!(%user_id, "Registered new user");

        let tokens = self.generate_tokens(user_id, &email, UserRole::User)?;
        self.store_refresh_token(user_id, &tokens.refresh_token).await?;

        let suggested_crops = input
            .location
            .as_deref()
            .map(crop_suggestions)
            .unwrap_or_default()
            .iter()
            .map(|c| c.to_string())
            .collect();

        Ok(RegisterResponse {
            user_id,
            tokens,
            suggested_crops,
        })
    }

    /// Authenticate user with email and password
    pub async fn login(&self, email: &str, password: &str) -> AppResult<AuthTokens> {
        let user = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password_hash, role, is_active
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email.trim().to_lowercase())
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

        if !user.is_active {
            return Err(AppError::AccountDisabled);
        }

        let valid = verify(password, &user.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;

        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(user.id)
            .execute(&self.db)
            .await?;

        let tokens = self.generate_tokens(user.id, &user.email, UserRole::parse(&user.role))?;
        self.store_refresh_token(user.id, &tokens.refresh_token).await?;

        Ok(tokens)
    }

    /// Refresh access token using refresh token
    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<AuthTokens> {
        let token_hash = self.hash_token(refresh_token)?;

        // Revoking and reading in one statement keeps the token single use
        let (user_id, email, role) =
            sqlx::query_as::<_, (Uuid, String, String)>(ROTATE_REFRESH_TOKEN)
                .bind(&token_hash)
                .fetch_optional(&self.db)
                .await?
                .ok_or(AppError::InvalidToken)?;

        let tokens = self.generate_tokens(user_id, &email, UserRole::parse(&role))?;
        self.store_refresh_token(user_id, &tokens.refresh_token).await?;

        Ok(tokens)
    }

    /// Generate access and refresh tokens
    fn generate_tokens(&self, user_id: Uuid, email: &str, role: UserRole) -> AppResult<AuthTokens> {
        let now = Utc::now();
        let access_exp = now + Duration::seconds(self.access_token_expiry);

        let access_claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role,
            exp: access_exp.timestamp(),
            iat: now.timestamp(),
        };

        let access_token = encode(
            &Header::default(),
            &access_claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

        let refresh_token = Uuid::new_v4().to_string();

        Ok(AuthTokens {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
        })
    }

    /// Store refresh token in database
    async fn store_refresh_token(&self, user_id: Uuid, token: &str) -> AppResult<()> {
        let token_hash = self.hash_token(token)?;
        let expires_at = Utc::now() + Duration::seconds(self.refresh_token_expiry);

        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id)
        .bind(&token_hash)
        .bind(expires_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// Keyed hash of a refresh token for storage
    fn hash_token(&self, token: &str) -> AppResult<String> {
        hash_refresh_token(&self.jwt_secret, token)
    }
}

fn hash_refresh_token(secret: &str, token: &str) -> AppResult<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Internal(format!("Token hashing failed: {}", e)))?;
    mac.update(token.as_bytes());
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_token_hash_is_stable_and_keyed() {
        let a = hash_refresh_token("secret-a", "token").unwrap();
        assert_eq!(a, hash_refresh_token("secret-a", "token").unwrap());
        assert_ne!(a, hash_refresh_token("secret-b", "token").unwrap());
        assert_ne!(a, hash_refresh_token("secret-a", "other").unwrap());
        // 32 byte digest in standard base64
        assert_eq!(a.len(), 44);
    }

    #[test]
    fn test_rotation_only_reads_rows_it_revoked() {
        let sql = ROTATE_REFRESH_TOKEN.split_whitespace().collect::<Vec<_>>().join(" ");
        assert!(sql.starts_with("WITH rotated AS ( UPDATE refresh_tokens SET revoked_at = NOW()"));
        assert!(sql.contains("AND revoked_at IS NULL"));
        assert!(sql.contains("RETURNING user_id"));
        assert!(sql.contains("FROM rotated JOIN users"));
        assert!(!sql.contains("FROM refresh_tokens"));
    }

    #[test]
    fn test_register_input_defaults() {
        let input: RegisterInput = serde_json::from_str(
            r#"{"name": "Asha", "email": "asha@example.com", "password": "secret1", "confirm_password": "secret1"}"#,
        )
        .unwrap();
        assert!(input.preferred_crops.is_empty());
        assert!(input.experience.is_none());
    }
}
