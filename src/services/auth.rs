//! Authentication service: registration, login, token issuance

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{CreateUser, User, UserClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a new user with a hashed access code
    pub async fn register(&self, data: &CreateUser) -> AppResult<User> {
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(data.access_code.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash access code: {}", e)))?
            .to_string();

        self.repository
            .users
            .create(&data.nim, &data.name, data.role, &hash)
            .await
    }

    /// Verify credentials and issue a JWT session token
    pub async fn login(&self, nim: &str, access_code: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_nim(nim)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid nim or access code".to_string()))?;

        let parsed = PasswordHash::new(&user.access_code_hash)
            .map_err(|e| AppError::Internal(format!("Corrupt access code hash: {}", e)))?;

        Argon2::default()
            .verify_password(access_code.as_bytes(), &parsed)
            .map_err(|_| AppError::Authentication("Invalid nim or access code".to_string()))?;

        let now = Utc::now();
        let claims = UserClaims {
            sub: user.nim.clone(),
            user_id: user.id,
            name: user.name.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.config.jwt_expiration_hours as i64)).timestamp(),
        };

        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        Ok((token, user))
    }
}
