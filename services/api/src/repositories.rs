//! Repositories for database operations

use anyhow::Result;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use sqlx::PgPool;
use tracing::info;

use crate::models::{CreateUserRequest, UpdateUserRequest, User};

pub mod label;
pub mod recipe;

/// User repository for database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user with a hashed password
    ///
    /// The caller is expected to have normalized and validated the
    /// payload; a duplicate email surfaces as a unique violation.
    pub async fn create(&self, payload: &CreateUserRequest) -> Result<User> {
        info!("Creating new user: {}", payload.email);

        let password_hash = hash_password(&payload.password)?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, name, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, name, password_hash, is_active, is_staff,
                      created_at, updated_at
            "#,
        )
        .bind(&payload.email)
        .bind(&payload.name)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find a user by email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, password_hash, is_active, is_staff,
                   created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, password_hash, is_active, is_staff,
                   created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Update the user's own profile, field by field
    ///
    /// Absent fields keep their current value. A supplied password is
    /// re-hashed before it is stored.
    pub async fn update(&self, id: i64, payload: &UpdateUserRequest) -> Result<Option<User>> {
        let password_hash = match &payload.password {
            Some(password) => Some(hash_password(password)?),
            None => None,
        };

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET email = COALESCE($2, email),
                name = COALESCE($3, name),
                password_hash = COALESCE($4, password_hash),
                updated_at = now()
            WHERE id = $1
            RETURNING id, email, name, password_hash, is_active, is_staff,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&payload.email)
        .bind(&payload.name)
        .bind(&password_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Verify a user's password
    pub async fn verify_password(&self, user: &User, password: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|e| anyhow::anyhow!("Failed to parse password hash: {}", e))?;

        let argon2 = Argon2::default();
        let result = argon2.verify_password(password.as_bytes(), &parsed_hash);

        Ok(result.is_ok())
    }
}

/// Hash a password with Argon2 and a fresh salt
fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
        .to_string();

    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_password_verifies() {
        let hash = hash_password("changeme1").expect("hash");
        let parsed = PasswordHash::new(&hash).expect("parse");

        assert!(
            Argon2::default()
                .verify_password(b"changeme1", &parsed)
                .is_ok()
        );
        assert!(
            Argon2::default()
                .verify_password(b"wrong-password", &parsed)
                .is_err()
        );
    }

    #[test]
    fn hashes_are_salted() {
        let first = hash_password("changeme1").expect("hash");
        let second = hash_password("changeme1").expect("hash");
        assert_ne!(first, second);
    }
}
