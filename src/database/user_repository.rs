use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::User;

/// Read-only access to operator credentials
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_by_username(&self, username: &str) -> Result<User, DatabaseError>;
}

pub(crate) fn user_not_found(username: &str) -> DatabaseError {
    DatabaseError::NotFound(format!("user '{}' not found", username))
}

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn get_by_username(&self, username: &str) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, password, role, created_at, updated_at
             FROM users
             WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| user_not_found(username))
    }
}
