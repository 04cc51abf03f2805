use crate::domain::{BlogError, User};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `UserAlreadyExists` when the username is taken.
    async fn create(&self, username: &str, password_hash: String) -> Result<User, BlogError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, BlogError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, BlogError>;
}

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
    })
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, username: &str, password_hash: String) -> Result<User, BlogError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES ($1, $2)
            RETURNING id, username, password_hash
            "#,
        )
        .bind(username)
        .bind(&password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            let duplicate = e
                .as_database_error()
                .is_some_and(|db| db.is_unique_violation());
            if duplicate {
                BlogError::UserAlreadyExists(username.to_string())
            } else {
                tracing::error!("Failed to create user: {}", e);
                BlogError::from(e)
            }
        })?;

        let user = user_from_row(&row)?;
        tx.commit().await?;

        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, BlogError> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password_hash
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row).transpose()?)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, BlogError> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password_hash
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row).transpose()?)
    }
}
