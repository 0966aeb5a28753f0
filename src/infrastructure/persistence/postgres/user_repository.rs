use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::user::{
  entities::User, errors::RepositoryError, ports::UserRepository, value_objects::UserId,
};

/// PostgreSQL implementation of the UserRepository trait
pub struct PostgresUserRepository {
  pool: PgPool,
}

impl PostgresUserRepository {
  /// Creates a new instance of PostgresUserRepository
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

/// Database row structure for users table
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
  id: i64,
  email: String,
  first_name: String,
  last_name: String,
  payment_customer_url: Option<String>,
  is_deactivated_placeholder: bool,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
  fn from(row: UserRow) -> Self {
    User::from_db(
      UserId::from_db(row.id),
      row.email,
      row.first_name,
      row.last_name,
      row.payment_customer_url,
      row.is_deactivated_placeholder,
      row.created_at,
      row.updated_at,
    )
  }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
  async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
    let row = sqlx::query_as::<_, UserRow>(
      r#"
            SELECT
                id,
                email,
                first_name,
                last_name,
                payment_customer_url,
                is_deactivated_placeholder,
                created_at,
                updated_at
            FROM users
            WHERE id = $1
            "#,
    )
    .bind(id.into_inner())
    .fetch_optional(&self.pool)
    .await?;

    Ok(row.map(Into::into))
  }

  async fn find_placeholder(&self) -> Result<Option<User>, RepositoryError> {
    let row = sqlx::query_as::<_, UserRow>(
      r#"
            SELECT
                id,
                email,
                first_name,
                last_name,
                payment_customer_url,
                is_deactivated_placeholder,
                created_at,
                updated_at
            FROM users
            WHERE is_deactivated_placeholder
            "#,
    )
    .fetch_optional(&self.pool)
    .await
    .map_err(|e| {
      tracing::error!("Failed to look up placeholder user: {}", e);
      RepositoryError::from(e)
    })?;

    Ok(row.map(Into::into))
  }

  async fn delete_non_placeholder(&self, id: UserId) -> Result<bool, RepositoryError> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1 AND NOT is_deactivated_placeholder")
      .bind(id.into_inner())
      .execute(&self.pool)
      .await
      .map_err(|e| {
        tracing::error!("Failed to delete user {}: {}", id, e);
        RepositoryError::from(e)
      })?;

    Ok(result.rows_affected() > 0)
  }

  async fn clear_payment_customer(&self, id: UserId) -> Result<(), RepositoryError> {
    sqlx::query("UPDATE users SET payment_customer_url = NULL, updated_at = NOW() WHERE id = $1")
      .bind(id.into_inner())
      .execute(&self.pool)
      .await
      .map_err(|e| {
        tracing::error!("Failed to clear payment customer of user {}: {}", id, e);
        RepositoryError::from(e)
      })?;

    Ok(())
  }
}
