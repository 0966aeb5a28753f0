use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::user::{errors::RepositoryError, ports::LoginLogRepository, value_objects::UserId};

pub struct PostgresLoginLogRepository {
  pool: PgPool,
}

impl PostgresLoginLogRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl LoginLogRepository for PostgresLoginLogRepository {
  async fn delete_for_user(&self, user_id: UserId) -> Result<u64, RepositoryError> {
    let result = sqlx::query("DELETE FROM login_logs WHERE user_id = $1")
      .bind(user_id.into_inner())
      .execute(&self.pool)
      .await
      .map_err(|e| {
        tracing::error!("Failed to delete login logs of user {}: {}", user_id, e);
        RepositoryError::from(e)
      })?;

    Ok(result.rows_affected())
  }
}
