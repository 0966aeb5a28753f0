use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::user::{errors::RepositoryError, ports::DeviceRepository, value_objects::UserId};

pub struct PostgresDeviceRepository {
  pool: PgPool,
}

impl PostgresDeviceRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl DeviceRepository for PostgresDeviceRepository {
  async fn find_ids_for_user(&self, user_id: UserId) -> Result<Vec<i64>, RepositoryError> {
    let ids = sqlx::query_scalar::<_, i64>("SELECT id FROM user_devices WHERE user_id = $1")
      .bind(user_id.into_inner())
      .fetch_all(&self.pool)
      .await?;

    Ok(ids)
  }

  async fn delete_notifications_for_devices(
    &self,
    device_ids: &[i64],
  ) -> Result<u64, RepositoryError> {
    let result = sqlx::query("DELETE FROM push_notifications WHERE device_id = ANY($1)")
      .bind(device_ids)
      .execute(&self.pool)
      .await
      .map_err(|e| {
        tracing::error!("Failed to delete push notifications: {}", e);
        RepositoryError::from(e)
      })?;

    Ok(result.rows_affected())
  }

  async fn delete_for_user(&self, user_id: UserId) -> Result<u64, RepositoryError> {
    let result = sqlx::query("DELETE FROM user_devices WHERE user_id = $1")
      .bind(user_id.into_inner())
      .execute(&self.pool)
      .await
      .map_err(|e| {
        tracing::error!("Failed to delete devices of user {}: {}", user_id, e);
        RepositoryError::from(e)
      })?;

    Ok(result.rows_affected())
  }
}
