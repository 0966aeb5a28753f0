use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::user::{
  errors::RepositoryError, ports::RelationshipRepository, value_objects::UserId,
};

pub struct PostgresRelationshipRepository {
  pool: PgPool,
}

impl PostgresRelationshipRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl RelationshipRepository for PostgresRelationshipRepository {
  async fn delete_involving(&self, user_id: UserId) -> Result<u64, RepositoryError> {
    let result = sqlx::query(
      r#"
            DELETE FROM relationships
            WHERE originating_user_id = $1 OR consenting_user_id = $1
            "#,
    )
    .bind(user_id.into_inner())
    .execute(&self.pool)
    .await
    .map_err(|e| {
      tracing::error!("Failed to delete relationships of user {}: {}", user_id, e);
      RepositoryError::from(e)
    })?;

    Ok(result.rows_affected())
  }
}
