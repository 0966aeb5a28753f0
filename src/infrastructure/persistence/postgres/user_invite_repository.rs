use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::user::{
  errors::RepositoryError,
  ports::UserInviteRepository,
  value_objects::{Email, UserId},
};

pub struct PostgresUserInviteRepository {
  pool: PgPool,
}

impl PostgresUserInviteRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl UserInviteRepository for PostgresUserInviteRepository {
  async fn delete_for_user(
    &self,
    user_id: UserId,
    email: Option<&Email>,
  ) -> Result<u64, RepositoryError> {
    let result = sqlx::query(
      r#"
            DELETE FROM user_invites
            WHERE initiating_user_id = $1
               OR ($2::TEXT IS NOT NULL AND NOT is_converted AND LOWER(email) = $2)
            "#,
    )
    .bind(user_id.into_inner())
    .bind(email.map(Email::as_str))
    .execute(&self.pool)
    .await
    .map_err(|e| {
      tracing::error!("Failed to delete invites of user {}: {}", user_id, e);
      RepositoryError::from(e)
    })?;

    Ok(result.rows_affected())
  }
}
