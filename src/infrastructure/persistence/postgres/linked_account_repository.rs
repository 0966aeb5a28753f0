use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::banking::{entities::LinkedAccount, ports::LinkedAccountRepository};
use crate::domain::user::{errors::RepositoryError, value_objects::UserId};

pub struct PostgresLinkedAccountRepository {
  pool: PgPool,
}

impl PostgresLinkedAccountRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[derive(Debug, sqlx::FromRow)]
struct LinkedAccountRow {
  id: i64,
  user_id: i64,
  account_name: String,
  institution_name: String,
  bank_link_access_token: Option<String>,
  bank_link_item_id: Option<String>,
  funding_source_url: Option<String>,
  has_removed_funding_source: bool,
  is_active: bool,
  created_at: DateTime<Utc>,
}

impl From<LinkedAccountRow> for LinkedAccount {
  fn from(row: LinkedAccountRow) -> Self {
    LinkedAccount {
      id: row.id,
      user_id: UserId::from_db(row.user_id),
      account_name: row.account_name,
      institution_name: row.institution_name,
      bank_link_access_token: row.bank_link_access_token,
      bank_link_item_id: row.bank_link_item_id,
      funding_source_url: row.funding_source_url,
      has_removed_funding_source: row.has_removed_funding_source,
      is_active: row.is_active,
      created_at: row.created_at,
    }
  }
}

#[async_trait]
impl LinkedAccountRepository for PostgresLinkedAccountRepository {
  async fn find_for_user(&self, user_id: UserId) -> Result<Vec<LinkedAccount>, RepositoryError> {
    let rows = sqlx::query_as::<_, LinkedAccountRow>(
      r#"
            SELECT
                id,
                user_id,
                account_name,
                institution_name,
                bank_link_access_token,
                bank_link_item_id,
                funding_source_url,
                has_removed_funding_source,
                is_active,
                created_at
            FROM user_accounts
            WHERE user_id = $1
            ORDER BY id
            "#,
    )
    .bind(user_id.into_inner())
    .fetch_all(&self.pool)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
  }

  async fn find_placeholder_account(
    &self,
    placeholder_user_id: UserId,
  ) -> Result<Option<LinkedAccount>, RepositoryError> {
    let row = sqlx::query_as::<_, LinkedAccountRow>(
      r#"
            SELECT
                id,
                user_id,
                account_name,
                institution_name,
                bank_link_access_token,
                bank_link_item_id,
                funding_source_url,
                has_removed_funding_source,
                is_active,
                created_at
            FROM user_accounts
            WHERE user_id = $1 AND NOT is_active
            ORDER BY id
            LIMIT 1
            "#,
    )
    .bind(placeholder_user_id.into_inner())
    .fetch_optional(&self.pool)
    .await?;

    Ok(row.map(Into::into))
  }

  async fn mark_funding_source_removed(&self, account_id: i64) -> Result<(), RepositoryError> {
    let result =
      sqlx::query("UPDATE user_accounts SET has_removed_funding_source = TRUE WHERE id = $1")
        .bind(account_id)
        .execute(&self.pool)
        .await?;

    if result.rows_affected() == 0 {
      tracing::warn!("Linked account {} not found when marking funding source removed", account_id);
      return Err(RepositoryError::NotFound);
    }

    Ok(())
  }

  async fn delete_for_user(&self, user_id: UserId) -> Result<u64, RepositoryError> {
    let result = sqlx::query("DELETE FROM user_accounts WHERE user_id = $1")
      .bind(user_id.into_inner())
      .execute(&self.pool)
      .await
      .map_err(|e| {
        tracing::error!("Failed to delete linked accounts of user {}: {}", user_id, e);
        RepositoryError::from(e)
      })?;

    Ok(result.rows_affected())
  }
}
