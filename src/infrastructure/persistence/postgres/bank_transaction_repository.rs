use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::banking::ports::BankTransactionRepository;
use crate::domain::user::errors::RepositoryError;

pub struct PostgresBankTransactionRepository {
  pool: PgPool,
}

impl PostgresBankTransactionRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl BankTransactionRepository for PostgresBankTransactionRepository {
  async fn reassign_accounts(
    &self,
    account_ids: &[i64],
    target_account_id: i64,
  ) -> Result<u64, RepositoryError> {
    let result = sqlx::query("UPDATE bank_transactions SET account_id = $2 WHERE account_id = ANY($1)")
      .bind(account_ids)
      .bind(target_account_id)
      .execute(&self.pool)
      .await
      .map_err(|e| {
        tracing::error!("Failed to reassign bank transactions: {}", e);
        RepositoryError::from(e)
      })?;

    Ok(result.rows_affected())
  }
}
