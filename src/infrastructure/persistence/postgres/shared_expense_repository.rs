use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::domain::account_deletion::entities::DeactivatedPlaceholder;
use crate::domain::expense::{
  entities::{AgreementParticipant, SharedExpense, SharedExpenseTransaction},
  ports::SharedExpenseRepository,
  value_objects::TransferStatus,
};
use crate::domain::user::{errors::RepositoryError, value_objects::UserId};

pub struct PostgresSharedExpenseRepository {
  pool: PgPool,
}

impl PostgresSharedExpenseRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[derive(Debug, sqlx::FromRow)]
struct SharedExpenseRow {
  id: i64,
  expense_nickname: String,
  expense_owner_user_id: i64,
  expense_owner_source_account_id: Option<i64>,
  expense_owner_destination_account_id: Option<i64>,
  is_active: bool,
  is_pending: bool,
  date_time_deactivated: Option<DateTime<Utc>>,
  created_at: DateTime<Utc>,
}

impl From<SharedExpenseRow> for SharedExpense {
  fn from(row: SharedExpenseRow) -> Self {
    SharedExpense {
      id: row.id,
      expense_nickname: row.expense_nickname,
      expense_owner_user_id: UserId::from_db(row.expense_owner_user_id),
      expense_owner_source_account_id: row.expense_owner_source_account_id,
      expense_owner_destination_account_id: row.expense_owner_destination_account_id,
      is_active: row.is_active,
      is_pending: row.is_pending,
      date_time_deactivated: row.date_time_deactivated,
      created_at: row.created_at,
    }
  }
}

#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
  id: i64,
  shared_expense_id: i64,
  source_user_id: i64,
  destination_user_id: i64,
  source_account_id: Option<i64>,
  destination_account_id: Option<i64>,
  total_transaction_amount: Decimal,
  transfer_url: Option<String>,
  transfer_status: String,
  created_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for SharedExpenseTransaction {
  type Error = RepositoryError;

  fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
    let transfer_status = row
      .transfer_status
      .parse::<TransferStatus>()
      .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

    Ok(SharedExpenseTransaction {
      id: row.id,
      shared_expense_id: row.shared_expense_id,
      source_user_id: UserId::from_db(row.source_user_id),
      destination_user_id: UserId::from_db(row.destination_user_id),
      source_account_id: row.source_account_id,
      destination_account_id: row.destination_account_id,
      total_transaction_amount: row.total_transaction_amount,
      transfer_url: row.transfer_url,
      transfer_status,
      created_at: row.created_at,
    })
  }
}

#[derive(Debug, sqlx::FromRow)]
struct ParticipantRow {
  agreement_id: i64,
  user_id: i64,
  email: String,
  first_name: String,
}

#[async_trait]
impl SharedExpenseRepository for PostgresSharedExpenseRepository {
  async fn find_active_owned_by(
    &self,
    user_id: UserId,
  ) -> Result<Vec<SharedExpense>, RepositoryError> {
    let rows = sqlx::query_as::<_, SharedExpenseRow>(
      r#"
            SELECT
                id,
                expense_nickname,
                expense_owner_user_id,
                expense_owner_source_account_id,
                expense_owner_destination_account_id,
                is_active,
                is_pending,
                date_time_deactivated,
                created_at
            FROM shared_expenses
            WHERE expense_owner_user_id = $1 AND is_active
            ORDER BY id
            "#,
    )
    .bind(user_id.into_inner())
    .fetch_all(&self.pool)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
  }

  async fn find_participants(
    &self,
    shared_expense_id: i64,
  ) -> Result<Vec<AgreementParticipant>, RepositoryError> {
    let rows = sqlx::query_as::<_, ParticipantRow>(
      r#"
            SELECT
                a.id AS agreement_id,
                u.id AS user_id,
                u.email,
                u.first_name
            FROM shared_expense_user_agreements a
            JOIN users u ON u.id = a.user_id
            WHERE a.shared_expense_id = $1
            ORDER BY a.id
            "#,
    )
    .bind(shared_expense_id)
    .fetch_all(&self.pool)
    .await?;

    Ok(
      rows
        .into_iter()
        .map(|row| AgreementParticipant {
          agreement_id: row.agreement_id,
          user_id: UserId::from_db(row.user_id),
          email: row.email,
          first_name: row.first_name,
        })
        .collect(),
    )
  }

  async fn find_pending_transfers_involving(
    &self,
    user_id: UserId,
  ) -> Result<Vec<SharedExpenseTransaction>, RepositoryError> {
    let rows = sqlx::query_as::<_, TransactionRow>(
      r#"
            SELECT
                id,
                shared_expense_id,
                source_user_id,
                destination_user_id,
                source_account_id,
                destination_account_id,
                total_transaction_amount,
                transfer_url,
                transfer_status,
                created_at
            FROM shared_expense_transactions
            WHERE (source_user_id = $1 OR destination_user_id = $1)
              AND transfer_status = 'pending'
            ORDER BY id
            "#,
    )
    .bind(user_id.into_inner())
    .fetch_all(&self.pool)
    .await?;

    rows.into_iter().map(TryInto::try_into).collect()
  }

  async fn mark_transfer_cancelled(&self, transaction_id: i64) -> Result<(), RepositoryError> {
    sqlx::query("UPDATE shared_expense_transactions SET transfer_status = $2 WHERE id = $1")
      .bind(transaction_id)
      .bind(TransferStatus::Cancelled.as_str())
      .execute(&self.pool)
      .await
      .map_err(|e| {
        tracing::error!("Failed to mark transfer {} cancelled: {}", transaction_id, e);
        RepositoryError::from(e)
      })?;

    Ok(())
  }

  async fn redirect_transactions(
    &self,
    user_id: UserId,
    placeholder: &DeactivatedPlaceholder,
  ) -> Result<u64, RepositoryError> {
    let mut tx = self.pool.begin().await?;

    let sources = sqlx::query(
      r#"
            UPDATE shared_expense_transactions
            SET source_user_id = $2, source_account_id = $3
            WHERE source_user_id = $1
            "#,
    )
    .bind(user_id.into_inner())
    .bind(placeholder.user_id.into_inner())
    .bind(placeholder.account_id)
    .execute(&mut *tx)
    .await?;

    let destinations = sqlx::query(
      r#"
            UPDATE shared_expense_transactions
            SET destination_user_id = $2, destination_account_id = $3
            WHERE destination_user_id = $1
            "#,
    )
    .bind(user_id.into_inner())
    .bind(placeholder.user_id.into_inner())
    .bind(placeholder.account_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await.map_err(|e| {
      tracing::error!("Failed to redirect transactions of user {}: {}", user_id, e);
      RepositoryError::from(e)
    })?;

    Ok(sources.rows_affected() + destinations.rows_affected())
  }

  async fn redirect_owned_expenses(
    &self,
    user_id: UserId,
    placeholder: &DeactivatedPlaceholder,
    now: DateTime<Utc>,
  ) -> Result<u64, RepositoryError> {
    // SET expressions see the row as it was before the update
    let result = sqlx::query(
      r#"
            UPDATE shared_expenses
            SET
                expense_owner_user_id = $2,
                expense_owner_source_account_id = $3,
                expense_owner_destination_account_id = $3,
                date_time_deactivated = CASE WHEN is_active THEN $4 ELSE date_time_deactivated END,
                is_pending = CASE WHEN is_active THEN FALSE ELSE is_pending END,
                is_active = FALSE
            WHERE expense_owner_user_id = $1
            "#,
    )
    .bind(user_id.into_inner())
    .bind(placeholder.user_id.into_inner())
    .bind(placeholder.account_id)
    .bind(now)
    .execute(&self.pool)
    .await
    .map_err(|e| {
      tracing::error!("Failed to redirect shared expenses of user {}: {}", user_id, e);
      RepositoryError::from(e)
    })?;

    Ok(result.rows_affected())
  }

  async fn delete_agreements_for_user(&self, user_id: UserId) -> Result<u64, RepositoryError> {
    let result = sqlx::query("DELETE FROM shared_expense_user_agreements WHERE user_id = $1")
      .bind(user_id.into_inner())
      .execute(&self.pool)
      .await
      .map_err(|e| {
        tracing::error!("Failed to delete agreements of user {}: {}", user_id, e);
        RepositoryError::from(e)
      })?;

    Ok(result.rows_affected())
  }
}
