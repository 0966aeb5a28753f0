use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use super::process_account_deletion::ProcessAccountDeletionUseCase;
use crate::domain::account_deletion::entities::Delivery;
use crate::domain::account_deletion::errors::QueueError;
use crate::domain::account_deletion::ports::DeletionQueue;
use crate::domain::account_deletion::value_objects::RetryOutcome;

const BACKOFF_AFTER_QUEUE_ERROR: Duration = Duration::from_secs(1);

/// Pulls deletion events off the queue and runs the cascade for each one.
///
/// Events are acked only after the cascade succeeds. A failed cascade goes
/// back to the queue for redelivery until the queue dead-letters it.
pub struct DeletionWorker {
  queue: Arc<dyn DeletionQueue>,
  processor: Arc<ProcessAccountDeletionUseCase>,
  reserve_timeout: Duration,
}

impl DeletionWorker {
  pub fn new(
    queue: Arc<dyn DeletionQueue>,
    processor: Arc<ProcessAccountDeletionUseCase>,
    reserve_timeout: Duration,
  ) -> Self {
    Self {
      queue,
      processor,
      reserve_timeout,
    }
  }

  /// Handles at most one event. Returns false when nothing arrived within the
  /// reserve timeout.
  pub async fn run_once(&self) -> Result<bool, QueueError> {
    match self.queue.reserve(self.reserve_timeout).await? {
      Some(delivery) => {
        self.handle(delivery).await?;
        Ok(true)
      }
      None => Ok(false),
    }
  }

  /// Processes events until `shutdown` is cancelled. Only waiting for the next
  /// event is interrupted; a cascade that already started runs to completion.
  pub async fn run(&self, shutdown: CancellationToken) {
    tracing::info!("Deletion worker started");
    let mut cancelled = pin!(shutdown.cancelled());

    loop {
      let reserved = tokio::select! {
        biased;
        _ = &mut cancelled => break,
        reserved = self.queue.reserve(self.reserve_timeout) => reserved,
      };

      let result = match reserved {
        Ok(Some(delivery)) => self.handle(delivery).await,
        Ok(None) => continue,
        Err(e) => Err(e),
      };

      if let Err(e) = result {
        tracing::error!("Deletion queue error: {}", e);
        tokio::select! {
          _ = &mut cancelled => break,
          _ = tokio::time::sleep(BACKOFF_AFTER_QUEUE_ERROR) => {}
        }
      }
    }

    tracing::info!("Deletion worker stopped");
  }

  async fn handle(&self, delivery: Delivery) -> Result<(), QueueError> {
    let span = tracing::info_span!(
      "account_deletion",
      user_id = %delivery.event.user_id(),
      event_id = %delivery.event.event_id,
    );

    async {
      match self.processor.execute(&delivery.event).await {
        Ok(()) => {
          self.queue.ack(&delivery).await?;
          tracing::info!("Account deletion completed");
        }
        Err(e) => {
          tracing::error!(
            "Account deletion failed on attempt {}: {}",
            delivery.event.attempt + 1,
            e
          );
          match self.queue.retry(delivery).await? {
            RetryOutcome::Requeued { attempt } => {
              tracing::warn!("Account deletion requeued after {} failed attempts", attempt);
            }
            RetryOutcome::DeadLettered => {
              tracing::error!("Account deletion dead-lettered, manual follow-up required");
            }
          }
        }
      }
      Ok(())
    }
    .instrument(span)
    .await
  }
}
