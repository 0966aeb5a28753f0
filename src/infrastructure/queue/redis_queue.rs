use async_trait::async_trait;
use redis::aio::ConnectionManager;
use std::time::Duration;

use crate::domain::account_deletion::entities::{AccountDeletionEvent, Delivery};
use crate::domain::account_deletion::errors::QueueError;
use crate::domain::account_deletion::ports::DeletionQueue;
use crate::domain::account_deletion::value_objects::{EnqueueOutcome, RetryOutcome};
use crate::domain::user::value_objects::UserId;

/// Redis-backed deletion queue.
///
/// Events wait in a pending list and are moved atomically into a processing
/// list when reserved, so a crashed worker loses nothing: the processing list
/// is moved back on startup. A per-user key marks users with an event in
/// flight.
pub struct RedisDeletionQueue {
  redis: ConnectionManager,
  key_prefix: String,
  max_attempts: u32,
  enqueue_script: redis::Script,
}

// The marker is written only after the push succeeds, inside one script run
const ENQUEUE_SCRIPT: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 1 then
  return 0
end
redis.call('LPUSH', KEYS[2], ARGV[2])
redis.call('SET', KEYS[1], ARGV[1])
return 1
"#;

impl RedisDeletionQueue {
  pub fn new(redis: ConnectionManager, key_prefix: impl Into<String>, max_attempts: u32) -> Self {
    Self {
      redis,
      key_prefix: key_prefix.into(),
      max_attempts: max_attempts.max(1),
      enqueue_script: redis::Script::new(ENQUEUE_SCRIPT),
    }
  }

  fn pending_key(&self) -> String {
    format!("{}:pending", self.key_prefix)
  }

  fn processing_key(&self) -> String {
    format!("{}:processing", self.key_prefix)
  }

  fn dead_letter_key(&self) -> String {
    format!("{}:dead", self.key_prefix)
  }

  fn user_key(&self, user_id: UserId) -> String {
    format!("{}:user:{}", self.key_prefix, user_id)
  }

  /// Moves deliveries left behind by a previous worker back to pending.
  ///
  /// They go to the consuming end oldest-first, ahead of anything queued
  /// since, so delivery order is preserved.
  pub async fn recover_in_flight(&self) -> Result<u64, QueueError> {
    let mut conn = self.redis.clone();
    let mut recovered = 0;

    loop {
      let moved: Option<String> = redis::cmd("LMOVE")
        .arg(self.processing_key())
        .arg(self.pending_key())
        .arg("LEFT")
        .arg("RIGHT")
        .query_async(&mut conn)
        .await?;

      if moved.is_none() {
        break;
      }
      recovered += 1;
    }

    if recovered > 0 {
      tracing::warn!("Recovered {} unacknowledged deletion events", recovered);
    }
    Ok(recovered)
  }

  async fn discard_unreadable(&self, payload: &str) -> Result<(), QueueError> {
    let mut conn = self.redis.clone();
    let _: () = redis::pipe()
      .atomic()
      .cmd("LREM")
      .arg(self.processing_key())
      .arg(1)
      .arg(payload)
      .ignore()
      .cmd("LPUSH")
      .arg(self.dead_letter_key())
      .arg(payload)
      .ignore()
      .query_async(&mut conn)
      .await?;
    Ok(())
  }
}

#[async_trait]
impl DeletionQueue for RedisDeletionQueue {
  async fn enqueue(&self, event: AccountDeletionEvent) -> Result<EnqueueOutcome, QueueError> {
    let mut conn = self.redis.clone();
    let payload = serde_json::to_string(&event)?;

    let pushed: i64 = self
      .enqueue_script
      .key(self.user_key(event.user_id()))
      .key(self.pending_key())
      .arg(event.event_id.to_string())
      .arg(payload)
      .invoke_async(&mut conn)
      .await?;

    if pushed == 0 {
      tracing::debug!("Deletion for user {} is already queued", event.user_id());
      return Ok(EnqueueOutcome::AlreadyQueued);
    }

    tracing::debug!("Queued deletion event {} for user {}", event.event_id, event.user_id());
    Ok(EnqueueOutcome::Enqueued)
  }

  async fn reserve(&self, timeout: Duration) -> Result<Option<Delivery>, QueueError> {
    let mut conn = self.redis.clone();

    let payload: Option<String> = redis::cmd("BLMOVE")
      .arg(self.pending_key())
      .arg(self.processing_key())
      .arg("RIGHT")
      .arg("LEFT")
      .arg(timeout.as_secs_f64())
      .query_async(&mut conn)
      .await?;

    let Some(payload) = payload else {
      return Ok(None);
    };

    match serde_json::from_str::<AccountDeletionEvent>(&payload) {
      Ok(event) => Ok(Some(Delivery {
        event,
        receipt: payload,
      })),
      Err(e) => {
        tracing::error!("Unreadable deletion event moved to dead letters: {}", e);
        self.discard_unreadable(&payload).await?;
        Err(e.into())
      }
    }
  }

  async fn ack(&self, delivery: &Delivery) -> Result<(), QueueError> {
    let mut conn = self.redis.clone();
    let _: () = redis::pipe()
      .atomic()
      .cmd("LREM")
      .arg(self.processing_key())
      .arg(1)
      .arg(&delivery.receipt)
      .ignore()
      .cmd("DEL")
      .arg(self.user_key(delivery.event.user_id()))
      .ignore()
      .query_async(&mut conn)
      .await?;
    Ok(())
  }

  async fn retry(&self, delivery: Delivery) -> Result<RetryOutcome, QueueError> {
    let mut conn = self.redis.clone();
    let mut event = delivery.event;
    event.attempt += 1;
    let payload = serde_json::to_string(&event)?;

    let mut pipe = redis::pipe();
    pipe
      .atomic()
      .cmd("LREM")
      .arg(self.processing_key())
      .arg(1)
      .arg(&delivery.receipt)
      .ignore();

    let outcome = if event.attempt >= self.max_attempts {
      pipe
        .cmd("LPUSH")
        .arg(self.dead_letter_key())
        .arg(&payload)
        .ignore()
        .cmd("DEL")
        .arg(self.user_key(event.user_id()))
        .ignore();
      RetryOutcome::DeadLettered
    } else {
      pipe
        .cmd("LPUSH")
        .arg(self.pending_key())
        .arg(&payload)
        .ignore();
      RetryOutcome::Requeued {
        attempt: event.attempt,
      }
    };

    let _: () = pipe.query_async(&mut conn).await?;

    if outcome == RetryOutcome::DeadLettered {
      tracing::error!(
        "Dead-lettering deletion event {} for user {} after {} attempts",
        event.event_id,
        event.user_id(),
        event.attempt
      );
    }
    Ok(outcome)
  }
}
