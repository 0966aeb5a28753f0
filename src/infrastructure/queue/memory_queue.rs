use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use uuid::Uuid;

use crate::domain::account_deletion::entities::{AccountDeletionEvent, Delivery};
use crate::domain::account_deletion::errors::QueueError;
use crate::domain::account_deletion::ports::DeletionQueue;
use crate::domain::account_deletion::value_objects::{EnqueueOutcome, RetryOutcome};
use crate::domain::user::value_objects::UserId;

#[derive(Default)]
struct QueueState {
  pending: VecDeque<AccountDeletionEvent>,
  in_flight: HashMap<String, AccountDeletionEvent>,
  queued_users: HashSet<UserId>,
  dead_letters: Vec<AccountDeletionEvent>,
}

/// Process-local deletion queue. Events do not survive a restart.
pub struct InMemoryDeletionQueue {
  state: Mutex<QueueState>,
  notify: Notify,
  max_attempts: u32,
}

impl InMemoryDeletionQueue {
  pub fn new(max_attempts: u32) -> Self {
    Self {
      state: Mutex::new(QueueState::default()),
      notify: Notify::new(),
      max_attempts: max_attempts.max(1),
    }
  }

  pub async fn pending_len(&self) -> usize {
    self.state.lock().await.pending.len()
  }

  pub async fn dead_letters(&self) -> Vec<AccountDeletionEvent> {
    self.state.lock().await.dead_letters.clone()
  }
}

#[async_trait]
impl DeletionQueue for InMemoryDeletionQueue {
  async fn enqueue(&self, event: AccountDeletionEvent) -> Result<EnqueueOutcome, QueueError> {
    let mut state = self.state.lock().await;

    if !state.queued_users.insert(event.user_id()) {
      return Ok(EnqueueOutcome::AlreadyQueued);
    }

    tracing::debug!("Queued deletion event {} for user {}", event.event_id, event.user_id());
    state.pending.push_back(event);
    drop(state);

    self.notify.notify_one();
    Ok(EnqueueOutcome::Enqueued)
  }

  async fn reserve(&self, timeout: Duration) -> Result<Option<Delivery>, QueueError> {
    let deadline = tokio::time::Instant::now() + timeout;

    loop {
      {
        let mut state = self.state.lock().await;
        if let Some(event) = state.pending.pop_front() {
          let receipt = Uuid::new_v4().to_string();
          state.in_flight.insert(receipt.clone(), event.clone());
          return Ok(Some(Delivery { event, receipt }));
        }
      }

      if tokio::time::timeout_at(deadline, self.notify.notified())
        .await
        .is_err()
      {
        return Ok(None);
      }
    }
  }

  async fn ack(&self, delivery: &Delivery) -> Result<(), QueueError> {
    let mut state = self.state.lock().await;
    state.in_flight.remove(&delivery.receipt);
    state.queued_users.remove(&delivery.event.user_id());
    Ok(())
  }

  async fn retry(&self, delivery: Delivery) -> Result<RetryOutcome, QueueError> {
    let mut state = self.state.lock().await;
    state.in_flight.remove(&delivery.receipt);

    let mut event = delivery.event;
    event.attempt += 1;

    if event.attempt >= self.max_attempts {
      tracing::error!(
        "Dead-lettering deletion event {} for user {} after {} attempts",
        event.event_id,
        event.user_id(),
        event.attempt
      );
      state.queued_users.remove(&event.user_id());
      state.dead_letters.push(event);
      return Ok(RetryOutcome::DeadLettered);
    }

    let attempt = event.attempt;
    state.pending.push_back(event);
    drop(state);

    self.notify.notify_one();
    Ok(RetryOutcome::Requeued { attempt })
  }
}
