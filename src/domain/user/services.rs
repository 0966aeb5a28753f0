use async_trait::async_trait;
use std::sync::Arc;

use super::entities::User;
use super::ports::{
  DeviceRepository, LoginLogRepository, RelationshipRepository, UserInviteRepository,
  UserRepository,
};
use super::value_objects::Email;
use crate::domain::account_deletion::entities::DeactivatedPlaceholder;
use crate::domain::account_deletion::errors::CleanupError;
use crate::domain::account_deletion::ports::{DeletionNotifier, ResourceCleaner};

/// Deletes every contact-graph edge touching the user. Edges are never
/// redirected to the placeholder.
pub struct RelationshipPruner {
  relationship_repo: Arc<dyn RelationshipRepository>,
}

impl RelationshipPruner {
  pub fn new(relationship_repo: Arc<dyn RelationshipRepository>) -> Self {
    Self { relationship_repo }
  }
}

#[async_trait]
impl ResourceCleaner for RelationshipPruner {
  async fn delete_managed_resources_for_user(&self, user: &User) -> Result<(), CleanupError> {
    let removed = self.relationship_repo.delete_involving(user.id).await?;
    tracing::debug!("Removed {} relationships of user {}", removed, user.id);
    Ok(())
  }
}

/// Deletes the user's push-notification devices and their notifications
pub struct DeviceRegistryCleaner {
  device_repo: Arc<dyn DeviceRepository>,
}

impl DeviceRegistryCleaner {
  pub fn new(device_repo: Arc<dyn DeviceRepository>) -> Self {
    Self { device_repo }
  }
}

#[async_trait]
impl ResourceCleaner for DeviceRegistryCleaner {
  async fn delete_managed_resources_for_user(&self, user: &User) -> Result<(), CleanupError> {
    let device_ids = self.device_repo.find_ids_for_user(user.id).await?;

    // Notifications reference devices, so they go first
    let notifications = if device_ids.is_empty() {
      0
    } else {
      self
        .device_repo
        .delete_notifications_for_devices(&device_ids)
        .await?
    };
    let devices = self.device_repo.delete_for_user(user.id).await?;

    tracing::debug!(
      "Removed {} devices and {} push notifications of user {}",
      devices,
      notifications,
      user.id
    );
    Ok(())
  }
}

/// Deletes invitations sent by the user, and those still waiting on the
/// user's address
pub struct InviteLedgerCleaner {
  invite_repo: Arc<dyn UserInviteRepository>,
}

impl InviteLedgerCleaner {
  pub fn new(invite_repo: Arc<dyn UserInviteRepository>) -> Self {
    Self { invite_repo }
  }
}

#[async_trait]
impl ResourceCleaner for InviteLedgerCleaner {
  async fn delete_managed_resources_for_user(&self, user: &User) -> Result<(), CleanupError> {
    let email = match Email::new(user.email.as_str()) {
      Ok(email) => Some(email),
      Err(e) => {
        tracing::warn!(
          "User {} has an unusable email, only invites they sent are removed: {}",
          user.id,
          e
        );
        None
      }
    };

    let removed = self
      .invite_repo
      .delete_for_user(user.id, email.as_ref())
      .await?;
    tracing::debug!("Removed {} invites of user {}", removed, user.id);
    Ok(())
  }
}

/// Deletes the user's authentication audit trail
pub struct LoginAuditCleaner {
  login_log_repo: Arc<dyn LoginLogRepository>,
}

impl LoginAuditCleaner {
  pub fn new(login_log_repo: Arc<dyn LoginLogRepository>) -> Self {
    Self { login_log_repo }
  }
}

#[async_trait]
impl ResourceCleaner for LoginAuditCleaner {
  async fn delete_managed_resources_for_user(&self, user: &User) -> Result<(), CleanupError> {
    let removed = self.login_log_repo.delete_for_user(user.id).await?;
    tracing::debug!("Removed {} login log entries of user {}", removed, user.id);
    Ok(())
  }
}

/// Deletes the user row itself. Runs last; a missing row counts as done.
pub struct UserRecordEraser {
  user_repo: Arc<dyn UserRepository>,
  notifier: Arc<dyn DeletionNotifier>,
  placeholder: DeactivatedPlaceholder,
}

impl UserRecordEraser {
  pub fn new(
    user_repo: Arc<dyn UserRepository>,
    notifier: Arc<dyn DeletionNotifier>,
    placeholder: DeactivatedPlaceholder,
  ) -> Self {
    Self {
      user_repo,
      notifier,
      placeholder,
    }
  }
}

#[async_trait]
impl ResourceCleaner for UserRecordEraser {
  async fn delete_managed_resources_for_user(&self, user: &User) -> Result<(), CleanupError> {
    if self.placeholder.is_placeholder(user) {
      return Err(CleanupError::PlaceholderDeletionRefused);
    }

    if !self.user_repo.delete_non_placeholder(user.id).await? {
      tracing::info!("User {} was already deleted", user.id);
      return Ok(());
    }

    tracing::info!("Deleted user record {}", user.id);

    if let Err(e) = self.notifier.account_deleted(user).await {
      tracing::error!(
        "Failed to send account deletion confirmation to user {}: {}",
        user.id,
        e
      );
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::user::entities::{Device, PushNotification, Relationship, UserInvite};
  use crate::domain::user::value_objects::UserId;
  use crate::infrastructure::persistence::memory::InMemoryStore;
  use crate::test_support::{RecordingNotifier, user};

  #[tokio::test]
  async fn test_relationship_pruner_removes_both_directions() {
    let store = Arc::new(InMemoryStore::with_placeholder());
    let u = store.insert_user(user(42, "uma@example.com"));
    let v = store.insert_user(user(7, "vic@example.com"));
    let w = store.insert_user(user(8, "wes@example.com"));
    store.insert_relationship(Relationship {
      id: 0,
      originating_user_id: u.id,
      consenting_user_id: v.id,
      is_confirmed: true,
    });
    store.insert_relationship(Relationship {
      id: 0,
      originating_user_id: w.id,
      consenting_user_id: u.id,
      is_confirmed: false,
    });
    store.insert_relationship(Relationship {
      id: 0,
      originating_user_id: v.id,
      consenting_user_id: w.id,
      is_confirmed: true,
    });

    let pruner = RelationshipPruner::new(store.clone());
    pruner.delete_managed_resources_for_user(&u).await.unwrap();

    let state = store.snapshot();
    assert_eq!(state.relationships.len(), 1);
    assert!(state.relationships.iter().all(|r| !r.involves(u.id)));
  }

  #[tokio::test]
  async fn test_device_cleaner_removes_notifications_first() {
    let store = Arc::new(InMemoryStore::with_placeholder());
    let u = store.insert_user(user(42, "uma@example.com"));
    let v = store.insert_user(user(7, "vic@example.com"));
    let device = store.insert_device(Device {
      id: 0,
      user_id: u.id,
      fcm_token: "token-u".to_string(),
      device_model: Some("Pixel".to_string()),
    });
    let other = store.insert_device(Device {
      id: 0,
      user_id: v.id,
      fcm_token: "token-v".to_string(),
      device_model: None,
    });
    store.insert_push_notification(PushNotification {
      id: 0,
      device_id: device.id,
      title: "Hi".to_string(),
      body: "There".to_string(),
    });
    store.insert_push_notification(PushNotification {
      id: 0,
      device_id: other.id,
      title: "Hi".to_string(),
      body: "Vic".to_string(),
    });

    let cleaner = DeviceRegistryCleaner::new(store.clone());
    cleaner.delete_managed_resources_for_user(&u).await.unwrap();

    let state = store.snapshot();
    assert_eq!(state.devices, vec![other.clone()]);
    assert_eq!(state.push_notifications.len(), 1);
    assert_eq!(state.push_notifications[0].device_id, other.id);
  }

  #[tokio::test]
  async fn test_invite_cleaner_matches_sender_and_pending_address() {
    let store = Arc::new(InMemoryStore::with_placeholder());
    let u = store.insert_user(user(42, "Uma@Example.com"));
    let v = store.insert_user(user(7, "vic@example.com"));
    store.insert_invite(UserInvite {
      id: 0,
      email: "friend@example.com".to_string(),
      initiating_user_id: u.id,
      shared_expense_id: None,
      is_converted: false,
    });
    store.insert_invite(UserInvite {
      id: 0,
      email: "uma@example.com".to_string(),
      initiating_user_id: v.id,
      shared_expense_id: None,
      is_converted: false,
    });
    let kept = store.insert_invite(UserInvite {
      id: 0,
      email: "uma@example.com".to_string(),
      initiating_user_id: v.id,
      shared_expense_id: None,
      is_converted: true,
    });

    let cleaner = InviteLedgerCleaner::new(store.clone());
    cleaner.delete_managed_resources_for_user(&u).await.unwrap();

    assert_eq!(store.snapshot().invites, vec![kept]);
  }

  #[tokio::test]
  async fn test_user_record_eraser_tolerates_missing_row() {
    let store = Arc::new(InMemoryStore::with_placeholder());
    let placeholder = store.placeholder();
    let notifier = Arc::new(RecordingNotifier::default());
    let u = store.insert_user(user(42, "uma@example.com"));

    let eraser = UserRecordEraser::new(store.clone(), notifier.clone(), placeholder);
    eraser.delete_managed_resources_for_user(&u).await.unwrap();
    eraser.delete_managed_resources_for_user(&u).await.unwrap();

    assert!(!store.snapshot().users.contains_key(&42));
    // Only the run that actually removed the row sends the confirmation
    assert_eq!(notifier.deleted_accounts(), vec![UserId::from_db(42)]);
  }

  #[tokio::test]
  async fn test_user_record_eraser_refuses_placeholder() {
    let store = Arc::new(InMemoryStore::with_placeholder());
    let placeholder = store.placeholder();
    let placeholder_user = store.snapshot().users[&placeholder.user_id.into_inner()].clone();

    let eraser = UserRecordEraser::new(
      store.clone(),
      Arc::new(RecordingNotifier::default()),
      placeholder,
    );
    let result = eraser
      .delete_managed_resources_for_user(&placeholder_user)
      .await;

    assert!(matches!(result, Err(CleanupError::PlaceholderDeletionRefused)));
    assert!(store.snapshot().users.contains_key(&placeholder_user.id.into_inner()));
  }
}
