use async_trait::async_trait;

use super::entities::User;
use super::errors::RepositoryError;
use super::value_objects::{Email, UserId};

/// Repository trait for user persistence operations
#[async_trait]
pub trait UserRepository: Send + Sync {
  /// Finds a user by their unique identifier
  async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

  /// Finds the reserved placeholder user
  async fn find_placeholder(&self) -> Result<Option<User>, RepositoryError>;

  /// Hard deletes a user row. The placeholder row is never matched.
  ///
  /// Returns `false` when no row was removed (already deleted).
  async fn delete_non_placeholder(&self, id: UserId) -> Result<bool, RepositoryError>;

  /// Forgets the payments-provider customer once it has been deactivated
  async fn clear_payment_customer(&self, id: UserId) -> Result<(), RepositoryError>;
}

/// Repository trait for the contact graph
#[async_trait]
pub trait RelationshipRepository: Send + Sync {
  /// Deletes every edge where the user is originating or consenting endpoint
  async fn delete_involving(&self, user_id: UserId) -> Result<u64, RepositoryError>;
}

/// Repository trait for push-notification device registrations
#[async_trait]
pub trait DeviceRepository: Send + Sync {
  /// Returns ids of all devices registered by the user
  async fn find_ids_for_user(&self, user_id: UserId) -> Result<Vec<i64>, RepositoryError>;

  /// Deletes notifications delivered to the given devices
  async fn delete_notifications_for_devices(
    &self,
    device_ids: &[i64],
  ) -> Result<u64, RepositoryError>;

  /// Deletes every device registered by the user
  async fn delete_for_user(&self, user_id: UserId) -> Result<u64, RepositoryError>;
}

/// Repository trait for shared-expense invitations
#[async_trait]
pub trait UserInviteRepository: Send + Sync {
  /// Deletes invites sent by the user and, when `email` is given, unconverted
  /// invites addressed to it
  async fn delete_for_user(
    &self,
    user_id: UserId,
    email: Option<&Email>,
  ) -> Result<u64, RepositoryError>;
}

/// Repository trait for the login audit log
#[async_trait]
pub trait LoginLogRepository: Send + Sync {
  /// Deletes every login log entry of the user
  async fn delete_for_user(&self, user_id: UserId) -> Result<u64, RepositoryError>;
}
