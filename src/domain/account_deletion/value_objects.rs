use serde::{Deserialize, Serialize};
use std::fmt;

/// One stage of the account deletion cascade.
///
/// The declaration order is the execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanupStep {
  ExternalResources,
  TransactionReassignment,
  Relationships,
  Devices,
  Invites,
  LoginAudit,
  LinkedAccounts,
  UserRecord,
}

impl CleanupStep {
  /// Every step, in cascade order
  pub const ALL: [CleanupStep; 8] = [
    CleanupStep::ExternalResources,
    CleanupStep::TransactionReassignment,
    CleanupStep::Relationships,
    CleanupStep::Devices,
    CleanupStep::Invites,
    CleanupStep::LoginAudit,
    CleanupStep::LinkedAccounts,
    CleanupStep::UserRecord,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      CleanupStep::ExternalResources => "external_resources",
      CleanupStep::TransactionReassignment => "transaction_reassignment",
      CleanupStep::Relationships => "relationships",
      CleanupStep::Devices => "devices",
      CleanupStep::Invites => "invites",
      CleanupStep::LoginAudit => "login_audit",
      CleanupStep::LinkedAccounts => "linked_accounts",
      CleanupStep::UserRecord => "user_record",
    }
  }
}

impl fmt::Display for CleanupStep {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// What the cascade does when the payments or bank-link provider rejects a
/// revocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExternalFailurePolicy {
  /// Log loudly for manual follow-up and keep cleaning up
  #[default]
  Continue,
  /// Abort the cascade so the event is redelivered
  Halt,
}

/// Result of queueing a deletion request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
  Enqueued,
  /// A deletion for the same user is already pending or running
  AlreadyQueued,
}

/// Result of handing a failed delivery back to the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryOutcome {
  Requeued { attempt: u32 },
  DeadLettered,
}
