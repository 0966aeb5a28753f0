use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use validator::ValidateEmail;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ValueObjectError {
  #[error("Invalid email format: {0}")]
  InvalidEmail(String),

  #[error("Invalid user id: {0}")]
  InvalidUserId(String),
}

// ============================================================================
// Email Value Object
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
  /// Creates a new Email after validation
  pub fn new(email: impl Into<String>) -> Result<Self, ValueObjectError> {
    let email = email.into();
    let trimmed = email.trim();

    if !trimmed.validate_email() {
      return Err(ValueObjectError::InvalidEmail(email));
    }

    // Invites are stored lowercased, so matching happens on the normalized form
    Ok(Self(trimmed.to_lowercase()))
  }

  /// Returns the email as a string slice
  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// Consumes self and returns the inner String
  pub fn into_inner(self) -> String {
    self.0
  }
}

impl fmt::Display for Email {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl AsRef<str> for Email {
  fn as_ref(&self) -> &str {
    &self.0
  }
}

// ============================================================================
// UserId Value Object
// ============================================================================

/// Database identifier of a user row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
  /// Creates a UserId, rejecting non-positive values
  pub fn new(id: i64) -> Result<Self, ValueObjectError> {
    if id <= 0 {
      return Err(ValueObjectError::InvalidUserId(id.to_string()));
    }
    Ok(Self(id))
  }

  /// Wraps a value read back from the database
  pub fn from_db(id: i64) -> Self {
    Self(id)
  }

  /// Returns the inner integer
  pub fn into_inner(self) -> i64 {
    self.0
  }
}

impl fmt::Display for UserId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl From<UserId> for i64 {
  fn from(user_id: UserId) -> Self {
    user_id.0
  }
}
