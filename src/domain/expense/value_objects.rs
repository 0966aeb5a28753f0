use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Unknown transfer status: {0}")]
pub struct UnknownTransferStatus(pub String);

/// Provider-side state of a shared-expense transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
  Pending,
  Processed,
  Cancelled,
  Failed,
}

impl TransferStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      TransferStatus::Pending => "pending",
      TransferStatus::Processed => "processed",
      TransferStatus::Cancelled => "cancelled",
      TransferStatus::Failed => "failed",
    }
  }
}

impl fmt::Display for TransferStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for TransferStatus {
  type Err = UnknownTransferStatus;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "pending" => Ok(TransferStatus::Pending),
      "processed" => Ok(TransferStatus::Processed),
      "cancelled" => Ok(TransferStatus::Cancelled),
      "failed" => Ok(TransferStatus::Failed),
      other => Err(UnknownTransferStatus(other.to_string())),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_known_statuses() {
    assert_eq!("pending".parse::<TransferStatus>().unwrap(), TransferStatus::Pending);
    assert_eq!(
      "cancelled".parse::<TransferStatus>().unwrap(),
      TransferStatus::Cancelled
    );
  }

  #[test]
  fn test_parse_unknown_status() {
    assert!("reversed".parse::<TransferStatus>().is_err());
  }
}
