use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::banking::errors::ExternalServiceError;
use crate::domain::banking::ports::BankLinkGateway;

/// Bank-link provider client speaking the Plaid dialect
pub struct PlaidBankLinkGateway {
  client: reqwest::Client,
  base_url: String,
  client_id: String,
  secret: String,
}

#[derive(Serialize)]
struct ItemRemoveRequest<'a> {
  client_id: &'a str,
  secret: &'a str,
  access_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct PlaidError {
  error_code: String,
  #[serde(default)]
  error_message: String,
}

/// Error codes meaning the item is already gone
const ABSENT_ITEM_CODES: [&str; 2] = ["ITEM_NOT_FOUND", "INVALID_ACCESS_TOKEN"];

impl PlaidBankLinkGateway {
  pub fn new(
    base_url: impl Into<String>,
    client_id: impl Into<String>,
    secret: impl Into<String>,
    timeout: Duration,
  ) -> Result<Self, ExternalServiceError> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    Ok(Self {
      client,
      base_url: base_url.into().trim_end_matches('/').to_string(),
      client_id: client_id.into(),
      secret: secret.into(),
    })
  }
}

fn classify_item_error(status: reqwest::StatusCode, body: &str) -> ExternalServiceError {
  match serde_json::from_str::<PlaidError>(body) {
    Ok(error) if ABSENT_ITEM_CODES.contains(&error.error_code.as_str()) => {
      ExternalServiceError::NotFound(format!("item ({})", error.error_code))
    }
    Ok(error) if status.is_server_error() => ExternalServiceError::Unavailable(error.error_message),
    Ok(error) => ExternalServiceError::Rejected {
      resource: "item".to_string(),
      reason: format!("{}: {}", error.error_code, error.error_message),
    },
    Err(_) if status.is_server_error() => {
      ExternalServiceError::Unavailable(format!("item/remove returned {}", status))
    }
    Err(_) => ExternalServiceError::InvalidResponse(format!("item/remove returned {}", status)),
  }
}

#[async_trait]
impl BankLinkGateway for PlaidBankLinkGateway {
  async fn remove_item(&self, access_token: &str) -> Result<(), ExternalServiceError> {
    let response = self
      .client
      .post(format!("{}/item/remove", self.base_url))
      .json(&ItemRemoveRequest {
        client_id: &self.client_id,
        secret: &self.secret,
        access_token,
      })
      .send()
      .await?;

    let status = response.status();
    if status.is_success() {
      tracing::info!("Removed bank-link item");
      return Ok(());
    }

    let body = response.text().await.unwrap_or_default();
    Err(classify_item_error(status, &body))
  }
}
