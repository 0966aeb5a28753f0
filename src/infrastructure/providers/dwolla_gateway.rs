use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde_json::json;
use std::time::Duration;

use crate::domain::banking::errors::ExternalServiceError;
use crate::domain::banking::ports::PaymentGateway;

const HAL_JSON: &str = "application/vnd.dwolla.v1.hal+json";

/// Payments provider client speaking the Dwolla REST dialect.
///
/// Every operation is a POST against the resource's own URL, as stored when
/// the resource was created.
pub struct DwollaPaymentGateway {
  client: reqwest::Client,
  base_url: Url,
  access_token: String,
}

impl DwollaPaymentGateway {
  pub fn new(
    base_url: impl Into<String>,
    access_token: impl Into<String>,
    timeout: Duration,
  ) -> Result<Self, ExternalServiceError> {
    let base_url = base_url.into();
    let base_url = Url::parse(&base_url).map_err(|e| {
      ExternalServiceError::Configuration(format!("payments base URL {}: {}", base_url, e))
    })?;
    if base_url.host_str().is_none() {
      return Err(ExternalServiceError::Configuration(format!(
        "payments base URL {} has no host",
        base_url
      )));
    }

    let client = reqwest::Client::builder().timeout(timeout).build()?;
    Ok(Self {
      client,
      base_url,
      access_token: access_token.into(),
    })
  }

  /// True when `resource_url` lives on the configured scheme, host and port
  fn is_provider_hosted(&self, resource_url: &str) -> bool {
    let Ok(url) = Url::parse(resource_url) else {
      return false;
    };
    url.scheme() == self.base_url.scheme()
      && url.host_str().is_some()
      && url.host_str() == self.base_url.host_str()
      && url.port_or_known_default() == self.base_url.port_or_known_default()
      && url.username().is_empty()
      && url.password().is_none()
  }

  async fn post(&self, resource_url: &str, body: serde_json::Value) -> Result<(), ExternalServiceError> {
    // Never hand the token to a host we were not configured for
    if !self.is_provider_hosted(resource_url) {
      return Err(ExternalServiceError::Rejected {
        resource: resource_url.to_string(),
        reason: "resource is not hosted by the configured payments provider".to_string(),
      });
    }

    let response = self
      .client
      .post(resource_url)
      .bearer_auth(&self.access_token)
      .header(reqwest::header::ACCEPT, HAL_JSON)
      .header(reqwest::header::CONTENT_TYPE, HAL_JSON)
      .json(&body)
      .send()
      .await?;

    let status = response.status();
    if status.is_success() {
      return Ok(());
    }

    let text = response.text().await.unwrap_or_default();
    Err(classify_failure(status, resource_url, &text))
  }
}

/// Maps a non-success provider response onto the error taxonomy
pub fn classify_failure(status: StatusCode, resource: &str, body: &str) -> ExternalServiceError {
  match status {
    StatusCode::NOT_FOUND | StatusCode::GONE => ExternalServiceError::NotFound(resource.to_string()),
    s if s.is_server_error() || s == StatusCode::TOO_MANY_REQUESTS => {
      ExternalServiceError::Unavailable(format!("{} returned {}", resource, s))
    }
    s if s.is_client_error() => ExternalServiceError::Rejected {
      resource: resource.to_string(),
      reason: provider_message(body).unwrap_or_else(|| s.to_string()),
    },
    s => ExternalServiceError::InvalidResponse(format!("{} returned {}", resource, s)),
  }
}

fn provider_message(body: &str) -> Option<String> {
  let value: serde_json::Value = serde_json::from_str(body).ok()?;
  value
    .get("message")
    .and_then(|m| m.as_str())
    .map(str::to_string)
}

#[async_trait]
impl PaymentGateway for DwollaPaymentGateway {
  async fn cancel_transfer(&self, transfer_url: &str) -> Result<(), ExternalServiceError> {
    tracing::info!("Cancelling transfer {}", transfer_url);
    self.post(transfer_url, json!({ "status": "cancelled" })).await
  }

  async fn remove_funding_source(
    &self,
    funding_source_url: &str,
  ) -> Result<(), ExternalServiceError> {
    tracing::info!("Removing funding source {}", funding_source_url);
    self.post(funding_source_url, json!({ "removed": true })).await
  }

  async fn deactivate_customer(&self, customer_url: &str) -> Result<(), ExternalServiceError> {
    tracing::info!("Deactivating customer {}", customer_url);
    self.post(customer_url, json!({ "status": "deactivated" })).await
  }
}
