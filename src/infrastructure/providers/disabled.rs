use async_trait::async_trait;

use crate::domain::banking::errors::ExternalServiceError;
use crate::domain::banking::ports::{BankLinkGateway, PaymentGateway};

/// Stands in for a provider that is not configured. Every call fails as
/// unavailable, so the external failure policy decides what happens.
pub struct DisabledProvider {
  name: &'static str,
}

impl DisabledProvider {
  pub fn new(name: &'static str) -> Self {
    tracing::warn!("{} provider is not configured, revocations will fail", name);
    Self { name }
  }

  fn unavailable(&self, resource: &str) -> ExternalServiceError {
    ExternalServiceError::Unavailable(format!("{} provider not configured ({})", self.name, resource))
  }
}

#[async_trait]
impl PaymentGateway for DisabledProvider {
  async fn cancel_transfer(&self, transfer_url: &str) -> Result<(), ExternalServiceError> {
    Err(self.unavailable(transfer_url))
  }

  async fn remove_funding_source(
    &self,
    funding_source_url: &str,
  ) -> Result<(), ExternalServiceError> {
    Err(self.unavailable(funding_source_url))
  }

  async fn deactivate_customer(&self, customer_url: &str) -> Result<(), ExternalServiceError> {
    Err(self.unavailable(customer_url))
  }
}

#[async_trait]
impl BankLinkGateway for DisabledProvider {
  async fn remove_item(&self, _access_token: &str) -> Result<(), ExternalServiceError> {
    Err(self.unavailable("item"))
  }
}
