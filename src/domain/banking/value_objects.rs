use std::fmt;

/// Kind of provider-side financial resource revoked during deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExternalResourceKind {
  /// In-flight transfer at the payments provider
  Transfer,
  /// Item at the bank-link provider
  BankLinkItem,
  /// Funding source registered with the payments provider
  FundingSource,
  /// Customer record at the payments provider
  PaymentCustomer,
}

impl ExternalResourceKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      ExternalResourceKind::Transfer => "transfer",
      ExternalResourceKind::BankLinkItem => "bank_link_item",
      ExternalResourceKind::FundingSource => "funding_source",
      ExternalResourceKind::PaymentCustomer => "payment_customer",
    }
  }
}

impl fmt::Display for ExternalResourceKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}
