pub mod disabled;
pub mod dwolla_gateway;
pub mod plaid_gateway;

pub use disabled::DisabledProvider;
pub use dwolla_gateway::DwollaPaymentGateway;
pub use plaid_gateway::PlaidBankLinkGateway;
