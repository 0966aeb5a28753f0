pub mod entities;
pub mod errors;
pub mod ports;
pub mod services;
pub mod value_objects;

pub use entities::{BankTransaction, LinkedAccount};
pub use errors::ExternalServiceError;
pub use ports::{BankLinkGateway, BankTransactionRepository, LinkedAccountRepository, PaymentGateway};
pub use value_objects::ExternalResourceKind;
