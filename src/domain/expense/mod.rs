pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;

pub use entities::{
  AgreementCancellationNotice, AgreementParticipant, SharedExpense, SharedExpenseTransaction,
  SharedExpenseUserAgreement,
};
pub use ports::SharedExpenseRepository;
pub use value_objects::TransferStatus;
