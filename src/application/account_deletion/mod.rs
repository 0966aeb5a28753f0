pub mod deletion_worker;
pub mod process_account_deletion;
pub mod request_account_deletion;

pub use deletion_worker::DeletionWorker;
pub use process_account_deletion::ProcessAccountDeletionUseCase;
pub use request_account_deletion::{
  RequestAccountDeletionCommand, RequestAccountDeletionResponse, RequestAccountDeletionUseCase,
};
