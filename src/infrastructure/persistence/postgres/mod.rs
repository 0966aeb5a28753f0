pub mod bank_transaction_repository;
pub mod device_repository;
pub mod linked_account_repository;
pub mod login_log_repository;
pub mod relationship_repository;
pub mod shared_expense_repository;
pub mod user_invite_repository;
pub mod user_repository;

pub use bank_transaction_repository::PostgresBankTransactionRepository;
pub use device_repository::PostgresDeviceRepository;
pub use linked_account_repository::PostgresLinkedAccountRepository;
pub use login_log_repository::PostgresLoginLogRepository;
pub use relationship_repository::PostgresRelationshipRepository;
pub use shared_expense_repository::PostgresSharedExpenseRepository;
pub use user_invite_repository::PostgresUserInviteRepository;
pub use user_repository::PostgresUserRepository;
