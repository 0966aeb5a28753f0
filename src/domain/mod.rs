pub mod account_deletion;
pub mod banking;
pub mod expense;
pub mod user;

// Re-export user module for easier access
pub use user::*;
