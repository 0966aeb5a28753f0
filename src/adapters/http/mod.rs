pub mod dtos;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod routes;

// Re-export commonly used types
pub use dtos::{DeleteAccountRequest, DeleteAccountResponse, ErrorResponse};
pub use errors::ApiError;
pub use middleware::{
  ACTING_USER_HEADER, ActingUser, ActingUserExt, RequestId, RequestIdExt, RequestIdMiddleware,
  ServiceAuthMiddleware,
};
pub use routes::{configure_system_routes, configure_user_routes};
