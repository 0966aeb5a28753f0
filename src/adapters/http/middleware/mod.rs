pub mod request_id;
pub mod service_auth;

// Re-export middleware components for easier access
pub use request_id::{RequestId, RequestIdExt, RequestIdMiddleware};
pub use service_auth::{ACTING_USER_HEADER, ActingUser, ActingUserExt, ServiceAuthMiddleware};
