mod service_token;

pub use service_token::{ServiceTokenError, ServiceTokenVerifier, digest_hex};
