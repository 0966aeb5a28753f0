pub mod entities;
pub mod errors;
pub mod ports;
pub mod services;
pub mod value_objects;

// Re-export commonly used types
pub use entities::{Device, LoginLogEntry, PushNotification, Relationship, User, UserInvite};
pub use errors::RepositoryError;
pub use value_objects::{Email, UserId, ValueObjectError};
