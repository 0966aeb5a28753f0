//! Account deletion cascade
//!
//! A deletion request is queued as an [`AccountDeletionEvent`] and later
//! processed by running every [`ResourceCleaner`] for the user in a fixed
//! order. References other users still need are handed to the
//! [`DeactivatedPlaceholder`] instead of being deleted.

pub mod entities;
pub mod errors;
pub mod ports;
pub mod services;
pub mod value_objects;

pub use entities::{AccountDeletionEvent, DeactivatedPlaceholder, Delivery};
pub use errors::{AccountDeletionError, CleanupError, NotificationError, QueueError};
pub use ports::{
  CascadeObserver, DeletionNotifier, DeletionQueue, NoopCascadeObserver, ResourceCleaner,
};
pub use services::{
  AccountDeletionOrchestrator, CascadeCleaners, CascadeDependencies, PlaceholderResolver,
};
pub use value_objects::{CleanupStep, EnqueueOutcome, ExternalFailurePolicy, RetryOutcome};
