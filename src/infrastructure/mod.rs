//! Infrastructure layer
//!
//! Adapters for the domain ports: Postgres repositories, deletion queues,
//! provider clients, metrics and configuration.

pub mod config;
pub mod metrics;
pub mod notifications;
pub mod persistence;
pub mod providers;
pub mod queue;
pub mod security;
