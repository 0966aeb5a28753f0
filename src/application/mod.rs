//! Application layer
//!
//! Use cases that drive the deletion cascade: accepting requests and working
//! through the deletion queue.

pub mod account_deletion;
