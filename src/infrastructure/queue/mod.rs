pub mod memory_queue;
pub mod redis_queue;

pub use memory_queue::InMemoryDeletionQueue;
pub use redis_queue::RedisDeletionQueue;
