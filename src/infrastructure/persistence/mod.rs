#[cfg(test)]
pub mod memory;
pub mod postgres;
