//! Concrete adapters behind the domain ports: store backends, clocks, and
//! audit sinks.

pub mod audit;
pub mod clock;
pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
