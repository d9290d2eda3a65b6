//! Member registry implementations.

pub mod inmemory;

pub use inmemory::InMemoryMemberRegistry;
