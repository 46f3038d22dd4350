//! Non-durable storage implementations

mod memory;

pub use memory::InMemoryUserRepository;
