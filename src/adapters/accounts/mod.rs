//! Account storage adapters.
//!
//! - `in_memory` - Process-local store for tests and single-node deployments

mod in_memory;

pub use in_memory::InMemoryAccountRepository;
