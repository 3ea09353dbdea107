//! Cache backends and the value encoding resolvers store in them.
//!
//! Resolvers only see the [`modroute_api::Cache`] contract. Two backends ship
//! here: an in-process map and a per-namespace file store that survives
//! restarts.

pub mod codec;
pub mod file;
pub mod memory;

pub use codec::{CACHE_FORMAT_VERSION, CodecError};
pub use file::FileCache;
pub use memory::MemoryCache;
