pub mod key;
mod memory;
mod sqlite;

pub use memory::MemoryKv;
pub use sqlite::SqliteKv;

use crate::error::Result;

/// KvStore defines the backing-store interface: a durable mapping from
/// string key to opaque value.
///
/// Deliberately minimal: read, write, delete. No transactions, no listing,
/// no conditional writes. Callers that need read-modify-write safety must
/// serialize their own updates (see `registry::SchemaStore`).
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn put(&self, key: &str, value: &str) -> Result<()>;
    fn delete(&self, key: &str) -> Result<bool>;
}
