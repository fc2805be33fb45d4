pub mod repository;
pub mod sqlite;

pub use repository::{InMemoryStore, KeyValueStore, Storage, StorageError};
pub use sqlite::{SqliteInitError, SqliteStore};
