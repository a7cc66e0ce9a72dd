// Adapters layer: concrete implementations for external systems (local file system).

pub mod storage;

pub use storage::LocalStorage;
