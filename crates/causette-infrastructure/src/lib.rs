pub mod config_service;
pub mod file_store;
pub mod memory_store;
pub mod paths;

pub use crate::config_service::load_widget_config;
pub use crate::file_store::FileStoreBackend;
pub use crate::memory_store::MemoryStoreBackend;
pub use crate::paths::CausettePaths;
