pub mod config;
pub mod dispatch;
pub mod error;
pub mod message;
pub mod store;

// Re-export common error type
pub use error::CausetteError;

pub use config::WidgetConfig;
pub use dispatch::{DispatchOutcome, Dispatcher, FailureKind};
pub use message::{ChatMessage, MessageRole};
pub use store::{AbsentReason, CacheLookup, StoreBackend, WidgetStore};
