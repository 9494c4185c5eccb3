pub mod dispatch_client;

pub use crate::dispatch_client::DispatchClient;
