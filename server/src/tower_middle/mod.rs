/// Tower middleware module
///
/// Layers wrapped around the router service for every connection.
pub mod request_log;

pub use request_log::{RequestLogLayer, RequestLogService};
