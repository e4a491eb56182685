//! HTTP protocol layer module
//!
//! The response-writing surface handlers use, plus the fixed responses the
//! server layer returns before a request reaches the router.

pub mod response;

// Re-export commonly used types
pub use response::{build_400_response, build_413_response, BufferedResponse, ResponseWriter};
