//! Error handling for the gateway
//!
//! Every component reports failures as a [`GatewayError`]. The single mapping
//! to the `{"error": {message, type, code}}` envelope lives in `response.rs`.

mod helpers;
mod response;
mod types;

pub use response::{ErrorDetail, ErrorEnvelope, ErrorResponse};
pub use types::{GatewayError, Result};
