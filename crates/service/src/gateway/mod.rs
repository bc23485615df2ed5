//! Gateway request/response contract and the envelope builder.

pub mod request;
pub mod response;

pub use request::{GatewayRequest, Intent};
pub use response::{build_response, internal_error, ErrorBody, GatewayResponse, ResponseError};
