//! Data models for exchange requests and responses.
//!
//! This module contains the request a caller submits and the response the
//! executor captures for it.

pub mod request;
pub mod response;

pub use request::{supported_methods, ExchangeRequest, HttpMethod};
pub use response::ExchangeResponse;
