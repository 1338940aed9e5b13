//! # Integration Scenarios
//!
//! The client signing call and the server verification interceptor running
//! against each other, first over an in-memory transport and then through
//! the HTTP layers.

pub mod end_to_end;
pub mod http_layers;
