//! # Ports Layer
//!
//! - **Inbound (Driving)**: what transports call to sign or authenticate
//! - **Outbound (Driven)**: what the protocols need from their surroundings
//!   (a clock, a raw transport call, a message serializer)

pub mod inbound;
pub mod outbound;
