//! # Outbound Ports (Driven Ports / SPI)

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use http::HeaderMap;
use serde::Serialize;
use thiserror::Error;

// =============================================================================
// CLOCK
// =============================================================================

/// Wall clock in milliseconds since the Unix epoch.
pub trait Clock: Send + Sync {
    /// Current time.
    fn now_millis(&self) -> i64;
}

/// Clock backed by `SystemTime`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(elapsed) => i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX),
            Err(before) => i64::try_from(before.duration().as_millis())
                .map(|ms| -ms)
                .unwrap_or(i64::MIN),
        }
    }
}

/// Manually driven clock for deterministic tests.
#[derive(Debug, Default)]
pub struct FixedClock {
    millis: AtomicI64,
}

impl FixedClock {
    /// Clock frozen at `millis`.
    pub fn new(millis: i64) -> Self {
        Self {
            millis: AtomicI64::new(millis),
        }
    }

    /// Jump to `millis`.
    pub fn set(&self, millis: i64) {
        self.millis.store(millis, Ordering::SeqCst);
    }

    /// Move forward (or back, for negative `delta_ms`).
    pub fn advance(&self, delta_ms: i64) {
        self.millis.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.millis.load(Ordering::SeqCst)
    }
}

// =============================================================================
// RAW CLIENT CALL
// =============================================================================

/// The transport's outgoing call, operating on already-serialized bytes.
///
/// The signing call wraps one of these and decides when it is started.
pub trait RawClientCall {
    /// Response listener handed over at start.
    type Listener;

    /// Begin the call with the final headers.
    fn start(&mut self, listener: Self::Listener, headers: HeaderMap);

    /// Grant flow-control credit for `num_messages` responses.
    fn request(&mut self, num_messages: u32);

    /// Send one message.
    fn send_message(&mut self, payload: Bytes);

    /// No more messages will be sent.
    fn half_close(&mut self);

    /// Abort the call.
    fn cancel(&mut self, reason: &str);

    /// Whether the transport can accept another message without buffering.
    fn is_ready(&self) -> bool;
}

// =============================================================================
// MARSHALLING
// =============================================================================

/// Serialization failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct MarshalError(pub String);

/// Turns an outbound message into the exact bytes that are signed and sent.
pub trait RequestMarshaller<M: ?Sized>: Send + Sync {
    /// Serialize `message`.
    fn marshal(&self, message: &M) -> Result<Bytes, MarshalError>;
}

/// Identity marshaller for pre-serialized payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesMarshaller;

impl RequestMarshaller<Bytes> for BytesMarshaller {
    fn marshal(&self, message: &Bytes) -> Result<Bytes, MarshalError> {
        Ok(message.clone())
    }
}

impl RequestMarshaller<[u8]> for BytesMarshaller {
    fn marshal(&self, message: &[u8]) -> Result<Bytes, MarshalError> {
        Ok(Bytes::copy_from_slice(message))
    }
}

impl RequestMarshaller<Vec<u8>> for BytesMarshaller {
    fn marshal(&self, message: &Vec<u8>) -> Result<Bytes, MarshalError> {
        Ok(Bytes::copy_from_slice(message))
    }
}

/// JSON marshaller using `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonMarshaller;

impl<M: Serialize + ?Sized> RequestMarshaller<M> for JsonMarshaller {
    fn marshal(&self, message: &M) -> Result<Bytes, MarshalError> {
        serde_json::to_vec(message)
            .map(Bytes::from)
            .map_err(|e| MarshalError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock::new(1_000);
        assert_eq!(clock.now_millis(), 1_000);
        clock.advance(500);
        assert_eq!(clock.now_millis(), 1_500);
        clock.advance(-2_000);
        assert_eq!(clock.now_millis(), -500);
        clock.set(42);
        assert_eq!(clock.now_millis(), 42);
    }

    #[test]
    fn test_system_clock_is_after_2024() {
        assert!(SystemClock.now_millis() > 1_704_067_200_000);
    }

    #[test]
    fn test_bytes_marshaller_is_identity() {
        let payload = Bytes::from_static(b"\x0a\x03abc");
        assert_eq!(BytesMarshaller.marshal(&payload).unwrap(), payload);
        assert_eq!(BytesMarshaller.marshal(&b"raw"[..]).unwrap(), Bytes::from_static(b"raw"));
        assert_eq!(BytesMarshaller.marshal(&vec![1u8, 2]).unwrap(), Bytes::from_static(&[1, 2]));
    }

    #[test]
    fn test_json_marshaller() {
        let mut message = BTreeMap::new();
        message.insert("amount", "10.00");
        assert_eq!(
            JsonMarshaller.marshal(&message).unwrap(),
            Bytes::from_static(br#"{"amount":"10.00"}"#)
        );
    }

    #[test]
    fn test_json_marshaller_error() {
        let mut message = BTreeMap::new();
        message.insert(vec![1u8], 1);
        assert!(JsonMarshaller.marshal(&message).is_err());
    }
}
