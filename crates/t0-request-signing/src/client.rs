//! # Signing Protocol (client side)
//!
//! Each outgoing call is a small state machine:
//!
//! ```text
//! Created --start--> AwaitingMessage --send_message / half_close--> Started
//!                                                       |
//!                                   half_close --> Completed, cancel --> Cancelled
//! ```
//!
//! The transport call is only started once the first payload has been
//! serialized and signed, because the signature headers must go out with the
//! call. Flow-control credit granted before that point is buffered and
//! replayed in order right after start.

use std::marker::PhantomData;
use std::sync::Arc;

use bytes::Bytes;
use http::HeaderMap;
use t0_crypto::Signer;
use tracing::{debug, warn};

use crate::domain::digest::request_digest;
use crate::domain::errors::SigningError;
use crate::domain::headers::SignedHeaders;
use crate::ports::inbound::RequestSigner;
use crate::ports::outbound::{Clock, RawClientCall, RequestMarshaller, SystemClock};

/// Signs outgoing payloads with one key.
///
/// Cheap to clone; every call gets its own [`SigningClientCall`].
#[derive(Clone)]
pub struct SigningInterceptor {
    signer: Arc<Signer>,
    clock: Arc<dyn Clock>,
}

impl SigningInterceptor {
    /// Interceptor using the system clock.
    pub fn new(signer: Arc<Signer>) -> Self {
        Self::with_clock(signer, Arc::new(SystemClock))
    }

    /// Interceptor with an injected clock.
    pub fn with_clock(signer: Arc<Signer>, clock: Arc<dyn Clock>) -> Self {
        Self { signer, clock }
    }

    /// The signing key's public half.
    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    /// Sign `payload` as of `timestamp_ms`.
    pub fn sign_at(&self, payload: &[u8], timestamp_ms: i64) -> Result<SignedHeaders, SigningError> {
        let digest = request_digest(payload, timestamp_ms);
        let result = self.signer.sign(&digest)?;
        let headers = SignedHeaders::new(&result, timestamp_ms);
        debug!(
            timestamp_ms,
            payload_len = payload.len(),
            signature = %headers.signature,
            "Signed request"
        );
        Ok(headers)
    }

    /// Wrap a raw transport call.
    pub fn intercept_call<R, M, K>(&self, raw: R, marshaller: K) -> SigningClientCall<R, M, K>
    where
        R: RawClientCall,
        M: ?Sized,
        K: RequestMarshaller<M>,
    {
        SigningClientCall::new(self.clone(), raw, marshaller)
    }
}

impl RequestSigner for SigningInterceptor {
    fn sign_request(&self, payload: &[u8]) -> Result<SignedHeaders, SigningError> {
        self.sign_at(payload, self.clock.now_millis())
    }
}

impl std::fmt::Debug for SigningInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningInterceptor")
            .field("public_key", self.signer.public_key())
            .finish_non_exhaustive()
    }
}

/// Lifecycle of a signing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    /// Constructed, not yet started by the caller.
    Created,
    /// Caller started; transport start deferred until a payload is signed.
    AwaitingMessage,
    /// Transport started with signed headers.
    Started,
    /// Half-closed.
    Completed,
    /// Cancelled by the caller, or after a serialization or signing failure.
    Cancelled,
}

impl CallState {
    /// Lowercase name for logs and errors.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::AwaitingMessage => "awaiting_message",
            Self::Started => "started",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// An outgoing call that signs the exact bytes it sends.
///
/// Owned by exactly one call; not shared across calls.
pub struct SigningClientCall<R: RawClientCall, M: ?Sized, K> {
    interceptor: SigningInterceptor,
    raw: R,
    marshaller: K,
    state: CallState,
    listener: Option<R::Listener>,
    headers: HeaderMap,
    pending_requests: Vec<u32>,
    signed: Option<SignedHeaders>,
    _message: PhantomData<fn(&M)>,
}

impl<R, M, K> SigningClientCall<R, M, K>
where
    R: RawClientCall,
    M: ?Sized,
    K: RequestMarshaller<M>,
{
    fn new(interceptor: SigningInterceptor, raw: R, marshaller: K) -> Self {
        Self {
            interceptor,
            raw,
            marshaller,
            state: CallState::Created,
            listener: None,
            headers: HeaderMap::new(),
            pending_requests: Vec::new(),
            signed: None,
            _message: PhantomData,
        }
    }

    /// Current state.
    pub fn state(&self) -> CallState {
        self.state
    }

    /// Headers attached at start, once signed.
    pub fn signed_headers(&self) -> Option<&SignedHeaders> {
        self.signed.as_ref()
    }

    /// Underlying transport call.
    pub fn raw(&self) -> &R {
        &self.raw
    }

    /// Record the listener and caller headers. The transport is not started
    /// yet.
    pub fn start(&mut self, listener: R::Listener, headers: HeaderMap) -> Result<(), SigningError> {
        self.expect_state(CallState::Created, "start")?;
        self.listener = Some(listener);
        self.headers = headers;
        self.state = CallState::AwaitingMessage;
        Ok(())
    }

    /// Serialize `message` once, sign those bytes, and send them unchanged.
    pub fn send_message(&mut self, message: &M) -> Result<(), SigningError> {
        match self.state {
            CallState::AwaitingMessage | CallState::Started => {}
            other => return Err(invalid_state("send message", other)),
        }

        let payload = match self.marshaller.marshal(message) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Failed to serialize message for signing");
                self.raw.cancel("failed to serialize message for signing");
                self.state = CallState::Cancelled;
                self.pending_requests.clear();
                return Err(SigningError::Serialization(e.0));
            }
        };

        if self.state == CallState::AwaitingMessage {
            self.start_signed(&payload)?;
        }

        self.raw.send_message(payload);
        Ok(())
    }

    /// Finish sending. With no message sent, an empty payload is signed first.
    pub fn half_close(&mut self) -> Result<(), SigningError> {
        match self.state {
            CallState::AwaitingMessage => self.start_signed(&Bytes::new())?,
            CallState::Started => {}
            other => return Err(invalid_state("half-close", other)),
        }

        self.raw.half_close();
        self.state = CallState::Completed;
        Ok(())
    }

    /// Grant response credit, buffered until the transport starts.
    pub fn request(&mut self, num_messages: u32) {
        match self.state {
            CallState::Created | CallState::AwaitingMessage => {
                self.pending_requests.push(num_messages)
            }
            CallState::Started | CallState::Completed => self.raw.request(num_messages),
            CallState::Cancelled => {
                debug!(num_messages, "Ignoring request on cancelled call");
            }
        }
    }

    /// Abort the call.
    pub fn cancel(&mut self, reason: &str) {
        if self.state == CallState::Cancelled {
            return;
        }
        self.raw.cancel(reason);
        self.pending_requests.clear();
        self.state = CallState::Cancelled;
    }

    /// Transport readiness; always `false` before start.
    pub fn is_ready(&self) -> bool {
        self.state == CallState::Started && self.raw.is_ready()
    }

    fn start_signed(&mut self, payload: &[u8]) -> Result<(), SigningError> {
        let (signed, headers, listener) = match self.prepare_start(payload) {
            Ok(prepared) => prepared,
            Err(e) => {
                warn!(error = %e, "Failed to start signed call");
                self.cancel("failed to sign request");
                return Err(e);
            }
        };

        self.headers = HeaderMap::new();
        self.raw.start(listener, headers);
        self.state = CallState::Started;
        self.signed = Some(signed);

        for credit in std::mem::take(&mut self.pending_requests) {
            self.raw.request(credit);
        }
        Ok(())
    }

    /// Sign and build the start headers. The caller's headers are left in
    /// place; the listener is taken last.
    fn prepare_start(
        &mut self,
        payload: &[u8],
    ) -> Result<(SignedHeaders, HeaderMap, R::Listener), SigningError> {
        let signed = self.interceptor.sign_request(payload)?;
        let mut headers = self.headers.clone();
        signed.apply(&mut headers)?;

        let listener = self
            .listener
            .take()
            .ok_or_else(|| invalid_state("start transport", self.state))?;
        Ok((signed, headers, listener))
    }

    fn expect_state(&self, expected: CallState, operation: &'static str) -> Result<(), SigningError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(invalid_state(operation, self.state))
        }
    }
}

fn invalid_state(operation: &'static str, state: CallState) -> SigningError {
    SigningError::InvalidState {
        operation,
        state: state.as_str(),
    }
}
