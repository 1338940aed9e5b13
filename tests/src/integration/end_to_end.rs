//! # End-to-End Signing Flows
//!
//! A network-side [`SigningClientCall`] talks to a provider-side
//! [`SignatureVerificationInterceptor`] through an in-memory transport:
//!
//! 1. **start**: the transport runs the header phase on the signed headers
//! 2. **send_message**: the transport runs the payload phase on the raw bytes
//! 3. **request**: credits granted before start arrive after it, in order

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bytes::Bytes;
    use http::{HeaderMap, HeaderValue};
    use serde::Serialize;

    use t0_crypto::Signer;
    use t0_request_signing::{
        frame_payload, BytesMarshaller, CallState, FixedClock, FramingHypothesis, InboundMessage,
        JsonMarshaller, PendingVerification, RejectionStatus, RequestAuthenticator,
        SignatureVerificationInterceptor, SigningClientCall, SigningInterceptor,
        VerificationError, VerifierConfig, TIMESTAMP_HEADER,
    };

    const NETWORK_KEY_HEX: &str = "6b30303de7b26bfb1222b317a52113357f8bb06de00160b4261a2fef9c8b9bd8";
    const NOW: i64 = 1_706_000_000_000;
    const WINDOW_MS: u64 = 60_000;

    // =============================================================================
    // IN-MEMORY TRANSPORT
    // =============================================================================

    /// Transport that hands everything straight to a provider interceptor.
    struct LoopbackCall {
        server: Arc<SignatureVerificationInterceptor>,
        headers: Option<HeaderMap>,
        pending: Option<Result<PendingVerification, VerificationError>>,
        delivered: Vec<Result<Bytes, VerificationError>>,
        credits: Vec<u32>,
        events: Vec<&'static str>,
    }

    impl LoopbackCall {
        fn new(server: Arc<SignatureVerificationInterceptor>) -> Self {
            Self {
                server,
                headers: None,
                pending: None,
                delivered: Vec::new(),
                credits: Vec::new(),
                events: Vec::new(),
            }
        }
    }

    impl t0_request_signing::RawClientCall for LoopbackCall {
        type Listener = ();

        fn start(&mut self, _listener: (), headers: HeaderMap) {
            self.events.push("start");
            self.pending = Some(self.server.authenticate_headers(&headers));
            self.headers = Some(headers);
        }

        fn request(&mut self, num_messages: u32) {
            self.events.push("request");
            self.credits.push(num_messages);
        }

        fn send_message(&mut self, payload: Bytes) {
            self.events.push("send");
            let outcome = match &self.pending {
                Some(Ok(pending)) => pending.on_message(InboundMessage::<()>::Raw(payload)),
                Some(Err(rejected)) => Err(rejected.clone()),
                None => Err(VerificationError::RawBytesUnavailable),
            };
            self.delivered.push(outcome);
        }

        fn half_close(&mut self) {
            self.events.push("half_close");
        }

        fn cancel(&mut self, _reason: &str) {
            self.events.push("cancel");
        }

        fn is_ready(&self) -> bool {
            true
        }
    }

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    #[derive(Serialize)]
    struct PayoutRequest {
        payment_id: u64,
        amount: String,
        currency: &'static str,
    }

    fn network_signer() -> Arc<Signer> {
        Arc::new(Signer::from_hex(NETWORK_KEY_HEX).unwrap())
    }

    fn provider(now_ms: i64) -> Arc<SignatureVerificationInterceptor> {
        let config = VerifierConfig {
            freshness_window_ms: WINDOW_MS,
            ..VerifierConfig::new(network_signer().public_key_hex_prefixed())
        };
        Arc::new(
            SignatureVerificationInterceptor::with_clock(&config, Arc::new(FixedClock::new(now_ms)))
                .unwrap(),
        )
    }

    fn network_client(signer: Arc<Signer>, signed_at: i64) -> SigningInterceptor {
        SigningInterceptor::with_clock(signer, Arc::new(FixedClock::new(signed_at)))
    }

    fn bytes_call(
        client: &SigningInterceptor,
        server: Arc<SignatureVerificationInterceptor>,
    ) -> SigningClientCall<LoopbackCall, Bytes, BytesMarshaller> {
        client.intercept_call(LoopbackCall::new(server), BytesMarshaller)
    }

    fn rejection(call: &SigningClientCall<LoopbackCall, Bytes, BytesMarshaller>) -> RejectionStatus {
        match call.raw().pending.as_ref() {
            Some(Err(e)) => e.status(),
            Some(Ok(_)) => match call.raw().delivered.first() {
                Some(Err(e)) => e.status(),
                other => panic!("expected rejection, got {other:?}"),
            },
            None => panic!("transport never started"),
        }
    }

    // =============================================================================
    // ACCEPTED FLOWS
    // =============================================================================

    #[test]
    fn test_json_payout_is_verified_and_delivered_unchanged() {
        let client = network_client(network_signer(), NOW);
        let mut call = client.intercept_call::<_, PayoutRequest, _>(
            LoopbackCall::new(provider(NOW + 250)),
            JsonMarshaller,
        );
        let request = PayoutRequest {
            payment_id: 42,
            amount: "100.50".into(),
            currency: "EUR",
        };

        let mut caller_headers = HeaderMap::new();
        caller_headers.insert("x-request-id", HeaderValue::from_static("req-1"));

        call.start((), caller_headers).unwrap();
        call.request(1);
        call.send_message(&request).unwrap();
        call.half_close().unwrap();

        let raw = call.raw();
        assert!(matches!(raw.pending, Some(Ok(_))));
        assert_eq!(
            raw.delivered,
            vec![Ok(Bytes::from(serde_json::to_vec(&request).unwrap()))]
        );
        assert_eq!(raw.credits, vec![1]);
        assert_eq!(raw.events, vec!["start", "request", "send", "half_close"]);

        let sent = raw.headers.as_ref().unwrap();
        assert_eq!(sent["x-request-id"], "req-1");
        assert_eq!(sent[TIMESTAMP_HEADER], NOW.to_string());
        assert_eq!(call.state(), CallState::Completed);
    }

    #[test]
    fn test_sequential_calls_share_one_interceptor() {
        let client = network_client(network_signer(), NOW);
        let server = provider(NOW);

        for i in 0..5u8 {
            let mut call = bytes_call(&client, server.clone());
            call.start((), HeaderMap::new()).unwrap();
            call.send_message(&Bytes::from(vec![i; 32])).unwrap();
            call.half_close().unwrap();
            assert_eq!(call.raw().delivered, vec![Ok(Bytes::from(vec![i; 32]))]);
        }
    }

    #[test]
    fn test_empty_unary_call_signs_empty_payload() {
        let client = network_client(network_signer(), NOW);
        let mut call = bytes_call(&client, provider(NOW));

        call.start((), HeaderMap::new()).unwrap();
        call.half_close().unwrap();

        let pending = match call.raw().pending.as_ref() {
            Some(Ok(pending)) => pending,
            other => panic!("header phase failed: {other:?}"),
        };
        assert_eq!(pending.verify_payload(b""), Ok(FramingHypothesis::Bare));
        assert_eq!(call.raw().events, vec!["start", "half_close"]);
    }

    #[test]
    fn test_large_message_is_verified() {
        let client = network_client(network_signer(), NOW);
        let mut call = bytes_call(&client, provider(NOW));
        let payload = Bytes::from(vec![0x5a; 512 * 1024]);

        call.start((), HeaderMap::new()).unwrap();
        call.send_message(&payload).unwrap();

        assert_eq!(call.raw().delivered, vec![Ok(payload)]);
    }

    #[test]
    fn test_length_prefixed_signature_is_accepted() {
        let signer = network_signer();
        let client = network_client(signer, NOW);
        let payload = b"{\"payment_id\":7}";

        let mut headers = HeaderMap::new();
        client
            .sign_at(&frame_payload(payload).unwrap(), NOW)
            .unwrap()
            .apply(&mut headers)
            .unwrap();

        let server = provider(NOW);
        assert_eq!(
            server.verify_request(&headers, payload),
            Ok(FramingHypothesis::LengthPrefixed)
        );
    }

    #[test]
    fn test_length_prefixed_signature_rejected_when_disabled() {
        let client = network_client(network_signer(), NOW);
        let payload = b"{\"payment_id\":7}";

        let mut headers = HeaderMap::new();
        client
            .sign_at(&frame_payload(payload).unwrap(), NOW)
            .unwrap()
            .apply(&mut headers)
            .unwrap();

        let config = VerifierConfig {
            accept_length_prefixed_framing: false,
            ..VerifierConfig::new(network_signer().public_key_hex_prefixed())
        };
        let server =
            SignatureVerificationInterceptor::with_clock(&config, Arc::new(FixedClock::new(NOW)))
                .unwrap();
        assert_eq!(
            server.verify_request(&headers, payload),
            Err(VerificationError::SignatureMismatch)
        );
    }

    // =============================================================================
    // FRESHNESS BOUNDARY
    // =============================================================================

    #[test]
    fn test_freshness_window_is_inclusive() {
        let client = network_client(network_signer(), NOW);

        for skew in [-(WINDOW_MS as i64), WINDOW_MS as i64] {
            let mut call = bytes_call(&client, provider(NOW + skew));
            call.start((), HeaderMap::new()).unwrap();
            call.send_message(&Bytes::from_static(b"ok")).unwrap();
            assert!(matches!(call.raw().pending, Some(Ok(_))), "skew {skew}");
        }
    }

    #[test]
    fn test_outside_freshness_window_is_invalid_argument() {
        let client = network_client(network_signer(), NOW);

        for skew in [-(WINDOW_MS as i64) - 1, WINDOW_MS as i64 + 1] {
            let mut call = bytes_call(&client, provider(NOW + skew));
            call.start((), HeaderMap::new()).unwrap();
            call.send_message(&Bytes::from_static(b"late")).unwrap();
            assert_eq!(rejection(&call), RejectionStatus::InvalidArgument);
        }
    }

    // =============================================================================
    // REJECTED FLOWS
    // =============================================================================

    #[test]
    fn test_wrong_signer_is_unauthenticated() {
        let client = network_client(Arc::new(Signer::generate().unwrap()), NOW);
        let mut call = bytes_call(&client, provider(NOW));

        call.start((), HeaderMap::new()).unwrap();
        call.send_message(&Bytes::from_static(b"payout")).unwrap();

        assert_eq!(rejection(&call), RejectionStatus::Unauthenticated);
        assert_eq!(
            call.raw().pending.as_ref().unwrap().as_ref().unwrap_err(),
            &VerificationError::UnknownPublicKey
        );
    }

    #[test]
    fn test_tampered_payload_is_unauthenticated() {
        let client = network_client(network_signer(), NOW);
        let server = provider(NOW);

        let mut headers = HeaderMap::new();
        client
            .sign_at(b"{\"amount\":\"1.00\"}", NOW)
            .unwrap()
            .apply(&mut headers)
            .unwrap();

        let err = server
            .verify_request(&headers, b"{\"amount\":\"9.00\"}")
            .unwrap_err();
        assert_eq!(err, VerificationError::SignatureMismatch);
        assert_eq!(err.status(), RejectionStatus::Unauthenticated);
    }

    #[test]
    fn test_tampered_timestamp_is_unauthenticated() {
        let client = network_client(network_signer(), NOW);
        let server = provider(NOW);

        let mut headers = HeaderMap::new();
        client.sign_at(b"body", NOW).unwrap().apply(&mut headers).unwrap();
        headers.insert(TIMESTAMP_HEADER, HeaderValue::from(NOW + 1));

        assert_eq!(
            server.verify_request(&headers, b"body"),
            Err(VerificationError::SignatureMismatch)
        );
    }

    #[test]
    fn test_decoded_message_is_internal() {
        let client = network_client(network_signer(), NOW);
        let server = provider(NOW);

        let mut headers = HeaderMap::new();
        client.sign_at(b"body", NOW).unwrap().apply(&mut headers).unwrap();

        let pending = server.authenticate_headers(&headers).unwrap();
        let err = pending
            .on_message(InboundMessage::Decoded("body".to_string()))
            .unwrap_err();
        assert_eq!(err.status(), RejectionStatus::Internal);
    }

    #[test]
    fn test_cancel_before_message_never_starts_transport() {
        let client = network_client(network_signer(), NOW);
        let mut call = bytes_call(&client, provider(NOW));

        call.start((), HeaderMap::new()).unwrap();
        call.request(3);
        call.cancel("caller gave up");

        assert!(call.raw().pending.is_none());
        assert!(call.raw().credits.is_empty());
        assert_eq!(call.raw().events, vec!["cancel"]);
        assert!(call.send_message(&Bytes::from_static(b"x")).is_err());
    }
}
