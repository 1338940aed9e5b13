//! # HTTP Layer Flows
//!
//! The full tower stack a provider deployment runs, driven in-process:
//!
//! ```text
//! SigningLayer -> CallLoggingLayer -> SignatureVerificationLayer -> axum Router
//! ```

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body, Bytes},
        http::{Request, StatusCode},
        routing::post,
        Router,
    };
    use tower::{ServiceBuilder, ServiceExt};

    use t0_crypto::Signer;
    use t0_request_signing::{
        CallLoggingLayer, FixedClock, ProviderServerConfig, SignatureVerificationInterceptor,
        SignatureVerificationLayer, SigningInterceptor, SigningLayer, VerifierConfig,
    };

    const NOW: i64 = 1_706_000_000_000;
    const PAYOUT_PATH: &str = "/tzero.v1.payment.ProviderService/PayOut";

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn provider_router() -> Router {
        Router::new().route(PAYOUT_PATH, post(|body: Bytes| async move { body }))
    }

    fn signing_layer(signer: Arc<Signer>) -> SigningLayer {
        SigningLayer::new(Arc::new(SigningInterceptor::with_clock(
            signer,
            Arc::new(FixedClock::new(NOW)),
        )))
    }

    fn verification_layer(expected: &Signer, max_body_size: usize) -> SignatureVerificationLayer {
        let config = VerifierConfig::new(expected.public_key_hex_prefixed());
        let interceptor =
            SignatureVerificationInterceptor::with_clock(&config, Arc::new(FixedClock::new(NOW)))
                .unwrap();
        SignatureVerificationLayer::new(Arc::new(interceptor), max_body_size, 8 * 1024)
    }

    fn payout(body: &'static str) -> Request<Body> {
        Request::post(PAYOUT_PATH)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    // =============================================================================
    // TESTS
    // =============================================================================

    #[tokio::test]
    async fn test_signed_request_reaches_handler() {
        let network = Arc::new(Signer::generate().unwrap());
        let stack = ServiceBuilder::new()
            .layer(signing_layer(network.clone()))
            .layer(CallLoggingLayer::new())
            .layer(verification_layer(&network, 4 * 1024 * 1024))
            .service(provider_router());

        let response = stack.oneshot(payout("{\"payment_id\":1}")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"{\"payment_id\":1}");
    }

    #[tokio::test]
    async fn test_unsigned_request_is_invalid_argument() {
        let network = Signer::generate().unwrap();
        let stack = ServiceBuilder::new()
            .layer(verification_layer(&network, 1024))
            .service(provider_router());

        let response = stack.oneshot(payout("{}")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "invalid_argument");
    }

    #[tokio::test]
    async fn test_unknown_signer_is_unauthenticated() {
        let network = Signer::generate().unwrap();
        let impostor = Arc::new(Signer::generate().unwrap());
        let stack = ServiceBuilder::new()
            .layer(signing_layer(impostor))
            .layer(verification_layer(&network, 1024))
            .service(provider_router());

        let response = stack.oneshot(payout("{}")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = json_body(response).await;
        assert_eq!(body["code"], "unauthenticated");
        assert_eq!(body["message"], "request signed with unknown public key");
    }

    #[tokio::test]
    async fn test_body_over_limit_is_internal() {
        let network = Arc::new(Signer::generate().unwrap());
        let stack = ServiceBuilder::new()
            .layer(signing_layer(network.clone()))
            .layer(verification_layer(&network, 8))
            .service(provider_router());

        let response = stack
            .oneshot(payout("{\"payment_id\":123456789}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await["code"], "internal");
    }

    #[tokio::test]
    async fn test_layer_from_provider_config() {
        let network = Arc::new(Signer::generate().unwrap());
        let config = ProviderServerConfig::new(8080, network.public_key_hex_prefixed())
            .with_service("tzero.v1.payment.ProviderService");

        let stack = ServiceBuilder::new()
            .layer(SigningLayer::new(Arc::new(SigningInterceptor::new(network))))
            .layer(SignatureVerificationLayer::from_config(&config).unwrap())
            .service(provider_router());

        let response = stack.oneshot(payout("{\"payment_id\":2}")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_layer_from_config_without_services_fails() {
        let network = Signer::generate().unwrap();
        let config = ProviderServerConfig::new(8080, network.public_key_hex_prefixed());
        assert!(SignatureVerificationLayer::from_config(&config).is_err());
    }
}
