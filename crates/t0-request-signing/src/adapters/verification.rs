//! Provider-side verification middleware.
//!
//! Rejections use the Connect error shape: the mapped HTTP status and a JSON
//! body `{"code": ..., "message": ...}`.

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, HeaderMap, HeaderValue, Request},
    response::Response,
};
use tower::{Layer, Service};
use tracing::{debug, warn};

use crate::domain::config::ProviderServerConfig;
use crate::domain::errors::{ConfigError, VerificationError};
use crate::ports::inbound::RequestAuthenticator;
use crate::server::{InboundMessage, SignatureVerificationInterceptor};

/// Verification layer
#[derive(Clone)]
pub struct SignatureVerificationLayer {
    authenticator: Arc<dyn RequestAuthenticator>,
    max_body_size: usize,
    max_metadata_size: usize,
}

impl SignatureVerificationLayer {
    /// Layer over any authenticator with explicit limits.
    pub fn new(
        authenticator: Arc<dyn RequestAuthenticator>,
        max_body_size: usize,
        max_metadata_size: usize,
    ) -> Self {
        Self {
            authenticator,
            max_body_size,
            max_metadata_size,
        }
    }

    /// Validate `config` and build a layer using the system clock.
    pub fn from_config(config: &ProviderServerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let interceptor = SignatureVerificationInterceptor::new(&config.verifier)?;
        Ok(Self::new(
            Arc::new(interceptor),
            config.max_inbound_message_size,
            config.max_inbound_metadata_size,
        ))
    }
}

impl<S> Layer<S> for SignatureVerificationLayer {
    type Service = SignatureVerificationService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SignatureVerificationService {
            inner,
            authenticator: Arc::clone(&self.authenticator),
            max_body_size: self.max_body_size,
            max_metadata_size: self.max_metadata_size,
        }
    }
}

/// Verification service
#[derive(Clone)]
pub struct SignatureVerificationService<S> {
    inner: S,
    authenticator: Arc<dyn RequestAuthenticator>,
    max_body_size: usize,
    max_metadata_size: usize,
}

impl<S> Service<Request<Body>> for SignatureVerificationService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let authenticator = Arc::clone(&self.authenticator);
        let max_body_size = self.max_body_size;
        let max_metadata_size = self.max_metadata_size;
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let (parts, body) = req.into_parts();

            let size = metadata_size(&parts.headers);
            if size > max_metadata_size {
                let error = VerificationError::MetadataTooLarge {
                    size,
                    limit: max_metadata_size,
                };
                warn!(path = %parts.uri.path(), error = %error, "Rejecting request");
                return Ok(rejection_response(&error));
            }

            let pending = match authenticator.authenticate_headers(&parts.headers) {
                Ok(pending) => pending,
                Err(error) => return Ok(rejection_response(&error)),
            };

            let bytes = match to_bytes(body, max_body_size).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    let error = VerificationError::BodyRead(e.to_string());
                    warn!(path = %parts.uri.path(), reason = %e, "Error reading request body");
                    return Ok(rejection_response(&error));
                }
            };

            let bytes = match pending.on_message::<()>(InboundMessage::Raw(bytes)) {
                Ok(bytes) => bytes,
                Err(error) => return Ok(rejection_response(&error)),
            };

            debug!(path = %parts.uri.path(), body_len = bytes.len(), "Request authenticated");
            inner.call(Request::from_parts(parts, Body::from(bytes))).await
        })
    }
}

/// Sum of header name and value lengths.
fn metadata_size(headers: &HeaderMap) -> usize {
    headers
        .iter()
        .map(|(name, value)| name.as_str().len() + value.len())
        .sum()
}

/// Connect-style error response for a rejection.
pub fn rejection_response(error: &VerificationError) -> Response {
    let status = error.status();
    let body = serde_json::json!({
        "code": status.code(),
        "message": error.to_string(),
    });

    let mut response = Response::new(Body::from(serde_json::to_vec(&body).unwrap_or_default()));
    *response.status_mut() = status.http_status();
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}
