//! Client-side signing middleware.
//!
//! Buffers the outgoing body once, signs those exact bytes and forwards the
//! same buffer, so what is sent is byte-for-byte what was signed.

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::{to_bytes, Body},
    http::Request,
};
use tower::{BoxError, Layer, Service};
use tracing::warn;

use crate::domain::errors::SigningError;
use crate::ports::inbound::RequestSigner;

/// Signing layer
#[derive(Clone)]
pub struct SigningLayer {
    signer: Arc<dyn RequestSigner>,
}

impl SigningLayer {
    /// Sign every request with `signer`.
    pub fn new(signer: Arc<dyn RequestSigner>) -> Self {
        Self { signer }
    }
}

impl<S> Layer<S> for SigningLayer {
    type Service = SigningService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SigningService {
            inner,
            signer: Arc::clone(&self.signer),
        }
    }
}

/// Signing service
#[derive(Clone)]
pub struct SigningService<S> {
    inner: S,
    signer: Arc<dyn RequestSigner>,
}

impl<S> Service<Request<Body>> for SigningService<S>
where
    S: Service<Request<Body>> + Clone + Send + 'static,
    S::Future: Send,
    S::Error: Into<BoxError>,
{
    type Response = S::Response;
    type Error = BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let signer = Arc::clone(&self.signer);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let (mut parts, body) = req.into_parts();

            let payload = to_bytes(body, usize::MAX).await.map_err(|e| {
                warn!(path = %parts.uri.path(), error = %e, "Error reading outgoing body");
                SigningError::BodyRead(e.to_string())
            })?;

            signer.sign_request(&payload)?.apply(&mut parts.headers)?;

            inner
                .call(Request::from_parts(parts, Body::from(payload)))
                .await
                .map_err(Into::into)
        })
    }
}
