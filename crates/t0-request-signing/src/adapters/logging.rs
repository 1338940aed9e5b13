//! Call logging middleware.
//!
//! Wraps each outgoing call in an `info_span!` and records its outcome and
//! duration.

use std::task::{Context, Poll};
use std::time::Instant;

use axum::http::{Request, Response};
use tower::{Layer, Service};
use tracing::{debug, info_span, warn, Instrument};

/// Logging layer
#[derive(Clone, Default)]
pub struct CallLoggingLayer;

impl CallLoggingLayer {
    /// Create new layer.
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for CallLoggingLayer {
    type Service = CallLoggingService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CallLoggingService { inner }
    }
}

/// Logging service
#[derive(Clone)]
pub struct CallLoggingService<S> {
    inner: S,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for CallLoggingService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send,
    S::Error: std::fmt::Display,
    ReqBody: Send + 'static,
{
    type Response = Response<ResBody>;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let mut inner = self.inner.clone();
        let span = info_span!(
            "t0_call",
            http.method = %req.method(),
            rpc.path = %req.uri().path(),
        );

        Box::pin(
            async move {
                let started = Instant::now();
                debug!(headers = ?req.headers().keys().collect::<Vec<_>>(), "Starting call");

                let result = inner.call(req).await;
                let duration_ms = started.elapsed().as_millis() as u64;

                match &result {
                    Ok(response) if response.status().is_success() => {
                        debug!(status = response.status().as_u16(), duration_ms, "Call completed");
                    }
                    Ok(response) => {
                        warn!(status = response.status().as_u16(), duration_ms, "Call failed");
                    }
                    Err(e) => {
                        warn!(error = %e, duration_ms, "Call failed");
                    }
                }

                result
            }
            .instrument(span),
        )
    }
}
