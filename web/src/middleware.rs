//! Correlation ID middleware.
//!
//! A request keeps the UUID it sent in `X-Correlation-ID`; anything else
//! (missing or not a UUID) gets a fresh v4. The ID is put in the request
//! extensions for the [`CorrelationId`] extractor, carried by the
//! `http_request` span and returned in the same response header.

use crate::extractors::CorrelationId;
use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    response::Response,
};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::Instrument;
use uuid::Uuid;

/// Request and response header carrying the correlation ID.
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-ID";

/// Layer to put outermost on the router.
#[must_use]
pub const fn correlation_id_layer() -> CorrelationIdLayer {
    CorrelationIdLayer
}

/// See [`correlation_id_layer`].
#[derive(Clone, Copy, Debug, Default)]
pub struct CorrelationIdLayer;

impl<S> Layer<S> for CorrelationIdLayer {
    type Service = CorrelationIdMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CorrelationIdMiddleware { inner }
    }
}

/// Service produced by [`CorrelationIdLayer`].
#[derive(Clone, Debug)]
pub struct CorrelationIdMiddleware<S> {
    inner: S,
}

pub(crate) fn correlation_id_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    let raw = headers.get(CORRELATION_ID_HEADER)?.to_str().ok()?;
    Uuid::parse_str(raw).ok()
}

fn assign(req: &mut Request) -> CorrelationId {
    let id = CorrelationId(correlation_id_from_headers(req.headers()).unwrap_or_else(Uuid::new_v4));
    req.extensions_mut().insert(id);
    id
}

fn echo(response: &mut Response, id: CorrelationId) {
    // A hyphenated UUID is always a valid header value
    if let Ok(value) = HeaderValue::from_str(&id.to_string()) {
        response.headers_mut().insert(CORRELATION_ID_HEADER, value);
    }
}

type ResponseFuture<E> = Pin<Box<dyn Future<Output = Result<Response, E>> + Send>>;

impl<S> Service<Request> for CorrelationIdMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = ResponseFuture<S::Error>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request) -> Self::Future {
        let id = assign(&mut req);
        let span = tracing::info_span!(
            "http_request",
            correlation_id = %id,
            method = %req.method(),
            uri = %req.uri(),
        );
        let inner = self.inner.call(req).instrument(span);

        Box::pin(async move {
            let mut response = inner.await?;
            echo(&mut response, id);
            Ok(response)
        })
    }
}
