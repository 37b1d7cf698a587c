use std::time::Instant;

use poem::error::{MethodNotAllowedError, NotFoundError};
use poem::http::header::CONTENT_LENGTH;
use poem::http::{HeaderValue, StatusCode};
use poem::{Endpoint, IntoResponse, Middleware, Request, Response, Result as PoemResult};
use poem_openapi::error::{
    ContentTypeError, ParseMultipartError, ParseParamError, ParseRequestPayloadError,
};
use serde_json::json;
use tokio::io::AsyncReadExt;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::error::error_response;

pub const REQUEST_ID_HEADER: &str = "X-Request-Id";
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-Id";

/// Path suffix of the upload endpoint, whose request errors use its own body.
const ANALYZE_PATH_SUFFIX: &str = "/ml/analyze";

/// Middleware to add request ID and correlation ID to requests
pub struct RequestTracingMiddleware;

impl<E: Endpoint> Middleware<E> for RequestTracingMiddleware {
    type Output = RequestTracingEndpoint<E>;

    fn transform(&self, ep: E) -> Self::Output {
        RequestTracingEndpoint { ep }
    }
}

pub struct RequestTracingEndpoint<E> {
    ep: E,
}

#[poem::async_trait]
impl<E: Endpoint> Endpoint for RequestTracingEndpoint<E> {
    type Output = Response;

    async fn call(&self, mut req: Request) -> PoemResult<Self::Output> {
        let request_id = Uuid::new_v4().to_string();
        let correlation_id = extract_correlation_id(&req)
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let request_id_value = HeaderValue::from_str(&request_id).ok();
        let correlation_id_value = HeaderValue::from_str(&correlation_id).ok();
        if let Some(ref value) = request_id_value {
            req.headers_mut().insert(REQUEST_ID_HEADER, value.clone());
        }
        if let Some(ref value) = correlation_id_value {
            req.headers_mut().insert(CORRELATION_ID_HEADER, value.clone());
        }

        let method = req.method().clone();
        let path = req.uri().path().to_string();
        let span = info_span!(
            "http_request",
            request_id = %request_id,
            correlation_id = %correlation_id,
            method = %method,
            path = %path,
        );

        async move {
            let started = Instant::now();
            let result = self.ep.call(req).await;
            let elapsed_ms = started.elapsed().as_millis() as u64;

            match result {
                Ok(output) => {
                    let mut resp = output.into_response();
                    if resp.status().is_server_error() {
                        warn!(status = %resp.status(), elapsed_ms, "Request failed");
                    } else {
                        info!(status = %resp.status(), elapsed_ms, "Request completed");
                    }
                    if let Some(value) = request_id_value {
                        resp.headers_mut().insert(REQUEST_ID_HEADER, value);
                    }
                    if let Some(value) = correlation_id_value {
                        resp.headers_mut().insert(CORRELATION_ID_HEADER, value);
                    }
                    Ok(resp)
                }
                Err(err) => {
                    if err.is::<NotFoundError>() {
                        info!(elapsed_ms, "No match for: {}", path);
                    } else if err.status().is_server_error() {
                        warn!(status = %err.status(), elapsed_ms, "Request error: {}", err);
                    } else {
                        info!(status = %err.status(), elapsed_ms, "Request rejected: {}", err);
                    }
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }
}

/// Caps request bodies at `max_bytes`. A declared `Content-Length` is checked
/// up front; bodies without one are read through a limit and rejected once
/// they grow past it.
pub struct BodyLimitMiddleware {
    max_bytes: usize,
}

impl BodyLimitMiddleware {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }
}

impl<E: Endpoint> Middleware<E> for BodyLimitMiddleware {
    type Output = BodyLimitEndpoint<E>;

    fn transform(&self, ep: E) -> Self::Output {
        BodyLimitEndpoint {
            ep,
            max_bytes: self.max_bytes,
        }
    }
}

pub struct BodyLimitEndpoint<E> {
    ep: E,
    max_bytes: usize,
}

impl<E> BodyLimitEndpoint<E> {
    fn too_large(&self, len: usize) -> Response {
        warn!("Rejected body of at least {} bytes, limit is {}", len, self.max_bytes);
        error_response(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large")
    }
}

#[poem::async_trait]
impl<E: Endpoint> Endpoint for BodyLimitEndpoint<E> {
    type Output = Response;

    async fn call(&self, mut req: Request) -> PoemResult<Self::Output> {
        let declared = req
            .header(CONTENT_LENGTH)
            .and_then(|len| len.trim().parse::<usize>().ok());

        match declared {
            Some(len) if len > self.max_bytes => return Ok(self.too_large(len)),
            Some(_) => {}
            None => {
                // One byte past the limit is enough to know it was exceeded.
                let mut reader = req
                    .take_body()
                    .into_async_read()
                    .take(self.max_bytes as u64 + 1);
                let mut buf = Vec::new();
                if let Err(e) = reader.read_to_end(&mut buf).await {
                    warn!("Failed to read request body: {}", e);
                    return Ok(error_response(
                        StatusCode::BAD_REQUEST,
                        "Failed to read request body",
                    ));
                }
                if buf.len() > self.max_bytes {
                    return Ok(self.too_large(buf.len()));
                }
                req.set_body(buf);
            }
        }

        self.ep.call(req).await.map(IntoResponse::into_response)
    }
}

/// Turns every remaining error into a response with a JSON body.
/// Unmatched routes become `page not found`. Request decoding failures keep
/// their status, except on the upload endpoint, where they report the
/// missing files.
pub struct ErrorRenderingMiddleware;

impl<E: Endpoint> Middleware<E> for ErrorRenderingMiddleware {
    type Output = ErrorRenderingEndpoint<E>;

    fn transform(&self, ep: E) -> Self::Output {
        ErrorRenderingEndpoint { ep }
    }
}

pub struct ErrorRenderingEndpoint<E> {
    ep: E,
}

fn is_request_decoding_error(err: &poem::Error) -> bool {
    err.is::<ParseRequestPayloadError>()
        || err.is::<ContentTypeError>()
        || err.is::<ParseMultipartError>()
        || err.is::<ParseParamError>()
}

pub fn render_error(path: &str, err: poem::Error) -> Response {
    if err.is::<NotFoundError>() {
        return error_response(StatusCode::NOT_FOUND, "page not found");
    }
    if is_request_decoding_error(&err) {
        if path.ends_with(ANALYZE_PATH_SUFFIX) {
            return Response::builder()
                .status(StatusCode::BAD_REQUEST)
                .content_type("application/json")
                .body(json!({ "error": "Missing uploaded files." }).to_string());
        }
        return error_response(err.status(), &err.to_string());
    }
    if err.is::<MethodNotAllowedError>() {
        return error_response(err.status(), "method not allowed");
    }
    err.into_response()
}

#[poem::async_trait]
impl<E: Endpoint> Endpoint for ErrorRenderingEndpoint<E> {
    type Output = Response;

    async fn call(&self, req: Request) -> PoemResult<Self::Output> {
        let path = req.uri().path().to_string();
        Ok(match self.ep.call(req).await {
            Ok(output) => output.into_response(),
            Err(err) => render_error(&path, err),
        })
    }
}

pub fn extract_correlation_id(req: &Request) -> Option<String> {
    req.header(CORRELATION_ID_HEADER).map(|s| s.to_string())
}
