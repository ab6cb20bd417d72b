//! HTTP handlers
//!
//! The execution handler runs decode, execute and encode in sequence and logs
//! the request exactly once with its result. Health and fallback are stubs.

use std::convert::Infallible;
use std::fmt;
use std::net::SocketAddr;

use axum::{
    async_trait,
    body::Bytes,
    extract::{rejection::BytesRejection, ConnectInfo, FromRequestParts},
    http::{header, request::Parts, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};

use crate::decoder::decode;
use crate::encoder::{encode, newline_terminated};
use crate::executor::{execute, failure_message};
use crate::types::{DecodeFailure, ExecutionOutcome};

// ============================================================================
// Helper Types
// ============================================================================

/// Who asked for what, for the access log
#[derive(Debug, Clone)]
pub struct RequestLine {
    pub remote: Option<SocketAddr>,
    pub method: Method,
    pub uri: Uri,
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for RequestLine {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self {
            remote: parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| *addr),
            method: parts.method.clone(),
            uri: parts.uri.clone(),
        })
    }
}

impl fmt::Display for RequestLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.remote {
            Some(addr) => write!(f, "{} {} {}", addr, self.method, self.uri),
            None => write!(f, "- {} {}", self.method, self.uri),
        }
    }
}

fn plain_text(status: StatusCode, body: impl Into<Vec<u8>>) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        newline_terminated(body.into()),
    )
        .into_response()
}

// ============================================================================
// Handler Functions
// ============================================================================

/// Execute the command carried in the request body
pub async fn exec(request: RequestLine, body: Result<Bytes, BytesRejection>) -> Response {
    let descriptor = match body
        .map_err(|e| DecodeFailure::Read(e.body_text()))
        .and_then(|body| {
            tracing::debug!("{} - request: {}", request, String::from_utf8_lossy(&body));
            decode(&body)
        }) {
        Ok(descriptor) => descriptor,
        Err(e) => {
            tracing::warn!("{} - 400 {}", request, e);
            return plain_text(StatusCode::BAD_REQUEST, e.to_string());
        }
    };

    tracing::debug!("{} - running {:?}", request, descriptor.as_slice());

    // One blocking worker per request, held until the child exits
    let outcome = tokio::task::spawn_blocking(move || execute(descriptor))
        .await
        .unwrap_or_else(|e| ExecutionOutcome {
            failure: Some(failure_message(None, format!("worker: {}", e))),
            ..Default::default()
        });

    let exit_code = outcome.exit_code;
    match &outcome.failure {
        Some(failure) => tracing::warn!(
            exit_code = ?exit_code,
            "{} - 500 {} output: {}",
            request,
            failure,
            String::from_utf8_lossy(&outcome.combined_output)
        ),
        None => tracing::info!(
            exit_code = ?exit_code,
            "{} - 200 output: {}",
            request,
            String::from_utf8_lossy(&outcome.combined_output)
        ),
    }

    let (status, body) = encode(outcome);
    plain_text(status, body)
}

pub async fn health(request: RequestLine) -> Response {
    tracing::info!("{} - 200 health ok", request);
    plain_text(StatusCode::OK, "health ok")
}

/// Fallback for `/` and every unregistered path
pub async fn not_found(request: RequestLine) -> Response {
    tracing::info!("{} - 404 not found", request);
    plain_text(StatusCode::NOT_FOUND, "not found")
}
