//! Execution outcome to HTTP response mapping
//!
//! A failed execution answers 500 with only the failure line; the captured
//! output is dropped. Success answers 200 with the output.

use axum::http::StatusCode;

use crate::types::ExecutionOutcome;

/// Render an outcome as status code and plain-text body
pub fn encode(outcome: ExecutionOutcome) -> (StatusCode, Vec<u8>) {
    match outcome.failure {
        Some(failure) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            newline_terminated(failure.into_bytes()),
        ),
        None => (StatusCode::OK, newline_terminated(outcome.combined_output)),
    }
}

/// Append `\n` unless the text already ends with one
pub(crate) fn newline_terminated(mut body: Vec<u8>) -> Vec<u8> {
    if body.last() != Some(&b'\n') {
        body.push(b'\n');
    }
    body
}
