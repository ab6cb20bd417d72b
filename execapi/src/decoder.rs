//! Request body decoding
//!
//! The body is a YAML document with a `cmd` list. JSON is a subset of YAML,
//! so `{"cmd": ["echo", "hi"]}` decodes the same way.

use serde::Deserialize;

use crate::types::{CommandDescriptor, DecodeFailure};

#[derive(Debug, Deserialize)]
struct RequestBody {
    #[serde(default)]
    cmd: Vec<String>,
}

/// Decode a complete request body into a command descriptor
pub fn decode(body: &[u8]) -> Result<CommandDescriptor, DecodeFailure> {
    // An empty YAML stream is a null document, treat it as "no command"
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(DecodeFailure::MissingCommand);
    }

    let request: RequestBody =
        serde_yaml::from_slice(body).map_err(|e| DecodeFailure::Parse(e.to_string()))?;

    CommandDescriptor::new(request.cmd)
}
