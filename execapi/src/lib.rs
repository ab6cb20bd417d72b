//! execapi library
//!
//! A thin HTTP shim that runs a posted command line as a local process and
//! returns its combined stdout/stderr.
//!
//! Request body:
//!
//! ```yaml
//! cmd:
//!   - echo
//!   - hello
//! ```
//!
//! Responses are plain text: 200 with the output, 400 when the body cannot be
//! decoded, 500 with a single error line when the command fails.
//!
//! There is no authentication, allow-listing, timeout or concurrency limit.
//! Anyone who can reach the listener can run anything the service user can.
//!
//! # Usage as Library
//!
//! ```rust,ignore
//! use execapi::{decode, encode, execute};
//!
//! let descriptor = decode(b"cmd: [echo, hello]")?;
//! let (status, body) = encode(execute(descriptor));
//! ```

pub mod config;
pub mod decoder;
pub mod encoder;
pub mod executor;
pub mod handlers;
pub mod init;
pub mod server;
pub mod types;

pub use config::Config;
pub use decoder::decode;
pub use encoder::encode;
pub use executor::execute;
pub use types::{CommandDescriptor, ConfigError, DecodeFailure, ExecutionOutcome};
