//! calgate command-line interface.
//!
//! Runs the gateway in-process: the CLI plays the transport, passing the
//! `Authorization` header and tool arguments straight to the request handler.

pub mod cli;
pub mod commands;
pub mod error;

pub use cli::Cli;
pub use error::{ClientError, ClientResult};
