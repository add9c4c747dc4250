//! TCP command server for the linecmd daemon.
//!
//! This crate provides:
//! - Newline-delimited JSON framing over TCP
//! - A command registry with async handlers
//! - Per-connection handler tasks with graceful shutdown

mod commands;
mod connection;
mod dispatch;
mod error;
mod registry;
mod server;

pub use commands::{register_builtins, sum2};
pub use dispatch::dispatch;
pub use error::{ServerError, ServerResult};
pub use registry::{CommandError, CommandRegistry, CommandResult, HandlerFn};
pub use server::{Client, Server, DEFAULT_BIND_ADDR};
pub use wire_protocol_types::{error_messages, is_valid_envelope, Request, Response};
