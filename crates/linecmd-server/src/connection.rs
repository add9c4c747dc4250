//! Per-connection handler loop.

use crate::dispatch::dispatch;
use crate::error::ServerResult;
use crate::registry::CommandRegistry;
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, warn};
use wire_protocol_types::{error_messages, Request, Response};

/// Handle a single client connection.
///
/// Reads one newline-terminated request at a time, writes exactly one
/// response line per non-empty request, and flushes before reading again so
/// a backpressured peer blocks only its own handler. Returns `Ok` on clean
/// disconnect; transport errors propagate to the caller.
pub(crate) async fn handle_connection(
    stream: TcpStream,
    registry: Arc<CommandRegistry>,
) -> ServerResult<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    debug!("Client connected");

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;

        if bytes_read == 0 {
            debug!("Client disconnected");
            break;
        }

        if !line.ends_with('\n') {
            // EOF mid-line: discard the partial request, never echo it.
            debug!("Client disconnected mid-line");
            break;
        }

        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            // No response for blank lines, but the flow-control point stays.
            writer.flush().await?;
            continue;
        }

        debug!(request = %trimmed, "Received request");

        let response = process_line(&registry, trimmed).await;
        let response_json = response.to_json()?;
        debug!(response = %response_json, "Sending response");

        writer.write_all(response_json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }

    Ok(())
}

/// Decode, validate, and dispatch one request line.
///
/// Protocol-level failures (bad JSON, bad envelope shape, unknown command,
/// handler errors) all come back as error responses; only transport errors
/// are fatal to the connection, and those never reach this function.
pub(crate) async fn process_line(registry: &CommandRegistry, line: &str) -> Response {
    let value: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(error) => {
            warn!(error = %error, "Failed to parse request");
            return Response::failure(&error.to_string());
        }
    };

    match Request::from_envelope(value) {
        Some(request) => dispatch(registry, request).await,
        None => {
            warn!("Invalid request envelope");
            Response::failure(error_messages::INVALID_ENVELOPE)
        }
    }
}
