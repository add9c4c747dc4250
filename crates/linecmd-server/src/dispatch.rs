//! Request dispatch: registry lookup and response normalization.

use crate::registry::CommandRegistry;
use wire_protocol_types::{error_messages, Request, Response};

/// Resolve a request's command and run its handler, normalizing the outcome
/// into a response envelope.
///
/// The handler is awaited to completion before a response is produced, so a
/// connection never has more than one invocation in flight. The read guard
/// on the handler table is held across the invocation.
pub async fn dispatch(registry: &CommandRegistry, request: Request) -> Response {
    let handlers = registry.handlers.read().await;
    let Some(handler) = handlers.get(&request.command) else {
        return Response::failure(&format!("Not found command({}) in list", request.command));
    };

    match handler(request.command.clone(), request.data).await {
        Ok(value) => Response::success(value),
        Err(error) => {
            let message = error.to_string();
            if message.is_empty() {
                Response::failure(error_messages::EMPTY_ERROR)
            } else {
                Response::failure(&message)
            }
        }
    }
}
