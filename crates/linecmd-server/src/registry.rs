//! Command registry: name → async handler.

use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;
use tokio::sync::RwLock;

/// Error returned by a failing command handler.
///
/// The dispatcher turns this into the `error` field of the response
/// envelope; an empty message is substituted with `"empty error"`.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct CommandError {
    message: String,
}

impl CommandError {
    /// Create a command error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result of a command handler invocation.
pub type CommandResult = Result<Value, CommandError>;

/// Handler function type for registered commands.
///
/// Handlers receive the command name they were invoked under and the
/// request's `data` payload.
pub type HandlerFn =
    Box<dyn Fn(String, Value) -> Pin<Box<dyn Future<Output = CommandResult> + Send>> + Send + Sync>;

/// Registry of named command handlers.
///
/// Commands may be registered while the server is already accepting
/// connections, so the table sits behind an async `RwLock`: registration
/// takes the write lock, dispatch takes the read lock. Lookup is by exact,
/// case-sensitive name.
pub struct CommandRegistry {
    pub(crate) handlers: RwLock<HashMap<String, HandlerFn>>,
}

impl CommandRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// Register a handler under a command name.
    ///
    /// Re-registering a name replaces the previous handler (last write
    /// wins). There is no removal operation.
    pub async fn register<F, Fut>(&self, name: &str, handler: F)
    where
        F: Fn(String, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CommandResult> + Send + 'static,
    {
        let boxed_handler: HandlerFn = Box::new(move |command, data| {
            Box::pin(handler(command, data))
        });
        self.handlers
            .write()
            .await
            .insert(name.to_string(), boxed_handler);
    }

    /// Whether a handler is registered under the given name.
    pub async fn contains(&self, name: &str) -> bool {
        self.handlers.read().await.contains_key(name)
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}
