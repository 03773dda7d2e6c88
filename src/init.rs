use std::io::Write;

use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::Registry;

use crate::config::HandlerOptions;
use crate::error::InitError;
use crate::handler::Handler;
use crate::layer::PrettyLayer;

/// Subscriber combining a [`Registry`] with a [`PrettyLayer`] over
/// `handler`, without installing it.
///
/// Useful with `tracing::subscriber::with_default` in tests.
pub fn subscriber(handler: Handler) -> Layered<PrettyLayer, Registry> {
    Registry::default().with(PrettyLayer::new(handler))
}

/// Install a global `tracing` subscriber printing through `handler`.
///
/// **Returns**
/// - `Err(InitError::AlreadySet)` if a global subscriber was installed
///   earlier in the process.
pub fn init_tracing_with_handler(handler: Handler) -> Result<(), InitError> {
    tracing::subscriber::set_global_default(subscriber(handler))?;
    Ok(())
}

/// Install a global subscriber writing to `writer`.
///
/// Colors are off unless `options.force_color` is set.
pub fn init_tracing_with_writer<W>(writer: W, options: HandlerOptions) -> Result<(), InitError>
where
    W: Write + Send + 'static,
{
    init_tracing_with_handler(Handler::new(writer, options))
}

/// Install a global subscriber writing to stderr with the given options.
pub fn init_tracing(options: HandlerOptions) -> Result<(), InitError> {
    init_tracing_with_handler(Handler::stderr(options))
}

/// Install a global subscriber writing to stderr, configured from the
/// environment (see [`HandlerOptions::from_env`]).
///
/// This is the recommended entrypoint for binaries.
pub fn init_from_env() -> Result<(), InitError> {
    init_tracing(HandlerOptions::from_env()?)
}
