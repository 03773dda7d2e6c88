//! Request-scoped attributes carried alongside a task instead of being
//! threaded through every call.
//!
//! A scope holds its parent's attributes followed by its own. Loggers and
//! the tracing layer merge [`current`] into each record they emit.

use std::future::Future;
use std::sync::Arc;

use crate::attr::Attr;

tokio::task_local! {
    static SCOPE_ATTRS: Arc<[Attr]>;
}

fn extended(attrs: impl IntoIterator<Item = Attr>) -> Arc<[Attr]> {
    let mut all = current();
    all.extend(attrs);
    Arc::from(all)
}

/// Run `future` with `attrs` added to the enclosing scope's attributes.
pub async fn scope<F: Future>(attrs: impl IntoIterator<Item = Attr>, future: F) -> F::Output {
    SCOPE_ATTRS.scope(extended(attrs), future).await
}

/// Run `f` with `attrs` added to the enclosing scope's attributes.
pub fn sync_scope<R>(attrs: impl IntoIterator<Item = Attr>, f: impl FnOnce() -> R) -> R {
    SCOPE_ATTRS.sync_scope(extended(attrs), f)
}

/// Attributes of the innermost scope; empty outside any scope.
pub fn current() -> Vec<Attr> {
    SCOPE_ATTRS
        .try_with(|attrs| attrs.to_vec())
        .unwrap_or_default()
}
