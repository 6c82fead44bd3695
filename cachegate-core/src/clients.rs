//! Page-side effects of the gateway lifecycle.

use async_trait::async_trait;
use http::Uri;

/// The pages controlled by a gateway.
///
/// Activation claims every open page; a notification click may open a new
/// one. Hosts that have no notion of pages use [`NoopClients`].
#[async_trait]
pub trait Clients: Send + Sync {
    /// Takes control of all open pages.
    async fn claim(&self);

    /// Opens (or focuses) a page at `url`.
    async fn open_window(&self, url: &Uri);
}

/// [`Clients`] that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopClients;

#[async_trait]
impl Clients for NoopClients {
    async fn claim(&self) {}

    async fn open_window(&self, _url: &Uri) {}
}

#[async_trait]
impl<T> Clients for std::sync::Arc<T>
where
    T: Clients + ?Sized,
{
    async fn claim(&self) {
        (**self).claim().await
    }

    async fn open_window(&self, url: &Uri) {
        (**self).open_window(url).await
    }
}
