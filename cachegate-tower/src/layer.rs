use std::sync::Arc;

use cachegate::Gateway;
use tower::Layer;

use crate::service::GatewayService;

/// Tower [`Layer`] that routes requests through a shared [`Gateway`].
pub struct GatewayLayer<St, F, C> {
    gateway: Arc<Gateway<St, F, C>>,
}

impl<St, F, C> GatewayLayer<St, F, C> {
    /// Creates a layer around `gateway`.
    pub fn new(gateway: Arc<Gateway<St, F, C>>) -> Self {
        Self { gateway }
    }
}

impl<St, F, C> Clone for GatewayLayer<St, F, C> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
        }
    }
}

impl<S, St, F, C> Layer<S> for GatewayLayer<St, F, C> {
    type Service = GatewayService<S, St, F, C>;

    fn layer(&self, inner: S) -> Self::Service {
        GatewayService::new(inner, Arc::clone(&self.gateway))
    }
}
