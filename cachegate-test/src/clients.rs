use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use cachegate_core::Clients;
use http::Uri;

/// [`Clients`] that remembers what the gateway asked of it.
#[derive(Debug, Default)]
pub struct RecordingClients {
    claims: AtomicUsize,
    opened: Mutex<Vec<Uri>>,
}

impl RecordingClients {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim_count(&self) -> usize {
        self.claims.load(Ordering::SeqCst)
    }

    /// Windows opened so far, in order.
    pub fn opened(&self) -> Vec<Uri> {
        self.opened.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clients for RecordingClients {
    async fn claim(&self) {
        self.claims.fetch_add(1, Ordering::SeqCst);
    }

    async fn open_window(&self, url: &Uri) {
        self.opened.lock().unwrap().push(url.clone());
    }
}
