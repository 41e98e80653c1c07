//! One-shot handoff of captured request headers from the browser's
//! interception callback to the login flow.
//!
//! The callback runs on the driver's event loop and may fire several times
//! for the same kind of request. The first header set carrying an
//! authorization value wins; later offers are dropped without blocking.

use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;

/// Headers of an intercepted request, names as the browser reported them.
pub type CapturedHeaders = HashMap<String, String>;

/// Receiving side of the capture slot, owned by the login flow.
pub(crate) struct HeaderCapture {
    tx: mpsc::Sender<CapturedHeaders>,
    rx: mpsc::Receiver<CapturedHeaders>,
}

/// Sending side, handed to the interception callback.
#[derive(Clone)]
pub(crate) struct CaptureHandle {
    tx: mpsc::Sender<CapturedHeaders>,
}

impl HeaderCapture {
    pub(crate) fn new() -> Self {
        let (tx, rx) = mpsc::channel(1);
        Self { tx, rx }
    }

    pub(crate) fn handle(&self) -> CaptureHandle {
        CaptureHandle {
            tx: self.tx.clone(),
        }
    }

    /// Wait up to `timeout` of wall-clock time for the first delivery.
    pub(crate) async fn wait(&mut self, timeout: Duration) -> Option<CapturedHeaders> {
        tokio::time::timeout(timeout, self.rx.recv())
            .await
            .ok()
            .flatten()
    }
}

impl CaptureHandle {
    /// Offer a header set. Returns `true` if it was taken.
    ///
    /// Sets without a non-empty authorization header are ignored, as is
    /// everything offered once the slot holds a value.
    pub(crate) fn offer(&self, headers: &CapturedHeaders) -> bool {
        let authorized = headers
            .iter()
            .any(|(k, v)| k.eq_ignore_ascii_case("authorization") && !v.is_empty());
        authorized && self.tx.try_send(headers.clone()).is_ok()
    }
}
