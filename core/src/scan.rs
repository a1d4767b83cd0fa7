//! Scan sessions.
//!
//! A [`ScanSession`] wraps an acquired code reader (a camera decoding QR
//! frames, or a hand-held reader emitting one code per line) and forwards
//! every decoded payload to a sink from a background task.
//!
//! Release is scoped: the feed is wrapped in a guard that releases it when
//! the forwarding task ends, whatever ended it (stop, feed exhausted, sink
//! closed, session dropped, task aborted).
//!
//! [`Scanner`] is the owner-side handle: it holds at most one session and
//! tears the previous one down before starting another.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Boxed future returned by camera operations.
pub type CameraFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Errors from acquiring or running a code reader.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// The user or platform refused access to the device.
    #[error("Camera permission denied")]
    PermissionDenied,

    /// No usable device is present.
    #[error("No camera available")]
    NoCamera,

    /// The device failed to start.
    #[error("Camera failure: {0}")]
    Device(String),

    /// The session ended before any code was read.
    #[error("Scan ended before a code was read")]
    Ended,
}

impl ScanError {
    /// Whether the reader could not be acquired. Callers should offer
    /// manual entry instead.
    #[must_use]
    pub const fn is_resource_unavailable(&self) -> bool {
        matches!(self, Self::PermissionDenied | Self::NoCamera | Self::Device(_))
    }

    /// Message shown to the gate operator.
    #[must_use]
    pub const fn operator_message(&self) -> &'static str {
        match self {
            Self::PermissionDenied | Self::NoCamera | Self::Device(_) => {
                "Failed to start camera. Please check permissions or try manual input."
            }
            Self::Ended => "Scanning stopped before a code was read. Scan again or enter the token ID manually.",
        }
    }
}

/// A code reading device.
pub trait Camera: Send + Sync {
    /// Acquire the device and start decoding.
    ///
    /// # Errors
    ///
    /// Returns a resource-unavailable [`ScanError`] when the device cannot be
    /// opened.
    fn acquire(&self) -> CameraFuture<'_, Result<Box<dyn CameraFeed>, ScanError>>;
}

/// An acquired device producing decoded payloads.
pub trait CameraFeed: Send {
    /// Wait for the next decoded payload. `None` once the feed has ended.
    fn next_payload(&mut self) -> CameraFuture<'_, Option<String>>;

    /// Release the device. Must be idempotent.
    fn release(&mut self);
}

/// Releases the wrapped feed when dropped.
struct FeedGuard(Box<dyn CameraFeed>);

impl Drop for FeedGuard {
    fn drop(&mut self) {
        self.0.release();
    }
}

/// An active scanning session.
///
/// Exists only while scanning. [`ScanSession::stop`] releases the device
/// deterministically; dropping the session signals the task to stop and the
/// device is released as soon as the task observes it.
#[derive(Debug)]
pub struct ScanSession {
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl ScanSession {
    /// Acquire `camera` and start forwarding payloads into `sink`.
    ///
    /// # Errors
    ///
    /// Returns the camera's acquisition error; nothing is held in that case.
    pub async fn start(camera: &dyn Camera, sink: mpsc::Sender<String>) -> Result<Self, ScanError> {
        let feed = match camera.acquire().await {
            Ok(feed) => FeedGuard(feed),
            Err(err) => {
                tracing::warn!(error = %err, "Failed to acquire camera");
                return Err(err);
            }
        };

        let (shutdown, stopped) = watch::channel(false);
        let task = tokio::spawn(forward(feed, sink, stopped));
        tracing::debug!("Scan session started");

        Ok(Self {
            shutdown,
            task: Some(task),
        })
    }

    /// Whether the session is still forwarding payloads.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop scanning and wait until the device is released.
    pub async fn stop(mut self) {
        // The task may already be gone (feed ended), in which case nobody listens.
        let _ = self.shutdown.send(true);

        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                tracing::warn!(error = %err, "Scan task ended abnormally");
            }
        }
        tracing::debug!("Scan session stopped");
    }
}

impl Drop for ScanSession {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

async fn forward(mut feed: FeedGuard, sink: mpsc::Sender<String>, mut stopped: watch::Receiver<bool>) {
    loop {
        tokio::select! {
            biased;

            _ = stopped.changed() => break,

            payload = feed.0.next_payload() => {
                let Some(payload) = payload else {
                    tracing::debug!("Camera feed ended");
                    break;
                };

                tracing::trace!(payload = %payload, "Decoded payload");
                tokio::select! {
                    biased;

                    _ = stopped.changed() => break,

                    sent = sink.send(payload) => {
                        if sent.is_err() {
                            tracing::debug!("Scan sink closed");
                            break;
                        }
                    }
                }
            }
        }
    }

    drop(feed);
}

/// Owner of at most one scan session.
///
/// Belongs to the view (or device loop) that scans; never shared across
/// owners. Dropping the scanner drops its session.
pub struct Scanner {
    camera: Arc<dyn Camera>,
    session: Option<ScanSession>,
}

impl Scanner {
    /// Create a scanner over `camera`. Nothing is acquired yet.
    #[must_use]
    pub fn new(camera: Arc<dyn Camera>) -> Self {
        Self {
            camera,
            session: None,
        }
    }

    /// Whether a session is active.
    #[must_use]
    pub fn is_scanning(&self) -> bool {
        self.session.as_ref().is_some_and(ScanSession::is_active)
    }

    /// Start scanning into `sink`, stopping any previous session first.
    ///
    /// # Errors
    ///
    /// Returns the camera's acquisition error.
    pub async fn start(&mut self, sink: mpsc::Sender<String>) -> Result<(), ScanError> {
        self.stop().await;
        self.session = Some(ScanSession::start(self.camera.as_ref(), sink).await?);
        Ok(())
    }

    /// Stop the active session. A no-op when not scanning.
    pub async fn stop(&mut self) {
        if let Some(session) = self.session.take() {
            session.stop().await;
        }
    }

    /// Scan a single code: start, wait for the first payload, stop.
    ///
    /// # Errors
    ///
    /// - acquisition errors from the camera
    /// - [`ScanError::Ended`] if the feed ends without a payload
    pub async fn scan_once(&mut self) -> Result<String, ScanError> {
        let (sink, mut payloads) = mpsc::channel(1);
        self.start(sink).await?;

        let payload = payloads.recv().await;
        self.stop().await;

        payload.ok_or(ScanError::Ended)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquisition_failures_are_resource_unavailable() {
        assert!(ScanError::PermissionDenied.is_resource_unavailable());
        assert!(ScanError::NoCamera.is_resource_unavailable());
        assert!(ScanError::Device("busy".into()).is_resource_unavailable());
        assert!(!ScanError::Ended.is_resource_unavailable());
    }

    #[test]
    fn test_acquisition_failures_suggest_manual_input() {
        assert!(ScanError::NoCamera.operator_message().contains("manual input"));
    }
}
