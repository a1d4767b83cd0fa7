//! Line-emitting code readers.
//!
//! Hand-held QR readers typically present themselves as a serial tty (or a
//! keyboard wedge redirected into a FIFO) and emit one decoded code per
//! line. [`DeviceCamera`] opens such a path as a [`Camera`].

use std::io;
use std::path::{Path, PathBuf};
use ticket_gate_core::scan::CameraFuture;
use ticket_gate_core::{Camera, CameraFeed, ScanError};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};

/// A code reader at a filesystem path.
#[derive(Debug, Clone)]
pub struct DeviceCamera {
    path: PathBuf,
}

impl DeviceCamera {
    /// Reader at `path`. Nothing is opened until [`Camera::acquire`].
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the device.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn open_error(path: &Path, err: &io::Error) -> ScanError {
    tracing::warn!(path = %path.display(), error = %err, "Failed to open code reader");

    match err.kind() {
        io::ErrorKind::NotFound => ScanError::NoCamera,
        io::ErrorKind::PermissionDenied => ScanError::PermissionDenied,
        _ => ScanError::Device(err.to_string()),
    }
}

impl Camera for DeviceCamera {
    fn acquire(&self) -> CameraFuture<'_, Result<Box<dyn CameraFeed>, ScanError>> {
        Box::pin(async move {
            let file = File::open(&self.path)
                .await
                .map_err(|e| open_error(&self.path, &e))?;

            tracing::debug!(path = %self.path.display(), "Code reader acquired");
            let feed: Box<dyn CameraFeed> = Box::new(DeviceFeed {
                path: self.path.clone(),
                lines: Some(BufReader::new(file).lines()),
            });
            Ok(feed)
        })
    }
}

struct DeviceFeed {
    path: PathBuf,
    lines: Option<Lines<BufReader<File>>>,
}

impl CameraFeed for DeviceFeed {
    fn next_payload(&mut self) -> CameraFuture<'_, Option<String>> {
        Box::pin(async move {
            let lines = self.lines.as_mut()?;
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) if line.trim().is_empty() => {}
                    Ok(Some(line)) => return Some(line),
                    Ok(None) => return None,
                    Err(e) => {
                        tracing::warn!(path = %self.path.display(), error = %e, "Code reader failed");
                        return None;
                    }
                }
            }
        })
    }

    fn release(&mut self) {
        if self.lines.take().is_some() {
            tracing::debug!(path = %self.path.display(), "Code reader released");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn device_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("ticket-gate-{}-{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[tokio::test]
    async fn test_reads_one_code_per_line_skipping_blanks() {
        let path = device_file("lines", "12345-0xabc-1\n\n  \n12346-0xabc-1\n");
        let camera = DeviceCamera::new(&path);

        let mut feed = camera.acquire().await.unwrap();
        assert_eq!(feed.next_payload().await.as_deref(), Some("12345-0xabc-1"));
        assert_eq!(feed.next_payload().await.as_deref(), Some("12346-0xabc-1"));
        assert_eq!(feed.next_payload().await, None);

        std::fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn test_released_feed_ends() {
        let path = device_file("released", "12345-0xabc-1\n");
        let camera = DeviceCamera::new(&path);

        let mut feed = camera.acquire().await.unwrap();
        feed.release();
        feed.release();
        assert_eq!(feed.next_payload().await, None);

        std::fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn test_missing_device_is_no_camera() {
        let camera = DeviceCamera::new("/nonexistent/ticket-gate/reader");

        let err = camera.acquire().await.err().unwrap();
        assert_eq!(err, ScanError::NoCamera);
        assert!(err.is_resource_unavailable());
    }
}
