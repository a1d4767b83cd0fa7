//! Scripted code reader.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use ticket_gate_core::scan::CameraFuture;
use ticket_gate_core::{Camera, CameraFeed, ScanError};

/// Camera replaying a fixed list of payloads on every acquisition.
///
/// Once the script is exhausted the feed either waits forever, like a real
/// camera pointed at nothing, or ends (see [`ScriptedCamera::ending`]).
/// Tracks how many feeds are currently held so tests can assert release.
///
/// Clones share counters.
#[derive(Clone, Debug, Default)]
pub struct ScriptedCamera {
    script: Vec<String>,
    ends: bool,
    failure: Option<ScanError>,
    held: Arc<AtomicUsize>,
    acquisitions: Arc<AtomicUsize>,
}

impl ScriptedCamera {
    /// A camera that decodes `payloads` in order, then waits.
    #[must_use]
    pub fn new<I, S>(payloads: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: payloads.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// A camera whose acquisition always fails with `error`.
    #[must_use]
    pub fn failing(error: ScanError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    /// End the feed once the script is exhausted instead of waiting.
    #[must_use]
    pub fn ending(mut self) -> Self {
        self.ends = true;
        self
    }

    /// Feeds acquired and not yet released.
    #[must_use]
    pub fn held(&self) -> usize {
        self.held.load(Ordering::SeqCst)
    }

    /// Successful acquisitions so far.
    #[must_use]
    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }
}

impl Camera for ScriptedCamera {
    fn acquire(&self) -> CameraFuture<'_, Result<Box<dyn CameraFeed>, ScanError>> {
        Box::pin(async move {
            if let Some(error) = &self.failure {
                return Err(error.clone());
            }

            self.acquisitions.fetch_add(1, Ordering::SeqCst);
            self.held.fetch_add(1, Ordering::SeqCst);

            let feed: Box<dyn CameraFeed> = Box::new(ScriptedFeed {
                payloads: self.script.iter().cloned().collect(),
                ends: self.ends,
                held: Arc::clone(&self.held),
                released: false,
            });
            Ok(feed)
        })
    }
}

struct ScriptedFeed {
    payloads: VecDeque<String>,
    ends: bool,
    held: Arc<AtomicUsize>,
    released: bool,
}

impl CameraFeed for ScriptedFeed {
    fn next_payload(&mut self) -> CameraFuture<'_, Option<String>> {
        let next = self.payloads.pop_front();
        let ends = self.ends;

        Box::pin(async move {
            match next {
                Some(payload) => Some(payload),
                None if ends => None,
                None => std::future::pending().await,
            }
        })
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.held.fetch_sub(1, Ordering::SeqCst);
        }
    }
}
