//! Progress notifications.
//!
//! The fetcher never draws anything itself. It reports to a
//! [`ProgressObserver`] after every chunk it writes to disk, and the observer
//! decides what to do with it: draw a bar, record the values, or nothing.

/// Snapshot of one archive transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress<'a> {
    /// Archive identifier.
    pub identifier: &'a str,
    /// Bytes present in the local file, including resumed ones.
    pub transferred: u64,
    /// Remote archive length.
    pub total: u64,
}

impl Progress<'_> {
    /// Fraction of the archive on disk, between 0 and 1.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.transferred as f64 / self.total as f64
    }
}

/// Receives progress notifications from a fetch.
///
/// `on_chunk` is called with a strictly increasing `transferred` count.
/// Observers may be shared between concurrent fetches, so every call carries
/// the archive identifier.
pub trait ProgressObserver: Send + Sync {
    /// A data transfer is about to start at `progress.transferred`.
    fn on_start(&self, _progress: &Progress<'_>) {}

    /// A chunk was written to disk.
    fn on_chunk(&self, progress: &Progress<'_>);

    /// The transfer of `identifier` ended, successfully or not.
    fn on_finish(&self, _identifier: &str) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_chunk(&self, _progress: &Progress<'_>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction() {
        let progress = Progress {
            identifier: "a",
            transferred: 1_000_000,
            total: 4_000_000,
        };
        assert!((progress.fraction() - 0.25).abs() < f64::EPSILON);

        let empty = Progress {
            identifier: "a",
            transferred: 0,
            total: 0,
        };
        assert_eq!(empty.fraction(), 1.0);
    }
}
