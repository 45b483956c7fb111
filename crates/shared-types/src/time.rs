//! Time source port.
//!
//! Abstracted so settlement timestamps and the timeout sweeper can be
//! driven deterministically in tests.

/// Unix timestamp in seconds.
pub type Timestamp = u64;

/// Clock abstraction.
pub trait TimeSource: Send + Sync {
    /// Returns the current unix timestamp in seconds.
    fn now(&self) -> Timestamp;
}

/// Default wall-clock time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

/// Manually-advanced time source for tests.
#[derive(Debug, Default)]
pub struct MockTimeSource {
    time: std::sync::atomic::AtomicU64,
}

impl MockTimeSource {
    /// Creates a mock clock at `initial` seconds.
    pub fn new(initial: Timestamp) -> Self {
        Self {
            time: std::sync::atomic::AtomicU64::new(initial),
        }
    }

    /// Advances the clock by `secs`.
    pub fn advance(&self, secs: u64) {
        self.time
            .fetch_add(secs, std::sync::atomic::Ordering::SeqCst);
    }
}

impl TimeSource for MockTimeSource {
    fn now(&self) -> Timestamp {
        self.time.load(std::sync::atomic::Ordering::SeqCst)
    }
}
