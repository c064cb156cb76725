//! Structured progress reporting for index builds.
//!
//! Provides observable, incremental feedback during the long-running build
//! phases (document scanning, embedding, index writing). This is a side
//! channel: nothing in the build contract depends on it.

use std::sync::Arc;
use std::time::Instant;

/// Progress event emitted during a build.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    /// Phase of the operation: "document", "embed", "index"
    pub phase: String,

    /// Current progress (documents processed, chunks embedded, ...)
    pub current: u64,

    /// Total expected work (if known)
    pub total: Option<u64>,

    /// Percentage complete (0.0 - 100.0)
    pub percentage: Option<f64>,

    /// Human-readable message
    pub message: String,

    /// Elapsed time since the build started
    pub elapsed_secs: Option<f64>,
}

impl ProgressEvent {
    /// Create a new progress event.
    pub fn new(
        phase: impl Into<String>,
        current: u64,
        total: Option<u64>,
        message: impl Into<String>,
    ) -> Self {
        let percentage = total.map(|t| {
            if t > 0 {
                (current as f64 / t as f64) * 100.0
            } else {
                0.0
            }
        });

        Self {
            phase: phase.into(),
            current,
            total,
            percentage,
            message: message.into(),
            elapsed_secs: None,
        }
    }

    /// Set elapsed time.
    pub fn with_elapsed(mut self, elapsed_secs: f64) -> Self {
        self.elapsed_secs = Some(elapsed_secs);
        self
    }

    /// Format as a simple user-facing line.
    pub fn format_simple(&self) -> String {
        let progress = if let Some(total) = self.total {
            format!("{}/{}", self.current, total)
        } else {
            format!("{}", self.current)
        };

        let pct = if let Some(p) = self.percentage {
            format!(" ({:.0}%)", p)
        } else {
            String::new()
        };

        format!("[{}] {}{} - {}", self.phase, progress, pct, self.message)
    }
}

/// Callback for progress events.
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Progress reporter that emits events through a callback.
#[derive(Clone)]
pub struct ProgressReporter {
    callback: Option<ProgressCallback>,
    start_time: Arc<Instant>,
}

impl ProgressReporter {
    /// Create a new reporter with a callback.
    pub fn new(callback: ProgressCallback) -> Self {
        Self {
            callback: Some(callback),
            start_time: Arc::new(Instant::now()),
        }
    }

    /// Create a no-op reporter (no events emitted).
    pub fn noop() -> Self {
        Self {
            callback: None,
            start_time: Arc::new(Instant::now()),
        }
    }

    /// Emit a progress event.
    pub fn emit(&self, event: ProgressEvent) {
        if let Some(callback) = &self.callback {
            let elapsed = self.start_time.elapsed().as_secs_f64();
            let event_with_time = event.with_elapsed(elapsed);

            tracing::debug!(
                phase = %event_with_time.phase,
                current = event_with_time.current,
                total = ?event_with_time.total,
                message = %event_with_time.message,
                elapsed_secs = elapsed,
                "Progress event"
            );

            callback(event_with_time);
        }
    }

    /// Emit a document-scanning event (fraction of documents processed).
    pub fn document(&self, current: u64, total: Option<u64>, file: &str) {
        self.emit(ProgressEvent::new(
            "document",
            current,
            total,
            format!("reading {}", file),
        ));
    }

    /// Emit an embedding phase event.
    pub fn embed(&self, current: u64, total: Option<u64>, model: &str) {
        self.emit(ProgressEvent::new(
            "embed",
            current,
            total,
            format!("model={}", model),
        ));
    }

    /// Emit an index-writing phase event.
    pub fn index(&self, current: u64, total: Option<u64>) {
        self.emit(ProgressEvent::new(
            "index",
            current,
            total,
            "writing index",
        ));
    }
}
