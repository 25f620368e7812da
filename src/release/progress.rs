//! Progress reporting for release runs.

use std::fmt;

/// One progress event: a message and the overall completion in `0.0..=1.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseProgress {
    /// Human-readable message, including raw tool output lines
    pub message: String,
    /// Overall completion
    pub fraction: f64,
}

impl fmt::Display for ReleaseProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:>3.0}%] {}", self.fraction * 100.0, self.message)
    }
}

/// Receives progress events.
///
/// Implemented for any `Fn(ReleaseProgress)` closure.
pub trait ProgressSink: Send + Sync {
    /// Called for every event, in order.
    fn report(&self, progress: ReleaseProgress);
}

impl<F> ProgressSink for F
where
    F: Fn(ReleaseProgress) + Send + Sync,
{
    fn report(&self, progress: ReleaseProgress) {
        self(progress)
    }
}

/// Clamps, logs and forwards events to an optional sink.
#[derive(Clone, Copy)]
pub(crate) struct Reporter<'a> {
    sink: Option<&'a dyn ProgressSink>,
}

impl<'a> Reporter<'a> {
    pub(crate) fn new(sink: Option<&'a dyn ProgressSink>) -> Self {
        Self { sink }
    }

    pub(crate) fn report(&self, message: impl Into<String>, fraction: f64) {
        let progress = ReleaseProgress {
            message: message.into(),
            fraction: if fraction.is_nan() {
                0.0
            } else {
                fraction.clamp(0.0, 1.0)
            },
        };
        log::info!("{}", progress);
        if let Some(sink) = self.sink {
            sink.report(progress);
        }
    }
}
