//! Leveled debug sink handed to the decoder.
//!
//! Levels: 1 = node, 2 = resource, 3 = operation and status reasoning.

pub trait Observer {
    fn debug(&self, level: u8, message: &str);
}

/// Forwards to `tracing`; level 1 at DEBUG, deeper levels at TRACE.
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn debug(&self, level: u8, message: &str) {
        if level <= 1 {
            tracing::debug!(depth = level, "{}", message);
        } else {
            tracing::trace!(depth = level, "{}", message);
        }
    }
}

pub struct NullObserver;

impl Observer for NullObserver {
    fn debug(&self, _level: u8, _message: &str) {}
}
