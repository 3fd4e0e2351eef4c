use std::collections::VecDeque;

use tracing::{debug, info, warn};

use crate::frame::Frame;

/// Diagnostic categories the viewer reports.
pub mod kinds {
    /// A network fetch failed or returned an unusable body.
    pub const FETCH_FAILURE: &str = "fetch_failure";
    /// Upstream records were dropped while decoding.
    pub const MALFORMED_RECORD: &str = "malformed_record";
    /// A dataset finished loading.
    pub const LOADED: &str = "loaded";
    /// Playback or year selection changed.
    pub const TIMELINE: &str = "timeline";
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Debug,
    Info,
    Warn,
}

/// A frame-stamped diagnostic record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub frame_index: u64,
    pub kind: &'static str,
    pub severity: Severity,
    pub message: String,
}

/// Bounded in-memory diagnostics trail.
///
/// Every event is also forwarded to `tracing`; the buffer keeps the most
/// recent `capacity` events for inspection by the host and by tests.
#[derive(Debug)]
pub struct EventBus {
    events: VecDeque<Event>,
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_capacity(256)
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn emit(
        &mut self,
        frame: Frame,
        kind: &'static str,
        severity: Severity,
        message: impl Into<String>,
    ) {
        let message = message.into();
        match severity {
            Severity::Debug => debug!(frame = frame.index, kind, "{message}"),
            Severity::Info => info!(frame = frame.index, kind, "{message}"),
            Severity::Warn => warn!(frame = frame.index, kind, "{message}"),
        }

        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(Event {
            frame_index: frame.index,
            kind,
            severity,
            message,
        });
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn count_kind(&self, kind: &str) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }

    pub fn drain(&mut self) -> Vec<Event> {
        self.events.drain(..).collect()
    }
}
