//! Event sinks for Sweeper notifications.
//!
//! Every scene object reports what it does (telegraph, move start/end,
//! kill, goal reached, plate and door changes, reload) through the
//! [`EventSink`] trait. Emission is fire-and-forget: a sink has no return
//! value and must never block the tick that calls it.
//!
//! Zero or more subscribers are supported through [`Fanout`], which
//! forwards each event to its children in registration order.

use std::io::Write;

use sweeper_types::SweepEvent;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{info, warn};

/// A fire-and-forget consumer of [`SweepEvent`]s.
pub trait EventSink {
    /// Deliver one event. Must not block.
    fn emit(&mut self, event: SweepEvent);
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: SweepEvent) {
        (**self).emit(event);
    }
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    fn emit(&mut self, event: SweepEvent) {
        (**self).emit(event);
    }
}

/// A sink that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: SweepEvent) {}
}

/// A sink that keeps every event in memory, in emission order.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Vec<SweepEvent>,
}

impl RecordingSink {
    /// Create an empty recording sink.
    pub const fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// All events recorded so far.
    pub fn events(&self) -> &[SweepEvent] {
        &self.events
    }

    /// Take the recorded events, leaving the sink empty.
    pub fn drain(&mut self) -> Vec<SweepEvent> {
        std::mem::take(&mut self.events)
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: SweepEvent) {
        self.events.push(event);
    }
}

/// A sink that forwards events over an unbounded tokio channel.
///
/// Sending never blocks. Once the receiver is dropped, events are discarded
/// and a single warning is logged.
#[derive(Debug)]
pub struct ChannelSink {
    tx: UnboundedSender<SweepEvent>,
    closed: bool,
}

impl ChannelSink {
    /// Create a sink and the receiver that observes it.
    pub fn new() -> (Self, UnboundedReceiver<SweepEvent>) {
        let (tx, rx) = unbounded_channel();
        (Self { tx, closed: false }, rx)
    }

    /// Wrap an existing sender.
    pub const fn from_sender(tx: UnboundedSender<SweepEvent>) -> Self {
        Self { tx, closed: false }
    }
}

impl EventSink for ChannelSink {
    fn emit(&mut self, event: SweepEvent) {
        if self.closed {
            return;
        }
        if self.tx.send(event).is_err() {
            warn!("event channel receiver dropped, discarding further events");
            self.closed = true;
        }
    }
}

/// A sink that logs every event at `info` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&mut self, event: SweepEvent) {
        info!(source = %event.source, kind = ?event.kind, at = event.at, "Event");
    }
}

/// A sink that writes one JSON object per line to a writer.
///
/// Write failures are logged and the sink stops writing; they never
/// propagate into the tick.
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    writer: W,
    failed: bool,
}

impl<W: Write> JsonLinesSink<W> {
    /// Wrap a writer.
    pub const fn new(writer: W) -> Self {
        Self {
            writer,
            failed: false,
        }
    }

    /// Recover the inner writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> EventSink for JsonLinesSink<W> {
    fn emit(&mut self, event: SweepEvent) {
        if self.failed {
            return;
        }
        let result = serde_json::to_writer(&mut self.writer, &event)
            .map_err(std::io::Error::from)
            .and_then(|()| self.writer.write_all(b"\n"));
        if let Err(e) = result {
            warn!(error = %e, "failed to write event, disabling JSON sink");
            self.failed = true;
        }
    }
}

/// Forwards every event to each child sink, in registration order.
#[derive(Default)]
pub struct Fanout {
    sinks: Vec<Box<dyn EventSink + Send>>,
}

impl Fanout {
    /// Create a fan-out with no subscribers.
    pub const fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    /// Add a subscriber. Subscribers receive events in the order added.
    #[must_use]
    pub fn with(mut self, sink: impl EventSink + Send + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    /// Add a subscriber in place.
    pub fn subscribe(&mut self, sink: impl EventSink + Send + 'static) {
        self.sinks.push(Box::new(sink));
    }

    /// Number of subscribers.
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Whether there are no subscribers.
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl core::fmt::Debug for Fanout {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Fanout")
            .field("subscribers", &self.sinks.len())
            .finish()
    }
}

impl EventSink for Fanout {
    fn emit(&mut self, event: SweepEvent) {
        let Some((last, rest)) = self.sinks.split_last_mut() else {
            return;
        };
        for sink in rest {
            sink.emit(event.clone());
        }
        last.emit(event);
    }
}
