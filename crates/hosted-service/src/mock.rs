//! # Mocks & Testing Guide
//!
//! Timer-driven code is awkward to test: real intervals make tests slow, and paused time still
//! makes you reason about how many ticks fit in a window. This module gives you two helpers:
//!
//! | Helper | Replaces | Use it to |
//! |--------|----------|-----------|
//! | [`ManualTrigger`] | [`IntervalTrigger`](crate::IntervalTrigger) | fire cycles one at a time, exactly when the test says so |
//! | [`LogCapture`] | the `fmt` subscriber | assert on log lines emitted by the service and its cycles |
//!
//! ## Pattern: drive cycles by hand
//!
//! ```rust
//! use hosted_service::mock::ManualTrigger;
//! use hosted_service::{CycleJob, HostedService};
//! use async_trait::async_trait;
//! use tokio_util::sync::CancellationToken;
//!
//! struct Ping;
//!
//! #[async_trait]
//! impl CycleJob for Ping {
//!     type Scope = ();
//!     type Output = ();
//!     type Error = std::io::Error;
//!     fn begin_scope(&self) -> Result<(), Self::Error> { Ok(()) }
//!     async fn run_cycle(&self, _: (), _: u64) -> Result<(), Self::Error> { Ok(()) }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let (trigger, ticks) = ManualTrigger::new();
//!     let mut service = HostedService::new(Ping, trigger);
//!     service.start(&CancellationToken::new()).unwrap();
//!
//!     ticks.fire();
//!     service.metrics().wait_for_completed(1).await;
//!     assert_eq!(service.metrics().snapshot().succeeded, 1);
//! }
//! ```
//!
//! ## Pattern: capture logs
//!
//! [`LogCapture::install`] sets a thread-local default subscriber. `#[tokio::test]` uses the
//! current-thread runtime, so spawned cycle tasks run on the same thread and their events are
//! captured as well.

use crate::trigger::Trigger;
use async_trait::async_trait;
use std::fmt::{self, Write};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

// =============================================================================
// MANUAL TRIGGER
// =============================================================================

/// A trigger that fires only when [`ManualTicks::fire`] is called.
pub struct ManualTrigger {
    receiver: mpsc::UnboundedReceiver<()>,
}

/// The test-side half of a [`ManualTrigger`].
#[derive(Clone)]
pub struct ManualTicks {
    sender: mpsc::UnboundedSender<()>,
}

impl ManualTrigger {
    pub fn new() -> (Self, ManualTicks) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { receiver }, ManualTicks { sender })
    }
}

#[async_trait]
impl Trigger for ManualTrigger {
    async fn next_firing(&mut self) -> bool {
        self.receiver.recv().await.is_some()
    }
}

impl ManualTicks {
    /// Queues one firing. Returns `false` if the trigger has been released.
    pub fn fire(&self) -> bool {
        self.sender.send(()).is_ok()
    }

    /// True once the driver loop holding the trigger has exited.
    pub fn is_released(&self) -> bool {
        self.sender.is_closed()
    }
}

// =============================================================================
// LOG CAPTURE
// =============================================================================

/// A `tracing-subscriber` layer that records every event as a flat line of text.
///
/// Each line is the event message followed by its fields, e.g.
/// `order 42 forwarded for stock decrement order_id=42`.
#[derive(Clone, Default)]
pub struct LogCapture {
    lines: Arc<Mutex<Vec<String>>>,
}

impl LogCapture {
    /// Installs a fresh capture as the default subscriber for the current thread.
    /// Capturing stops when the guard is dropped.
    pub fn install() -> (Self, DefaultGuard) {
        let capture = Self::default();
        let subscriber = tracing_subscriber::registry().with(capture.clone());
        let guard = tracing::subscriber::set_default(subscriber);
        (capture, guard)
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn count_containing(&self, needle: &str) -> usize {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .filter(|line| line.contains(needle))
            .count()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.count_containing(needle) > 0
    }
}

impl<S: Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);
        self.lines.lock().unwrap().push(visitor.finish());
    }
}

#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl LineVisitor {
    fn finish(self) -> String {
        format!("{}{}", self.message, self.fields)
    }
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}
