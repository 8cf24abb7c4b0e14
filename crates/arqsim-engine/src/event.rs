//! # Simulation Events
//!
//! The engine's only output. Within a round events are emitted in this order:
//!
//! 1. `RoundStarted`
//! 2. `FrameTransmitted` followed by `FrameDelivered` or `FrameLost`, per frame
//! 3. `FrameAcknowledged` / `FrameDiscarded`, ascending by sequence
//! 4. `Timeout` for every transmitted frame left unacknowledged
//! 5. `WindowAdvanced` if the base moved
//! 6. `SimulationComplete` or `RoundLimitReached` on the terminal round

use crossbeam_channel::Sender;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// A round begins with window `[window_start, window_end)`.
    RoundStarted {
        round: u64,
        window_start: u64,
        window_end: u64,
    },
    /// `attempt` is 1 for the first transmission of `seq`.
    FrameTransmitted { seq: u64, attempt: u32 },
    FrameLost { seq: u64 },
    FrameDelivered { seq: u64 },
    FrameAcknowledged { seq: u64 },
    /// Delivered out of order and dropped by an in-order receiver.
    FrameDiscarded { seq: u64 },
    /// Not acknowledged this round; will be resent.
    Timeout { seq: u64 },
    WindowAdvanced { old_base: u64, new_base: u64 },
    SimulationComplete { total_rounds: u64 },
    /// The configured round cap was hit before every frame was acknowledged.
    RoundLimitReached { rounds: u64, base: u64 },
}

impl Event {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Event::SimulationComplete { .. } | Event::RoundLimitReached { .. }
        )
    }
}

// ─── Sinks ──────────────────────────────────────────────────────────────────

/// Consumer of the engine's event stream (console, log, channel, test vec).
pub trait EventSink {
    fn on_event(&mut self, event: &Event);
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn on_event(&mut self, event: &Event) {
        (**self).on_event(event);
    }
}

impl EventSink for Vec<Event> {
    fn on_event(&mut self, event: &Event) {
        self.push(event.clone());
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn on_event(&mut self, _event: &Event) {}
}

/// Logs every event through `tracing` at debug level (terminal events at info).
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn on_event(&mut self, event: &Event) {
        if event.is_terminal() {
            tracing::info!(?event, "simulation event");
        } else {
            tracing::debug!(?event, "simulation event");
        }
    }
}

/// Sends events to another thread. A closed receiver is ignored.
impl EventSink for Sender<Event> {
    fn on_event(&mut self, event: &Event) {
        let _ = self.send(event.clone());
    }
}

/// Channel sink that tags every event, so several simulations can share one
/// receiver.
#[derive(Debug, Clone)]
pub struct ChannelSink<K> {
    tag: K,
    tx: Sender<(K, Event)>,
    disconnected: bool,
}

impl<K: Clone> ChannelSink<K> {
    pub fn new(tag: K, tx: Sender<(K, Event)>) -> Self {
        ChannelSink {
            tag,
            tx,
            disconnected: false,
        }
    }

    /// True once a send failed because the receiver is gone. Drivers use
    /// this to stop stepping an engine nobody is listening to.
    pub fn is_disconnected(&self) -> bool {
        self.disconnected
    }
}

impl<K: Clone> EventSink for ChannelSink<K> {
    fn on_event(&mut self, event: &Event) {
        if self.disconnected {
            return;
        }
        if self.tx.send((self.tag.clone(), event.clone())).is_err() {
            self.disconnected = true;
        }
    }
}
