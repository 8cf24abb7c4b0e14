//! # Run Statistics
//!
//! Counters accumulated by the engine over a run. Serializable so the
//! driver can print them as JSON alongside the event stream.

use serde::Serialize;

use crate::event::Event;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SimulationStats {
    /// Completed rounds.
    pub rounds: u64,
    /// Frames put on the channel, including retransmissions.
    pub transmissions: u64,
    /// Transmissions of a frame that had been sent before.
    pub retransmissions: u64,
    pub frames_delivered: u64,
    pub frames_lost: u64,
    /// Go-Back-N deliveries dropped for arriving after a gap.
    pub frames_discarded: u64,
    pub frames_acknowledged: u64,
    pub timeouts: u64,
}

impl SimulationStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update counters from one emitted event.
    pub fn record(&mut self, event: &Event) {
        match *event {
            Event::RoundStarted { .. } => self.rounds += 1,
            Event::FrameTransmitted { attempt, .. } => {
                self.transmissions += 1;
                if attempt > 1 {
                    self.retransmissions += 1;
                }
            }
            Event::FrameDelivered { .. } => self.frames_delivered += 1,
            Event::FrameLost { .. } => self.frames_lost += 1,
            Event::FrameDiscarded { .. } => self.frames_discarded += 1,
            Event::FrameAcknowledged { .. } => self.frames_acknowledged += 1,
            Event::Timeout { .. } => self.timeouts += 1,
            Event::WindowAdvanced { .. }
            | Event::SimulationComplete { .. }
            | Event::RoundLimitReached { .. } => {}
        }
    }

    /// Useful frames per transmission (1.0 = nothing was ever resent).
    pub fn efficiency(&self) -> f64 {
        if self.transmissions == 0 {
            0.0
        } else {
            self.frames_acknowledged as f64 / self.transmissions as f64
        }
    }

    /// Retransmission overhead ratio.
    pub fn retransmit_ratio(&self) -> f64 {
        if self.transmissions == 0 {
            0.0
        } else {
            self.retransmissions as f64 / self.transmissions as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_ratios_are_zero() {
        let stats = SimulationStats::new();
        assert_eq!(stats.efficiency(), 0.0);
        assert_eq!(stats.retransmit_ratio(), 0.0);
    }

    #[test]
    fn record_counts_retransmissions() {
        let mut stats = SimulationStats::new();
        for event in [
            Event::RoundStarted {
                round: 1,
                window_start: 0,
                window_end: 2,
            },
            Event::FrameTransmitted { seq: 0, attempt: 1 },
            Event::FrameLost { seq: 0 },
            Event::FrameTransmitted { seq: 1, attempt: 1 },
            Event::FrameDelivered { seq: 1 },
            Event::FrameAcknowledged { seq: 1 },
            Event::Timeout { seq: 0 },
            Event::FrameTransmitted { seq: 0, attempt: 2 },
        ] {
            stats.record(&event);
        }
        assert_eq!(stats.rounds, 1);
        assert_eq!(stats.transmissions, 3);
        assert_eq!(stats.retransmissions, 1);
        assert_eq!(stats.frames_lost, 1);
        assert_eq!(stats.timeouts, 1);
        assert!((stats.retransmit_ratio() - 1.0 / 3.0).abs() < 1e-9);
        assert!((stats.efficiency() - 1.0 / 3.0).abs() < 1e-9);
    }
}
