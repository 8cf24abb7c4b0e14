//! Console presentation of the engine's event stream.

use arqsim_engine::config::Discipline;
use arqsim_engine::engine::{EngineState, RunOutcome};
use arqsim_engine::event::Event;
use serde::Serialize;
use std::collections::HashMap;

/// One human-readable line per event, or `None` for events the console
/// folds into another line (a transmission is reported with its outcome).
pub fn render_event(event: &Event) -> Option<String> {
    Some(match *event {
        Event::RoundStarted {
            round,
            window_start,
            window_end,
        } => format!(
            "Round {round} | current window: [{window_start}, {}]",
            window_end.saturating_sub(1)
        ),
        Event::FrameTransmitted { .. } => return None,
        Event::FrameDelivered { seq } => format!("Sending frame {seq} (received)"),
        Event::FrameLost { seq } => format!("Sending frame {seq} (lost)"),
        Event::FrameAcknowledged { seq } => format!("Acknowledging frame {seq}"),
        Event::FrameDiscarded { seq } => format!("Discarding out-of-order frame {seq}"),
        Event::Timeout { seq } => format!("Timeout: resend frame {seq}"),
        Event::WindowAdvanced { new_base, .. } => format!("New base: {new_base}"),
        Event::SimulationComplete { total_rounds } => {
            format!("All frames transmitted successfully in {total_rounds} rounds\n")
        }
        Event::RoundLimitReached { rounds, base } => {
            format!("Gave up after {rounds} rounds with base stuck at {base}\n")
        }
    })
}

pub fn render_header(discipline: Discipline) -> String {
    format!("{discipline} Simulation:")
}

pub fn render_summary(outcome: &RunOutcome) -> String {
    let status = match outcome.state {
        EngineState::Complete => "complete",
        EngineState::RoundLimitReached => "gave up",
        EngineState::Running => "running",
    };
    let stats = &outcome.stats;
    format!(
        "{:<17} {:<9} rounds={:<5} sent={:<6} resent={:<6} lost={:<6} discarded={:<6} efficiency={:.2}",
        outcome.discipline.to_string(),
        status,
        outcome.rounds,
        stats.transmissions,
        stats.retransmissions,
        stats.frames_lost,
        stats.frames_discarded,
        stats.efficiency(),
    )
}

/// Collects rendered lines per discipline and releases a whole block once
/// that discipline's run ends, so concurrent runs print unmixed.
///
/// Every round closes with a "New base" line, including rounds where the
/// window did not move.
#[derive(Debug, Default)]
pub struct BlockBuffer {
    pending: HashMap<Discipline, Block>,
}

#[derive(Debug, Default)]
struct Block {
    lines: Vec<String>,
    base: u64,
    round_open: bool,
}

impl Block {
    fn close_round(&mut self) {
        if self.round_open {
            self.lines.push(format!("New base: {}", self.base));
            self.round_open = false;
        }
    }
}

impl BlockBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the finished block when `event` ends the run.
    pub fn push(&mut self, discipline: Discipline, event: &Event) -> Option<String> {
        let block = self.pending.entry(discipline).or_default();
        match *event {
            Event::RoundStarted { window_start, .. } => {
                block.close_round();
                block.base = window_start;
                block.round_open = true;
            }
            Event::WindowAdvanced { new_base, .. } => {
                block.base = new_base;
                block.close_round();
            }
            ref e if e.is_terminal() => block.close_round(),
            _ => {}
        }
        if let Some(line) = render_event(event) {
            if !matches!(event, Event::WindowAdvanced { .. }) {
                block.lines.push(line);
            }
        }
        if !event.is_terminal() {
            return None;
        }
        let block = self.pending.remove(&discipline).unwrap_or_default();
        let mut out = render_header(discipline);
        for line in block.lines {
            out.push('\n');
            out.push_str(&line);
        }
        Some(out)
    }
}

#[derive(Serialize)]
struct TaggedEvent<'a> {
    discipline: Discipline,
    #[serde(flatten)]
    event: &'a Event,
}

#[derive(Serialize)]
struct TaggedSummary<'a> {
    summary: &'a RunOutcome,
}

pub fn event_json(discipline: Discipline, event: &Event) -> serde_json::Result<String> {
    serde_json::to_string(&TaggedEvent { discipline, event })
}

pub fn summary_json(outcome: &RunOutcome) -> serde_json::Result<String> {
    serde_json::to_string(&TaggedSummary { summary: outcome })
}
