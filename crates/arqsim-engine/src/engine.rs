//! # ARQ Engine
//!
//! Pure logic: no I/O, no threads. One [`ArqEngine`] simulates one transfer
//! of `N` frames under one [`Discipline`], advanced a round at a time by
//! [`ArqEngine::step`].
//!
//! ## Round
//!
//! 1. Transmit every eligible frame in the window, asking the [`LossModel`]
//!    for each attempt
//! 2. Turn deliveries into acknowledgments via the [`WindowController`]
//! 3. Time out whatever is still unacknowledged (it goes back to Pending)
//! 4. Slide the window and check for termination
//!
//! Every action is queued as an [`Event`]; callers either drain them after
//! each step or hand a sink to [`ArqEngine::run_to_completion`].

use serde::Serialize;
use std::collections::VecDeque;

use crate::config::{Discipline, SimulationConfig};
use crate::error::Result;
use crate::event::{Event, EventSink};
use crate::frame::FrameTable;
use crate::loss::{Attempt, BernoulliLoss, LossModel};
use crate::stats::SimulationStats;
use crate::window::WindowController;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineState {
    Running,
    /// Every frame acknowledged (`base == N`).
    Complete,
    /// `max_rounds` elapsed first. The run gave up without converging.
    RoundLimitReached,
}

impl EngineState {
    pub fn is_terminal(self) -> bool {
        self != EngineState::Running
    }
}

/// Final result of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub discipline: Discipline,
    pub state: EngineState,
    pub rounds: u64,
    pub base: u64,
    pub stats: SimulationStats,
}

impl RunOutcome {
    pub fn converged(&self) -> bool {
        self.state == EngineState::Complete
    }
}

pub struct ArqEngine<L> {
    config: SimulationConfig,
    loss: L,
    frames: FrameTable,
    window: WindowController,
    round: u64,
    state: EngineState,
    events: VecDeque<Event>,
    stats: SimulationStats,
}

impl ArqEngine<BernoulliLoss> {
    /// Engine with independent loss at `config.loss_probability`, seeded from
    /// `config.seed`.
    pub fn bernoulli(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let loss = BernoulliLoss::new(config.loss_probability, config.seed)?;
        Self::new(config, loss)
    }
}

impl<L: LossModel> ArqEngine<L> {
    /// Validates `config` before anything runs.
    pub fn new(config: SimulationConfig, loss: L) -> Result<Self> {
        config.validate()?;
        Ok(ArqEngine {
            frames: FrameTable::new(config.total_frames),
            window: WindowController::new(config.window_size, config.total_frames),
            config,
            loss,
            round: 0,
            state: EngineState::Running,
            events: VecDeque::new(),
            stats: SimulationStats::new(),
        })
    }

    fn emit(&mut self, event: Event) {
        self.stats.record(&event);
        self.events.push_back(event);
    }

    /// Run one round. A no-op once the engine is terminal.
    pub fn step(&mut self) -> Result<EngineState> {
        if self.state.is_terminal() {
            return Ok(self.state);
        }

        self.round += 1;
        let round = self.round;
        let discipline = self.config.discipline;
        let eligible = self.window.eligible(&self.frames);

        self.emit(Event::RoundStarted {
            round,
            window_start: self.window.base(),
            window_end: self.window.window_end(),
        });

        // ── Transmit ────────────────────────────────────────────
        let mut delivered = Vec::with_capacity(eligible.len());
        for &seq in &eligible {
            self.frames.mark_in_flight(seq)?;
            let attempt = self.frames.frame(seq).map_or(1, |f| f.transmissions);
            self.emit(Event::FrameTransmitted { seq, attempt });

            let outcome = self.loss.attempt(seq, round);
            tracing::trace!(round, seq, attempt, ?outcome, "frame transmitted");
            match outcome {
                Attempt::Delivered => {
                    delivered.push(seq);
                    self.emit(Event::FrameDelivered { seq });
                }
                Attempt::Lost => self.emit(Event::FrameLost { seq }),
            }
        }

        // ── Acknowledge ─────────────────────────────────────────
        let acks = self
            .window
            .acknowledge(discipline, &mut self.frames, &delivered)?;
        for &seq in &delivered {
            if acks.acknowledged.binary_search(&seq).is_ok() {
                self.emit(Event::FrameAcknowledged { seq });
            } else if acks.discarded.binary_search(&seq).is_ok() {
                self.emit(Event::FrameDiscarded { seq });
            }
        }

        // ── Timeouts ────────────────────────────────────────────
        for &seq in &eligible {
            if !self.frames.is_acknowledged(seq) {
                self.frames.mark_pending(seq)?;
                self.emit(Event::Timeout { seq });
            }
        }

        // ── Slide ───────────────────────────────────────────────
        if let Some((old_base, new_base)) = self.window.advance(&self.frames) {
            self.emit(Event::WindowAdvanced { old_base, new_base });
        }

        tracing::debug!(
            %discipline,
            round,
            sent = eligible.len(),
            delivered = delivered.len(),
            acked = acks.acknowledged.len(),
            base = self.window.base(),
            "round finished"
        );

        if self.window.is_complete() {
            self.state = EngineState::Complete;
            self.emit(Event::SimulationComplete {
                total_rounds: round,
            });
            tracing::info!(%discipline, rounds = round, "all frames acknowledged");
        } else if self.config.max_rounds.is_some_and(|max| round >= max) {
            self.state = EngineState::RoundLimitReached;
            let base = self.window.base();
            self.emit(Event::RoundLimitReached {
                rounds: round,
                base,
            });
            tracing::warn!(%discipline, rounds = round, base, "round limit reached");
        }

        Ok(self.state)
    }

    /// Step until terminal, forwarding every event to `sink`.
    ///
    /// Without `max_rounds` a channel that loses everything never finishes;
    /// use [`ArqEngine::run_for`] to bound such runs.
    pub fn run_to_completion<S: EventSink>(&mut self, mut sink: S) -> Result<RunOutcome> {
        self.flush(&mut sink);
        while !self.state.is_terminal() {
            self.step()?;
            self.flush(&mut sink);
        }
        Ok(self.outcome())
    }

    /// Step at most `rounds` times, stopping early on a terminal state.
    pub fn run_for<S: EventSink>(&mut self, rounds: u64, mut sink: S) -> Result<EngineState> {
        self.flush(&mut sink);
        for _ in 0..rounds {
            if self.step()?.is_terminal() {
                break;
            }
            self.flush(&mut sink);
        }
        self.flush(&mut sink);
        Ok(self.state)
    }

    fn flush<S: EventSink>(&mut self, sink: &mut S) {
        for event in self.events.drain(..) {
            sink.on_event(&event);
        }
    }

    /// Drain events queued by previous steps.
    pub fn drain_events(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.events.drain(..)
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    pub fn outcome(&self) -> RunOutcome {
        RunOutcome {
            discipline: self.config.discipline,
            state: self.state,
            rounds: self.round,
            base: self.window.base(),
            stats: self.stats.clone(),
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn base(&self) -> u64 {
        self.window.base()
    }

    pub fn window(&self) -> &WindowController {
        &self.window
    }

    pub fn frames(&self) -> &FrameTable {
        &self.frames
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }
}
