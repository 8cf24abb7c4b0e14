//! # Loss Models
//!
//! Per-attempt channel oracles. The engine calls [`LossModel::attempt`] once
//! for every frame it puts on the channel; the model answers whether that
//! transmission reached the receiver.
//!
//! - [`BernoulliLoss`]: independent loss with fixed probability `p`
//! - [`GilbertElliottLoss`]: two-state burst loss channel
//! - [`ScriptedLoss`]: fixed loss pattern keyed by `(round, seq)`, for replay
//!
//! Random models own a seeded [`StdRng`]; nothing reads global RNG state once
//! a model is built.

use rand::rngs::StdRng;
use rand::RngExt as _;
use rand::SeedableRng;
use std::collections::HashSet;

use crate::error::{ArqError, Result};

/// Result of a single transmission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    Delivered,
    Lost,
}

impl Attempt {
    pub fn is_lost(self) -> bool {
        matches!(self, Attempt::Lost)
    }
}

/// Decides, per transmission attempt, whether a frame is lost.
///
/// `seq` and `round` identify the attempt; probabilistic models are free to
/// ignore them. Implementations must not rely on being called in any
/// particular order within a round.
pub trait LossModel {
    fn attempt(&mut self, seq: u64, round: u64) -> Attempt;
}

impl<L: LossModel + ?Sized> LossModel for Box<L> {
    fn attempt(&mut self, seq: u64, round: u64) -> Attempt {
        (**self).attempt(seq, round)
    }
}

impl<L: LossModel + ?Sized> LossModel for &mut L {
    fn attempt(&mut self, seq: u64, round: u64) -> Attempt {
        (**self).attempt(seq, round)
    }
}

fn check_probability(p: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(ArqError::InvalidLossProbability(p))
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    StdRng::seed_from_u64(seed.unwrap_or_else(rand::random::<u64>))
}

// ─── Bernoulli ──────────────────────────────────────────────────────────────

/// Independent loss: every attempt is lost with probability `p`.
#[derive(Debug)]
pub struct BernoulliLoss {
    probability: f64,
    rng: StdRng,
}

impl BernoulliLoss {
    /// Build a model with an explicit seed (reproducible) or, with `None`,
    /// a randomly chosen one.
    pub fn new(probability: f64, seed: Option<u64>) -> Result<Self> {
        Ok(BernoulliLoss {
            probability: check_probability(probability)?,
            rng: seeded_rng(seed),
        })
    }

    pub fn seeded(probability: f64, seed: u64) -> Result<Self> {
        Self::new(probability, Some(seed))
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }
}

impl LossModel for BernoulliLoss {
    fn attempt(&mut self, _seq: u64, _round: u64) -> Attempt {
        // random::<f64>() is in [0, 1): p = 0 never loses, p = 1 always does.
        if self.rng.random::<f64>() < self.probability {
            Attempt::Lost
        } else {
            Attempt::Delivered
        }
    }
}

// ─── Gilbert-Elliott ────────────────────────────────────────────────────────

/// Parameters of the two-state Gilbert-Elliott channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GilbertElliottParams {
    /// Probability of moving Good -> Bad after an attempt.
    pub p: f64,
    /// Probability of moving Bad -> Good after an attempt.
    pub r: f64,
    /// Loss probability while in the Good state.
    pub loss_good: f64,
    /// Loss probability while in the Bad state.
    pub loss_bad: f64,
}

impl Default for GilbertElliottParams {
    fn default() -> Self {
        GilbertElliottParams {
            p: 0.05,
            r: 0.5,
            loss_good: 0.0,
            loss_bad: 1.0,
        }
    }
}

/// Burst-loss channel: losses cluster while the channel sits in its Bad state.
#[derive(Debug)]
pub struct GilbertElliottLoss {
    params: GilbertElliottParams,
    bad: bool,
    rng: StdRng,
}

impl GilbertElliottLoss {
    pub fn new(params: GilbertElliottParams, seed: Option<u64>) -> Result<Self> {
        check_probability(params.p)?;
        check_probability(params.r)?;
        check_probability(params.loss_good)?;
        check_probability(params.loss_bad)?;
        Ok(GilbertElliottLoss {
            params,
            bad: false,
            rng: seeded_rng(seed),
        })
    }

    /// Whether the channel is currently in its Bad state.
    pub fn in_bad_state(&self) -> bool {
        self.bad
    }
}

impl LossModel for GilbertElliottLoss {
    fn attempt(&mut self, _seq: u64, _round: u64) -> Attempt {
        let loss_p = if self.bad {
            self.params.loss_bad
        } else {
            self.params.loss_good
        };
        let lost = self.rng.random::<f64>() < loss_p;

        let flip = if self.bad { self.params.r } else { self.params.p };
        if self.rng.random::<f64>() < flip {
            self.bad = !self.bad;
        }

        if lost {
            Attempt::Lost
        } else {
            Attempt::Delivered
        }
    }
}

// ─── Scripted ───────────────────────────────────────────────────────────────

/// Deterministic loss pattern.
///
/// Rounds are 1-based, matching the engine's round numbering. An attempt is
/// lost if `(round, seq)` was scripted or `seq` is marked as always lost.
#[derive(Debug, Clone, Default)]
pub struct ScriptedLoss {
    lost: HashSet<(u64, u64)>,
    always: HashSet<u64>,
}

impl ScriptedLoss {
    /// A channel that delivers everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lose `seq` when it is transmitted in `round`.
    pub fn lose(mut self, round: u64, seq: u64) -> Self {
        self.lost.insert((round, seq));
        self
    }

    /// Lose every transmission of `seq`.
    pub fn always_lose(mut self, seq: u64) -> Self {
        self.always.insert(seq);
        self
    }
}

impl LossModel for ScriptedLoss {
    fn attempt(&mut self, seq: u64, round: u64) -> Attempt {
        if self.always.contains(&seq) || self.lost.contains(&(round, seq)) {
            Attempt::Lost
        } else {
            Attempt::Delivered
        }
    }
}
