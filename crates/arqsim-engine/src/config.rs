//! # Configuration
//!
//! Two layers, as in the rest of the workspace's config handling:
//!
//! - `*Input` structs deserialize permissively from TOML (every field
//!   optional, `#[serde(default)]`)
//! - [`ScenarioInput::resolve`] turns them into validated types, filling
//!   defaults and rejecting out-of-range values
//!
//! Defaults mirror the classic classroom setup: 5 frames, window of 3,
//! 30% loss.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ArqError, Result};
use crate::loss::{BernoulliLoss, GilbertElliottLoss, GilbertElliottParams, LossModel};

pub const CONFIG_VERSION: u32 = 1;

pub const DEFAULT_TOTAL_FRAMES: u64 = 5;
pub const DEFAULT_WINDOW_SIZE: u64 = 3;
pub const DEFAULT_LOSS_PROBABILITY: f64 = 0.3;
/// Upper bound on `total_frames`; the frame table holds one entry per frame.
pub const MAX_TOTAL_FRAMES: u64 = 1 << 24;

// ─── Discipline ─────────────────────────────────────────────────────────────

/// Retransmission discipline. Fixed for the lifetime of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Discipline {
    /// In-order acknowledgment; a gap discards everything after it.
    GoBackN,
    /// Per-frame acknowledgment; only missing frames are resent.
    SelectiveRepeat,
}

impl Discipline {
    pub const ALL: [Discipline; 2] = [Discipline::GoBackN, Discipline::SelectiveRepeat];

    pub fn short_name(self) -> &'static str {
        match self {
            Discipline::GoBackN => "gbn",
            Discipline::SelectiveRepeat => "sr",
        }
    }
}

impl fmt::Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Discipline::GoBackN => f.write_str("Go-Back-N"),
            Discipline::SelectiveRepeat => f.write_str("Selective Repeat"),
        }
    }
}

impl FromStr for Discipline {
    type Err = ArqError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "go-back-n" | "gobackn" | "gbn" => Ok(Discipline::GoBackN),
            "selective-repeat" | "selectiverepeat" | "sr" => Ok(Discipline::SelectiveRepeat),
            other => Err(ArqError::UnknownDiscipline(other.to_string())),
        }
    }
}

// ─── Simulation Config ──────────────────────────────────────────────────────

/// Validated parameters for one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationConfig {
    pub total_frames: u64,
    pub window_size: u64,
    pub discipline: Discipline,
    pub loss_probability: f64,
    /// Give up after this many rounds. `None` = run until complete.
    pub max_rounds: Option<u64>,
    /// Seed for the loss model. `None` = random.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            total_frames: DEFAULT_TOTAL_FRAMES,
            window_size: DEFAULT_WINDOW_SIZE,
            discipline: Discipline::GoBackN,
            loss_probability: DEFAULT_LOSS_PROBABILITY,
            max_rounds: None,
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn new(total_frames: u64, window_size: u64, discipline: Discipline) -> Self {
        SimulationConfig {
            total_frames,
            window_size,
            discipline,
            ..Default::default()
        }
    }

    pub fn with_loss_probability(mut self, p: f64) -> Self {
        self.loss_probability = p;
        self
    }

    pub fn with_max_rounds(mut self, rounds: u64) -> Self {
        self.max_rounds = Some(rounds);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.total_frames == 0 {
            return Err(ArqError::InvalidTotalFrames);
        }
        if self.total_frames > MAX_TOTAL_FRAMES {
            return Err(ArqError::TooManyFrames {
                total: self.total_frames,
                max: MAX_TOTAL_FRAMES,
            });
        }
        if self.window_size == 0 {
            return Err(ArqError::InvalidWindowSize);
        }
        if !(0.0..=1.0).contains(&self.loss_probability) {
            return Err(ArqError::InvalidLossProbability(self.loss_probability));
        }
        if self.max_rounds == Some(0) {
            return Err(ArqError::InvalidMaxRounds);
        }
        Ok(())
    }

    /// Lower bound on rounds: one full window per round with no loss.
    pub fn min_rounds(&self) -> u64 {
        self.total_frames.div_ceil(self.window_size.max(1))
    }
}

// ─── Loss Model Config ──────────────────────────────────────────────────────

/// Which channel model feeds the engine.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LossModelConfig {
    /// Independent loss at the simulation's `loss_probability`.
    #[default]
    Bernoulli,
    GilbertElliott(GilbertElliottParams),
}

impl LossModelConfig {
    /// Build the model for one run, seeded from `config.seed`.
    pub fn build(&self, config: &SimulationConfig) -> Result<Box<dyn LossModel + Send>> {
        let model: Box<dyn LossModel + Send> = match self {
            LossModelConfig::Bernoulli => {
                Box::new(BernoulliLoss::new(config.loss_probability, config.seed)?)
            }
            LossModelConfig::GilbertElliott(params) => {
                Box::new(GilbertElliottLoss::new(*params, config.seed)?)
            }
        };
        Ok(model)
    }
}

// ─── TOML Input ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScenarioInput {
    pub version: u32,
    pub simulation: SimulationInput,
    pub loss: LossInput,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SimulationInput {
    pub total_frames: Option<u64>,
    pub window_size: Option<u64>,
    /// Omitted = run every discipline.
    pub discipline: Option<String>,
    pub max_rounds: Option<u64>,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LossInput {
    pub model: Option<String>,
    pub probability: Option<f64>,
    pub p: Option<f64>,
    pub r: Option<f64>,
    pub loss_good: Option<f64>,
    pub loss_bad: Option<f64>,
}

/// A resolved scenario: shared run parameters plus the disciplines to run.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub version: u32,
    pub base: SimulationConfig,
    pub disciplines: Vec<Discipline>,
    pub loss: LossModelConfig,
}

impl Default for Scenario {
    fn default() -> Self {
        Scenario {
            version: CONFIG_VERSION,
            base: SimulationConfig::default(),
            disciplines: Discipline::ALL.to_vec(),
            loss: LossModelConfig::default(),
        }
    }
}

impl ScenarioInput {
    pub fn resolve(self) -> Result<Scenario> {
        let version = if self.version == 0 {
            CONFIG_VERSION
        } else {
            self.version
        };
        if version != CONFIG_VERSION {
            return Err(ArqError::UnsupportedVersion(version));
        }

        let sim = self.simulation;
        let disciplines = match sim.discipline.as_deref() {
            None => Discipline::ALL.to_vec(),
            Some("both") | Some("all") => Discipline::ALL.to_vec(),
            Some(name) => vec![name.parse()?],
        };

        let base = SimulationConfig {
            total_frames: sim.total_frames.unwrap_or(DEFAULT_TOTAL_FRAMES),
            window_size: sim.window_size.unwrap_or(DEFAULT_WINDOW_SIZE),
            discipline: disciplines[0],
            loss_probability: self.loss.probability.unwrap_or(DEFAULT_LOSS_PROBABILITY),
            max_rounds: sim.max_rounds,
            seed: sim.seed,
        };
        base.validate()?;

        let loss = match self.loss.model.as_deref().map(str::trim) {
            None | Some("bernoulli") => LossModelConfig::Bernoulli,
            Some("gilbert-elliott") | Some("gilbert_elliott") | Some("burst") => {
                let defaults = GilbertElliottParams::default();
                let params = GilbertElliottParams {
                    p: self.loss.p.unwrap_or(defaults.p),
                    r: self.loss.r.unwrap_or(defaults.r),
                    loss_good: self.loss.loss_good.unwrap_or(defaults.loss_good),
                    loss_bad: self.loss.loss_bad.unwrap_or(defaults.loss_bad),
                };
                // Fail at load time rather than when the first run starts.
                GilbertElliottLoss::new(params, Some(0))?;
                LossModelConfig::GilbertElliott(params)
            }
            Some(other) => return Err(ArqError::UnknownLossModel(other.to_string())),
        };

        Ok(Scenario {
            version,
            base,
            disciplines,
            loss,
        })
    }
}

impl Scenario {
    pub fn from_toml_str(input: &str) -> Result<Self> {
        if input.trim().is_empty() {
            return Ok(Scenario::default());
        }
        let parsed: ScenarioInput = toml::from_str(input)?;
        parsed.resolve()
    }

    /// Run parameters for one discipline of this scenario.
    pub fn config_for(&self, discipline: Discipline) -> SimulationConfig {
        SimulationConfig {
            discipline,
            ..self.base.clone()
        }
    }
}
