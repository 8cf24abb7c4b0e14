//! Command-line parsing.
//!
//! Flags override values loaded from `--config`; anything left unset falls
//! back to the scenario defaults.

use std::path::PathBuf;

use anyhow::{Context, Result};
use arqsim_engine::config::{Discipline, Scenario};
use clap::Parser;

/// Disciplines selected with `--discipline`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisciplineSet(pub Vec<Discipline>);

fn parse_disciplines(s: &str) -> Result<DisciplineSet, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "both" | "all" => Ok(DisciplineSet(Discipline::ALL.to_vec())),
        name => name
            .parse::<Discipline>()
            .map(|d| DisciplineSet(vec![d]))
            .map_err(|e| e.to_string()),
    }
}

/// Sliding-window ARQ simulator (Go-Back-N / Selective Repeat).
#[derive(Parser, Debug, Clone, Default, PartialEq)]
#[command(
    name = "arqsim",
    version,
    about = "Sliding-window ARQ simulator (Go-Back-N / Selective Repeat)",
    after_help = "Logging goes to stderr and is filtered by RUST_LOG (e.g. info, arqsim_engine=trace)."
)]
pub struct Cli {
    /// TOML scenario file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Total frames to transfer [default: 5].
    #[arg(short = 'n', long)]
    pub frames: Option<u64>,

    /// Window size [default: 3].
    #[arg(short, long)]
    pub window: Option<u64>,

    /// Per-attempt loss probability in [0, 1] [default: 0.3].
    #[arg(short = 'p', long)]
    pub loss: Option<f64>,

    /// gbn | sr | both [default: both].
    #[arg(short, long, value_parser = parse_disciplines)]
    pub discipline: Option<DisciplineSet>,

    /// Seed for the loss model [default: random].
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Give up after this many rounds. Without a cap a channel that loses
    /// everything runs forever.
    #[arg(short, long)]
    pub max_rounds: Option<u64>,

    /// Emit events and summaries as JSON lines.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

impl Cli {
    /// Load the config file (if any), apply flag overrides and validate.
    pub fn scenario(&self) -> Result<Scenario> {
        let mut scenario = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config file {}", path.display()))?;
                Scenario::from_toml_str(&text)
                    .with_context(|| format!("parsing {}", path.display()))?
            }
            None => Scenario::default(),
        };
        self.apply(&mut scenario)?;
        Ok(scenario)
    }

    pub fn apply(&self, scenario: &mut Scenario) -> Result<()> {
        let base = &mut scenario.base;
        if let Some(frames) = self.frames {
            base.total_frames = frames;
        }
        if let Some(window) = self.window {
            base.window_size = window;
        }
        if let Some(loss) = self.loss {
            base.loss_probability = loss;
        }
        if let Some(seed) = self.seed {
            base.seed = Some(seed);
        }
        if let Some(max) = self.max_rounds {
            base.max_rounds = Some(max);
        }
        if let Some(DisciplineSet(disciplines)) = &self.discipline {
            if let Some(&first) = disciplines.first() {
                scenario.disciplines = disciplines.clone();
                scenario.base.discipline = first;
            }
        }
        scenario.base.validate()?;
        Ok(())
    }
}
