//! # arqsim
//!
//! Simulates reliable transfer over a lossy channel with Go-Back-N and
//! Selective Repeat, side by side.
//!
//! ## Usage
//!
//! ```bash
//! # Classic setup: 5 frames, window 3, 30% loss, both disciplines
//! arqsim
//!
//! # Reproducible run
//! arqsim --frames 20 --window 4 --loss 0.2 --seed 42
//!
//! # Bounded run on a hostile channel
//! arqsim --loss 0.9 --max-rounds 500
//!
//! # Machine-readable event stream
//! arqsim --discipline sr --json
//! ```

use std::io::Write;

use arqsim_cli::args::Cli;
use arqsim_cli::render::{event_json, render_summary, summary_json, BlockBuffer};
use arqsim_cli::runner::run_scenario;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    // ── Logging ─────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact()
        .init();

    // ── Parse CLI ───────────────────────────────────────────────
    let args = Cli::parse();
    let scenario = args.scenario()?;

    tracing::info!(
        frames = scenario.base.total_frames,
        window = scenario.base.window_size,
        loss = scenario.base.loss_probability,
        disciplines = ?scenario.disciplines,
        max_rounds = ?scenario.base.max_rounds,
        "arqsim starting"
    );

    // ── Run ─────────────────────────────────────────────────────
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut blocks = BlockBuffer::new();

    let outcomes = run_scenario(&scenario, |discipline, event| {
        if args.json {
            writeln!(out, "{}", event_json(discipline, event)?)?;
        } else if let Some(block) = blocks.push(discipline, event) {
            writeln!(out, "{block}")?;
        }
        Ok(())
    })?;

    // ── Summary ─────────────────────────────────────────────────
    if !args.json {
        writeln!(out, "Summary:")?;
    }
    for outcome in &outcomes {
        if args.json {
            writeln!(out, "{}", summary_json(outcome)?)?;
        } else {
            writeln!(out, "  {}", render_summary(outcome))?;
        }
    }
    out.flush()?;

    let gave_up = outcomes.iter().filter(|o| !o.converged()).count();
    if gave_up > 0 {
        tracing::warn!(gave_up, "some simulations hit the round limit");
    }

    Ok(())
}
