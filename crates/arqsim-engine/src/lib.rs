//! # arqsim-engine
//!
//! Sliding-window ARQ simulation engine.
//!
//! Models reliable transfer of a fixed number of frames over a lossy channel
//! with a bounded window of in-flight frames, under Go-Back-N or
//! Selective-Repeat retransmission.
//!
//! ## Crate structure
//!
//! - [`loss`]: Per-attempt loss models (Bernoulli, Gilbert-Elliott, scripted)
//! - [`frame`]: Per-frame status table
//! - [`window`]: Window base/size and per-discipline acknowledgment rules
//! - [`engine`]: Round-stepping state machine
//! - [`event`]: Event stream and sinks
//! - [`config`]: Validated run parameters and TOML scenarios
//! - [`stats`]: Per-run counters
//! - [`error`]: Error type

pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod frame;
pub mod loss;
pub mod stats;
pub mod window;

pub use config::{Discipline, Scenario, SimulationConfig};
pub use engine::{ArqEngine, EngineState, RunOutcome};
pub use error::ArqError;
pub use event::{Event, EventSink};
