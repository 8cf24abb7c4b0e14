//! Console driver for the ARQ sliding-window simulator.
//!
//! Parses flags or a TOML scenario, runs each requested discipline on its
//! own thread, and renders the event streams as text blocks or JSON lines.

pub mod args;
pub mod render;
pub mod runner;
