//! Runs every discipline of a scenario side by side.
//!
//! Each simulation gets its own thread and owns its engine outright; the
//! only shared thing is the event channel back to the caller's thread.

use anyhow::{anyhow, Result};
use arqsim_engine::config::{Discipline, Scenario};
use arqsim_engine::engine::{ArqEngine, RunOutcome};
use arqsim_engine::event::{ChannelSink, Event};

/// Run the scenario, calling `on_event` on the current thread for every
/// event as it arrives. Outcomes come back in scenario order.
pub fn run_scenario<F>(scenario: &Scenario, mut on_event: F) -> Result<Vec<RunOutcome>>
where
    F: FnMut(Discipline, &Event) -> Result<()>,
{
    let (tx, rx) = crossbeam_channel::unbounded::<(Discipline, Event)>();

    let mut handles = Vec::with_capacity(scenario.disciplines.len());
    for &discipline in &scenario.disciplines {
        let config = scenario.config_for(discipline);
        let loss = scenario.loss.build(&config)?;
        let mut sink = ChannelSink::new(discipline, tx.clone());

        tracing::info!(
            %discipline,
            frames = config.total_frames,
            window = config.window_size,
            loss = config.loss_probability,
            seed = ?config.seed,
            "starting simulation"
        );

        let handle = std::thread::Builder::new()
            .name(format!("arq-{}", discipline.short_name()))
            .spawn(move || -> arqsim_engine::error::Result<RunOutcome> {
                let mut engine = ArqEngine::new(config, loss)?;
                // Stepped a round at a time so a dropped receiver stops the run.
                while !engine.state().is_terminal() && !sink.is_disconnected() {
                    engine.run_for(1, &mut sink)?;
                }
                Ok(engine.outcome())
            })?;
        handles.push(handle);
    }
    drop(tx);

    // Ends once every simulation thread has dropped its sender.
    let mut failed = None;
    for (discipline, event) in rx.iter() {
        if let Err(e) = on_event(discipline, &event) {
            failed = Some(e);
            break;
        }
    }

    if let Some(err) = failed {
        drop(rx);
        for handle in handles {
            let _ = handle.join();
        }
        return Err(err);
    }

    let mut outcomes = Vec::with_capacity(handles.len());
    for handle in handles {
        let outcome = handle
            .join()
            .map_err(|_| anyhow!("simulation thread panicked"))??;
        outcomes.push(outcome);
    }
    Ok(outcomes)
}
