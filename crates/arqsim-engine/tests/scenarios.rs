//! # Scenario tests: full runs through the public API
//!
//! Deterministic channels only (scripted loss or p = 0 / p = 1), so every
//! round's events can be asserted exactly.

use arqsim_engine::config::{Discipline, SimulationConfig};
use arqsim_engine::engine::{ArqEngine, EngineState};
use arqsim_engine::event::{Event, NullSink};
use arqsim_engine::frame::FrameStatus;
use arqsim_engine::loss::{BernoulliLoss, ScriptedLoss};

// ─── Helpers ────────────────────────────────────────────────────────────────

/// Sequences transmitted in one batch of events.
fn transmitted(events: &[Event]) -> Vec<u64> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::FrameTransmitted { seq, .. } => Some(*seq),
            _ => None,
        })
        .collect()
}

fn acknowledged(events: &[Event]) -> Vec<u64> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::FrameAcknowledged { seq } => Some(*seq),
            _ => None,
        })
        .collect()
}

fn step_collect<L: arqsim_engine::loss::LossModel>(
    engine: &mut ArqEngine<L>,
) -> (EngineState, Vec<Event>) {
    let state = engine.step().unwrap();
    (state, engine.drain_events().collect())
}

// ─── Lossless Channel ──────────────────────────────────────────────────────

#[test]
fn go_back_n_five_frames_window_three_lossless() {
    let cfg = SimulationConfig::new(5, 3, Discipline::GoBackN).with_loss_probability(0.0);
    let mut engine = ArqEngine::new(cfg, BernoulliLoss::seeded(0.0, 1).unwrap()).unwrap();

    let (state, round1) = step_collect(&mut engine);
    assert_eq!(state, EngineState::Running);
    assert_eq!(transmitted(&round1), vec![0, 1, 2]);
    assert_eq!(acknowledged(&round1), vec![0, 1, 2]);
    assert!(round1.contains(&Event::WindowAdvanced {
        old_base: 0,
        new_base: 3
    }));
    assert_eq!(engine.base(), 3);

    let (state, round2) = step_collect(&mut engine);
    assert_eq!(state, EngineState::Complete);
    assert_eq!(transmitted(&round2), vec![3, 4]);
    assert_eq!(acknowledged(&round2), vec![3, 4]);
    assert_eq!(engine.base(), 5);
    assert_eq!(
        round2.last(),
        Some(&Event::SimulationComplete { total_rounds: 2 })
    );
    assert!(!round2.iter().any(|e| matches!(e, Event::Timeout { .. })));
}

#[test]
fn lossless_rounds_equal_ceiling_for_both_disciplines() {
    for discipline in Discipline::ALL {
        for (total, window) in [(1, 1), (5, 3), (6, 3), (7, 10), (100, 7)] {
            let cfg = SimulationConfig::new(total, window, discipline)
                .with_loss_probability(0.0)
                .with_seed(9);
            let mut engine = ArqEngine::bernoulli(cfg.clone()).unwrap();
            let outcome = engine.run_to_completion(NullSink).unwrap();
            assert!(outcome.converged());
            assert_eq!(
                outcome.rounds,
                cfg.min_rounds(),
                "{discipline} N={total} W={window}"
            );
            assert_eq!(outcome.stats.transmissions, total);
            assert_eq!(outcome.stats.retransmissions, 0);
        }
    }
}

// ─── Selective Repeat ──────────────────────────────────────────────────────

#[test]
fn selective_repeat_resends_only_lost_frame() {
    let cfg = SimulationConfig::new(5, 3, Discipline::SelectiveRepeat);
    let mut engine = ArqEngine::new(cfg, ScriptedLoss::new().lose(1, 0)).unwrap();

    let (_, round1) = step_collect(&mut engine);
    assert_eq!(transmitted(&round1), vec![0, 1, 2]);
    assert_eq!(acknowledged(&round1), vec![1, 2]);
    assert!(round1.contains(&Event::FrameLost { seq: 0 }));
    assert!(round1.contains(&Event::Timeout { seq: 0 }));
    assert_eq!(engine.base(), 0, "base stalls on frame 0");
    assert_eq!(engine.frames().status(1), Some(FrameStatus::Acknowledged));
    assert_eq!(engine.frames().status(2), Some(FrameStatus::Acknowledged));

    let (_, round2) = step_collect(&mut engine);
    assert_eq!(transmitted(&round2), vec![0]);
    assert!(round2.contains(&Event::WindowAdvanced {
        old_base: 0,
        new_base: 3
    }));

    let (state, round3) = step_collect(&mut engine);
    assert_eq!(transmitted(&round3), vec![3, 4]);
    assert_eq!(state, EngineState::Complete);
}

#[test]
fn go_back_n_same_loss_resends_whole_window() {
    let cfg = SimulationConfig::new(5, 3, Discipline::GoBackN);
    let mut engine = ArqEngine::new(cfg, ScriptedLoss::new().lose(1, 0)).unwrap();

    let (_, round1) = step_collect(&mut engine);
    assert!(acknowledged(&round1).is_empty());
    assert!(round1.contains(&Event::FrameDiscarded { seq: 1 }));
    assert!(round1.contains(&Event::FrameDiscarded { seq: 2 }));
    assert_eq!(engine.base(), 0);

    let (_, round2) = step_collect(&mut engine);
    assert_eq!(transmitted(&round2), vec![0, 1, 2]);
    assert_eq!(engine.base(), 3);

    let outcome = engine.run_to_completion(NullSink).unwrap();
    assert_eq!(outcome.rounds, 3);
    assert_eq!(outcome.stats.retransmissions, 3);
}

// ─── Total Loss ────────────────────────────────────────────────────────────

#[test]
fn total_loss_never_advances() {
    for discipline in Discipline::ALL {
        let cfg = SimulationConfig::new(5, 3, discipline).with_loss_probability(1.0);
        let mut engine = ArqEngine::bernoulli(cfg).unwrap();
        let mut events = Vec::new();
        let state = engine.run_for(200, &mut events).unwrap();
        assert_eq!(state, EngineState::Running);
        assert_eq!(engine.base(), 0);
        assert_eq!(engine.round(), 200);
        assert!(!events
            .iter()
            .any(|e| matches!(e, Event::WindowAdvanced { .. } | Event::FrameAcknowledged { .. })));
    }
}

#[test]
fn total_loss_with_cap_gives_up() {
    let cfg = SimulationConfig::new(5, 3, Discipline::SelectiveRepeat)
        .with_loss_probability(1.0)
        .with_max_rounds(25);
    let mut engine = ArqEngine::bernoulli(cfg).unwrap();
    let outcome = engine.run_to_completion(NullSink).unwrap();
    assert_eq!(outcome.state, EngineState::RoundLimitReached);
    assert_eq!(outcome.rounds, 25);
    assert_eq!(outcome.stats.frames_lost, 75);
}

// ─── Determinism ───────────────────────────────────────────────────────────

#[test]
fn same_seed_same_event_stream() {
    let cfg = SimulationConfig::new(30, 4, Discipline::GoBackN)
        .with_loss_probability(0.3)
        .with_seed(1234);
    let mut a = Vec::new();
    let mut b = Vec::new();
    ArqEngine::bernoulli(cfg.clone())
        .unwrap()
        .run_to_completion(&mut a)
        .unwrap();
    ArqEngine::bernoulli(cfg).unwrap().run_to_completion(&mut b).unwrap();
    assert_eq!(a, b);
}
