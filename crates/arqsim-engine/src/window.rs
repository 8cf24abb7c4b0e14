//! # Window Controller
//!
//! Owns the sliding window (`base`, `size`) and the per-discipline rules
//! for turning a round's deliveries into acknowledgments.
//!
//! ## Rules
//!
//! - **Go-Back-N**: the receiver only accepts the next expected frame. A
//!   delivered frame after the first gap is discarded and must be resent.
//! - **Selective-Repeat**: every delivered frame is acknowledged on its own.
//!
//! In both cases `base` moves across the longest contiguous acknowledged
//! prefix starting at the old base, and never moves backwards.

use crate::config::Discipline;
use crate::error::Result;
use crate::frame::FrameTable;

/// What the acknowledgment rule did with one round's deliveries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AckOutcome {
    /// Newly acknowledged sequences, ascending.
    pub acknowledged: Vec<u64>,
    /// Delivered but thrown away by an in-order receiver, ascending.
    pub discarded: Vec<u64>,
}

#[derive(Debug, Clone)]
pub struct WindowController {
    base: u64,
    size: u64,
    total: u64,
}

impl WindowController {
    pub fn new(size: u64, total: u64) -> Self {
        WindowController {
            base: 0,
            size,
            total,
        }
    }

    pub fn base(&self) -> u64 {
        self.base
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Exclusive upper edge of the window, clamped to the frame space.
    pub fn window_end(&self) -> u64 {
        self.base.saturating_add(self.size).min(self.total)
    }

    pub fn is_complete(&self) -> bool {
        self.base == self.total
    }

    /// Sequences to transmit this round: inside the window and not yet
    /// acknowledged.
    pub fn eligible(&self, frames: &FrameTable) -> Vec<u64> {
        (self.base..self.window_end())
            .filter(|&seq| !frames.is_acknowledged(seq))
            .collect()
    }

    /// Apply the discipline's acknowledgment rule to the sequences delivered
    /// this round. `delivered` must be ascending.
    pub fn acknowledge(
        &self,
        discipline: Discipline,
        frames: &mut FrameTable,
        delivered: &[u64],
    ) -> Result<AckOutcome> {
        let mut outcome = AckOutcome::default();

        match discipline {
            Discipline::GoBackN => {
                let mut expected = self.base;
                for &seq in delivered {
                    while expected < seq && frames.is_acknowledged(expected) {
                        expected += 1;
                    }
                    if seq == expected {
                        if frames.mark_acknowledged(seq)? {
                            outcome.acknowledged.push(seq);
                        }
                        expected += 1;
                    } else {
                        outcome.discarded.push(seq);
                    }
                }
            }
            Discipline::SelectiveRepeat => {
                for &seq in delivered {
                    if frames.mark_acknowledged(seq)? {
                        outcome.acknowledged.push(seq);
                    }
                }
            }
        }

        Ok(outcome)
    }

    /// Slide `base` across the acknowledged prefix. Returns `(old, new)` if
    /// it moved.
    pub fn advance(&mut self, frames: &FrameTable) -> Option<(u64, u64)> {
        let old = self.base;
        while self.base < self.total && frames.is_acknowledged(self.base) {
            self.base += 1;
        }
        (self.base != old).then_some((old, self.base))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eligible_clamps_to_total() {
        let frames = FrameTable::new(5);
        let mut window = WindowController::new(3, 5);
        assert_eq!(window.eligible(&frames), vec![0, 1, 2]);

        let mut frames = frames;
        for seq in 0..3 {
            frames.mark_acknowledged(seq).unwrap();
        }
        window.advance(&frames);
        assert_eq!(window.eligible(&frames), vec![3, 4]);
        assert_eq!(window.window_end(), 5);
    }

    #[test]
    fn eligible_skips_acknowledged() {
        let mut frames = FrameTable::new(5);
        frames.mark_acknowledged(1).unwrap();
        let window = WindowController::new(3, 5);
        assert_eq!(window.eligible(&frames), vec![0, 2]);
    }

    #[test]
    fn window_larger_than_space() {
        let frames = FrameTable::new(3);
        let window = WindowController::new(100, 3);
        assert_eq!(window.eligible(&frames), vec![0, 1, 2]);
        assert_eq!(window.window_end(), 3);
    }

    #[test]
    fn go_back_n_discards_after_gap() {
        let mut frames = FrameTable::new(5);
        let window = WindowController::new(4, 5);
        // 0 and 1 arrive, 2 is lost, 3 arrives out of order.
        let outcome = window
            .acknowledge(Discipline::GoBackN, &mut frames, &[0, 1, 3])
            .unwrap();
        assert_eq!(outcome.acknowledged, vec![0, 1]);
        assert_eq!(outcome.discarded, vec![3]);
        assert!(!frames.is_acknowledged(3));
    }

    #[test]
    fn go_back_n_base_lost_discards_all() {
        let mut frames = FrameTable::new(5);
        let window = WindowController::new(3, 5);
        let outcome = window
            .acknowledge(Discipline::GoBackN, &mut frames, &[1, 2])
            .unwrap();
        assert!(outcome.acknowledged.is_empty());
        assert_eq!(outcome.discarded, vec![1, 2]);
    }

    #[test]
    fn selective_repeat_acks_out_of_order() {
        let mut frames = FrameTable::new(5);
        let window = WindowController::new(3, 5);
        let outcome = window
            .acknowledge(Discipline::SelectiveRepeat, &mut frames, &[1, 2])
            .unwrap();
        assert_eq!(outcome.acknowledged, vec![1, 2]);
        assert!(outcome.discarded.is_empty());
        assert!(frames.is_acknowledged(2));
    }

    #[test]
    fn advance_over_contiguous_prefix() {
        let mut frames = FrameTable::new(6);
        let mut window = WindowController::new(3, 6);
        frames.mark_acknowledged(1).unwrap();
        frames.mark_acknowledged(2).unwrap();
        assert_eq!(window.advance(&frames), None, "stalled on frame 0");
        assert_eq!(window.base(), 0);

        frames.mark_acknowledged(0).unwrap();
        assert_eq!(window.advance(&frames), Some((0, 3)));
        assert_eq!(window.eligible(&frames), vec![3, 4, 5]);
    }

    #[test]
    fn complete_at_total() {
        let mut frames = FrameTable::new(2);
        let mut window = WindowController::new(2, 2);
        frames.mark_acknowledged(0).unwrap();
        frames.mark_acknowledged(1).unwrap();
        window.advance(&frames);
        assert!(window.is_complete());
        assert!(window.eligible(&frames).is_empty());
        assert_eq!(window.advance(&frames), None);
    }
}
