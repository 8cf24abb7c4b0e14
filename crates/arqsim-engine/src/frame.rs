//! # Frame Table
//!
//! Per-frame delivery status for the whole sequence space `[0, N)`.
//! Single writer: the engine that owns it.

use serde::Serialize;

use crate::error::{ArqError, Result};

/// Delivery state of one frame. Loss is not a state: a lost frame simply
/// goes back to `Pending` once its round is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameStatus {
    Pending,
    InFlight,
    Acknowledged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frame {
    pub sequence: u64,
    pub status: FrameStatus,
    /// Times this frame has been put on the channel.
    pub transmissions: u32,
}

impl Frame {
    fn new(sequence: u64) -> Self {
        Frame {
            sequence,
            status: FrameStatus::Pending,
            transmissions: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FrameTable {
    frames: Vec<Frame>,
    acknowledged: u64,
}

impl FrameTable {
    /// Create `total` frames, all `Pending`.
    pub fn new(total: u64) -> Self {
        FrameTable {
            frames: (0..total).map(Frame::new).collect(),
            acknowledged: 0,
        }
    }

    pub fn len(&self) -> u64 {
        self.frames.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    fn slot_mut(&mut self, seq: u64) -> Result<&mut Frame> {
        let total = self.len();
        usize::try_from(seq)
            .ok()
            .and_then(|i| self.frames.get_mut(i))
            .ok_or(ArqError::SequenceOutOfRange { seq, total })
    }

    pub fn frame(&self, seq: u64) -> Option<&Frame> {
        usize::try_from(seq).ok().and_then(|i| self.frames.get(i))
    }

    pub fn status(&self, seq: u64) -> Option<FrameStatus> {
        self.frame(seq).map(|f| f.status)
    }

    /// Put a frame on the channel. Acknowledged frames are never resent.
    pub fn mark_in_flight(&mut self, seq: u64) -> Result<()> {
        let frame = self.slot_mut(seq)?;
        if frame.status == FrameStatus::Acknowledged {
            return Err(ArqError::AlreadyAcknowledged { seq });
        }
        frame.status = FrameStatus::InFlight;
        frame.transmissions += 1;
        Ok(())
    }

    /// Acknowledge a frame. Returns `true` if it was not acknowledged before;
    /// acknowledging twice is a no-op.
    pub fn mark_acknowledged(&mut self, seq: u64) -> Result<bool> {
        let frame = self.slot_mut(seq)?;
        if frame.status == FrameStatus::Acknowledged {
            return Ok(false);
        }
        frame.status = FrameStatus::Acknowledged;
        self.acknowledged += 1;
        Ok(true)
    }

    /// Return an unacknowledged frame to `Pending` after its round.
    pub fn mark_pending(&mut self, seq: u64) -> Result<()> {
        let frame = self.slot_mut(seq)?;
        if frame.status != FrameStatus::Acknowledged {
            frame.status = FrameStatus::Pending;
        }
        Ok(())
    }

    pub fn is_acknowledged(&self, seq: u64) -> bool {
        self.status(seq) == Some(FrameStatus::Acknowledged)
    }

    /// Whether every frame in `[lo, hi)` is acknowledged. `hi` is clamped to
    /// the table size; an empty range is trivially acknowledged.
    pub fn all_acknowledged_in_range(&self, lo: u64, hi: u64) -> bool {
        let hi = hi.min(self.len());
        (lo..hi).all(|seq| self.is_acknowledged(seq))
    }

    pub fn acknowledged_count(&self) -> u64 {
        self.acknowledged
    }

    pub fn iter(&self) -> impl Iterator<Item = &Frame> + '_ {
        self.frames.iter()
    }
}
