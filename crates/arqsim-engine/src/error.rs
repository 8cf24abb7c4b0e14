//! Error type shared by every engine module.

use thiserror::Error;

/// Errors raised by the simulator.
///
/// Frame loss is never represented here: it is a modeled outcome that drives
/// retransmission, not a failure.
#[derive(Debug, Error)]
pub enum ArqError {
    #[error("total frame count must be positive")]
    InvalidTotalFrames,
    #[error("total frame count {total} exceeds the supported maximum of {max}")]
    TooManyFrames { total: u64, max: u64 },
    #[error("window size must be positive")]
    InvalidWindowSize,
    #[error("loss probability {0} is outside [0, 1]")]
    InvalidLossProbability(f64),
    #[error("max_rounds must be positive when set")]
    InvalidMaxRounds,
    #[error("unknown discipline '{0}' (expected go-back-n or selective-repeat)")]
    UnknownDiscipline(String),
    #[error("unknown loss model '{0}' (expected bernoulli or gilbert-elliott)")]
    UnknownLossModel(String),
    #[error("unsupported config version {0}")]
    UnsupportedVersion(u32),
    #[error("invalid config TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("frame {seq} is already acknowledged")]
    AlreadyAcknowledged { seq: u64 },
    #[error("sequence {seq} is outside the frame space [0, {total})")]
    SequenceOutOfRange { seq: u64, total: u64 },
}

pub type Result<T, E = ArqError> = std::result::Result<T, E>;
