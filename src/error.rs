//! Error types. Configuration faults are fatal and surface from the engine constructors;
//! degenerate numerical states are attached to snapshots instead of aborting a run.

use std::io;

use thiserror::Error;

/// Which engine a fault refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    Sph,
    Lbm,
}

impl EngineKind {
    pub fn to_str(self) -> &'static str {
        match self {
            Self::Sph => "SPH",
            Self::Lbm => "LBM",
        }
    }
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_str())
    }
}

/// Rejected before the first step.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// BGK relaxation is unstable for τ ≤ 0.5.
    #[error("relaxation time τ = {tau} must be greater than 0.5")]
    UnstableRelaxation { tau: f64 },

    /// The plate covers every particle or cell.
    #[error("{engine}: the plate leaves no fluid elements")]
    NoFluid { engine: EngineKind },

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// A particle or cell whose density is zero (or no longer finite), making the
/// pressure gradient undefined.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("{engine}: degenerate density {density} at element {index}, step {step}")]
pub struct DegenerateState {
    pub engine: EngineKind,
    /// Particle index, or flat cell index `y * nx + x`.
    pub index: usize,
    pub density: f64,
    pub step: usize,
}

/// Returns the first element whose density is zero, negative or non-finite.
pub(crate) fn find_degenerate(
    densities: &[f64],
    engine: EngineKind,
    step: usize,
) -> Option<DegenerateState> {
    densities
        .iter()
        .position(|ρ| !ρ.is_finite() || *ρ <= 0.)
        .map(|index| DegenerateState {
            engine,
            index,
            density: densities[index],
            step,
        })
}

#[derive(Debug, Error)]
pub enum FlowError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Degenerate(#[from] DegenerateState),

    #[error("config file: {0}")]
    Io(#[from] io::Error),

    #[error("config encoding: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("config decoding: {0}")]
    Decode(#[from] bincode::error::DecodeError),
}
