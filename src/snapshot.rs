//! Read-only views of engine state, handed to whatever renders or reports on a run.

use glam::DVec2;

use crate::error::DegenerateState;

#[derive(Debug, Clone)]
pub struct SphSnapshot {
    pub step: usize,
    pub time: f64,
    pub posits: Vec<DVec2>,
    pub vels: Vec<DVec2>,
    pub densities: Vec<f64>,
    pub pressures: Vec<f64>,
    /// Set when a density in this snapshot is zero or non-finite.
    pub anomaly: Option<DegenerateState>,
}

/// Macroscopic fields on the (ny, nx) grid, row-major: index `y * nx + x`.
#[derive(Debug, Clone)]
pub struct LbmSnapshot {
    pub step: usize,
    pub nx: usize,
    pub ny: usize,
    pub rho: Vec<f64>,
    pub ux: Vec<f64>,
    pub uy: Vec<f64>,
    /// Plate cells. Their velocities are not meaningful flow values.
    pub obstacle: Vec<bool>,
    pub anomaly: Option<DegenerateState>,
}

impl LbmSnapshot {
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.nx + x
    }

    /// Velocity magnitude per cell, zero on plate cells.
    pub fn speed(&self) -> Vec<f64> {
        (0..self.rho.len())
            .map(|i| {
                if self.obstacle[i] {
                    0.
                } else {
                    self.ux[i].hypot(self.uy[i])
                }
            })
            .collect()
    }
}
