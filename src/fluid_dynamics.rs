//! Smoothed-particle hydrodynamics: density estimation, the equation of state, and the pairwise
//! pressure-gradient acceleration.
//!
//! All sums run over every particle pair. The outer loop (over particles acted on) is split across
//! threads with Rayon; each inner sum is sequential, so results don't depend on thread count.

use glam::DVec2;
use rayon::prelude::*;

use crate::kernel;

/// Guards the unit direction for coincident particles. With r = 0 the numerator is the zero
/// vector, so the direction is zero as well.
pub const DIR_EPS: f64 = 1e-3;

/// Per-particle density and pressure, recomputed from positions every evaluation.
#[derive(Debug, Clone, Default)]
pub struct DensityPressure {
    pub density: Vec<f64>,
    pub pressure: Vec<f64>,
}

impl DensityPressure {
    pub fn new(posits: &[DVec2], mass: f64, h: f64, rest_density: f64, k_eos: f64) -> Self {
        let density = compute_density(posits, mass, h);
        let pressure = compute_pressure(&density, rest_density, k_eos);
        Self { density, pressure }
    }
}

/// ρ_i = m Σ_j W(|x_i - x_j|, h), including the self term.
pub fn compute_density(posits: &[DVec2], mass: f64, h: f64) -> Vec<f64> {
    posits
        .par_iter()
        .map(|posit_i| {
            let w_sum: f64 = posits
                .iter()
                .map(|posit_j| kernel::w((*posit_i - *posit_j).length(), h))
                .sum();
            mass * w_sum
        })
        .collect()
}

/// Linear equation of state: p = k (ρ - ρ_0).
pub fn compute_pressure(density: &[f64], rest_density: f64, k_eos: f64) -> Vec<f64> {
    density.iter().map(|ρ| k_eos * (ρ - rest_density)).collect()
}

/// a_i = -m Σ_j (p_i/ρ_i² + p_j/ρ_j²) dW/dr r̂_ij
///
/// Antisymmetric under i ↔ j, so the total of the returned accelerations is zero up to rounding.
/// `_vels` is unused by the pressure term.
pub fn pressure_accel(
    posits: &[DVec2],
    _vels: &[DVec2],
    density: &[f64],
    pressure: &[f64],
    mass: f64,
    h: f64,
) -> Vec<DVec2> {
    // p / ρ², per particle.
    let p_over_rho_sq: Vec<f64> = pressure
        .iter()
        .zip(density)
        .map(|(p, ρ)| p / ρ.powi(2))
        .collect();

    posits
        .par_iter()
        .enumerate()
        .map(|(i, posit_i)| {
            let mut acc = DVec2::ZERO;

            for (j, posit_j) in posits.iter().enumerate() {
                let diff = *posit_i - *posit_j;
                let r = diff.length();
                let dir = diff / (r + DIR_EPS);

                acc += (p_over_rho_sq[i] + p_over_rho_sq[j]) * kernel::dw_dr(r, h) * dir;
            }

            -mass * acc
        })
        .collect()
}
