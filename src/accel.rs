//! This module contains acceleration calculations: the plate's penalty force, and the combined
//! per-particle acceleration the integrators consume.

use glam::DVec2;

use crate::{
    fluid_dynamics::{self, DensityPressure},
    plate::Plate,
};

/// Short-range repulsion from the plate. Not a no-penetration constraint; it only approximates a
/// solid wall.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlateRepulsion {
    pub plate: Plate,
    /// h_plate: the band outside the surface where the force acts.
    pub influence: f64,
    /// k_plate: force magnitude at the surface.
    pub stiffness: f64,
}

impl PlateRepulsion {
    /// Force on a particle at `posit`. Within the band, the magnitude ramps linearly from
    /// `stiffness` at the surface to 0 at `thickness / 2 + influence`, directed along the normal
    /// on the particle's side of the plate.
    pub fn force(&self, posit: DVec2) -> DVec2 {
        let (p, d) = self.plate.project(posit);
        let half_t = self.plate.thickness / 2.;

        let near = d.abs() < half_t + self.influence && p.abs() < self.plate.length / 2.;
        if !near {
            return DVec2::ZERO;
        }

        // Penetrating particles get the surface value.
        let ramp = (1. - (d.abs() - half_t) / self.influence).clamp(0., 1.);

        self.plate.normal() * (self.stiffness * ramp * d.signum())
    }

    pub fn forces(&self, posits: &[DVec2]) -> Vec<DVec2> {
        posits.iter().map(|p| self.force(*p)).collect()
    }
}

/// Inputs to the combined acceleration that stay fixed over one step.
pub struct AccelParams<'a> {
    pub mass: f64,
    pub h: f64,
    pub rest_density: f64,
    pub k_eos: f64,
    pub repulsion: Option<&'a PlateRepulsion>,
    /// Gaussian forcing for this step, one entry per particle. Empty when disabled.
    pub noise: &'a [DVec2],
}

/// f(pos, vel) → (vel, a), where a = SPH pressure acceleration + plate force / m + noise.
pub fn acc_combined(params: &AccelParams, posits: &[DVec2], vels: &[DVec2]) -> (Vec<DVec2>, Vec<DVec2>) {
    let dp = DensityPressure::new(posits, params.mass, params.h, params.rest_density, params.k_eos);

    let mut acc = fluid_dynamics::pressure_accel(
        posits,
        vels,
        &dp.density,
        &dp.pressure,
        params.mass,
        params.h,
    );

    if let Some(repulsion) = params.repulsion {
        for (a, posit) in acc.iter_mut().zip(posits) {
            *a += repulsion.force(*posit) / params.mass;
        }
    }

    for (a, n) in acc.iter_mut().zip(params.noise) {
        *a += *n;
    }

    (vels.to_vec(), acc)
}
