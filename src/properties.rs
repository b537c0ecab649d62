//! Scalar diagnostics of a flow snapshot: a lift proxy from the pressure asymmetry around the
//! plate, kinetic energy, momentum, and mass flow through a probe band downstream of the plate.

use glam::DVec2;

use crate::{
    config::{LbmConfig, SphConfig},
    lattice::CS_SQ,
    plate::Plate,
    snapshot::{LbmSnapshot, SphSnapshot},
};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Diagnostics {
    /// Mean pressure over near-plate "bottom" elements (p_proj < 0), minus the mean over "top" ones.
    pub pressure_difference: f64,
    /// ½ Σ |v|², over elements inside the domain.
    pub kinetic_energy: f64,
    /// |Σ v|
    pub momentum: f64,
    /// Σ vx, over elements in the probe band.
    pub mass_flow: f64,
}

/// Running mean; 0 when empty.
#[derive(Default)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn add(&mut self, val: f64) {
        self.sum += val;
        self.count += 1;
    }

    fn value(&self) -> f64 {
        if self.count == 0 {
            0.
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Accumulates diagnostics one element at a time.
struct Accumulator<'a> {
    plate: &'a Plate,
    band: f64,
    probe_center: f64,
    probe_half_width: f64,
    bottom: Mean,
    top: Mean,
    total_vel: DVec2,
    kinetic_energy: f64,
    mass_flow: f64,
}

impl<'a> Accumulator<'a> {
    fn new(plate: &'a Plate, band: f64, probe_offset: f64, probe_width: f64) -> Self {
        Self {
            plate,
            band,
            probe_center: plate.center.x + probe_offset,
            probe_half_width: probe_width / 2.,
            bottom: Default::default(),
            top: Default::default(),
            total_vel: DVec2::ZERO,
            kinetic_energy: 0.,
            mass_flow: 0.,
        }
    }

    fn add(&mut self, posit: DVec2, vel: DVec2, pressure: f64, in_domain: bool) {
        if self.plate.in_band(posit, self.band) {
            let (p, _) = self.plate.project(posit);
            if p < 0. {
                self.bottom.add(pressure);
            } else {
                self.top.add(pressure);
            }
        }

        self.total_vel += vel;

        if in_domain {
            self.kinetic_energy += 0.5 * vel.length_squared();
        }

        if (posit.x - self.probe_center).abs() <= self.probe_half_width {
            self.mass_flow += vel.x;
        }
    }

    fn finish(self) -> Diagnostics {
        Diagnostics {
            pressure_difference: self.bottom.value() - self.top.value(),
            kinetic_energy: self.kinetic_energy,
            momentum: self.total_vel.length(),
            mass_flow: self.mass_flow,
        }
    }
}

/// Diagnostics over particles. Near-plate particles are those within the obstacle force band.
pub fn sph_diagnostics(snapshot: &SphSnapshot, cfg: &SphConfig, plate: &Plate) -> Diagnostics {
    let mut acc = Accumulator::new(plate, cfg.plate_influence, cfg.probe_offset, cfg.probe_width);

    for (i, (posit, vel)) in snapshot.posits.iter().zip(&snapshot.vels).enumerate() {
        let mut pressure = snapshot.pressures[i];
        if cfg.bernoulli_pressure {
            pressure += 0.5 * snapshot.densities[i] * vel.length_squared();
        }

        let in_domain = (0. ..=cfg.width).contains(&posit.x) && (0. ..=cfg.height).contains(&posit.y);

        acc.add(*posit, *vel, pressure, in_domain);
    }

    acc.finish()
}

/// Diagnostics over fluid cells; plate cells are skipped. Pressure is ρ c_s².
pub fn lbm_diagnostics(snapshot: &LbmSnapshot, cfg: &LbmConfig, plate: &Plate) -> Diagnostics {
    let mut acc = Accumulator::new(plate, cfg.near_band, cfg.probe_offset, cfg.probe_width);

    for y in 0..snapshot.ny {
        for x in 0..snapshot.nx {
            let i = snapshot.index(x, y);
            if snapshot.obstacle[i] {
                continue;
            }

            acc.add(
                DVec2::new(x as f64, y as f64),
                DVec2::new(snapshot.ux[i], snapshot.uy[i]),
                snapshot.rho[i] * CS_SQ,
                true,
            );
        }
    }

    acc.finish()
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::config::PlateConfig;

    fn sph_snapshot(posits: Vec<DVec2>, vels: Vec<DVec2>, pressures: Vec<f64>) -> SphSnapshot {
        let n = posits.len();
        SphSnapshot {
            step: 0,
            time: 0.,
            posits,
            vels,
            densities: vec![2.; n],
            pressures,
            anomaly: None,
        }
    }

    fn sph_cfg() -> SphConfig {
        SphConfig {
            width: 100.,
            height: 50.,
            plate_influence: 2.,
            probe_offset: 30.,
            probe_width: 4.,
            ..Default::default()
        }
    }

    #[test]
    fn sph_sums() {
        let plate = Plate::new(DVec2::new(20., 25.), 10., 2., 0.);
        let snap = sph_snapshot(
            vec![
                DVec2::new(17., 26.5), // Near plate, p < 0.
                DVec2::new(23., 24.),  // Near plate, p > 0.
                DVec2::new(51., 10.),  // In the probe band.
                DVec2::new(120., 10.), // Left the domain.
            ],
            vec![
                DVec2::new(1., 0.),
                DVec2::new(0., 2.),
                DVec2::new(3., 0.),
                DVec2::new(-1., 1.),
            ],
            vec![5., 2., 0., 0.],
        );

        let d = sph_diagnostics(&snap, &sph_cfg(), &plate);
        assert_abs_diff_eq!(d.pressure_difference, 3., epsilon = 1e-12);
        assert_abs_diff_eq!(d.kinetic_energy, 0.5 * (1. + 4. + 9.), epsilon = 1e-12);
        assert_abs_diff_eq!(d.momentum, DVec2::new(3., 3.).length(), epsilon = 1e-12);
        assert_abs_diff_eq!(d.mass_flow, 3., epsilon = 1e-12);
    }

    #[test]
    fn bernoulli_correction_adds_dynamic_pressure() {
        let plate = Plate::new(DVec2::new(20., 25.), 10., 2., 0.);
        let snap = sph_snapshot(
            vec![DVec2::new(17., 26.5)],
            vec![DVec2::new(3., 0.)],
            vec![1.],
        );
        let cfg = SphConfig {
            bernoulli_pressure: true,
            ..sph_cfg()
        };

        // 1 + ½ · 2 · 9
        let d = sph_diagnostics(&snap, &cfg, &plate);
        assert_abs_diff_eq!(d.pressure_difference, 10., epsilon = 1e-12);
    }

    #[test]
    fn empty_groups_count_as_zero() {
        let plate = Plate::new(DVec2::new(20., 25.), 10., 2., 0.);
        let snap = sph_snapshot(vec![DVec2::new(80., 5.)], vec![DVec2::ZERO], vec![9.]);
        let d = sph_diagnostics(&snap, &sph_cfg(), &plate);
        assert_eq!(d.pressure_difference, 0.);
    }

    #[test]
    fn lbm_uniform_flow() {
        let (nx, ny) = (20, 10);
        let cfg = LbmConfig {
            nx,
            ny,
            plate: PlateConfig::none(),
            probe_offset: 4.,
            probe_width: 1.,
            ..Default::default()
        };
        let plate = Plate::from_config(&cfg.plate, nx as f64, ny as f64);
        let n = nx * ny;
        let snap = LbmSnapshot {
            step: 0,
            nx,
            ny,
            rho: vec![3.; n],
            ux: vec![0.1; n],
            uy: vec![0.; n],
            obstacle: vec![false; n],
            anomaly: None,
        };

        let d = lbm_diagnostics(&snap, &cfg, &plate);
        assert_abs_diff_eq!(d.kinetic_energy, 0.5 * 0.01 * n as f64, epsilon = 1e-12);
        assert_abs_diff_eq!(d.momentum, 0.1 * n as f64, epsilon = 1e-10);
        // Plate center x = 6; probe spans x in [9.5, 10.5]: one column.
        assert_abs_diff_eq!(d.mass_flow, 0.1 * ny as f64, epsilon = 1e-12);
        assert_eq!(d.pressure_difference, 0.);
    }

    #[test]
    fn lbm_skips_plate_cells_and_splits_pressure() {
        let (nx, ny) = (20, 10);
        let cfg = LbmConfig {
            nx,
            ny,
            plate: PlateConfig {
                center: (0.5, 0.5),
                length: 6.,
                thickness: 0.,
                angle_deg: 0.,
            },
            near_band: 1.5,
            ..Default::default()
        };
        let plate = Plate::from_config(&cfg.plate, nx as f64, ny as f64);
        let obstacle = plate.mask(nx, ny);
        let n = nx * ny;

        // Higher density on the low-x half of the plate.
        let rho: Vec<f64> = (0..n).map(|i| if i % nx < 10 { 6. } else { 3. }).collect();
        let mut ux = vec![0.; n];
        for (i, m) in obstacle.iter().enumerate() {
            if *m {
                ux[i] = 100.;
            }
        }

        let snap = LbmSnapshot {
            step: 0,
            nx,
            ny,
            rho,
            ux,
            uy: vec![0.; n],
            obstacle,
            anomaly: None,
        };

        let d = lbm_diagnostics(&snap, &cfg, &plate);
        assert_eq!(d.kinetic_energy, 0.);
        assert_abs_diff_eq!(d.pressure_difference, (6. - 3.) * CS_SQ, epsilon = 1e-12);
    }
}
