//! The lattice Boltzmann engine: D2Q9, BGK collision, and bounce-back at plate cells.
//!
//! One step, in this order:
//! 1. Stream every population exactly one lattice link along its direction, wrapping periodically.
//! 2. Capture the post-stream populations of plate cells, with directions reversed.
//! 3. Collide every cell toward its local equilibrium.
//! 4. Restore the captured populations at plate cells, discarding what collision put there.
//!
//! Capturing between streaming and collision keeps the no-slip reflection free of relaxation at
//! wall cells.

use log::{debug, warn};
use rayon::prelude::*;

use crate::{
    config::LbmConfig,
    error::{find_degenerate, ConfigError, EngineKind},
    lattice::{self, Cell, C},
    plate::Plate,
    properties::{self, Diagnostics},
    snapshot::LbmSnapshot,
};

pub struct LbmEngine {
    pub config: LbmConfig,
    pub nx: usize,
    pub ny: usize,
    pub plate: Plate,
    /// Populations, row-major over (ny, nx).
    f: Vec<Cell>,
    /// Streaming target; swapped with `f` each step.
    f_temp: Vec<Cell>,
    /// Plate cells, as a grid.
    obstacle: Vec<bool>,
    /// Flat indices of plate cells.
    obstacle_cells: Vec<usize>,
    /// Bounce-back values captured this step, parallel to `obstacle_cells`.
    bounced: Vec<Cell>,
    step: usize,
    anomaly_reported: bool,
}

impl LbmEngine {
    pub fn new(config: LbmConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let (nx, ny) = (config.nx, config.ny);
        let plate = Plate::from_config(&config.plate, nx as f64, ny as f64);

        let obstacle = plate.mask(nx, ny);
        let obstacle_cells: Vec<usize> = obstacle
            .iter()
            .enumerate()
            .filter_map(|(i, m)| m.then_some(i))
            .collect();

        if obstacle_cells.len() == nx * ny {
            return Err(ConfigError::NoFluid {
                engine: EngineKind::Lbm,
            });
        }

        let f = lattice::initial_populations(
            nx,
            ny,
            config.rho0,
            config.inflow_speed,
            config.perturbation,
            config.seed,
        );

        debug!(
            "LBM: {nx}×{ny} lattice, {} plate cells, τ = {}",
            obstacle_cells.len(),
            config.tau
        );

        Ok(Self {
            nx,
            ny,
            plate,
            f_temp: f.clone(),
            f,
            obstacle,
            bounced: vec![[0.; lattice::Q]; obstacle_cells.len()],
            obstacle_cells,
            step: 0,
            anomaly_reported: false,
            config,
        })
    }

    pub fn steps_taken(&self) -> usize {
        self.step
    }

    pub fn populations(&self) -> &[Cell] {
        &self.f
    }

    pub fn obstacle(&self) -> &[bool] {
        &self.obstacle
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.nx + x
    }

    /// Shift each population one link along its direction, with periodic wrap on both axes.
    /// Pulls from the upstream neighbor, so every value is relocated exactly once.
    fn stream(&mut self) {
        let (nx, ny) = (self.nx as i64, self.ny as i64);
        let f = &self.f;

        self.f_temp
            .par_chunks_mut(self.nx)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, cell) in row.iter_mut().enumerate() {
                    for (i, c) in C.iter().enumerate() {
                        let x_src = (x as i64 - c[0] as i64).rem_euclid(nx);
                        let y_src = (y as i64 - c[1] as i64).rem_euclid(ny);
                        cell[i] = f[(y_src * nx + x_src) as usize][i];
                    }
                }
            });

        std::mem::swap(&mut self.f, &mut self.f_temp);
    }

    fn capture_bounce_back(&mut self) {
        for (bounced, &i) in self.bounced.iter_mut().zip(&self.obstacle_cells) {
            *bounced = lattice::reversed(&self.f[i]);
        }
    }

    /// BGK: F ← F - (F - F_eq) / τ
    fn collide(&mut self) {
        let omega = 1. / self.config.tau;

        self.f.par_iter_mut().for_each(|f| {
            let (rho, ux, uy) = lattice::moments(f);
            let feq = lattice::equilibrium(rho, ux, uy);

            for (f_i, feq_i) in f.iter_mut().zip(feq) {
                *f_i -= omega * (*f_i - feq_i);
            }
        });
    }

    fn restore_bounce_back(&mut self) {
        for (bounced, &i) in self.bounced.iter().zip(&self.obstacle_cells) {
            self.f[i] = *bounced;
        }
    }

    /// One full stream-collide cycle.
    pub fn step(&mut self) {
        self.stream();
        self.capture_bounce_back();
        self.collide();
        self.restore_bounce_back();

        self.step += 1;
    }

    pub fn advance(&mut self, n_steps: usize) -> LbmSnapshot {
        for _ in 0..n_steps {
            self.step();
        }
        self.snapshot()
    }

    /// Density and velocity per cell.
    pub fn snapshot(&mut self) -> LbmSnapshot {
        let moments: Vec<(f64, f64, f64)> = self.f.par_iter().map(lattice::moments).collect();

        let rho: Vec<f64> = moments.iter().map(|m| m.0).collect();
        let ux = moments.iter().map(|m| m.1).collect();
        let uy = moments.iter().map(|m| m.2).collect();

        let anomaly = find_degenerate(&rho, EngineKind::Lbm, self.step);
        if let Some(a) = &anomaly {
            if !self.anomaly_reported {
                warn!("{a}");
                self.anomaly_reported = true;
            }
        }

        LbmSnapshot {
            step: self.step,
            nx: self.nx,
            ny: self.ny,
            rho,
            ux,
            uy,
            obstacle: self.obstacle.clone(),
            anomaly,
        }
    }

    pub fn diagnostics(&self, snapshot: &LbmSnapshot) -> Diagnostics {
        properties::lbm_diagnostics(snapshot, &self.config, &self.plate)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::{
        config::PlateConfig,
        lattice::{equilibrium, Q},
    };

    fn open_config(nx: usize, ny: usize) -> LbmConfig {
        LbmConfig {
            nx,
            ny,
            plate: PlateConfig::none(),
            perturbation: 0.,
            inflow_speed: 0.,
            ..Default::default()
        }
    }

    fn total_mass(f: &[Cell]) -> f64 {
        f.iter().flat_map(|c| c.iter()).sum()
    }

    #[test]
    fn stream_moves_each_population_one_link() {
        let mut engine = LbmEngine::new(open_config(5, 4)).unwrap();
        for cell in engine.f.iter_mut() {
            *cell = [0.; Q];
        }
        let src = engine.index(2, 1);
        for i in 0..Q {
            engine.f[src][i] = (i + 1) as f64;
        }

        engine.stream();

        for (i, c) in C.iter().enumerate() {
            let x = (2 + c[0]).rem_euclid(5) as usize;
            let y = (1 + c[1]).rem_euclid(4) as usize;
            assert_eq!(engine.f[engine.index(x, y)][i], (i + 1) as f64);
        }
        assert_eq!(total_mass(&engine.f), 45.);
    }

    #[test]
    fn stream_wraps_periodically() {
        let mut engine = LbmEngine::new(open_config(4, 3)).unwrap();
        for cell in engine.f.iter_mut() {
            *cell = [0.; Q];
        }
        // East-moving population at the east edge, and north-east at the top-right corner.
        let east_edge = engine.index(3, 1);
        engine.f[east_edge][3] = 1.;
        let corner = engine.index(3, 2);
        engine.f[corner][2] = 2.;

        engine.stream();

        assert_eq!(engine.f[engine.index(0, 1)][3], 1.);
        assert_eq!(engine.f[engine.index(0, 0)][2], 2.);
    }

    #[test]
    fn uniform_equilibrium_is_a_fixed_point() {
        let cfg = LbmConfig {
            inflow_speed: 0.08,
            ..open_config(16, 8)
        };
        let mut engine = LbmEngine::new(cfg).unwrap();
        let before = engine.populations().to_vec();
        engine.step();

        for (a, b) in engine.populations().iter().zip(&before) {
            for i in 0..Q {
                assert_relative_eq!(a[i], b[i], max_relative = 1e-12);
            }
        }
    }

    #[test]
    fn mass_is_conserved_with_plate() {
        let cfg = LbmConfig {
            nx: 60,
            ny: 30,
            perturbation: 0.02,
            plate: PlateConfig {
                center: (0.4, 0.5),
                length: 12.,
                thickness: 2.,
                angle_deg: 20.,
            },
            ..Default::default()
        };
        let mut engine = LbmEngine::new(cfg).unwrap();
        let m0 = total_mass(engine.populations());

        engine.advance(50);

        assert_relative_eq!(total_mass(engine.populations()), m0, max_relative = 1e-12);
    }

    #[test]
    fn plate_cells_hold_reversed_post_stream_populations() {
        let cfg = LbmConfig {
            nx: 30,
            ny: 20,
            perturbation: 0.05,
            plate: PlateConfig {
                center: (0.5, 0.5),
                length: 8.,
                thickness: 2.,
                angle_deg: 0.,
            },
            ..Default::default()
        };
        let mut engine = LbmEngine::new(cfg).unwrap();
        engine.advance(3);

        let mut expected = engine.clone_populations();
        expected.stream_only();
        engine.step();

        for &i in &engine.obstacle_cells {
            assert_eq!(engine.f[i], lattice::reversed(&expected[i]));
        }
        // Fluid cells are collided.
        let fluid = engine.obstacle.iter().position(|m| !m).unwrap();
        assert_ne!(engine.f[fluid], expected[fluid]);
    }

    #[test]
    fn full_plate_is_rejected() {
        let cfg = LbmConfig {
            nx: 10,
            ny: 10,
            plate: PlateConfig {
                center: (0.5, 0.5),
                length: 100.,
                thickness: 100.,
                angle_deg: 0.,
            },
            ..Default::default()
        };
        assert!(matches!(
            LbmEngine::new(cfg),
            Err(ConfigError::NoFluid {
                engine: EngineKind::Lbm
            })
        ));
    }

    #[test]
    fn unstable_tau_is_rejected() {
        let cfg = LbmConfig {
            tau: 0.4,
            ..Default::default()
        };
        assert!(matches!(
            LbmEngine::new(cfg),
            Err(ConfigError::UnstableRelaxation { .. })
        ));
    }

    #[test]
    fn snapshot_reports_moments() {
        let cfg = LbmConfig {
            inflow_speed: 0.05,
            rho0: 2.,
            ..open_config(6, 4)
        };
        let mut engine = LbmEngine::new(cfg).unwrap();
        let snap = engine.snapshot();
        assert_eq!(snap.rho.len(), 24);
        assert_relative_eq!(snap.rho[5], 2., max_relative = 1e-14);
        assert_relative_eq!(snap.ux[5], 0.05, max_relative = 1e-12);
        assert!(snap.uy[5].abs() < 1e-14);
        assert!(snap.anomaly.is_none());
        assert_relative_eq!(snap.speed()[5], 0.05, max_relative = 1e-12);
    }

    #[test]
    fn zero_density_is_reported_not_fatal() {
        let mut engine = LbmEngine::new(open_config(4, 4)).unwrap();
        for cell in engine.f.iter_mut() {
            *cell = [0.; Q];
        }
        let snap = engine.advance(1);
        let anomaly = snap.anomaly.unwrap();
        assert_eq!(anomaly.engine, EngineKind::Lbm);
        assert_eq!(anomaly.step, 1);
    }

    /// Test helper: a bare copy of the populations that can be streamed on its own.
    struct Populations {
        f: Vec<Cell>,
        nx: usize,
        ny: usize,
    }

    impl std::ops::Index<usize> for Populations {
        type Output = Cell;

        fn index(&self, i: usize) -> &Cell {
            &self.f[i]
        }
    }

    impl Populations {
        fn stream_only(&mut self) {
            let mut out = self.f.clone();
            for y in 0..self.ny {
                for x in 0..self.nx {
                    for (i, c) in C.iter().enumerate() {
                        let xd = (x as i32 + c[0]).rem_euclid(self.nx as i32) as usize;
                        let yd = (y as i32 + c[1]).rem_euclid(self.ny as i32) as usize;
                        out[yd * self.nx + xd][i] = self.f[y * self.nx + x][i];
                    }
                }
            }
            self.f = out;
        }
    }

    impl LbmEngine {
        fn clone_populations(&self) -> Populations {
            Populations {
                f: self.f.clone(),
                nx: self.nx,
                ny: self.ny,
            }
        }
    }

    #[test]
    fn rest_start_stays_at_rest() {
        let mut engine = LbmEngine::new(open_config(8, 8)).unwrap();
        let snap = engine.advance(10);
        assert!(snap.ux.iter().chain(&snap.uy).all(|u| u.abs() < 1e-14));

        let feq = equilibrium(100., 0., 0.);
        for i in 0..Q {
            assert_relative_eq!(engine.populations()[0][i], feq[i], max_relative = 1e-12);
        }
    }
}
