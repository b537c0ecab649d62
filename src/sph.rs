//! The SPH engine. Owns the particle set, its velocities and the random source for the
//! stochastic forcing; each step mutates them in place.

use glam::DVec2;
use log::{debug, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::{
    accel::{acc_combined, AccelParams, PlateRepulsion},
    config::{Integrator, SphConfig},
    error::{find_degenerate, ConfigError, EngineKind},
    fluid_dynamics::{self, DensityPressure},
    integrate::{integrate_euler, integrate_rk4},
    particle_creation,
    plate::Plate,
    properties::{self, Diagnostics},
    snapshot::SphSnapshot,
};

pub struct SphEngine {
    pub config: SphConfig,
    pub plate: Plate,
    repulsion: PlateRepulsion,
    posits: Vec<DVec2>,
    vels: Vec<DVec2>,
    /// ρ_0: mean of the initial density field. Fixed for the run.
    rest_density: f64,
    rng: StdRng,
    step: usize,
    anomaly_reported: bool,
}

impl SphEngine {
    /// Seed the particle lattice, carve out the plate, and fix the rest density.
    pub fn new(config: SphConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let plate = Plate::from_config(&config.plate, config.width, config.height);

        let mut posits = particle_creation::make_lattice(config.width, config.height, config.spacing);
        let removed = particle_creation::carve_out(&mut posits, &plate);

        if posits.is_empty() {
            return Err(ConfigError::NoFluid {
                engine: EngineKind::Sph,
            });
        }

        let vels = vec![DVec2::new(config.inflow_speed, 0.); posits.len()];

        let density = fluid_dynamics::compute_density(&posits, config.mass, config.smoothing_length);
        let rest_density = density.iter().sum::<f64>() / density.len() as f64;

        debug!(
            "SPH: {} particles ({removed} carved out), ρ_0 = {rest_density:.5}, {:?}",
            posits.len(),
            config.integrator,
        );

        Ok(Self {
            repulsion: PlateRepulsion {
                plate,
                influence: config.plate_influence,
                stiffness: config.plate_stiffness,
            },
            plate,
            posits,
            vels,
            rest_density,
            rng: StdRng::seed_from_u64(config.seed),
            step: 0,
            anomaly_reported: false,
            config,
        })
    }

    pub fn num_particles(&self) -> usize {
        self.posits.len()
    }

    pub fn rest_density(&self) -> f64 {
        self.rest_density
    }

    pub fn steps_taken(&self) -> usize {
        self.step
    }

    pub fn time(&self) -> f64 {
        self.step as f64 * self.config.dt
    }

    pub fn posits(&self) -> &[DVec2] {
        &self.posits
    }

    pub fn vels(&self) -> &[DVec2] {
        &self.vels
    }

    /// Gaussian forcing for one step, one sample per particle per axis. Drawn sequentially so
    /// a seed gives the same sequence regardless of thread count.
    fn draw_noise(&mut self) -> Vec<DVec2> {
        let amp = self.config.noise_amplitude;
        if amp == 0. {
            return Vec::new();
        }

        (0..self.posits.len())
            .map(|_| {
                let x: f64 = self.rng.sample(StandardNormal);
                let y: f64 = self.rng.sample(StandardNormal);
                DVec2::new(x, y) * amp
            })
            .collect()
    }

    /// Advance by one step of `config.dt`.
    pub fn step(&mut self) {
        let noise = self.draw_noise();

        let params = AccelParams {
            mass: self.config.mass,
            h: self.config.smoothing_length,
            rest_density: self.rest_density,
            k_eos: self.config.k_eos,
            repulsion: Some(&self.repulsion),
            noise: &noise,
        };
        let acc = |posits: &[DVec2], vels: &[DVec2]| acc_combined(&params, posits, vels);

        let dt = self.config.dt;
        match self.config.integrator {
            Integrator::Euler => integrate_euler(
                &mut self.posits,
                &mut self.vels,
                &acc,
                dt,
                (self.config.width, self.config.height),
            ),
            Integrator::Rk4 => integrate_rk4(&mut self.posits, &mut self.vels, &acc, dt),
        }

        self.step += 1;
    }

    /// Run `n_steps` steps, then return a snapshot of the result.
    pub fn advance(&mut self, n_steps: usize) -> SphSnapshot {
        for _ in 0..n_steps {
            self.step();
        }
        self.snapshot()
    }

    /// Current state, with density and pressure recomputed from the positions.
    pub fn snapshot(&mut self) -> SphSnapshot {
        let dp = DensityPressure::new(
            &self.posits,
            self.config.mass,
            self.config.smoothing_length,
            self.rest_density,
            self.config.k_eos,
        );

        let anomaly = find_degenerate(&dp.density, EngineKind::Sph, self.step);
        if let Some(a) = &anomaly {
            if !self.anomaly_reported {
                warn!("{a}");
                self.anomaly_reported = true;
            }
        }

        SphSnapshot {
            step: self.step,
            time: self.time(),
            posits: self.posits.clone(),
            vels: self.vels.clone(),
            densities: dp.density,
            pressures: dp.pressure,
            anomaly,
        }
    }

    pub fn diagnostics(&self, snapshot: &SphSnapshot) -> Diagnostics {
        properties::sph_diagnostics(snapshot, &self.config, &self.plate)
    }
}
