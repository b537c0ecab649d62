//! Construction parameters for both engines. Every struct here is plain data with a `Default`,
//! and can be saved or loaded with `util::save` / `util::load`.

use bincode::{Decode, Encode};

use crate::error::ConfigError;

/// Default config location, for the binary.
pub const CONFIG_FILE: &str = "plate_flow.cfg";

/// Time stepping scheme for the SPH engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode)]
pub enum Integrator {
    /// Single stage; positions wrap periodically in both axes.
    #[default]
    Euler,
    /// Classical 4-stage Runge-Kutta. No wrap: particles may leave the domain.
    Rk4,
}

/// Plate description. `center` is a fraction of the domain; lengths are in the engine's
/// own units (domain units for SPH, cells for LBM).
#[derive(Debug, Clone, Copy, PartialEq, Encode, Decode)]
pub struct PlateConfig {
    pub center: (f64, f64),
    pub length: f64,
    pub thickness: f64,
    /// Positive values rotate the plate counter-clockwise.
    pub angle_deg: f64,
}

impl Default for PlateConfig {
    fn default() -> Self {
        Self {
            center: (0.3, 0.5),
            length: 30.,
            thickness: 4.,
            angle_deg: 15.,
        }
    }
}

impl PlateConfig {
    /// A plate with no footprint: nothing is carved out, masked, or repelled.
    pub fn none() -> Self {
        Self {
            length: 0.,
            thickness: 0.,
            ..Default::default()
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(0. ..=1.).contains(&self.center.0) || !(0. ..=1.).contains(&self.center.1) {
            return Err(ConfigError::invalid(
                "plate.center",
                format!("{:?} is not a fraction of the domain", self.center),
            ));
        }
        if self.length < 0. || self.thickness < 0. {
            return Err(ConfigError::invalid(
                "plate",
                "length and thickness must be non-negative",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct SphConfig {
    /// Domain width, Lx.
    pub width: f64,
    /// Domain height, Ly.
    pub height: f64,
    /// Initial particle spacing, dp.
    pub spacing: f64,
    pub mass: f64,
    /// h. The kernel vanishes beyond 2h.
    pub smoothing_length: f64,
    /// EOS stiffness: p = k_eos (ρ - ρ_0).
    pub k_eos: f64,
    pub dt: f64,
    pub integrator: Integrator,
    pub plate: PlateConfig,
    /// h_plate: width of the repulsive band outside the plate surface.
    pub plate_influence: f64,
    /// k_plate: repulsive force at the plate surface.
    pub plate_stiffness: f64,
    /// Std dev of the Gaussian forcing added to every particle, per axis, per step.
    pub noise_amplitude: f64,
    /// Initial x velocity of every particle, Uin.
    pub inflow_speed: f64,
    pub seed: u64,
    pub num_timesteps: usize,
    /// Diagnostics are sampled once per batch.
    pub batch_size: usize,
    /// Report p + ½ρ|v|² instead of p in the pressure difference.
    pub bernoulli_pressure: bool,
    /// Mass flow probe: x offset downstream of the plate center.
    pub probe_offset: f64,
    pub probe_width: f64,
}

impl Default for SphConfig {
    fn default() -> Self {
        let spacing = 4.;

        Self {
            width: 400.,
            height: 100.,
            spacing,
            mass: 1.,
            smoothing_length: 1.3 * spacing,
            k_eos: 200.,
            dt: 0.05,
            integrator: Integrator::Euler,
            plate: PlateConfig::default(),
            plate_influence: spacing,
            plate_stiffness: 5.,
            noise_amplitude: 0.005,
            inflow_speed: 1.,
            seed: 0,
            num_timesteps: 1_000,
            batch_size: 20,
            bernoulli_pressure: false,
            probe_offset: 60.,
            probe_width: 2. * spacing,
        }
    }
}

impl SphConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("width", self.width)?;
        positive("height", self.height)?;
        positive("spacing", self.spacing)?;
        positive("mass", self.mass)?;
        positive("smoothing_length", self.smoothing_length)?;
        positive("dt", self.dt)?;
        positive("plate_influence", self.plate_influence)?;
        non_negative("k_eos", self.k_eos)?;
        non_negative("plate_stiffness", self.plate_stiffness)?;
        non_negative("noise_amplitude", self.noise_amplitude)?;
        non_negative("probe_width", self.probe_width)?;
        if self.batch_size == 0 {
            return Err(ConfigError::invalid("batch_size", "must be at least 1"));
        }
        self.plate.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct LbmConfig {
    pub nx: usize,
    pub ny: usize,
    /// Reference density, ρ_0.
    pub rho0: f64,
    /// BGK relaxation time. Must exceed 0.5.
    pub tau: f64,
    pub seed: u64,
    /// Relative amplitude of the Gaussian perturbation on the initial populations.
    pub perturbation: f64,
    /// Initial x velocity, in lattice units.
    pub inflow_speed: f64,
    pub plate: PlateConfig,
    pub num_timesteps: usize,
    pub batch_size: usize,
    /// Cells outside the plate surface counted as "near plate" for the pressure difference.
    pub near_band: f64,
    pub probe_offset: f64,
    pub probe_width: f64,
}

impl Default for LbmConfig {
    fn default() -> Self {
        Self {
            nx: 400,
            ny: 100,
            rho0: 100.,
            tau: 0.6,
            seed: 42,
            perturbation: 0.01,
            inflow_speed: 0.1,
            plate: PlateConfig::default(),
            num_timesteps: 4_000,
            batch_size: 100,
            near_band: 3.,
            probe_offset: 60.,
            probe_width: 1.,
        }
    }
}

impl LbmConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tau <= 0.5 || self.tau.is_nan() {
            return Err(ConfigError::UnstableRelaxation { tau: self.tau });
        }
        if self.nx == 0 || self.ny == 0 {
            return Err(ConfigError::invalid("nx, ny", "the lattice must have cells"));
        }
        positive("rho0", self.rho0)?;
        non_negative("perturbation", self.perturbation)?;
        non_negative("near_band", self.near_band)?;
        non_negative("probe_width", self.probe_width)?;
        if self.batch_size == 0 {
            return Err(ConfigError::invalid("batch_size", "must be at least 1"));
        }
        self.plate.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Encode, Decode)]
pub struct Config {
    pub sph: SphConfig,
    pub lbm: LbmConfig,
}

fn positive(name: &'static str, val: f64) -> Result<(), ConfigError> {
    // Written so NaN fails too.
    if val > 0. {
        Ok(())
    } else {
        Err(ConfigError::invalid(name, format!("{val} must be positive")))
    }
}

fn non_negative(name: &'static str, val: f64) -> Result<(), ConfigError> {
    if val >= 0. {
        Ok(())
    } else {
        Err(ConfigError::invalid(name, format!("{val} must not be negative")))
    }
}
