#![allow(non_ascii_idents)]
#![allow(mixed_script_confusables)]

//! 2D flow past an angled flat plate, using two independent methods: smoothed-particle
//! hydrodynamics (`sph`), and a D2Q9 lattice Boltzmann solver (`lbm`). Both engines own their
//! state, advance it in place, and hand out read-only snapshots from which `properties` derives
//! scalar diagnostics.

pub mod accel;
pub mod config;
pub mod driver;
pub mod error;
pub mod fluid_dynamics;
pub mod integrate;
pub mod kernel;
pub mod lattice;
pub mod lbm;
pub mod particle_creation;
pub mod plate;
pub mod properties;
pub mod snapshot;
pub mod sph;
pub mod util;

pub use config::{Config, Integrator, LbmConfig, PlateConfig, SphConfig};
pub use driver::{run, FlowEngine, RunReport, Sample};
pub use error::{ConfigError, DegenerateState, EngineKind, FlowError};
pub use lbm::LbmEngine;
pub use properties::Diagnostics;
pub use snapshot::{LbmSnapshot, SphSnapshot};
pub use sph::SphEngine;
