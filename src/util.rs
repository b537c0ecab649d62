//! Config persistence, and small helpers for the binary.

use std::{fs, path::Path};

use bincode::{config, Decode, Encode};

use crate::{driver::Sample, error::FlowError};

/// Save a config (or any encodable value) to file.
pub fn save<T: Encode>(path: &Path, data: &T) -> Result<(), FlowError> {
    let encoded = bincode::encode_to_vec(data, config::standard())?;
    fs::write(path, encoded)?;
    Ok(())
}

/// Load a config (or any decodable value) from file.
pub fn load<T: Decode<()>>(path: &Path) -> Result<T, FlowError> {
    let bytes = fs::read(path)?;
    let (decoded, _len) = bincode::decode_from_slice(&bytes, config::standard())?;
    Ok(decoded)
}

/// (min, max) of a diagnostic over a run, e.g. `|s| s.diagnostics.pressure_difference`.
pub fn range<F>(samples: &[Sample], field: F) -> Option<(f64, f64)>
where
    F: Fn(&Sample) -> f64,
{
    samples.iter().map(field).fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((min, max)) => Some((min.min(v), max.max(v))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{Config, Integrator},
        properties::Diagnostics,
    };

    #[test]
    fn config_round_trip() {
        let mut cfg = Config::default();
        cfg.sph.integrator = Integrator::Rk4;
        cfg.sph.plate.angle_deg = -12.5;
        cfg.lbm.tau = 0.75;

        let path = std::env::temp_dir().join(format!("plate_flow_cfg_{}.cfg", std::process::id()));
        save(&path, &cfg).unwrap();
        let loaded: Config = load(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(loaded, cfg);
    }

    #[test]
    fn missing_file_is_io_error() {
        let result: Result<Config, _> = load(Path::new("/nonexistent/plate_flow.cfg"));
        assert!(matches!(result, Err(FlowError::Io(_))));
    }

    #[test]
    fn range_over_samples() {
        let samples: Vec<Sample> = [3., -1., 2.]
            .iter()
            .enumerate()
            .map(|(step, &ke)| Sample {
                step,
                diagnostics: Diagnostics {
                    kinetic_energy: ke,
                    ..Default::default()
                },
            })
            .collect();

        assert_eq!(range(&samples, |s| s.diagnostics.kinetic_energy), Some((-1., 3.)));
        assert_eq!(range(&[], |s| s.step as f64), None);
    }
}
