//! Creates the initial particle distribution: a square lattice filling the domain, minus the
//! particles the plate occupies.

use glam::DVec2;

use crate::plate::Plate;

/// Lattice points with spacing `dp`, offset by half a spacing from the domain edges, so the
/// lattice tiles periodically.
pub fn make_lattice(width: f64, height: f64, dp: f64) -> Vec<DVec2> {
    let nx = (width / dp).floor() as usize;
    let ny = (height / dp).floor() as usize;

    let mut result = Vec::with_capacity(nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            result.push(DVec2::new(
                (i as f64 + 0.5) * dp,
                (j as f64 + 0.5) * dp,
            ));
        }
    }

    result
}

/// Remove particles inside the plate body. Returns the number removed.
pub fn carve_out(posits: &mut Vec<DVec2>, plate: &Plate) -> usize {
    let before = posits.len();
    posits.retain(|p| !plate.contains(*p));
    before - posits.len()
}
