//! D2Q9 velocity set, and the initial populations.
//!
//! Direction order:
//! ```text
//!   8   1   2
//!    \  |  /
//!   7 - 0 - 3
//!    /  |  \
//!   6   5   4
//! ```

use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::StandardNormal;

pub const Q: usize = 9;

/// Discrete velocities: [cx, cy]
pub const C: [[i32; 2]; Q] = [
    [0, 0],
    [0, 1],
    [1, 1],
    [1, 0],
    [1, -1],
    [0, -1],
    [-1, -1],
    [-1, 0],
    [-1, 1],
];

pub const W: [f64; Q] = [
    4. / 9.,
    1. / 9.,
    1. / 36.,
    1. / 9.,
    1. / 36.,
    1. / 9.,
    1. / 36.,
    1. / 9.,
    1. / 36.,
];

/// Opposite direction of each entry in `C`, for bounce-back.
pub const REV: [usize; Q] = [0, 5, 6, 7, 8, 1, 2, 3, 4];

/// Lattice sound speed squared.
pub const CS_SQ: f64 = 1. / 3.;

/// The 9 populations of one cell.
pub type Cell = [f64; Q];

/// F_eq_i = ρ w_i (1 + 3 c·u + 9/2 (c·u)² - 3/2 u·u)
#[inline]
pub fn equilibrium(rho: f64, ux: f64, uy: f64) -> Cell {
    let uu = ux * ux + uy * uy;

    std::array::from_fn(|i| {
        let cu = C[i][0] as f64 * ux + C[i][1] as f64 * uy;
        rho * W[i] * (1. + 3. * cu + 4.5 * cu * cu - 1.5 * uu)
    })
}

/// (ρ, ux, uy) of a cell: the zeroth moment, and the first moment over ρ.
#[inline]
pub fn moments(f: &Cell) -> (f64, f64, f64) {
    let mut rho = 0.;
    let mut mx = 0.;
    let mut my = 0.;

    for (f_i, c) in f.iter().zip(C.iter()) {
        rho += f_i;
        mx += f_i * c[0] as f64;
        my += f_i * c[1] as f64;
    }

    (rho, mx / rho, my / rho)
}

/// Populations with their directions reversed.
#[inline]
pub fn reversed(f: &Cell) -> Cell {
    std::array::from_fn(|i| f[REV[i]])
}

/// Near-equilibrium initial populations for an (ny, nx) lattice, row-major.
///
/// Each cell starts at the equilibrium for `rho0` and a uniform x velocity, with each
/// population scaled by (1 + `perturbation` ξ), ξ ~ N(0, 1). Cells are then rescaled so their
/// density is exactly `rho0`.
pub fn initial_populations(
    nx: usize,
    ny: usize,
    rho0: f64,
    inflow_speed: f64,
    perturbation: f64,
    seed: u64,
) -> Vec<Cell> {
    let mut rng = StdRng::seed_from_u64(seed);
    let feq = equilibrium(rho0, inflow_speed, 0.);

    (0..nx * ny)
        .map(|_| {
            let mut f = feq;
            if perturbation != 0. {
                for f_i in &mut f {
                    let ξ: f64 = rng.sample(StandardNormal);
                    *f_i *= 1. + perturbation * ξ;
                }

                let rho: f64 = f.iter().sum();
                for f_i in &mut f {
                    *f_i *= rho0 / rho;
                }
            }
            f
        })
        .collect()
}
