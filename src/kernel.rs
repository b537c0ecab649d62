//! Cubic spline smoothing kernel, in 2D. Support radius is 2h.
//!
//! The piecewise branches are selected with 0/1 masks instead of per-element conditionals, so
//! the slice forms below compile to straight-line loops.

use std::f64::consts::PI;

/// 2D normalization constant: 10 / (7π h²).
#[inline]
pub fn sigma(h: f64) -> f64 {
    10. / (7. * PI * h.powi(2))
}

#[inline]
fn mask(cond: bool) -> f64 {
    cond as u8 as f64
}

/// Kernel weight W(r, h).
#[inline]
pub fn w(r: f64, h: f64) -> f64 {
    let q = r / h;
    let inner = mask(q < 1.);
    let outer = mask((1. ..2.).contains(&q));

    // Clamp so the unused branch stays finite for large q.
    let two_minus_q = (2. - q).max(0.);

    sigma(h) * (inner * (1. - 1.5 * q * q + 0.75 * q * q * q) + outer * 0.25 * two_minus_q.powi(3))
}

/// Radial derivative dW/dr. Negative for r > 0 inside the support.
#[inline]
pub fn dw_dr(r: f64, h: f64) -> f64 {
    let q = r / h;
    let inner = mask(q < 1.);
    let outer = mask((1. ..2.).contains(&q));

    let two_minus_q = (2. - q).max(0.);

    sigma(h) / h * (inner * (-3. * q + 2.25 * q * q) + outer * -0.75 * two_minus_q.powi(2))
}

/// W evaluated over an array of distances.
pub fn weights(r: &[f64], h: f64) -> Vec<f64> {
    r.iter().map(|&r| w(r, h)).collect()
}

/// dW/dr evaluated over an array of distances.
pub fn weight_gradients(r: &[f64], h: f64) -> Vec<f64> {
    r.iter().map(|&r| dw_dr(r, h)).collect()
}
