//! Time integration of the particle set, for one fixed step.
//!
//! The acc fn: (posits, vels) -> (d posit / dt, d vel / dt). It's evaluated over the whole set at
//! once, since every particle's acceleration depends on all others.

use glam::DVec2;

/// `base + k * s`, elementwise.
fn offset(base: &[DVec2], k: &[DVec2], s: f64) -> Vec<DVec2> {
    base.iter().zip(k).map(|(b, k)| *b + *k * s).collect()
}

/// Wrap a position into [0, width) × [0, height).
#[inline]
pub fn wrap(posit: DVec2, width: f64, height: f64) -> DVec2 {
    DVec2::new(wrap_1d(posit.x, width), wrap_1d(posit.y, height))
}

#[inline]
fn wrap_1d(v: f64, len: f64) -> f64 {
    let result = v.rem_euclid(len);
    // A tiny negative `v` rounds up to `len` itself.
    if result >= len {
        0.
    } else {
        result
    }
}

/// Semi-implicit in ordering: velocity first, then position with the new velocity. Positions are
/// wrapped periodically afterwards. One evaluation of `acc`.
pub fn integrate_euler<F>(
    posits: &mut [DVec2],
    vels: &mut [DVec2],
    acc: &F,
    dt: f64,
    domain: (f64, f64),
) where
    F: Fn(&[DVec2], &[DVec2]) -> (Vec<DVec2>, Vec<DVec2>),
{
    let (_, a) = acc(&*posits, &*vels);

    for ((posit, vel), a) in posits.iter_mut().zip(vels.iter_mut()).zip(a) {
        *vel += a * dt;
        *posit = wrap(*posit + *vel * dt, domain.0, domain.1);
    }
}

/// Compute position and velocity using RK4. No boundary handling; particles may leave the domain.
pub fn integrate_rk4<F>(posits: &mut [DVec2], vels: &mut [DVec2], acc: &F, dt: f64)
where
    F: Fn(&[DVec2], &[DVec2]) -> (Vec<DVec2>, Vec<DVec2>),
{
    // Step 1: Calculate the k-values for position and velocity
    let (k1_pos, k1_v) = acc(&*posits, &*vels);

    let (k2_pos, k2_v) = acc(
        &offset(posits, &k1_pos, dt / 2.),
        &offset(vels, &k1_v, dt / 2.),
    );

    let (k3_pos, k3_v) = acc(
        &offset(posits, &k2_pos, dt / 2.),
        &offset(vels, &k2_v, dt / 2.),
    );

    let (k4_pos, k4_v) = acc(&offset(posits, &k3_pos, dt), &offset(vels, &k3_v, dt));

    // Step 2: Update position and velocity using weighted average of k-values
    for i in 0..posits.len() {
        posits[i] += (k1_pos[i] + k2_pos[i] * 2. + k3_pos[i] * 2. + k4_pos[i]) * dt / 6.;
        vels[i] += (k1_v[i] + k2_v[i] * 2. + k3_v[i] * 2. + k4_v[i]) * dt / 6.;
    }
}
