//! Plate geometry, and its local frame. Shared by the SPH carve-out and obstacle force, and by
//! the LBM obstacle mask.

use glam::DVec2;

use crate::config::PlateConfig;

/// A plate resolved against a domain. Immutable for the duration of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plate {
    pub center: DVec2,
    pub length: f64,
    pub thickness: f64,
    /// Radians, counter-clockwise.
    pub angle: f64,
}

impl Plate {
    pub fn new(center: DVec2, length: f64, thickness: f64, angle: f64) -> Self {
        Self {
            center,
            length,
            thickness,
            angle,
        }
    }

    /// Place the plate in a domain of the given size; `cfg.center` is a fraction of it.
    pub fn from_config(cfg: &PlateConfig, width: f64, height: f64) -> Self {
        Self::new(
            DVec2::new(cfg.center.0 * width, cfg.center.1 * height),
            cfg.length,
            cfg.thickness,
            cfg.angle_deg.to_radians(),
        )
    }

    /// Unit vector along the plate.
    pub fn axis(&self) -> DVec2 {
        DVec2::new(self.angle.cos(), self.angle.sin())
    }

    /// Unit normal; the axis rotated by +90°.
    pub fn normal(&self) -> DVec2 {
        DVec2::new(-self.angle.sin(), self.angle.cos())
    }

    /// (p, d): position projected along the plate axis and along its normal.
    #[inline]
    pub fn project(&self, posit: DVec2) -> (f64, f64) {
        let rel = posit - self.center;
        (rel.dot(self.axis()), rel.dot(self.normal()))
    }

    /// Strictly inside the plate body. Used to carve particles out at start-up.
    pub fn contains(&self, posit: DVec2) -> bool {
        let (p, d) = self.project(posit);
        p.abs() < self.length / 2. && d.abs() < self.thickness / 2.
    }

    /// Boolean grid of shape (ny, nx), row-major, marking cells the plate occupies. Cell (x, y)
    /// sits at integer coordinates; the boundary is inclusive.
    pub fn mask(&self, nx: usize, ny: usize) -> Vec<bool> {
        let half_l = self.length / 2.;
        let half_t = self.thickness / 2.;

        // A zero-length plate has no footprint even on the cell under its center.
        if self.length <= 0. {
            return vec![false; nx * ny];
        }

        let mut result = Vec::with_capacity(nx * ny);
        for y in 0..ny {
            for x in 0..nx {
                let (p, d) = self.project(DVec2::new(x as f64, y as f64));
                result.push(p.abs() <= half_l && d.abs() <= half_t);
            }
        }

        result
    }

    /// True where a point lies within `band` of the plate surface, over the plate's length.
    pub fn in_band(&self, posit: DVec2, band: f64) -> bool {
        let (p, d) = self.project(posit);
        p.abs() < self.length / 2. && d.abs() < self.thickness / 2. + band
    }
}
