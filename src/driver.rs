//! Runs an engine for a number of steps, sampling diagnostics once per batch.

use log::{debug, warn};

use crate::{
    error::DegenerateState,
    lbm::LbmEngine,
    properties::Diagnostics,
    snapshot::{LbmSnapshot, SphSnapshot},
    sph::SphEngine,
};

/// The stepping contract both engines expose to a driver.
pub trait FlowEngine {
    type Snapshot;

    /// Advance `n_steps` steps in place, and return the resulting state.
    fn advance(&mut self, n_steps: usize) -> Self::Snapshot;

    fn diagnostics(&self, snapshot: &Self::Snapshot) -> Diagnostics;

    fn anomaly(snapshot: &Self::Snapshot) -> Option<DegenerateState>;

    fn steps_taken(&self) -> usize;
}

impl FlowEngine for SphEngine {
    type Snapshot = SphSnapshot;

    fn advance(&mut self, n_steps: usize) -> SphSnapshot {
        SphEngine::advance(self, n_steps)
    }

    fn diagnostics(&self, snapshot: &SphSnapshot) -> Diagnostics {
        SphEngine::diagnostics(self, snapshot)
    }

    fn anomaly(snapshot: &SphSnapshot) -> Option<DegenerateState> {
        snapshot.anomaly
    }

    fn steps_taken(&self) -> usize {
        SphEngine::steps_taken(self)
    }
}

impl FlowEngine for LbmEngine {
    type Snapshot = LbmSnapshot;

    fn advance(&mut self, n_steps: usize) -> LbmSnapshot {
        LbmEngine::advance(self, n_steps)
    }

    fn diagnostics(&self, snapshot: &LbmSnapshot) -> Diagnostics {
        LbmEngine::diagnostics(self, snapshot)
    }

    fn anomaly(snapshot: &LbmSnapshot) -> Option<DegenerateState> {
        snapshot.anomaly
    }

    fn steps_taken(&self) -> usize {
        LbmEngine::steps_taken(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Total steps taken when sampled.
    pub step: usize,
    pub diagnostics: Diagnostics,
}

pub struct RunReport<S> {
    pub samples: Vec<Sample>,
    /// State after the last batch run.
    pub last: Option<S>,
    pub anomaly: Option<DegenerateState>,
}

/// Advance `engine` by `num_steps`, in batches of `batch_size` (the last batch may be shorter),
/// sampling diagnostics after each. With `halt_on_anomaly`, stops after the first batch whose
/// snapshot reports a degenerate state.
pub fn run<E: FlowEngine>(
    engine: &mut E,
    num_steps: usize,
    batch_size: usize,
    halt_on_anomaly: bool,
) -> RunReport<E::Snapshot> {
    let batch_size = batch_size.max(1);

    let mut samples = Vec::with_capacity(num_steps.div_ceil(batch_size));
    let mut last = None;
    let mut anomaly = None;

    let mut remaining = num_steps;
    while remaining > 0 {
        let n = remaining.min(batch_size);
        remaining -= n;

        let snapshot = engine.advance(n);
        let diagnostics = engine.diagnostics(&snapshot);
        let step = engine.steps_taken();

        debug!(
            "step {step}: ΔP = {:.5}, KE = {:.5}, |p| = {:.5}, flow = {:.5}",
            diagnostics.pressure_difference,
            diagnostics.kinetic_energy,
            diagnostics.momentum,
            diagnostics.mass_flow
        );

        samples.push(Sample { step, diagnostics });

        let found = E::anomaly(&snapshot);
        last = Some(snapshot);

        if let Some(a) = found {
            anomaly.get_or_insert(a);
            if halt_on_anomaly {
                warn!("Halting at step {step}: {a}");
                break;
            }
        }
    }

    RunReport {
        samples,
        last,
        anomaly,
    }
}
