//! Occultation search over a time interval, for targets in uniform linear
//! motion.

use crate::ellipsoid::Ellipsoid;
use crate::occult::{Occultation, occultation};
use crate::{Error, Result};
use itertools::Itertools;
use nalgebra::Vector3;
use rayon::prelude::*;
use tracing::{debug, trace};

/// A target moving with constant velocity: at time `t`, its center is
/// displaced by `velocity * t` from the center of `body`.
#[derive(Debug, Clone, PartialEq)]
pub struct MovingEllipsoid {
    pub body: Ellipsoid,
    pub velocity: Vector3<f64>,
}

impl MovingEllipsoid {
    pub fn new(body: Ellipsoid, velocity: Vector3<f64>) -> Self {
        Self { body, velocity }
    }

    pub fn stationary(body: Ellipsoid) -> Self {
        Self::new(body, Vector3::zeros())
    }

    /// Position of the target at time `t`.
    pub fn at(&self, t: f64) -> Ellipsoid {
        self.body.translated(&(self.velocity * t))
    }
}

/// Interval over which the occultation state is constant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OccultationWindow {
    pub start: f64,
    pub end: f64,
    pub occultation: Occultation,
}

impl OccultationWindow {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Splits `[start, end]` into windows of constant occultation state.
///
/// The state is sampled at `steps + 1` evenly spaced times, and every change
/// between neighbouring samples is located to within `tolerance` by
/// bisection. A state lasting less than one step may fall between samples
/// and be missed.
pub fn search(
    viewpoint: &Vector3<f64>,
    first: &MovingEllipsoid,
    second: &MovingEllipsoid,
    start: f64,
    end: f64,
    steps: usize,
    tolerance: f64,
) -> Result<Vec<OccultationWindow>> {
    if steps == 0 {
        return Err(Error::INVALIDCOUNT(
            "Step count must be at least 1.".to_owned(),
        ));
    }
    if !(start < end) {
        return Err(Error::BADENDPOINTS(format!(
            "Search interval start {start} must be less than end {end}."
        )));
    }
    if !(tolerance > 0.0) {
        return Err(Error::INVALIDTOLERANCE(format!(
            "Tolerance {tolerance} must be positive."
        )));
    }

    let state_at = |t: f64| occultation(viewpoint, &first.at(t), &second.at(t));

    let times: Vec<f64> = (0..=steps)
        .map(|i| {
            if i == steps {
                end
            } else {
                start + (end - start) * (i as f64 / steps as f64)
            }
        })
        .collect();
    let states = times
        .par_iter()
        .map(|&t| state_at(t))
        .collect::<Result<Vec<_>>>()?;

    let changes: Vec<_> = times
        .iter()
        .copied()
        .zip(states.iter().copied())
        .tuple_windows()
        .filter(|((_, a), (_, b))| a != b)
        .collect();
    debug!(samples = times.len(), changes = changes.len(), "sampled search interval");

    let transitions = changes
        .par_iter()
        .map(|&((lo, lo_state), (hi, hi_state))| {
            locate_transitions(&state_at, lo, lo_state, hi, hi_state, tolerance)
        })
        .collect::<Result<Vec<_>>>()?;

    let mut windows = Vec::new();
    let mut current = (start, states[0]);
    for (t, state) in transitions.into_iter().flatten() {
        windows.push(OccultationWindow {
            start: current.0,
            end: t,
            occultation: current.1,
        });
        current = (t, state);
    }
    windows.push(OccultationWindow {
        start: current.0,
        end,
        occultation: current.1,
    });
    Ok(windows)
}

/// Every change of state in `[lo, hi]`, as the time of the change and the new
/// state, given the states at both ends.
fn locate_transitions(
    state_at: &(impl Fn(f64) -> Result<Occultation> + Sync),
    mut lo: f64,
    mut lo_state: Occultation,
    hi: f64,
    hi_state: Occultation,
    tolerance: f64,
) -> Result<Vec<(f64, Occultation)>> {
    let mut found = Vec::new();
    while lo_state != hi_state {
        let (mut a, mut b, mut b_state) = (lo, hi, hi_state);
        while b - a > tolerance {
            let mid = 0.5 * (a + b);
            if mid <= a || mid >= b {
                break;
            }
            let state = state_at(mid)?;
            if state == lo_state {
                a = mid;
            } else {
                b = mid;
                b_state = state;
            }
        }
        trace!(time = b, from = lo_state.code(), to = b_state.code(), "state change");
        found.push((b, b_state));
        lo = b;
        lo_state = b_state;
    }
    Ok(found)
}
