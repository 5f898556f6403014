//! Interpolation profiling counters

use std::fmt;
use std::time::Duration;

/// Operations whose time is accounted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Interpolate,
    ComputeInterpolant,
    GetInterpolant,
    CheckInterpolant,
}

/// Call counts and cumulative wall time of one context. Read-only for
/// callers; has no effect on results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterpolationProfile {
    pub interpolate_calls: u64,
    pub compute_interpolant_calls: u64,
    pub get_interpolant_calls: u64,
    pub check_interpolant_calls: u64,
    pub prover_calls: u64,
    /// Time spent in `interpolate`, `compute_interpolant` and `get_interpolant`
    pub interpolation_time: Duration,
    /// Time spent in `check_interpolant`
    pub verification_time: Duration,
}

impl InterpolationProfile {
    pub(crate) fn record(&mut self, op: Operation, elapsed: Duration) {
        match op {
            Operation::Interpolate => self.interpolate_calls += 1,
            Operation::ComputeInterpolant => self.compute_interpolant_calls += 1,
            Operation::GetInterpolant => self.get_interpolant_calls += 1,
            Operation::CheckInterpolant => self.check_interpolant_calls += 1,
        }
        match op {
            Operation::CheckInterpolant => self.verification_time += elapsed,
            _ => self.interpolation_time += elapsed,
        }
    }

    pub(crate) fn record_prover_call(&mut self) {
        self.prover_calls += 1;
    }

    /// Number of interpolation requests of any form
    pub fn interpolation_calls(&self) -> u64 {
        self.interpolate_calls + self.compute_interpolant_calls + self.get_interpolant_calls
    }
}

impl fmt::Display for InterpolationProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "interpolation: {} call(s) in {:.3}s (interpolate {}, compute {}, get {})",
            self.interpolation_calls(),
            self.interpolation_time.as_secs_f64(),
            self.interpolate_calls,
            self.compute_interpolant_calls,
            self.get_interpolant_calls
        )?;
        writeln!(
            f,
            "verification: {} call(s) in {:.3}s",
            self.check_interpolant_calls,
            self.verification_time.as_secs_f64()
        )?;
        write!(f, "prover calls: {}", self.prover_calls)
    }
}
