//! Engine configuration and per-call resource budgets

use crate::error::{LiaError, LiaResult};
use craig_core::Params;
use std::time::{Duration, Instant};

/// Configuration of the reference prover
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiaConfig {
    /// Wall-clock limit of a single call, `None` for unlimited
    pub timeout: Option<Duration>,
    /// Maximum number of cubes explored by one case split
    pub max_cubes: usize,
    /// Maximum number of constraints alive during elimination
    pub max_constraints: usize,
    /// Maximum number of results kept by the incremental query cache,
    /// `0` disables caching
    pub max_cache_entries: usize,
}

impl Default for LiaConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            max_cubes: 10_000,
            max_constraints: 2_000,
            max_cache_entries: 1_024,
        }
    }
}

impl LiaConfig {
    /// Parameter key for the timeout in milliseconds
    pub const TIMEOUT: &'static str = "timeout";
    pub const MAX_CUBES: &'static str = "max_cubes";
    pub const MAX_CONSTRAINTS: &'static str = "max_constraints";
    pub const MAX_CACHE_ENTRIES: &'static str = "max_cache_entries";

    /// Defaults overridden by the recognised keys of `params`
    pub fn from_params(params: &Params) -> Self {
        Self::default().with_params(params)
    }

    /// Copy of `self` overridden by the recognised keys of `params`.
    /// Unknown keys and keys of the wrong type are ignored.
    pub fn with_params(&self, params: &Params) -> Self {
        let mut config = self.clone();
        if let Some(ms) = params.get_uint(Self::TIMEOUT) {
            config.timeout = (ms > 0).then(|| Duration::from_millis(ms));
        }
        if let Some(n) = params.get_uint(Self::MAX_CUBES) {
            config.max_cubes = usize::try_from(n).unwrap_or(usize::MAX);
        }
        if let Some(n) = params.get_uint(Self::MAX_CONSTRAINTS) {
            config.max_constraints = usize::try_from(n).unwrap_or(usize::MAX);
        }
        if let Some(n) = params.get_uint(Self::MAX_CACHE_ENTRIES) {
            config.max_cache_entries = usize::try_from(n).unwrap_or(usize::MAX);
        }
        config
    }
}

/// Resource accounting for one prover call
#[derive(Debug)]
pub(crate) struct Budget {
    started: Instant,
    timeout: Option<Duration>,
    max_cubes: usize,
    max_constraints: usize,
    cubes: usize,
}

impl Budget {
    pub(crate) fn new(config: &LiaConfig) -> Self {
        Self {
            started: Instant::now(),
            timeout: config.timeout,
            max_cubes: config.max_cubes,
            max_constraints: config.max_constraints,
            cubes: 0,
        }
    }

    pub(crate) fn check_deadline(&self) -> LiaResult<()> {
        match self.timeout {
            Some(limit) if self.started.elapsed() > limit => Err(LiaError::Timeout(limit)),
            _ => Ok(()),
        }
    }

    /// Account for one more complete cube
    pub(crate) fn count_cube(&mut self) -> LiaResult<()> {
        self.cubes += 1;
        if self.cubes > self.max_cubes {
            return Err(LiaError::CubeLimit(self.max_cubes));
        }
        self.check_deadline()
    }

    pub(crate) fn check_constraints(&self, live: usize) -> LiaResult<()> {
        if live > self.max_constraints {
            return Err(LiaError::ConstraintLimit(self.max_constraints));
        }
        Ok(())
    }

    pub(crate) fn cubes(&self) -> usize {
        self.cubes
    }
}
