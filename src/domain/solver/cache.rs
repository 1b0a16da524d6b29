use std::collections::HashSet;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::domain::requirements::ResourceRequirements;
use crate::domain::solver::config::SolverConfig;
use crate::domain::solver::cycle::CycleKey;
use crate::domain::solver::result::SolverResult;
use crate::domain::solver::solver::ProcessorDependencySolver;
use crate::domain::unit::UnitHandle;

/// Keeps the last solved order of a unit collection around between frames.
///
/// The cached order is reused as long as the units, the configuration and the data version are unchanged.
/// Cycle keys reported by any solve through the same cache are remembered, so a cycle that is still
/// present after a re-solve is not logged again.
#[derive(Debug, Default)]
pub struct DependencyCache {
    result: Option<SolverResult>,
    data_version: u64,
    fingerprint: u64,
    reported_cycles: HashSet<CycleKey>,
}

impl DependencyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash over every declaration the solver reads from `units`, plus the configuration.
    pub fn fingerprint(units: &[UnitHandle], config: &SolverConfig) -> u64 {
        let mut hasher = DefaultHasher::new();
        config.hash(&mut hasher);
        for unit in units {
            unit.get_name().hash(&mut hasher);
            unit.get_group().hash(&mut hasher);
            unit.get_execute_before().hash(&mut hasher);
            unit.get_execute_after().hash(&mut hasher);
            unit.get_execution_priority().hash(&mut hasher);
            unit.get_data_sets().hash(&mut hasher);
            unit.allows_pruning().hash(&mut hasher);

            let mut requirements = ResourceRequirements::new();
            unit.export_requirements(&mut requirements);
            requirements.hash(&mut hasher);
        }
        hasher.finish()
    }

    /// Whether the cached result still applies to `units` at `data_version`.
    pub fn is_up_to_date(&self, units: &[UnitHandle], config: &SolverConfig, data_version: u64) -> bool {
        self.result.is_some() && self.data_version == data_version && self.fingerprint == Self::fingerprint(units, config)
    }

    /// Returns the cached result, solving again first when it is missing or stale.
    pub fn resolve(&mut self, units: &[UnitHandle], config: &SolverConfig, data_version: u64) -> &SolverResult {
        let fingerprint = Self::fingerprint(units, config);
        let stale = self.result.is_none() || self.data_version != data_version || self.fingerprint != fingerprint;

        if stale {
            log::debug!("Solving {} processing units for data version {}.", units.len(), data_version);
            let solver = ProcessorDependencySolver::new(units.iter().cloned(), config.clone());
            self.data_version = data_version;
            self.fingerprint = fingerprint;
            self.result = Some(solver.solve_reporting_into(&mut self.reported_cycles));
        } else {
            log::trace!("Reusing cached order for data version {}.", data_version);
        }

        self.result.get_or_insert_with(SolverResult::default)
    }

    /// Forgets the cached result. Already reported cycles stay reported.
    pub fn invalidate(&mut self) {
        self.result = None;
    }

    pub fn get_result(&self) -> Option<&SolverResult> {
        self.result.as_ref()
    }

    pub fn get_data_version(&self) -> u64 {
        self.data_version
    }

    pub fn get_reported_cycles(&self) -> &HashSet<CycleKey> {
        &self.reported_cycles
    }
}
