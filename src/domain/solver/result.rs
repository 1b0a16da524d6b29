use std::collections::BTreeMap;

use crate::domain::solver::cycle::DependencyCycle;
use crate::domain::unit::UnitHandle;
use crate::domain::utils::id::UnitName;

/// One placed unit.
#[derive(Debug, Clone)]
pub struct OrderedUnit {
    pub name: UnitName,
    pub unit: UnitHandle,

    /// Units that have to complete before this one may start, in the order the edges were found.
    pub dependencies: Vec<UnitName>,

    /// Longest dependency chain leading to this unit. Units sharing a position form a wave.
    pub sequence_position: usize,
}

/// An ordering hint that named neither a unit nor a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingDependency {
    pub name: UnitName,
    pub declared_by: UnitName,
}

/// An edge the solver dropped to get out of a dependency cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokenEdge {
    pub dependent: UnitName,
    pub dependency: UnitName,
}

/// Everything the solver recovered from while solving.
#[derive(Debug, Clone, Default)]
pub struct SolveReport {
    /// Units rejected because a unit with the same name was registered first.
    pub duplicates: Vec<UnitName>,

    /// Absent or nameless entries of the input.
    pub skipped_entries: usize,

    pub dangling: Vec<DanglingDependency>,

    /// Every distinct cycle detected in this solve.
    pub cycles: Vec<DependencyCycle>,

    /// The subset of `cycles` logged by this solve; cycles already reported through the same cache are left out.
    pub reported_cycles: Vec<DependencyCycle>,

    pub broken_edges: Vec<BrokenEdge>,

    /// Units left out of the result because they match no data.
    pub pruned: Vec<UnitName>,
}

impl SolveReport {
    pub fn is_clean(&self) -> bool {
        self.duplicates.is_empty() && self.skipped_entries == 0 && self.dangling.is_empty() && self.cycles.is_empty() && self.broken_edges.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct SolverResult {
    pub order: Vec<OrderedUnit>,
    pub report: SolveReport,

    /// Whether the order was computed for sequential execution.
    pub single_threaded: bool,
}

impl SolverResult {
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(|entry| entry.name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&OrderedUnit> {
        self.order.iter().find(|entry| entry.name == name)
    }

    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.order.iter().position(|entry| entry.name == name)
    }

    /// Dependency names of `name`, empty if the unit is not part of the result.
    pub fn dependencies_of(&self, name: &str) -> Vec<&str> {
        self.get(name).map(|entry| entry.dependencies.iter().map(UnitName::as_str).collect()).unwrap_or_default()
    }

    /// Groups the placed units by sequence position. Units of one wave never depend on each other.
    pub fn waves(&self) -> Vec<Vec<&OrderedUnit>> {
        let mut waves: BTreeMap<usize, Vec<&OrderedUnit>> = BTreeMap::new();
        for entry in &self.order {
            waves.entry(entry.sequence_position).or_default().push(entry);
        }
        waves.into_values().collect()
    }
}
