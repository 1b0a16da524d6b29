use crate::api::pipeline_dto::SolverConfigDto;
use crate::domain::requirements::{BitSet, ExternalServices, ResourceCatalog};

/// Tunables of a single solve.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SolverConfig {
    /// Target execution is strictly sequential. Resource conflicts no longer influence the order,
    /// only declared dependencies do. Resource edges are still recorded.
    pub single_threaded: bool,

    /// Sort candidates by execution priority before waiting node count. When disabled
    /// declared priorities are ignored.
    pub priority_ordering: bool,

    /// External services that guarantee thread-safe concurrent writes. Excluded from conflict tracking.
    pub thread_safe_services: BitSet<ExternalServices>,

    /// Drop units that opted into pruning and are known to match no data.
    pub prune_units_without_data: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            single_threaded: false,
            priority_ordering: true,
            thread_safe_services: BitSet::new(),
            prune_units_without_data: false,
        }
    }
}

impl SolverConfig {
    pub fn single_threaded() -> Self {
        Self { single_threaded: true, ..Default::default() }
    }

    pub fn with_thread_safe_service(mut self, service: usize) -> Self {
        self.thread_safe_services.insert(service);
        self
    }

    pub fn with_pruning(mut self, prune_units_without_data: bool) -> Self {
        self.prune_units_without_data = prune_units_without_data;
        self
    }

    pub fn with_priority_ordering(mut self, priority_ordering: bool) -> Self {
        self.priority_ordering = priority_ordering;
        self
    }

    /// Thread-safe services are looked up by name in `catalog`, registering them when not yet known.
    pub fn from_dto(dto: SolverConfigDto, catalog: &mut ResourceCatalog) -> Self {
        Self {
            single_threaded: dto.single_threaded,
            priority_ordering: dto.priority_ordering,
            thread_safe_services: catalog.bit_set::<ExternalServices>(&dto.thread_safe_services),
            prune_units_without_data: dto.prune_units_without_data,
        }
    }
}
