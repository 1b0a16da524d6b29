use crate::api::pipeline_dto::PipelineDto;
use crate::domain::requirements::ResourceCatalog;
use crate::domain::solver::{ProcessorDependencySolver, SolverConfig, SolverResult};
use crate::domain::unit::{ProcessorDescriptor, UnitHandle};
use crate::error::Result;

/// A loaded pipeline: its units, the solver configuration and the names behind every resource bit.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    pub units: Vec<UnitHandle>,
    pub config: SolverConfig,
    pub catalog: ResourceCatalog,
}

impl Pipeline {
    pub fn from_dto(dto: PipelineDto) -> Result<Self> {
        let mut catalog = ResourceCatalog::new();
        let config = SolverConfig::from_dto(dto.config, &mut catalog);

        let units = dto
            .units
            .into_iter()
            .map(|unit_dto| ProcessorDescriptor::from_dto(unit_dto, &mut catalog).map(ProcessorDescriptor::into_handle))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { units, config, catalog })
    }

    pub fn solver(&self) -> ProcessorDependencySolver {
        ProcessorDependencySolver::new(self.units.iter().cloned(), self.config.clone())
    }

    pub fn solve(&self) -> SolverResult {
        self.solver().solve()
    }

    pub fn render_graph(&self) -> String {
        self.solver().render_graph(Some(&self.catalog))
    }
}
