use crate::api::pipeline_dto::PipelineDto;
use crate::domain::pipeline::Pipeline;
use crate::domain::solver::SolverResult;
use crate::error::Result;
use crate::loader::parser::parse_json_file;

pub mod api;
pub mod domain;
pub mod error;
pub mod loader;
pub mod logger;

pub use domain::requirements::{ResourceCatalog, ResourceCategory, ResourceRequirements};
pub use domain::solver::{DependencyCache, ProcessorDependencySolver, SolverConfig, resolve_dependencies};
pub use domain::unit::{ProcessingUnit, ProcessorDescriptor, UnitHandle};

/// Reads a pipeline file and converts it into domain units.
pub fn load_pipeline(file_path: &str) -> Result<Pipeline> {
    let root_dto: PipelineDto = parse_json_file::<PipelineDto>(file_path)?;
    log::info!("Pipeline file '{}' parsed successfully, {} units declared.", file_path, root_dto.units.len());

    let pipeline = Pipeline::from_dto(root_dto)?;
    log::info!("Catalog built, {} processing units ready.", pipeline.units.len());

    Ok(pipeline)
}

/// Loads a pipeline file and solves it with the configuration it declares.
pub fn load_and_resolve(file_path: &str) -> Result<SolverResult> {
    let pipeline = load_pipeline(file_path)?;
    Ok(pipeline.solve())
}
