pub mod cache;
pub mod config;
pub mod cycle;
pub mod graph_builder;
pub mod node;
pub mod render;
pub mod resource_usage;
pub mod result;
pub mod solver;

pub use cache::DependencyCache;
pub use config::SolverConfig;
pub use cycle::{CycleKey, DependencyCycle};
pub use result::{BrokenEdge, DanglingDependency, OrderedUnit, SolveReport, SolverResult};
pub use solver::{ProcessorDependencySolver, resolve_dependencies};
