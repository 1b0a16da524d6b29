use serde::{Deserialize, Serialize};

/// Root of a pipeline file.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct PipelineDto {
    #[serde(default)]
    pub config: SolverConfigDto,

    pub units: Vec<UnitDto>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct SolverConfigDto {
    pub single_threaded: bool,
    pub priority_ordering: bool,

    /// External service names that tolerate concurrent writers.
    pub thread_safe_services: Vec<String>,

    pub prune_units_without_data: bool,
}

impl Default for SolverConfigDto {
    fn default() -> Self {
        Self { single_threaded: false, priority_ordering: true, thread_safe_services: Vec::new(), prune_units_without_data: false }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UnitDto {
    pub name: String,

    #[serde(default)]
    pub group: String,

    #[serde(default)]
    pub execute_before: Vec<String>,
    #[serde(default)]
    pub execute_after: Vec<String>,

    #[serde(default)]
    pub execution_priority: i32,

    #[serde(default)]
    pub requirements: Vec<AccessDto>,
    #[serde(default)]
    pub tags: Vec<TagDto>,

    /// Omitted means unknown, an empty list means the unit matches no data.
    #[serde(default)]
    pub data_sets: Option<Vec<String>>,

    #[serde(default)]
    pub allows_pruning: bool,
}

/// e.g. `{ "category": "fields", "access": "write", "resource": "Transform" }`
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AccessDto {
    pub category: String,
    pub access: String,
    pub resource: String,
}

/// e.g. `{ "requirement": "none", "tag": "Dead" }`
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TagDto {
    pub requirement: String,
    pub tag: String,
}
