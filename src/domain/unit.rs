use std::collections::BTreeSet;
use std::fmt::Debug;
use std::sync::Arc;

use crate::api::pipeline_dto::UnitDto;
use crate::domain::requirements::{ResourceCatalog, ResourceCategory, ResourceRequirements, TagRequirement};
use crate::domain::utils::id::{DataSetId, UnitName};
use crate::error::{Error, Result};

/// The concrete data partitions a unit is known to operate on.
pub type DataSets = BTreeSet<DataSetId>;

/// An independently schedulable piece of work as seen by the dependency solver.
///
/// The solver never runs a unit. It only reads the declarations below and hands the
/// unit back inside the ordered result.
pub trait ProcessingUnit: Debug + Send + Sync {
    fn get_name(&self) -> UnitName;

    /// Dotted group path, e.g. `"Movement.Avoidance"`. Empty means top level.
    fn get_group(&self) -> &str {
        ""
    }

    fn get_execute_before(&self) -> &[UnitName] {
        &[]
    }

    fn get_execute_after(&self) -> &[UnitName] {
        &[]
    }

    /// Higher runs earlier among otherwise unordered units.
    fn get_execution_priority(&self) -> i32 {
        0
    }

    fn export_requirements(&self, requirements: &mut ResourceRequirements);

    /// `None` when unknown; such a unit is assumed to overlap every other unit's data.
    fn get_data_sets(&self) -> Option<&DataSets> {
        None
    }

    /// Whether the unit may be dropped from the result when it matches no data at all.
    fn allows_pruning(&self) -> bool {
        false
    }
}

pub type UnitHandle = Arc<dyn ProcessingUnit>;

/// Plain declaration of a processing unit.
///
/// Used by the pipeline loader and handy wherever units are described as data rather than code.
#[derive(Debug, Clone, Default)]
pub struct ProcessorDescriptor {
    pub name: UnitName,
    pub group: String,
    pub execute_before: Vec<UnitName>,
    pub execute_after: Vec<UnitName>,
    pub execution_priority: i32,
    pub requirements: ResourceRequirements,
    pub data_sets: Option<DataSets>,
    pub allows_pruning: bool,
}

impl ProcessorDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: UnitName::new(name), ..Default::default() }
    }

    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    pub fn before(mut self, name: impl Into<String>) -> Self {
        self.execute_before.push(UnitName::new(name));
        self
    }

    pub fn after(mut self, name: impl Into<String>) -> Self {
        self.execute_after.push(UnitName::new(name));
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.execution_priority = priority;
        self
    }

    pub fn with_requirements(mut self, requirements: ResourceRequirements) -> Self {
        self.requirements = requirements;
        self
    }

    pub fn with_data_sets<I, S>(mut self, data_sets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.data_sets = Some(data_sets.into_iter().map(DataSetId::new).collect());
        self
    }

    pub fn with_pruning(mut self, allows_pruning: bool) -> Self {
        self.allows_pruning = allows_pruning;
        self
    }

    pub fn into_handle(self) -> UnitHandle {
        Arc::new(self)
    }

    /// Builds a descriptor from its file declaration, interning resource names into `catalog`.
    pub fn from_dto(dto: UnitDto, catalog: &mut ResourceCatalog) -> Result<Self> {
        if dto.name.trim().is_empty() {
            return Err(Error::InvalidDeclaration(format!("processing unit in group '{}' has no name", dto.group)));
        }

        let mut requirements = ResourceRequirements::new();
        for access in &dto.requirements {
            let category: ResourceCategory = access.category.parse()?;
            let bit = catalog.intern(category, &access.resource);
            requirements.add_access(category, access.access.parse()?, bit)?;
        }
        for tag in &dto.tags {
            let requirement: TagRequirement = tag.requirement.parse()?;
            requirements.add_tag(requirement, catalog.intern(ResourceCategory::Tags, &tag.tag));
        }

        Ok(Self {
            name: UnitName::new(dto.name),
            group: dto.group,
            execute_before: dto.execute_before.into_iter().map(UnitName::new).collect(),
            execute_after: dto.execute_after.into_iter().map(UnitName::new).collect(),
            execution_priority: dto.execution_priority,
            requirements,
            data_sets: dto.data_sets.map(|data_sets| data_sets.into_iter().map(DataSetId::new).collect()),
            allows_pruning: dto.allows_pruning,
        })
    }
}

impl ProcessingUnit for ProcessorDescriptor {
    fn get_name(&self) -> UnitName {
        self.name.clone()
    }

    fn get_group(&self) -> &str {
        &self.group
    }

    fn get_execute_before(&self) -> &[UnitName] {
        &self.execute_before
    }

    fn get_execute_after(&self) -> &[UnitName] {
        &self.execute_after
    }

    fn get_execution_priority(&self) -> i32 {
        self.execution_priority
    }

    fn export_requirements(&self, requirements: &mut ResourceRequirements) {
        requirements.append(&self.requirements);
    }

    fn get_data_sets(&self) -> Option<&DataSets> {
        self.data_sets.as_ref()
    }

    fn allows_pruning(&self) -> bool {
        self.allows_pruning
    }
}
