use crate::domain::requirements::ResourceRequirements;
use crate::domain::unit::{DataSets, UnitHandle};
use crate::domain::utils::id::UnitName;

/// Position of a node in the solver's node arena.
///
/// The arena only grows while the graph is built, so an index stays valid for the whole solve.
pub type NodeIndex = usize;

/// The synthetic group every top level unit and group belongs to.
pub const ROOT_NODE_INDEX: NodeIndex = 0;

#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Organizational bucket, identified by its dotted path prefix. Never placed.
    Group,
    /// Wraps exactly one processing unit.
    Unit(UnitHandle),
    /// A name only known from ordering hints, or a pruned unit. Placed like a unit
    /// to keep ordering transitive, but never part of the output.
    Stub,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: UnitName,
    pub kind: NodeKind,
    pub node_index: NodeIndex,

    /// Keys to the node arena. Computed once while building the graph, extended by resource edges when placed.
    pub original_dependencies: Vec<NodeIndex>,

    /// Working copy of `original_dependencies`, emptied as dependencies get placed.
    pub transient_dependencies: Vec<NodeIndex>,

    /// Unresolved names, consumed by `NodeGraph::build_dependencies`.
    pub execute_before: Vec<UnitName>,
    pub execute_after: Vec<UnitName>,

    pub requirements: ResourceRequirements,

    /// Priority the unit declared.
    pub execution_priority: i32,

    /// Highest priority of this node and of every node waiting on it.
    pub max_execution_priority: i32,

    /// Number of distinct nodes that transitively depend on this one.
    pub total_waiting_nodes: usize,

    /// Longest dependency chain leading to this node. `None` until placed.
    pub sequence_position_index: Option<usize>,

    /// Children of a group node.
    pub sub_node_indices: Vec<NodeIndex>,

    pub valid_data_sets: Option<DataSets>,
}

impl Node {
    pub fn new(name: UnitName, kind: NodeKind, node_index: NodeIndex) -> Self {
        Self {
            name,
            kind,
            node_index,
            original_dependencies: Vec::new(),
            transient_dependencies: Vec::new(),
            execute_before: Vec::new(),
            execute_after: Vec::new(),
            requirements: ResourceRequirements::new(),
            execution_priority: 0,
            max_execution_priority: 0,
            total_waiting_nodes: 0,
            sequence_position_index: None,
            sub_node_indices: Vec::new(),
            valid_data_sets: None,
        }
    }

    pub fn from_unit(unit: UnitHandle, node_index: NodeIndex) -> Self {
        let mut node = Self::new(unit.get_name(), NodeKind::Unit(unit.clone()), node_index);
        node.execute_before = unit.get_execute_before().to_vec();
        node.execute_after = unit.get_execute_after().to_vec();
        node.execution_priority = unit.get_execution_priority();
        node.max_execution_priority = node.execution_priority;
        node.valid_data_sets = unit.get_data_sets().cloned();
        unit.export_requirements(&mut node.requirements);
        node
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, NodeKind::Group)
    }

    pub fn is_unit(&self) -> bool {
        matches!(self.kind, NodeKind::Unit(_))
    }

    pub fn is_stub(&self) -> bool {
        matches!(self.kind, NodeKind::Stub)
    }

    pub fn get_unit(&self) -> Option<&UnitHandle> {
        match &self.kind {
            NodeKind::Unit(unit) => Some(unit),
            _ => None,
        }
    }

    /// Adds `dependency` to `original_dependencies` unless it is already present or refers to the node itself.
    pub fn add_dependency(&mut self, dependency: NodeIndex) -> bool {
        if dependency == self.node_index || self.original_dependencies.contains(&dependency) {
            return false;
        }
        self.original_dependencies.push(dependency);
        true
    }

    /// Turns a unit into a stub, keeping its place in the graph but dropping its body and requirements.
    pub fn demote_to_stub(&mut self) {
        self.kind = NodeKind::Stub;
        self.requirements = ResourceRequirements::new();
    }

    /// How much this node adds to the chain length of nodes placed after it. Stubs are transparent.
    pub fn sequence_weight(&self) -> usize {
        if self.is_stub() { 0 } else { 1 }
    }
}

/// Whether two units may touch the same data. Unknown data sets overlap everything.
pub fn data_sets_overlap(a: Option<&DataSets>, b: Option<&DataSets>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => !a.is_disjoint(b),
        _ => true,
    }
}
