use std::collections::HashMap;

use crate::domain::requirements::{BitSet, ExternalServices};
use crate::domain::solver::config::SolverConfig;
use crate::domain::solver::node::{Node, NodeIndex, NodeKind, ROOT_NODE_INDEX};
use crate::domain::solver::result::{DanglingDependency, SolveReport};
use crate::domain::unit::UnitHandle;
use crate::domain::utils::id::UnitName;

const ROOT_NODE_NAME: &str = "(root)";

/// The node arena of one solve plus the name lookup used to resolve ordering hints.
#[derive(Debug)]
pub struct NodeGraph {
    pub nodes: Vec<Node>,

    /// Index lookup using unit, group or stub name.
    node_index_map: HashMap<UnitName, NodeIndex>,

    thread_safe_services: BitSet<ExternalServices>,
    prune_units_without_data: bool,

    pub report: SolveReport,
}

impl NodeGraph {
    pub fn new(config: &SolverConfig) -> Self {
        Self {
            nodes: vec![Node::new(UnitName::new(ROOT_NODE_NAME), NodeKind::Group, ROOT_NODE_INDEX)],
            node_index_map: HashMap::new(),
            thread_safe_services: config.thread_safe_services.clone(),
            prune_units_without_data: config.prune_units_without_data,
            report: SolveReport::default(),
        }
    }

    pub fn get_index(&self, name: &str) -> Option<NodeIndex> {
        self.node_index_map.get(&UnitName::new(name)).copied()
    }

    pub fn get_node(&self, name: &str) -> Option<&Node> {
        self.get_index(name).map(|index| &self.nodes[index])
    }

    /// `"A.B.C"` -> `["A", "A.B", "A.B.C"]`, empty segments skipped.
    pub fn sub_group_names(group_path: &str) -> Vec<UnitName> {
        let mut names = Vec::new();
        let mut prefix = String::new();
        for segment in group_path.split('.').map(str::trim).filter(|segment| !segment.is_empty()) {
            if !prefix.is_empty() {
                prefix.push('.');
            }
            prefix.push_str(segment);
            names.push(UnitName::new(prefix.clone()));
        }
        names
    }

    /// Adds the nodes for `unit`: one per not yet known prefix of its group path and one for the unit itself.
    ///
    /// # Returns
    /// The index of the unit's node. For a duplicate name the index registered first, which is a
    /// group when the unit is named like one of its own groups.
    pub fn create_nodes(&mut self, unit: &UnitHandle) -> NodeIndex {
        let unit_name = unit.get_name();
        if let Some(&existing_index) = self.node_index_map.get(&unit_name) {
            tracing::warn!("Processing unit '{}' is already registered. Duplicate registration is ignored.", unit_name);
            self.report.duplicates.push(unit_name);
            return existing_index;
        }

        let mut parent_index = ROOT_NODE_INDEX;
        for group_name in Self::sub_group_names(unit.get_group()) {
            let group_index = match self.node_index_map.get(&group_name) {
                Some(&index) => {
                    if !self.nodes[index].is_group() {
                        tracing::warn!("Group '{}' of '{}' shares its name with a processing unit.", group_name, unit_name);
                    }
                    index
                }
                None => {
                    let index = self.push_node(group_name, NodeKind::Group);
                    self.nodes[parent_index].sub_node_indices.push(index);
                    index
                }
            };
            parent_index = group_index;
        }

        if let Some(&group_index) = self.node_index_map.get(&unit_name) {
            tracing::warn!("Processing unit '{}' shares its name with its own group. The unit is ignored.", unit_name);
            self.report.duplicates.push(unit_name);
            return group_index;
        }

        let node_index = self.nodes.len();
        let mut node = Node::from_unit(unit.clone(), node_index);
        node.requirements.remove_external_services(&self.thread_safe_services);

        let no_data = node.valid_data_sets.as_ref().is_some_and(|data_sets| data_sets.is_empty());
        if self.prune_units_without_data && unit.allows_pruning() && no_data {
            log::debug!("Pruning '{}', it matches no data.", unit_name);
            node.demote_to_stub();
            self.report.pruned.push(unit_name.clone());
        }

        self.nodes.push(node);
        self.node_index_map.insert(unit_name, node_index);
        self.nodes[parent_index].sub_node_indices.push(node_index);
        node_index
    }

    /// Turns every `execute_before`/`execute_after` name into index based `original_dependencies`.
    ///
    /// **Phase 1:** `A before B` is rewritten as `B after A`, creating stubs for unknown names.
    /// **Phase 2:** `after` names resolve to the node itself, or to every leaf member for a group.
    /// **Phase 3:** Groups push their dependencies down onto their children, in arena order.
    ///
    /// Groups are always created after their parent group, so one pass in arena order reaches
    /// every nesting level. The arena is never reordered, which keeps the result deterministic.
    pub fn build_dependencies(&mut self) {
        // Phase 1: Transpose before into after
        let mut node_index = 0;
        while node_index < self.nodes.len() {
            let execute_before = std::mem::take(&mut self.nodes[node_index].execute_before);
            let node_name = self.nodes[node_index].name.clone();
            for dependent_name in execute_before {
                let dependent_index = self.find_or_add_stub(&dependent_name, &node_name);
                self.nodes[dependent_index].execute_after.push(node_name.clone());
            }
            node_index += 1;
        }

        // Phase 2: Resolve after names
        let mut node_index = 0;
        while node_index < self.nodes.len() {
            let execute_after = std::mem::take(&mut self.nodes[node_index].execute_after);
            let node_name = self.nodes[node_index].name.clone();
            for dependency_name in execute_after {
                let dependency_index = self.find_or_add_stub(&dependency_name, &node_name);
                if self.nodes[dependency_index].is_group() {
                    let leaves = self.collect_leaf_indices(dependency_index);
                    if leaves.is_empty() {
                        log::debug!("'{}' runs after group '{}', which has no members.", node_name, dependency_name);
                    }
                    for leaf in leaves {
                        self.nodes[node_index].add_dependency(leaf);
                    }
                } else {
                    self.nodes[node_index].add_dependency(dependency_index);
                }
            }
            node_index += 1;
        }

        // Phase 3: Push group dependencies down to the members
        for group_index in 0..self.nodes.len() {
            if !self.nodes[group_index].is_group() || self.nodes[group_index].original_dependencies.is_empty() {
                continue;
            }
            let dependencies = self.nodes[group_index].original_dependencies.clone();
            let children = self.nodes[group_index].sub_node_indices.clone();
            for child in children {
                for &dependency in &dependencies {
                    self.nodes[child].add_dependency(dependency);
                }
            }
        }

        for node in &mut self.nodes {
            node.transient_dependencies = node.original_dependencies.clone();
        }
    }

    /// All non-group nodes below `group_index`, depth first in registration order.
    pub fn collect_leaf_indices(&self, group_index: NodeIndex) -> Vec<NodeIndex> {
        let mut leaves = Vec::new();
        let mut stack = vec![group_index];
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            if !node.is_group() {
                leaves.push(index);
                continue;
            }
            stack.extend(node.sub_node_indices.iter().rev());
        }
        leaves
    }

    fn find_or_add_stub(&mut self, name: &UnitName, declared_by: &UnitName) -> NodeIndex {
        if let Some(&index) = self.node_index_map.get(name) {
            return index;
        }
        tracing::info!("Unable to find dependency '{}' declared by '{}'. Adding a placeholder to keep the ordering.", name, declared_by);
        self.report.dangling.push(DanglingDependency { name: name.clone(), declared_by: declared_by.clone() });
        self.push_node(name.clone(), NodeKind::Stub)
    }

    fn push_node(&mut self, name: UnitName, kind: NodeKind) -> NodeIndex {
        let index = self.nodes.len();
        self.node_index_map.insert(name.clone(), index);
        self.nodes.push(Node::new(name, kind, index));
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::unit::ProcessorDescriptor;

    fn build(units: Vec<ProcessorDescriptor>) -> NodeGraph {
        let mut graph = NodeGraph::new(&SolverConfig::default());
        for unit in units {
            graph.create_nodes(&unit.into_handle());
        }
        graph.build_dependencies();
        graph
    }

    fn dependency_names(graph: &NodeGraph, name: &str) -> Vec<String> {
        let node = graph.get_node(name).unwrap();
        node.original_dependencies.iter().map(|&index| graph.nodes[index].name.to_string()).collect()
    }

    #[test]
    fn test_sub_group_names() {
        let names = NodeGraph::sub_group_names("Movement..Avoidance.Steering");
        let names: Vec<&str> = names.iter().map(|name| name.as_str()).collect();

        assert_eq!(names, vec!["Movement", "Movement.Avoidance", "Movement.Avoidance.Steering"]);
        assert!(NodeGraph::sub_group_names("").is_empty());
    }

    #[test]
    fn test_create_nodes_builds_group_chain() {
        let mut graph = NodeGraph::new(&SolverConfig::default());
        let first = graph.create_nodes(&ProcessorDescriptor::new("Steer").in_group("Movement.Avoidance").into_handle());
        let second = graph.create_nodes(&ProcessorDescriptor::new("Avoid").in_group("Movement.Avoidance").into_handle());

        // root, Movement, Movement.Avoidance, Steer, Avoid
        assert_eq!(graph.nodes.len(), 5);
        assert_eq!((first, second), (3, 4));

        let movement = graph.get_index("Movement").unwrap();
        let avoidance = graph.get_index("Movement.Avoidance").unwrap();
        assert_eq!(graph.nodes[ROOT_NODE_INDEX].sub_node_indices, vec![movement]);
        assert_eq!(graph.nodes[movement].sub_node_indices, vec![avoidance]);
        assert_eq!(graph.nodes[avoidance].sub_node_indices, vec![first, second]);
    }

    #[test]
    fn test_duplicate_unit_keeps_first_registration() {
        let mut graph = NodeGraph::new(&SolverConfig::default());
        let first = graph.create_nodes(&ProcessorDescriptor::new("Move").with_priority(1).into_handle());
        let second = graph.create_nodes(&ProcessorDescriptor::new("Move").with_priority(9).into_handle());

        assert_eq!(first, second);
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.nodes[first].execution_priority, 1);
        assert_eq!(graph.report.duplicates.len(), 1);
    }

    #[test]
    fn test_unit_named_like_its_group_is_a_duplicate() {
        let graph = build(vec![
            ProcessorDescriptor::new("Physics").in_group("Physics"),
            ProcessorDescriptor::new("Collide").in_group("Physics"),
            ProcessorDescriptor::new("Render").after("Physics"),
        ]);

        let physics = graph.get_node("Physics").unwrap();
        assert!(physics.is_group());
        assert_eq!(physics.sub_node_indices, vec![graph.get_index("Collide").unwrap()]);
        assert_eq!(graph.report.duplicates, vec![UnitName::new("Physics")]);
        assert_eq!(dependency_names(&graph, "Render"), vec!["Collide"]);
    }

    #[test]
    fn test_before_is_transposed_into_after() {
        let graph = build(vec![ProcessorDescriptor::new("A").before("B"), ProcessorDescriptor::new("B")]);

        assert_eq!(dependency_names(&graph, "B"), vec!["A"]);
        assert!(dependency_names(&graph, "A").is_empty());
        assert!(graph.nodes.iter().all(|node| node.execute_before.is_empty() && node.execute_after.is_empty()));
    }

    #[test]
    fn test_after_group_expands_to_all_members() {
        let graph = build(vec![
            ProcessorDescriptor::new("Consumer").after("Physics"),
            ProcessorDescriptor::new("Collide").in_group("Physics"),
            ProcessorDescriptor::new("Integrate").in_group("Physics.Late"),
        ]);

        assert_eq!(dependency_names(&graph, "Consumer"), vec!["Collide", "Integrate"]);
    }

    #[test]
    fn test_group_dependencies_reach_nested_members() {
        let graph = build(vec![
            ProcessorDescriptor::new("Deep").in_group("W.X.Y.Z"),
            ProcessorDescriptor::new("Gate").before("W"),
        ]);

        assert_eq!(dependency_names(&graph, "Deep"), vec!["Gate"]);
        assert_eq!(dependency_names(&graph, "W.X.Y"), vec!["Gate"]);
    }

    #[test]
    fn test_unknown_names_become_shared_stubs() {
        let graph = build(vec![ProcessorDescriptor::new("X").after("Ghost"), ProcessorDescriptor::new("Y").before("Ghost")]);

        let ghost = graph.get_node("Ghost").unwrap();
        assert!(ghost.is_stub());
        assert_eq!(dependency_names(&graph, "Ghost"), vec!["Y"]);
        assert_eq!(dependency_names(&graph, "X"), vec!["Ghost"]);
        assert_eq!(graph.report.dangling.len(), 1);
    }
}
