use std::collections::HashSet;

use crate::domain::requirements::ResourceCatalog;
use crate::domain::solver::config::SolverConfig;
use crate::domain::solver::cycle::{CycleKey, compute_waiting_nodes};
use crate::domain::solver::graph_builder::NodeGraph;
use crate::domain::solver::node::{Node, NodeIndex};
use crate::domain::solver::render::GraphView;
use crate::domain::solver::resource_usage::ResourceUsage;
use crate::domain::solver::result::{BrokenEdge, OrderedUnit, SolverResult};
use crate::domain::unit::UnitHandle;
use crate::domain::utils::id::UnitName;

/// Orders processing units so that declared ordering hints hold and units touching the same
/// resources never overlap, while keeping as many units as possible free to run concurrently.
///
/// A solver is built for one unit collection and consumed by [`solve`](Self::solve).
#[derive(Debug)]
pub struct ProcessorDependencySolver {
    graph: NodeGraph,
    config: SolverConfig,
}

impl ProcessorDependencySolver {
    /// Builds the node graph for `units`.
    ///
    /// Entries that are `None` or carry an empty name are skipped with a warning.
    pub fn new<I, U>(units: I, config: SolverConfig) -> Self
    where
        I: IntoIterator<Item = U>,
        U: Into<Option<UnitHandle>>,
    {
        let mut graph = NodeGraph::new(&config);
        for (position, entry) in units.into_iter().enumerate() {
            let entry: Option<UnitHandle> = entry.into();
            match entry {
                None => {
                    tracing::warn!("Skipping absent processing unit at position {}.", position);
                    graph.report.skipped_entries += 1;
                }
                Some(unit) if unit.get_name().is_empty() => {
                    tracing::warn!("Skipping processing unit without a name at position {}.", position);
                    graph.report.skipped_entries += 1;
                }
                Some(unit) => {
                    graph.create_nodes(&unit);
                }
            }
        }
        graph.build_dependencies();

        Self { graph, config }
    }

    pub fn get_graph(&self) -> &NodeGraph {
        &self.graph
    }

    pub fn get_config(&self) -> &SolverConfig {
        &self.config
    }

    /// Indented text of the group tree. Waiting counts are computed on a copy, the solver is left untouched.
    pub fn render_graph(&self, catalog: Option<&ResourceCatalog>) -> String {
        let mut nodes = self.graph.nodes.clone();
        compute_waiting_nodes(&mut nodes);
        GraphView::new(&nodes, catalog).to_string()
    }

    pub fn solve(self) -> SolverResult {
        let mut reported_cycles = HashSet::new();
        self.solve_reporting_into(&mut reported_cycles)
    }

    /// Solves the graph, logging only those cycles whose key is not yet in `reported_cycles`.
    ///
    /// **Phase 1:** Waiting counts and priorities are propagated, cycles detected.
    /// **Phase 2:** Pending nodes are sorted once, most important first.
    /// **Phase 3:** Nodes are placed one at a time. The first ready node that can run alongside
    ///              everything placed so far wins, otherwise the first ready node. If no node is ready
    ///              the graph has a cycle, and an edge is dropped to get out of it.
    ///
    /// # Returns
    /// The placed units in execution order together with every anomaly met on the way.
    pub fn solve_reporting_into(mut self, reported_cycles: &mut HashSet<CycleKey>) -> SolverResult {
        let mut report = std::mem::take(&mut self.graph.report);
        let nodes = &mut self.graph.nodes;

        // Phase 1: Waiting counts and cycle detection
        let cycles = compute_waiting_nodes(nodes);
        for cycle in &cycles {
            if reported_cycles.insert(cycle.key) {
                tracing::error!("Detected processing dependency cycle: {}", cycle.describe());
                report.reported_cycles.push(cycle.clone());
            }
        }
        report.cycles = cycles;

        // Phase 2: Sort candidates
        let mut pending: Vec<NodeIndex> = nodes.iter().filter(|node| !node.is_group()).map(|node| node.node_index).collect();
        if self.config.priority_ordering {
            pending.sort_by(|&a, &b| {
                let (a, b) = (&nodes[a], &nodes[b]);
                b.max_execution_priority.cmp(&a.max_execution_priority).then(b.total_waiting_nodes.cmp(&a.total_waiting_nodes))
            });
        } else {
            pending.sort_by(|&a, &b| nodes[b].total_waiting_nodes.cmp(&nodes[a].total_waiting_nodes));
        }

        for node in nodes.iter_mut() {
            node.transient_dependencies = node.original_dependencies.clone();
        }

        // Phase 3: Placement
        let mut usage = ResourceUsage::new();
        let mut placed: Vec<NodeIndex> = Vec::with_capacity(pending.len());
        while !pending.is_empty() {
            let is_ready = |index: NodeIndex| nodes[index].transient_dependencies.is_empty();
            let selected = pending
                .iter()
                .position(|&index| {
                    let node = &nodes[index];
                    is_ready(index)
                        && (node.requirements.is_empty()
                            || self.config.single_threaded
                            || usage.can_access_requirements(&node.requirements, node.valid_data_sets.as_ref()))
                })
                .or_else(|| pending.iter().position(|&index| is_ready(index)));

            let Some(slot) = selected else {
                if let Some(edge) = Self::break_cycle(nodes, pending[0]) {
                    report.broken_edges.push(edge);
                }
                continue;
            };

            let node_index = pending.remove(slot);
            for dependency in usage.submit_node(&nodes[node_index]) {
                if nodes[node_index].add_dependency(dependency) {
                    log::trace!("'{}' waits for '{}' because of shared resources.", nodes[node_index].name, nodes[dependency].name);
                }
            }
            for &other in &pending {
                nodes[other].transient_dependencies.retain(|&dependency| dependency != node_index);
            }

            let position = nodes[node_index]
                .original_dependencies
                .iter()
                .map(|&dependency| nodes[dependency].sequence_position_index.map_or(0, |position| position + nodes[dependency].sequence_weight()))
                .max()
                .unwrap_or(0);
            nodes[node_index].sequence_position_index = Some(position);
            log::debug!("Placed '{}' at sequence position {}.", nodes[node_index].name, position);

            placed.push(node_index);
        }

        let nodes: &[Node] = nodes;
        let order = placed
            .into_iter()
            .filter_map(|node_index| {
                let node = &nodes[node_index];
                let unit = node.get_unit()?.clone();
                Some(OrderedUnit {
                    name: node.name.clone(),
                    unit,
                    dependencies: Self::expand_dependencies(nodes, node_index),
                    sequence_position: node.sequence_position_index.unwrap_or(0),
                })
            })
            .collect();

        SolverResult { order, report, single_threaded: self.config.single_threaded }
    }

    /// Drops the most recently added transient dependency of `node_index`, from both dependency lists.
    fn break_cycle(nodes: &mut [Node], node_index: NodeIndex) -> Option<BrokenEdge> {
        let dependency = nodes[node_index].transient_dependencies.pop()?;
        nodes[node_index].original_dependencies.retain(|&index| index != dependency);

        let edge = BrokenEdge { dependent: nodes[node_index].name.clone(), dependency: nodes[dependency].name.clone() };
        tracing::error!("No processing unit is ready to run. Breaking the dependency of '{}' on '{}'.", edge.dependent, edge.dependency);
        Some(edge)
    }

    /// Dependency names of a placed node, with stubs replaced by the units they stand for.
    fn expand_dependencies(nodes: &[Node], node_index: NodeIndex) -> Vec<UnitName> {
        let mut names = Vec::new();
        let mut visited = vec![false; nodes.len()];
        let mut stack: Vec<NodeIndex> = nodes[node_index].original_dependencies.iter().rev().copied().collect();

        while let Some(index) = stack.pop() {
            if std::mem::replace(&mut visited[index], true) {
                continue;
            }
            let node = &nodes[index];
            if node.is_unit() {
                if !names.contains(&node.name) {
                    names.push(node.name.clone());
                }
            } else {
                stack.extend(node.original_dependencies.iter().rev());
            }
        }
        names
    }
}

/// Builds a solver for `units` and solves it right away.
pub fn resolve_dependencies<I, U>(units: I, config: SolverConfig) -> SolverResult
where
    I: IntoIterator<Item = U>,
    U: Into<Option<UnitHandle>>,
{
    ProcessorDependencySolver::new(units, config).solve()
}
