use std::collections::HashSet;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::domain::solver::node::{Node, NodeIndex};
use crate::domain::utils::id::UnitName;

/// Rotation invariant fingerprint of a cycle. `A -> B -> C` and `B -> C -> A` share a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CycleKey(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyCycle {
    /// Keys to the node arena, each entry depending on the next, the last one on the first.
    pub node_indices: Vec<NodeIndex>,
    pub names: Vec<UnitName>,
    pub key: CycleKey,
}

impl DependencyCycle {
    fn new(node_indices: Vec<NodeIndex>, nodes: &[Node]) -> Self {
        let names: Vec<UnitName> = node_indices.iter().map(|&index| nodes[index].name.clone()).collect();
        let key = Self::compute_key(&names);
        Self { node_indices, names, key }
    }

    /// Hashes the names rotated so that the smallest one comes first.
    fn compute_key(names: &[UnitName]) -> CycleKey {
        let start = names.iter().enumerate().min_by(|(_, a), (_, b)| a.cmp(b)).map_or(0, |(position, _)| position);
        let mut hasher = DefaultHasher::new();
        for name in names[start..].iter().chain(names[..start].iter()) {
            name.hash(&mut hasher);
        }
        CycleKey(hasher.finish())
    }

    /// `A -> B -> C -> A` style rendering for logs.
    pub fn describe(&self) -> String {
        let mut path: Vec<&str> = self.names.iter().map(UnitName::as_str).collect();
        if let Some(first) = self.names.first() {
            path.push(first.as_str());
        }
        path.join(" -> ")
    }
}

/// Annotates every placeable node with `total_waiting_nodes` and `max_execution_priority`.
///
/// For each unit or stub the transitive `original_dependencies` are walked with an explicit stack.
/// Every distinct ancestor gains one waiting node and inherits the start node's priority if higher.
/// Reaching a node that is already on the current path means a cycle. The walk never revisits a node
/// for the same start, so its depth is bounded by the node count.
///
/// # Returns
/// Every distinct cycle, in discovery order. Detection is diagnostic only, the graph is left untouched.
pub fn compute_waiting_nodes(nodes: &mut [Node]) -> Vec<DependencyCycle> {
    let mut cycles = Vec::new();
    let mut seen_keys: HashSet<CycleKey> = HashSet::new();

    let mut visited = vec![false; nodes.len()];
    let mut on_path = vec![false; nodes.len()];

    for start in 0..nodes.len() {
        if nodes[start].is_group() || nodes[start].original_dependencies.is_empty() {
            continue;
        }
        let priority = nodes[start].execution_priority;
        visited.iter_mut().for_each(|flag| *flag = false);

        // (node, position of the next dependency to look at)
        let mut stack: Vec<(NodeIndex, usize)> = vec![(start, 0)];
        visited[start] = true;
        on_path[start] = true;

        while let Some((current, next)) = stack.last().copied() {
            let Some(&dependency) = nodes[current].original_dependencies.get(next) else {
                on_path[current] = false;
                stack.pop();
                continue;
            };
            if let Some(top) = stack.last_mut() {
                top.1 += 1;
            }

            if on_path[dependency] {
                let from = stack.iter().position(|(index, _)| *index == dependency).unwrap_or(0);
                let cycle = DependencyCycle::new(stack[from..].iter().map(|(index, _)| *index).collect(), nodes);
                if seen_keys.insert(cycle.key) {
                    cycles.push(cycle);
                }
                continue;
            }
            if visited[dependency] {
                continue;
            }
            visited[dependency] = true;

            let ancestor = &mut nodes[dependency];
            ancestor.total_waiting_nodes += 1;
            ancestor.max_execution_priority = ancestor.max_execution_priority.max(priority);

            on_path[dependency] = true;
            stack.push((dependency, 0));
        }
    }

    cycles
}
