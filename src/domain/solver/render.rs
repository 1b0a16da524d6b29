use std::fmt;

use crate::domain::requirements::{
    AccessCategory, AccessMode, BitSet, CategoryTag, ChunkFields, ConstSharedFields, ExternalServices, Fields, ResourceCatalog, ResourceSet, SharedFields,
    TagRequirement,
};
use crate::domain::solver::node::{Node, NodeIndex, ROOT_NODE_INDEX};

const INDENT: &str = "  ";

/// Text view of a node arena: the group tree first, then every name only known from ordering hints.
///
/// ```text
/// [Movement]
///   Move priority=3 waiting=1 fields w[Transform]
/// Draw after [Move, Ghost] priority=0 waiting=0
/// Ghost (unresolved) waiting=1
/// ```
pub struct GraphView<'a> {
    nodes: &'a [Node],
    catalog: Option<&'a ResourceCatalog>,
}

impl<'a> GraphView<'a> {
    pub fn new(nodes: &'a [Node], catalog: Option<&'a ResourceCatalog>) -> Self {
        Self { nodes, catalog }
    }

    fn write_subtree(&self, f: &mut fmt::Formatter<'_>, node_index: NodeIndex, depth: usize, attached: &mut [bool]) -> fmt::Result {
        attached[node_index] = true;
        let node = &self.nodes[node_index];
        if node.is_group() {
            writeln!(f, "{}[{}]", INDENT.repeat(depth), node.name)?;
        } else {
            self.write_node(f, node, depth, true)?;
        }
        for &child in &node.sub_node_indices {
            self.write_subtree(f, child, depth + 1, attached)?;
        }
        Ok(())
    }

    /// Stubs inside the tree are pruned units, stubs outside of it names nobody registered.
    fn write_node(&self, f: &mut fmt::Formatter<'_>, node: &Node, depth: usize, in_tree: bool) -> fmt::Result {
        write!(f, "{}{}", INDENT.repeat(depth), node.name)?;
        if node.is_stub() {
            write!(f, " ({})", if in_tree { "pruned" } else { "unresolved" })?;
        }
        if !node.original_dependencies.is_empty() {
            let names: Vec<&str> = node.original_dependencies.iter().map(|&index| self.nodes[index].name.as_str()).collect();
            write!(f, " after [{}]", names.join(", "))?;
        }
        if !node.is_stub() {
            write!(f, " priority={}", node.execution_priority)?;
        }
        write!(f, " waiting={}", node.total_waiting_nodes)?;
        if let Some(position) = node.sequence_position_index {
            write!(f, " position={}", position)?;
        }

        self.write_access::<Fields>(f, node)?;
        self.write_access::<ChunkFields>(f, node)?;
        self.write_access::<SharedFields>(f, node)?;
        self.write_access::<ExternalServices>(f, node)?;

        let const_shared = node.requirements.const_shared_fields();
        if !const_shared.is_empty() {
            write!(f, " {} r[{}]", ConstSharedFields::CATEGORY, self.describe(const_shared).join(", "))?;
        }
        for (label, requirement) in [("all", TagRequirement::All), ("any", TagRequirement::Any), ("none", TagRequirement::None)] {
            let tags = node.requirements.tags(requirement);
            if !tags.is_empty() {
                write!(f, " tags.{}[{}]", label, self.describe(tags).join(", "))?;
            }
        }
        writeln!(f)
    }

    fn write_access<C: AccessCategory>(&self, f: &mut fmt::Formatter<'_>, node: &Node) -> fmt::Result {
        let access = node.requirements.access::<C>();
        if access.is_empty() {
            return Ok(());
        }
        write!(f, " {}", C::CATEGORY)?;
        for (label, mode) in [("r", AccessMode::Read), ("w", AccessMode::Write)] {
            let bits = access.get(mode);
            if !bits.is_empty() {
                write!(f, " {}[{}]", label, self.describe(bits).join(", "))?;
            }
        }
        Ok(())
    }

    fn describe<C: CategoryTag>(&self, set: &BitSet<C>) -> Vec<String> {
        match self.catalog {
            Some(catalog) => catalog.describe(set),
            None => set.iter().map(|bit| format!("#{}", bit)).collect(),
        }
    }
}

impl fmt::Display for GraphView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nodes.is_empty() {
            return Ok(());
        }
        let mut attached = vec![false; self.nodes.len()];
        attached[ROOT_NODE_INDEX] = true;
        for &child in &self.nodes[ROOT_NODE_INDEX].sub_node_indices {
            self.write_subtree(f, child, 0, &mut attached)?;
        }

        for (index, node) in self.nodes.iter().enumerate() {
            if !attached[index] {
                self.write_node(f, node, 0, false)?;
            }
        }
        Ok(())
    }
}
