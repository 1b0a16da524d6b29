use std::collections::HashMap;

use crate::domain::requirements::{
    AccessCategory, BitSet, CategoryTag, ChunkFields, ExternalServices, Fields, ResourceAccess, ResourceRequirements, ResourceSet, SharedFields,
};
use crate::domain::solver::node::{Node, NodeIndex, data_sets_overlap};
use crate::domain::unit::DataSets;

/// Data sets of every node submitted so far, looked up when relaxing conflicts.
type HolderDataSets = HashMap<NodeIndex, Option<DataSets>>;

/// Current readers and writers of every bit of one resource category.
#[derive(Debug)]
struct CategoryUsage<C: CategoryTag> {
    readers: Vec<Vec<NodeIndex>>,
    writers: Vec<Vec<NodeIndex>>,

    /// Bits with at least one reader, respectively writer.
    held_read: BitSet<C>,
    held_write: BitSet<C>,
}

impl<C: AccessCategory> CategoryUsage<C> {
    fn new() -> Self {
        Self { readers: Vec::new(), writers: Vec::new(), held_read: BitSet::new(), held_write: BitSet::new() }
    }

    fn readers_of(&self, bit: usize) -> &[NodeIndex] {
        self.readers.get(bit).map(Vec::as_slice).unwrap_or(&[])
    }

    fn writers_of(&self, bit: usize) -> &[NodeIndex] {
        self.writers.get(bit).map(Vec::as_slice).unwrap_or(&[])
    }

    fn overlaps(holder: NodeIndex, data_sets: Option<&DataSets>, holder_data_sets: &HolderDataSets) -> bool {
        if !C::CATEGORY.tracks_data_sets() {
            return true;
        }
        let holder_sets = holder_data_sets.get(&holder).and_then(Option::as_ref);
        data_sets_overlap(holder_sets, data_sets)
    }

    /// Whether everything `holder` touches is also touched by a writer with `data_sets`.
    fn covers(holder: NodeIndex, data_sets: Option<&DataSets>, holder_data_sets: &HolderDataSets) -> bool {
        if !C::CATEGORY.tracks_data_sets() {
            return true;
        }
        match (data_sets, holder_data_sets.get(&holder).and_then(Option::as_ref)) {
            (None, _) => true,
            (Some(writer_sets), Some(holder_sets)) => holder_sets.is_subset(writer_sets),
            (Some(_), None) => false,
        }
    }

    /// Read-after-write, write-after-read and write-after-write check against the current holders.
    fn can_access(&self, access: &ResourceAccess<C>, data_sets: Option<&DataSets>, holder_data_sets: &HolderDataSets) -> bool {
        let raw_conflict = access.read.has_any(&self.held_write) || access.write.has_any(&self.held_read) || access.write.has_any(&self.held_write);
        if !raw_conflict {
            return true;
        }
        if !C::CATEGORY.tracks_data_sets() {
            return false;
        }

        let overlapping = |holders: &[NodeIndex]| holders.iter().any(|&holder| Self::overlaps(holder, data_sets, holder_data_sets));

        let read_after_write = access.read.intersection(&self.held_write).iter().any(|bit| overlapping(self.writers_of(bit)));
        let write_after_read = access.write.intersection(&self.held_read).iter().any(|bit| overlapping(self.readers_of(bit)));
        let write_after_write = access.write.intersection(&self.held_write).iter().any(|bit| overlapping(self.writers_of(bit)));

        !(read_after_write || write_after_read || write_after_write)
    }

    /// Registers `node_index` as reader/writer and collects the edges it needs into `dependencies`.
    fn submit(
        &mut self,
        node_index: NodeIndex,
        access: &ResourceAccess<C>,
        data_sets: Option<&DataSets>,
        holder_data_sets: &HolderDataSets,
        dependencies: &mut Vec<NodeIndex>,
    ) {
        let push = |dependency: NodeIndex, dependencies: &mut Vec<NodeIndex>| {
            if dependency != node_index && !dependencies.contains(&dependency) {
                dependencies.push(dependency);
            }
        };

        // Read after write
        for bit in access.read.iter() {
            for &writer in self.writers_of(bit) {
                if Self::overlaps(writer, data_sets, holder_data_sets) {
                    push(writer, dependencies);
                }
            }
        }

        // Write after read and write after write. A holder whose data sets the writer fully
        // covers is released, the writer becomes the frontier for it.
        for bit in access.write.iter() {
            for holders in [&mut self.readers, &mut self.writers] {
                if let Some(users) = holders.get_mut(bit) {
                    users.retain(|&holder| {
                        if holder == node_index || !Self::overlaps(holder, data_sets, holder_data_sets) {
                            return true;
                        }
                        push(holder, dependencies);
                        !Self::covers(holder, data_sets, holder_data_sets)
                    });
                }
            }
            if self.readers_of(bit).is_empty() {
                self.held_read.remove(bit);
            }
            if self.writers_of(bit).is_empty() {
                self.held_write.remove(bit);
            }
        }

        for bit in access.read.iter() {
            Self::register(&mut self.readers, &mut self.held_read, bit, node_index);
        }
        for bit in access.write.iter() {
            Self::register(&mut self.writers, &mut self.held_write, bit, node_index);
        }
    }

    fn register(users: &mut Vec<Vec<NodeIndex>>, held: &mut BitSet<C>, bit: usize, node_index: NodeIndex) {
        if users.len() <= bit {
            users.resize_with(bit + 1, Vec::new);
        }
        if !users[bit].contains(&node_index) {
            users[bit].push(node_index);
        }
        held.insert(bit);
    }
}

/// Tracks which placed nodes currently hold read or write access to each resource.
///
/// Nodes are submitted one at a time in placement order. Every submission returns the
/// edges the node needs to the nodes placed before it, so no conflict matrix is ever built.
/// Constant shared fields and tags are not tracked.
#[derive(Debug)]
pub struct ResourceUsage {
    fields: CategoryUsage<Fields>,
    chunk_fields: CategoryUsage<ChunkFields>,
    shared_fields: CategoryUsage<SharedFields>,
    external_services: CategoryUsage<ExternalServices>,
    holder_data_sets: HolderDataSets,
}

impl Default for ResourceUsage {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceUsage {
    pub fn new() -> Self {
        Self {
            fields: CategoryUsage::new(),
            chunk_fields: CategoryUsage::new(),
            shared_fields: CategoryUsage::new(),
            external_services: CategoryUsage::new(),
            holder_data_sets: HashMap::new(),
        }
    }

    /// Whether a node with `requirements` could run concurrently with everything currently held.
    ///
    /// Conflicts on fields, chunk fields and shared fields are forgiven when none of the conflicting
    /// holders shares a data set with `data_sets`. Conflicts on external services never are.
    pub fn can_access_requirements(&self, requirements: &ResourceRequirements, data_sets: Option<&DataSets>) -> bool {
        let holders = &self.holder_data_sets;
        self.fields.can_access(requirements.access::<Fields>(), data_sets, holders)
            && self.chunk_fields.can_access(requirements.access::<ChunkFields>(), data_sets, holders)
            && self.shared_fields.can_access(requirements.access::<SharedFields>(), data_sets, holders)
            && self.external_services.can_access(requirements.access::<ExternalServices>(), data_sets, holders)
    }

    /// Commits `node` and returns the nodes it has to wait for, in discovery order.
    pub fn submit_node(&mut self, node: &Node) -> Vec<NodeIndex> {
        let mut dependencies = Vec::new();
        let requirements = &node.requirements;
        let data_sets = node.valid_data_sets.as_ref();

        if !requirements.has_tracked_access() {
            return dependencies;
        }

        let holders = &self.holder_data_sets;
        self.fields.submit(node.node_index, requirements.access::<Fields>(), data_sets, holders, &mut dependencies);
        self.chunk_fields.submit(node.node_index, requirements.access::<ChunkFields>(), data_sets, holders, &mut dependencies);
        self.shared_fields.submit(node.node_index, requirements.access::<SharedFields>(), data_sets, holders, &mut dependencies);
        self.external_services.submit(node.node_index, requirements.access::<ExternalServices>(), data_sets, holders, &mut dependencies);

        self.holder_data_sets.insert(node.node_index, node.valid_data_sets.clone());
        dependencies
    }
}
