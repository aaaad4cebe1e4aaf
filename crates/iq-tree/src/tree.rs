//! The interpolation tree: level-order build and bottom-up walk.

use tracing::trace;

use crate::error::{TreeError, TreeResult};
use crate::search::NodeOperation;
use crate::MAX_CHILD_NODES;

/// Where a node's tuning payload lives.
///
/// Leaves point straight into calibration data; non-leaf nodes own a
/// slot in the tree's scratch pool. Single-child parents alias their
/// child's slot instead of copying.
#[derive(Debug)]
pub enum DataSlot<'a, T> {
    /// No payload resolved yet.
    Empty,
    /// Borrowed calibration region payload.
    Region(&'a T),
    /// Index into the tree's scratch pool.
    Scratch(usize),
}

// The payload is only ever held by reference, so slots copy freely
// regardless of `T`.
impl<T> Clone for DataSlot<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for DataSlot<'_, T> {}

#[derive(Debug)]
struct TuningNode<'a, D, T> {
    valid: bool,
    level: u32,
    node_data: Option<D>,
    num_child: usize,
    children: [usize; MAX_CHILD_NODES],
    weights: [f32; crate::MAX_INTERPOLATION_ITEMS],
    slot: DataSlot<'a, T>,
}

impl<'a, D, T> TuningNode<'a, D, T> {
    fn unused() -> Self {
        Self {
            valid: false,
            level: 0,
            node_data: None,
            num_child: 0,
            children: [0; MAX_CHILD_NODES],
            weights: [0.0; crate::MAX_INTERPOLATION_ITEMS],
            slot: DataSlot::Empty,
        }
    }
}

/// Fixed-capacity interpolation tree over tuning payloads of type `T`.
///
/// `D` is the module-specific node tag the per-level searches dispatch
/// on. The node pool and scratch pool are sized once at construction;
/// build and walk never allocate.
pub struct TuningTree<'a, D, T> {
    nodes: Box<[TuningNode<'a, D, T>]>,
    scratch: Box<[T]>,
    num_non_leaf: usize,
}

impl<'a, D: Copy, T: Clone + Default> TuningTree<'a, D, T> {
    /// Creates a tree with `max_nodes` slots, `num_non_leaf` scratch
    /// buffers and the root tagged with `root_data`.
    ///
    /// Non-leaf node `i` owns scratch slot `i`; because the pool is
    /// filled in level order, a parent's scratch index is always lower
    /// than any of its children's.
    pub fn new(max_nodes: usize, num_non_leaf: usize, root_data: D) -> Self {
        let mut nodes: Vec<TuningNode<'a, D, T>> =
            (0..max_nodes).map(|_| TuningNode::unused()).collect();
        for (i, node) in nodes.iter_mut().enumerate().take(num_non_leaf) {
            node.slot = DataSlot::Scratch(i);
        }
        if let Some(root) = nodes.first_mut() {
            root.valid = true;
            root.level = 1;
            root.node_data = Some(root_data);
        }
        Self {
            nodes: nodes.into_boxed_slice(),
            scratch: vec![T::default(); num_non_leaf].into_boxed_slice(),
            num_non_leaf,
        }
    }

    /// Grows the tree level by level using the module's operation table.
    ///
    /// Level `l` parents are searched with `ops[l]`; a search that
    /// returns no children simply ends that branch. Children are
    /// appended to the pool in level order.
    pub fn build<L>(
        &mut self,
        levels: usize,
        ops: &[NodeOperation<'a, D, T, L>],
        triggers: &L,
    ) -> TreeResult<()> {
        let mut frontier: Vec<usize> = vec![0];
        let mut next_free = 1usize;

        for level in 0..levels.saturating_sub(1) {
            let op = match ops.get(level) {
                Some(op) => op,
                None => break,
            };
            let mut next_frontier = Vec::with_capacity(frontier.len() * op.max_children);

            for &parent in &frontier {
                let parent_data = match self.nodes[parent].node_data {
                    Some(data) => data,
                    None => continue,
                };
                let selection = (op.search)(&parent_data, triggers);
                if selection.count() == 0 {
                    continue;
                }

                let parent_level = self.nodes[parent].level;
                self.nodes[parent].num_child = selection.count();
                self.nodes[parent].weights = selection.weights();

                for slot in 0..selection.count() {
                    let entry = selection.entry(slot).ok_or(TreeError::UnresolvedData)?;
                    let child = next_free;
                    next_free += 1;
                    let capacity = self.nodes.len();
                    let node = self
                        .nodes
                        .get_mut(child)
                        .ok_or(TreeError::NodePoolExhausted { got: child + 1, capacity })?;
                    node.valid = true;
                    node.level = parent_level + 1;
                    node.node_data = Some(entry.data);
                    if let Some(region) = entry.region {
                        node.slot = DataSlot::Region(region);
                    }
                    self.nodes[parent].children[slot] = child;
                    next_frontier.push(child);
                }
            }

            trace!(level, children = next_frontier.len(), "tree level built");
            if next_frontier.is_empty() {
                break;
            }
            frontier = next_frontier;
        }

        Ok(())
    }

    /// Walks the tree bottom-up, blending children into their parents.
    ///
    /// `blend` mixes two payloads with a ratio into a destination and
    /// is also used for plain copies (both operands equal, ratio 0).
    /// With a single child a non-root parent merely aliases the child's
    /// slot. Three children blend in two steps, outermost pair last.
    /// On error the walk stops and partially written scratch buffers
    /// are left as they are.
    pub fn interpolate(
        &mut self,
        levels: usize,
        blend: impl Fn(&T, &T, f32, &mut T) -> TreeResult<()>,
    ) -> TreeResult<()> {
        for index in (0..self.num_non_leaf.min(self.nodes.len())).rev() {
            let node = &self.nodes[index];
            if !node.valid || node.num_child == 0 || node.level as usize >= levels {
                continue;
            }
            let num_child = node.num_child;
            let children = node.children;
            let weights = node.weights;

            match num_child {
                1 => {
                    let child_slot = self.nodes[children[0]].slot;
                    if index == 0 {
                        // Root keeps ownership of scratch 0 so the final
                        // result has a stable home.
                        self.blend_into(0, child_slot, child_slot, 0.0, &blend)?;
                    } else {
                        self.nodes[index].slot = child_slot;
                    }
                }
                2 => {
                    let a = self.nodes[children[0]].slot;
                    let b = self.nodes[children[1]].slot;
                    self.blend_into(index, a, b, weights[0], &blend)?;
                }
                3 => {
                    let c0 = self.nodes[children[0]].slot;
                    let c1 = self.nodes[children[1]].slot;
                    let c2 = self.nodes[children[2]].slot;
                    self.blend_into(index, c1, c2, weights[1], &blend)?;
                    let partial = self.scratch[index].clone();
                    self.blend_into_with(index, c0, &partial, weights[0], &blend)?;
                }
                _ => return Err(TreeError::UnresolvedData),
            }
        }
        Ok(())
    }

    /// Final interpolated payload, owned by the root after a walk.
    pub fn result(&self) -> TreeResult<&T> {
        match self.nodes.first().map(|n| n.slot) {
            Some(DataSlot::Region(region)) => Ok(region),
            Some(DataSlot::Scratch(slot)) => {
                self.scratch.get(slot).ok_or(TreeError::UnresolvedData)
            }
            _ => Err(TreeError::UnresolvedData),
        }
    }

    fn blend_into(
        &mut self,
        index: usize,
        a: DataSlot<'a, T>,
        b: DataSlot<'a, T>,
        ratio: f32,
        blend: &impl Fn(&T, &T, f32, &mut T) -> TreeResult<()>,
    ) -> TreeResult<()> {
        let (head, tail) = self.scratch.split_at_mut(index + 1);
        let target = head.last_mut().ok_or(TreeError::UnresolvedData)?;
        let a = resolve(a, tail, index)?;
        let b = resolve(b, tail, index)?;
        blend(a, b, ratio, target)
    }

    fn blend_into_with(
        &mut self,
        index: usize,
        a: DataSlot<'a, T>,
        b: &T,
        ratio: f32,
        blend: &impl Fn(&T, &T, f32, &mut T) -> TreeResult<()>,
    ) -> TreeResult<()> {
        let (head, tail) = self.scratch.split_at_mut(index + 1);
        let target = head.last_mut().ok_or(TreeError::UnresolvedData)?;
        let a = resolve(a, tail, index)?;
        blend(a, b, ratio, target)
    }
}

/// Resolves a slot against the scratch tail above `index`.
///
/// Scratch slots at or below `index` would alias the blend target and
/// indicate a broken level-order invariant.
fn resolve<'s, 'a: 's, T>(
    slot: DataSlot<'a, T>,
    tail: &'s [T],
    index: usize,
) -> TreeResult<&'s T> {
    match slot {
        DataSlot::Region(region) => Ok(region),
        DataSlot::Scratch(s) => {
            let offset = s
                .checked_sub(index + 1)
                .ok_or(TreeError::UnresolvedData)?;
            tail.get(offset).ok_or(TreeError::UnresolvedData)
        }
        DataSlot::Empty => Err(TreeError::UnresolvedData),
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use iq_core::TriggerRegion;

    use super::*;
    use crate::search::{select_regions, ChildEntry, ChildSelection, NodeOperation};

    // A toy two-axis module: one gain axis with two regions, each region
    // carrying one scalar payload per temperature region.
    #[derive(Debug, Clone, Copy)]
    struct Tag {
        gain_index: usize,
    }

    struct Triggers {
        gain: f32,
        cct: f32,
    }

    static GAIN_REGIONS: [TriggerRegion; 2] = [
        TriggerRegion { start: 0.0, end: 1.0 },
        TriggerRegion { start: 3.0, end: 4.0 },
    ];
    static CCT_REGIONS: [TriggerRegion; 2] = [
        TriggerRegion { start: 2000.0, end: 3000.0 },
        TriggerRegion { start: 5000.0, end: 6000.0 },
    ];
    static PAYLOAD: [[f32; 2]; 2] = [[10.0, 20.0], [30.0, 40.0]];

    fn search_gain(tag: &Tag, triggers: &Triggers) -> ChildSelection<'static, Tag, f32> {
        let _ = tag;
        select_regions(&GAIN_REGIONS, triggers.gain, |index| ChildEntry {
            data: Tag { gain_index: index },
            region: None,
        })
    }

    fn search_cct(tag: &Tag, triggers: &Triggers) -> ChildSelection<'static, Tag, f32> {
        let gain_index = tag.gain_index;
        select_regions(&CCT_REGIONS, triggers.cct, |index| ChildEntry {
            data: Tag { gain_index },
            region: Some(&PAYLOAD[gain_index][index]),
        })
    }

    fn ops() -> [NodeOperation<'static, Tag, f32, Triggers>; 2] {
        [
            NodeOperation { search: search_gain, max_children: 2 },
            NodeOperation { search: search_cct, max_children: 2 },
        ]
    }

    fn blend(a: &f32, b: &f32, ratio: f32, out: &mut f32) -> TreeResult<()> {
        if std::ptr::eq(a, b) {
            *out = *a;
            return Ok(());
        }
        *out = iq_math::blend_linear(*a, *b, ratio);
        Ok(())
    }

    fn run(gain: f32, cct: f32) -> f32 {
        let mut tree = TuningTree::new(7, 3, Tag { gain_index: 0 });
        let triggers = Triggers { gain, cct };
        tree.build(3, &ops(), &triggers).unwrap();
        tree.interpolate(3, blend).unwrap();
        *tree.result().unwrap()
    }

    #[test]
    fn degenerate_lookup_passes_value_through() {
        assert_relative_eq!(run(0.5, 2500.0), 10.0);
        assert_relative_eq!(run(3.5, 5500.0), 40.0);
    }

    #[test]
    fn single_axis_blend() {
        // Gain degenerate at region 0, CCT halfway through the gap.
        assert_relative_eq!(run(0.5, 4000.0), 15.0, epsilon = 1e-5);
    }

    #[test]
    fn two_axis_blend() {
        // Both axes halfway through their gaps: full bilinear mix.
        assert_relative_eq!(run(2.0, 4000.0), 25.0, epsilon = 1e-5);
    }

    #[test]
    fn empty_search_ends_branch() {
        fn search_none(_: &Tag, _: &Triggers) -> ChildSelection<'static, Tag, f32> {
            ChildSelection::new()
        }
        let ops = [
            NodeOperation::<Tag, f32, Triggers> { search: search_none, max_children: 2 },
        ];
        let mut tree = TuningTree::new(3, 1, Tag { gain_index: 0 });
        let triggers = Triggers { gain: 0.0, cct: 0.0 };
        tree.build(2, &ops, &triggers).unwrap();
        // Root never got children, walk is a no-op and the result is
        // the untouched scratch buffer.
        tree.interpolate(2, blend).unwrap();
        assert_relative_eq!(*tree.result().unwrap(), 0.0);
    }

    #[test]
    fn bad_ratio_propagates() {
        fn reject(_: &f32, _: &f32, ratio: f32, _: &mut f32) -> TreeResult<()> {
            Err(TreeError::InvalidRatio(ratio))
        }
        let mut tree = TuningTree::new(7, 3, Tag { gain_index: 0 });
        let triggers = Triggers { gain: 2.0, cct: 4000.0 };
        tree.build(3, &ops(), &triggers).unwrap();
        assert!(tree.interpolate(3, reject).is_err());
    }
}
