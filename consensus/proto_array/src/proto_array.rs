use crate::error::Error;
use ssz_derive::{Decode, Encode};
use std::collections::HashMap;
use types::{Epoch, Hash256, Slot};

/// Weights are Gwei-denominated, which reads poorly in an error message. Scale them down
/// before they are surfaced.
const WEIGHT_REPORTING_DIVISOR: u64 = 10 * 1_000_000_000;

#[derive(Clone, PartialEq, Debug, Encode, Decode)]
pub struct ProtoNode {
    /// The `slot` is not used by the fork choice logic itself; it is carried so that nodes
    /// can be identified in errors and by external components without a second lookup.
    pub slot: Slot,
    pub root: Hash256,
    pub parent: Option<usize>,
    pub justified_epoch: Epoch,
    pub finalized_epoch: Epoch,
    /// Cumulative weight of the attestations for this block and all blocks below it.
    pub weight: u64,
    pub best_child: Option<usize>,
    pub best_descendant: Option<usize>,
}

#[derive(PartialEq, Debug)]
pub struct ProtoArray {
    pub justified_epoch: Epoch,
    pub finalized_epoch: Epoch,
    pub finalized_root: Hash256,
    pub nodes: Vec<ProtoNode>,
    pub indices: HashMap<Hash256, usize>,
}

impl ProtoArray {
    /// Register a new block with the fork choice.
    ///
    /// A root that is already known is ignored. A `parent_root` that is unknown (which
    /// includes the zero hash before the genesis alias has been inserted) produces a node
    /// without a parent; such a node behaves as the root of its own tree.
    pub fn on_new_block(
        &mut self,
        slot: Slot,
        root: Hash256,
        parent_root: Option<Hash256>,
        justified_epoch: Epoch,
        finalized_epoch: Epoch,
    ) -> Result<(), Error> {
        if self.indices.contains_key(&root) {
            return Ok(());
        }

        let node_index = self.nodes.len();

        let node = ProtoNode {
            slot,
            root,
            parent: parent_root.and_then(|parent_root| self.indices.get(&parent_root).copied()),
            justified_epoch,
            finalized_epoch,
            weight: 0,
            best_child: None,
            best_descendant: None,
        };

        self.indices.insert(node.root, node_index);
        self.nodes.push(node.clone());

        // A zero-weight child can still become the best child, e.g. when the parent has no
        // best child yet, or when the parent's best child stopped being viable at the
        // epochs this block was inserted under.
        if let Some(parent_index) = node.parent {
            self.maybe_update_best_child_and_descendant(parent_index, node_index)?;
        }

        Ok(())
    }

    /// Apply a per-node weight delta to the entire array and re-run the best-child
    /// selection for every parent.
    ///
    /// The work is split into two backwards passes over `self.nodes`:
    ///
    /// 1. Add each node's delta to its weight and accumulate the delta into the parent's
    ///    slot of `deltas`. Since every parent sits at a lower index than its children,
    ///    a node's delta already contains its whole subtree by the time it is reached.
    /// 2. Run `maybe_update_best_child_and_descendant` for every node with a parent.
    ///
    /// The second pass must not start until the first has finished: selection compares
    /// sibling weights, and a fused loop would read siblings whose deltas have not
    /// landed yet.
    pub fn apply_score_changes(
        &mut self,
        mut deltas: Vec<i64>,
        justified_epoch: Epoch,
        finalized_epoch: Epoch,
    ) -> Result<(), Error> {
        if deltas.len() != self.indices.len() {
            return Err(Error::InvalidDeltaLen {
                deltas: deltas.len(),
                indices: self.indices.len(),
            });
        }

        if justified_epoch != self.justified_epoch || finalized_epoch != self.finalized_epoch {
            self.justified_epoch = justified_epoch;
            self.finalized_epoch = finalized_epoch;
        }

        for node_index in (0..self.nodes.len()).rev() {
            let node_delta = deltas
                .get(node_index)
                .copied()
                .ok_or_else(|| Error::InvalidNodeDelta(node_index))?;

            let node = self
                .nodes
                .get_mut(node_index)
                .ok_or_else(|| Error::InvalidNodeIndex(node_index))?;

            if node_delta < 0 {
                // A negative delta can overdraw the weight when balances shrink between
                // calls; clamp at zero rather than failing.
                node.weight = node.weight.saturating_sub(node_delta.abs() as u64);
            } else {
                node.weight = node
                    .weight
                    .checked_add(node_delta as u64)
                    .ok_or_else(|| Error::DeltaOverflow(node_index))?;
            }

            if let Some(parent_index) = node.parent {
                let parent_delta = deltas
                    .get_mut(parent_index)
                    .ok_or_else(|| Error::InvalidParentDelta(parent_index))?;

                *parent_delta += node_delta;
            }
        }

        for node_index in (0..self.nodes.len()).rev() {
            let node = self
                .nodes
                .get(node_index)
                .ok_or_else(|| Error::InvalidNodeIndex(node_index))?;

            if let Some(parent_index) = node.parent {
                self.maybe_update_best_child_and_descendant(parent_index, node_index)?;
            }
        }

        Ok(())
    }

    /// Follows the best-descendant links to find the best block (i.e., the head).
    ///
    /// The result is only accurate if `Self::apply_score_changes` has run since the last
    /// `Self::on_new_block`: inserting a block only updates the direct parent, it does not
    /// walk the ancestor chain.
    pub fn find_head(&self, justified_root: Hash256) -> Result<Hash256, Error> {
        let justified_index = self
            .indices
            .get(&justified_root)
            .copied()
            .ok_or_else(|| Error::JustifiedNodeUnknown(justified_root))?;

        let justified_node = self
            .nodes
            .get(justified_index)
            .ok_or_else(|| Error::InvalidJustifiedIndex(justified_index))?;

        let best_descendant_index = justified_node.best_descendant.unwrap_or(justified_index);

        let best_node = self
            .nodes
            .get(best_descendant_index)
            .ok_or_else(|| Error::InvalidBestDescendant(best_descendant_index))?;

        // Starting the search from a block that disagrees with the filter is a logic
        // error in the caller.
        if !self.node_is_viable_for_head(best_node) {
            return Err(Error::InvalidBestNode {
                start_root: justified_root,
                justified_epoch: self.justified_epoch,
                finalized_epoch: self.finalized_epoch,
                head_slot: best_node.slot,
                head_weight: best_node.weight / WEIGHT_REPORTING_DIVISOR,
                head_justified_epoch: best_node.justified_epoch,
                head_finalized_epoch: best_node.finalized_epoch,
            });
        }

        Ok(best_node.root)
    }

    /// Observe the parent at `parent_index` with respect to the child at `child_index` and
    /// potentially modify the `parent.best_child` and `parent.best_descendant` values.
    ///
    /// There are four outcomes:
    ///
    /// - The child is already the best child but is no longer viable and is removed.
    /// - The child is already the best child and the parent picks up its latest
    ///   best descendant.
    /// - The child is not the best child but becomes it.
    /// - The child is not the best child and does not become it.
    fn maybe_update_best_child_and_descendant(
        &mut self,
        parent_index: usize,
        child_index: usize,
    ) -> Result<(), Error> {
        let child = self
            .nodes
            .get(child_index)
            .ok_or_else(|| Error::InvalidNodeIndex(child_index))?;

        let parent = self
            .nodes
            .get(parent_index)
            .ok_or_else(|| Error::InvalidParentIndex(parent_index))?;

        let child_leads_to_viable_head = self.node_leads_to_viable_head(child)?;

        // Aliases for the three values this function can write back into the parent.
        let change_to_none = (None, None);
        let change_to_child = (
            Some(child_index),
            child.best_descendant.or(Some(child_index)),
        );
        let no_change = (parent.best_child, parent.best_descendant);

        let (new_best_child, new_best_descendant) =
            if let Some(best_child_index) = parent.best_child {
                if best_child_index == child_index && !child_leads_to_viable_head {
                    change_to_none
                } else if best_child_index == child_index {
                    change_to_child
                } else {
                    let best_child = self
                        .nodes
                        .get(best_child_index)
                        .ok_or_else(|| Error::InvalidBestChildIndex(best_child_index))?;

                    let best_child_leads_to_viable_head =
                        self.node_leads_to_viable_head(best_child)?;

                    if child_leads_to_viable_head && !best_child_leads_to_viable_head {
                        change_to_child
                    } else if !child_leads_to_viable_head && best_child_leads_to_viable_head {
                        no_change
                    } else if child.weight == best_child.weight {
                        // Equal weights: the strictly greater root wins, comparing all 32
                        // bytes as a big-endian integer.
                        if child.root > best_child.root {
                            change_to_child
                        } else {
                            no_change
                        }
                    } else if child.weight > best_child.weight {
                        change_to_child
                    } else {
                        no_change
                    }
                }
            } else if child_leads_to_viable_head {
                change_to_child
            } else {
                no_change
            };

        let parent = self
            .nodes
            .get_mut(parent_index)
            .ok_or_else(|| Error::InvalidParentIndex(parent_index))?;

        parent.best_child = new_best_child;
        parent.best_descendant = new_best_descendant;

        Ok(())
    }

    /// Indicates if the subtree rooted at `node` can currently supply the head: the check
    /// applies to the node's best descendant when it has one, otherwise to the node
    /// itself.
    fn node_leads_to_viable_head(&self, node: &ProtoNode) -> Result<bool, Error> {
        if let Some(best_descendant_index) = node.best_descendant {
            let best_descendant = self
                .nodes
                .get(best_descendant_index)
                .ok_or_else(|| Error::InvalidBestDescendant(best_descendant_index))?;

            Ok(self.node_is_viable_for_head(best_descendant))
        } else {
            Ok(self.node_is_viable_for_head(node))
        }
    }

    /// The equivalent of the `filter_block_tree` function in the eth2 spec:
    ///
    /// https://github.com/ethereum/eth2.0-specs/blob/v0.10.0/specs/phase0/fork-choice.md#filter_block_tree
    ///
    /// A node whose declared epochs differ from the store's is not viable; an epoch of
    /// zero on the store side matches anything (bootstrap).
    fn node_is_viable_for_head(&self, node: &ProtoNode) -> bool {
        (node.justified_epoch == self.justified_epoch || self.justified_epoch == Epoch::new(0))
            && (node.finalized_epoch == self.finalized_epoch
                || self.finalized_epoch == Epoch::new(0))
    }
}
