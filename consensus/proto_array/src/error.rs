use types::{Epoch, Hash256, Slot};

#[derive(Clone, PartialEq, Debug)]
pub enum Error {
    /// The justified root supplied to `find_head` has never been inserted. Indicates an
    /// ordering bug in the caller.
    JustifiedNodeUnknown(Hash256),
    /// The best descendant of the justified node does not match the epochs the store is
    /// filtering on. `head_weight` is pre-scaled for display.
    InvalidBestNode {
        start_root: Hash256,
        justified_epoch: Epoch,
        finalized_epoch: Epoch,
        head_slot: Slot,
        head_weight: u64,
        head_justified_epoch: Epoch,
        head_finalized_epoch: Epoch,
    },
    InvalidNodeIndex(usize),
    InvalidParentIndex(usize),
    InvalidBestChildIndex(usize),
    InvalidJustifiedIndex(usize),
    InvalidBestDescendant(usize),
    InvalidNodeDelta(usize),
    InvalidParentDelta(usize),
    InvalidDeltaLen { deltas: usize, indices: usize },
    DeltaOverflow(usize),
}
