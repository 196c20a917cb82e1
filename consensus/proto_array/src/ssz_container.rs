use crate::proto_array::{ProtoArray, ProtoNode};
use crate::proto_array_fork_choice::{ElasticList, ProtoArrayForkChoice, VoteTracker};
use ssz_derive::{Decode, Encode};
use std::collections::HashMap;
use types::{Epoch, Hash256};

/// SSZ mirror of `ProtoArrayForkChoice`, used when a snapshot of the fork choice is
/// encoded for an external persister.
#[derive(Encode, Decode)]
pub struct SszContainer {
    votes: Vec<VoteTracker>,
    balances: Vec<u64>,
    justified_epoch: Epoch,
    finalized_epoch: Epoch,
    finalized_root: Hash256,
    nodes: Vec<ProtoNode>,
}

impl From<&ProtoArrayForkChoice> for SszContainer {
    fn from(from: &ProtoArrayForkChoice) -> Self {
        Self {
            votes: from.votes.0.clone(),
            balances: from.balances.clone(),
            justified_epoch: from.proto_array.justified_epoch,
            finalized_epoch: from.proto_array.finalized_epoch,
            finalized_root: from.proto_array.finalized_root,
            nodes: from.proto_array.nodes.clone(),
        }
    }
}

impl From<SszContainer> for ProtoArrayForkChoice {
    fn from(from: SszContainer) -> Self {
        // Nodes are stored in insertion order, so the lookup map is derivable.
        let indices: HashMap<Hash256, usize> = from
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.root, index))
            .collect();

        let proto_array = ProtoArray {
            justified_epoch: from.justified_epoch,
            finalized_epoch: from.finalized_epoch,
            finalized_root: from.finalized_root,
            nodes: from.nodes,
            indices,
        };

        Self {
            proto_array,
            votes: ElasticList(from.votes),
            balances: from.balances,
        }
    }
}
