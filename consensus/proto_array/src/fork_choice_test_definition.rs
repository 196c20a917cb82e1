mod ffg_updates;
mod no_votes;
mod votes;

use crate::proto_array_fork_choice::ProtoArrayForkChoice;
use eth2_hashing::hash;
use serde_derive::{Deserialize, Serialize};
use types::{Epoch, Hash256, Slot};

pub use ffg_updates::*;
pub use no_votes::*;
pub use votes::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    FindHead {
        justified_epoch: Epoch,
        justified_root: Hash256,
        finalized_epoch: Epoch,
        justified_state_balances: Vec<u64>,
        expected_head: Hash256,
    },
    InvalidFindHead {
        justified_epoch: Epoch,
        justified_root: Hash256,
        finalized_epoch: Epoch,
        justified_state_balances: Vec<u64>,
    },
    ProcessBlock {
        slot: Slot,
        root: Hash256,
        parent_root: Hash256,
        justified_epoch: Epoch,
        finalized_epoch: Epoch,
    },
    ProcessAttestation {
        validator_indices: Vec<usize>,
        block_root: Hash256,
        target_epoch: Epoch,
    },
    AssertWeight {
        block_root: Hash256,
        weight: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForkChoiceTestDefinition {
    pub justified_epoch: Epoch,
    pub finalized_epoch: Epoch,
    pub finalized_root: Hash256,
    pub operations: Vec<Operation>,
}

impl ForkChoiceTestDefinition {
    pub fn run(self) {
        let mut fork_choice = ProtoArrayForkChoice::new(
            self.justified_epoch,
            self.finalized_epoch,
            self.finalized_root,
        );

        for (op_index, op) in self.operations.into_iter().enumerate() {
            match op.clone() {
                Operation::FindHead {
                    justified_epoch,
                    justified_root,
                    finalized_epoch,
                    justified_state_balances,
                    expected_head,
                } => {
                    let head = fork_choice
                        .find_head(
                            justified_epoch,
                            justified_root,
                            finalized_epoch,
                            &justified_state_balances,
                        )
                        .unwrap_or_else(|e| {
                            panic!("find_head op at index {} returned error {:?}", op_index, e)
                        });

                    assert_eq!(
                        head, expected_head,
                        "operation at index {} failed head check. Operation: {:?}",
                        op_index, op
                    );
                    check_bytes_round_trip(&fork_choice);
                }
                Operation::InvalidFindHead {
                    justified_epoch,
                    justified_root,
                    finalized_epoch,
                    justified_state_balances,
                } => {
                    let result = fork_choice.find_head(
                        justified_epoch,
                        justified_root,
                        finalized_epoch,
                        &justified_state_balances,
                    );

                    assert!(
                        result.is_err(),
                        "operation at index {} was expected to fail. Operation: {:?}",
                        op_index, op
                    );
                    check_bytes_round_trip(&fork_choice);
                }
                Operation::ProcessBlock {
                    slot,
                    root,
                    parent_root,
                    justified_epoch,
                    finalized_epoch,
                } => {
                    fork_choice
                        .process_block(slot, root, parent_root, justified_epoch, finalized_epoch)
                        .unwrap_or_else(|e| {
                            panic!(
                                "process_block op at index {} returned error: {:?}",
                                op_index, e
                            )
                        });
                    check_bytes_round_trip(&fork_choice);
                }
                Operation::ProcessAttestation {
                    validator_indices,
                    block_root,
                    target_epoch,
                } => {
                    fork_choice.process_attestation(&validator_indices, block_root, target_epoch);
                    check_bytes_round_trip(&fork_choice);
                }
                Operation::AssertWeight { block_root, weight } => assert_eq!(
                    fork_choice.get_weight(&block_root),
                    Some(weight),
                    "operation at index {} failed weight check. Operation: {:?}",
                    op_index, op
                ),
            }
        }
    }
}

/// Gives a deterministic root for an integer label: the SHA-256 digest of its
/// little-endian encoding.
fn get_hash(i: u64) -> Hash256 {
    Hash256::from_slice(&hash(&i.to_le_bytes()))
}

/// Asserts that a snapshot of `original` can be taken and restored without change.
fn check_bytes_round_trip(original: &ProtoArrayForkChoice) {
    let bytes = original.as_bytes();
    let decoded =
        ProtoArrayForkChoice::from_bytes(&bytes).expect("fork choice should decode from bytes");
    assert!(
        *original == decoded,
        "fork choice should encode and decode without change"
    );
}
