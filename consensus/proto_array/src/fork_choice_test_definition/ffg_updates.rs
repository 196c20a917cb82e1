use super::*;

/// A single chain whose blocks declare increasing justified epochs; moving the store's
/// justified epoch slides the head up and down the chain.
pub fn get_ffg_case_01_test_definition() -> ForkChoiceTestDefinition {
    let balances = vec![1; 2];

    let operations = vec![
        Operation::ProcessBlock {
            slot: Slot::new(0),
            root: Hash256::zero(),
            parent_root: Hash256::zero(),
            justified_epoch: Epoch::new(0),
            finalized_epoch: Epoch::new(0),
        },
        // Build a single chain:
        //
        //        0
        //        |
        //        1 <- justified epoch = 0
        //        |
        //        2 <- justified epoch = 1
        //        |
        //        3 <- justified epoch = 2
        Operation::ProcessBlock {
            slot: Slot::new(1),
            root: get_hash(1),
            parent_root: Hash256::zero(),
            justified_epoch: Epoch::new(0),
            finalized_epoch: Epoch::new(0),
        },
        Operation::ProcessBlock {
            slot: Slot::new(2),
            root: get_hash(2),
            parent_root: get_hash(1),
            justified_epoch: Epoch::new(1),
            finalized_epoch: Epoch::new(0),
        },
        Operation::ProcessBlock {
            slot: Slot::new(3),
            root: get_hash(3),
            parent_root: get_hash(2),
            justified_epoch: Epoch::new(2),
            finalized_epoch: Epoch::new(0),
        },
        // With the store still bootstrapping (epoch 0 matches anything), the head is the
        // tip of the chain.
        Operation::FindHead {
            justified_epoch: Epoch::new(0),
            justified_root: Hash256::zero(),
            finalized_epoch: Epoch::new(0),
            justified_state_balances: balances.clone(),
            expected_head: get_hash(3),
        },
        // Filtering on justified epoch 1 stops at the only block declaring it.
        Operation::FindHead {
            justified_epoch: Epoch::new(1),
            justified_root: Hash256::zero(),
            finalized_epoch: Epoch::new(0),
            justified_state_balances: balances.clone(),
            expected_head: get_hash(2),
        },
        // Filtering on justified epoch 2 moves the head back to the tip.
        Operation::FindHead {
            justified_epoch: Epoch::new(2),
            justified_root: Hash256::zero(),
            finalized_epoch: Epoch::new(0),
            justified_state_balances: balances.clone(),
            expected_head: get_hash(3),
        },
        // Returning to bootstrap re-admits every block.
        Operation::FindHead {
            justified_epoch: Epoch::new(0),
            justified_root: Hash256::zero(),
            finalized_epoch: Epoch::new(0),
            justified_state_balances: balances,
            expected_head: get_hash(3),
        },
    ];

    ForkChoiceTestDefinition {
        justified_epoch: Epoch::new(0),
        finalized_epoch: Epoch::new(0),
        finalized_root: Hash256::zero(),
        operations,
    }
}
