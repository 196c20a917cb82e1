use super::*;

pub fn get_no_votes_test_definition() -> ForkChoiceTestDefinition {
    let balances = vec![];

    let operations = vec![
        // The zero hash aliases the finalized genesis block and must be inserted before
        // the first head request.
        Operation::ProcessBlock {
            slot: Slot::new(0),
            root: Hash256::zero(),
            parent_root: Hash256::zero(),
            justified_epoch: Epoch::new(1),
            finalized_epoch: Epoch::new(1),
        },
        // With a bare genesis the head is the genesis alias itself.
        Operation::FindHead {
            justified_epoch: Epoch::new(1),
            justified_root: Hash256::zero(),
            finalized_epoch: Epoch::new(1),
            justified_state_balances: balances.clone(),
            expected_head: Hash256::zero(),
        },
        // Add block 2:
        //
        //         0
        //        /
        //        2
        Operation::ProcessBlock {
            slot: Slot::new(1),
            root: get_hash(2),
            parent_root: Hash256::zero(),
            justified_epoch: Epoch::new(1),
            finalized_epoch: Epoch::new(1),
        },
        // The only child is the head.
        Operation::FindHead {
            justified_epoch: Epoch::new(1),
            justified_root: Hash256::zero(),
            finalized_epoch: Epoch::new(1),
            justified_state_balances: balances.clone(),
            expected_head: get_hash(2),
        },
        // Add block 1:
        //
        //         0
        //        / \
        //        2  1
        Operation::ProcessBlock {
            slot: Slot::new(1),
            root: get_hash(1),
            parent_root: Hash256::zero(),
            justified_epoch: Epoch::new(1),
            finalized_epoch: Epoch::new(1),
        },
        // Both siblings are weightless; the larger root breaks the tie.
        Operation::FindHead {
            justified_epoch: Epoch::new(1),
            justified_root: Hash256::zero(),
            finalized_epoch: Epoch::new(1),
            justified_state_balances: balances.clone(),
            expected_head: get_hash(2),
        },
        // Add block 3 below block 1:
        //
        //         0
        //        / \
        //        2  1
        //           |
        //           3
        Operation::ProcessBlock {
            slot: Slot::new(2),
            root: get_hash(3),
            parent_root: get_hash(1),
            justified_epoch: Epoch::new(1),
            finalized_epoch: Epoch::new(1),
        },
        // A deeper subtree does not help block 1: the sibling tie still falls to
        // block 2.
        Operation::FindHead {
            justified_epoch: Epoch::new(1),
            justified_root: Hash256::zero(),
            finalized_epoch: Epoch::new(1),
            justified_state_balances: balances.clone(),
            expected_head: get_hash(2),
        },
        // Add block 4 below block 2:
        //
        //         0
        //        / \
        //        2  1
        //        |  |
        //        4  3
        Operation::ProcessBlock {
            slot: Slot::new(2),
            root: get_hash(4),
            parent_root: get_hash(2),
            justified_epoch: Epoch::new(1),
            finalized_epoch: Epoch::new(1),
        },
        // The winning branch is followed to its leaf.
        Operation::FindHead {
            justified_epoch: Epoch::new(1),
            justified_root: Hash256::zero(),
            finalized_epoch: Epoch::new(1),
            justified_state_balances: balances.clone(),
            expected_head: get_hash(4),
        },
        // Add block 5 below block 4, declaring justified epoch 2:
        //
        //         0
        //        / \
        //        2  1
        //        |  |
        //        4  3
        //        |
        //        5 <- justified epoch = 2
        Operation::ProcessBlock {
            slot: Slot::new(3),
            root: get_hash(5),
            parent_root: get_hash(4),
            justified_epoch: Epoch::new(2),
            finalized_epoch: Epoch::new(1),
        },
        // Block 5 disagrees with justified epoch 1, so the head stops above it.
        Operation::FindHead {
            justified_epoch: Epoch::new(1),
            justified_root: Hash256::zero(),
            finalized_epoch: Epoch::new(1),
            justified_state_balances: balances.clone(),
            expected_head: get_hash(4),
        },
        // Starting from block 5 while still filtering on epoch 1 is a caller error.
        Operation::InvalidFindHead {
            justified_epoch: Epoch::new(1),
            justified_root: get_hash(5),
            finalized_epoch: Epoch::new(1),
            justified_state_balances: balances.clone(),
        },
        // Moving the justified epoch to 2 makes block 5 the head.
        Operation::FindHead {
            justified_epoch: Epoch::new(2),
            justified_root: get_hash(5),
            finalized_epoch: Epoch::new(1),
            justified_state_balances: balances.clone(),
            expected_head: get_hash(5),
        },
        // Add block 6 below block 5:
        //
        //         0
        //        / \
        //        2  1
        //        |  |
        //        4  3
        //        |
        //        5
        //        |
        //        6
        Operation::ProcessBlock {
            slot: Slot::new(4),
            root: get_hash(6),
            parent_root: get_hash(5),
            justified_epoch: Epoch::new(2),
            finalized_epoch: Epoch::new(1),
        },
        Operation::FindHead {
            justified_epoch: Epoch::new(2),
            justified_root: get_hash(5),
            finalized_epoch: Epoch::new(1),
            justified_state_balances: balances,
            expected_head: get_hash(6),
        },
    ];

    ForkChoiceTestDefinition {
        justified_epoch: Epoch::new(0),
        finalized_epoch: Epoch::new(0),
        finalized_root: Hash256::zero(),
        operations,
    }
}

/// Focuses on the tie-break rule: equal-weight siblings are separated by comparing the
/// full 32 bytes of their roots, the strictly greater root winning.
pub fn get_tie_break_test_definition() -> ForkChoiceTestDefinition {
    let balances = vec![];

    let operations = vec![
        Operation::ProcessBlock {
            slot: Slot::new(0),
            root: Hash256::zero(),
            parent_root: Hash256::zero(),
            justified_epoch: Epoch::new(1),
            finalized_epoch: Epoch::new(1),
        },
        // Add block 1:
        //
        //         0
        //        /
        //        1
        Operation::ProcessBlock {
            slot: Slot::new(1),
            root: get_hash(1),
            parent_root: Hash256::zero(),
            justified_epoch: Epoch::new(1),
            finalized_epoch: Epoch::new(1),
        },
        Operation::FindHead {
            justified_epoch: Epoch::new(1),
            justified_root: Hash256::zero(),
            finalized_epoch: Epoch::new(1),
            justified_state_balances: balances.clone(),
            expected_head: get_hash(1),
        },
        // Add block 2, whose root is greater than block 1's:
        //
        //         0
        //        / \
        //        1  2
        Operation::ProcessBlock {
            slot: Slot::new(1),
            root: get_hash(2),
            parent_root: Hash256::zero(),
            justified_epoch: Epoch::new(1),
            finalized_epoch: Epoch::new(1),
        },
        Operation::FindHead {
            justified_epoch: Epoch::new(1),
            justified_root: Hash256::zero(),
            finalized_epoch: Epoch::new(1),
            justified_state_balances: balances.clone(),
            expected_head: get_hash(2),
        },
        // Add block 4 below block 1:
        //
        //         0
        //        / \
        //        1  2
        //        |
        //        4
        Operation::ProcessBlock {
            slot: Slot::new(2),
            root: get_hash(4),
            parent_root: get_hash(1),
            justified_epoch: Epoch::new(1),
            finalized_epoch: Epoch::new(1),
        },
        // The tie is between the siblings under the root, not their descendants; block 2
        // still wins.
        Operation::FindHead {
            justified_epoch: Epoch::new(1),
            justified_root: Hash256::zero(),
            finalized_epoch: Epoch::new(1),
            justified_state_balances: balances.clone(),
            expected_head: get_hash(2),
        },
        // Add block 3 below block 2:
        //
        //         0
        //        / \
        //        1  2
        //        |  |
        //        4  3
        Operation::ProcessBlock {
            slot: Slot::new(2),
            root: get_hash(3),
            parent_root: get_hash(2),
            justified_epoch: Epoch::new(1),
            finalized_epoch: Epoch::new(1),
        },
        Operation::FindHead {
            justified_epoch: Epoch::new(1),
            justified_root: Hash256::zero(),
            finalized_epoch: Epoch::new(1),
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
