use super::*;

pub fn get_votes_test_definition() -> ForkChoiceTestDefinition {
    let balances = vec![1; 2];

    let operations = vec![
        Operation::ProcessBlock {
            slot: Slot::new(0),
            root: Hash256::zero(),
            parent_root: Hash256::zero(),
            justified_epoch: Epoch::new(1),
            finalized_epoch: Epoch::new(1),
        },
        // Two competing blocks below the genesis alias:
        //
        //         0
        //        / \
        //        2  1
        Operation::ProcessBlock {
            slot: Slot::new(1),
            root: get_hash(2),
            parent_root: Hash256::zero(),
            justified_epoch: Epoch::new(1),
            finalized_epoch: Epoch::new(1),
        },
        Operation::ProcessBlock {
            slot: Slot::new(1),
            root: get_hash(1),
            parent_root: Hash256::zero(),
            justified_epoch: Epoch::new(1),
            finalized_epoch: Epoch::new(1),
        },
        // Validator 0 votes for block 1, outweighing the root tie-break.
        Operation::ProcessAttestation {
            validator_indices: vec![0],
            block_root: get_hash(1),
            target_epoch: Epoch::new(2),
        },
        Operation::FindHead {
            justified_epoch: Epoch::new(1),
            justified_root: Hash256::zero(),
            finalized_epoch: Epoch::new(1),
            justified_state_balances: balances.clone(),
            expected_head: get_hash(1),
        },
        // Validator 1 votes for block 2, restoring the tie; block 2 wins it.
        Operation::ProcessAttestation {
            validator_indices: vec![1],
            block_root: get_hash(2),
            target_epoch: Epoch::new(2),
        },
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
        // Validator 0 moves its vote down to block 3. Block 1 inherits the weight, so
        // the sibling tie stands and block 2 keeps the head.
        Operation::ProcessAttestation {
            validator_indices: vec![0],
            block_root: get_hash(3),
            target_epoch: Epoch::new(3),
        },
        Operation::FindHead {
            justified_epoch: Epoch::new(1),
            justified_root: Hash256::zero(),
            finalized_epoch: Epoch::new(1),
            justified_state_balances: balances.clone(),
            expected_head: get_hash(2),
        },
        Operation::AssertWeight {
            block_root: get_hash(1),
            weight: 1,
        },
        Operation::AssertWeight {
            block_root: get_hash(2),
            weight: 1,
        },
        Operation::AssertWeight {
            block_root: get_hash(3),
            weight: 1,
        },
        // Validator 1 abandons block 2; the whole left branch now carries both votes and
        // the head descends to block 3.
        Operation::ProcessAttestation {
            validator_indices: vec![1],
            block_root: get_hash(1),
            target_epoch: Epoch::new(3),
        },
        Operation::FindHead {
            justified_epoch: Epoch::new(1),
            justified_root: Hash256::zero(),
            finalized_epoch: Epoch::new(1),
            justified_state_balances: balances.clone(),
            expected_head: get_hash(3),
        },
        Operation::AssertWeight {
            block_root: get_hash(1),
            weight: 2,
        },
        Operation::AssertWeight {
            block_root: get_hash(2),
            weight: 0,
        },
        Operation::AssertWeight {
            block_root: get_hash(3),
            weight: 1,
        },
        // An attestation with a stale target epoch changes nothing.
        Operation::ProcessAttestation {
            validator_indices: vec![1],
            block_root: get_hash(2),
            target_epoch: Epoch::new(2),
        },
        Operation::FindHead {
            justified_epoch: Epoch::new(1),
            justified_root: Hash256::zero(),
            finalized_epoch: Epoch::new(1),
            justified_state_balances: balances.clone(),
            expected_head: get_hash(3),
        },
        // Neither does re-running the head with identical balances.
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

/// Balances swinging the head between two voted-for siblings: zeroing, restoring and
/// truncating the balances list.
pub fn get_balance_change_test_definition() -> ForkChoiceTestDefinition {
    let operations = vec![
        Operation::ProcessBlock {
            slot: Slot::new(0),
            root: Hash256::zero(),
            parent_root: Hash256::zero(),
            justified_epoch: Epoch::new(1),
            finalized_epoch: Epoch::new(1),
        },
        //         0
        //        / \
        //        9  10
        Operation::ProcessBlock {
            slot: Slot::new(1),
            root: get_hash(9),
            parent_root: Hash256::zero(),
            justified_epoch: Epoch::new(1),
            finalized_epoch: Epoch::new(1),
        },
        Operation::ProcessBlock {
            slot: Slot::new(1),
            root: get_hash(10),
            parent_root: Hash256::zero(),
            justified_epoch: Epoch::new(1),
            finalized_epoch: Epoch::new(1),
        },
        // Validators 0 and 1 vote for block 9; validators 2, 3 and 4 for block 10.
        Operation::ProcessAttestation {
            validator_indices: vec![0, 1],
            block_root: get_hash(9),
            target_epoch: Epoch::new(2),
        },
        Operation::ProcessAttestation {
            validator_indices: vec![2, 3, 4],
            block_root: get_hash(10),
            target_epoch: Epoch::new(2),
        },
        // Three votes against two.
        Operation::FindHead {
            justified_epoch: Epoch::new(1),
            justified_root: Hash256::zero(),
            finalized_epoch: Epoch::new(1),
            justified_state_balances: vec![1, 1, 1, 1, 1],
            expected_head: get_hash(10),
        },
        Operation::AssertWeight {
            block_root: get_hash(9),
            weight: 2,
        },
        Operation::AssertWeight {
            block_root: get_hash(10),
            weight: 3,
        },
        // Zeroing validators 3 and 4 flips the majority.
        Operation::FindHead {
            justified_epoch: Epoch::new(1),
            justified_root: Hash256::zero(),
            finalized_epoch: Epoch::new(1),
            justified_state_balances: vec![1, 1, 1, 0, 0],
            expected_head: get_hash(9),
        },
        Operation::AssertWeight {
            block_root: get_hash(9),
            weight: 2,
        },
        Operation::AssertWeight {
            block_root: get_hash(10),
            weight: 1,
        },
        // Restoring the balances restores the majority.
        Operation::FindHead {
            justified_epoch: Epoch::new(1),
            justified_root: Hash256::zero(),
            finalized_epoch: Epoch::new(1),
            justified_state_balances: vec![1, 1, 1, 1, 1],
            expected_head: get_hash(10),
        },
        // A truncated balances list reads as zero for the missing validators.
        Operation::FindHead {
            justified_epoch: Epoch::new(1),
            justified_root: Hash256::zero(),
            finalized_epoch: Epoch::new(1),
            justified_state_balances: vec![1, 1, 1],
            expected_head: get_hash(9),
        },
        Operation::AssertWeight {
            block_root: get_hash(10),
            weight: 1,
        },
    ];

    ForkChoiceTestDefinition {
        justified_epoch: Epoch::new(0),
        finalized_epoch: Epoch::new(0),
        finalized_root: Hash256::zero(),
        operations,
    }
}

/// Two symmetric branches of depth five, swung by single votes and then filtered by a
/// justified epoch declared midway up one branch.
pub fn get_competing_branches_test_definition() -> ForkChoiceTestDefinition {
    let balances = vec![1; 2];
    let mut operations = vec![Operation::ProcessBlock {
        slot: Slot::new(0),
        root: Hash256::zero(),
        parent_root: Hash256::zero(),
        justified_epoch: Epoch::new(0),
        finalized_epoch: Epoch::new(0),
    }];

    // Interleave two chains off the genesis alias; odd roots on the left, even on the
    // right. Only block 7 declares justified epoch 1:
    //
    //          0
    //         / \
    //        1   2
    //        |   |
    //        3   4
    //        |   |
    //        5   6
    //        |   |
    //        7   8
    //        |   |
    //        9  10
    for i in 1..=10_u64 {
        let parent = if i <= 2 { Hash256::zero() } else { get_hash(i - 2) };
        let justified_epoch = if i == 7 { Epoch::new(1) } else { Epoch::new(0) };

        operations.push(Operation::ProcessBlock {
            slot: Slot::new((i + 1) / 2),
            root: get_hash(i),
            parent_root: parent,
            justified_epoch,
            finalized_epoch: Epoch::new(0),
        });
    }

    operations.extend(vec![
        // Weightless, the branch tie at the root falls to block 2 and its leaf wins.
        Operation::FindHead {
            justified_epoch: Epoch::new(0),
            justified_root: Hash256::zero(),
            finalized_epoch: Epoch::new(0),
            justified_state_balances: balances.clone(),
            expected_head: get_hash(10),
        },
        // One vote on the left branch outweighs the tie-break.
        Operation::ProcessAttestation {
            validator_indices: vec![0],
            block_root: get_hash(1),
            target_epoch: Epoch::new(0),
        },
        Operation::FindHead {
            justified_epoch: Epoch::new(0),
            justified_root: Hash256::zero(),
            finalized_epoch: Epoch::new(0),
            justified_state_balances: balances.clone(),
            expected_head: get_hash(9),
        },
        Operation::AssertWeight {
            block_root: get_hash(1),
            weight: 1,
        },
        // A matching vote on the right restores the tie.
        Operation::ProcessAttestation {
            validator_indices: vec![1],
            block_root: get_hash(2),
            target_epoch: Epoch::new(0),
        },
        Operation::FindHead {
            justified_epoch: Epoch::new(0),
            justified_root: Hash256::zero(),
            finalized_epoch: Epoch::new(0),
            justified_state_balances: balances.clone(),
            expected_head: get_hash(10),
        },
        // Filtering on justified epoch 1 from inside the left branch stops at the only
        // node declaring it.
        Operation::FindHead {
            justified_epoch: Epoch::new(1),
            justified_root: get_hash(1),
            finalized_epoch: Epoch::new(0),
            justified_state_balances: balances,
            expected_head: get_hash(7),
        },
    ]);

    ForkChoiceTestDefinition {
        justified_epoch: Epoch::new(0),
        finalized_epoch: Epoch::new(0),
        finalized_root: Hash256::zero(),
        operations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn votes() {
        get_votes_test_definition().run();
    }

    #[test]
    fn balance_changes() {
        get_balance_change_test_definition().run();
    }

    #[test]
    fn competing_branches() {
        get_competing_branches_test_definition().run();
    }
}
