use crate::error::Error;
use crate::proto_array::ProtoArray;
use crate::ssz_container::SszContainer;
use ssz::{Decode, Encode};
use ssz_derive::{Decode, Encode};
use std::collections::HashMap;
use types::{Epoch, Hash256, Slot};

#[derive(Default, Clone, PartialEq, Debug, Encode, Decode)]
pub struct VoteTracker {
    /// The root this validator last voted for *and* that has been accounted for in the
    /// node weights.
    current_root: Hash256,
    /// The most recent root this validator voted for; folded into the weights on the next
    /// `find_head`.
    next_root: Hash256,
    next_epoch: Epoch,
}

/// A `Vec`-wrapper which grows with `Default` entries to satisfy any requested index.
///
/// Used as the per-validator vote table: attestations arrive for arbitrary validator
/// indices and the table grows to meet them.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct ElasticList<T>(pub Vec<T>);

impl<T> ElasticList<T>
where
    T: Default,
{
    fn ensure(&mut self, i: usize) {
        if self.0.len() <= i {
            self.0.resize_with(i + 1, Default::default);
        }
    }

    pub fn get_mut(&mut self, i: usize) -> &mut T {
        self.ensure(i);
        &mut self.0[i]
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.0.iter_mut()
    }
}

/// The LMD-GHOST fork choice, wrapping a `ProtoArray` block tree with per-validator vote
/// tracking and a balances snapshot.
///
/// All mutating operations take `&mut self`; a host that shares the struct across threads
/// must serialize access externally.
#[derive(PartialEq, Debug)]
pub struct ProtoArrayForkChoice {
    pub(crate) proto_array: ProtoArray,
    pub(crate) votes: ElasticList<VoteTracker>,
    pub(crate) balances: Vec<u64>,
}

impl ProtoArrayForkChoice {
    pub fn new(justified_epoch: Epoch, finalized_epoch: Epoch, finalized_root: Hash256) -> Self {
        Self {
            proto_array: ProtoArray {
                justified_epoch,
                finalized_epoch,
                finalized_root,
                nodes: Vec::new(),
                indices: HashMap::new(),
            },
            votes: ElasticList::default(),
            balances: vec![],
        }
    }

    /// Register a block. Re-processing a known root is a no-op.
    ///
    /// The finalized root must be processed before the first `find_head` call, typically
    /// directly after construction.
    pub fn process_block(
        &mut self,
        slot: Slot,
        root: Hash256,
        parent_root: Hash256,
        justified_epoch: Epoch,
        finalized_epoch: Epoch,
    ) -> Result<(), Error> {
        self.proto_array.on_new_block(
            slot,
            root,
            Some(parent_root),
            justified_epoch,
            finalized_epoch,
        )
    }

    /// Register an (aggregate) attestation for `block_root` at `target_epoch`.
    ///
    /// A vote only replaces a validator's pending vote when it is that validator's first,
    /// or when its target epoch is strictly newer. The block does not need to be known;
    /// the vote takes effect on the first `find_head` that can resolve it.
    pub fn process_attestation(
        &mut self,
        validator_indices: &[usize],
        block_root: Hash256,
        target_epoch: Epoch,
    ) {
        for &validator_index in validator_indices {
            let vote = self.votes.get_mut(validator_index);

            if vote.next_root == Hash256::zero() || target_epoch > vote.next_epoch {
                vote.next_root = block_root;
                vote.next_epoch = target_epoch;
            }
        }
    }

    /// Find the current head.
    ///
    /// Folds all pending votes and the difference between the previous and the supplied
    /// balances into the block tree, replaces the balances snapshot, then walks the
    /// best-descendant chain from `justified_root`.
    pub fn find_head(
        &mut self,
        justified_epoch: Epoch,
        justified_root: Hash256,
        finalized_epoch: Epoch,
        justified_state_balances: &[u64],
    ) -> Result<Hash256, Error> {
        let old_balances = &self.balances;
        let new_balances = justified_state_balances;

        let deltas = compute_deltas(
            &self.proto_array.indices,
            &mut self.votes,
            old_balances,
            new_balances,
        )?;

        self.proto_array
            .apply_score_changes(deltas, justified_epoch, finalized_epoch)?;

        self.balances = new_balances.to_vec();

        self.proto_array.find_head(justified_root)
    }

    /// Returns `true` if the block is known to the fork choice.
    pub fn contains_block(&self, block_root: &Hash256) -> bool {
        self.proto_array.indices.contains_key(block_root)
    }

    /// Returns the cumulative weight of the block, if it is known.
    pub fn get_weight(&self, block_root: &Hash256) -> Option<u64> {
        let block_index = self.proto_array.indices.get(block_root)?;
        self.proto_array
            .nodes
            .get(*block_index)
            .map(|node| node.weight)
    }

    /// Returns the pending `(block_root, target_epoch)` vote of a validator, if it has
    /// one.
    pub fn latest_message(&self, validator_index: usize) -> Option<(Hash256, Epoch)> {
        if validator_index < self.votes.0.len() {
            let vote = &self.votes.0[validator_index];

            if *vote == VoteTracker::default() {
                None
            } else {
                Some((vote.next_root, vote.next_epoch))
            }
        } else {
            None
        }
    }

    /// Encode a snapshot of `self` as SSZ bytes. The counterpart of `Self::from_bytes`.
    pub fn as_bytes(&self) -> Vec<u8> {
        SszContainer::from(self).as_ssz_bytes()
    }

    /// Instantiate `Self` from the output of an earlier `Self::as_bytes` call.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, String> {
        SszContainer::from_ssz_bytes(bytes)
            .map(Self::from)
            .map_err(|e| format!("Failed to decode ProtoArrayForkChoice: {:?}", e))
    }
}

/// Returns a list of `deltas`, one per arena index, formed from a change of vote and/or a
/// change between `old_balances` and `new_balances`.
///
/// A validator that swung its vote from block A (with old balance) to block B (with new
/// balance) contributes `+new` at B's index and `-old` at A's index. Roots outside the
/// tree contribute nothing; balances missing from either list read as zero.
///
/// Each processed vote has its `current_root` advanced to `next_root`. Votes whose roots
/// are both the zero hash are skipped before the advancement and remain untouched.
fn compute_deltas(
    indices: &HashMap<Hash256, usize>,
    votes: &mut ElasticList<VoteTracker>,
    old_balances: &[u64],
    new_balances: &[u64],
) -> Result<Vec<i64>, Error> {
    let mut deltas = vec![0_i64; indices.len()];

    for (val_index, vote) in votes.iter_mut().enumerate() {
        // There is no need to create a score change if the validator has never voted or
        // both their votes are for the zero hash (the genesis alias).
        if vote.current_root == Hash256::zero() && vote.next_root == Hash256::zero() {
            continue;
        }

        // A validator not yet known in either balances list is treated as having a
        // balance of zero on that side.
        let old_balance = old_balances.get(val_index).copied().unwrap_or(0);
        let new_balance = new_balances.get(val_index).copied().unwrap_or(0);

        if vote.current_root != vote.next_root || old_balance != new_balance {
            // Ignore votes for blocks that are not in `indices`; they are outside of the
            // tree and carry no weight in it.
            if let Some(next_delta_index) = indices.get(&vote.next_root).copied() {
                let delta = deltas
                    .get(next_delta_index)
                    .ok_or_else(|| Error::InvalidNodeDelta(next_delta_index))?
                    .checked_add(new_balance as i64)
                    .ok_or_else(|| Error::DeltaOverflow(next_delta_index))?;

                // Array access safe due to check on previous line.
                deltas[next_delta_index] = delta;
            }

            if let Some(current_delta_index) = indices.get(&vote.current_root).copied() {
                let delta = deltas
                    .get(current_delta_index)
                    .ok_or_else(|| Error::InvalidNodeDelta(current_delta_index))?
                    .checked_sub(old_balance as i64)
                    .ok_or_else(|| Error::DeltaOverflow(current_delta_index))?;

                // Array access safe due to check on previous line.
                deltas[current_delta_index] = delta;
            }
        }

        // The advancement deliberately sits outside the conditional above: a vote whose
        // root and balance are both unchanged still advances (a no-op), only the
        // zero-hash skip at the top of the loop bypasses it.
        vote.current_root = vote.next_root;
    }

    Ok(deltas)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_hash(i: u64) -> Hash256 {
        Hash256::from_low_u64_be(i)
    }

    fn genesis_fork_choice() -> ProtoArrayForkChoice {
        let mut fork_choice =
            ProtoArrayForkChoice::new(Epoch::new(1), Epoch::new(1), Hash256::zero());

        fork_choice
            .process_block(
                Slot::new(0),
                Hash256::zero(),
                Hash256::zero(),
                Epoch::new(1),
                Epoch::new(1),
            )
            .expect("should process genesis block");

        fork_choice
    }

    #[test]
    fn block_and_vote_queries() {
        let mut fork_choice = genesis_fork_choice();

        fork_choice
            .process_block(
                Slot::new(1),
                get_hash(1),
                Hash256::zero(),
                Epoch::new(1),
                Epoch::new(1),
            )
            .expect("should process block");

        assert!(fork_choice.contains_block(&get_hash(1)));
        assert!(!fork_choice.contains_block(&get_hash(2)));
        assert_eq!(fork_choice.latest_message(0), None);

        fork_choice.process_attestation(&[0, 2], get_hash(1), Epoch::new(2));

        assert_eq!(
            fork_choice.latest_message(0),
            Some((get_hash(1), Epoch::new(2)))
        );
        // Index 1 was materialized by the aggregate but holds no vote.
        assert_eq!(fork_choice.latest_message(1), None);
        assert_eq!(
            fork_choice.latest_message(2),
            Some((get_hash(1), Epoch::new(2)))
        );
        assert_eq!(fork_choice.latest_message(3), None);

        // A target epoch that is not strictly newer does not replace the pending vote.
        fork_choice.process_attestation(&[0], get_hash(2), Epoch::new(2));
        assert_eq!(
            fork_choice.latest_message(0),
            Some((get_hash(1), Epoch::new(2)))
        );

        let head = fork_choice
            .find_head(Epoch::new(1), Hash256::zero(), Epoch::new(1), &[1, 1, 1])
            .expect("should find head");

        assert_eq!(head, get_hash(1));
        assert_eq!(fork_choice.get_weight(&get_hash(1)), Some(2));
        assert_eq!(fork_choice.get_weight(&get_hash(2)), None);
    }

    #[test]
    fn reprocessing_a_known_block_changes_nothing() {
        let mut fork_choice = genesis_fork_choice();

        fork_choice
            .process_block(
                Slot::new(1),
                get_hash(1),
                Hash256::zero(),
                Epoch::new(1),
                Epoch::new(1),
            )
            .expect("should process block");

        let bytes_before = fork_choice.as_bytes();

        fork_choice
            .process_block(
                Slot::new(9),
                get_hash(1),
                get_hash(1),
                Epoch::new(2),
                Epoch::new(2),
            )
            .expect("should ignore known block");

        assert_eq!(fork_choice.as_bytes(), bytes_before);
    }

    #[test]
    fn find_head_with_unknown_justified_root() {
        let mut fork_choice = genesis_fork_choice();

        assert_eq!(
            fork_choice.find_head(Epoch::new(1), get_hash(42), Epoch::new(1), &[]),
            Err(Error::JustifiedNodeUnknown(get_hash(42)))
        );
    }

    #[test]
    fn from_bytes_rejects_garbage() {
        assert!(ProtoArrayForkChoice::from_bytes(&[42]).is_err());
    }
}

#[cfg(test)]
mod test_compute_deltas {
    use super::*;

    /// Gives a hash that is not the zero hash (unless `i` is `u64::max_value`).
    fn hash_from_index(i: usize) -> Hash256 {
        Hash256::from_low_u64_be(i as u64 + 1)
    }

    #[test]
    fn zero_hash() {
        let validator_count: usize = 16;

        let mut indices = HashMap::new();
        let mut votes = ElasticList::default();
        let mut old_balances = vec![];
        let mut new_balances = vec![];

        for i in 0..validator_count {
            indices.insert(hash_from_index(i), i);
            votes.0.push(VoteTracker {
                current_root: Hash256::zero(),
                next_root: Hash256::zero(),
                next_epoch: Epoch::new(0),
            });
            old_balances.push(0);
            new_balances.push(0);
        }

        let deltas = compute_deltas(&indices, &mut votes, &old_balances, &new_balances)
            .expect("should compute deltas");

        assert_eq!(
            deltas.len(),
            validator_count,
            "deltas should have expected length"
        );
        assert_eq!(
            deltas,
            vec![0; validator_count],
            "deltas should all be zero"
        );

        for vote in votes.0 {
            assert_eq!(
                vote.current_root,
                Hash256::zero(),
                "skipped votes should not be advanced"
            );
        }
    }

    #[test]
    fn all_voted_the_same() {
        const BALANCE: u64 = 42;

        let validator_count: usize = 16;

        let mut indices = HashMap::new();
        let mut votes = ElasticList::default();
        let mut old_balances = vec![];
        let mut new_balances = vec![];

        for i in 0..validator_count {
            indices.insert(hash_from_index(i), i);
            votes.0.push(VoteTracker {
                current_root: Hash256::zero(),
                next_root: hash_from_index(0),
                next_epoch: Epoch::new(0),
            });
            old_balances.push(BALANCE);
            new_balances.push(BALANCE);
        }

        let deltas = compute_deltas(&indices, &mut votes, &old_balances, &new_balances)
            .expect("should compute deltas");

        assert_eq!(
            deltas.len(),
            validator_count,
            "deltas should have expected length"
        );

        for (i, delta) in deltas.into_iter().enumerate() {
            if i == 0 {
                assert_eq!(
                    delta,
                    BALANCE as i64 * validator_count as i64,
                    "zero'th root should have a delta"
                );
            } else {
                assert_eq!(delta, 0, "all other deltas should be zero");
            }
        }

        for vote in votes.0 {
            assert_eq!(
                vote.current_root, vote.next_root,
                "the vote should have been advanced"
            );
        }
    }

    #[test]
    fn different_votes() {
        const BALANCE: u64 = 42;

        let validator_count: usize = 16;

        let mut indices = HashMap::new();
        let mut votes = ElasticList::default();
        let mut old_balances = vec![];
        let mut new_balances = vec![];

        for i in 0..validator_count {
            indices.insert(hash_from_index(i), i);
            votes.0.push(VoteTracker {
                current_root: Hash256::zero(),
                next_root: hash_from_index(i),
                next_epoch: Epoch::new(0),
            });
            old_balances.push(BALANCE);
            new_balances.push(BALANCE);
        }

        let deltas = compute_deltas(&indices, &mut votes, &old_balances, &new_balances)
            .expect("should compute deltas");

        assert_eq!(
            deltas.len(),
            validator_count,
            "deltas should have expected length"
        );

        for delta in deltas {
            assert_eq!(
                delta, BALANCE as i64,
                "each root should have the same delta"
            );
        }
    }

    #[test]
    fn moving_votes() {
        const BALANCE: u64 = 42;

        let validator_count: usize = 16;

        let mut indices = HashMap::new();
        let mut votes = ElasticList::default();
        let mut old_balances = vec![];
        let mut new_balances = vec![];

        for i in 0..validator_count {
            indices.insert(hash_from_index(i), i);
            votes.0.push(VoteTracker {
                current_root: hash_from_index(0),
                next_root: hash_from_index(1),
                next_epoch: Epoch::new(0),
            });
            old_balances.push(BALANCE);
            new_balances.push(BALANCE);
        }

        let deltas = compute_deltas(&indices, &mut votes, &old_balances, &new_balances)
            .expect("should compute deltas");

        let total_delta = BALANCE as i64 * validator_count as i64;

        assert_eq!(
            deltas.len(),
            validator_count,
            "deltas should have expected length"
        );

        for (i, delta) in deltas.into_iter().enumerate() {
            if i == 0 {
                assert_eq!(delta, 0 - total_delta, "zero'th root should lose weight");
            } else if i == 1 {
                assert_eq!(delta, total_delta, "first root should gain weight");
            } else {
                assert_eq!(delta, 0, "all other deltas should be zero");
            }
        }

        for vote in votes.0 {
            assert_eq!(
                vote.current_root, vote.next_root,
                "the vote should have been advanced"
            );
        }
    }

    #[test]
    fn move_out_of_tree() {
        const BALANCE: u64 = 42;

        let mut indices = HashMap::new();
        let mut votes = ElasticList::default();

        // There is only one block.
        indices.insert(hash_from_index(1), 0);

        // There are two validators.
        let old_balances = vec![BALANCE; 2];
        let new_balances = vec![BALANCE; 2];

        // One validator moves their vote from the block to the zero hash.
        votes.0.push(VoteTracker {
            current_root: hash_from_index(1),
            next_root: Hash256::zero(),
            next_epoch: Epoch::new(0),
        });

        // One validator moves their vote from the block to something outside the tree.
        votes.0.push(VoteTracker {
            current_root: hash_from_index(1),
            next_root: Hash256::from_low_u64_be(1337),
            next_epoch: Epoch::new(0),
        });

        let deltas = compute_deltas(&indices, &mut votes, &old_balances, &new_balances)
            .expect("should compute deltas");

        assert_eq!(deltas.len(), 1, "deltas should have expected length");
        assert_eq!(
            deltas[0],
            0 - BALANCE as i64 * 2,
            "the block should have lost both votes"
        );

        for vote in votes.0 {
            assert_eq!(
                vote.current_root, vote.next_root,
                "the vote should have been advanced"
            );
        }
    }

    #[test]
    fn changing_balances() {
        const OLD_BALANCE: u64 = 42;
        const NEW_BALANCE: u64 = OLD_BALANCE * 2;

        let validator_count: usize = 16;

        let mut indices = HashMap::new();
        let mut votes = ElasticList::default();
        let mut old_balances = vec![];
        let mut new_balances = vec![];

        for i in 0..validator_count {
            indices.insert(hash_from_index(i), i);
            votes.0.push(VoteTracker {
                current_root: hash_from_index(0),
                next_root: hash_from_index(1),
                next_epoch: Epoch::new(0),
            });
            old_balances.push(OLD_BALANCE);
            new_balances.push(NEW_BALANCE);
        }

        let deltas = compute_deltas(&indices, &mut votes, &old_balances, &new_balances)
            .expect("should compute deltas");

        assert_eq!(
            deltas.len(),
            validator_count,
            "deltas should have expected length"
        );

        for (i, delta) in deltas.into_iter().enumerate() {
            if i == 0 {
                assert_eq!(
                    delta,
                    0 - OLD_BALANCE as i64 * validator_count as i64,
                    "zero'th root should lose the old balances"
                );
            } else if i == 1 {
                assert_eq!(
                    delta,
                    NEW_BALANCE as i64 * validator_count as i64,
                    "first root should gain the new balances"
                );
            } else {
                assert_eq!(delta, 0, "all other deltas should be zero");
            }
        }
    }

    #[test]
    fn validator_appears() {
        const BALANCE: u64 = 42;

        let mut indices = HashMap::new();
        let mut votes = ElasticList::default();

        // There are two blocks.
        indices.insert(hash_from_index(1), 0);
        indices.insert(hash_from_index(2), 1);

        // There is only one validator in the old balances.
        let old_balances = vec![BALANCE; 1];
        // There are two validators in the new balances.
        let new_balances = vec![BALANCE; 2];

        // Both validators move votes from block 1 to block 2.
        for _ in 0..2 {
            votes.0.push(VoteTracker {
                current_root: hash_from_index(1),
                next_root: hash_from_index(2),
                next_epoch: Epoch::new(0),
            });
        }

        let deltas = compute_deltas(&indices, &mut votes, &old_balances, &new_balances)
            .expect("should compute deltas");

        assert_eq!(deltas.len(), 2, "deltas should have expected length");
        assert_eq!(
            deltas[0],
            0 - BALANCE as i64,
            "block 1 should have lost only one balance"
        );
        assert_eq!(
            deltas[1],
            BALANCE as i64 * 2,
            "block 2 should have gained two balances"
        );
    }

    #[test]
    fn validator_disappears() {
        const BALANCE: u64 = 42;

        let mut indices = HashMap::new();
        let mut votes = ElasticList::default();

        // There are two blocks.
        indices.insert(hash_from_index(1), 0);
        indices.insert(hash_from_index(2), 1);

        // There are two validators in the old balances.
        let old_balances = vec![BALANCE; 2];
        // There is only one validator in the new balances.
        let new_balances = vec![BALANCE; 1];

        // Both validators move votes from block 1 to block 2.
        for _ in 0..2 {
            votes.0.push(VoteTracker {
                current_root: hash_from_index(1),
                next_root: hash_from_index(2),
                next_epoch: Epoch::new(0),
            });
        }

        let deltas = compute_deltas(&indices, &mut votes, &old_balances, &new_balances)
            .expect("should compute deltas");

        assert_eq!(deltas.len(), 2, "deltas should have expected length");
        assert_eq!(
            deltas[0],
            0 - BALANCE as i64 * 2,
            "block 1 should have lost both balances"
        );
        assert_eq!(
            deltas[1],
            BALANCE as i64,
            "block 2 should have gained only one balance"
        );
    }
}
