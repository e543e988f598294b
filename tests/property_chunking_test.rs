//! Property tests for fleet chunking and target sharding.

use flotilla::domain::models::fleet::{chunk_indices, ResourceBudget};
use flotilla::domain::models::shard::split_targets;
use flotilla::domain::models::MAX_GROUP_SIZE;
use proptest::prelude::*;

proptest! {
    #[test]
    fn chunking_invariants_hold_for_any_fleet_size(n in 1usize..=500) {
        let blocks = chunk_indices(n);

        // ceil(n / 10) groups.
        prop_assert_eq!(blocks.len(), n.div_ceil(MAX_GROUP_SIZE));

        // Sizes sum exactly to n, each in [1, 10].
        let total: usize = blocks.iter().map(Vec::len).sum();
        prop_assert_eq!(total, n);
        prop_assert!(blocks.iter().all(|b| (1..=MAX_GROUP_SIZE).contains(&b.len())));

        // Indices are the contiguous run 1..=n.
        let flattened: Vec<usize> = blocks.iter().flatten().copied().collect();
        let expected: Vec<usize> = (1..=n).collect();
        prop_assert_eq!(flattened, expected);
    }

    #[test]
    fn shard_line_counts_always_sum_to_input(len in 0usize..300, shards in 1usize..20) {
        let targets: Vec<String> = (0..len).map(|i| format!("t{i}")).collect();
        let split = split_targets(&targets, shards);

        let total: usize = split.iter().map(Vec::len).sum();
        prop_assert_eq!(total, len);

        if len > 0 {
            prop_assert_eq!(split.len(), shards.min(len));
            // Only the last shard absorbs the remainder.
            let base = len / shards.min(len);
            for shard in &split[..split.len() - 1] {
                prop_assert_eq!(shard.len(), base);
            }
        }
    }

    #[test]
    fn resource_share_never_reaches_the_full_budget(
        total in 0.5f64..256.0,
        instances in 1usize..=100,
    ) {
        let budget = ResourceBudget::new(total, total);
        let share = budget.share_for(instances);

        prop_assert!(share.cpu < total);
        // One decimal place of precision.
        prop_assert!((share.cpu * 10.0 - (share.cpu * 10.0).round()).abs() < 1e-9);
    }
}
