//! Property-based tests for inventories and transport movement.

use proptest::prelude::*;
use std::collections::HashMap;
use wainwright_core::id::GoodId;
use wainwright_core::inventory::Inventory;
use wainwright_core::test_utils::*;

// ===========================================================================
// Generators
// ===========================================================================

#[derive(Debug, Clone)]
enum InventoryOp {
    Add(GoodId, i64),
    Remove(GoodId, i64),
}

fn arb_op() -> impl Strategy<Value = InventoryOp> {
    let good = (0..4u32).prop_map(GoodId);
    prop_oneof![
        (good.clone(), 0..50i64).prop_map(|(g, q)| InventoryOp::Add(g, q)),
        (good, 0..50i64).prop_map(|(g, q)| InventoryOp::Remove(g, q)),
    ]
}

// ===========================================================================
// Inventory
// ===========================================================================

proptest! {
    #[test]
    fn inventory_matches_a_saturating_model(ops in proptest::collection::vec(arb_op(), 0..64)) {
        let mut inv = Inventory::new();
        let mut model: HashMap<GoodId, i64> = HashMap::new();

        for op in ops {
            match op {
                InventoryOp::Add(g, q) => {
                    inv.add_item(g, q).unwrap();
                    *model.entry(g).or_default() += q;
                }
                InventoryOp::Remove(g, q) => {
                    inv.remove_item(g, q).unwrap();
                    let entry = model.entry(g).or_default();
                    *entry = (*entry - q).max(0);
                }
            }

            for g in (0..4).map(GoodId) {
                let expected = model.get(&g).copied().unwrap_or(0);
                prop_assert_eq!(i64::from(inv.quantity(g)), expected);
            }
            let all_zero = model.values().all(|&q| q == 0);
            prop_assert_eq!(inv.is_empty(), all_zero);
            prop_assert!(inv.iter().all(|s| s.quantity > 0));
        }
    }

    #[test]
    fn negative_quantities_never_change_the_inventory(
        ops in proptest::collection::vec(arb_op(), 0..16),
        good in 0..4u32,
        quantity in i64::MIN..0,
    ) {
        let mut inv = Inventory::new();
        for op in ops {
            match op {
                InventoryOp::Add(g, q) => inv.add_item(g, q).unwrap(),
                InventoryOp::Remove(g, q) => inv.remove_item(g, q).unwrap(),
            }
        }
        let before = inv.clone();
        prop_assert!(inv.add_item(GoodId(good), quantity).is_err());
        prop_assert!(inv.remove_item(GoodId(good), quantity).is_err());
        prop_assert_eq!(inv, before);
    }
}

// ===========================================================================
// Movement
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// On the 100 px fixture link, travel time is 2 s whatever the chunking:
    /// the arrival step is the first one whose cumulative delta exceeds it.
    #[test]
    fn arrival_time_is_independent_of_chunking(chunks in proptest::collection::vec(1u32..=64, 1..400)) {
        let mut f = two_city_world();
        f.world.buy_transport(f.a, f.link).unwrap();
        f.world.update(secs(0.25));

        // Chunks are multiples of 1/128 s so every sum is exact.
        let mut travelled = 0u32;
        for chunk in chunks {
            let before = travelled;
            travelled += chunk;
            let arrived = !f.world.update(secs(f64::from(chunk) / 128.0)).arrivals.is_empty();
            prop_assert_eq!(arrived, before <= 256 && travelled > 256);
            if arrived {
                break;
            }
        }
    }

    #[test]
    fn power_of_two_chunks_arrive_one_step_after_two_seconds(k in 0u32..8) {
        let steps = 1u32 << k;
        let chunk = 2.0 / f64::from(steps);

        let mut f = two_city_world();
        f.world.buy_transport(f.a, f.link).unwrap();
        f.world.update(secs(0.25));

        for _ in 0..steps {
            prop_assert!(f.world.update(secs(chunk)).arrivals.is_empty());
        }
        prop_assert_eq!(f.world.update(secs(chunk)).arrivals.len(), 1);
    }
}
