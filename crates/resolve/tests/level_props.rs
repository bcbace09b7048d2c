// Property tests for the level step function.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use proptest::prelude::*;
use questgrid_resolve::config::LevelConfig;
use questgrid_resolve::LevelCalculator;

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

/// Ascending table built from non-negative gaps, zero-width brackets included.
fn arb_table() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(0u64..500, 1..20).prop_map(|gaps| {
        let mut acc = 0u64;
        gaps.into_iter()
            .map(|g| {
                acc += g;
                acc
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(config())]

    #[test]
    fn level_and_progress_stay_in_bounds(table in arb_table(), xp in 0u64..20_000) {
        let calc = LevelCalculator::new(&table);
        let info = calc.level_info(xp);
        prop_assert!(info.level >= 1);
        prop_assert!(info.level <= calc.max_level());
        prop_assert!((0.0..=1.0).contains(&info.progress));
    }

    #[test]
    fn level_never_decreases_with_xp(table in arb_table(), a in 0u64..20_000, b in 0u64..20_000) {
        let calc = LevelCalculator::new(&table);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(calc.level_for(lo) <= calc.level_for(hi));
    }

    #[test]
    fn reference_table_bounds(xp in any::<u64>()) {
        let table = LevelConfig::default().thresholds;
        let info = LevelCalculator::new(&table).level_info(xp);
        prop_assert!((1..=16).contains(&info.level));
        prop_assert!((0.0..=1.0).contains(&info.progress));
    }
}
