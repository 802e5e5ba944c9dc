//! Ranking properties over arbitrary score sets.

use highscore::{Credential, DocumentStore, Query, RankRecalculator, ScoreRecord};
use proptest::prelude::*;

use crate::support::{master_key, seed, store};

fn score() -> impl Strategy<Value = f64> {
    prop_oneof![
        8 => (-20i32..20).prop_map(f64::from),
        1 => Just(f64::NAN),
        1 => Just(f64::INFINITY),
    ]
}

fn entries() -> impl Strategy<Value = Vec<(f64, u64)>> {
    prop::collection::vec((score(), 0u64..12), 0..24)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn one_pass_yields_a_dense_descending_ranking(entries in entries()) {
        let store = store();
        for (i, (score, rank)) in entries.iter().enumerate() {
            seed(&store, &format!("p{}", i), *score, *rank);
        }

        let recalculator = RankRecalculator::new(store.clone(), master_key());
        let report = recalculator.run_pass().unwrap();
        prop_assert!(report.failed.is_empty());

        let mut records: Vec<ScoreRecord> = store
            .query::<ScoreRecord>(&Credential::master(master_key()), &Query::new())
            .unwrap()
            .into_iter()
            .map(|r| r.data)
            .collect();
        records.sort_by_key(|r| r.rank);

        let found: Vec<u64> = records.iter().map(|r| r.rank).collect();
        let expected: Vec<u64> = (1..=entries.len() as u64).collect();
        prop_assert_eq!(found, expected);

        for pair in records.windows(2) {
            let (better, worse) = (&pair[0], &pair[1]);
            if worse.has_finite_score() {
                prop_assert!(better.has_finite_score());
                prop_assert!(better.score >= worse.score);
            }
        }

        prop_assert!(recalculator.run_pass().unwrap().is_quiescent());
    }
}
