//! Property-based tests for the statistics primitives and the engine
//!
//! Core properties tested:
//! 1. Mean lies within [min, max] of its input
//! 2. Population variance is non-negative and exactly zero for constant input
//! 3. A bootstrap resample mean lies within [min, max] of the samples
//! 4. Constant samples always converge for any positive tolerance
//! 5. The converged flag is monotonic across arbitrary submit/evaluate interleavings
//! 6. Evaluation is gated on min_samples

use latconv::stats::{bootstrap_mean, mean, variance, BootstrapEstimate};
use latconv::{ConvergenceConfig, ConvergenceEngine, Evaluation, SampleStore};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_mean_within_bounds(xs in prop::collection::vec(-1.0e9f64..1.0e9, 1..200)) {
        let m = mean(&xs).unwrap();
        let lo = xs.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let eps = 1e-9 * (lo.abs().max(hi.abs()) + 1.0);
        prop_assert!(m >= lo - eps && m <= hi + eps);
    }

    #[test]
    fn prop_variance_non_negative(xs in prop::collection::vec(-1.0e6f64..1.0e6, 1..200)) {
        let m = mean(&xs).unwrap();
        prop_assert!(variance(&xs, m).unwrap() >= 0.0);
    }

    #[test]
    fn prop_constant_input_zero_variance(value in -1.0e12f64..1.0e12, len in 1usize..500) {
        let xs = vec![value; len];
        let m = mean(&xs).unwrap();
        prop_assert_eq!(m, value);
        prop_assert_eq!(variance(&xs, m).unwrap(), 0.0);
    }

    #[test]
    fn prop_bootstrap_mean_within_bounds(
        xs in prop::collection::vec(0i64..10_000_000_000, 1..100),
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let m = bootstrap_mean(&xs, &mut rng).unwrap();
        let lo = *xs.iter().min().unwrap() as f64;
        let hi = *xs.iter().max().unwrap() as f64;
        prop_assert!(m >= lo && m <= hi);
    }

    #[test]
    fn prop_constant_samples_always_stable(
        value in 1i64..10_000_000_000,
        len in 1usize..200,
        resamples in 1usize..200,
        tolerance in 1.0e-9f64..1.0,
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let estimate = BootstrapEstimate::compute(&vec![value; len], resamples, &mut rng).unwrap();
        prop_assert_eq!(estimate.std_dev, 0.0);
        prop_assert!(estimate.is_stable(tolerance));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn prop_converged_flag_monotonic(
        ops in prop::collection::vec(prop_oneof![
            (1i64..1_000_000).prop_map(Some),
            Just(None),
        ], 1..150),
        min_samples in 1usize..20,
        tolerance in 0.001f64..0.5,
        seed in any::<u64>(),
    ) {
        // Some(v) = submit v, None = run one evaluation tick
        let store = Arc::new(SampleStore::new());
        let config = ConvergenceConfig {
            resamples: Some(50),
            seed: Some(seed),
            ..ConvergenceConfig::new(min_samples, tolerance)
        };
        let mut engine = ConvergenceEngine::new(Arc::clone(&store), config).unwrap();

        let mut seen_converged = false;
        let mut submitted = 0usize;
        for op in ops {
            let converged = match op {
                Some(v) => {
                    submitted += 1;
                    store.submit(v)
                }
                None => {
                    let evaluation = engine.evaluate().unwrap();
                    if evaluation.is_converged() {
                        prop_assert!(submitted >= min_samples);
                    }
                    if let Evaluation::Insufficient { have, need } = evaluation {
                        prop_assert!(have < need || have == 0);
                    }
                    store.is_converged()
                }
            };
            prop_assert!(!(seen_converged && !converged));
            seen_converged |= converged;
        }
        prop_assert_eq!(store.len(), submitted);
    }
}
