use proptest::prelude::*;

use super::utils::closed_form_posterior;
use crate::core::InferenceOptions;
use crate::counting::{posterior_over_count, CountingConfig};

fn small_config() -> impl Strategy<Value = CountingConfig> {
    (
        0usize..5,
        0f64..=1f64,
        0f64..=1f64,
        prop::collection::vec(any::<bool>(), 0..5),
    )
        .prop_map(|(max_count, prior, noise, observed)| {
            CountingConfig::new(max_count, prior, noise, observed)
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn posterior_matches_closed_form(config in small_config()) {
        let options = InferenceOptions::default();
        match posterior_over_count(&config, &options) {
            Ok(posterior) => {
                let total: f64 = posterior.probabilities().iter().sum();
                prop_assert!((total - 1.).abs() < 1e-9);
                prop_assert!(posterior.probabilities().iter().all(|p| *p >= 0.));
                let expected = closed_form_posterior(&config);
                for (found, expected) in posterior.probabilities().iter().zip(&expected) {
                    prop_assert!((found - expected).abs() < 1e-9, "{} vs {}", found, expected);
                }
            }
            // only degenerate configurations have no mass
            Err(_) => prop_assert!(
                config.max_count == 0
                    || config.item_prior_probability == 0.
                    || config.item_prior_probability == 1.
                    || config.noise_rate.rate(0) == 0.
                    || config.noise_rate.rate(0) == 1.
            ),
        }
    }

    #[test]
    fn posterior_ignores_observation_order(
        config in small_config(),
        seed in any::<u64>(),
    ) {
        use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

        let mut shuffled = config.clone();
        shuffled.observed_sequence.shuffle(&mut StdRng::seed_from_u64(seed));
        let options = InferenceOptions::default();
        let original = posterior_over_count(&config, &options);
        let reordered = posterior_over_count(&shuffled, &options);
        match (original, reordered) {
            (Ok(a), Ok(b)) => {
                for (x, y) in a.probabilities().iter().zip(b.probabilities()) {
                    prop_assert!((x - y).abs() < 1e-12);
                }
            }
            (a, b) => prop_assert_eq!(a.is_err(), b.is_err()),
        }
    }
}
