use crate::core::FactorGraph;
use crate::counting::{CountingConfig, NoiseSharing};

pub(super) fn assert_close(found: &[f64], expected: &[f64], tolerance: f64) {
    assert_eq!(found.len(), expected.len(), "{found:?} vs {expected:?}");
    for (k, (f, e)) in found.iter().zip(expected).enumerate() {
        assert!(
            (f - e).abs() < tolerance,
            "Entry {k}: found {f}, expected {e}, error amplitude: {}",
            (f - e).abs()
        );
    }
}

fn binomial(n: usize, k: usize) -> f64 {
    (0..k).fold(1f64, |acc, i| acc * (n - i) as f64 / (i + 1) as f64)
}

/// Posterior of the count computed directly:
/// P(data | c) = sum_k Binomial(k; c, p) * P(data | a fraction k / c of the items is positive)
pub(super) fn closed_form_posterior(config: &CountingConfig) -> Vec<f64> {
    let p = config.item_prior_probability;
    let data = &config.observed_sequence;
    let likelihood = |q: f64| -> f64 {
        match config.noise_sharing {
            NoiseSharing::PerDraw => data
                .iter()
                .enumerate()
                .map(|(i, d)| {
                    let r = config.noise_rate.rate(i);
                    let positive = q * (1f64 - r) + (1f64 - q) * r;
                    if *d {
                        positive
                    } else {
                        1f64 - positive
                    }
                })
                .product(),
            NoiseSharing::Shared => {
                let r = config.noise_rate.rate(0);
                let clean: f64 = data.iter().map(|d| if *d { q } else { 1f64 - q }).product();
                let flipped: f64 = data.iter().map(|d| if *d { 1f64 - q } else { q }).product();
                (1f64 - r) * clean + r * flipped
            }
        }
    };
    let weights: Vec<f64> = (0..=config.max_count)
        .map(|c| {
            if c == 0 {
                return if data.is_empty() { 1f64 } else { 0f64 };
            }
            (0..=c)
                .map(|k| {
                    binomial(c, k)
                        * p.powi(k as i32)
                        * (1f64 - p).powi((c - k) as i32)
                        * likelihood(k as f64 / c as f64)
                })
                .sum()
        })
        .collect();
    let total: f64 = weights.iter().sum();
    weights.iter().map(|w| w / total).collect()
}

/// Marginal of `query` by enumerating every joint assignment
pub(super) fn brute_force_marginal(graph: &FactorGraph, query: usize) -> Vec<f64> {
    let domains: Vec<usize> = graph.variables().iter().map(|v| v.domain_size()).collect();
    let factors = graph.clamped_factors();
    let mut marginal = vec![0f64; domains[query]];
    let mut assignment = vec![0usize; domains.len()];
    let total_assignments: usize = domains.iter().product();
    for _ in 0..total_assignments {
        let weight: f64 = factors
            .iter()
            .map(|f| {
                let local: Vec<usize> = f.scope().iter().map(|id| assignment[id.index()]).collect();
                f.value(&local).unwrap()
            })
            .product();
        marginal[assignment[query]] += weight;
        // mixed radix increment
        for (value, domain) in assignment.iter_mut().zip(&domains) {
            *value += 1;
            if *value < *domain {
                break;
            }
            *value = 0;
        }
    }
    let total: f64 = marginal.iter().sum();
    marginal.iter().map(|w| w / total).collect()
}
