use std::fmt::Display;

use rand::{distributions::WeightedIndex, Rng};
use rand_distr::Distribution;
use serde::{Deserialize, Serialize};

/// A normalized distribution over `[0, dimension)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discrete {
    probabilities: Vec<f64>,
}

impl Discrete {
    #[inline]
    pub(crate) fn from_normalized(probabilities: Vec<f64>) -> Self {
        Discrete { probabilities }
    }

    /// Uniform distribution over `[0, dimension)`. An empty domain gives `None`
    pub fn uniform(dimension: usize) -> Option<Self> {
        (dimension > 0).then(|| Discrete {
            probabilities: vec![1f64 / dimension as f64; dimension],
        })
    }

    /// Normalizes non-negative weights. Returns `None` if some weight is
    /// negative or not finite, or if all weights are zero
    ///
    /// # Example
    ///
    /// ```
    /// use elimrs::core::Discrete;
    ///
    /// let d = Discrete::from_weights(&[1.0, 3.0]).unwrap();
    /// assert_eq!(d.probabilities(), &[0.25, 0.75]);
    /// assert!(Discrete::from_weights(&[0.0, 0.0]).is_none());
    /// ```
    pub fn from_weights(weights: &[f64]) -> Option<Self> {
        if weights.iter().any(|w| !w.is_finite() || *w < 0f64) {
            return None;
        }
        let total: f64 = weights.iter().sum();
        (total > 0f64).then(|| Discrete {
            probabilities: weights.iter().map(|w| w / total).collect(),
        })
    }

    #[inline]
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Size of the domain
    #[inline]
    pub fn dimension(&self) -> usize {
        self.probabilities.len()
    }

    /// Probability of a value, zero outside of the domain
    #[inline]
    pub fn probability(&self, value: usize) -> f64 {
        self.probabilities.get(value).copied().unwrap_or(0f64)
    }

    /// The most probable value, the smallest one on ties
    pub fn mode(&self) -> usize {
        let mut mode = 0;
        for (value, p) in self.probabilities.iter().enumerate() {
            if *p > self.probabilities[mode] {
                mode = value;
            }
        }
        mode
    }

    pub fn mean(&self) -> f64 {
        self.probabilities
            .iter()
            .enumerate()
            .map(|(value, p)| value as f64 * p)
            .sum()
    }
}

impl Distribution<usize> for Discrete {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        // constructors guarantee a positive total mass
        WeightedIndex::new(&self.probabilities)
            .map_or_else(|_| self.mode(), |index| index.sample(rng))
    }
}

/// Formats a probability with four significant digits, dropping trailing zeros
fn format_probability(p: f64) -> String {
    if p == 0f64 || !p.is_finite() {
        return format!("{}", p);
    }
    let exponent = p.abs().log10().floor() as i32;
    let decimals = (3 - exponent).max(0) as usize;
    let formatted = format!("{:.*}", decimals, p);
    if formatted.contains('.') {
        formatted
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    } else {
        formatted
    }
}

impl Display for Discrete {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let probabilities: Vec<String> = self
            .probabilities
            .iter()
            .map(|p| format_probability(*p))
            .collect();
        write!(f, "Discrete({})", probabilities.join(" "))
    }
}
