use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{FGBuilderError, DEFAULT_MAX_TABLE_SIZE};

// ------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
/// Errors in a counting model configuration
pub enum ConfigError {
    /// The population bound is negative
    #[error("max_count must be non-negative, got {0}")]
    NegativeMaxCount(i64),

    /// A probability is outside of [0, 1]
    #[error("{name} must lie in [0, 1], got {value}")]
    ProbabilityOutOfRange { name: String, value: f64 },

    /// The model tables would not fit into memory
    #[error(
        "A model with max_count {max_count} and {draws} draws needs more than {limit} table entries"
    )]
    ModelTooLarge {
        max_count: usize,
        draws: usize,
        limit: usize,
    },

    /// A per-draw noise vector has a wrong length
    #[error("Expected {expected} per-draw noise rates (one per observation), got {found}")]
    NoiseLengthMismatch { expected: usize, found: usize },

    /// A shared switch variable needs a single noise rate
    #[error("Shared noise needs a scalar noise rate, got a per-draw list")]
    SharedNoiseRequiresScalar,

    /// An observation string holds something other than `+` or `-`
    #[error("Unexpected observation {0:?}, expected `+` or `-`")]
    InvalidObservation(char),

    /// A configuration could not be parsed
    #[error("Failed to parse a configuration: {0}")]
    Parse(String),

    /// A configuration could not be serialized
    #[error("Failed to serialize a configuration: {0}")]
    Serialize(String),

    /// The model graph could not be assembled
    #[error("Failed to assemble the model graph: {0}")]
    Graph(#[from] FGBuilderError),
}

/// Counting configuration result type
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Probability that a reported observation is flipped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NoiseRate {
    /// The same rate for every draw
    Scalar(f64),

    /// One rate per draw
    PerDraw(Vec<f64>),
}

impl Default for NoiseRate {
    fn default() -> Self {
        NoiseRate::Scalar(0f64)
    }
}

impl NoiseRate {
    /// Noise rate of the given draw
    #[inline]
    pub fn rate(&self, draw: usize) -> f64 {
        match self {
            NoiseRate::Scalar(rate) => *rate,
            NoiseRate::PerDraw(rates) => rates.get(draw).copied().unwrap_or(0f64),
        }
    }
}

/// How the noise switch is shared between draws
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseSharing {
    /// An independent switch variable per draw
    #[default]
    PerDraw,

    /// One switch variable flipping either all draws or none
    Shared,
}

fn default_item_prior_probability() -> f64 {
    0.5
}

/// Configuration of the counting model: a population of unknown size
/// (uniform over `0..=max_count`), each item positive with probability
/// `item_prior_probability`, observed through noisy draws with replacement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountingConfig {
    /// Optional scenario label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Inclusive upper bound on the population size
    pub max_count: usize,

    /// Prior probability that an item is positive
    #[serde(default = "default_item_prior_probability")]
    pub item_prior_probability: f64,

    /// Probability that an observation is flipped
    #[serde(default)]
    pub noise_rate: NoiseRate,

    #[serde(default)]
    pub noise_sharing: NoiseSharing,

    /// Reported observations, `true` for positive
    #[serde(default)]
    pub observed_sequence: Vec<bool>,
}

impl CountingConfig {
    /// Creates a configuration with a scalar per-draw noise rate
    ///
    /// # Example
    ///
    /// ```
    /// use elimrs::counting::CountingConfig;
    ///
    /// let config = CountingConfig::new(8, 0.5, 0.2, vec![true; 10]);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new(
        max_count: usize,
        item_prior_probability: f64,
        noise_rate: f64,
        observed_sequence: Vec<bool>,
    ) -> Self {
        CountingConfig {
            name: None,
            max_count,
            item_prior_probability,
            noise_rate: NoiseRate::Scalar(noise_rate),
            noise_sharing: NoiseSharing::PerDraw,
            observed_sequence,
        }
    }

    /// Sets a scenario label
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replaces the noise rate and its sharing mode
    pub fn with_noise(mut self, noise_rate: NoiseRate, noise_sharing: NoiseSharing) -> Self {
        self.noise_rate = noise_rate;
        self.noise_sharing = noise_sharing;
        self
    }

    /// Number of draws
    #[inline]
    pub fn draws_number(&self) -> usize {
        self.observed_sequence.len()
    }

    /// Number of factor table entries of the assembled model, `None` on overflow.
    ///
    /// Every draw adds a `(count, index)` table, a selector table of `4 * states`
    /// entries per item, a gate and a switch prior.
    pub fn model_table_entries(&self) -> Option<usize> {
        let states = self.max_count.checked_add(1)?;
        let square = states.checked_mul(states)?;
        let per_draw = square.checked_mul(5)?.checked_add(6)?;
        let base = states.checked_mul(3)?.checked_add(2)?;
        per_draw
            .checked_mul(self.draws_number())?
            .checked_add(base)
    }

    /// Checks probabilities, the model size and the noise layout
    pub fn validate(&self) -> ConfigResult<()> {
        check_probability("item_prior_probability", self.item_prior_probability)?;
        match self.model_table_entries() {
            Some(entries) if entries <= DEFAULT_MAX_TABLE_SIZE => {}
            _ => {
                return Err(ConfigError::ModelTooLarge {
                    max_count: self.max_count,
                    draws: self.draws_number(),
                    limit: DEFAULT_MAX_TABLE_SIZE,
                })
            }
        }
        match (&self.noise_rate, self.noise_sharing) {
            (NoiseRate::Scalar(rate), _) => check_probability("noise_rate", *rate)?,
            (NoiseRate::PerDraw(_), NoiseSharing::Shared) => {
                return Err(ConfigError::SharedNoiseRequiresScalar)
            }
            (NoiseRate::PerDraw(rates), NoiseSharing::PerDraw) => {
                if rates.len() != self.observed_sequence.len() {
                    return Err(ConfigError::NoiseLengthMismatch {
                        expected: self.observed_sequence.len(),
                        found: rates.len(),
                    });
                }
                for rate in rates {
                    check_probability("noise_rate", *rate)?;
                }
            }
        }
        Ok(())
    }

    /// Parses and validates a YAML configuration
    ///
    /// # Example
    ///
    /// ```
    /// use elimrs::counting::{ConfigError, CountingConfig};
    ///
    /// let config = CountingConfig::from_yaml_str(
    ///     "max_count: 8\nnoise_rate: 0.2\nobserved_sequence: [true, false]\n",
    /// ).unwrap();
    /// assert_eq!(config.item_prior_probability, 0.5);
    ///
    /// let err = CountingConfig::from_yaml_str("max_count: -1\n").unwrap_err();
    /// assert_eq!(err, ConfigError::NegativeMaxCount(-1));
    /// ```
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let raw: RawCountingConfig =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        CountingConfig::try_from(raw)
    }

    /// Serializes a configuration to YAML
    pub fn to_yaml_string(&self) -> ConfigResult<String> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }
}

/// Parses and validates a YAML list of configurations
pub fn load_scenarios(yaml: &str) -> ConfigResult<Vec<CountingConfig>> {
    let raw: Vec<RawCountingConfig> =
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))?;
    raw.into_iter().map(CountingConfig::try_from).collect()
}

/// Reads observations written as `+` (positive) and `-` (negative)
///
/// # Example
///
/// ```
/// use elimrs::counting::{parse_observations, ConfigError};
///
/// assert_eq!(parse_observations("+-+").unwrap(), vec![true, false, true]);
/// assert_eq!(parse_observations("+x-"), Err(ConfigError::InvalidObservation('x')));
/// ```
pub fn parse_observations(observed: &str) -> ConfigResult<Vec<bool>> {
    observed
        .chars()
        .map(|c| match c {
            '+' => Ok(true),
            '-' => Ok(false),
            other => Err(ConfigError::InvalidObservation(other)),
        })
        .collect()
}

// private ----------------------------------------------------------------------------------

#[inline(always)]
fn check_probability(name: &str, value: f64) -> ConfigResult<()> {
    if (0f64..=1f64).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ProbabilityOutOfRange {
            name: name.to_string(),
            value,
        })
    }
}

// the signed bound lets a negative max_count surface as a configuration error
#[derive(Debug, Deserialize)]
struct RawCountingConfig {
    #[serde(default)]
    name: Option<String>,
    max_count: i64,
    #[serde(default = "default_item_prior_probability")]
    item_prior_probability: f64,
    #[serde(default)]
    noise_rate: NoiseRate,
    #[serde(default)]
    noise_sharing: NoiseSharing,
    #[serde(default)]
    observed_sequence: Vec<bool>,
}

impl TryFrom<RawCountingConfig> for CountingConfig {
    type Error = ConfigError;

    fn try_from(raw: RawCountingConfig) -> ConfigResult<Self> {
        let max_count =
            usize::try_from(raw.max_count).map_err(|_| ConfigError::NegativeMaxCount(raw.max_count))?;
        let config = CountingConfig {
            name: raw.name,
            max_count,
            item_prior_probability: raw.item_prior_probability,
            noise_rate: raw.noise_rate,
            noise_sharing: raw.noise_sharing,
            observed_sequence: raw.observed_sequence,
        };
        config.validate()?;
        Ok(config)
    }
}
