use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};
use thiserror::Error;

use crate::core::{
    Discrete, EliminationPlan, EliminationPlanner, FGError, FGResult, FactorGraph,
    FactorGraphBuilder, InferenceOptions, VariableId, VariableRole,
};
use crate::counting::config::{ConfigError, ConfigResult, CountingConfig, NoiseSharing};

// ------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
/// Errors of a complete build-and-infer run
pub enum CountingError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Inference(#[from] FGError),
}

// ------------------------------------------------------------------------------------------

/// Variables introduced for a single draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawVariables {
    /// Which item was drawn, uniform below the count
    pub index: VariableId,

    /// Whether the reported value was flipped (shared between draws in the shared-noise mode)
    pub switch: VariableId,

    /// The attribute of the drawn item
    pub selected: VariableId,
}

/// A factor graph of the counting model together with the roles of its variables
#[derive(Debug, Clone)]
pub struct CountingModel {
    graph: FactorGraph,
    count: VariableId,
    items: Vec<VariableId>,
    draws: Vec<DrawVariables>,
}

impl CountingModel {
    #[inline]
    pub fn graph(&self) -> &FactorGraph {
        &self.graph
    }

    /// The query variable: the population size
    #[inline]
    pub fn count_variable(&self) -> VariableId {
        self.count
    }

    /// Attribute variables, one per potential item
    #[inline]
    pub fn item_variables(&self) -> &[VariableId] {
        &self.items
    }

    #[inline]
    pub fn draws(&self) -> &[DrawVariables] {
        &self.draws
    }

    /// Elimination plan for the count query
    pub fn plan(&self) -> FGResult<EliminationPlan> {
        EliminationPlanner::new(&self.graph).plan(self.count)
    }

    /// Posterior distribution of the population size
    #[inline]
    pub fn posterior(&self, options: &InferenceOptions) -> FGResult<Discrete> {
        self.graph.infer_with(self.count, options)
    }
}

// ------------------------------------------------------------------------------------------

#[inline(always)]
fn bernoulli(p: f64, value: usize) -> f64 {
    if value == 1 {
        p
    } else {
        1f64 - p
    }
}

#[inline(always)]
fn indicator(condition: bool) -> f64 {
    if condition {
        1f64
    } else {
        0f64
    }
}

/// Builds the factor graph of a counting model.
///
/// Variables, in creation order: the count, one attribute per potential item,
/// the shared switch (shared-noise mode only), then for every draw its index,
/// its switch (per-draw mode) and the selected attribute.
///
/// Factors:
/// * a constant prior over the count;
/// * a Bernoulli prior per item attribute and per switch;
/// * `(count, index)`: `1 / count` if `index < count`, else `0`;
/// * `(selected, switch)`: `1` iff `selected XOR switch` equals the observation;
/// * for every item `k`, `(index, item[k], selected)`: `1` if `index != k`,
///   otherwise `1` iff `item[k] == selected`.
///
/// The per-item constraints multiply to "selected equals the attribute of
/// the indexed item" without a table spanning every item.
///
/// # Example
///
/// ```
/// use elimrs::core::InferenceOptions;
/// use elimrs::counting::{build_graph, CountingConfig};
///
/// let config = CountingConfig::new(3, 0.5, 0.0, vec![true, true]);
/// let model = build_graph(&config).unwrap();
/// let posterior = model.posterior(&InferenceOptions::default()).unwrap();
/// assert_eq!(posterior.dimension(), 4);
/// assert_eq!(posterior.probability(0), 0.0);
/// ```
pub fn build_graph(config: &CountingConfig) -> ConfigResult<CountingModel> {
    config.validate()?;
    let states = config.max_count + 1;
    let draws_number = config.draws_number();
    let mut fgb = FactorGraphBuilder::with_capacity(
        1 + states + 3 * draws_number,
        1 + states + draws_number * (states + 3),
    );

    let count = fgb.add_variable("count", states, VariableRole::LatentPrior)?;
    fgb.add_factor_fn(&[count], |_| 1f64)?;

    let prior = config.item_prior_probability;
    let mut items = Vec::with_capacity(states);
    for j in 0..states {
        let item = fgb.add_variable(format!("item[{j}]"), 2, VariableRole::LatentPrior)?;
        fgb.add_factor_fn(&[item], |x| bernoulli(prior, x[0]))?;
        items.push(item);
    }

    let shared_switch = match config.noise_sharing {
        NoiseSharing::Shared => {
            let rate = config.noise_rate.rate(0);
            let switch = fgb.add_variable("switch", 2, VariableRole::LatentPrior)?;
            fgb.add_factor_fn(&[switch], |x| bernoulli(rate, x[0]))?;
            Some(switch)
        }
        NoiseSharing::PerDraw => None,
    };

    let mut draws = Vec::with_capacity(draws_number);
    for (i, observed) in config.observed_sequence.iter().enumerate() {
        let observed = usize::from(*observed);

        let index = fgb.add_variable(format!("index[{i}]"), states, VariableRole::LatentIndex)?;
        fgb.add_factor_fn(&[count, index], |x| {
            let (population, drawn) = (x[0], x[1]);
            if drawn < population {
                1f64 / population as f64
            } else {
                0f64
            }
        })?;

        let switch = match shared_switch {
            Some(switch) => switch,
            None => {
                let rate = config.noise_rate.rate(i);
                let switch =
                    fgb.add_variable(format!("switch[{i}]"), 2, VariableRole::LatentPrior)?;
                fgb.add_factor_fn(&[switch], |x| bernoulli(rate, x[0]))?;
                switch
            }
        };

        let selected = fgb.add_variable(
            format!("selected[{i}]"),
            2,
            VariableRole::DeterministicGate,
        )?;
        fgb.add_factor_fn(&[selected, switch], |x| indicator((x[0] ^ x[1]) == observed))?;
        for (k, item) in items.iter().enumerate() {
            fgb.add_factor_fn(&[index, *item, selected], |x| {
                if x[0] == k {
                    indicator(x[1] == x[2])
                } else {
                    1f64
                }
            })?;
        }

        draws.push(DrawVariables {
            index,
            switch,
            selected,
        });
    }

    tracing::debug!(
        max_count = config.max_count,
        draws = draws_number,
        sharing = ?config.noise_sharing,
        "counting model assembled"
    );
    Ok(CountingModel {
        graph: fgb.build(),
        count,
        items,
        draws,
    })
}

/// Builds the model of a configuration and computes the posterior of the count
///
/// # Example
///
/// ```
/// use elimrs::core::InferenceOptions;
/// use elimrs::counting::{posterior_over_count, CountingConfig};
///
/// // with a coin-flip noise the observations carry no information beyond "count > 0"
/// let config = CountingConfig::new(8, 0.5, 0.5, vec![true; 10]);
/// let posterior = posterior_over_count(&config, &InferenceOptions::default()).unwrap();
/// assert_eq!(posterior.probability(0), 0.0);
/// for count in 1..=8 {
///     assert!((posterior.probability(count) - 0.125).abs() < 1e-9);
/// }
/// ```
pub fn posterior_over_count(
    config: &CountingConfig,
    options: &InferenceOptions,
) -> Result<Discrete, CountingError> {
    let model = build_graph(config)?;
    Ok(model.posterior(options)?)
}

/// Computes posteriors of independent configurations in parallel.
/// Results follow the order of `configs`
pub fn infer_scenarios(
    configs: &[CountingConfig],
    options: &InferenceOptions,
) -> Vec<Result<Discrete, CountingError>> {
    configs
        .par_iter()
        .map(|config| posterior_over_count(config, options))
        .collect()
}
