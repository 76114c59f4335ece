use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{
    discrete::Discrete,
    elimination::EliminationPlanner,
    factor::Factor,
    query::QueryEngine,
    sum_product::SumProductExecutor,
    variable::{Variable, VariableId},
};

// ------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
/// Errors that could appear in factor graph's methods
pub enum FGError {
    /// Eliminating a variable would need a table larger than the configured ceiling
    #[error("Eliminating {variable} needs a table of {required} entries, the limit is {limit}")]
    ResourceLimit {
        /// Name of the variable being eliminated
        variable: String,

        /// Number of entries of the product table, `usize::MAX` on overflow
        required: usize,

        /// Configured ceiling
        limit: usize,
    },

    /// The unnormalized marginal of the query variable has no mass
    #[error("The model is contradictory: the marginal of {variable} has total mass {total}")]
    Contradiction {
        /// Name of the query variable
        variable: String,

        /// Total mass found before normalization
        total: f64,
    },

    /// Residual factors still mention variables other than the query
    #[error("Variables {0:?} were not eliminated before the query")]
    Uneliminated(Vec<VariableId>),

    /// Index of a variable is out of range
    #[error("Index of a variable {1} is out of range of [0..{0}] variables")]
    OutOfRangeVariable(usize, usize),
}

/// Factor graph's methods result type
pub type FGResult<T> = Result<T, FGError>;

/// Default ceiling on the number of entries of any intermediate table
pub const DEFAULT_MAX_TABLE_SIZE: usize = 1 << 24;

/// Options of an exact inference run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceOptions {
    /// Maximal number of entries of a table produced during elimination
    #[serde(default = "default_max_table_size")]
    pub max_table_size: usize,
}

fn default_max_table_size() -> usize {
    DEFAULT_MAX_TABLE_SIZE
}

impl Default for InferenceOptions {
    fn default() -> Self {
        InferenceOptions {
            max_table_size: DEFAULT_MAX_TABLE_SIZE,
        }
    }
}

// ------------------------------------------------------------------------------------------

/// A factor graph: variables, factors over them and evidence.
///
/// A graph is immutable once built. Inference works on copies of the factors,
/// so the same graph can be queried any number of times (also from several threads).
#[derive(Debug, Clone)]
pub struct FactorGraph {
    pub(crate) variables: Vec<Variable>,
    pub(crate) factors: Vec<Factor>,
    pub(crate) evidence: BTreeMap<VariableId, usize>,
}

impl FactorGraph {
    /// Variables in creation order
    #[inline]
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Factors in the order they were added
    #[inline]
    pub fn factors(&self) -> &[Factor] {
        &self.factors
    }

    #[inline]
    pub fn evidence(&self) -> &BTreeMap<VariableId, usize> {
        &self.evidence
    }

    /// Returns a variable by its ID
    #[inline]
    pub fn variable(&self, id: VariableId) -> FGResult<&Variable> {
        self.variables
            .get(id.index())
            .ok_or(FGError::OutOfRangeVariable(self.variables.len(), id.index()))
    }

    /// Returns degree (number of adjoint factors) of each variable
    ///
    /// # Example
    ///
    /// ```
    /// use elimrs::core::{FactorGraphBuilder, VariableRole};
    ///
    /// let mut fgb = FactorGraphBuilder::new();
    /// let a = fgb.add_variable("a", 2, VariableRole::LatentPrior).unwrap();
    /// let b = fgb.add_variable("b", 3, VariableRole::LatentPrior).unwrap();
    /// fgb.add_factor_fn(&[a, b], |_| 1.0).unwrap();
    /// fgb.add_factor_fn(&[b], |_| 1.0).unwrap();
    /// let fg = fgb.build();
    /// assert_eq!(fg.get_variable_degrees(), vec![1, 2]);
    /// ```
    #[inline]
    pub fn get_variable_degrees(&self) -> Vec<usize> {
        self.variables
            .iter()
            .map(|v| self.factors.iter().filter(|f| f.contains(v.id())).count())
            .collect()
    }

    /// Returns degree (number of adjoint variables) of each factor
    /// in order they were added to a factor graph
    #[inline]
    pub fn get_factor_degrees(&self) -> Vec<usize> {
        self.factors.iter().map(|f| f.scope().len()).collect()
    }

    /// Returns copies of the factors with the evidence applied
    pub fn clamped_factors(&self) -> Vec<Factor> {
        self.factors
            .iter()
            .map(|factor| {
                self.evidence
                    .iter()
                    .filter(|(id, _)| factor.contains(**id))
                    .fold(factor.clone(), |f, (id, value)| f.clamp(*id, *value))
            })
            .collect()
    }

    /// Computes the exact marginal distribution of a variable
    /// with default inference options
    ///
    /// # Example
    ///
    /// ```
    /// use elimrs::core::{FactorGraphBuilder, VariableRole};
    ///
    /// // a ~ [0.2, 0.8], b = a with probability 0.9
    /// let mut fgb = FactorGraphBuilder::new();
    /// let a = fgb.add_variable("a", 2, VariableRole::LatentPrior).unwrap();
    /// let b = fgb.add_variable("b", 2, VariableRole::Observed).unwrap();
    /// fgb.add_factor_fn(&[a], |x| [0.2, 0.8][x[0]]).unwrap();
    /// fgb.add_factor_fn(&[a, b], |x| if x[0] == x[1] { 0.9 } else { 0.1 }).unwrap();
    /// fgb.observe(b, 0).unwrap();
    /// let fg = fgb.build();
    ///
    /// let posterior = fg.infer(a).unwrap();
    /// let expected = 0.2 * 0.9 / (0.2 * 0.9 + 0.8 * 0.1);
    /// assert!((posterior.probability(0) - expected).abs() < 1e-12);
    /// ```
    #[inline]
    pub fn infer(&self, query: VariableId) -> FGResult<Discrete> {
        self.infer_with(query, &InferenceOptions::default())
    }

    /// Computes the exact marginal distribution of a variable by
    /// variable elimination
    ///
    /// # Arguments
    ///
    /// * `query` - The variable whose marginal is computed
    /// * `options` - Inference options (table size ceiling)
    ///
    /// # Notes
    ///
    /// Fails with `FGError::ResourceLimit` if any intermediate table would exceed
    /// `options.max_table_size` entries and with `FGError::Contradiction` if the
    /// evidence has zero probability
    pub fn infer_with(&self, query: VariableId, options: &InferenceOptions) -> FGResult<Discrete> {
        let query_variable = self.variable(query)?;
        let plan = EliminationPlanner::new(self).plan(query)?;
        let executor = SumProductExecutor::new(options.max_table_size);
        let residual = executor.run(self, &plan)?;
        QueryEngine::normalize(query_variable, &residual)
    }
}
