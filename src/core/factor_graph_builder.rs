use std::collections::BTreeMap;

use thiserror::Error;

use crate::core::{
    factor::Factor,
    factor_graph::FactorGraph,
    variable::{Variable, VariableId, VariableRole},
};

// ------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
/// Errors that could appear in factor graph builder's methods
pub enum FGBuilderError {
    /// Index of a variable is out of range
    #[error("ID (index) of a variable {1} is out of range of [0..{0}] variables")]
    OutOfRangeVariable(usize, usize),

    /// A variable appears twice in the scope of a factor
    #[error("Variable {0} appears more than once in a factor's scope")]
    DuplicateScopeVariable(VariableId),

    /// Number of table axes does not match the scope length
    #[error("Scope {scope:?} does not match the table shape {shape:?}")]
    ShapeMismatch {
        scope: Vec<VariableId>,
        shape: Vec<usize>,
    },

    /// A table axis length differs from the domain size of its variable
    #[error("Variable {variable} has domain size {domain_size}, but the factor's axis has length {axis_length}")]
    DomainMismatch {
        variable: VariableId,
        domain_size: usize,
        axis_length: usize,
    },

    /// A weight is negative, infinite or NaN
    #[error("Factor weights must be finite and non-negative, got {0}")]
    InvalidWeight(f64),

    /// A variable with an empty domain
    #[error("Variable {0} has an empty domain")]
    EmptyDomain(VariableId),

    /// An observed value is outside of the variable's domain
    #[error("Observed value {value} is out of the domain [0..{domain_size}) of variable {variable}")]
    EvidenceOutOfDomain {
        variable: VariableId,
        value: usize,
        domain_size: usize,
    },
}

/// Factor graph builder's methods result type
pub type FGBuilderResult<T> = Result<T, FGBuilderError>;

// public methods ---------------------------------------------------------------------------

#[derive(Debug, Default)]
/// A factor graph builder
pub struct FactorGraphBuilder {
    variables: Vec<Variable>,
    factors: Vec<Factor>,
    evidence: BTreeMap<VariableId, usize>,
}

impl FactorGraphBuilder {
    /// Creates an empty factor graph builder
    #[inline]
    pub fn new() -> Self {
        FactorGraphBuilder::default()
    }

    /// Creates a builder with preallocated memory
    ///
    /// # Arguments
    ///
    /// * `variables_capacity` - A number of variables we need to preallocate memory for
    /// * `factors_capacity` - A number of factors we need to preallocate memory for
    #[inline]
    pub fn with_capacity(variables_capacity: usize, factors_capacity: usize) -> Self {
        FactorGraphBuilder {
            variables: Vec::with_capacity(variables_capacity),
            factors: Vec::with_capacity(factors_capacity),
            evidence: BTreeMap::new(),
        }
    }

    /// Adds a variable and returns its ID. IDs follow creation order
    ///
    /// # Arguments
    ///
    /// * `name` - A name used in logs and errors
    /// * `domain_size` - The variable takes values in `[0, domain_size)`
    /// * `role` - The role of a variable in a model
    ///
    /// # Example
    ///
    /// ```
    /// use elimrs::core::{FactorGraphBuilder, VariableId, VariableRole};
    ///
    /// let mut fgb = FactorGraphBuilder::new();
    /// let a = fgb.add_variable("a", 3, VariableRole::LatentPrior).unwrap();
    /// let b = fgb.add_variable("b", 2, VariableRole::LatentPrior).unwrap();
    /// assert_eq!((a, b), (VariableId(0), VariableId(1)));
    /// ```
    pub fn add_variable(
        &mut self,
        name: impl Into<String>,
        domain_size: usize,
        role: VariableRole,
    ) -> FGBuilderResult<VariableId> {
        let id = VariableId(self.variables.len());
        if domain_size == 0 {
            return Err(FGBuilderError::EmptyDomain(id));
        }
        self.variables
            .push(Variable::new(id, name.into(), domain_size, role));
        Ok(id)
    }

    /// Domain size of an already added variable
    pub fn domain_size(&self, variable: VariableId) -> FGBuilderResult<usize> {
        self.variable(variable).map(|v| v.domain_size())
    }

    /// Adds a factor to a factor graph
    ///
    /// # Notes
    ///
    /// If a scope variable was not added before, or a table axis does not match
    /// the domain size of its variable, the method returns an error
    ///
    /// # Example
    ///
    /// ```
    /// use elimrs::core::{Factor, FactorGraphBuilder, VariableRole};
    ///
    /// let mut fgb = FactorGraphBuilder::new();
    /// let a = fgb.add_variable("a", 2, VariableRole::LatentPrior).unwrap();
    /// let b = fgb.add_variable("b", 2, VariableRole::LatentPrior).unwrap();
    /// let coupling = Factor::from_fn(vec![a, b], &[2, 2], |x| if x[0] == x[1] { 2.0 } else { 1.0 }).unwrap();
    /// fgb.add_factor(coupling).unwrap();
    /// let fg = fgb.build();
    /// assert_eq!(fg.factors().len(), 1);
    /// ```
    pub fn add_factor(&mut self, factor: Factor) -> FGBuilderResult<()> {
        for (id, axis_length) in factor.scope().iter().zip(factor.shape()) {
            let domain_size = self.domain_size(*id)?;
            if domain_size != *axis_length {
                return Err(FGBuilderError::DomainMismatch {
                    variable: *id,
                    domain_size,
                    axis_length: *axis_length,
                });
            }
        }
        self.factors.push(factor);
        Ok(())
    }

    /// Builds a factor from a weight function over the given scope and adds it
    pub fn add_factor_fn(
        &mut self,
        scope: &[VariableId],
        weight: impl FnMut(&[usize]) -> f64,
    ) -> FGBuilderResult<()> {
        let shape = scope
            .iter()
            .map(|id| self.domain_size(*id))
            .collect::<FGBuilderResult<Vec<_>>>()?;
        let factor = Factor::from_fn(scope.to_vec(), &shape, weight)?;
        self.add_factor(factor)
    }

    /// Fixes the value of a variable
    ///
    /// # Notes
    ///
    /// Observing a variable twice overwrites the previous value
    pub fn observe(&mut self, variable: VariableId, value: usize) -> FGBuilderResult<()> {
        let domain_size = self.domain_size(variable)?;
        if value >= domain_size {
            return Err(FGBuilderError::EvidenceOutOfDomain {
                variable,
                value,
                domain_size,
            });
        }
        self.evidence.insert(variable, value);
        Ok(())
    }

    /// Returns a factor graph
    #[inline]
    pub fn build(self) -> FactorGraph {
        tracing::debug!(
            variables = self.variables.len(),
            factors = self.factors.len(),
            evidence = self.evidence.len(),
            "factor graph built"
        );
        FactorGraph {
            variables: self.variables,
            factors: self.factors,
            evidence: self.evidence,
        }
    }
}

// private methods --------------------------------------------------------------------------

impl FactorGraphBuilder {
    #[inline(always)]
    fn variable(&self, variable: VariableId) -> FGBuilderResult<&Variable> {
        self.variables
            .get(variable.index())
            .ok_or(FGBuilderError::OutOfRangeVariable(
                self.variables.len(),
                variable.index(),
            ))
    }
}
