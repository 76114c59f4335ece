use crate::core::{
    discrete::Discrete,
    factor::Factor,
    factor_graph::{FGError, FGResult},
    variable::Variable,
};

/// Turns the factors left after elimination into a normalized marginal
#[derive(Debug, Clone, Copy)]
pub struct QueryEngine;

impl QueryEngine {
    /// Multiplies the residual factors and normalizes the result.
    ///
    /// # Arguments
    ///
    /// * `query` - The query variable
    /// * `residual` - Factors whose scopes are within `{query}`
    ///
    /// # Notes
    ///
    /// Scalar factors only rescale the result. If nothing mentions the
    /// query variable its marginal is uniform. Zero (or non-finite) total
    /// mass is reported as `FGError::Contradiction`
    pub fn normalize(query: &Variable, residual: &[Factor]) -> FGResult<Discrete> {
        let residual: Vec<&Factor> = residual.iter().collect();
        let product = Factor::product(&residual);
        let weights = match product.scope() {
            [] => vec![product.total(); query.domain_size()],
            [id] if *id == query.id() => product.table().iter().copied().collect(),
            scope => {
                let leftovers = scope.iter().copied().filter(|id| *id != query.id()).collect();
                return Err(FGError::Uneliminated(leftovers));
            }
        };
        let total: f64 = weights.iter().sum();
        if !(total.is_finite() && total > 0f64) {
            tracing::warn!(variable = query.name(), total, "query marginal has no mass");
            return Err(FGError::Contradiction {
                variable: query.name().to_string(),
                total,
            });
        }
        Ok(Discrete::from_normalized(
            weights.into_iter().map(|w| w / total).collect(),
        ))
    }
}
