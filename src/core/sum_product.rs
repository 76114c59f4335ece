use crate::core::{
    elimination::EliminationPlan,
    factor::Factor,
    factor_graph::{FGError, FGResult, FactorGraph, DEFAULT_MAX_TABLE_SIZE},
    variable::VariableId,
};

/// Exact sum-product variable elimination.
///
/// Every step multiplies the factors mentioning the eliminated variable,
/// sums the variable out and puts the result back into the pool.
/// Factors of the pool are never modified in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SumProductExecutor {
    max_table_size: usize,
}

impl Default for SumProductExecutor {
    fn default() -> Self {
        SumProductExecutor::new(DEFAULT_MAX_TABLE_SIZE)
    }
}

impl SumProductExecutor {
    /// Creates an executor
    ///
    /// # Arguments
    ///
    /// * `max_table_size` - A ceiling on the number of entries of any product table
    #[inline]
    pub fn new(max_table_size: usize) -> Self {
        SumProductExecutor { max_table_size }
    }

    #[inline]
    pub fn max_table_size(&self) -> usize {
        self.max_table_size
    }

    /// Eliminates all variables of a plan and returns the residual factors.
    /// Residual factors mention only the query variable (or nothing at all)
    ///
    /// # Example
    ///
    /// ```
    /// use elimrs::core::{EliminationPlanner, FactorGraphBuilder, SumProductExecutor, VariableRole};
    ///
    /// let mut fgb = FactorGraphBuilder::new();
    /// let a = fgb.add_variable("a", 2, VariableRole::LatentPrior).unwrap();
    /// let b = fgb.add_variable("b", 2, VariableRole::LatentPrior).unwrap();
    /// fgb.add_factor_fn(&[a, b], |x| (1 + x[0] + 2 * x[1]) as f64).unwrap();
    /// let fg = fgb.build();
    ///
    /// let plan = EliminationPlanner::new(&fg).plan(b).unwrap();
    /// let residual = SumProductExecutor::default().run(&fg, &plan).unwrap();
    /// assert_eq!(residual.len(), 1);
    /// assert_eq!(residual[0].value(&[0]), Some(3.0));
    /// assert_eq!(residual[0].value(&[1]), Some(7.0));
    /// ```
    pub fn run(&self, graph: &FactorGraph, plan: &EliminationPlan) -> FGResult<Vec<Factor>> {
        let mut pool = graph.clamped_factors();
        for variable in plan.order() {
            let name = graph.variable(*variable)?.name();
            pool = self.eliminate(pool, *variable, name)?;
        }
        Ok(pool)
    }

    /// Performs one elimination step on a pool of factors
    ///
    /// # Arguments
    ///
    /// * `pool` - Current factors
    /// * `variable` - A variable to sum out
    /// * `name` - The variable's name, used in errors and logs
    pub fn eliminate(
        &self,
        pool: Vec<Factor>,
        variable: VariableId,
        name: &str,
    ) -> FGResult<Vec<Factor>> {
        let (active, mut inactive): (Vec<Factor>, Vec<Factor>) =
            pool.into_iter().partition(|f| f.contains(variable));
        if active.is_empty() {
            // a variable without factors contributes a constant
            tracing::trace!(variable = name, "no factors to eliminate");
            return Ok(inactive);
        }
        let active: Vec<&Factor> = active.iter().collect();
        let required = Factor::product_size(&active).unwrap_or(usize::MAX);
        if required > self.max_table_size {
            tracing::warn!(
                variable = name,
                required,
                limit = self.max_table_size,
                "elimination exceeds the table size limit"
            );
            return Err(FGError::ResourceLimit {
                variable: name.to_string(),
                required,
                limit: self.max_table_size,
            });
        }
        let reduced = Factor::product(&active).sum_out(variable);
        tracing::trace!(
            variable = name,
            active = active.len(),
            product_size = required,
            result_size = reduced.size(),
            "variable eliminated"
        );
        inactive.push(reduced);
        Ok(inactive)
    }
}
