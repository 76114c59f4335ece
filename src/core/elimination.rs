use crate::core::{
    factor_graph::{FGResult, FactorGraph},
    variable::VariableId,
};

/// An order in which variables are summed out.
/// The query variable is never summed out and always comes last
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EliminationPlan {
    order: Vec<VariableId>,
    query: VariableId,
    peak_table_size: usize,
}

impl EliminationPlan {
    /// Non-query variables in elimination order
    #[inline]
    pub fn order(&self) -> &[VariableId] {
        &self.order
    }

    #[inline]
    pub fn query(&self) -> VariableId {
        self.query
    }

    /// Elimination order followed by the query variable
    pub fn full_order(&self) -> Vec<VariableId> {
        self.order.iter().copied().chain([self.query]).collect()
    }

    /// Largest product table (before summing out) predicted for this order
    #[inline]
    pub fn peak_table_size(&self) -> usize {
        self.peak_table_size
    }
}

/// Greedy elimination-order planner.
///
/// At each step it picks the variable whose elimination produces the smallest
/// factor (product of the domain sizes of the union of the scopes mentioning it,
/// minus the variable itself). Ties go to the variable created first, so equal
/// graphs always get equal plans.
#[derive(Debug, Clone, Copy)]
pub struct EliminationPlanner<'a> {
    graph: &'a FactorGraph,
}

impl<'a> EliminationPlanner<'a> {
    #[inline]
    pub fn new(graph: &'a FactorGraph) -> Self {
        EliminationPlanner { graph }
    }

    /// Computes an elimination order for all variables except `query`
    ///
    /// # Example
    ///
    /// ```
    /// use elimrs::core::{EliminationPlanner, FactorGraphBuilder, VariableRole};
    ///
    /// // a chain a - b - c, the query is c
    /// let mut fgb = FactorGraphBuilder::new();
    /// let a = fgb.add_variable("a", 4, VariableRole::LatentPrior).unwrap();
    /// let b = fgb.add_variable("b", 4, VariableRole::LatentPrior).unwrap();
    /// let c = fgb.add_variable("c", 4, VariableRole::LatentPrior).unwrap();
    /// fgb.add_factor_fn(&[a, b], |_| 1.0).unwrap();
    /// fgb.add_factor_fn(&[b, c], |_| 1.0).unwrap();
    /// let fg = fgb.build();
    ///
    /// let plan = EliminationPlanner::new(&fg).plan(c).unwrap();
    /// assert_eq!(plan.order(), &[a, b]);
    /// assert_eq!(plan.full_order(), vec![a, b, c]);
    /// ```
    pub fn plan(&self, query: VariableId) -> FGResult<EliminationPlan> {
        self.graph.variable(query)?;
        let mut scopes: Vec<Vec<VariableId>> = self
            .graph
            .factors()
            .iter()
            .map(|f| f.scope().to_vec())
            .collect();
        let mut remaining: Vec<VariableId> = self
            .graph
            .variables()
            .iter()
            .map(|v| v.id())
            .filter(|id| *id != query)
            .collect();
        let mut order = Vec::with_capacity(remaining.len());
        let mut peak_table_size = 1usize;
        while !remaining.is_empty() {
            let mut best: Option<(usize, usize)> = None;
            for (pos, variable) in remaining.iter().enumerate() {
                let union = Self::union_of_active(&scopes, *variable);
                let cost = self.table_size(union.iter().filter(|id| *id != variable));
                // strict comparison keeps the earliest created variable on ties
                if best.map_or(true, |(best_cost, _)| cost < best_cost) {
                    best = Some((cost, pos));
                }
            }
            let Some((cost, pos)) = best else {
                break;
            };
            let variable = remaining.remove(pos);
            let union = Self::union_of_active(&scopes, variable);
            peak_table_size = peak_table_size.max(self.table_size(union.iter()));
            scopes.retain(|scope| !scope.contains(&variable));
            if !union.is_empty() {
                scopes.push(union.into_iter().filter(|id| *id != variable).collect());
            }
            tracing::trace!(%variable, cost, "elimination step planned");
            order.push(variable);
        }
        tracing::debug!(
            eliminated = order.len(),
            peak_table_size,
            "elimination order planned"
        );
        Ok(EliminationPlan {
            order,
            query,
            peak_table_size,
        })
    }
}

// private methods --------------------------------------------------------------------------

impl<'a> EliminationPlanner<'a> {
    #[inline(always)]
    fn union_of_active(scopes: &[Vec<VariableId>], variable: VariableId) -> Vec<VariableId> {
        let mut union = Vec::new();
        for scope in scopes.iter().filter(|scope| scope.contains(&variable)) {
            for id in scope {
                if !union.contains(id) {
                    union.push(*id);
                }
            }
        }
        union
    }

    #[inline(always)]
    fn table_size<'b>(&self, scope: impl Iterator<Item = &'b VariableId>) -> usize {
        scope
            .map(|id| {
                self.graph
                    .variables()
                    .get(id.index())
                    .map_or(1, |v| v.domain_size())
            })
            .fold(1usize, |acc, dim| acc.saturating_mul(dim))
    }
}
