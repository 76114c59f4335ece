mod discrete;
mod elimination;
mod factor;
mod factor_graph;
mod factor_graph_builder;
mod query;
mod sum_product;
mod variable;

pub use discrete::Discrete;
pub use elimination::{EliminationPlan, EliminationPlanner};
pub use factor::Factor;
pub use factor_graph::{FGError, FGResult, FactorGraph, InferenceOptions, DEFAULT_MAX_TABLE_SIZE};
pub use factor_graph_builder::{FGBuilderError, FGBuilderResult, FactorGraphBuilder};
pub use query::QueryEngine;
pub use sum_product::SumProductExecutor;
pub use variable::{Variable, VariableId, VariableRole};
