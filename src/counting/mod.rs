mod config;
mod model;

pub use config::{
    load_scenarios, parse_observations, ConfigError, ConfigResult, CountingConfig, NoiseRate,
    NoiseSharing,
};
pub use model::{
    build_graph, infer_scenarios, posterior_over_count, CountingError, CountingModel,
    DrawVariables,
};
