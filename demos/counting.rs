use clap::Parser;
use elimrs::core::InferenceOptions;
use elimrs::counting::{
    infer_scenarios, load_scenarios, parse_observations, CountingConfig, NoiseRate, NoiseSharing,
};
use tracing_subscriber::EnvFilter;

const ANSWER_KEY: &str = include_str!("scenarios.yaml");

/// Posterior over the number of items in an urn given noisy draws
#[derive(Parser, Debug)]
struct Args {
    /// YAML file with a list of scenarios
    #[arg(long)]
    scenarios: Option<std::path::PathBuf>,

    /// Observations as a string of `+` (positive) and `-` (negative)
    #[arg(long)]
    observed: Option<String>,

    /// Inclusive upper bound on the number of items
    #[arg(long, default_value_t = 8)]
    max_count: usize,

    /// Prior probability that an item is positive
    #[arg(long, default_value_t = 0.5)]
    prior: f64,

    /// Probability that an observation is flipped
    #[arg(long, default_value_t = 0.0)]
    noise: f64,

    /// Use one noise switch for all draws
    #[arg(long)]
    shared_noise: bool,

    /// Ceiling on the size of intermediate tables
    #[arg(long, default_value_t = elimrs::core::DEFAULT_MAX_TABLE_SIZE)]
    max_table_size: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();
    // scenarios ---------------------------------------------------------------------------
    let scenarios = match (&args.scenarios, &args.observed) {
        (Some(path), _) => load_scenarios(&std::fs::read_to_string(path)?)?,
        (None, Some(observed)) => {
            let sharing = if args.shared_noise {
                NoiseSharing::Shared
            } else {
                NoiseSharing::PerDraw
            };
            let observed = parse_observations(observed)?;
            let config = CountingConfig::new(args.max_count, args.prior, args.noise, observed)
                .with_noise(NoiseRate::Scalar(args.noise), sharing)
                .with_name("command line");
            config.validate()?;
            vec![config]
        }
        (None, None) => load_scenarios(ANSWER_KEY)?,
    };
    // inference ---------------------------------------------------------------------------
    let options = InferenceOptions {
        max_table_size: args.max_table_size,
    };
    let results = infer_scenarios(&scenarios, &options);
    for (config, result) in scenarios.iter().zip(results) {
        let name = config.name.as_deref().unwrap_or("unnamed");
        match result {
            Ok(posterior) => println!("{name}: count ~ {posterior}"),
            Err(err) => println!("{name}: {err}"),
        }
    }
    Ok(())
}
