use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Barrier Forest Developers",
    version,
    about = "barrier - Build barrier forests from sampled energy landscapes and query them.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Flood a recorded trajectory at a fixed neighbor threshold and summarize the forest.
    Flood(FloodArgs),
    /// Search the smallest neighbor threshold that collapses the trajectory into one tree or leaf.
    Search(SearchArgs),
    /// Reconstruct a trajectory of recorded models connecting two nodes of the flooded forest.
    Path(PathArgs),
}

/// Distance metric over torsion angles.
#[derive(ValueEnum, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum MetricChoice {
    /// Largest absolute wrapped angle difference.
    MaxAbsolute,
    /// Euclidean norm of the wrapped angle differences.
    Euclidean,
}

/// What the threshold search should collapse the trajectory into.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetChoice {
    SingleTree,
    SingleLeaf,
}

/// Input and shared overrides for every subcommand.
#[derive(Args, Debug)]
pub struct InputArgs {
    /// Path to the trajectory table (CSV rows of `energy,angle_1,...,angle_k`).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path to a run configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the torsion distance metric.
    #[arg(short, long, value_enum, value_name = "METRIC")]
    pub metric: Option<MetricChoice>,

    /// Override the pruning threshold (degrees). 0 disables pruning.
    #[arg(short, long, value_name = "FLOAT")]
    pub pruning_threshold: Option<f64>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S search.iterations=30
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `flood` subcommand.
#[derive(Args, Debug)]
pub struct FloodArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Override the neighbor threshold (degrees).
    #[arg(short, long, value_name = "FLOAT")]
    pub neighbor_threshold: Option<f64>,

    /// Write the forest summary (TOML) to this path instead of standard output.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Arguments for the `search` subcommand.
#[derive(Args, Debug)]
pub struct SearchArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Override what the search collapses the trajectory into.
    #[arg(short, long, value_enum, value_name = "TARGET")]
    pub target: Option<TargetChoice>,

    /// Override the number of bisection iterations.
    #[arg(long, value_name = "INT")]
    pub iterations: Option<usize>,

    /// Override the upper end of the search interval (degrees).
    #[arg(long, value_name = "FLOAT")]
    pub upper_bound: Option<f64>,

    /// Write the summary of the resulting forest (TOML) to this path instead of standard output.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Arguments for the `path` subcommand.
#[derive(Args, Debug)]
pub struct PathArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Override the neighbor threshold (degrees).
    #[arg(short, long, value_name = "FLOAT")]
    pub neighbor_threshold: Option<f64>,

    /// Id of the node the path starts at.
    #[arg(long, required = true, value_name = "ID")]
    pub from: usize,

    /// Id of the node the path ends at.
    #[arg(long, required = true, value_name = "ID")]
    pub to: usize,

    /// Write the path (CSV) to this path instead of standard output.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}
