use crate::cli::{InputArgs, MetricChoice, SearchArgs, TargetChoice};
use crate::error::{CliError, Result};
use barrierforest::core::neighborhood::{TorsionMetric, TorsionNeighborhood};
use barrierforest::engine::config::{
    FloodingConfig, FloodingConfigBuilder, SearchConfig, SearchConfigBuilder, SearchTarget,
};
use barrierforest::engine::error::EngineError;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

const DEFAULT_SEARCH_ITERATIONS: usize = 20;

impl From<MetricChoice> for TorsionMetric {
    fn from(choice: MetricChoice) -> Self {
        match choice {
            MetricChoice::MaxAbsolute => TorsionMetric::MaxAbsolute,
            MetricChoice::Euclidean => TorsionMetric::Euclidean,
        }
    }
}

impl From<TargetChoice> for SearchTarget {
    fn from(choice: TargetChoice) -> Self {
        match choice {
            TargetChoice::SingleTree => SearchTarget::SingleTree,
            TargetChoice::SingleLeaf => SearchTarget::SingleLeaf,
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialSearchConfig {
    target: Option<SearchTarget>,
    iterations: Option<usize>,
    upper_bound: Option<f64>,
}

/// Run settings as read from a TOML file; every field may be overridden from the command line.
///
/// ```toml
/// metric = "max-absolute"
/// pruning-threshold = 2.0
/// neighbor-threshold = 15.0
///
/// [search]
/// target = "single-tree"
/// iterations = 25
/// ```
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct PartialRunConfig {
    metric: Option<MetricChoice>,
    pruning_threshold: Option<f64>,
    neighbor_threshold: Option<f64>,
    search: Option<PartialSearchConfig>,
}

impl PartialRunConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Loads the optional config file and applies `--set` values and the shared flag overrides.
    pub fn resolve(args: &InputArgs) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_set_values(&args.set_values)?;
        if let Some(metric) = args.metric {
            config.metric = Some(metric);
        }
        if let Some(threshold) = args.pruning_threshold {
            config.pruning_threshold = Some(threshold);
        }
        debug!("Resolved run configuration: {:?}", config);
        Ok(config)
    }

    pub fn neighborhood(&self) -> TorsionNeighborhood {
        TorsionNeighborhood::new(self.metric.map(Into::into).unwrap_or_default())
    }

    fn pruning_threshold(&self) -> f64 {
        self.pruning_threshold.unwrap_or(0.0)
    }

    pub fn flooding_config(&self, neighbor_threshold: Option<f64>) -> Result<FloodingConfig> {
        let neighbor_threshold = neighbor_threshold
            .or(self.neighbor_threshold)
            .ok_or_else(|| {
                CliError::Config(
                    "`neighbor-threshold` is required either in the config file or via CLI argument."
                        .to_string(),
                )
            })?;
        FloodingConfigBuilder::new()
            .pruning_threshold(self.pruning_threshold())
            .neighbor_threshold(neighbor_threshold)
            .build()
            .map_err(EngineError::from)
            .map_err(CliError::from)
    }

    pub fn search_config(&self, args: &SearchArgs) -> Result<SearchConfig> {
        let file = self.search.as_ref();
        let target = args
            .target
            .map(Into::into)
            .or(file.and_then(|search| search.target))
            .unwrap_or(SearchTarget::SingleTree);
        let iterations = args
            .iterations
            .or(file.and_then(|search| search.iterations))
            .unwrap_or(DEFAULT_SEARCH_ITERATIONS);

        let mut builder = SearchConfigBuilder::new()
            .pruning_threshold(self.pruning_threshold())
            .target(target)
            .iterations(iterations);
        if let Some(bound) = args
            .upper_bound
            .or(file.and_then(|search| search.upper_bound))
        {
            builder = builder.upper_bound(bound);
        }
        builder
            .build()
            .map_err(EngineError::from)
            .map_err(CliError::from)
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };
            let (key, value) = (key.trim(), value.trim());

            match key {
                "metric" => {
                    self.metric = Some(parse_kebab(key, value)?);
                }
                "pruning-threshold" => {
                    self.pruning_threshold = Some(parse_number(key, value)?);
                }
                "neighbor-threshold" => {
                    self.neighbor_threshold = Some(parse_number(key, value)?);
                }
                "search.target" => {
                    self.search_mut().target = Some(parse_kebab(key, value)?);
                }
                "search.iterations" => {
                    self.search_mut().iterations = Some(parse_number(key, value)?);
                }
                "search.upper-bound" => {
                    self.search_mut().upper_bound = Some(parse_number(key, value)?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }

    fn search_mut(&mut self) -> &mut PartialSearchConfig {
        self.search.get_or_insert_with(Default::default)
    }
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid numeric value for {}: {}", key, value)))
}

/// Parses a kebab-case enum value the same way the config file does.
fn parse_kebab<T: for<'de> Deserialize<'de>>(key: &str, value: &str) -> Result<T> {
    #[derive(Deserialize)]
    struct Wrapper<V> {
        value: V,
    }

    toml::from_str::<Wrapper<T>>(&format!("value = \"{}\"", value))
        .map(|wrapper| wrapper.value)
        .map_err(|_| CliError::Config(format!("Invalid value for {}: {}", key, value)))
}
