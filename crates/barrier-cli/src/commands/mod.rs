use crate::cli::InputArgs;
use crate::config::PartialRunConfig;
use crate::error::Result;
use crate::table;
use barrierforest::core::models::conformation::Conformation;
use barrierforest::core::neighborhood::Neighborhood;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub mod flood;
pub mod path;
pub mod search;

/// Everything a subcommand needs before invoking a workflow.
struct RunInput {
    config: PartialRunConfig,
    trajectory: Vec<Conformation>,
    neighborhood: Arc<dyn Neighborhood<Conformation>>,
}

fn load(args: &InputArgs) -> Result<RunInput> {
    let config = PartialRunConfig::resolve(args)?;
    let trajectory = table::read_trajectory(&args.input)?;
    let neighborhood = Arc::new(config.neighborhood());
    Ok(RunInput {
        config,
        trajectory,
        neighborhood,
    })
}

/// Serializes `report` as TOML to `output`, or to standard output.
fn write_report<T: Serialize>(report: &T, output: Option<&Path>) -> Result<()> {
    let text = toml::to_string_pretty(report)?;
    match output {
        Some(path) => {
            fs::write(path, text)?;
            info!("Report written to {:?}", path);
        }
        None => std::io::stdout().lock().write_all(text.as_bytes())?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::cli::{Cli, Commands};
    use crate::utils::progress::CliProgressHandler;
    use clap::Parser;
    use std::fs;

    const TRAJECTORY: &str = "\
# energy, angle
3.0, 50
-1.0, 100
1.0, 25
-2.0, 0
0.5, 75
4.0, -120
";

    fn parse(argv: &[&str]) -> Commands {
        Cli::try_parse_from(argv).unwrap().command
    }

    #[test]
    fn flood_writes_a_toml_summary() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("trajectory.csv");
        let output = dir.path().join("summary.toml");
        fs::write(&input, TRAJECTORY).unwrap();

        let Commands::Flood(args) = parse(&[
            "barrier",
            "flood",
            "-i",
            input.to_str().unwrap(),
            "-n",
            "30",
            "-o",
            output.to_str().unwrap(),
        ]) else {
            unreachable!()
        };
        super::flood::run(args, &CliProgressHandler::hidden()).unwrap();

        let summary: toml::Table = toml::from_str(&fs::read_to_string(output).unwrap()).unwrap();
        assert_eq!(summary["number-of-trees"].as_integer(), Some(2));
        assert_eq!(summary["models-used"].as_integer(), Some(6));
        assert_eq!(summary["minimum-value"].as_float(), Some(-2.0));
        assert_eq!(summary["trees"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn path_writes_models_between_two_minima() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("trajectory.csv");
        let output = dir.path().join("path.csv");
        fs::write(&input, TRAJECTORY).unwrap();

        // Sorted by energy the minima at 0 and 100 degrees get ids 0 and 1.
        let Commands::Path(args) = parse(&[
            "barrier",
            "path",
            "-i",
            input.to_str().unwrap(),
            "-n",
            "30",
            "--from",
            "0",
            "--to",
            "1",
            "-o",
            output.to_str().unwrap(),
        ]) else {
            unreachable!()
        };
        super::path::run(args, &CliProgressHandler::hidden()).unwrap();

        let rows: Vec<String> = fs::read_to_string(output)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect();
        assert_eq!(rows.first().map(String::as_str), Some("-2,0"));
        assert_eq!(rows.last().map(String::as_str), Some("-1,100"));
        assert_eq!(rows.len(), 5);
    }

    #[test]
    fn search_without_reachable_target_still_reports() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("trajectory.csv");
        let output = dir.path().join("search.toml");
        fs::write(&input, TRAJECTORY).unwrap();

        let Commands::Search(args) = parse(&[
            "barrier",
            "search",
            "-i",
            input.to_str().unwrap(),
            "--upper-bound",
            "10",
            "--iterations",
            "3",
            "-o",
            output.to_str().unwrap(),
        ]) else {
            unreachable!()
        };
        super::search::run(args, &CliProgressHandler::hidden()).unwrap();

        let report: toml::Table = toml::from_str(&fs::read_to_string(output).unwrap()).unwrap();
        assert_eq!(report["target"].as_str(), Some("single-tree"));
        assert_eq!(report["target-reached"].as_bool(), Some(false));
        assert_eq!(report["threshold"].as_float(), Some(10.0));
    }
}
