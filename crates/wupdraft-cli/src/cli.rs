// Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use wupdraft_core::config::ScoringWeights;
use wupdraft_core::draft::pick::Position;

/// Draft-day recommendations for a snake-draft fantasy football league.
#[derive(Debug, Parser)]
#[command(name = "wupdraft", version)]
#[command(about = "Rank available players by lineup gain, value over replacement and scarcity")]
pub struct Cli {
    /// Project directory containing defaults/, config/ and the data directory
    #[arg(long, global = true, default_value = ".")]
    pub config_dir: PathBuf,

    /// Draft state file (defaults to [state] path in strategy.toml)
    #[arg(long, global = true)]
    pub state: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the ranked list of available players
    Recommend(RecommendArgs),
    /// Mark a player as taken (yours unless --gone)
    Take {
        /// Player name as it appears in the projections
        name: String,
        /// Disambiguate a name listed at more than one position
        #[arg(long, value_parser = parse_position)]
        position: Option<Position>,
        /// Another team drafted the player
        #[arg(long)]
        gone: bool,
    },
    /// Undo the most recent take
    Undo,
    /// Show your roster by slot and the starting lineup total
    Roster,
    /// Write the draft state to a JSON file
    Export { path: PathBuf },
    /// Replace the draft state with a previously exported JSON file
    Import { path: PathBuf },
}

#[derive(Debug, Args)]
pub struct RecommendArgs {
    /// Number of rows to show (defaults to [engine] top_n)
    #[arg(long)]
    pub top: Option<usize>,

    /// Only show these positions (repeatable)
    #[arg(long = "position", short = 'p', value_parser = parse_position)]
    pub positions: Vec<Position>,

    /// Case-insensitive filter on player name or team
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Override the lineup-gain weight
    #[arg(long, allow_negative_numbers = true)]
    pub w_delta: Option<f64>,

    /// Override the value-over-replacement weight
    #[arg(long, allow_negative_numbers = true)]
    pub w_vor: Option<f64>,

    /// Override the scarcity weight
    #[arg(long, allow_negative_numbers = true)]
    pub w_scarcity: Option<f64>,

    /// Override the bench-depth boost for RB/WR/TE
    #[arg(long, allow_negative_numbers = true)]
    pub bench_boost: Option<f64>,

    /// Override how many players get a full lineup re-evaluation
    #[arg(long)]
    pub candidates: Option<usize>,
}

impl RecommendArgs {
    /// Configured weights with any command-line overrides applied.
    pub fn weights(&self, base: ScoringWeights) -> ScoringWeights {
        ScoringWeights {
            delta: self.w_delta.unwrap_or(base.delta),
            vor: self.w_vor.unwrap_or(base.vor),
            scarcity: self.w_scarcity.unwrap_or(base.scarcity),
            bench_depth_boost: self.bench_boost.unwrap_or(base.bench_depth_boost),
        }
    }
}

/// Accept a draftable position (QB, RB, WR, TE, K, DST and their aliases).
fn parse_position(s: &str) -> Result<Position, String> {
    match Position::from_str_pos(s) {
        Some(pos) if !pos.is_meta_slot() => Ok(pos),
        _ => Err(format!("'{s}' is not a draftable position (QB, RB, WR, TE, K, DST)")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recommend_with_filters_and_overrides() {
        let cli = Cli::try_parse_from([
            "wupdraft",
            "recommend",
            "--top",
            "10",
            "-p",
            "rb",
            "--position",
            "DEF",
            "--search",
            "kc",
            "--w-delta",
            "-0.5",
            "--bench-boost",
            "0.3",
        ])
        .unwrap();

        let Command::Recommend(args) = cli.command else {
            panic!("expected recommend");
        };
        assert_eq!(args.top, Some(10));
        assert_eq!(args.positions, vec![Position::RunningBack, Position::Defense]);
        assert_eq!(args.search.as_deref(), Some("kc"));

        let weights = args.weights(ScoringWeights::default());
        assert_eq!(weights.delta, -0.5);
        assert_eq!(weights.vor, 0.3);
        assert_eq!(weights.bench_depth_boost, 0.3);
    }

    #[test]
    fn take_defaults_to_mine() {
        let cli = Cli::try_parse_from(["wupdraft", "take", "Josh Allen"]).unwrap();
        match cli.command {
            Command::Take { name, position, gone } => {
                assert_eq!(name, "Josh Allen");
                assert_eq!(position, None);
                assert!(!gone);
            }
            other => panic!("expected take, got {other:?}"),
        }
    }

    #[test]
    fn take_gone_with_position() {
        let cli = Cli::try_parse_from(["wupdraft", "take", "Taysom Hill", "--position", "TE", "--gone"]).unwrap();
        match cli.command {
            Command::Take { position, gone, .. } => {
                assert_eq!(position, Some(Position::TightEnd));
                assert!(gone);
            }
            other => panic!("expected take, got {other:?}"),
        }
    }

    #[test]
    fn meta_slots_are_not_positions() {
        assert!(Cli::try_parse_from(["wupdraft", "recommend", "-p", "FLEX"]).is_err());
        assert!(Cli::try_parse_from(["wupdraft", "take", "X", "--position", "BENCH"]).is_err());
    }

    #[test]
    fn global_paths_after_subcommand() {
        let cli = Cli::try_parse_from(["wupdraft", "roster", "--config-dir", "/tmp/league", "--state", "s.json"]).unwrap();
        assert_eq!(cli.config_dir, PathBuf::from("/tmp/league"));
        assert_eq!(cli.state, Some(PathBuf::from("s.json")));
        assert!(matches!(cli.command, Command::Roster));
    }

    #[test]
    fn export_requires_path() {
        assert!(Cli::try_parse_from(["wupdraft", "export"]).is_err());
        let cli = Cli::try_parse_from(["wupdraft", "import", "backup.json"]).unwrap();
        assert!(matches!(cli.command, Command::Import { .. }));
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
