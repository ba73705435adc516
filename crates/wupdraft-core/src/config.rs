// League and strategy settings, read from `config/league.toml` and
// `config/strategy.toml`.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::draft::pick::{Position, DRAFTABLE_POSITIONS};
use crate::draft::roster::RosterConfig;
use crate::valuation::recommend::DEFAULT_CANDIDATE_POOL;

/// Files looked up under `config/`, seeded from `defaults/` when missing.
pub const CONFIG_FILES: [&str; 2] = ["league.toml", "strategy.toml"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path} is not valid: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("bad value for `{field}`: {message}")]
    Invalid { field: String, message: String },

    #[error("cannot install default {path}: {source}")]
    InstallDefaults {
        path: PathBuf,
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    /// Typed roster layout built from `league.roster`.
    pub roster: RosterConfig,
    pub strategy: StrategyConfig,
    pub data: DataConfig,
    pub state: StateSection,
}

impl Config {
    /// CSV path for one position, resolved against `base_dir`.
    ///
    /// Positions missing from `[data.files]` fall back to `<POS>.csv`.
    pub fn position_file(&self, base_dir: &Path, pos: Position) -> PathBuf {
        let file = self
            .data
            .files
            .iter()
            .find(|(key, _)| Position::from_str_pos(key) == Some(pos))
            .map(|(_, file)| file.clone())
            .unwrap_or_else(|| format!("{}.csv", pos.display_str()));
        base_dir.join(&self.data.dir).join(file)
    }

    /// Snapshot path resolved against `base_dir`.
    pub fn state_file(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.state.path)
    }
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// Wrapper for the top-level `[league]` table in league.toml.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    pub name: String,
    pub num_teams: usize,
    /// Slot name -> count, including `BENCH`. Keys go through
    /// `Position::from_str_pos`, so `DEF`, `BE` etc. are accepted.
    pub roster: HashMap<String, usize>,
}

// ---------------------------------------------------------------------------
// strategy.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire strategy.toml file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct StrategyFile {
    weights: ScoringWeights,
    engine: EngineConfig,
    data: DataConfig,
    state: StateSection,
}

/// The public strategy config assembled from the strategy.toml sections.
#[derive(Debug, Clone, Default)]
pub struct StrategyConfig {
    pub weights: ScoringWeights,
    pub engine: EngineConfig,
}

/// Blend weights for the composite score.
///
/// Applied as given: negative or oversized values are not rejected.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub delta: f64,
    pub vor: f64,
    pub scarcity: f64,
    pub bench_depth_boost: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        ScoringWeights {
            delta: 0.6,
            vor: 0.3,
            scarcity: 0.1,
            bench_depth_boost: 0.15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How many players (by pre-score) get the full lineup-delta treatment.
    pub candidate_pool: usize,
    /// Rows shown by default in the recommendation view.
    pub top_n: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            candidate_pool: DEFAULT_CANDIDATE_POOL,
            top_n: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub dir: String,
    pub files: HashMap<String, String>,
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            dir: "data".into(),
            files: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StateSection {
    pub path: String,
}

impl Default for StateSection {
    fn default() -> Self {
        StateSection {
            path: "draft_state.json".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Copy each of [`CONFIG_FILES`] from `defaults/` into `config/` unless the
/// user already has one. Returns the files written.
pub fn install_defaults(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let config_dir = base_dir.join("config");
    let mut installed = Vec::new();

    for file in CONFIG_FILES {
        let target = config_dir.join(file);
        let source = base_dir.join("defaults").join(file);
        if target.exists() || !source.exists() {
            continue;
        }
        std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::InstallDefaults {
            path: config_dir.clone(),
            source: e,
        })?;
        std::fs::copy(&source, &target).map_err(|e| ConfigError::InstallDefaults {
            path: target.clone(),
            source: e,
        })?;
        info!("installed default {}", target.display());
        installed.push(target);
    }

    Ok(installed)
}

/// Read `config/league.toml` and `config/strategy.toml` under `base_dir`.
/// Both files must exist; every strategy section may be omitted.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");
    let league = read_toml::<LeagueFile>(&config_dir.join("league.toml"))?.league;
    let strategy = read_toml::<StrategyFile>(&config_dir.join("strategy.toml"))?;

    if league.num_teams == 0 {
        return Err(ConfigError::Invalid {
            field: "league.num_teams".into(),
            message: "a league needs at least one team".into(),
        });
    }
    let roster = roster_from_table(&league.roster)?;

    for key in strategy.data.files.keys() {
        if !Position::from_str_pos(key).is_some_and(|pos| DRAFTABLE_POSITIONS.contains(&pos)) {
            warn!("ignoring data file entry for unknown position '{}'", key);
        }
    }

    Ok(Config {
        league,
        roster,
        strategy: StrategyConfig {
            weights: strategy.weights,
            engine: strategy.engine,
        },
        data: strategy.data,
        state: strategy.state,
    })
}

/// [`install_defaults`], then [`load_config_from`].
pub fn load_config(base_dir: &Path) -> Result<Config, ConfigError> {
    install_defaults(base_dir)?;
    load_config_from(base_dir)
}

fn read_toml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    toml::from_str(&text).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// `[league.roster]` to a `RosterConfig`. `BENCH` (or an alias) sets the
/// bench size; without it there is no bench.
fn roster_from_table(raw: &HashMap<String, usize>) -> Result<RosterConfig, ConfigError> {
    let mut starters = BTreeMap::new();
    let mut bench = 0;

    for (key, &count) in raw {
        match Position::from_str_pos(key) {
            Some(Position::Bench) => bench = count,
            Some(pos) => {
                starters.insert(pos, count);
            }
            None => {
                return Err(ConfigError::Invalid {
                    field: format!("league.roster.{key}"),
                    message: "not a roster slot".into(),
                });
            }
        }
    }

    Ok(RosterConfig::new(starters, bench))
}
