// Projection data loading and normalization.
//
// One CSV per position with `player`, `team`, `fantasy`, `positionRank` and
// `overallRank` columns. Only `player` is required.

use crate::config::Config;
use crate::draft::pick::{Position, DRAFTABLE_POSITIONS};
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// A draftable player with a season projection.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub name: String,
    pub team: String,
    pub position: Position,
    /// Projected fantasy points for the season. Always finite.
    pub projection: f64,
    pub position_rank: u32,
    pub overall_rank: u32,
}

/// The full player pool, unique by (name, position) and ordered by
/// (name, position).
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    players: Vec<Player>,
}

impl Catalog {
    /// Build a catalog from raw rows: duplicates of the same (name, position)
    /// keep the highest projection.
    pub fn from_players(mut players: Vec<Player>) -> Self {
        players.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then(a.position.cmp(&b.position))
                .then(b.projection.total_cmp(&a.projection))
        });
        let before = players.len();
        players.dedup_by(|later, earlier| later.name == earlier.name && later.position == earlier.position);
        if players.len() < before {
            debug!("dropped {} duplicate player rows", before - players.len());
        }
        Catalog { players }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Every row for a name (one per position the name appears at).
    pub fn find<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Player> + 'a {
        self.players.iter().filter(move |p| p.name == name)
    }

    /// The row for a name at a specific position.
    pub fn find_at(&self, name: &str, position: Position) -> Option<&Player> {
        self.players
            .iter()
            .find(|p| p.name == name && p.position == position)
    }

    /// First row (in catalog order) with this name.
    pub fn first_named(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {position} projections: {source}")]
    Csv { position: Position, source: csv::Error },

    #[error("expected '{column}' column in {position} CSV")]
    MissingColumn { position: Position, column: String },
}

// ---------------------------------------------------------------------------
// Raw CSV serde struct (private)
// ---------------------------------------------------------------------------

/// One projection row. Absent optional columns deserialize to `None`; extra
/// columns are ignored by the csv deserializer.
#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawPositionRow {
    player: String,
    #[serde(default)]
    team: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    fantasy: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    positionRank: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    overallRank: Option<f64>,
}

/// A usable rank value, or `fallback` (the 1-based row index).
fn rank_or(value: Option<f64>, fallback: u32) -> u32 {
    match value {
        Some(v) if v.is_finite() && v >= 1.0 => v.round() as u32,
        _ => fallback,
    }
}

// ---------------------------------------------------------------------------
// Reader-based loader (enables testing without temp files)
// ---------------------------------------------------------------------------

/// Load one position's projections from any reader.
pub fn load_position_from_reader<R: Read>(
    rdr: R,
    position: Position,
) -> Result<Vec<Player>, CatalogError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(rdr);

    let headers = reader
        .headers()
        .map_err(|e| CatalogError::Csv { position, source: e })?
        .clone();
    if !headers.iter().any(|h| h == "player") {
        return Err(CatalogError::MissingColumn {
            position,
            column: "player".into(),
        });
    }
    if !headers.iter().any(|h| h == "fantasy") {
        warn!("{} CSV has no 'fantasy' column; every row is excluded", position);
        return Ok(Vec::new());
    }

    let mut players = Vec::new();
    for (idx, result) in reader.deserialize::<RawPositionRow>().enumerate() {
        let row_number = idx as u32 + 1;
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skipping malformed {} row {}: {}", position, row_number, e);
                continue;
            }
        };

        let name = raw.player.trim();
        if name.is_empty() {
            debug!("skipping {} row {}: blank player name", position, row_number);
            continue;
        }
        let projection = match raw.fantasy {
            Some(v) if v.is_finite() => v,
            _ => {
                debug!("skipping {} '{}': missing or invalid projection", position, name);
                continue;
            }
        };

        players.push(Player {
            name: name.to_string(),
            team: raw.team.as_deref().map(str::trim).unwrap_or_default().to_string(),
            position,
            projection,
            position_rank: rank_or(raw.positionRank, row_number),
            overall_rank: rank_or(raw.overallRank, row_number),
        });
    }
    Ok(players)
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

/// Load one position's projections from a CSV file.
pub fn load_position(path: &Path, position: Position) -> Result<Vec<Player>, CatalogError> {
    let file = std::fs::File::open(path).map_err(|e| CatalogError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let players = load_position_from_reader(file, position)?;
    info!("loaded {} {} projections from {}", players.len(), position, path.display());
    Ok(players)
}

/// Load every position file named by the config (relative to `base_dir`)
/// and build the catalog.
pub fn load_catalog(config: &Config, base_dir: &Path) -> Result<Catalog, CatalogError> {
    let paths: Vec<(Position, PathBuf)> = DRAFTABLE_POSITIONS
        .iter()
        .map(|&pos| (pos, config.position_file(base_dir, pos)))
        .collect();
    load_catalog_from_paths(&paths)
}

/// Load a catalog from explicit (position, path) pairs.
pub fn load_catalog_from_paths(paths: &[(Position, PathBuf)]) -> Result<Catalog, CatalogError> {
    let mut rows = Vec::new();
    for (pos, path) in paths {
        rows.extend(load_position(path, *pos)?);
    }
    let catalog = Catalog::from_players(rows);
    info!("catalog ready: {} players", catalog.len());
    Ok(catalog)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
