// Draft state: taken players, the local roster, and JSON snapshots.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use tracing::{info, warn};

use super::pick::{Ownership, Pick, Position};
use super::roster::{Roster, RosterConfig};
use crate::valuation::projections::{Catalog, Player};
use crate::valuation::vor::PlayerValuation;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("player '{name}' has already been taken")]
    AlreadyTaken { name: String },

    #[error("failed to access state file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("malformed draft snapshot: {0}")]
    Parse(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Snapshot format
// ---------------------------------------------------------------------------

/// Taken players in draft order, stored as a JSON object of
/// `name -> "mine" | "gone"`. Key order is draft order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TakenLog(pub Vec<Pick>);

impl Serialize for TakenLog {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for pick in &self.0 {
            map.serialize_entry(&pick.player_name, &pick.ownership)?;
        }
        map.end()
    }
}

struct TakenLogVisitor;

impl<'de> Visitor<'de> for TakenLogVisitor {
    type Value = TakenLog;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of player name to \"mine\" or \"gone\"")
    }

    fn visit_map<A>(self, mut access: A) -> Result<TakenLog, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut picks: Vec<Pick> = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((name, ownership)) = access.next_entry::<String, Ownership>()? {
            if picks.iter().any(|p| p.player_name == name) {
                warn!("snapshot lists '{}' as taken twice; keeping the first entry", name);
                continue;
            }
            picks.push(Pick {
                player_name: name,
                ownership,
                position: None,
            });
        }
        Ok(TakenLog(picks))
    }
}

impl<'de> Deserialize<'de> for TakenLog {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(TakenLogVisitor)
    }
}

/// Serialized draft state. Every key is optional on load; the older
/// `my_roster` / `my_roster_names` key names are accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DraftSnapshot {
    #[serde(default)]
    pub taken: TakenLog,
    /// Position each taken player was drafted at, keyed by name.
    #[serde(default)]
    pub positions: BTreeMap<String, String>,
    #[serde(default, alias = "my_roster")]
    pub roster_counts: BTreeMap<String, usize>,
    #[serde(default, alias = "my_roster_names")]
    pub roster_names: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// DraftState
// ---------------------------------------------------------------------------

/// The draft as seen by the local drafter.
///
/// Mutated only through [`DraftState::take`] and [`DraftState::undo_last`].
#[derive(Debug, Clone, PartialEq)]
pub struct DraftState {
    taken: Vec<Pick>,
    roster: Roster,
    roster_config: RosterConfig,
}

impl DraftState {
    /// An empty draft for the given roster layout.
    pub fn new(roster_config: RosterConfig) -> Self {
        DraftState {
            taken: Vec::new(),
            roster: Roster::new(&roster_config),
            roster_config,
        }
    }

    pub fn taken(&self) -> &[Pick] {
        &self.taken
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn roster_config(&self) -> &RosterConfig {
        &self.roster_config
    }

    pub fn is_taken(&self, name: &str) -> bool {
        self.taken.iter().any(|p| p.player_name == name)
    }

    /// Number of players taken league-wide.
    pub fn drafted_count(&self) -> usize {
        self.taken.len()
    }

    /// Record a player as taken.
    ///
    /// For `Ownership::Mine` the player is slotted (position, then FLEX,
    /// then bench) and the slot is returned. `Gone` picks return `None`.
    pub fn take(&mut self, player: &Player, ownership: Ownership) -> Result<Option<Position>, StateError> {
        if self.is_taken(&player.name) || self.roster.has_player(&player.name) {
            return Err(StateError::AlreadyTaken {
                name: player.name.clone(),
            });
        }

        self.taken.push(Pick {
            player_name: player.name.clone(),
            ownership,
            position: Some(player.position),
        });

        let slot = match ownership {
            Ownership::Mine => Some(
                self.roster
                    .add_player(&player.name, player.position, &self.roster_config),
            ),
            Ownership::Gone => None,
        };
        info!(
            "took {} ({}) as {:?}{}",
            player.name,
            player.position,
            ownership,
            slot.map(|s| format!(" into {s}")).unwrap_or_default()
        );
        Ok(slot)
    }

    /// Undo the most recent take. A "mine" pick is removed from the roster,
    /// searching the player's own position, FLEX, BENCH, then any slot.
    ///
    /// The own position is the one recorded at take time. Picks without
    /// one fall back to the catalog.
    ///
    /// Returns the undone pick, or `None` when nothing has been taken.
    pub fn undo_last(&mut self, catalog: &Catalog) -> Option<Pick> {
        let pick = self.taken.pop()?;

        if pick.is_mine() {
            let name = pick.player_name.as_str();
            let own = pick.position.or_else(|| {
                let positions: Vec<Position> = catalog.find(name).map(|p| p.position).collect();
                positions
                    .iter()
                    .copied()
                    .find(|&pos| self.roster.names(pos).iter().any(|n| n == name))
                    .or_else(|| positions.first().copied())
            });

            match self.roster.remove_player(name, own) {
                Some(slot) => info!("undid {} (removed from {})", name, slot),
                None => warn!("undid '{}' but it was not on the roster", name),
            }
        } else {
            info!("undid {} (gone)", pick.player_name);
        }
        Some(pick)
    }

    /// The pool without any taken player. Order is preserved.
    pub fn available(&self, pool: &[PlayerValuation]) -> Vec<PlayerValuation> {
        let taken: HashSet<&str> = self.taken.iter().map(|p| p.player_name.as_str()).collect();
        pool.iter()
            .filter(|v| !taken.contains(v.name()))
            .cloned()
            .collect()
    }

    /// Catalog rows for every rostered name, in roster order.
    ///
    /// A name listed at several positions resolves to the row it was drafted
    /// at, then the row matching its slot. Names missing from the catalog
    /// are skipped.
    pub fn my_players<'c>(&self, catalog: &'c Catalog) -> Vec<&'c Player> {
        let drafted_at: HashMap<&str, Position> = self
            .taken
            .iter()
            .filter_map(|p| p.position.map(|pos| (p.player_name.as_str(), pos)))
            .collect();

        self.roster
            .iter()
            .filter_map(|(slot, name)| {
                let found = drafted_at
                    .get(name)
                    .and_then(|&pos| catalog.find_at(name, pos))
                    .or_else(|| catalog.find_at(name, slot))
                    .or_else(|| catalog.first_named(name));
                if found.is_none() {
                    warn!("rostered player '{}' is not in the catalog", name);
                }
                found
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Snapshots
    // -----------------------------------------------------------------------

    pub fn to_snapshot(&self) -> DraftSnapshot {
        let roster_counts = self
            .roster
            .counts()
            .into_iter()
            .map(|(slot, n)| (slot.display_str().to_string(), n))
            .collect();
        let roster_names = self
            .roster
            .slots()
            .iter()
            .map(|(slot, names)| (slot.display_str().to_string(), names.clone()))
            .collect();
        let positions = self
            .taken
            .iter()
            .filter_map(|p| {
                p.position
                    .map(|pos| (p.player_name.clone(), pos.display_str().to_string()))
            })
            .collect();
        DraftSnapshot {
            taken: TakenLog(self.taken.clone()),
            positions,
            roster_counts,
            roster_names,
            saved_at: Some(Utc::now()),
        }
    }

    /// Rebuild state from a snapshot, repairing what can be repaired:
    /// unknown slots are skipped, a name listed in two slots keeps the
    /// first, rostered names missing from `taken` are appended as "mine",
    /// and list lengths win over stored counts.
    pub fn from_snapshot(snapshot: DraftSnapshot, roster_config: RosterConfig) -> Self {
        let mut state = DraftState::new(roster_config);
        state.taken = snapshot.taken.0;

        for pick in &mut state.taken {
            let Some(raw) = snapshot.positions.get(&pick.player_name) else {
                continue;
            };
            match Position::from_str_pos(raw).filter(|p| !p.is_meta_slot()) {
                Some(pos) => pick.position = Some(pos),
                None => warn!("snapshot has unknown position '{}' for '{}'", raw, pick.player_name),
            }
        }

        for (key, names) in &snapshot.roster_names {
            let Some(slot) = Position::from_str_pos(key) else {
                warn!("snapshot has unknown roster slot '{}'; skipping {} names", key, names.len());
                continue;
            };
            for name in names {
                if !state.roster.insert(slot, name) {
                    warn!("snapshot lists '{}' in more than one slot; keeping the first", name);
                    continue;
                }
                match state.taken.iter_mut().find(|p| p.player_name == *name) {
                    Some(pick) => {
                        // Older snapshots carry no positions; a dedicated slot implies one.
                        if pick.position.is_none() && !slot.is_meta_slot() {
                            pick.position = Some(slot);
                        }
                    }
                    None => {
                        warn!("rostered player '{}' is missing from taken; marking as mine", name);
                        state.taken.push(Pick {
                            player_name: name.clone(),
                            ownership: Ownership::Mine,
                            position: (!slot.is_meta_slot()).then_some(slot),
                        });
                    }
                }
            }
        }

        for (key, &count) in &snapshot.roster_counts {
            let Some(slot) = Position::from_str_pos(key) else {
                continue;
            };
            let actual = state.roster.count(slot);
            if actual != count {
                warn!(
                    "snapshot count for {} is {} but {} names are listed; using the list",
                    slot, count, actual
                );
            }
        }

        state
    }

    pub fn to_json(&self) -> Result<String, StateError> {
        Ok(serde_json::to_string_pretty(&self.to_snapshot())?)
    }

    pub fn from_json(json: &str, roster_config: RosterConfig) -> Result<Self, StateError> {
        let snapshot: DraftSnapshot = serde_json::from_str(json)?;
        Ok(Self::from_snapshot(snapshot, roster_config))
    }

    /// Write the snapshot to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), StateError> {
        let io_err = |e: std::io::Error| StateError::Io {
            path: path.display().to_string(),
            source: e,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        std::fs::write(path, self.to_json()?).map_err(io_err)
    }

    /// Load a snapshot file. A missing file is an empty draft.
    pub fn load(path: &Path, roster_config: RosterConfig) -> Result<Self, StateError> {
        if !path.exists() {
            return Ok(DraftState::new(roster_config));
        }
        let text = std::fs::read_to_string(path).map_err(|e| StateError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_json(&text, roster_config)
    }

    /// Like [`DraftState::load`], but any failure logs a warning and yields
    /// an empty draft.
    pub fn load_or_default(path: &Path, roster_config: RosterConfig) -> Self {
        match Self::load(path, roster_config.clone()) {
            Ok(state) => state,
            Err(e) => {
                warn!("ignoring draft state at {}: {}", path.display(), e);
                DraftState::new(roster_config)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
