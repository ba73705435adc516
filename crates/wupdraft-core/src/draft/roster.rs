// Roster configuration and the local drafter's slot assignment.

use std::collections::BTreeMap;

use tracing::warn;

use super::pick::Position;

/// Required starting slots plus bench capacity.
///
/// Starting slots are QB/RB/WR/TE/FLEX/DST/K; FLEX accepts RB, WR or TE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterConfig {
    starters: BTreeMap<Position, usize>,
    bench: usize,
}

impl RosterConfig {
    /// Build a configuration from starting-slot counts and a bench size.
    ///
    /// A `Bench` entry in `starters` is ignored; bench capacity is always the
    /// explicit `bench` argument.
    pub fn new(starters: BTreeMap<Position, usize>, bench: usize) -> Self {
        let starters = starters
            .into_iter()
            .filter(|(pos, _)| *pos != Position::Bench)
            .collect();
        RosterConfig { starters, bench }
    }

    /// The common 1 QB / 2 RB / 2 WR / 1 TE / 1 FLEX / 1 DST / 1 K layout
    /// with a 7-player bench.
    pub fn standard() -> Self {
        let starters = BTreeMap::from([
            (Position::Quarterback, 1),
            (Position::RunningBack, 2),
            (Position::WideReceiver, 2),
            (Position::TightEnd, 1),
            (Position::Flex, 1),
            (Position::Defense, 1),
            (Position::Kicker, 1),
        ]);
        RosterConfig::new(starters, 7)
    }

    /// Required count for a slot. `Bench` returns the bench capacity; slots
    /// missing from the configuration return 0.
    pub fn slots(&self, slot: Position) -> usize {
        match slot {
            Position::Bench => self.bench,
            other => self.starters.get(&other).copied().unwrap_or(0),
        }
    }

    /// Whether the configuration names this starting slot at all.
    pub fn has_slot(&self, slot: Position) -> bool {
        match slot {
            Position::Bench => true,
            other => self.starters.contains_key(&other),
        }
    }

    pub fn bench(&self) -> usize {
        self.bench
    }

    /// Starting slots in display order.
    pub fn starters(&self) -> impl Iterator<Item = (Position, usize)> + '_ {
        self.starters.iter().map(|(&pos, &count)| (pos, count))
    }

    /// Sum of all starting slot counts (FLEX included, bench excluded).
    pub fn starting_slot_total(&self) -> usize {
        self.starters.values().sum()
    }

    /// Roster spots per team: starters plus bench.
    pub fn total_slots(&self) -> usize {
        self.starting_slot_total() + self.bench
    }
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// The local drafter's roster: each slot maps to the ordered names holding it.
///
/// A name appears in at most one slot list. The count for a slot is the
/// length of its list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    slots: BTreeMap<Position, Vec<String>>,
}

impl Roster {
    /// Create an empty roster with one (empty) list per configured starting
    /// slot plus BENCH.
    pub fn new(config: &RosterConfig) -> Self {
        let mut slots: BTreeMap<Position, Vec<String>> = config
            .starters()
            .map(|(pos, _)| (pos, Vec::new()))
            .collect();
        slots.insert(Position::Bench, Vec::new());
        Roster { slots }
    }

    /// Number of players currently holding a slot.
    pub fn count(&self, slot: Position) -> usize {
        self.slots.get(&slot).map_or(0, Vec::len)
    }

    /// Names holding a slot, in the order they were added.
    pub fn names(&self, slot: Position) -> &[String] {
        self.slots.get(&slot).map_or(&[], Vec::as_slice)
    }

    /// Whether the slot still has room under the configuration.
    pub fn has_empty_slot(&self, slot: Position, config: &RosterConfig) -> bool {
        self.count(slot) < config.slots(slot)
    }

    pub fn has_player(&self, name: &str) -> bool {
        self.slot_of(name).is_some()
    }

    /// The slot currently holding `name`, if any.
    pub fn slot_of(&self, name: &str) -> Option<Position> {
        self.slots
            .iter()
            .find(|(_, names)| names.iter().any(|n| n == name))
            .map(|(&slot, _)| slot)
    }

    /// Add a player to the roster and return the slot used.
    ///
    /// Slot assignment priority:
    /// 1. Dedicated position slot (exact match, if open)
    /// 2. FLEX (RB/WR/TE only, if open)
    /// 3. Bench
    ///
    /// The bench takes overflow beyond its configured capacity.
    pub fn add_player(&mut self, name: &str, position: Position, config: &RosterConfig) -> Position {
        let slot = if !position.is_meta_slot() && self.has_empty_slot(position, config) {
            position
        } else if position.is_flex_eligible() && self.has_empty_slot(Position::Flex, config) {
            Position::Flex
        } else {
            if !self.has_empty_slot(Position::Bench, config) {
                warn!(
                    "bench is full ({} of {}); adding '{}' anyway",
                    self.count(Position::Bench),
                    config.bench(),
                    name
                );
            }
            Position::Bench
        };

        self.slots.entry(slot).or_default().push(name.to_string());
        slot
    }

    /// Place a name directly into a slot, bypassing assignment priority.
    ///
    /// Returns `false` (and changes nothing) if the name is already rostered.
    pub fn insert(&mut self, slot: Position, name: &str) -> bool {
        if self.has_player(name) {
            return false;
        }
        self.slots.entry(slot).or_default().push(name.to_string());
        true
    }

    /// Remove a player and return the slot they were removed from.
    ///
    /// Slots are searched in order: the player's own position (when known),
    /// FLEX, BENCH, then any other slot.
    pub fn remove_player(&mut self, name: &str, position: Option<Position>) -> Option<Position> {
        let mut search: Vec<Position> = Vec::new();
        if let Some(pos) = position {
            search.push(pos);
        }
        search.push(Position::Flex);
        search.push(Position::Bench);
        let rest: Vec<Position> = self
            .slots
            .keys()
            .copied()
            .filter(|s| !search.contains(s))
            .collect();
        search.extend(rest);

        for slot in search {
            if let Some(names) = self.slots.get_mut(&slot) {
                if let Some(idx) = names.iter().position(|n| n == name) {
                    names.remove(idx);
                    return Some(slot);
                }
            }
        }
        None
    }

    /// Number of rostered players across all slots.
    pub fn filled_count(&self) -> usize {
        self.slots.values().map(Vec::len).sum()
    }

    /// Per-slot counts (every known slot, including empty ones).
    pub fn counts(&self) -> BTreeMap<Position, usize> {
        self.slots.iter().map(|(&slot, names)| (slot, names.len())).collect()
    }

    /// Every (slot, name) pair in slot order, then insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (Position, &str)> + '_ {
        self.slots
            .iter()
            .flat_map(|(&slot, names)| names.iter().map(move |n| (slot, n.as_str())))
    }

    /// All known slots with their name lists.
    pub fn slots(&self) -> &BTreeMap<Position, Vec<String>> {
        &self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_config_totals() {
        let config = RosterConfig::standard();
        assert_eq!(config.starting_slot_total(), 9);
        assert_eq!(config.bench(), 7);
        assert_eq!(config.total_slots(), 16);
        assert_eq!(config.slots(Position::RunningBack), 2);
        assert_eq!(config.slots(Position::Bench), 7);
    }

    #[test]
    fn config_ignores_bench_in_starters() {
        let starters = BTreeMap::from([(Position::Quarterback, 1), (Position::Bench, 12)]);
        let config = RosterConfig::new(starters, 3);
        assert_eq!(config.bench(), 3);
        assert_eq!(config.starting_slot_total(), 1);
    }

    #[test]
    fn missing_slot_has_zero_count() {
        let config = RosterConfig::new(BTreeMap::from([(Position::Quarterback, 1)]), 0);
        assert_eq!(config.slots(Position::Flex), 0);
        assert!(!config.has_slot(Position::Flex));
    }

    #[test]
    fn new_roster_has_every_slot_empty() {
        let roster = Roster::new(&RosterConfig::standard());
        assert_eq!(roster.filled_count(), 0);
        // 7 starting slots + BENCH
        assert_eq!(roster.counts().len(), 8);
        assert!(roster.counts().values().all(|&c| c == 0));
    }

    #[test]
    fn add_player_dedicated_slot() {
        let config = RosterConfig::standard();
        let mut roster = Roster::new(&config);
        let slot = roster.add_player("Josh Allen", Position::Quarterback, &config);
        assert_eq!(slot, Position::Quarterback);
        assert_eq!(roster.names(Position::Quarterback), ["Josh Allen".to_string()]);
    }

    #[test]
    fn add_player_flex_fallback() {
        let config = RosterConfig::standard();
        let mut roster = Roster::new(&config);
        assert_eq!(roster.add_player("RB 1", Position::RunningBack, &config), Position::RunningBack);
        assert_eq!(roster.add_player("RB 2", Position::RunningBack, &config), Position::RunningBack);
        assert_eq!(roster.add_player("RB 3", Position::RunningBack, &config), Position::Flex);
        assert_eq!(roster.add_player("RB 4", Position::RunningBack, &config), Position::Bench);
    }

    #[test]
    fn add_player_qb_skips_flex() {
        let config = RosterConfig::standard();
        let mut roster = Roster::new(&config);
        roster.add_player("QB 1", Position::Quarterback, &config);
        let slot = roster.add_player("QB 2", Position::Quarterback, &config);
        assert_eq!(slot, Position::Bench);
        assert_eq!(roster.count(Position::Flex), 0, "FLEX should remain empty for a QB");
    }

    #[test]
    fn bench_accepts_overflow() {
        let config = RosterConfig::new(BTreeMap::from([(Position::Kicker, 1)]), 1);
        let mut roster = Roster::new(&config);
        roster.add_player("K 1", Position::Kicker, &config);
        roster.add_player("K 2", Position::Kicker, &config);
        let slot = roster.add_player("K 3", Position::Kicker, &config);
        assert_eq!(slot, Position::Bench);
        assert_eq!(roster.count(Position::Bench), 2);
    }

    #[test]
    fn insert_refuses_duplicates() {
        let config = RosterConfig::standard();
        let mut roster = Roster::new(&config);
        assert!(roster.insert(Position::Bench, "Player"));
        assert!(!roster.insert(Position::Quarterback, "Player"));
        assert_eq!(roster.filled_count(), 1);
    }

    #[test]
    fn remove_player_searches_own_position_first() {
        let config = RosterConfig::standard();
        let mut roster = Roster::new(&config);
        roster.add_player("WR 1", Position::WideReceiver, &config);
        roster.add_player("WR 2", Position::WideReceiver, &config);
        roster.add_player("WR 3", Position::WideReceiver, &config);

        assert_eq!(roster.remove_player("WR 3", Some(Position::WideReceiver)), Some(Position::Flex));
        assert_eq!(roster.remove_player("WR 1", Some(Position::WideReceiver)), Some(Position::WideReceiver));
        assert_eq!(roster.names(Position::WideReceiver), ["WR 2".to_string()]);
    }

    #[test]
    fn remove_player_without_position_scans_all_slots() {
        let config = RosterConfig::standard();
        let mut roster = Roster::new(&config);
        roster.add_player("Kicker", Position::Kicker, &config);
        assert_eq!(roster.remove_player("Kicker", None), Some(Position::Kicker));
        assert_eq!(roster.remove_player("Kicker", None), None);
    }

    #[test]
    fn remove_player_falls_back_to_remaining_slots() {
        let config = RosterConfig::standard();
        let mut roster = Roster::new(&config);
        roster.add_player("TE 1", Position::TightEnd, &config);
        roster.add_player("DST 1", Position::Defense, &config);

        // Wrong position hint: own slot, FLEX and BENCH all miss.
        assert_eq!(roster.remove_player("TE 1", Some(Position::Quarterback)), Some(Position::TightEnd));
        assert_eq!(roster.remove_player("DST 1", Some(Position::Kicker)), Some(Position::Defense));
        assert_eq!(roster.filled_count(), 0);
    }

    #[test]
    fn slot_of_and_iter() {
        let config = RosterConfig::standard();
        let mut roster = Roster::new(&config);
        roster.add_player("TE 1", Position::TightEnd, &config);
        roster.add_player("QB 1", Position::Quarterback, &config);
        assert_eq!(roster.slot_of("TE 1"), Some(Position::TightEnd));
        assert!(roster.slot_of("Nobody").is_none());

        let pairs: Vec<_> = roster.iter().collect();
        assert_eq!(pairs, vec![(Position::Quarterback, "QB 1"), (Position::TightEnd, "TE 1")]);
    }
}
