// Best starting lineup for a set of rostered players.

use std::cmp::Ordering;

use crate::draft::pick::Position;
use crate::draft::roster::RosterConfig;
use crate::valuation::projections::Player;

/// Fixed slots are filled in this order before FLEX.
const FILL_ORDER: [Position; 6] = [
    Position::Quarterback,
    Position::TightEnd,
    Position::Defense,
    Position::Kicker,
    Position::RunningBack,
    Position::WideReceiver,
];

/// A starting lineup: which player fills which slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Lineup<'a> {
    /// (slot, player) in fill order.
    pub starters: Vec<(Position, &'a Player)>,
}

impl<'a> Lineup<'a> {
    /// Sum of the starters' projections.
    pub fn total(&self) -> f64 {
        self.starters.iter().map(|(_, p)| p.projection).sum()
    }

    /// Starters assigned to one slot.
    pub fn in_slot(&self, slot: Position) -> impl Iterator<Item = &'a Player> + '_ {
        self.starters
            .iter()
            .filter(move |(s, _)| *s == slot)
            .map(|(_, p)| *p)
    }
}

/// Build the starting lineup: highest projections first, fixed slots in
/// QB, TE, DST, K, RB, WR order, then FLEX from the remaining RB/WR/TE.
///
/// Bench is not part of the lineup. With a single FLEX pool that only draws
/// from positions whose own slots are filled first, this greedy fill is also
/// the maximum-points lineup.
pub fn optimal_lineup<'a>(players: &[&'a Player], roster: &RosterConfig) -> Lineup<'a> {
    let mut order: Vec<&'a Player> = players.to_vec();
    // Stable: equal projections keep input order.
    order.sort_by(|a, b| b.projection.partial_cmp(&a.projection).unwrap_or(Ordering::Equal));

    let mut used = vec![false; order.len()];
    let mut starters = Vec::new();

    let mut fill = |slot: Position, count: usize, eligible: &dyn Fn(Position) -> bool| {
        let mut taken = 0;
        for (idx, player) in order.iter().enumerate() {
            if taken == count {
                break;
            }
            if !used[idx] && eligible(player.position) {
                used[idx] = true;
                starters.push((slot, *player));
                taken += 1;
            }
        }
    };

    for pos in FILL_ORDER {
        fill(pos, roster.slots(pos), &|p| p == pos);
    }
    fill(Position::Flex, roster.slots(Position::Flex), &|p| p.is_flex_eligible());

    Lineup { starters }
}

/// Total projected points of the best starting lineup. Empty input is 0.
pub fn optimal_lineup_total(players: &[&Player], roster: &RosterConfig) -> f64 {
    if players.is_empty() {
        return 0.0;
    }
    optimal_lineup(players, roster).total()
}
