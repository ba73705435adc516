// Value Over Replacement (VOR) against positional and FLEX baselines.
//
// Each position's replacement level is the projection of the player at the
// replacement rank: every team's starters plus a position-specific share of
// bench stashes. RB/WR/TE additionally get VOR against a pooled FLEX baseline.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::draft::pick::{Position, DRAFTABLE_POSITIONS};
use crate::draft::roster::RosterConfig;
use crate::valuation::projections::Player;

/// Share of a league's bench spots (per team) expected to hold each position.
pub fn bench_share(pos: Position) -> f64 {
    match pos {
        Position::Quarterback => 0.3,
        Position::RunningBack => 1.5,
        Position::WideReceiver => 1.5,
        Position::TightEnd => 0.4,
        Position::Defense => 0.2,
        Position::Kicker => 0.2,
        _ => 0.3,
    }
}

/// Extra FLEX-eligible players per team counted above the FLEX starters.
const FLEX_BENCH_SHARE: f64 = 0.8;

/// A player with their replacement baseline and value over it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerValuation {
    pub player: Player,
    /// Projection of the replacement-level player at this position.
    pub baseline: f64,
    /// `projection - baseline`.
    pub vor: f64,
    /// `projection - flex_baseline` for RB/WR/TE, `None` otherwise.
    pub vor_flex: Option<f64>,
}

impl PlayerValuation {
    pub fn name(&self) -> &str {
        &self.player.name
    }

    pub fn position(&self) -> Position {
        self.player.position
    }

    pub fn projection(&self) -> f64 {
        self.player.projection
    }

    /// The VOR signal used in scoring: FLEX VOR when available, otherwise
    /// positional VOR. Non-finite values count as 0.
    pub fn vor_component(&self) -> f64 {
        let v = self.vor_flex.unwrap_or(self.vor);
        if v.is_finite() {
            v
        } else {
            0.0
        }
    }
}

// ---------------------------------------------------------------------------
// Replacement ranks
// ---------------------------------------------------------------------------

/// `league_size * share`, rounded half-to-even.
fn league_share(league_size: usize, share: f64) -> usize {
    (league_size as f64 * share).round_ties_even() as usize
}

/// Replacement rank for every draftable position:
/// `max(1, league_size * slots + round(league_size * bench_share))`.
///
/// Positions without a configured slot use a slot count of 0.
pub fn compute_replacement_ranks(roster: &RosterConfig, league_size: usize) -> BTreeMap<Position, usize> {
    DRAFTABLE_POSITIONS
        .iter()
        .map(|&pos| {
            let starters = league_size * roster.slots(pos);
            let bench_extra = league_share(league_size, bench_share(pos));
            (pos, (starters + bench_extra).max(1))
        })
        .collect()
}

/// Rank of the FLEX replacement player within the pooled RB/WR/TE list.
///
/// A roster without a FLEX entry is treated as having one FLEX slot.
pub fn flex_replacement_rank(roster: &RosterConfig, league_size: usize) -> usize {
    let flex_slots = if roster.has_slot(Position::Flex) {
        roster.slots(Position::Flex)
    } else {
        1
    };
    league_size * flex_slots + league_share(league_size, FLEX_BENCH_SHARE)
}

// ---------------------------------------------------------------------------
// Baselines
// ---------------------------------------------------------------------------

fn sorted_projections<'a>(players: impl Iterator<Item = &'a Player>) -> Vec<f64> {
    let mut projections: Vec<f64> = players.map(|p| p.projection).collect();
    projections.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));
    projections
}

/// Per-position baseline: the projection at `rank` (1-indexed), the weakest
/// projection when the pool is shorter, or 0 when it is empty.
pub fn compute_baselines(
    players: &[Player],
    replacement_ranks: &BTreeMap<Position, usize>,
) -> BTreeMap<Position, f64> {
    replacement_ranks
        .iter()
        .map(|(&pos, &rank)| {
            let projections = sorted_projections(players.iter().filter(|p| p.position == pos));
            let baseline = if projections.len() >= rank {
                projections[rank.saturating_sub(1)]
            } else {
                projections.last().copied().unwrap_or(0.0)
            };
            (pos, baseline)
        })
        .collect()
}

/// Baseline for the pooled RB/WR/TE list. The rank is clamped into the pool.
pub fn compute_flex_baseline(players: &[Player], roster: &RosterConfig, league_size: usize) -> f64 {
    let projections = sorted_projections(players.iter().filter(|p| p.position.is_flex_eligible()));
    if projections.is_empty() {
        return 0.0;
    }
    let rank = flex_replacement_rank(roster, league_size);
    let idx = rank.saturating_sub(1).min(projections.len() - 1);
    projections[idx]
}

// ---------------------------------------------------------------------------
// Pipeline entry point
// ---------------------------------------------------------------------------

/// Value every player against their positional and FLEX baselines.
///
/// Baselines are computed from `players` itself, so callers pass the full
/// catalog (drafted players included). Output is in input order.
pub fn apply_vor(players: &[Player], roster: &RosterConfig, league_size: usize) -> Vec<PlayerValuation> {
    let ranks = compute_replacement_ranks(roster, league_size);
    let baselines = compute_baselines(players, &ranks);
    let flex_baseline = compute_flex_baseline(players, roster, league_size);

    players
        .iter()
        .map(|p| {
            let baseline = baselines.get(&p.position).copied().unwrap_or(0.0);
            PlayerValuation {
                player: p.clone(),
                baseline,
                vor: p.projection - baseline,
                vor_flex: p
                    .position
                    .is_flex_eligible()
                    .then(|| p.projection - flex_baseline),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
