// Composite draft recommendations.
//
// Blends three signals per available player: lineup gain (delta), value over
// replacement, and positional drop-off (scarcity). The blend is scaled by a
// draft-phase position weight and a bench-depth weight, then sorted.

use std::cmp::Ordering;

use tracing::debug;

use crate::config::ScoringWeights;
use crate::draft::pick::Position;
use crate::draft::roster::RosterConfig;
use crate::valuation::lineup::optimal_lineup_total;
use crate::valuation::projections::Player;
use crate::valuation::scarcity::compute_scarcity;
use crate::valuation::vor::PlayerValuation;

/// Lineup gain above which a candidate counts as a starter.
pub const WOULD_START_THRESHOLD: f64 = 0.05;

/// Position-weight multiplier for candidates who would start.
const STARTER_BONUS: f64 = 1.05;

/// Default number of players that get a full lineup re-evaluation.
pub const DEFAULT_CANDIDATE_POOL: usize = 120;

// ---------------------------------------------------------------------------
// Draft-phase position weights
// ---------------------------------------------------------------------------

/// (progress threshold, weight) steps, ascending by threshold. The weight of
/// the last step whose threshold is <= progress applies.
type Ramp = &'static [(f64, f64)];

const QB_RAMP: Ramp = &[(0.0, 0.8), (0.4, 0.9), (0.7, 1.0)];
const DST_RAMP: Ramp = &[(0.0, 0.3), (0.75, 0.8), (0.9, 1.0)];
const K_RAMP: Ramp = &[(0.0, 0.2), (0.85, 0.6), (0.95, 1.0)];

fn ramp_weight(ramp: Ramp, progress: f64) -> f64 {
    ramp.iter()
        .take_while(|(threshold, _)| progress >= *threshold)
        .last()
        .map_or(1.0, |(_, weight)| *weight)
}

/// Draft-phase weight for a position. QB, DST and K start discounted and
/// ramp up to 1.0 as the draft progresses; everyone else is 1.0.
pub fn position_weight(position: Position, progress: f64) -> f64 {
    match position {
        Position::Quarterback => ramp_weight(QB_RAMP, progress),
        Position::Defense => ramp_weight(DST_RAMP, progress),
        Position::Kicker => ramp_weight(K_RAMP, progress),
        _ => 1.0,
    }
}

/// Weight for a pick that would not start: RB/WR/TE depth is boosted,
/// backup QB/DST/K are discounted. Starters are always 1.0.
pub fn bench_weight(position: Position, would_start: bool, bench_depth_boost: f64) -> f64 {
    if would_start {
        return 1.0;
    }
    match position {
        Position::RunningBack | Position::WideReceiver | Position::TightEnd => 1.0 + bench_depth_boost,
        Position::Quarterback => 0.85,
        Position::Defense => 0.7,
        Position::Kicker => 0.6,
        _ => 0.9,
    }
}

/// Fraction of the draft completed, in [0, 1].
pub fn draft_progress(drafted_count: usize, roster: &RosterConfig, league_size: usize) -> f64 {
    let total_picks = (league_size * roster.total_slots()).max(1);
    (drafted_count as f64 / total_picks as f64).clamp(0.0, 1.0)
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Everything about the draft the scorer needs besides the pool itself.
#[derive(Debug, Clone, Copy)]
pub struct DraftContext<'a> {
    pub roster: &'a RosterConfig,
    /// Players on the local drafter's roster (any slot, bench included).
    pub my_players: &'a [&'a Player],
    /// Players taken league-wide so far.
    pub drafted_count: usize,
    pub league_size: usize,
}

/// One scored row of the recommendation table.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub valuation: PlayerValuation,
    pub scarcity: f64,
    /// Lineup points gained by adding this player. 0 outside the candidate pool.
    pub delta: f64,
    pub would_start: bool,
    pub pos_weight: f64,
    pub bench_weight: f64,
    pub score_base: f64,
    pub score: f64,
}

impl Recommendation {
    pub fn name(&self) -> &str {
        self.valuation.name()
    }

    pub fn position(&self) -> Position {
        self.valuation.position()
    }
}

/// Indices of the `k` highest pre-scores. Ties keep input order.
fn select_candidates(pre_scores: &[f64], k: usize) -> Vec<bool> {
    let mut order: Vec<usize> = (0..pre_scores.len()).collect();
    order.sort_by(|&a, &b| pre_scores[b].total_cmp(&pre_scores[a]));

    let mut selected = vec![false; pre_scores.len()];
    for &idx in order.iter().take(k) {
        selected[idx] = true;
    }
    selected
}

/// Score and rank the available pool.
///
/// Only the top `candidate_pool` players by `w_vor * vor + w_scarcity *
/// scarcity` get a lineup re-evaluation; the rest keep `delta = 0` and
/// `would_start = false`. Output is sorted descending by (score, score_base,
/// delta, VOR, projection); ties keep input order.
pub fn recommend(
    available: &[PlayerValuation],
    ctx: &DraftContext<'_>,
    weights: &ScoringWeights,
    candidate_pool: usize,
) -> Vec<Recommendation> {
    let baseline_total = optimal_lineup_total(ctx.my_players, ctx.roster);
    let progress = draft_progress(ctx.drafted_count, ctx.roster, ctx.league_size);
    let scarcity = compute_scarcity(available);

    let vor_components: Vec<f64> = available.iter().map(PlayerValuation::vor_component).collect();
    let pre_scores: Vec<f64> = vor_components
        .iter()
        .zip(&scarcity)
        .map(|(vor, sc)| weights.vor * vor + weights.scarcity * sc)
        .collect();
    let candidates = select_candidates(&pre_scores, candidate_pool);

    let mut with_candidate: Vec<&Player> = Vec::with_capacity(ctx.my_players.len() + 1);
    let mut recs: Vec<Recommendation> = available
        .iter()
        .enumerate()
        .map(|(idx, v)| {
            let delta = if candidates[idx] {
                with_candidate.clear();
                with_candidate.extend_from_slice(ctx.my_players);
                with_candidate.push(&v.player);
                optimal_lineup_total(&with_candidate, ctx.roster) - baseline_total
            } else {
                0.0
            };
            let would_start = delta > WOULD_START_THRESHOLD;

            let mut pos_weight = position_weight(v.position(), progress);
            if would_start {
                pos_weight *= STARTER_BONUS;
            }
            let bench_weight = bench_weight(v.position(), would_start, weights.bench_depth_boost);

            let score_base =
                weights.delta * delta + weights.vor * vor_components[idx] + weights.scarcity * scarcity[idx];

            Recommendation {
                valuation: v.clone(),
                scarcity: scarcity[idx],
                delta,
                would_start,
                pos_weight,
                bench_weight,
                score_base,
                score: score_base * pos_weight * bench_weight,
            }
        })
        .collect();

    recs.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then(b.score_base.partial_cmp(&a.score_base).unwrap_or(Ordering::Equal))
            .then(b.delta.partial_cmp(&a.delta).unwrap_or(Ordering::Equal))
            .then(b.valuation.vor.partial_cmp(&a.valuation.vor).unwrap_or(Ordering::Equal))
            .then(
                b.valuation
                    .projection()
                    .partial_cmp(&a.valuation.projection())
                    .unwrap_or(Ordering::Equal),
            )
    });

    debug!(
        "scored {} players ({} candidates, progress {:.3}, lineup {:.1})",
        recs.len(),
        candidates.iter().filter(|&&c| c).count(),
        progress,
        baseline_total
    );
    recs
}

// ---------------------------------------------------------------------------
// View filtering
// ---------------------------------------------------------------------------

/// Display filter applied to an already-scored ranking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecommendationFilter {
    /// Positions to keep; empty keeps all.
    pub positions: Vec<Position>,
    /// Case-insensitive substring matched against name or team.
    pub search: Option<String>,
    /// Maximum rows to keep.
    pub limit: Option<usize>,
}

impl RecommendationFilter {
    pub fn matches(&self, rec: &Recommendation) -> bool {
        if !self.positions.is_empty() && !self.positions.contains(&rec.position()) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => {
                let needle = needle.to_lowercase();
                rec.name().to_lowercase().contains(&needle)
                    || rec.valuation.player.team.to_lowercase().contains(&needle)
            }
            _ => true,
        }
    }

    /// Keep matching rows in ranking order, truncated to `limit`.
    pub fn apply(&self, recs: Vec<Recommendation>) -> Vec<Recommendation> {
        let mut kept: Vec<Recommendation> = recs.into_iter().filter(|r| self.matches(r)).collect();
        if let Some(limit) = self.limit {
            kept.truncate(limit);
        }
        kept
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn player(name: &str, position: Position, projection: f64) -> Player {
        Player {
            name: name.into(),
            team: "FA".into(),
            position,
            projection,
            position_rank: 1,
            overall_rank: 1,
        }
    }

    fn valuation(name: &str, position: Position, projection: f64, vor: f64) -> PlayerValuation {
        PlayerValuation {
            player: player(name, position, projection),
            baseline: projection - vor,
            vor,
            vor_flex: None,
        }
    }

    fn ctx<'a>(roster: &'a RosterConfig, my_players: &'a [&'a Player]) -> DraftContext<'a> {
        DraftContext {
            roster,
            my_players,
            drafted_count: 0,
            league_size: 14,
        }
    }

    #[test]
    fn lone_rb_on_empty_roster() {
        let roster = RosterConfig::standard();
        let available = vec![valuation("RB", Position::RunningBack, 300.0, 50.0)];
        let recs = recommend(&available, &ctx(&roster, &[]), &ScoringWeights::default(), 120);

        assert_eq!(recs.len(), 1);
        let r = &recs[0];
        assert!(approx_eq(r.delta, 300.0, 1e-9));
        assert!(r.would_start);
        assert!(approx_eq(r.pos_weight, 1.05, 1e-12));
        assert!(approx_eq(r.bench_weight, 1.0, 1e-12));
        // 0.6*300 + 0.3*50 + 0.1*0
        assert!(approx_eq(r.score_base, 195.0, 1e-9));
        assert!(approx_eq(r.score, 195.0 * 1.05, 1e-9));
    }

    #[test]
    fn delta_is_lineup_gain() {
        let roster = RosterConfig::standard();
        let rostered = vec![
            player("QB1", Position::Quarterback, 300.0),
            player("RB1", Position::RunningBack, 200.0),
        ];
        let mine: Vec<&Player> = rostered.iter().collect();
        let available = vec![
            valuation("QB2", Position::Quarterback, 310.0, 20.0),
            valuation("RB2", Position::RunningBack, 150.0, 10.0),
            valuation("QB3", Position::Quarterback, 250.0, 5.0),
        ];
        let recs = recommend(&available, &ctx(&roster, &mine), &ScoringWeights::default(), 120);

        let by_name = |n: &str| recs.iter().find(|r| r.name() == n).unwrap();
        assert!(approx_eq(by_name("QB2").delta, 10.0, 1e-9));
        assert!(approx_eq(by_name("RB2").delta, 150.0, 1e-9));
        assert_eq!(by_name("QB3").delta, 0.0);
        assert!(!by_name("QB3").would_start);
        for r in &recs {
            assert_eq!(r.would_start, r.delta > WOULD_START_THRESHOLD);
        }
    }

    #[test]
    fn players_outside_candidate_pool_get_no_delta() {
        let roster = RosterConfig::standard();
        let available = vec![
            valuation("Top", Position::WideReceiver, 250.0, 80.0),
            valuation("Mid", Position::WideReceiver, 200.0, 40.0),
            valuation("Low", Position::WideReceiver, 150.0, 10.0),
        ];
        let recs = recommend(&available, &ctx(&roster, &[]), &ScoringWeights::default(), 1);
        let low = recs.iter().find(|r| r.name() == "Low").unwrap();
        let mid = recs.iter().find(|r| r.name() == "Mid").unwrap();
        let top = recs.iter().find(|r| r.name() == "Top").unwrap();
        assert!(top.delta > 0.0);
        assert_eq!(mid.delta, 0.0);
        assert_eq!(low.delta, 0.0);
        assert!(!mid.would_start);
    }

    #[test]
    fn zero_candidate_pool_scores_without_delta() {
        let roster = RosterConfig::standard();
        let available = vec![valuation("RB", Position::RunningBack, 300.0, 50.0)];
        let recs = recommend(&available, &ctx(&roster, &[]), &ScoringWeights::default(), 0);
        assert_eq!(recs[0].delta, 0.0);
        // bench RB gets the depth boost
        assert!(approx_eq(recs[0].bench_weight, 1.15, 1e-12));
    }

    #[test]
    fn candidate_selection_is_stable() {
        let selected = select_candidates(&[1.0, 5.0, 5.0, 5.0, 0.0], 2);
        assert_eq!(selected, vec![false, true, true, false, false]);
    }

    #[test]
    fn progress_is_clamped() {
        let roster = RosterConfig::standard();
        assert_eq!(draft_progress(0, &roster, 14), 0.0);
        // 14 * 16 = 224 picks
        assert!(approx_eq(draft_progress(112, &roster, 14), 0.5, 1e-12));
        assert_eq!(draft_progress(1000, &roster, 14), 1.0);
        assert_eq!(draft_progress(3, &roster, 0), 1.0);
    }

    #[test]
    fn position_weight_ramps() {
        assert_eq!(position_weight(Position::Quarterback, 0.0), 0.8);
        assert_eq!(position_weight(Position::Quarterback, 0.39), 0.8);
        assert_eq!(position_weight(Position::Quarterback, 0.4), 0.9);
        assert_eq!(position_weight(Position::Quarterback, 0.7), 1.0);
        assert_eq!(position_weight(Position::Defense, 0.5), 0.3);
        assert_eq!(position_weight(Position::Defense, 0.8), 0.8);
        assert_eq!(position_weight(Position::Defense, 0.95), 1.0);
        assert_eq!(position_weight(Position::Kicker, 0.84), 0.2);
        assert_eq!(position_weight(Position::Kicker, 0.9), 0.6);
        assert_eq!(position_weight(Position::Kicker, 1.0), 1.0);
        assert_eq!(position_weight(Position::RunningBack, 0.0), 1.0);
        assert_eq!(position_weight(Position::TightEnd, 0.5), 1.0);
    }

    #[test]
    fn bench_weights() {
        assert_eq!(bench_weight(Position::Kicker, true, 0.15), 1.0);
        assert!(approx_eq(bench_weight(Position::WideReceiver, false, 0.15), 1.15, 1e-12));
        assert!(approx_eq(bench_weight(Position::TightEnd, false, 0.0), 1.0, 1e-12));
        assert_eq!(bench_weight(Position::Quarterback, false, 0.15), 0.85);
        assert_eq!(bench_weight(Position::Defense, false, 0.15), 0.7);
        assert_eq!(bench_weight(Position::Kicker, false, 0.15), 0.6);
    }

    #[test]
    fn sorted_by_score_descending() {
        let roster = RosterConfig::standard();
        let available = vec![
            valuation("K", Position::Kicker, 140.0, 30.0),
            valuation("RB", Position::RunningBack, 250.0, 60.0),
            valuation("WR", Position::WideReceiver, 230.0, 40.0),
        ];
        let recs = recommend(&available, &ctx(&roster, &[]), &ScoringWeights::default(), 120);
        for pair in recs.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        assert_eq!(recs[0].name(), "RB");
    }

    #[test]
    fn equal_rows_keep_input_order() {
        let roster = RosterConfig::new(BTreeMap::new(), 0);
        let available = vec![
            valuation("First", Position::Kicker, 100.0, 0.0),
            valuation("Second", Position::Kicker, 100.0, 0.0),
        ];
        let recs = recommend(&available, &ctx(&roster, &[]), &ScoringWeights::default(), 120);
        assert_eq!(recs[0].name(), "First");
        assert_eq!(recs[1].name(), "Second");
    }

    #[test]
    fn vor_flex_used_when_present() {
        let roster = RosterConfig::standard();
        let mut v = valuation("WR", Position::WideReceiver, 200.0, 10.0);
        v.vor_flex = Some(40.0);
        let weights = ScoringWeights {
            delta: 0.0,
            vor: 1.0,
            scarcity: 0.0,
            bench_depth_boost: 0.0,
        };
        let recs = recommend(&[v], &ctx(&roster, &[]), &weights, 120);
        assert!(approx_eq(recs[0].score_base, 40.0, 1e-9));
    }

    #[test]
    fn filter_positions_search_and_limit() {
        let roster = RosterConfig::standard();
        let mut available = vec![
            valuation("Alpha Runner", Position::RunningBack, 250.0, 60.0),
            valuation("Beta Catcher", Position::WideReceiver, 230.0, 40.0),
            valuation("Gamma Runner", Position::RunningBack, 200.0, 20.0),
        ];
        available[1].player.team = "KC".into();
        let recs = recommend(&available, &ctx(&roster, &[]), &ScoringWeights::default(), 120);

        let by_pos = RecommendationFilter {
            positions: vec![Position::RunningBack],
            ..Default::default()
        }
        .apply(recs.clone());
        assert_eq!(by_pos.len(), 2);
        assert!(by_pos.iter().all(|r| r.position() == Position::RunningBack));

        let by_team = RecommendationFilter {
            search: Some("kc".into()),
            ..Default::default()
        }
        .apply(recs.clone());
        assert_eq!(by_team.len(), 1);
        assert_eq!(by_team[0].name(), "Beta Catcher");

        let by_name = RecommendationFilter {
            search: Some("RUNNER".into()),
            limit: Some(1),
            ..Default::default()
        }
        .apply(recs.clone());
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].name(), recs.iter().find(|r| r.name().contains("Runner")).unwrap().name());

        let blank = RecommendationFilter {
            search: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(blank.apply(recs).len(), 3);
    }
}
