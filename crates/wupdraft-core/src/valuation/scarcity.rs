// Positional drop-off: how much a player is worth over the next few options
// at the same position.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::draft::pick::Position;
use crate::valuation::vor::PlayerValuation;

/// How many following players the drop-off is averaged over.
const LOOKAHEAD: usize = 3;

/// Scarcity for every player in `pool`, aligned with the input.
///
/// Within each position (sorted by projection, stable), scarcity is the
/// player's projection minus the average of the next up-to-three players,
/// floored at 0. The last player at a position has scarcity 0.
pub fn compute_scarcity(pool: &[PlayerValuation]) -> Vec<f64> {
    let mut groups: BTreeMap<Position, Vec<usize>> = BTreeMap::new();
    for (idx, v) in pool.iter().enumerate() {
        groups.entry(v.position()).or_default().push(idx);
    }

    let mut scarcity = vec![0.0; pool.len()];
    for indices in groups.values_mut() {
        indices.sort_by(|&a, &b| {
            pool[b]
                .projection()
                .partial_cmp(&pool[a].projection())
                .unwrap_or(Ordering::Equal)
        });

        for (rank, &idx) in indices.iter().enumerate() {
            let own = pool[idx].projection();
            let next = &indices[rank + 1..(rank + 1 + LOOKAHEAD).min(indices.len())];
            let avg_next = if next.is_empty() {
                own
            } else {
                next.iter().map(|&i| pool[i].projection()).sum::<f64>() / next.len() as f64
            };
            scarcity[idx] = (own - avg_next).max(0.0);
        }
    }
    scarcity
}
