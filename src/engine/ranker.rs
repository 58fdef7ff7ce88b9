use itertools::Itertools;
use tracing::{debug, instrument};

use crate::engine::reconcile::Reconciled;
use crate::engine::types::{Standing, Team};

/// Standard competition ranking ("1224") over values already in sorted order.
pub fn competition_ranks(sorted_totals: &[u32]) -> Vec<u32> {
    let mut ranks = Vec::with_capacity(sorted_totals.len());
    let groups = sorted_totals.iter().chunk_by(|total| **total);
    for (_, group) in &groups {
        let rank = ranks.len() as u32 + 1;
        ranks.extend(group.map(|_| rank));
    }
    ranks
}

// Stable sort keeps roster order among equal totals
fn ranks_by(totals: &[u32]) -> (Vec<usize>, Vec<u32>) {
    let order: Vec<usize> = (0..totals.len()).sorted_by_key(|&i| totals[i]).collect();
    let sorted: Vec<u32> = order.iter().map(|&i| totals[i]).collect();
    (order, competition_ranks(&sorted))
}

/// Order teams by reconciled total, lowest first.
///
/// `previous_rank` ranks the same teams on recorded points only, so `rank_change` shows how
/// the live period is moving each team (positive = up).
#[instrument(skip_all, fields(teams = scored.len()))]
pub fn rank_standings(scored: Vec<(Team, Reconciled)>) -> Vec<Standing> {
    let base: Vec<u32> = scored.iter().map(|(team, _)| team.total_points).collect();
    let live: Vec<u32> = scored.iter().map(|(_, r)| r.total_points).collect();

    let mut previous_rank = vec![0u32; scored.len()];
    let (base_order, base_ranks) = ranks_by(&base);
    for (&idx, &rank) in base_order.iter().zip(&base_ranks) {
        previous_rank[idx] = rank;
    }

    let (order, ranks) = ranks_by(&live);
    let mut slots: Vec<Option<(Team, Reconciled)>> = scored.into_iter().map(Some).collect();

    let standings: Vec<Standing> = order
        .into_iter()
        .zip(ranks)
        .filter_map(|(idx, rank)| {
            let (team, rec) = slots[idx].take()?;
            Some(Standing {
                rank,
                current_pick: rec.current_pick,
                live_data: rec.live_data,
                total_points: rec.total_points,
                pending: rec.pending,
                base_points: team.total_points,
                previous_rank: previous_rank[idx],
                rank_change: previous_rank[idx] as i32 - rank as i32,
                // The ranked team reports the reconciled total, never the recorded-only sum
                team: Team { total_points: rec.total_points, ..team },
            })
        })
        .collect();

    debug!(leader = standings.first().map(|s| s.team.name.as_str()), "Ranked standings");
    standings
}
