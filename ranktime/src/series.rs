use std::collections::{BTreeMap, HashMap};

use srk_schema::{RankTimePoint, SolvedEventPoint};

use crate::replay::{BucketSnapshot, PendingSolvedEvent};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedSeries {
    pub user_rank_time_points: BTreeMap<String, Vec<RankTimePoint>>,
    pub user_solved_event_points: BTreeMap<String, Vec<SolvedEventPoint>>,
}

/// Per-user sparse rank series plus solve events joined with the rank held
/// at their bucket. Events of users unranked at that bucket are dropped.
pub fn extract(buckets: &[BucketSnapshot], events: &[PendingSolvedEvent]) -> ExtractedSeries {
    let mut user_rank_time_points: BTreeMap<String, Vec<RankTimePoint>> = BTreeMap::new();
    let mut rank_at: HashMap<(&str, usize), u32> = HashMap::new();

    for (idx, bucket) in buckets.iter().enumerate() {
        for row in bucket.rows.iter() {
            let Some(rank) = row.rank else {
                continue;
            };
            user_rank_time_points
                .entry(row.user_id.clone())
                .or_default()
                .push(RankTimePoint {
                    time: bucket.time,
                    rank,
                    solved: row.score,
                });
            rank_at.insert((row.user_id.as_str(), idx), rank);
        }
    }

    let mut user_solved_event_points: BTreeMap<String, Vec<SolvedEventPoint>> = BTreeMap::new();
    for event in events {
        let Some(&rank) = rank_at.get(&(event.user_id.as_str(), event.bucket)) else {
            continue;
        };
        user_solved_event_points
            .entry(event.user_id.clone())
            .or_default()
            .push(SolvedEventPoint {
                time: event.time,
                rank,
                problem_alias: event.problem_alias.clone(),
                solved_time: event.solved_time,
                first_solve: event.first_solve,
            });
    }

    ExtractedSeries {
        user_rank_time_points,
        user_solved_event_points,
    }
}
