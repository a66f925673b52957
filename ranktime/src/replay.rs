use std::{ops::Range, sync::Arc};

use log::debug;
use srk_schema::{Ranklist, SolutionResult, SolutionTetrad, TimeDuration};

use crate::buckets::BucketPoint;
use crate::standings::{RankedRow, RankingAdapter};

/// Ranked rows of one view at one bucket. Buckets without new solutions share
/// the previous bucket's allocation.
pub type Snapshot = Arc<[RankedRow]>;

/// Forward-only position in the sorted solution log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayCursor {
    next: usize,
}

impl ReplayCursor {
    pub fn position(&self) -> usize {
        self.next
    }

    /// Consumes every solution at or before `limit_ms` that has not been
    /// consumed yet and returns its index range in `solutions`.
    pub fn advance(&mut self, solutions: &[SolutionTetrad], limit_ms: f64) -> Range<usize> {
        let start = self.next;
        while self.next < solutions.len() && solutions[self.next].time.to_ms() <= limit_ms {
            self.next += 1;
        }
        start..self.next
    }
}

#[derive(Debug, Clone)]
pub struct BucketSnapshot {
    pub time: f64,
    pub rows: Snapshot,
    /// `false` when `rows` is the previous bucket's snapshot.
    pub fresh: bool,
}

/// An accepted solution whose rank is resolved later against the series.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSolvedEvent {
    pub user_id: String,
    pub bucket: usize,
    pub time: f64,
    pub problem_alias: String,
    pub solved_time: TimeDuration,
    pub first_solve: bool,
}

#[derive(Debug, Clone)]
pub struct Replay {
    pub buckets: Vec<BucketSnapshot>,
    pub events: Vec<PendingSolvedEvent>,
}

pub struct ReplayEngine<'a, A: RankingAdapter> {
    adapter: &'a A,
    state: A::State,
    cursor: ReplayCursor,
    last: Option<Snapshot>,
}

impl<'a, A: RankingAdapter> ReplayEngine<'a, A> {
    pub fn new(adapter: &'a A) -> Self {
        Self {
            adapter,
            state: adapter.initial_state(),
            cursor: ReplayCursor::default(),
            last: None,
        }
    }

    pub fn cursor(&self) -> ReplayCursor {
        self.cursor
    }

    /// Replays one bucket. `solutions` must be sorted by time and buckets must
    /// be stepped in increasing order.
    pub fn step(&mut self, solutions: &[SolutionTetrad], bucket: &BucketPoint) -> (BucketSnapshot, Range<usize>) {
        let consumed = self.cursor.advance(solutions, bucket.limit_ms);
        let reusable = consumed.is_empty().then(|| self.last.clone()).flatten();
        let snapshot = match reusable {
            Some(rows) => BucketSnapshot {
                time: bucket.time,
                rows,
                fresh: false,
            },
            None => {
                let rows: Snapshot = self
                    .adapter
                    .apply_increment(&mut self.state, &solutions[consumed.clone()])
                    .into();
                self.last = Some(Arc::clone(&rows));
                BucketSnapshot {
                    time: bucket.time,
                    rows,
                    fresh: true,
                }
            }
        };
        (snapshot, consumed)
    }

    pub fn run(mut self, ranklist: &Ranklist, solutions: &[SolutionTetrad], buckets: &[BucketPoint]) -> Replay {
        let mut snapshots = Vec::with_capacity(buckets.len());
        let mut events = Vec::new();
        let mut ranked = 0;

        for (idx, bucket) in buckets.iter().enumerate() {
            let (snapshot, consumed) = self.step(solutions, bucket);
            if snapshot.fresh {
                ranked += 1;
            }
            for solution in &solutions[consumed] {
                if !solution.result.is_accepted() {
                    continue;
                }
                events.push(PendingSolvedEvent {
                    user_id: solution.user_id.clone(),
                    bucket: idx,
                    time: bucket.time,
                    problem_alias: ranklist.problem_alias(solution.problem_index),
                    solved_time: solution.time,
                    first_solve: solution.result == SolutionResult::FirstBlood,
                });
            }
            snapshots.push(snapshot);
        }

        debug!(
            "replayed {} solutions over {} buckets ({} ranked)",
            self.cursor.position(),
            buckets.len(),
            ranked
        );

        Replay {
            buckets: snapshots,
            events,
        }
    }
}
