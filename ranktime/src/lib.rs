use std::{
    collections::{BTreeSet, HashSet},
    time::Instant,
};

use log::{debug, warn};
use srk_schema::{RankTimeDataSet, Ranklist, SolutionTetrad, TimeDuration, ViewRankTimeData};

mod bands;
mod buckets;
mod error;
mod replay;
mod series;
mod solutions;
mod standings;
mod view;

pub use bands::{fixed_ranges, observe_bands, resolve_segment_color, track_bands, BandMode, RankRange, Tier};
pub use buckets::{bucket_count, choose_bucket_unit, enumerate_buckets, BucketPoint};
pub use error::{RankTimeError, RankTimeErrorKind};
pub use replay::{BucketSnapshot, PendingSolvedEvent, Replay, ReplayCursor, ReplayEngine, Snapshot};
pub use series::{extract, ExtractedSeries};
pub use solutions::collect_sorted_solutions;
pub use standings::{IcpcRanking, RankedRow, RankingAdapter, Scoring, StandingsState, UserStanding};
pub use view::{find_user_matched_view, RankingView};

/// Upper bound on buckets per replay; a `1ms` unit over a week-long contest
/// is almost certainly a caller mistake.
pub const MAX_BUCKETS: usize = 200_000;

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Bucket unit; chosen from the contest duration when `None`.
    pub unit: Option<TimeDuration>,
}

pub fn build_rank_time_data(
    ranklist: &Ranklist,
    solutions: &[SolutionTetrad],
    unit: &TimeDuration,
) -> Result<RankTimeDataSet, RankTimeError> {
    validate_ranklist(ranklist)?;
    validate_solutions(ranklist, solutions)?;
    validate_unit(&ranklist.contest.duration, unit)?;

    let started = Instant::now();
    let buckets = enumerate_buckets(&ranklist.contest.duration, unit);
    let views = RankingView::collect(ranklist);
    debug!(
        "rank time data: {} buckets of {}, {} views, {} solutions",
        buckets.len(),
        unit,
        views.len(),
        solutions.len()
    );

    let mut out = Vec::with_capacity(views.len());
    for view in &views {
        let adapter = IcpcRanking::new(ranklist, &view.options);
        let replay = ReplayEngine::new(&adapter).run(ranklist, solutions, &buckets);
        let segments = track_bands(&replay.buckets, &view.tiers, &view.mode);
        let series = extract(&replay.buckets, &replay.events);
        out.push(ViewRankTimeData {
            series_index: view.series_index,
            title: view.title.clone(),
            user_rank_time_points: series.user_rank_time_points,
            user_solved_event_points: series.user_solved_event_points,
            segments,
        });
    }
    debug!("rank time data built in {:?}", started.elapsed());

    Ok(RankTimeDataSet {
        unit: unit.unit(),
        time_points: buckets.iter().map(|b| b.time).collect(),
        views: out,
        total_users: ranklist.rows.len(),
    })
}

pub fn build_rank_time_data_with_options(
    ranklist: &Ranklist,
    solutions: &[SolutionTetrad],
    options: &BuildOptions,
) -> Result<RankTimeDataSet, RankTimeError> {
    let unit = options
        .unit
        .unwrap_or_else(|| choose_bucket_unit(&ranklist.contest.duration));
    build_rank_time_data(ranklist, solutions, &unit)
}

/// Derives the solution log from the rows, then builds.
pub fn build_rank_time_data_from_rows(
    ranklist: &Ranklist,
    options: &BuildOptions,
) -> Result<RankTimeDataSet, RankTimeError> {
    let solutions = collect_sorted_solutions(ranklist)?;
    build_rank_time_data_with_options(ranklist, &solutions, options)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewStandings {
    pub series_index: usize,
    pub title: String,
    pub rows: Vec<RankedRow>,
}

/// Standings of every ICPC series as they stood at `time`.
pub fn standings_at(
    ranklist: &Ranklist,
    solutions: &[SolutionTetrad],
    time: &TimeDuration,
) -> Result<Vec<ViewStandings>, RankTimeError> {
    validate_ranklist(ranklist)?;
    validate_solutions(ranklist, solutions)?;

    let limit_ms = time.to_ms();
    let end = solutions.partition_point(|s| s.time.to_ms() <= limit_ms);
    let batch = &solutions[..end];

    Ok(RankingView::collect(ranklist)
        .into_iter()
        .map(|view| {
            let adapter = IcpcRanking::new(ranklist, &view.options);
            let mut state = adapter.initial_state();
            ViewStandings {
                series_index: view.series_index,
                title: view.title,
                rows: adapter.apply_increment(&mut state, batch),
            }
        })
        .collect())
}

fn validate_ranklist(ranklist: &Ranklist) -> Result<(), RankTimeError> {
    let mut seen = HashSet::with_capacity(ranklist.rows.len());
    for row in &ranklist.rows {
        if !seen.insert(row.user.id.as_str()) {
            return Err(RankTimeError::new("E1002", "duplicate user id in rows").with_user(row.user.id.clone()));
        }
    }
    Ok(())
}

fn validate_solutions(ranklist: &Ranklist, solutions: &[SolutionTetrad]) -> Result<(), RankTimeError> {
    for user_id in unknown_users(ranklist, solutions) {
        warn!("solutions of unknown user {user_id} are ignored");
    }
    for solution in solutions {
        if !ranklist.problems.is_empty() && solution.problem_index >= ranklist.problems.len() {
            return Err(RankTimeError::new(
                "E3001",
                format!(
                    "problem index {} out of range ({} problems)",
                    solution.problem_index,
                    ranklist.problems.len()
                ),
            )
            .with_user(solution.user_id.clone())
            .with_problem(solution.problem_index));
        }
        let ms = solution.time.to_ms();
        if !ms.is_finite() || ms < 0.0 {
            return Err(RankTimeError::new("E3002", "solution time must be finite and >= 0")
                .with_user(solution.user_id.clone())
                .with_problem(solution.problem_index)
                .with_context(solution.time.to_string()));
        }
    }
    Ok(())
}

/// Distinct user ids of the log that no row carries.
fn unknown_users<'a>(ranklist: &Ranklist, solutions: &'a [SolutionTetrad]) -> BTreeSet<&'a str> {
    let known: HashSet<&str> = ranklist.rows.iter().map(|r| r.user.id.as_str()).collect();
    solutions
        .iter()
        .map(|s| s.user_id.as_str())
        .filter(|id| !known.contains(id))
        .collect()
}

fn validate_unit(duration: &TimeDuration, unit: &TimeDuration) -> Result<(), RankTimeError> {
    if !(unit.value() > 0.0) || !unit.value().is_finite() {
        return Err(RankTimeError::new("E2001", "bucket unit must be > 0").with_context(unit.to_string()));
    }
    if !duration.value().is_finite() || duration.value() < 0.0 {
        return Err(
            RankTimeError::new("E2002", "contest duration must be finite and >= 0").with_context(duration.to_string())
        );
    }
    let count = bucket_count(duration, unit);
    if count > MAX_BUCKETS {
        return Err(RankTimeError::new(
            "E2003",
            format!("{count} buckets exceed the limit of {MAX_BUCKETS}"),
        )
        .with_context(format!("duration={duration} unit={unit}")));
    }
    Ok(())
}
