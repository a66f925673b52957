use std::collections::HashMap;

use log::debug;
use srk_schema::{
    Denominator, IcpcOptions, Ranklist, RatioOption, Rounding, SolutionResult, SolutionTetrad, SorterConfig,
    TimeDuration, TimeUnit,
};

/// One row of a ranked snapshot for a single ranking view.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedRow {
    pub user_id: String,
    /// `None` when the view does not rank this user (unofficial, filtered
    /// out by marker, or no submission yet).
    pub rank: Option<u32>,
    pub score: u32,
    pub tier_index: Option<usize>,
}

/// Incremental ranking of one view: folds a batch of new solutions into the
/// accumulated state and returns every row, ranked, in standings order.
pub trait RankingAdapter {
    type State;

    fn initial_state(&self) -> Self::State;

    fn apply_increment(&self, state: &mut Self::State, batch: &[SolutionTetrad]) -> Vec<RankedRow>;
}

const DEFAULT_PENALTY: TimeDuration = TimeDuration(20.0, TimeUnit::Min);

#[derive(Debug, Clone)]
pub struct Scoring {
    penalty_ms: f64,
    no_penalty_results: Vec<Option<SolutionResult>>,
    time_precision: Option<TimeUnit>,
    ranking_time_precision: Option<TimeUnit>,
}

impl Scoring {
    pub fn from_config(config: &SorterConfig) -> Self {
        let no_penalty_results = config.no_penalty_results.clone().unwrap_or_else(|| {
            vec![
                Some(SolutionResult::FirstBlood),
                Some(SolutionResult::Accepted),
                Some(SolutionResult::Pending),
                Some(SolutionResult::Other("NOUT".to_string())),
                Some(SolutionResult::Other("CE".to_string())),
                Some(SolutionResult::Other("UKE".to_string())),
                None,
            ]
        });
        Self {
            penalty_ms: config.penalty.unwrap_or(DEFAULT_PENALTY).to_ms(),
            no_penalty_results,
            time_precision: config.time_precision,
            ranking_time_precision: config.ranking_time_precision,
        }
    }

    fn is_penalized(&self, result: &SolutionResult) -> bool {
        !self.no_penalty_results.iter().any(|r| r.as_ref() == Some(result))
    }

    fn accept_time(&self, time: &TimeDuration) -> f64 {
        floor_to(time.to_ms(), self.time_precision)
    }

    fn ranking_time(&self, penalty_ms: f64) -> f64 {
        floor_to(penalty_ms, self.ranking_time_precision)
    }
}

fn floor_to(ms: f64, precision: Option<TimeUnit>) -> f64 {
    match precision {
        Some(unit) => (ms / unit.millis()).floor() * unit.millis(),
        None => ms,
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct ProblemProgress {
    accepted: bool,
    tries: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserStanding {
    problems: HashMap<usize, ProblemProgress>,
    pub solved: u32,
    pub penalty_ms: f64,
    pub submitted: bool,
}

/// Accumulated solve history, indexed like the ranklist rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StandingsState {
    pub users: Vec<UserStanding>,
}

#[derive(Debug, Clone, Default)]
struct TierRule {
    counts: Vec<u32>,
    ratio: Option<RatioOption>,
    no_tied: bool,
}

impl TierRule {
    fn from_options(options: &IcpcOptions) -> Self {
        if !options.has_tiers() {
            return Self::default();
        }
        let counts = options.count.as_ref().map(|c| c.value.clone()).unwrap_or_default();
        let no_tied = options.count.as_ref().is_some_and(|c| c.no_tied)
            || options.ratio.as_ref().is_some_and(|r| r.no_tied);
        Self {
            counts,
            ratio: options.ratio.clone(),
            no_tied,
        }
    }

    /// Cumulative last rank (or position, when non-tied) of every tier.
    fn boundaries(&self, all: usize, submitted: usize, scored: usize) -> Vec<u32> {
        let mut by_count = Vec::with_capacity(self.counts.len());
        let mut acc: u32 = 0;
        for v in &self.counts {
            acc = acc.saturating_add(*v);
            by_count.push(acc);
        }

        let mut by_ratio = Vec::new();
        if let Some(ratio) = &self.ratio {
            let total: usize = match ratio.denominator {
                Denominator::All => all,
                Denominator::Submitted => submitted,
                Denominator::Scored => scored,
            };
            let total = total as f64;
            let mut acc = 0.0;
            for v in &ratio.value {
                acc += v;
                let x = total * acc;
                let rounded = match ratio.rounding {
                    Rounding::Ceil => (x - 1e-9).ceil(),
                    Rounding::Floor => (x + 1e-9).floor(),
                    Rounding::Round => x.round(),
                };
                by_ratio.push(rounded.max(0.0) as u32);
            }
        }

        let len = by_count.len().max(by_ratio.len());
        (0..len)
            .map(|i| {
                let c = by_count.get(i).copied().unwrap_or(0);
                let r = by_ratio.get(i).copied().unwrap_or(0);
                c.max(r)
            })
            .collect()
    }
}

/// ICPC standings for one series: solved desc, penalty time asc, ties share
/// the competition rank.
#[derive(Debug, Clone)]
pub struct IcpcRanking {
    user_ids: Vec<String>,
    eligible: Vec<bool>,
    index: HashMap<String, usize>,
    tiers: TierRule,
    scoring: Scoring,
}

impl IcpcRanking {
    pub fn new(ranklist: &Ranklist, options: &IcpcOptions) -> Self {
        let marker = options.by_marker();
        let mut user_ids = Vec::with_capacity(ranklist.rows.len());
        let mut eligible = Vec::with_capacity(ranklist.rows.len());
        let mut index = HashMap::with_capacity(ranklist.rows.len());
        for (idx, row) in ranklist.rows.iter().enumerate() {
            user_ids.push(row.user.id.clone());
            eligible.push(row.user.is_official() && marker.map_or(true, |m| row.user.has_marker(m)));
            index.entry(row.user.id.clone()).or_insert(idx);
        }
        Self {
            user_ids,
            eligible,
            index,
            tiers: TierRule::from_options(options),
            scoring: Scoring::from_config(&ranklist.sorter_config()),
        }
    }

    fn fold(&self, state: &mut StandingsState, batch: &[SolutionTetrad]) {
        for solution in batch {
            let Some(&idx) = self.index.get(&solution.user_id) else {
                debug!("solution of unknown user {} ignored", solution.user_id);
                continue;
            };
            let user = &mut state.users[idx];
            user.submitted = true;
            let progress = user.problems.entry(solution.problem_index).or_default();
            if progress.accepted {
                continue;
            }
            if solution.result.is_accepted() {
                progress.accepted = true;
                user.solved += 1;
                user.penalty_ms +=
                    self.scoring.accept_time(&solution.time) + progress.tries as f64 * self.scoring.penalty_ms;
            } else if self.scoring.is_penalized(&solution.result) {
                progress.tries += 1;
            }
        }
    }

    fn rank(&self, state: &StandingsState) -> Vec<RankedRow> {
        let key = |i: usize| {
            let u = &state.users[i];
            (u.solved, self.scoring.ranking_time(u.penalty_ms))
        };

        let mut order: Vec<usize> = (0..self.user_ids.len()).collect();
        order.sort_by(|&a, &b| {
            let (sa, ta) = key(a);
            let (sb, tb) = key(b);
            sb.cmp(&sa).then(ta.total_cmp(&tb))
        });

        let mut all = 0;
        let mut submitted = 0;
        let mut scored = 0;
        for (idx, user) in state.users.iter().enumerate() {
            if !self.eligible[idx] {
                continue;
            }
            all += 1;
            if user.submitted {
                submitted += 1;
            }
            if user.solved > 0 {
                scored += 1;
            }
        }
        let boundaries = self.tiers.boundaries(all, submitted, scored);

        let mut rows = Vec::with_capacity(order.len());
        let mut position: u32 = 0;
        let mut prev: Option<(u32, f64, u32)> = None;
        for idx in order {
            let user = &state.users[idx];
            let mut rank = None;
            let mut tier_index = None;
            if self.eligible[idx] && user.submitted {
                position += 1;
                let (solved, time) = key(idx);
                let r = match prev {
                    Some((ps, pt, pr)) if ps == solved && pt == time => pr,
                    _ => position,
                };
                prev = Some((solved, time, r));
                rank = Some(r);
                if solved > 0 {
                    let k = if self.tiers.no_tied { position } else { r };
                    tier_index = boundaries.iter().position(|&b| k <= b);
                }
            }
            rows.push(RankedRow {
                user_id: self.user_ids[idx].clone(),
                rank,
                score: user.solved,
                tier_index,
            });
        }
        rows
    }
}

impl RankingAdapter for IcpcRanking {
    type State = StandingsState;

    fn initial_state(&self) -> StandingsState {
        StandingsState {
            users: vec![UserStanding::default(); self.user_ids.len()],
        }
    }

    fn apply_increment(&self, state: &mut StandingsState, batch: &[SolutionTetrad]) -> Vec<RankedRow> {
        self.fold(state, batch);
        self.rank(state)
    }
}
