use std::collections::HashSet;

use srk_schema::{Ranklist, SolutionResult, SolutionTetrad, Status, TimeDuration};

use crate::RankTimeError;

/// Flattens every row's solve history into one log sorted by time.
///
/// Equal times keep row/problem/solution order, and that order decides which
/// accepted solution of a problem becomes its first solve (`FB`).
pub fn collect_sorted_solutions(ranklist: &Ranklist) -> Result<Vec<SolutionTetrad>, RankTimeError> {
    let mut out = Vec::new();

    for row in &ranklist.rows {
        if !ranklist.problems.is_empty() && row.statuses.len() > ranklist.problems.len() {
            return Err(RankTimeError::new(
                "E1001",
                format!(
                    "row has {} statuses but the ranklist has {} problems",
                    row.statuses.len(),
                    ranklist.problems.len()
                ),
            )
            .with_user(row.user.id.clone()));
        }

        for (problem_index, status) in row.statuses.iter().enumerate() {
            for (result, time) in status_solutions(status) {
                let accepted = result.is_accepted();
                out.push(SolutionTetrad::new(row.user.id.clone(), problem_index, result, time));
                if accepted {
                    break;
                }
            }
        }
    }

    out.sort_by(|a, b| a.time.to_ms().total_cmp(&b.time.to_ms()));

    let mut solved_problems = HashSet::new();
    for solution in &mut out {
        if solution.result.is_accepted() {
            solution.result = if solved_problems.insert(solution.problem_index) {
                SolutionResult::FirstBlood
            } else {
                SolutionResult::Accepted
            };
        }
    }

    Ok(out)
}

/// Explicit solutions when present, otherwise a reconstruction from the
/// status summary that yields the same standings.
fn status_solutions(status: &Status) -> Vec<(SolutionResult, TimeDuration)> {
    if let Some(solutions) = &status.solutions {
        return solutions.iter().map(|s| (s.result.clone(), s.time)).collect();
    }

    let (Some(result), Some(time)) = (&status.result, status.time) else {
        return Vec::new();
    };
    if result.is_accepted() {
        let mut out = vec![(SolutionResult::Rejected, time); status.tries.saturating_sub(1) as usize];
        out.push((result.clone(), time));
        out
    } else {
        vec![(result.clone(), time); status.tries as usize]
    }
}
