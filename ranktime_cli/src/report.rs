use std::collections::HashMap;

use ranktime::ViewStandings;
use srk_schema::{RankTimeDataSet, Ranklist, SegmentBand, TimeDuration};

pub fn print_timeline(data: &RankTimeDataSet, user_id: &str, view: usize) {
    let Some(user) = data.user_data(user_id, view) else {
        println!("{user_id} is never ranked in view {view}.");
        return;
    };

    println!(
        "Timeline of {} ({} users, view {})",
        user.user_id, user.total_users, user.view
    );
    println!(
        "{:>9} | {:>5} | {:>6} | {:<12} | Events",
        format!("Time({})", user.unit.as_str()),
        "Rank",
        "Solved",
        "Band"
    );
    println!("----------|-------|--------|--------------|------------------");

    // Only rows where something changes.
    let mut prev = None;
    for point in &user.points {
        let events: Vec<String> = user
            .solved_event_points
            .iter()
            .filter(|e| e.time == point.time)
            .map(|e| {
                if e.first_solve {
                    format!("{} (FB)", e.problem_alias)
                } else {
                    e.problem_alias.clone()
                }
            })
            .collect();
        if prev == Some((point.rank, point.solved)) && events.is_empty() {
            continue;
        }
        prev = Some((point.rank, point.solved));

        let band = band_at(&user.segments, point.time, point.rank).unwrap_or("-");
        println!(
            "{:>9} | {:>5} | {:>6} | {:<12} | {}",
            point.time,
            point.rank,
            point.solved,
            band,
            events.join(", ")
        );
    }
}

fn band_at(segments: &[SegmentBand], time: f64, rank: u32) -> Option<&str> {
    segments
        .iter()
        .find(|s| {
            s.points
                .iter()
                .any(|p| p.time == time && p.start <= rank && rank <= p.end)
        })
        .map(|s| s.title.as_str())
}

pub fn print_standings(ranklist: &Ranklist, views: &[ViewStandings], at: &TimeDuration) {
    let names: HashMap<&str, String> = ranklist
        .rows
        .iter()
        .map(|r| (r.user.id.as_str(), r.user.name()))
        .collect();

    if views.is_empty() {
        println!("No ICPC series.");
        return;
    }

    println!("Standings at {at}");
    for view in views {
        let segments = &ranklist.series[view.series_index].segments;
        println!();
        println!("[{}] {}", view.series_index, view.title);
        println!("{:>5} | {:>6} | {:<12} | User", "Rank", "Solved", "Tier");
        println!("------|--------|--------------|------------------");
        for row in &view.rows {
            let Some(rank) = row.rank else {
                continue;
            };
            let tier = row
                .tier_index
                .and_then(|t| segments.get(t))
                .map(|s| s.title())
                .unwrap_or_else(|| "-".to_string());
            let name = names
                .get(row.user_id.as_str())
                .filter(|n| !n.is_empty())
                .map_or(row.user_id.as_str(), String::as_str);
            println!("{:>5} | {:>6} | {:<12} | {}", rank, row.score, tier, name);
        }
    }
}
