use log::warn;
use srk_schema::{IcpcOptions, Ranklist};

use crate::bands::{fixed_ranges, resolve_segment_color, BandMode, Tier};

/// An ICPC series the engine replays.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingView {
    pub series_index: usize,
    pub title: String,
    pub options: IcpcOptions,
    pub tiers: Vec<Tier>,
    pub mode: BandMode,
}

impl RankingView {
    /// Every ICPC series of the ranklist, in series order. Other rule kinds
    /// are skipped.
    pub fn collect(ranklist: &Ranklist) -> Vec<RankingView> {
        ranklist
            .icpc_series()
            .map(|(series_index, series, options)| {
                if !options.has_tiers() {
                    if !series.segments.is_empty() {
                        warn!(
                            "series {} declares {} segments without positive ratio or count; no bands",
                            series_index,
                            series.segments.len()
                        );
                    }
                    return RankingView {
                        series_index,
                        title: series.title(),
                        options,
                        tiers: Vec::new(),
                        mode: BandMode::Dynamic,
                    };
                }

                let tiers = series
                    .segments
                    .iter()
                    .map(|s| Tier {
                        title: s.title(),
                        color: resolve_segment_color(s.style.as_ref()),
                    })
                    .collect();
                let mode = match options.fixed_counts() {
                    Some(counts) => BandMode::Fixed(fixed_ranges(counts)),
                    None => BandMode::Dynamic,
                };
                RankingView {
                    series_index,
                    title: series.title(),
                    options,
                    tiers,
                    mode,
                }
            })
            .collect()
    }

    pub fn by_marker(&self) -> Option<&str> {
        self.options.by_marker()
    }
}

/// Picks the view whose curve a user should see, as an index into `views`.
///
/// A fixed marker selects the view filtered by it, and only when the user
/// carries that marker. Otherwise the first view filtered by one of the
/// user's markers wins, falling back to the first unfiltered view.
pub fn find_user_matched_view(views: &[RankingView], user_markers: &[&str], fixed_marker: Option<&str>) -> Option<usize> {
    if views.is_empty() {
        return None;
    }
    if let Some(fixed) = fixed_marker {
        if !user_markers.contains(&fixed) {
            return None;
        }
        return views.iter().position(|v| v.by_marker() == Some(fixed));
    }
    views
        .iter()
        .position(|v| v.by_marker().is_some_and(|m| user_markers.contains(&m)))
        .or_else(|| views.iter().position(|v| v.by_marker().is_none()))
}
