use srk_schema::{SegmentBand, SegmentBandPoint, SegmentStyle};

use crate::replay::BucketSnapshot;
use crate::standings::RankedRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankRange {
    pub start: u32,
    pub end: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tier {
    pub title: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BandMode {
    /// Non-tied counts: the same ranges at every bucket.
    Fixed(Vec<RankRange>),
    /// Ranges observed from each snapshot's tier assignment.
    Dynamic,
}

pub fn resolve_segment_color(style: Option<&SegmentStyle>) -> String {
    let color = match style {
        Some(SegmentStyle::Preset(preset)) => match preset.as_str() {
            "gold" => "#f8bf29",
            "silver" => "#c0c0c0",
            "bronze" => "#d69872",
            "iron" => "#a94442",
            _ => "transparent",
        },
        Some(SegmentStyle::Custom(style)) => style
            .background_color
            .as_ref()
            .and_then(|c| c.light())
            .unwrap_or("transparent"),
        None => "transparent",
    };
    color.to_string()
}

/// Tier `k` occupies `[sum(counts[..k]) + 1, sum(counts[..=k])]`.
pub fn fixed_ranges(counts: &[u32]) -> Vec<RankRange> {
    // Never below 1.
    let mut start: u32 = 1;
    counts
        .iter()
        .map(|&v| {
            let range = RankRange {
                start,
                end: (start - 1).saturating_add(v),
            };
            start = start.saturating_add(v);
            range
        })
        .collect()
}

/// Contiguous rank ranges of tiers `0..n` in one snapshot, stopping at the
/// first tier nobody occupies. Gaps between neighbours go to the upper tier.
pub fn observe_bands(rows: &[RankedRow], tier_count: usize) -> Vec<RankRange> {
    let mut ranges: Vec<Option<RankRange>> = vec![None; tier_count];
    let mut current: Option<usize> = None;

    for row in rows {
        let Some(rank) = row.rank else {
            continue;
        };
        let Some(tier) = row.tier_index.filter(|t| *t < tier_count) else {
            break;
        };
        match current {
            Some(c) if tier == c => {
                if let Some(r) = ranges[c].as_mut() {
                    r.end = rank;
                }
            }
            Some(c) if tier < c => {}
            _ => {
                ranges[tier] = Some(RankRange { start: rank, end: rank });
                current = Some(tier);
            }
        }
    }

    let mut bands = Vec::with_capacity(tier_count);
    for (j, slot) in ranges.iter().enumerate() {
        let Some(mut range) = *slot else {
            break;
        };
        if let Some(Some(next)) = ranges.get(j + 1) {
            if next.start > range.end + 1 {
                range.end = next.start - 1;
            }
        }
        bands.push(range);
    }
    bands
}

pub fn track_bands(buckets: &[BucketSnapshot], tiers: &[Tier], mode: &BandMode) -> Vec<SegmentBand> {
    let mut bands: Vec<SegmentBand> = tiers
        .iter()
        .map(|t| SegmentBand {
            title: t.title.clone(),
            resolved_color: t.color.clone(),
            points: Vec::with_capacity(buckets.len()),
        })
        .collect();

    let mut last: Vec<RankRange> = Vec::new();
    for bucket in buckets {
        let ranges: &[RankRange] = match mode {
            BandMode::Fixed(fixed) => fixed,
            BandMode::Dynamic => {
                if bucket.fresh {
                    last = observe_bands(&bucket.rows, tiers.len());
                }
                &last
            }
        };
        for (band, range) in bands.iter_mut().zip(ranges) {
            band.points.push(SegmentBandPoint {
                time: bucket.time,
                start: range.start,
                end: range.end,
            });
        }
    }
    bands
}
