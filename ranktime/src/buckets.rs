use srk_schema::{TimeDuration, TimeUnit};

/// One replay instant. `time` is expressed in the bucket unit; every solution
/// at or before `limit_ms` belongs to this bucket or an earlier one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BucketPoint {
    pub time: f64,
    pub limit_ms: f64,
}

pub fn choose_bucket_unit(duration: &TimeDuration) -> TimeDuration {
    let hours = duration.in_unit(TimeUnit::H);
    if hours <= 5.0 {
        TimeDuration(1.0, TimeUnit::Min)
    } else if hours <= 24.0 {
        TimeDuration(5.0, TimeUnit::Min)
    } else if hours <= 24.0 * 7.0 {
        TimeDuration(1.0, TimeUnit::H)
    } else {
        TimeDuration(1.0, TimeUnit::D)
    }
}

/// Number of points `enumerate_buckets` yields: `ceil(D/U) + 1`, saturating
/// at `usize::MAX` for step ratios too large to count.
/// `unit` must have a positive, finite value.
pub fn bucket_count(duration: &TimeDuration, unit: &TimeDuration) -> usize {
    let end = duration.in_unit(unit.unit());
    if !(end > 0.0) {
        return 1;
    }
    let steps = (end / unit.value()).ceil();
    if !steps.is_finite() || steps >= usize::MAX as f64 {
        return usize::MAX;
    }
    (steps as usize).saturating_add(1)
}

/// `[0, U, 2U, ..., D]`; the last step is clamped to the exact duration.
/// `unit` must have a positive, finite value.
pub fn enumerate_buckets(duration: &TimeDuration, unit: &TimeDuration) -> Vec<BucketPoint> {
    let target = unit.unit();
    let end = duration.in_unit(target);
    let step = unit.value();

    let mut points = vec![bucket_point(0.0, target)];
    let mut k: u64 = 0;
    let mut ts = 0.0;
    while ts < end {
        k += 1;
        ts = f64::min(k as f64 * step, end);
        points.push(bucket_point(ts, target));
    }
    points
}

fn bucket_point(time: f64, unit: TimeUnit) -> BucketPoint {
    BucketPoint {
        time,
        limit_ms: time * unit.millis(),
    }
}
