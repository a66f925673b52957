use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, str::FromStr};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeUnit {
    #[serde(rename = "ms")]
    Ms,
    #[serde(rename = "s")]
    S,
    #[serde(rename = "min")]
    Min,
    #[serde(rename = "h")]
    H,
    #[serde(rename = "d")]
    D,
}

impl TimeUnit {
    pub fn millis(self) -> f64 {
        match self {
            TimeUnit::Ms => 1.0,
            TimeUnit::S => 1_000.0,
            TimeUnit::Min => 60_000.0,
            TimeUnit::H => 3_600_000.0,
            TimeUnit::D => 86_400_000.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeUnit::Ms => "ms",
            TimeUnit::S => "s",
            TimeUnit::Min => "min",
            TimeUnit::H => "h",
            TimeUnit::D => "d",
        }
    }
}

impl FromStr for TimeUnit {
    type Err = ParseTimeDurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ms" => Ok(TimeUnit::Ms),
            "s" => Ok(TimeUnit::S),
            "min" | "m" => Ok(TimeUnit::Min),
            "h" => Ok(TimeUnit::H),
            "d" => Ok(TimeUnit::D),
            other => Err(ParseTimeDurationError::UnknownUnit(other.to_string())),
        }
    }
}

/// `[value, unit]` pair, serialized as a two element array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeDuration(pub f64, pub TimeUnit);

impl TimeDuration {
    pub fn new(value: f64, unit: TimeUnit) -> Self {
        Self(value, unit)
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn unit(&self) -> TimeUnit {
        self.1
    }

    pub fn to_ms(&self) -> f64 {
        self.0 * self.1.millis()
    }

    pub fn in_unit(&self, unit: TimeUnit) -> f64 {
        self.to_ms() / unit.millis()
    }
}

impl fmt::Display for TimeDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.0, self.1.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseTimeDurationError {
    #[error("empty duration")]
    Empty,
    #[error("invalid duration value: {0}")]
    InvalidValue(String),
    #[error("unknown time unit: {0}")]
    UnknownUnit(String),
}

impl FromStr for TimeDuration {
    type Err = ParseTimeDurationError;

    /// Accepts `5min`, `1h`, `30 s`, `1.5d`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseTimeDurationError::Empty);
        }
        let split = s
            .find(|c: char| c.is_ascii_alphabetic())
            .ok_or_else(|| ParseTimeDurationError::UnknownUnit(String::new()))?;
        let (num, unit) = s.split_at(split);
        let value: f64 = num
            .trim()
            .parse()
            .map_err(|_| ParseTimeDurationError::InvalidValue(num.trim().to_string()))?;
        Ok(Self(value, unit.trim().parse()?))
    }
}

/// Plain text or an i18n map (`{"fallback": "...", "zh-CN": "..."}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Text {
    Plain(String),
    I18n(BTreeMap<String, String>),
}

impl Text {
    pub fn fallback(&self) -> &str {
        match self {
            Text::Plain(s) => s,
            Text::I18n(map) => map
                .get("fallback")
                .or_else(|| map.values().next())
                .map(String::as_str)
                .unwrap_or(""),
        }
    }
}

fn text_or_empty(text: &Option<Text>) -> String {
    text.as_ref().map(|t| t.fallback().to_string()).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contest {
    #[serde(default)]
    pub title: Option<Text>,
    #[serde(default)]
    pub start_at: Option<String>,
    pub duration: TimeDuration,
    #[serde(default)]
    pub frozen_duration: Option<TimeDuration>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    #[serde(default)]
    pub title: Option<Text>,
    #[serde(default)]
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    #[serde(default)]
    pub title: Option<Text>,
    #[serde(default)]
    pub segments: Vec<Segment>,
    #[serde(default)]
    pub rule: Option<SeriesRule>,
}

impl Series {
    pub fn title(&self) -> String {
        text_or_empty(&self.title)
    }

    pub fn is_icpc(&self) -> bool {
        self.rule.as_ref().is_some_and(SeriesRule::is_icpc)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    #[serde(default)]
    pub title: Option<Text>,
    #[serde(default)]
    pub style: Option<SegmentStyle>,
}

impl Segment {
    pub fn title(&self) -> String {
        text_or_empty(&self.title)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SegmentStyle {
    Preset(String),
    Custom(Style),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    #[serde(default)]
    pub text_color: Option<ThemeColor>,
    #[serde(default)]
    pub background_color: Option<ThemeColor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ThemeColor {
    Plain(String),
    Themed {
        #[serde(default)]
        light: Option<String>,
        #[serde(default)]
        dark: Option<String>,
    },
}

impl ThemeColor {
    pub fn light(&self) -> Option<&str> {
        match self {
            ThemeColor::Plain(c) => Some(c),
            ThemeColor::Themed { light, .. } => light.as_deref(),
        }
    }
}

/// Options stay raw until a rule kind asks for them, so unknown presets never
/// fail deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesRule {
    pub preset: String,
    #[serde(default)]
    pub options: serde_json::Value,
}

impl SeriesRule {
    pub fn is_icpc(&self) -> bool {
        self.preset == "ICPC"
    }

    /// `None` for non-ICPC rules. Malformed options degrade to an empty
    /// option set.
    pub fn icpc_options(&self) -> Option<IcpcOptions> {
        if !self.is_icpc() {
            return None;
        }
        if self.options.is_null() {
            return Some(IcpcOptions::default());
        }
        Some(serde_json::from_value(self.options.clone()).unwrap_or_default())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IcpcOptions {
    #[serde(default)]
    pub ratio: Option<RatioOption>,
    #[serde(default)]
    pub count: Option<CountOption>,
    #[serde(default)]
    pub filter: Option<SeriesFilter>,
}

impl IcpcOptions {
    pub fn has_tiers(&self) -> bool {
        self.ratio.as_ref().is_some_and(|r| r.value.iter().any(|v| *v > 0.0))
            || self.count.as_ref().is_some_and(|c| c.value.iter().any(|v| *v > 0))
    }

    /// Counts of a non-tied count rule, whose tiers never move.
    pub fn fixed_counts(&self) -> Option<&[u32]> {
        if !self.has_tiers() {
            return None;
        }
        self.count
            .as_ref()
            .filter(|c| c.no_tied)
            .map(|c| c.value.as_slice())
    }

    pub fn by_marker(&self) -> Option<&str> {
        self.filter.as_ref().and_then(|f| f.by_marker.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatioOption {
    pub value: Vec<f64>,
    #[serde(default)]
    pub rounding: Rounding,
    #[serde(default)]
    pub denominator: Denominator,
    #[serde(default)]
    pub no_tied: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rounding {
    #[default]
    Ceil,
    Floor,
    Round,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Denominator {
    #[default]
    All,
    Submitted,
    Scored,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountOption {
    pub value: Vec<u32>,
    #[serde(default)]
    pub no_tied: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesFilter {
    #[serde(default)]
    pub by_marker: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub user: User,
    #[serde(default)]
    pub score: Score,
    #[serde(default)]
    pub statuses: Vec<Status>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub name: Option<Text>,
    #[serde(default)]
    pub official: Option<bool>,
    #[serde(default)]
    pub marker: Option<String>,
    #[serde(default)]
    pub markers: Vec<String>,
}

impl User {
    pub fn is_official(&self) -> bool {
        self.official != Some(false)
    }

    pub fn has_marker(&self, id: &str) -> bool {
        self.marker.as_deref() == Some(id) || self.markers.iter().any(|m| m == id)
    }

    pub fn marker_ids(&self) -> Vec<&str> {
        self.marker
            .iter()
            .chain(self.markers.iter())
            .map(String::as_str)
            .collect()
    }

    pub fn name(&self) -> String {
        text_or_empty(&self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Score {
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub time: Option<TimeDuration>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub result: Option<SolutionResult>,
    #[serde(default)]
    pub time: Option<TimeDuration>,
    #[serde(default)]
    pub tries: u32,
    #[serde(default)]
    pub solutions: Option<Vec<Solution>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub result: SolutionResult,
    pub time: TimeDuration,
}

/// Judge verdict. Anything outside `FB`/`AC`/`RJ`/`?` is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SolutionResult {
    FirstBlood,
    Accepted,
    Rejected,
    Pending,
    Other(String),
}

impl SolutionResult {
    pub fn as_str(&self) -> &str {
        match self {
            SolutionResult::FirstBlood => "FB",
            SolutionResult::Accepted => "AC",
            SolutionResult::Rejected => "RJ",
            SolutionResult::Pending => "?",
            SolutionResult::Other(s) => s,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, SolutionResult::FirstBlood | SolutionResult::Accepted)
    }
}

impl From<String> for SolutionResult {
    fn from(s: String) -> Self {
        match s.as_str() {
            "FB" => SolutionResult::FirstBlood,
            "AC" => SolutionResult::Accepted,
            "RJ" => SolutionResult::Rejected,
            "?" => SolutionResult::Pending,
            _ => SolutionResult::Other(s),
        }
    }
}

impl From<SolutionResult> for String {
    fn from(r: SolutionResult) -> Self {
        r.as_str().to_string()
    }
}

impl fmt::Display for SolutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id: String,
    #[serde(default)]
    pub label: Option<Text>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sorter {
    pub algorithm: String,
    #[serde(default)]
    pub config: SorterConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SorterConfig {
    #[serde(default)]
    pub penalty: Option<TimeDuration>,
    #[serde(default)]
    pub no_penalty_results: Option<Vec<Option<SolutionResult>>>,
    #[serde(default)]
    pub time_precision: Option<TimeUnit>,
    #[serde(default)]
    pub ranking_time_precision: Option<TimeUnit>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranklist {
    #[serde(default)]
    pub version: Option<String>,
    pub contest: Contest,
    #[serde(default)]
    pub problems: Vec<Problem>,
    #[serde(default)]
    pub series: Vec<Series>,
    #[serde(default)]
    pub rows: Vec<Row>,
    #[serde(default)]
    pub markers: Vec<Marker>,
    #[serde(default)]
    pub sorter: Option<Sorter>,
}

impl Ranklist {
    /// `(index in self.series, series, options)` for every ICPC series.
    pub fn icpc_series(&self) -> impl Iterator<Item = (usize, &Series, IcpcOptions)> + '_ {
        self.series.iter().enumerate().filter_map(|(idx, s)| {
            let options = s.rule.as_ref()?.icpc_options()?;
            Some((idx, s, options))
        })
    }

    pub fn problem_alias(&self, index: usize) -> String {
        self.problems
            .get(index)
            .and_then(|p| p.alias.clone())
            .unwrap_or_else(|| number_to_alphabet(index))
    }

    pub fn sorter_config(&self) -> SorterConfig {
        self.sorter.as_ref().map(|s| s.config.clone()).unwrap_or_default()
    }
}

/// 0 -> `A`, 25 -> `Z`, 26 -> `AA`.
pub fn number_to_alphabet(mut n: usize) -> String {
    let mut out = Vec::new();
    loop {
        out.push(b'A' + (n % 26) as u8);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// One submission outcome: `(userId, problemIndex, result, time)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionTetrad {
    pub user_id: String,
    pub problem_index: usize,
    pub result: SolutionResult,
    pub time: TimeDuration,
}

impl SolutionTetrad {
    pub fn new(user_id: impl Into<String>, problem_index: usize, result: SolutionResult, time: TimeDuration) -> Self {
        Self {
            user_id: user_id.into(),
            problem_index,
            result,
            time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankTimePoint {
    pub time: f64,
    pub rank: u32,
    pub solved: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolvedEventPoint {
    pub time: f64,
    pub rank: u32,
    pub problem_alias: String,
    pub solved_time: TimeDuration,
    #[serde(rename = "fb")]
    pub first_solve: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentBandPoint {
    pub time: f64,
    pub start: u32,
    pub end: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentBand {
    pub title: String,
    pub resolved_color: String,
    pub points: Vec<SegmentBandPoint>,
}

/// Rank-time data of one ICPC series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewRankTimeData {
    pub series_index: usize,
    pub title: String,
    pub user_rank_time_points: BTreeMap<String, Vec<RankTimePoint>>,
    pub user_solved_event_points: BTreeMap<String, Vec<SolvedEventPoint>>,
    pub segments: Vec<SegmentBand>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankTimeDataSet {
    pub unit: TimeUnit,
    pub time_points: Vec<f64>,
    /// One entry per ICPC series, in series order.
    pub views: Vec<ViewRankTimeData>,
    pub total_users: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRankTimeData {
    pub user_id: String,
    pub view: usize,
    pub unit: TimeUnit,
    pub points: Vec<RankTimePoint>,
    pub solved_event_points: Vec<SolvedEventPoint>,
    pub segments: Vec<SegmentBand>,
    pub total_users: usize,
}

impl RankTimeDataSet {
    /// Returns `None` when the view does not exist or the user was never
    /// ranked in it.
    pub fn user_data(&self, user_id: &str, view: usize) -> Option<UserRankTimeData> {
        let data = self.views.get(view)?;
        let points = data.user_rank_time_points.get(user_id)?;
        if points.is_empty() {
            return None;
        }
        Some(UserRankTimeData {
            user_id: user_id.to_string(),
            view,
            unit: self.unit,
            points: points.clone(),
            solved_event_points: data
                .user_solved_event_points
                .get(user_id)
                .cloned()
                .unwrap_or_default(),
            segments: data.segments.clone(),
            total_users: self.total_users,
        })
    }
}
