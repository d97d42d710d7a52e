use crate::models::stability;
use serde::{Deserialize, Serialize};

// ── Statistic keys ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKey {
    Goals,
    Corners,
    Shots,
    ShotsOnTarget,
    YellowCards,
    Fouls,
}

impl StatKey {
    pub const ALL: [StatKey; 6] = [
        StatKey::Goals,
        StatKey::Corners,
        StatKey::Shots,
        StatKey::ShotsOnTarget,
        StatKey::YellowCards,
        StatKey::Fouls,
    ];

    #[inline]
    pub fn label(self) -> &'static str {
        match self {
            Self::Goals => "Goals",
            Self::Corners => "Corners",
            Self::Shots => "Shots",
            Self::ShotsOnTarget => "Shots on Target",
            Self::YellowCards => "Cards",
            Self::Fouls => "Fouls",
        }
    }
}

impl std::fmt::Display for StatKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Goals => write!(f, "goals"),
            Self::Corners => write!(f, "corners"),
            Self::Shots => write!(f, "shots"),
            Self::ShotsOnTarget => write!(f, "shots_on_target"),
            Self::YellowCards => write!(f, "yellow_cards"),
            Self::Fouls => write!(f, "fouls"),
        }
    }
}

/// One value per statistic. Every engine bundle (predictions, over/under)
/// is a `PerStat`, so iteration order is always `StatKey::ALL`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerStat<T> {
    pub goals: T,
    pub corners: T,
    pub shots: T,
    pub shots_on_target: T,
    pub yellow_cards: T,
    pub fouls: T,
}

impl<T> PerStat<T> {
    pub fn from_fn(mut f: impl FnMut(StatKey) -> T) -> Self {
        Self {
            goals: f(StatKey::Goals),
            corners: f(StatKey::Corners),
            shots: f(StatKey::Shots),
            shots_on_target: f(StatKey::ShotsOnTarget),
            yellow_cards: f(StatKey::YellowCards),
            fouls: f(StatKey::Fouls),
        }
    }

    #[inline]
    pub fn get(&self, key: StatKey) -> &T {
        match key {
            StatKey::Goals => &self.goals,
            StatKey::Corners => &self.corners,
            StatKey::Shots => &self.shots,
            StatKey::ShotsOnTarget => &self.shots_on_target,
            StatKey::YellowCards => &self.yellow_cards,
            StatKey::Fouls => &self.fouls,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (StatKey, &T)> + '_ {
        StatKey::ALL.iter().map(move |&k| (k, self.get(k)))
    }
}

// ── Per-team metrics ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CvClass {
    VeryStable,
    Stable,
    Moderate,
    Unstable,
    VeryUnstable,
    #[serde(rename = "na")]
    NotAvailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StabilityTier {
    High,
    Medium,
    Low,
}

/// Wire shape of a metric: either the backend's aggregate or the raw
/// per-match values. Classification and stability are always derived locally.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MetricWire {
    Summary { mean: f64, cv: f64 },
    Samples { samples: Vec<f64> },
}

impl From<MetricWire> for MetricStat {
    fn from(w: MetricWire) -> Self {
        match w {
            MetricWire::Summary { mean, cv } => MetricStat::new(mean, cv),
            MetricWire::Samples { samples } => MetricStat::from_samples(&samples),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "MetricWire")]
pub struct MetricStat {
    pub mean: f64,
    pub cv: f64,
    pub classification: CvClass,
    pub stability_pct: u8,
    pub stability_tier: StabilityTier,
}

impl MetricStat {
    /// Negative means and CVs are pulled to 0. A non-finite mean becomes 0 and a
    /// non-finite CV becomes 1 (the least stable reading).
    pub fn new(mean: f64, cv: f64) -> Self {
        let mean = if mean.is_finite() { mean.max(0.0) } else { 0.0 };
        let cv = if cv.is_finite() { cv.max(0.0) } else { 1.0 };
        let stability_pct = stability::stability_pct(cv);
        Self {
            mean,
            cv,
            classification: stability::classify(cv),
            stability_pct,
            stability_tier: stability::stability_tier(stability_pct),
        }
    }

    /// CV fed into confidence. A metric with no data counts as maximally unstable.
    #[inline]
    pub fn confidence_cv(&self) -> f64 {
        if self.classification == CvClass::NotAvailable { 1.0 } else { self.cv }
    }

    pub fn unavailable() -> Self {
        Self {
            mean: 0.0,
            cv: 0.0,
            classification: CvClass::NotAvailable,
            stability_pct: 0,
            stability_tier: StabilityTier::Low,
        }
    }

    /// Builds a metric from raw per-match values (e.g. goals in each of the last 10 games).
    pub fn from_samples(values: &[f64]) -> Self {
        let clean: Vec<f64> = values
            .iter()
            .copied()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .collect();
        if clean.len() < 2 {
            return Self::unavailable();
        }

        let n = clean.len() as f64;
        let mean = clean.iter().sum::<f64>() / n;
        let var = clean.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (n - 1.0);
        let cv = if mean > 0.0 { var.sqrt() / mean } else { 0.0 };

        Self::new(round2(mean), round2(cv))
    }
}

#[inline]
fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DualMetric {
    pub made: MetricStat,
    pub conceded: MetricStat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamStatistics {
    pub corners: DualMetric,
    pub goals: DualMetric,
    pub shots: DualMetric,
    pub shots_on_target: DualMetric,
    pub yellow_cards: MetricStat,
    pub fouls: MetricStat,
}

/// Borrowed view of one statistic, split or single-valued.
#[derive(Debug, Clone, Copy)]
pub enum StatMetric<'a> {
    Dual(&'a DualMetric),
    Single(&'a MetricStat),
}

impl TeamStatistics {
    pub fn metric(&self, key: StatKey) -> StatMetric<'_> {
        match key {
            StatKey::Goals => StatMetric::Dual(&self.goals),
            StatKey::Corners => StatMetric::Dual(&self.corners),
            StatKey::Shots => StatMetric::Dual(&self.shots),
            StatKey::ShotsOnTarget => StatMetric::Dual(&self.shots_on_target),
            StatKey::YellowCards => StatMetric::Single(&self.yellow_cards),
            StatKey::Fouls => StatMetric::Single(&self.fouls),
        }
    }

    /// The attacking side of a statistic; single-valued stats are their own "made".
    #[inline]
    pub fn made(&self, key: StatKey) -> &MetricStat {
        match self.metric(key) {
            StatMetric::Dual(d) => &d.made,
            StatMetric::Single(m) => m,
        }
    }
}

// ── Query filters ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    All,
    Last5,
    Last10,
}

impl Period {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Last5 => "last5",
            Self::Last10 => "last10",
        }
    }
}

impl std::str::FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "last5" => Ok(Self::Last5),
            "last10" => Ok(Self::Last10),
            other => Err(format!("unknown period '{other}' (expected all|last5|last10)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HalfFilter {
    #[default]
    Full,
    FirstHalf,
    SecondHalf,
}

impl HalfFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::FirstHalf => "first_half",
            Self::SecondHalf => "second_half",
        }
    }
}

/// Restricts a team's sample to its home games or its away games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SideFilter {
    Home,
    Away,
}

impl SideFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Away => "away",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StatsQuery {
    #[serde(default)]
    pub period: Period,
    #[serde(default)]
    pub half: HalfFilter,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_side: Option<SideFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub away_side: Option<SideFilter>,
}
