pub mod distribution;
pub mod over_under;
pub mod prediction;
pub mod stability;

use crate::stats::StatKey;
use distribution::DistributionKind;

/// Static per-statistic modelling parameters.
#[derive(Debug, Clone, Copy)]
pub struct StatProfile {
    /// Starting lines for over/under generation; always 4 evenly spaced `.5` values.
    pub base_lines: [f64; 4],
    pub preferred: DistributionKind,
    /// Multiplier on the home side's expected value when samples are not side-conditioned.
    pub home_factor: f64,
    pub away_factor: f64,
}

const GOALS: StatProfile = StatProfile {
    base_lines: [0.5, 1.5, 2.5, 3.5],
    preferred: DistributionKind::Poisson,
    home_factor: 1.08,
    away_factor: 0.92,
};

const CORNERS: StatProfile = StatProfile {
    base_lines: [7.5, 8.5, 9.5, 10.5],
    preferred: DistributionKind::Poisson,
    home_factor: 1.05,
    away_factor: 0.97,
};

const SHOTS: StatProfile = StatProfile {
    base_lines: [18.5, 20.5, 22.5, 24.5],
    preferred: DistributionKind::Normal,
    home_factor: 1.06,
    away_factor: 0.95,
};

const SHOTS_ON_TARGET: StatProfile = StatProfile {
    base_lines: [5.5, 6.5, 7.5, 8.5],
    preferred: DistributionKind::Poisson,
    home_factor: 1.06,
    away_factor: 0.95,
};

// Away sides pick up more cards and commit more fouls.
const YELLOW_CARDS: StatProfile = StatProfile {
    base_lines: [2.5, 3.5, 4.5, 5.5],
    preferred: DistributionKind::Poisson,
    home_factor: 0.95,
    away_factor: 1.08,
};

const FOULS: StatProfile = StatProfile {
    base_lines: [20.5, 22.5, 24.5, 26.5],
    preferred: DistributionKind::Normal,
    home_factor: 0.96,
    away_factor: 1.05,
};

impl StatKey {
    #[inline]
    pub fn profile(self) -> &'static StatProfile {
        match self {
            Self::Goals => &GOALS,
            Self::Corners => &CORNERS,
            Self::Shots => &SHOTS,
            Self::ShotsOnTarget => &SHOTS_ON_TARGET,
            Self::YellowCards => &YELLOW_CARDS,
            Self::Fouls => &FOULS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ConfidenceLabel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for ConfidenceLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}
