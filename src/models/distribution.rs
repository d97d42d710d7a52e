use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, DiscreteCDF, Normal, Poisson};

/// Above this expected total, Poisson is swapped for its Normal limit.
pub const POISSON_NORMAL_THRESHOLD: f64 = 7.0;

/// Per-side CV clamp used when building the combined sigma.
const CV_FLOOR: f64 = 0.1;
const CV_CEIL: f64 = 1.5;

/// Smallest sigma handed to the Normal model.
pub const SIGMA_FLOOR: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistributionKind {
    Poisson,
    Normal,
}

/// Pick the distribution for a statistic given its expected total.
/// Normal is never demoted to Poisson.
#[inline]
pub fn select(preferred: DistributionKind, lambda: f64) -> DistributionKind {
    match preferred {
        DistributionKind::Poisson if lambda > POISSON_NORMAL_THRESHOLD => DistributionKind::Normal,
        other => other,
    }
}

/// Standard deviation of home + away treated as independent variables:
///
/// sigma = sqrt((cv_h * mu_h)^2 + (cv_a * mu_a)^2), floored at 0.5
///
/// Each cv is clamped to [0.1, 1.5] first.
pub fn combined_sigma(mean_home: f64, cv_home: f64, mean_away: f64, cv_away: f64) -> f64 {
    let side_var = |mean: f64, cv: f64| {
        let cv = if cv.is_finite() { cv.clamp(CV_FLOOR, CV_CEIL) } else { CV_CEIL };
        let mean = if mean.is_finite() { mean.max(0.0) } else { 0.0 };
        (cv * mean).powi(2)
    };

    let sigma = (side_var(mean_home, cv_home) + side_var(mean_away, cv_away)).sqrt();
    sigma.max(SIGMA_FLOOR)
}

/// Tail model for an over/under market on one statistic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TailModel {
    Poisson { lambda: f64 },
    Normal { mean: f64, sigma: f64 },
}

impl TailModel {
    pub fn new(kind: DistributionKind, lambda: f64, sigma: f64) -> Self {
        match kind {
            DistributionKind::Poisson => Self::Poisson { lambda },
            DistributionKind::Normal => Self::Normal { mean: lambda, sigma },
        }
    }

    #[inline]
    pub fn kind(&self) -> DistributionKind {
        match self {
            Self::Poisson { .. } => DistributionKind::Poisson,
            Self::Normal { .. } => DistributionKind::Normal,
        }
    }

    #[inline]
    pub fn sigma(&self) -> Option<f64> {
        match self {
            Self::Poisson { .. } => None,
            Self::Normal { sigma, .. } => Some(*sigma),
        }
    }

    /// Same model shape, shifted to a different expected value.
    #[inline]
    pub fn with_mean(&self, mean: f64) -> Self {
        match *self {
            Self::Poisson { .. } => Self::Poisson { lambda: mean },
            Self::Normal { sigma, .. } => Self::Normal { mean, sigma },
        }
    }

    /// P(X > line). Degenerate parameters return 0.5 (no information).
    /// Always in [0, 1], never NaN.
    pub fn over_probability(&self, line: f64) -> f64 {
        if !line.is_finite() {
            return 0.5;
        }

        let p = match *self {
            Self::Poisson { lambda } => {
                if !(lambda > 0.0 && lambda.is_finite()) {
                    return 0.5;
                }
                if line < 0.0 {
                    return 1.0;
                }
                // Line 2.5 -> P(X >= 3) = 1 - P(X <= 2)
                let n = line.floor() as u64;
                match Poisson::new(lambda) {
                    Ok(dist) => 1.0 - dist.cdf(n),
                    Err(_) => return 0.5,
                }
            }
            Self::Normal { mean, sigma } => {
                if !(mean > 0.0 && mean.is_finite() && sigma > 0.0 && sigma.is_finite()) {
                    return 0.5;
                }
                match Normal::new(mean, sigma) {
                    Ok(dist) => 1.0 - dist.cdf(line),
                    Err(_) => return 0.5,
                }
            }
        };

        if p.is_finite() { p.clamp(0.0, 1.0) } else { 0.5 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poisson_goals_line() {
        let m = TailModel::Poisson { lambda: 2.5 };
        let over = m.over_probability(2.5);
        assert!((over - 0.4562).abs() < 1e-3, "over={over}");
        assert!((1.0 - over - 0.5438).abs() < 1e-3);
    }

    #[test]
    fn test_poisson_uses_floor() {
        let m = TailModel::Poisson { lambda: 1.2 };
        assert_eq!(m.over_probability(1.5), m.over_probability(1.9));
        assert!(m.over_probability(-0.5) == 1.0);
    }

    #[test]
    fn test_normal_symmetric_at_mean() {
        let m = TailModel::Normal { mean: 24.0, sigma: 4.0 };
        assert!((m.over_probability(24.0) - 0.5).abs() < 1e-9);
        assert!(m.over_probability(20.5) > 0.5);
        assert!(m.over_probability(28.5) < 0.5);
    }

    #[test]
    fn test_degenerate_inputs_return_half() {
        assert_eq!(TailModel::Poisson { lambda: 0.0 }.over_probability(2.5), 0.5);
        assert_eq!(TailModel::Poisson { lambda: -1.0 }.over_probability(2.5), 0.5);
        assert_eq!(TailModel::Poisson { lambda: f64::NAN }.over_probability(2.5), 0.5);
        assert_eq!(TailModel::Normal { mean: 10.0, sigma: 0.0 }.over_probability(9.5), 0.5);
        assert_eq!(TailModel::Normal { mean: 0.0, sigma: 2.0 }.over_probability(9.5), 0.5);
    }

    #[test]
    fn test_selection_switches_only_poisson() {
        assert_eq!(select(DistributionKind::Poisson, 2.7), DistributionKind::Poisson);
        assert_eq!(select(DistributionKind::Poisson, 7.0), DistributionKind::Poisson);
        assert_eq!(select(DistributionKind::Poisson, 24.0), DistributionKind::Normal);
        assert_eq!(select(DistributionKind::Normal, 1.0), DistributionKind::Normal);
    }

    #[test]
    fn test_combined_sigma_is_independent_sum() {
        // sqrt((0.3*12)^2 + (0.4*10)^2) = sqrt(12.96 + 16) = 5.381...
        let s = combined_sigma(12.0, 0.3, 10.0, 0.4);
        assert!((s - 5.3814).abs() < 1e-3, "s={s}");
        // Pooled shortcut would give 0.35 * 22 = 7.7
        assert!(s < 0.35 * 22.0);
    }

    #[test]
    fn test_combined_sigma_clamps_and_floors() {
        assert_eq!(combined_sigma(0.0, 0.0, 0.0, 0.0), SIGMA_FLOOR);
        // cv 5.0 clamps to 1.5
        assert!((combined_sigma(10.0, 5.0, 0.0, 0.3) - 15.0).abs() < 1e-9);
        // cv 0.0 clamps to 0.1
        assert!((combined_sigma(10.0, 0.0, 0.0, 0.3) - 1.0).abs() < 1e-9);
    }
}
