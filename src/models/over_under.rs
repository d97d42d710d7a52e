use crate::models::distribution::{self, DistributionKind, TailModel};
use crate::models::prediction::MatchPredictions;
use crate::models::stability::{confidence, confidence_label};
use crate::models::ConfidenceLabel;
use crate::stats::{PerStat, StatKey, TeamStatistics};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Lines whose favoured side reaches this probability carry no betting value.
pub const PROBABILITY_CUTOFF: f64 = 0.98;

pub const MAX_LINES: usize = 4;

/// Safety cap on candidates per base line.
const ATTEMPTS_PER_BASE_LINE: usize = 6;

/// z for a central 90% interval.
const INTERVAL_Z: f64 = 1.644_853_626_951_472_2;
const INTERVAL_LEVEL: f64 = 0.9;

/// Expected totals are floored here, so every statistic is modelled with a positive rate.
pub const LAMBDA_FLOOR: f64 = 0.1;

/// Lower interval end is floored here so the shifted tail stays defined.
const INTERVAL_LAMBDA_FLOOR: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverUnderLine {
    pub line: f64,
    pub over: f64,
    pub under: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uncertainty: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionInterval {
    pub low: f64,
    pub high: f64,
    pub level: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverUnderStat {
    pub label: String,
    pub lambda: f64,
    pub lambda_home: f64,
    pub lambda_away: f64,
    /// `None` iff the distribution is Poisson.
    pub sigma: Option<f64>,
    pub distribution: DistributionKind,
    pub lines: SmallVec<[OverUnderLine; MAX_LINES]>,
    pub confidence: f64,
    pub confidence_label: ConfidenceLabel,
    pub interval: PredictionInterval,
}

pub type MatchOverUnder = PerStat<OverUnderStat>;

/// Over/under markets for every statistic of a fixture.
/// Pure: identical inputs give bit-identical output.
pub fn compute_over_under(
    predictions: &MatchPredictions,
    home: &TeamStatistics,
    away: &TeamStatistics,
    sample_size: u32,
) -> MatchOverUnder {
    PerStat::from_fn(|key| {
        let p = predictions.get(key);
        over_under_stat(
            key,
            StatInputs {
                lambda_total: p.total.value,
                lambda_home: p.home.value,
                lambda_away: p.away.value,
                cv_home: home.made(key).confidence_cv(),
                cv_away: away.made(key).confidence_cv(),
                sample_size,
            },
        )
    })
}

#[derive(Debug, Clone, Copy)]
pub struct StatInputs {
    pub lambda_total: f64,
    pub lambda_home: f64,
    pub lambda_away: f64,
    /// CV of each side's *made* metric.
    pub cv_home: f64,
    pub cv_away: f64,
    pub sample_size: u32,
}

pub fn over_under_stat(key: StatKey, inputs: StatInputs) -> OverUnderStat {
    let profile = key.profile();
    let lambda = if inputs.lambda_total.is_finite() {
        inputs.lambda_total.max(LAMBDA_FLOOR)
    } else {
        LAMBDA_FLOOR
    };

    let kind = distribution::select(profile.preferred, lambda);
    let sigma = match kind {
        DistributionKind::Normal => distribution::combined_sigma(
            inputs.lambda_home,
            inputs.cv_home,
            inputs.lambda_away,
            inputs.cv_away,
        ),
        DistributionKind::Poisson => 0.0,
    };
    let model = TailModel::new(kind, lambda, sigma);

    let cv_mean = finite_or((inputs.cv_home + inputs.cv_away) / 2.0, 1.0);
    let interval = prediction_interval(lambda, cv_mean, inputs.sample_size);
    let lines = generate_lines(&model, &profile.base_lines, &interval);

    let c = confidence(cv_mean, inputs.sample_size);

    OverUnderStat {
        label: key.label().to_string(),
        lambda,
        lambda_home: inputs.lambda_home,
        lambda_away: inputs.lambda_away,
        sigma: model.sigma(),
        distribution: model.kind(),
        lines,
        confidence: c,
        confidence_label: confidence_label(c),
        interval,
    }
}

/// se = cv * lambda / sqrt(n); interval = lambda -/+ z * se (lower end >= 0).
fn prediction_interval(lambda: f64, cv: f64, sample_size: u32) -> PredictionInterval {
    let n = f64::from(sample_size.max(1));
    let se = if lambda > 0.0 { cv.max(0.0) * lambda / n.sqrt() } else { 0.0 };
    PredictionInterval {
        low: (lambda - INTERVAL_Z * se).max(0.0),
        high: lambda + INTERVAL_Z * se,
        level: INTERVAL_LEVEL,
    }
}

/// Walk candidate lines upward from the base pattern, skipping near-certain
/// ones, until `MAX_LINES` are collected or the attempt cap is hit.
///
/// candidate(i) = base[i % len] + (i / len) * len * increment
///
/// If nothing qualifies, the middle base line is emitted anyway so the
/// statistic always has at least one line.
pub fn generate_lines(
    model: &TailModel,
    base_lines: &[f64],
    interval: &PredictionInterval,
) -> SmallVec<[OverUnderLine; MAX_LINES]> {
    let mut lines = SmallVec::new();
    if base_lines.is_empty() {
        return lines;
    }

    let len = base_lines.len();
    let increment = if len > 1 { base_lines[1] - base_lines[0] } else { 1.0 };
    let max_attempts = len * ATTEMPTS_PER_BASE_LINE;

    let mut attempt = 0;
    while lines.len() < MAX_LINES && attempt < max_attempts {
        let cycle = (attempt / len) as f64;
        let line = base_lines[attempt % len] + cycle * len as f64 * increment;
        attempt += 1;

        let over = model.over_probability(line);
        let under = 1.0 - over;
        if over >= PROBABILITY_CUTOFF || under >= PROBABILITY_CUTOFF {
            continue;
        }

        lines.push(OverUnderLine {
            line,
            over,
            under,
            uncertainty: Some(line_uncertainty(model, line, interval)),
        });
    }

    if lines.is_empty() {
        let line = base_lines[len / 2];
        let over = model.over_probability(line);
        lines.push(OverUnderLine {
            line,
            over,
            under: 1.0 - over,
            uncertainty: Some(1.0),
        });
    }

    lines
}

/// Spread of P(over) across the prediction interval.
fn line_uncertainty(model: &TailModel, line: f64, interval: &PredictionInterval) -> f64 {
    let low = model.with_mean(interval.low.max(INTERVAL_LAMBDA_FLOOR));
    let high = model.with_mean(interval.high.max(INTERVAL_LAMBDA_FLOOR));
    let spread = (high.over_probability(line) - low.over_probability(line)).abs();
    finite_or(spread, 1.0).clamp(0.0, 1.0)
}

#[inline]
fn finite_or(v: f64, fallback: f64) -> f64 {
    if v.is_finite() { v } else { fallback }
}
