use crate::models::ConfidenceLabel;
use crate::stats::{CvClass, StabilityTier};

/// CV bucket upper bounds (exclusive): very stable, stable, moderate, unstable.
const CV_THRESHOLDS: [f64; 4] = [0.15, 0.30, 0.50, 0.75];

pub const CONFIDENCE_MIN: f64 = 0.30;
pub const CONFIDENCE_MAX: f64 = 0.95;

/// Bucket a coefficient of variation. Monotonic in `cv`.
#[inline]
pub fn classify(cv: f64) -> CvClass {
    if !cv.is_finite() {
        return CvClass::NotAvailable;
    }
    if cv < CV_THRESHOLDS[0] {
        CvClass::VeryStable
    } else if cv < CV_THRESHOLDS[1] {
        CvClass::Stable
    } else if cv < CV_THRESHOLDS[2] {
        CvClass::Moderate
    } else if cv < CV_THRESHOLDS[3] {
        CvClass::Unstable
    } else {
        CvClass::VeryUnstable
    }
}

/// 0..=100, decreasing in `cv`; cv ≥ 1 maps to 0.
#[inline]
pub fn stability_pct(cv: f64) -> u8 {
    let cv = if cv.is_finite() { cv.clamp(0.0, 1.0) } else { 1.0 };
    (100.0 * (1.0 - cv)).round() as u8
}

#[inline]
pub fn stability_tier(pct: u8) -> StabilityTier {
    if pct >= 70 {
        StabilityTier::High
    } else if pct >= 50 {
        StabilityTier::Medium
    } else {
        StabilityTier::Low
    }
}

/// Trust in an estimate built from a sample with the given CV.
///
/// confidence = clamp((1 - cv) * f(n), 0.30, 0.95)
///
/// where f(n) = 0.8 for n < 5, 1.1 for 5 <= n < 15, 1.15 for n >= 15.
/// Always finite.
#[inline]
pub fn confidence(cv: f64, sample_size: u32) -> f64 {
    let cv = if cv.is_nan() { 1.0 } else { cv.max(0.0) };

    let factor = if sample_size < 5 {
        0.8
    } else if sample_size < 15 {
        1.1
    } else {
        1.15
    };

    ((1.0 - cv) * factor).clamp(CONFIDENCE_MIN, CONFIDENCE_MAX)
}

#[inline]
pub fn confidence_label(confidence: f64) -> ConfidenceLabel {
    if confidence >= 0.70 {
        ConfidenceLabel::High
    } else if confidence >= 0.50 {
        ConfidenceLabel::Medium
    } else {
        ConfidenceLabel::Low
    }
}
