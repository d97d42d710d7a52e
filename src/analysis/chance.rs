/// Shrink a model probability toward 50% by how much the model can be trusted.
///
/// adjusted = 0.5 + (p - 0.5) * c
///
/// where c = clamp01(confidence) * (1 - clamp01(uncertainty)).
///
/// Pure; always in [0, 1]. Non-finite inputs clamp to 0.
#[inline]
pub fn adjusted_chance(probability: f64, confidence: f64, uncertainty: f64) -> f64 {
    let p = clamp01(probability);
    let c = clamp01(confidence) * (1.0 - clamp01(uncertainty));
    clamp01(0.5 + (p - 0.5) * clamp01(c))
}

#[inline]
pub fn clamp01(x: f64) -> f64 {
    if x.is_finite() { x.clamp(0.0, 1.0) } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_trust_keeps_probability() {
        assert!((adjusted_chance(0.8, 1.0, 0.0) - 0.8).abs() < 1e-12);
        assert!((adjusted_chance(0.2, 1.0, 0.0) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_no_trust_collapses_to_half() {
        assert_eq!(adjusted_chance(0.9, 0.0, 0.0), 0.5);
        assert_eq!(adjusted_chance(0.9, 0.8, 1.0), 0.5);
    }

    #[test]
    fn test_partial_shrink() {
        // c = 0.8 * 0.75 = 0.6 -> 0.5 + 0.3 * 0.6 = 0.68
        assert!((adjusted_chance(0.8, 0.8, 0.25) - 0.68).abs() < 1e-12);
    }

    #[test]
    fn test_never_flips_side() {
        for i in 0..=100 {
            let p = i as f64 / 100.0;
            let adj = adjusted_chance(p, 0.7, 0.2);
            assert!((adj - 0.5) * (p - 0.5) >= 0.0);
            assert!((adj - 0.5).abs() <= (p - 0.5).abs() + 1e-12);
        }
    }

    #[test]
    fn test_non_finite_inputs() {
        assert_eq!(clamp01(f64::NAN), 0.0);
        assert_eq!(clamp01(f64::INFINITY), 0.0);
        assert_eq!(clamp01(1.7), 1.0);
        // NaN probability reads as 0, NaN uncertainty as 0
        assert!((adjusted_chance(f64::NAN, 1.0, f64::NAN) - 0.0).abs() < 1e-12);
        assert!(adjusted_chance(0.9, f64::NAN, 0.0) == 0.5);
    }
}
