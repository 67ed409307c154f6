//! Count arithmetic shared by the construction and requirement engines.
//!
//! Dimensions are `f64`, so a ratio such as `0.3 / 0.1` lands a hair below
//! 3. Counts therefore snap to the nearest integer when within `EPSILON`
//! before flooring or ceiling.

const EPSILON: f64 = 1e-9;

fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if !numerator.is_finite() || !denominator.is_finite() || denominator <= 0.0 {
        return None;
    }
    let r = numerator / denominator;
    if r <= 0.0 {
        return None;
    }
    let nearest = r.round();
    if (r - nearest).abs() < EPSILON {
        Some(nearest)
    } else {
        Some(r)
    }
}

/// How many whole `denominator`s fit in `numerator`. Capacity, so floor.
/// Ratios beyond `u64::MAX` saturate; callers bound counts before
/// allocating per-unit storage.
pub fn floor_div(numerator: f64, denominator: f64) -> u64 {
    ratio(numerator, denominator).map_or(0, |r| r.floor() as u64)
}

/// How many `denominator`s are needed to cover `numerator`. Demand, so ceil.
pub fn ceil_div(numerator: f64, denominator: f64) -> u64 {
    ratio(numerator, denominator).map_or(0, |r| r.ceil() as u64)
}

/// Boards needed to supply `needed` units when each board yields
/// `per_unit`. Zero capacity means nothing can be planned, so zero.
pub fn units_per(needed: u64, per_unit: u64) -> u64 {
    if per_unit == 0 {
        0
    } else {
        needed.div_ceil(per_unit)
    }
}

pub fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_div_basic() {
        assert_eq!(floor_div(24.0, 16.0), 1);
        assert_eq!(floor_div(24.0, 2.0), 12);
        assert_eq!(floor_div(1.0, 2.0), 0);
    }

    #[test]
    fn test_ceil_div_basic() {
        assert_eq!(ceil_div(14.0, 2.0), 7);
        assert_eq!(ceil_div(15.0, 2.0), 8);
        assert_eq!(ceil_div(0.5, 2.0), 1);
    }

    #[test]
    fn test_float_noise_is_snapped() {
        // 0.3 / 0.1 == 2.9999999999999996
        assert_eq!(floor_div(0.3, 0.1), 3);
        assert_eq!(ceil_div(0.7, 0.1), 7);
    }

    #[test]
    fn test_guards_against_bad_divisors() {
        assert_eq!(floor_div(10.0, 0.0), 0);
        assert_eq!(ceil_div(10.0, -1.0), 0);
        assert_eq!(ceil_div(f64::NAN, 2.0), 0);
        assert_eq!(floor_div(0.0, 2.0), 0);
        assert_eq!(ceil_div(-4.0, 2.0), 0);
    }

    #[test]
    fn test_tiny_divisor_does_not_wrap() {
        assert_eq!(floor_div(8_589_934_592.0, 0.5), 17_179_869_184);
        assert_eq!(ceil_div(1e300, 1.0), u64::MAX);
    }

    #[test]
    fn test_units_per() {
        assert_eq!(units_per(7, 1), 7);
        assert_eq!(units_per(7, 3), 3);
        assert_eq!(units_per(6, 3), 2);
        assert_eq!(units_per(0, 3), 0);
        assert_eq!(units_per(5, 0), 0);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(Vec::<f64>::new()), 0.0);
        assert!((mean([2.0, 3.0]) - 2.5).abs() < 1e-12);
    }
}
