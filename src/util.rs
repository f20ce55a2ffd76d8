/// `num / den`, or 0 when the denominator is zero.
pub fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

/// A `[0, 1]` fraction as a percentage rounded to one decimal.
pub fn percent(fraction: f64) -> f64 {
    (fraction * 1000.0).round() / 10.0
}
