//! Stability-selection error bounds.
//!
//! Out-of-range values are returned as `f64::INFINITY`, which fails every
//! `<= max_er` comparison. They are never errors.

/// Per-comparison error rate: `(q / 2p)^2 / (2 pi - 1)`, or infinity when
/// outside `[0, 1]`.
pub fn pcer(pi: f64, q: f64, p: f64) -> f64 {
    let v = (q / (2.0 * p)).powi(2) * (1.0 / (2.0 * pi - 1.0));
    if v.is_nan() || !(0.0..=1.0).contains(&v) {
        return f64::INFINITY;
    }
    v
}

/// Expected number of false inclusions: `pcer * p`, or infinity when
/// outside `[0, q]`.
pub fn er(pi: f64, q: f64, p: f64) -> f64 {
    let v = pcer(pi, q, p) * p;
    if v.is_nan() || !(0.0..=q).contains(&v) {
        return f64::INFINITY;
    }
    v
}
