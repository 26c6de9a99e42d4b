//! Euclidean projection onto the bounded simplex `{r : Σr = 1, lo ≤ r_i ≤ hi}`.

const BISECTION_STEPS: usize = 200;

/// Whether `n` ratios in `[lo, hi]` can sum to one.
pub fn is_feasible(n: usize, lo: f64, hi: f64) -> bool {
    n > 0 && lo <= hi && n as f64 * lo <= 1.0 + 1e-12 && n as f64 * hi >= 1.0 - 1e-12
}

/// Projects `v` onto the bounded simplex. The caller checks feasibility first.
///
/// The projection is `clamp(v_i - τ, lo, hi)` for the shift `τ` that makes the entries sum to
/// one; the sum is monotone in `τ`, so `τ` is found by bisection.
pub fn project(v: &[f64], lo: f64, hi: f64) -> Vec<f64> {
    let clamped_sum = |tau: f64| v.iter().map(|x| (x - tau).clamp(lo, hi)).sum::<f64>();

    let max = v.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = v.iter().copied().fold(f64::INFINITY, f64::min);
    // every entry at `hi` for tau_low, every entry at `lo` for tau_high
    let mut tau_low = min - hi;
    let mut tau_high = max - lo;
    for _ in 0..BISECTION_STEPS {
        let mid = 0.5 * (tau_low + tau_high);
        if clamped_sum(mid) > 1.0 {
            tau_low = mid;
        } else {
            tau_high = mid;
        }
        if tau_high - tau_low <= f64::EPSILON * tau_high.abs().max(1.0) {
            break;
        }
    }
    let tau = 0.5 * (tau_low + tau_high);
    let mut projected: Vec<f64> = v.iter().map(|x| (x - tau).clamp(lo, hi)).collect();

    // Spread the residual of the bisection over the entries that are off their bounds.
    let residual = 1.0 - projected.iter().sum::<f64>();
    let free: Vec<usize> = (0..projected.len())
        .filter(|&i| projected[i] > lo && projected[i] < hi)
        .collect();
    if !free.is_empty() {
        let share = residual / free.len() as f64;
        for i in free {
            projected[i] = (projected[i] + share).clamp(lo, hi);
        }
    }
    projected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_on_simplex(r: &[f64], lo: f64, hi: f64) {
        assert!((r.iter().sum::<f64>() - 1.0).abs() < 1e-9, "{:?}", r);
        assert!(r.iter().all(|x| *x >= lo - 1e-12 && *x <= hi + 1e-12), "{:?}", r);
    }

    #[test]
    fn feasible_points_are_fixed() {
        let r = project(&[0.3, 0.7], 0.1, 0.8);
        assert!((r[0] - 0.3).abs() < 1e-9 && (r[1] - 0.7).abs() < 1e-9);
    }

    #[test]
    fn projection_respects_bounds() {
        let r = project(&[2.0, -1.0], 0.1, 0.8);
        assert_on_simplex(&r, 0.1, 0.8);
        assert!((r[0] - 0.8).abs() < 1e-9);

        let r = project(&[0.0, 0.0, 0.0, 5.0, 0.1], 0.1, 0.8);
        assert_on_simplex(&r, 0.1, 0.8);
        assert!((r[3] - 0.6).abs() < 1e-9);
    }

    #[test]
    fn feasibility() {
        assert!(is_feasible(5, 0.1, 0.8));
        assert!(!is_feasible(2, 0.1, 0.4));
        assert!(!is_feasible(11, 0.1, 0.8));
        assert!(is_feasible(10, 0.1, 0.8));
    }
}
