use crate::point::Scalar;
use crate::schema::Variable;

/// Generate a random `f64` in the range `[low, high)`.
#[inline]
pub(crate) fn f64_range(rng: &mut fastrand::Rng, low: f64, high: f64) -> f64 {
    low + rng.f64() * (high - low)
}

/// Draw a uniform value from a variable's domain.
pub(crate) fn sample_variable(rng: &mut fastrand::Rng, variable: &Variable) -> Scalar {
    match variable {
        Variable::Continuous { low, high, .. } => Scalar::Float(f64_range(rng, *low, *high)),
        Variable::Discrete { values } => values[rng.usize(0..values.len())].clone(),
    }
}

/// Pick `k` distinct indices from `0..n`, skipping `exclude`.
///
/// Requires `n - 1 >= k`.
pub(crate) fn distinct_indices(
    rng: &mut fastrand::Rng,
    n: usize,
    k: usize,
    exclude: usize,
) -> Vec<usize> {
    let mut picked = Vec::with_capacity(k);
    while picked.len() < k {
        let candidate = rng.usize(0..n);
        if candidate != exclude && !picked.contains(&candidate) {
            picked.push(candidate);
        }
    }
    picked
}
