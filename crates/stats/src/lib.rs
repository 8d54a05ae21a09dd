//! Descriptive statistics helpers for scalogram.
//!
//! Variance and standard deviation use the population form (N
//! denominator), matching the energy normalization of the wavelet power.

/// Arithmetic mean of a slice. Returns 0.0 if empty.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let sum: f64 = data.iter().sum();
    sum / data.len() as f64
}

/// Population variance with N denominator.
/// Returns 0.0 if empty.
pub fn variance(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let m = mean(data);
    data.iter().map(|&x| (x - m) * (x - m)).sum::<f64>() / data.len() as f64
}

/// Population standard deviation (N denominator).
pub fn sd(data: &[f64]) -> f64 {
    variance(data).sqrt()
}

/// Indices of strict interior local maxima.
///
/// Index `i` qualifies when `values[i]` is greater than both neighbours.
/// The first and last elements never qualify. Non-finite values never
/// qualify and never count as larger than a finite neighbour.
pub fn local_maxima(values: &[f64]) -> Vec<usize> {
    let len = values.len();
    if len < 3 {
        return Vec::new();
    }
    (1..len - 1)
        .filter(|&i| {
            let v = values[i];
            v.is_finite() && v > values[i - 1] && v > values[i + 1]
        })
        .collect()
}
