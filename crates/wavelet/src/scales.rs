//! Geometric scale discretization.

use crate::error::CwtError;

/// Smallest resolvable scale for sample spacing `dt`.
pub fn smallest_scale(dt: f64) -> f64 {
    2.0 * dt
}

/// Builds the geometric scale array for a series of `n` samples.
///
/// Scales follow `s0 * 2^(j * dj)` for `j = 0..=J` with `s0 = 2 * dt` and
/// `J = floor(log2(n * dt / s0) / dj)`, so the largest scale never exceeds
/// the series duration.
///
/// # Errors
///
/// | Variant | Trigger |
/// |---------|---------|
/// | [`CwtError::InvalidConfiguration`] | `dt` or `dj` is not finite and positive |
/// | [`CwtError::InsufficientData`] | `n * dt < s0` |
pub fn compute_scales(dt: f64, dj: f64, n: usize) -> Result<Vec<f64>, CwtError> {
    validate_dt(dt)?;
    validate_dj(dj)?;

    let s0 = smallest_scale(dt);
    let min = min_len(dt);
    if n < min {
        return Err(CwtError::InsufficientData { len: n, min });
    }

    let octaves = (n as f64 * dt / s0).log2();
    let j_count = (octaves / dj).floor() as usize;
    Ok((0..=j_count)
        .map(|j| s0 * 2.0_f64.powf(j as f64 * dj))
        .collect())
}

/// Minimum series length supporting the smallest scale.
pub(crate) fn min_len(dt: f64) -> usize {
    (smallest_scale(dt) / dt).ceil() as usize
}

pub(crate) fn validate_dt(dt: f64) -> Result<(), CwtError> {
    if !dt.is_finite() || dt <= 0.0 {
        return Err(CwtError::invalid(format!("dt must be > 0, got {dt}")));
    }
    Ok(())
}

pub(crate) fn validate_dj(dj: f64) -> Result<(), CwtError> {
    if !dj.is_finite() || dj <= 0.0 {
        return Err(CwtError::invalid(format!("dj must be > 0, got {dj}")));
    }
    Ok(())
}
