//! Analytic frequency-domain engine, following Torrence & Compo (1998).
//!
//! One forward FFT of the signal; each scale is the inverse FFT of the
//! signal spectrum times the normalized, conjugated kernel spectrum. The
//! kernel spectrum is folded over its aliases so this engine agrees with
//! the sampled kernels of [`cwt_time`](crate::cwt_time).

use std::f64::consts::PI;

use ndarray::Array2;
use num_complex::Complex64;
use rustfft::FftPlanner;
use tracing::debug;

use crate::error::CwtError;
use crate::kernel::WaveletKernel;

/// Builds the angular frequency array for an FFT of length `n`.
///
/// Non-negative frequencies for `k = 0..=n/2`, negative for `k = n/2+1..n`.
pub fn angular_frequencies(n: usize, dt: f64) -> Vec<f64> {
    let dw = 2.0 * PI / (n as f64 * dt);
    (0..n)
        .map(|k| {
            if k <= n / 2 {
                k as f64 * dw
            } else {
                -((n - k) as f64) * dw
            }
        })
        .collect()
}

/// Spectral images summed on each side of the principal band.
///
/// Sampling ψ at `dt` periodizes ψ̂ with period `2π/dt`. At `s >= 2·dt` the
/// fourth image starts at `s·ω > 14π`, where the Gaussian kernels and
/// low-order Paul kernels have decayed to rounding level.
pub const ALIAS_IMAGES: i32 = 3;

/// Normalized kernel spectrum at one scale, periodized to match a kernel
/// sampled at `dt`:
///
/// `(2πs/dt)^(1/2) · Σ_m conj(ψ̂₀(s·(ω_k + 2πm/dt)))`, `|m| <= ALIAS_IMAGES`.
pub(crate) fn daughter(
    kernel: &dyn WaveletKernel,
    omegas: &[f64],
    scale: f64,
    dt: f64,
) -> Vec<Complex64> {
    let norm = (2.0 * PI * scale / dt).sqrt();
    let period = 2.0 * PI / dt;
    omegas
        .iter()
        .map(|&w| {
            let folded: Complex64 = (-ALIAS_IMAGES..=ALIAS_IMAGES)
                .map(|m| kernel.frequency_domain(w + f64::from(m) * period, scale))
                .sum();
            folded.conj() * norm
        })
        .collect()
}

/// CWT by analytic frequency-domain evaluation of the kernel.
///
/// The transform is circular over the `signal.len()` samples.
///
/// # Errors
///
/// | Variant | Trigger |
/// |---------|---------|
/// | [`CwtError::InsufficientData`] | `signal` is empty |
/// | [`CwtError::InvalidConfiguration`] | `dt` or a scale is not finite and positive |
pub fn cwt_freq(
    signal: &[f64],
    kernel: &dyn WaveletKernel,
    scales: &[f64],
    dt: f64,
) -> Result<Array2<Complex64>, CwtError> {
    crate::scales::validate_dt(dt)?;
    let n = signal.len();
    if n == 0 {
        return Err(CwtError::InsufficientData { len: 0, min: 1 });
    }
    if let Some(scale) = scales.iter().find(|s| !s.is_finite() || **s <= 0.0) {
        return Err(CwtError::invalid(format!(
            "scale must be finite and > 0, got {scale}"
        )));
    }
    debug!(n, scales = scales.len(), kernel = %kernel.name(), "frequency-domain transform");

    let mut planner = FftPlanner::new();
    let fft_forward = planner.plan_fft_forward(n);
    let fft_inverse = planner.plan_fft_inverse(n);

    let mut signal_fft: Vec<Complex64> = signal.iter().map(|&x| Complex64::new(x, 0.0)).collect();
    fft_forward.process(&mut signal_fft);

    let omegas = angular_frequencies(n, dt);
    // rustfft is unnormalized
    let norm = 1.0 / n as f64;

    let mut output = Array2::<Complex64>::zeros((scales.len(), n));
    for (row, &scale) in scales.iter().enumerate() {
        let mut product: Vec<Complex64> = signal_fft
            .iter()
            .zip(daughter(kernel, &omegas, scale, dt))
            .map(|(&x, d)| x * d)
            .collect();
        fft_inverse.process(&mut product);
        for (out, value) in output.row_mut(row).iter_mut().zip(product) {
            *out = value * norm;
        }
    }
    Ok(output)
}

/// Transform of a unit impulse at `n = 0`, per scale.
///
/// `W_δ(s) = (1/N) Σ_k D_s(ω_k)`, with `D_s` the periodized daughter.
pub(crate) fn delta_transform(
    kernel: &dyn WaveletKernel,
    scales: &[f64],
    n: usize,
    dt: f64,
) -> Vec<Complex64> {
    let omegas = angular_frequencies(n, dt);
    scales
        .iter()
        .map(|&s| daughter(kernel, &omegas, s, dt).into_iter().sum::<Complex64>() / n as f64)
        .collect()
}
