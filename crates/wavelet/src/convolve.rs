//! Direct convolution engine: sampled kernels convolved with the signal
//! through the convolution theorem.
//!
//! Centring rule for the "same" slice: output index `n` is index
//! `n + (M - 1) / 2` (integer division) of the full linear convolution, for
//! a kernel of `M` samples. This is the slice `Σ_m kernel[m]·signal[n + (M - 1)/2 - m]`
//! and holds for odd and even `M` alike.

use std::collections::HashMap;
use std::f64::consts::PI;

use ndarray::Array2;
use num_complex::Complex64;
use rustfft::FftPlanner;
use tracing::debug;

use crate::error::CwtError;
use crate::kernel::WaveletKernel;

/// Kernel support factor: a kernel at width `w` is sampled over `10 * w` points.
pub const SUPPORT_FACTOR: f64 = 10.0;

/// Number of kernel samples requested for `width`, capped at the signal length.
///
/// Returns `min(ceil(10 * width), n)`, and at least 1. Capping is the
/// documented policy for wide kernels, not an error.
pub fn support_points(width: f64, n: usize) -> usize {
    let m = (SUPPORT_FACTOR * width).ceil();
    (m as usize).clamp(1, n.max(1))
}

/// CWT by FFT convolution with a caller-supplied kernel sampler.
///
/// For each width `w`, `sampler(M, w)` is called with
/// `M = support_points(w, signal.len())`; the returned samples are convolved
/// with the signal and cropped to the centred `signal.len()` slice. Rows are
/// stacked in the order of `widths`; no reordering takes place.
///
/// # Errors
///
/// | Variant | Trigger |
/// |---------|---------|
/// | [`CwtError::InsufficientData`] | `signal` is empty |
/// | [`CwtError::InvalidConfiguration`] | a width is not finite and positive, or the sampler returns no samples |
pub fn fft_cwt<F>(signal: &[f64], sampler: F, widths: &[f64]) -> Result<Array2<Complex64>, CwtError>
where
    F: Fn(usize, f64) -> Vec<Complex64>,
{
    let n = signal.len();
    if n == 0 {
        return Err(CwtError::InsufficientData { len: 0, min: 1 });
    }
    if let Some((index, width)) = widths
        .iter()
        .enumerate()
        .find(|(_, w)| !w.is_finite() || **w <= 0.0)
    {
        return Err(CwtError::invalid(format!(
            "width {index} must be finite and > 0, got {width}"
        )));
    }
    debug!(n, widths = widths.len(), "direct FFT convolution");

    let mut convolver = SameConvolver::new(signal);
    let mut output = Array2::<Complex64>::zeros((widths.len(), n));
    for (row, &width) in widths.iter().enumerate() {
        let kernel = sampler(support_points(width, n), width);
        if kernel.is_empty() {
            return Err(CwtError::invalid(format!(
                "sampler returned no samples for width {width}"
            )));
        }
        let same = convolver.convolve(&kernel);
        for (out, value) in output.row_mut(row).iter_mut().zip(same) {
            *out = value;
        }
    }
    Ok(output)
}

/// CWT in the time domain for a wavelet kernel.
///
/// Samples `(dt/s)^(1/2) · conj(ψ₀(-t/s))` at `t = k·dt`, `k = -h..=h`, with
/// `h = support_points(s / dt, n) / 2`. The kernel length is therefore always
/// odd and the convolution evaluates the correlation
/// `W_n(s) = Σ_m x_m ψ*((m - n)·dt/s)` exactly at sample `n`.
///
/// # Errors
///
/// Same as [`fft_cwt`]; additionally [`CwtError::InvalidConfiguration`] if
/// `dt` is not finite and positive.
pub fn cwt_time(
    signal: &[f64],
    kernel: &dyn WaveletKernel,
    scales: &[f64],
    dt: f64,
) -> Result<Array2<Complex64>, CwtError> {
    crate::scales::validate_dt(dt)?;
    let widths: Vec<f64> = scales.iter().map(|&s| s / dt).collect();
    let sampler = |points: usize, width: f64| {
        let scale = width * dt;
        let half = (points / 2) as i64;
        let norm = (dt / scale).sqrt();
        (-half..=half)
            .map(|k| kernel.time_domain(-(k as f64) * dt, scale).conj() * norm)
            .collect()
    };
    fft_cwt(signal, sampler, &widths)
}

/// Reference "same" convolution by direct summation.
///
/// Uses the centring rule of this module; an empty kernel yields zeros.
pub fn convolve_same_direct(signal: &[f64], kernel: &[Complex64]) -> Vec<Complex64> {
    let n = signal.len();
    let m = kernel.len();
    if m == 0 {
        return vec![Complex64::new(0.0, 0.0); n];
    }
    let start = (m - 1) / 2;
    (0..n)
        .map(|i| {
            let center = i + start;
            let k_lo = center.saturating_sub(n - 1);
            let k_hi = center.min(m - 1);
            (k_lo..=k_hi).map(|k| kernel[k] * signal[center - k]).sum()
        })
        .collect()
}

/// Samples the Ricker wavelet on `points` integer offsets centred at zero.
///
/// `A · (1 - x²/a²) · exp(-x²/(2a²))` with `A = 2 / (√(3a) · π^(1/4))` at
/// `x = i - (points - 1)/2`.
pub fn ricker(points: usize, a: f64) -> Vec<Complex64> {
    let amplitude = 2.0 / ((3.0 * a).sqrt() * PI.powf(0.25));
    let wsq = a * a;
    let center = (points as f64 - 1.0) / 2.0;
    (0..points)
        .map(|i| {
            let x = i as f64 - center;
            let xsq = x * x;
            let value = amplitude * (1.0 - xsq / wsq) * (-xsq / (2.0 * wsq)).exp();
            Complex64::new(value, 0.0)
        })
        .collect()
}

/// Linear "same" convolution against one signal, reusing FFT plans and
/// the signal spectrum for each padded length.
struct SameConvolver<'a> {
    signal: &'a [f64],
    planner: FftPlanner<f64>,
    spectra: HashMap<usize, Vec<Complex64>>,
}

impl<'a> SameConvolver<'a> {
    fn new(signal: &'a [f64]) -> Self {
        Self {
            signal,
            planner: FftPlanner::new(),
            spectra: HashMap::new(),
        }
    }

    fn convolve(&mut self, kernel: &[Complex64]) -> Vec<Complex64> {
        let n = self.signal.len();
        let m = kernel.len();
        let len = (n + m - 1).next_power_of_two();
        let fft_forward = self.planner.plan_fft_forward(len);
        let fft_inverse = self.planner.plan_fft_inverse(len);

        let signal = self.signal;
        let signal_fft = self.spectra.entry(len).or_insert_with(|| {
            let mut padded: Vec<Complex64> = signal
                .iter()
                .map(|&x| Complex64::new(x, 0.0))
                .chain(std::iter::repeat_n(Complex64::new(0.0, 0.0), len - n))
                .collect();
            fft_forward.process(&mut padded);
            padded
        });

        let mut product: Vec<Complex64> = kernel
            .iter()
            .copied()
            .chain(std::iter::repeat_n(Complex64::new(0.0, 0.0), len - m))
            .collect();
        fft_forward.process(&mut product);
        for (p, s) in product.iter_mut().zip(signal_fft.iter()) {
            *p *= *s;
        }
        fft_inverse.process(&mut product);

        // rustfft is unnormalized
        let norm = 1.0 / len as f64;
        let start = (m - 1) / 2;
        product[start..start + n].iter().map(|&c| c * norm).collect()
    }
}
