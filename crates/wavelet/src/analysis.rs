//! Transform orchestration: configuration, engine selection and the
//! quantities derived from the transform matrix.

use std::cell::OnceCell;
use std::sync::Arc;

use ndarray::Array2;
use num_complex::Complex64;
use tracing::{debug, warn};

use crate::cache::{CacheSlot, ConfigField, MemoTable, get_or_try_init};
use crate::convolve::cwt_time;
use crate::error::CwtError;
use crate::freq::{cwt_freq, delta_transform};
use crate::kernel::{Wavelet, WaveletKernel};
use crate::peaks::{SpectralPeak, find_peaks};
use crate::scales::{compute_scales, validate_dj, validate_dt};
use crate::series::TimeSeries;

/// Configuration for a [`WaveletAnalysis`].
///
/// Use the builder methods to customize the analysis parameters.
///
/// # Example
///
/// ```ignore
/// use scalogram_wavelet::{AnalysisConfig, Dog};
///
/// let config = AnalysisConfig::new()
///     .with_dt(0.25)
///     .with_dj(0.0625)
///     .with_wavelet(Dog::ricker())
///     .with_compute_with_freq(false);
/// ```
#[derive(Clone, Debug)]
pub struct AnalysisConfig {
    /// Sample spacing.
    dt: f64,
    /// Sub-octave scale resolution.
    dj: f64,
    /// Mother wavelet.
    wavelet: Arc<dyn WaveletKernel>,
    /// Divide the global spectrum by scale.
    unbias: bool,
    /// Use the frequency-domain engine instead of direct convolution.
    compute_with_freq: bool,
    /// Subtract the signal mean before transforming.
    remove_mean: bool,
}

impl AnalysisConfig {
    /// Creates a new `AnalysisConfig` with default parameters.
    ///
    /// Defaults: `dt = 1.0`, `dj = 0.125`, Morlet with `w0 = 6`,
    /// `unbias = true`, `compute_with_freq = true`, `remove_mean = true`.
    pub fn new() -> Self {
        Self {
            dt: 1.0,
            dj: 0.125,
            wavelet: Wavelet::default().into_kernel(),
            unbias: true,
            compute_with_freq: true,
            remove_mean: true,
        }
    }

    /// Sets the sample spacing.
    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }

    /// Sets the sub-octave scale resolution.
    pub fn with_dj(mut self, dj: f64) -> Self {
        self.dj = dj;
        self
    }

    /// Sets the mother wavelet.
    pub fn with_wavelet(self, wavelet: impl WaveletKernel + 'static) -> Self {
        self.with_kernel(Arc::new(wavelet))
    }

    /// Sets an already shared mother wavelet.
    pub fn with_kernel(mut self, kernel: Arc<dyn WaveletKernel>) -> Self {
        self.wavelet = kernel;
        self
    }

    /// Sets whether the global spectrum is divided by scale.
    pub fn with_unbias(mut self, unbias: bool) -> Self {
        self.unbias = unbias;
        self
    }

    /// Sets whether the frequency-domain engine is used.
    pub fn with_compute_with_freq(mut self, compute_with_freq: bool) -> Self {
        self.compute_with_freq = compute_with_freq;
        self
    }

    /// Sets whether the mean is removed before transforming.
    pub fn with_remove_mean(mut self, remove_mean: bool) -> Self {
        self.remove_mean = remove_mean;
        self
    }

    /// Returns the sample spacing.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Returns the sub-octave scale resolution.
    pub fn dj(&self) -> f64 {
        self.dj
    }

    /// Returns the mother wavelet.
    pub fn wavelet(&self) -> &dyn WaveletKernel {
        self.wavelet.as_ref()
    }

    /// Returns whether the global spectrum is divided by scale.
    pub fn unbias(&self) -> bool {
        self.unbias
    }

    /// Returns whether the frequency-domain engine is used.
    pub fn compute_with_freq(&self) -> bool {
        self.compute_with_freq
    }

    /// Returns whether the mean is removed before transforming.
    pub fn remove_mean(&self) -> bool {
        self.remove_mean
    }

    fn validate(&self) -> Result<(), CwtError> {
        validate_dt(self.dt)?;
        validate_dj(self.dj)
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Cone of influence.
///
/// `scales[i]` is the largest scale at time `times[i]` whose wavelet power
/// is not contaminated by the series edges.
#[derive(Clone, Debug, PartialEq)]
pub struct Coi {
    /// Time coordinate of each sample.
    pub times: Vec<f64>,
    /// Largest trusted scale at each sample.
    pub scales: Vec<f64>,
}

/// Continuous wavelet analysis of one signal.
///
/// Derived quantities are computed on first access and memoized. The
/// setters clear only the memoized values that depend on the changed
/// field; see [`CacheSlot::dependencies`].
///
/// # Example
///
/// ```ignore
/// use scalogram_wavelet::{AnalysisConfig, WaveletAnalysis};
///
/// let mut wa = WaveletAnalysis::new(signal, AnalysisConfig::new())?;
/// let gws = wa.global_wavelet_spectrum()?.to_vec();
/// wa.set_unbias(false);
/// let biased = wa.global_wavelet_spectrum()?;
/// ```
#[derive(Debug)]
pub struct WaveletAnalysis {
    series: TimeSeries,
    /// Transform input: the series, mean-removed when configured.
    signal: Vec<f64>,
    /// Mean subtracted from `signal`, zero when `remove_mean` is off.
    mean: f64,
    config: AnalysisConfig,
    cache: MemoTable,
}

impl WaveletAnalysis {
    /// Creates an analysis of `data` sampled every `config.dt()`.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`CwtError::InsufficientData`] | fewer samples than the smallest scale needs |
    /// | [`CwtError::NonFiniteData`] | `data` contains NaN or infinity |
    /// | [`CwtError::InvalidConfiguration`] | `dt` or `dj` is not finite and positive |
    pub fn new(data: Vec<f64>, config: AnalysisConfig) -> Result<Self, CwtError> {
        Self::from_series(TimeSeries::new(data)?, config)
    }

    /// Creates an analysis of an already validated series.
    ///
    /// # Errors
    ///
    /// Same as [`WaveletAnalysis::new`], minus [`CwtError::NonFiniteData`].
    pub fn from_series(series: TimeSeries, config: AnalysisConfig) -> Result<Self, CwtError> {
        config.validate()?;
        let scales = compute_scales(config.dt, config.dj, series.len())?;

        let (signal, mean) = if config.remove_mean {
            series.anomaly()
        } else {
            (series.as_slice().to_vec(), 0.0)
        };

        Ok(Self {
            series,
            signal,
            mean,
            config,
            cache: MemoTable {
                scales: OnceCell::from(scales),
                ..MemoTable::default()
            },
        })
    }

    /// Number of samples.
    pub fn n(&self) -> usize {
        self.series.len()
    }

    /// Sample spacing.
    pub fn dt(&self) -> f64 {
        self.config.dt
    }

    /// The signal as supplied, mean included.
    pub fn data(&self) -> &[f64] {
        self.series.as_slice()
    }

    /// Sample times `n * dt`.
    pub fn times(&self) -> Vec<f64> {
        (0..self.n()).map(|i| i as f64 * self.config.dt).collect()
    }

    /// Current configuration.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    fn kernel(&self) -> &dyn WaveletKernel {
        self.config.wavelet.as_ref()
    }

    /// Analysis scales, smallest first.
    ///
    /// # Errors
    ///
    /// Propagates [`compute_scales`] failures.
    pub fn scales(&self) -> Result<&[f64], CwtError> {
        get_or_try_init(&self.cache.scales, || {
            compute_scales(self.config.dt, self.config.dj, self.n())
        })
        .map(Vec::as_slice)
    }

    /// Complex transform matrix, shape `(scales, n)`.
    ///
    /// Computed analytically in the frequency domain when
    /// `compute_with_freq` is set, otherwise by direct FFT convolution.
    ///
    /// # Errors
    ///
    /// Propagates engine failures.
    pub fn wavelet_transform(&self) -> Result<&Array2<Complex64>, CwtError> {
        get_or_try_init(&self.cache.transform, || {
            let scales = self.scales()?;
            debug!(
                n = self.n(),
                scales = scales.len(),
                compute_with_freq = self.config.compute_with_freq,
                "computing wavelet transform"
            );
            if self.config.compute_with_freq {
                cwt_freq(&self.signal, self.kernel(), scales, self.config.dt)
            } else {
                cwt_time(&self.signal, self.kernel(), scales, self.config.dt)
            }
        })
    }

    /// Wavelet power `|W|²`.
    ///
    /// # Errors
    ///
    /// Propagates [`WaveletAnalysis::wavelet_transform`] failures.
    pub fn wavelet_power(&self) -> Result<&Array2<f64>, CwtError> {
        get_or_try_init(&self.cache.power, || {
            Ok(self.wavelet_transform()?.mapv(|c| c.norm_sqr()))
        })
    }

    /// Time-averaged power per scale, divided by the scale when `unbias` is set.
    ///
    /// # Errors
    ///
    /// Propagates [`WaveletAnalysis::wavelet_transform`] failures.
    pub fn global_wavelet_spectrum(&self) -> Result<&[f64], CwtError> {
        get_or_try_init(&self.cache.global_spectrum, || {
            let power = self.wavelet_power()?;
            let scales = self.scales()?;
            let n = self.n() as f64;
            Ok(power
                .rows()
                .into_iter()
                .zip(scales)
                .map(|(row, &s)| self.debias(row.sum() / n, s))
                .collect())
        })
        .map(Vec::as_slice)
    }

    /// Global spectrum averaged over samples outside the cone of influence.
    ///
    /// Scales with no trusted sample report `0.0`.
    ///
    /// # Errors
    ///
    /// Propagates [`WaveletAnalysis::wavelet_transform`] failures.
    pub fn masked_global_wavelet_spectrum(&self) -> Result<&[f64], CwtError> {
        get_or_try_init(&self.cache.masked_global_spectrum, || {
            let power = self.wavelet_power()?;
            let scales = self.scales()?;
            let coi = self.coi()?;
            Ok(power
                .rows()
                .into_iter()
                .zip(scales)
                .map(|(row, &s)| {
                    let (sum, count) = row
                        .iter()
                        .zip(&coi.scales)
                        .filter(|&(_, &limit)| s <= limit)
                        .fold((0.0, 0usize), |(sum, count), (&p, _)| (sum + p, count + 1));
                    if count == 0 {
                        0.0
                    } else {
                        self.debias(sum / count as f64, s)
                    }
                })
                .collect())
        })
        .map(Vec::as_slice)
    }

    fn debias(&self, mean_power: f64, scale: f64) -> f64 {
        if self.config.unbias {
            mean_power / scale
        } else {
            mean_power
        }
    }

    /// Population variance of the signal.
    pub fn data_variance(&self) -> f64 {
        scalogram_stats::variance(self.data())
    }

    /// Signal variance recovered from the transform,
    /// `dj·dt/C_d · Σ_j mean_t(|W_j|²) / s_j`.
    ///
    /// # Errors
    ///
    /// Propagates transform and [`WaveletAnalysis::c_d`] failures.
    pub fn wavelet_variance(&self) -> Result<f64, CwtError> {
        get_or_try_init(&self.cache.wavelet_variance, || {
            let power = self.wavelet_power()?;
            let scales = self.scales()?;
            let c_d = self.c_d()?;
            let n = self.n() as f64;
            let sum: f64 = power
                .rows()
                .into_iter()
                .zip(scales)
                .map(|(row, &s)| row.sum() / n / s)
                .sum();
            Ok(self.config.dj * self.config.dt / c_d * sum)
        })
        .copied()
    }

    /// Approximate inverse transform, mean restored.
    ///
    /// `x_n = dj·dt^(1/2) / (C_d·Re ψ₀(0)) · Σ_j Re W_n(s_j) / s_j^(1/2)`.
    /// The error is bounded by the scale discretization, not zero.
    ///
    /// # Errors
    ///
    /// [`CwtError::InvalidConfiguration`] if the kernel vanishes at `t = 0`
    /// (odd DOG and Paul orders); otherwise propagates transform failures.
    pub fn reconstruction(&self) -> Result<&[f64], CwtError> {
        get_or_try_init(&self.cache.reconstruction, || {
            let psi0 = self.psi0_real()?;
            let transform = self.wavelet_transform()?;
            let scales = self.scales()?;
            let c_d = self.c_d()?;
            let factor = self.config.dj * self.config.dt.sqrt() / (c_d * psi0);

            let mut out = vec![0.0; self.n()];
            for (row, &s) in transform.rows().into_iter().zip(scales) {
                let weight = s.sqrt().recip();
                for (x, w) in out.iter_mut().zip(row) {
                    *x += w.re * weight;
                }
            }
            Ok(out.into_iter().map(|x| x * factor + self.mean).collect())
        })
        .map(Vec::as_slice)
    }

    fn psi0_real(&self) -> Result<f64, CwtError> {
        let psi0 = self.kernel().time_domain(0.0, 1.0).re;
        if psi0.abs() < f64::EPSILON {
            return Err(CwtError::invalid(format!(
                "{} vanishes at t = 0, reconstruction is undefined",
                self.kernel().name()
            )));
        }
        Ok(psi0)
    }

    /// Fourier period of `scale` for the current wavelet.
    pub fn fourier_period(&self, scale: f64) -> f64 {
        self.kernel().fourier_period(scale)
    }

    /// Scale whose Fourier period is `period`.
    pub fn scale_from_period(&self, period: f64) -> f64 {
        self.kernel().scale_from_period(period)
    }

    /// Fourier period of every analysis scale.
    ///
    /// # Errors
    ///
    /// Propagates [`WaveletAnalysis::scales`] failures.
    pub fn fourier_periods(&self) -> Result<&[f64], CwtError> {
        get_or_try_init(&self.cache.fourier_periods, || {
            Ok(self
                .scales()?
                .iter()
                .map(|&s| self.fourier_period(s))
                .collect())
        })
        .map(Vec::as_slice)
    }

    /// Cone of influence.
    ///
    /// The trusted scale grows from each edge as distance over the kernel's
    /// e-folding time and saturates at the largest analysis scale.
    ///
    /// # Errors
    ///
    /// Propagates [`WaveletAnalysis::scales`] failures.
    pub fn coi(&self) -> Result<&Coi, CwtError> {
        get_or_try_init(&self.cache.coi, || {
            let max_scale = self.scales()?.last().copied().unwrap_or(0.0);
            let n = self.n();
            let e_fold = self.kernel().coi_e_folding();
            let scales = (0..n)
                .map(|i| {
                    let edge = i.min(n - 1 - i) as f64 * self.config.dt;
                    (edge / e_fold).min(max_scale)
                })
                .collect();
            Ok(Coi {
                times: self.times(),
                scales,
            })
        })
    }

    /// `true` where a transform element lies inside the cone of influence.
    ///
    /// # Errors
    ///
    /// Propagates [`WaveletAnalysis::coi`] failures.
    pub fn coi_mask(&self) -> Result<Array2<bool>, CwtError> {
        let scales = self.scales()?;
        let coi = self.coi()?;
        Ok(Array2::from_shape_fn((scales.len(), self.n()), |(j, i)| {
            scales[j] > coi.scales[i]
        }))
    }

    /// Reconstruction constant `C_d`.
    ///
    /// The kernel's tabulated value, or [`WaveletAnalysis::delta_admissibility`]
    /// when it has none. The fallback is logged once, when first computed.
    ///
    /// # Errors
    ///
    /// Propagates [`WaveletAnalysis::delta_admissibility`] failures.
    pub fn c_d(&self) -> Result<f64, CwtError> {
        match self.kernel().admissibility_constant() {
            Some(c_d) => Ok(c_d),
            None => get_or_try_init(&self.cache.delta_admissibility, || {
                let c_d = self.compute_delta_admissibility()?;
                warn!(kernel = %self.kernel().name(), c_d, "no tabulated C_d, using delta reconstruction");
                Ok(c_d)
            })
            .copied(),
        }
    }

    /// `C_d` obtained by reconstructing a unit impulse on the analysis grid.
    ///
    /// `C_δ = dj·dt^(1/2) / Re ψ₀(0) · Σ_j Re W_δ(s_j) / s_j^(1/2)`.
    ///
    /// # Errors
    ///
    /// [`CwtError::InvalidConfiguration`] if the kernel vanishes at `t = 0`.
    pub fn delta_admissibility(&self) -> Result<f64, CwtError> {
        get_or_try_init(&self.cache.delta_admissibility, || {
            self.compute_delta_admissibility()
        })
        .copied()
    }

    fn compute_delta_admissibility(&self) -> Result<f64, CwtError> {
        let psi0 = self.psi0_real()?;
        let scales = self.scales()?;
        let w_delta = delta_transform(self.kernel(), scales, self.n(), self.config.dt);
        let sum: f64 = w_delta
            .iter()
            .zip(scales)
            .map(|(w, &s)| w.re / s.sqrt())
            .sum();
        Ok(self.config.dj * self.config.dt.sqrt() / psi0 * sum)
    }

    /// Local maxima of the global spectrum, strongest first.
    ///
    /// # Errors
    ///
    /// Propagates [`WaveletAnalysis::global_wavelet_spectrum`] failures.
    pub fn spectral_peaks(&self) -> Result<Vec<SpectralPeak>, CwtError> {
        let spectrum = self.global_wavelet_spectrum()?;
        let scales = self.scales()?;
        Ok(find_peaks(spectrum, scales, self.kernel()))
    }

    /// Changes the scale resolution.
    ///
    /// # Errors
    ///
    /// [`CwtError::InvalidConfiguration`] if `dj` is not finite and positive;
    /// the analysis is left unchanged.
    pub fn set_dj(&mut self, dj: f64) -> Result<(), CwtError> {
        validate_dj(dj)?;
        if dj == self.config.dj {
            return Ok(());
        }
        let scales = compute_scales(self.config.dt, dj, self.n())?;
        self.config.dj = dj;
        self.cache.invalidate(ConfigField::Dj);
        self.cache.scales = OnceCell::from(scales);
        Ok(())
    }

    /// Replaces the mother wavelet.
    pub fn set_wavelet(&mut self, wavelet: impl WaveletKernel + 'static) {
        self.set_kernel(Arc::new(wavelet));
    }

    /// Replaces the mother wavelet with an already shared kernel.
    pub fn set_kernel(&mut self, kernel: Arc<dyn WaveletKernel>) {
        self.config.wavelet = kernel;
        self.cache.invalidate(ConfigField::Wavelet);
    }

    /// Toggles division of the global spectrum by scale.
    pub fn set_unbias(&mut self, unbias: bool) {
        if unbias != self.config.unbias {
            self.config.unbias = unbias;
            self.cache.invalidate(ConfigField::Unbias);
        }
    }

    /// Switches between the frequency-domain and direct convolution engines.
    pub fn set_compute_with_freq(&mut self, compute_with_freq: bool) {
        if compute_with_freq != self.config.compute_with_freq {
            self.config.compute_with_freq = compute_with_freq;
            self.cache.invalidate(ConfigField::ComputeWithFreq);
        }
    }

    /// Returns `true` if `slot` currently holds a memoized value.
    pub fn is_cached(&self, slot: CacheSlot) -> bool {
        self.cache.is_set(slot)
    }
}
