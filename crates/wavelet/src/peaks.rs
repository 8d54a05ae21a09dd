//! Spectral peak identification in the global wavelet spectrum.

use crate::kernel::WaveletKernel;

/// A local maximum of the global wavelet spectrum.
#[derive(Clone, Debug, PartialEq)]
pub struct SpectralPeak {
    /// Index into the scale and spectrum arrays.
    pub index: usize,
    /// Scale at this peak.
    pub scale: f64,
    /// Equivalent Fourier period.
    pub period: f64,
    /// Spectrum value at this peak.
    pub power: f64,
}

/// Strict interior local maxima of `spectrum`, sorted by power descending.
///
/// Ties keep ascending scale order.
pub(crate) fn find_peaks(
    spectrum: &[f64],
    scales: &[f64],
    kernel: &dyn WaveletKernel,
) -> Vec<SpectralPeak> {
    let mut peaks: Vec<SpectralPeak> = scalogram_stats::local_maxima(spectrum)
        .into_iter()
        .filter(|&i| i < scales.len())
        .map(|i| SpectralPeak {
            index: i,
            scale: scales[i],
            period: kernel.fourier_period(scales[i]),
            power: spectrum[i],
        })
        .collect();

    peaks.sort_by(|a, b| b.power.total_cmp(&a.power));
    peaks
}
