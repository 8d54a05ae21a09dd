//! # scalogram-wavelet
//!
//! Continuous wavelet transform analysis of real signals, following
//! Torrence & Compo (1998).
//!
//! ## Analysis Pipeline
//!
//! ```mermaid
//! graph LR
//!     A["WaveletAnalysis::new(data, config)?"] -->|"scales()"| B["s0 · 2^(j·dj)"]
//!     B -->|"compute_with_freq"| C["cwt_freq"]
//!     B -->|"!compute_with_freq"| D["cwt_time / fft_cwt"]
//!     C --> E["wavelet_transform()"]
//!     D --> E
//!     E --> F[".wavelet_power()"]
//!     F --> G[".global_wavelet_spectrum()"]
//!     E --> H[".reconstruction()"]
//!     F --> I[".wavelet_variance()"]
//! ```
//!
//! ## Supported Wavelets
//!
//! | Kernel | Name | Tabulated `C_d` | e-folding |
//! |--------|------|-----------------|-----------|
//! | [`Morlet`] | `"morlet"` | 0.776 (`w0 = 6`) | √2 |
//! | [`Dog`] | `"ricker"`, `"dog<m>"` | 3.541 (m = 2), 1.966 (m = 6) | √2 |
//! | [`Paul`] | `"paul"`, `"paul<m>"` | 1.132 (m = 4) | 1/√2 |
//!
//! Kernels without a tabulated `C_d` use the value obtained by
//! reconstructing a unit impulse on the analysis grid.
//!
//! ## Quick Start
//!
//! ```ignore
//! use scalogram_wavelet::{AnalysisConfig, WaveletAnalysis};
//!
//! let wa = WaveletAnalysis::new(data, AnalysisConfig::new().with_dt(0.25))?;
//! let gws = wa.global_wavelet_spectrum()?;
//! let coi = wa.coi()?;
//!
//! for peak in wa.spectral_peaks()? {
//!     println!("period = {:.1}, power = {:.3}", peak.period, peak.power);
//! }
//! ```

mod analysis;
mod cache;
mod convolve;
mod error;
mod freq;
mod kernel;
mod peaks;
mod scales;
mod series;
mod settings;

pub use analysis::{AnalysisConfig, Coi, WaveletAnalysis};
pub use cache::{CacheSlot, ConfigField};
pub use convolve::{SUPPORT_FACTOR, convolve_same_direct, cwt_time, fft_cwt, ricker, support_points};
pub use error::CwtError;
pub use freq::{ALIAS_IMAGES, angular_frequencies, cwt_freq};
pub use kernel::{Dog, MAX_ORDER, Morlet, Paul, Wavelet, WaveletKernel};
pub use peaks::SpectralPeak;
pub use scales::{compute_scales, smallest_scale};
pub use series::TimeSeries;
pub use settings::AnalysisSettings;
