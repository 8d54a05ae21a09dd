//! Deserializable analysis settings.
//!
//! ```toml
//! dt = 0.25
//! dj = 0.0625
//! wavelet = "paul4"
//! unbias = false
//! ```

use serde::Deserialize;

use crate::analysis::AnalysisConfig;
use crate::error::CwtError;
use crate::kernel::Wavelet;

/// Plain-data form of [`AnalysisConfig`], with the wavelet given by name.
///
/// Convert with `AnalysisConfig::try_from(settings)`, which parses the
/// wavelet name and validates `dt` and `dj`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AnalysisSettings {
    #[serde(default = "default_dt")]
    pub dt: f64,
    #[serde(default = "default_dj")]
    pub dj: f64,
    /// Name accepted by [`Wavelet::from_name`].
    #[serde(default = "default_wavelet")]
    pub wavelet: String,
    #[serde(default = "default_true")]
    pub unbias: bool,
    #[serde(default = "default_true")]
    pub compute_with_freq: bool,
    #[serde(default = "default_true")]
    pub remove_mean: bool,
}

fn default_dt() -> f64 {
    1.0
}

fn default_dj() -> f64 {
    0.125
}

fn default_wavelet() -> String {
    "morlet".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            dt: default_dt(),
            dj: default_dj(),
            wavelet: default_wavelet(),
            unbias: true,
            compute_with_freq: true,
            remove_mean: true,
        }
    }
}

impl TryFrom<AnalysisSettings> for AnalysisConfig {
    type Error = CwtError;

    fn try_from(settings: AnalysisSettings) -> Result<Self, Self::Error> {
        crate::scales::validate_dt(settings.dt)?;
        crate::scales::validate_dj(settings.dj)?;
        let wavelet = Wavelet::from_name(&settings.wavelet)?;
        Ok(AnalysisConfig::new()
            .with_dt(settings.dt)
            .with_dj(settings.dj)
            .with_wavelet(wavelet)
            .with_unbias(settings.unbias)
            .with_compute_with_freq(settings.compute_with_freq)
            .with_remove_mean(settings.remove_mean))
    }
}
