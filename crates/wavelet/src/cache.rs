//! Dependency-tagged memo table for derived analysis values.
//!
//! Every slot names the configuration fields it is computed from. Changing
//! a field clears only the slots that depend on it.

use std::cell::OnceCell;

use ndarray::Array2;
use num_complex::Complex64;
use tracing::trace;

use crate::analysis::Coi;

/// Mutable configuration fields of a live analysis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[deny(missing_docs)]
pub enum ConfigField {
    /// Sub-octave scale resolution.
    Dj,
    /// Mother wavelet kernel.
    Wavelet,
    /// Scale division of the global spectrum.
    Unbias,
    /// Engine selection.
    ComputeWithFreq,
}

/// Memoized quantities of a [`WaveletAnalysis`](crate::WaveletAnalysis).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[deny(missing_docs)]
pub enum CacheSlot {
    /// Analysis scales `s0·2^(j·dj)`.
    Scales,
    /// Complex transform matrix.
    Transform,
    /// `|W|²`.
    Power,
    /// Time-averaged power per scale.
    GlobalSpectrum,
    /// Global spectrum restricted to samples outside the cone of influence.
    MaskedGlobalSpectrum,
    /// Inverse transform of the signal.
    Reconstruction,
    /// Variance recovered from the power.
    WaveletVariance,
    /// Equivalent Fourier period of each scale.
    FourierPeriods,
    /// Cone-of-influence boundary.
    Coi,
    /// `C_d` from impulse reconstruction.
    DeltaAdmissibility,
}

impl CacheSlot {
    /// Every slot, in declaration order.
    pub const ALL: [CacheSlot; 10] = [
        CacheSlot::Scales,
        CacheSlot::Transform,
        CacheSlot::Power,
        CacheSlot::GlobalSpectrum,
        CacheSlot::MaskedGlobalSpectrum,
        CacheSlot::Reconstruction,
        CacheSlot::WaveletVariance,
        CacheSlot::FourierPeriods,
        CacheSlot::Coi,
        CacheSlot::DeltaAdmissibility,
    ];

    /// Configuration fields the slot's value is computed from.
    pub fn dependencies(self) -> &'static [ConfigField] {
        use ConfigField::*;
        match self {
            CacheSlot::Scales => &[Dj],
            CacheSlot::Transform
            | CacheSlot::Power
            | CacheSlot::Reconstruction
            | CacheSlot::WaveletVariance => &[Dj, Wavelet, ComputeWithFreq],
            CacheSlot::GlobalSpectrum | CacheSlot::MaskedGlobalSpectrum => {
                &[Dj, Wavelet, Unbias, ComputeWithFreq]
            }
            CacheSlot::FourierPeriods | CacheSlot::Coi | CacheSlot::DeltaAdmissibility => {
                &[Dj, Wavelet]
            }
        }
    }

    /// Returns `true` if a change to `field` invalidates this slot.
    pub fn depends_on(self, field: ConfigField) -> bool {
        self.dependencies().contains(&field)
    }
}

/// One write-once cell per [`CacheSlot`].
#[derive(Debug, Default)]
pub(crate) struct MemoTable {
    pub(crate) scales: OnceCell<Vec<f64>>,
    pub(crate) transform: OnceCell<Array2<Complex64>>,
    pub(crate) power: OnceCell<Array2<f64>>,
    pub(crate) global_spectrum: OnceCell<Vec<f64>>,
    pub(crate) masked_global_spectrum: OnceCell<Vec<f64>>,
    pub(crate) reconstruction: OnceCell<Vec<f64>>,
    pub(crate) wavelet_variance: OnceCell<f64>,
    pub(crate) fourier_periods: OnceCell<Vec<f64>>,
    pub(crate) coi: OnceCell<Coi>,
    pub(crate) delta_admissibility: OnceCell<f64>,
}

impl MemoTable {
    pub(crate) fn is_set(&self, slot: CacheSlot) -> bool {
        match slot {
            CacheSlot::Scales => self.scales.get().is_some(),
            CacheSlot::Transform => self.transform.get().is_some(),
            CacheSlot::Power => self.power.get().is_some(),
            CacheSlot::GlobalSpectrum => self.global_spectrum.get().is_some(),
            CacheSlot::MaskedGlobalSpectrum => self.masked_global_spectrum.get().is_some(),
            CacheSlot::Reconstruction => self.reconstruction.get().is_some(),
            CacheSlot::WaveletVariance => self.wavelet_variance.get().is_some(),
            CacheSlot::FourierPeriods => self.fourier_periods.get().is_some(),
            CacheSlot::Coi => self.coi.get().is_some(),
            CacheSlot::DeltaAdmissibility => self.delta_admissibility.get().is_some(),
        }
    }

    fn clear(&mut self, slot: CacheSlot) {
        match slot {
            CacheSlot::Scales => drop(self.scales.take()),
            CacheSlot::Transform => drop(self.transform.take()),
            CacheSlot::Power => drop(self.power.take()),
            CacheSlot::GlobalSpectrum => drop(self.global_spectrum.take()),
            CacheSlot::MaskedGlobalSpectrum => drop(self.masked_global_spectrum.take()),
            CacheSlot::Reconstruction => drop(self.reconstruction.take()),
            CacheSlot::WaveletVariance => drop(self.wavelet_variance.take()),
            CacheSlot::FourierPeriods => drop(self.fourier_periods.take()),
            CacheSlot::Coi => drop(self.coi.take()),
            CacheSlot::DeltaAdmissibility => drop(self.delta_admissibility.take()),
        }
    }

    /// Clears every slot depending on `field`. Returns how many held a value.
    pub(crate) fn invalidate(&mut self, field: ConfigField) -> usize {
        let mut cleared = 0;
        for slot in CacheSlot::ALL {
            if slot.depends_on(field) && self.is_set(slot) {
                self.clear(slot);
                cleared += 1;
            }
        }
        trace!(?field, cleared, "invalidated cache");
        cleared
    }
}

/// Returns the cached value, computing and storing it on first access.
///
/// A failed computation leaves the cell empty.
pub(crate) fn get_or_try_init<T, E>(
    cell: &OnceCell<T>,
    init: impl FnOnce() -> Result<T, E>,
) -> Result<&T, E> {
    if let Some(value) = cell.get() {
        return Ok(value);
    }
    let value = init()?;
    Ok(cell.get_or_init(|| value))
}
