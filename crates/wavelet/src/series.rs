//! Validated real signal.

use crate::error::CwtError;

/// Real signal of at least [`TimeSeries::MIN_LEN`] finite samples.
///
/// The mean is computed once at construction; the analysis uses it to
/// centre the transform input and to restore the level of a reconstruction.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeSeries {
    samples: Vec<f64>,
    mean: f64,
}

impl TimeSeries {
    /// Fewest samples a transform can be built from.
    pub const MIN_LEN: usize = 2;

    /// Validates `samples`.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`CwtError::InsufficientData`] | fewer than [`TimeSeries::MIN_LEN`] samples |
    /// | [`CwtError::NonFiniteData`] | a sample is NaN or infinite |
    pub fn new(samples: Vec<f64>) -> Result<Self, CwtError> {
        if samples.len() < Self::MIN_LEN {
            return Err(CwtError::InsufficientData {
                len: samples.len(),
                min: Self::MIN_LEN,
            });
        }
        if let Some(index) = samples.iter().position(|x| !x.is_finite()) {
            tracing::debug!(index, value = samples[index], "rejecting non-finite sample");
            return Err(CwtError::NonFiniteData);
        }
        let mean = scalogram_stats::mean(&samples);
        Ok(Self { samples, mean })
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always `false` for a constructed series.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples with the mean subtracted, paired with that mean.
    pub fn anomaly(&self) -> (Vec<f64>, f64) {
        let centred = self.samples.iter().map(|&x| x - self.mean).collect();
        (centred, self.mean)
    }
}

impl TryFrom<Vec<f64>> for TimeSeries {
    type Error = CwtError;

    fn try_from(samples: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(samples)
    }
}

impl AsRef<[f64]> for TimeSeries {
    fn as_ref(&self) -> &[f64] {
        &self.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn accepts_two_samples() {
        let series = TimeSeries::new(vec![-1.0, 3.0]).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.as_slice(), &[-1.0, 3.0]);
        assert_eq!(series.anomaly(), (vec![-2.0, 2.0], 1.0));
    }

    #[test]
    fn rejects_short_input() {
        for samples in [vec![], vec![4.2]] {
            let len = samples.len();
            match TimeSeries::new(samples) {
                Err(CwtError::InsufficientData { len: got, min }) => {
                    assert_eq!(got, len);
                    assert_eq!(min, TimeSeries::MIN_LEN);
                }
                other => panic!("expected InsufficientData, got {other:?}"),
            }
        }
    }

    #[test]
    fn rejects_non_finite_anywhere() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let samples = vec![0.5, 1.5, bad, 2.5];
            assert!(matches!(
                TimeSeries::try_from(samples),
                Err(CwtError::NonFiniteData)
            ));
        }
    }

    #[test]
    fn anomaly_is_centred() {
        let series = TimeSeries::new(vec![10.0, 12.0, 14.0, 20.0]).unwrap();
        let (centred, mean) = series.anomaly();
        assert_relative_eq!(mean, 14.0);
        assert_eq!(centred, vec![-4.0, -2.0, 0.0, 6.0]);
        assert_relative_eq!(scalogram_stats::mean(&centred), 0.0);
    }

    #[test]
    fn slice_views_agree() {
        let series = TimeSeries::new(vec![1.0, 2.0, 4.0]).unwrap();
        let view: &[f64] = series.as_ref();
        assert_eq!(view, series.as_slice());
        assert!(!series.is_empty());
    }
}
