mod common;

use std::f64::consts::PI;

use approx::assert_relative_eq;
use scalogram_wavelet::{AnalysisConfig, CacheSlot, WaveletAnalysis};

const PERIODS: [f64; 3] = [20.0, 100.0, 500.0];

fn three_cosines() -> WaveletAnalysis {
    let data: Vec<f64> = (0..5000)
        .map(|i| {
            let t = i as f64;
            PERIODS.iter().map(|p| (2.0 * PI * t / p).cos()).sum()
        })
        .collect();
    WaveletAnalysis::new(data, AnalysisConfig::new()).unwrap()
}

#[test]
fn unbiased_peaks_are_comparable() {
    common::init_tracing();
    let wa = three_cosines();
    let gws = wa.global_wavelet_spectrum().unwrap();
    let periods = wa.fourier_periods().unwrap();

    let mut heights = Vec::new();
    for target in PERIODS {
        let (j, height) = periods
            .iter()
            .enumerate()
            .filter(|&(_, p)| (p / target - 1.0).abs() < 0.15)
            .map(|(j, _)| (j, gws[j]))
            .fold((0, f64::MIN), |best, cur| if cur.1 > best.1 { cur } else { best });
        assert!(
            gws[j] > gws[j - 1] && gws[j] > gws[j + 1],
            "no local maximum near period {target}"
        );
        heights.push(height);
    }
    let max = heights.iter().cloned().fold(f64::MIN, f64::max);
    let min = heights.iter().cloned().fold(f64::MAX, f64::min);
    assert!(max / min < 1.3, "peak heights {heights:?}");

    let top: Vec<f64> = wa
        .spectral_peaks()
        .unwrap()
        .iter()
        .take(3)
        .map(|p| p.period)
        .collect();
    for target in PERIODS {
        assert!(
            top.iter().any(|p| (p / target - 1.0).abs() < 0.15),
            "period {target} missing from strongest peaks {top:?}"
        );
    }
}

#[test]
fn biased_spectrum_differs_by_scale() {
    let mut wa = three_cosines();
    let unbiased = wa.global_wavelet_spectrum().unwrap().to_vec();
    wa.set_unbias(false);
    assert!(wa.is_cached(CacheSlot::Transform));

    let biased = wa.global_wavelet_spectrum().unwrap();
    let scales = wa.scales().unwrap();
    for ((b, u), s) in biased.iter().zip(&unbiased).zip(scales) {
        assert_relative_eq!(*b, u * s, max_relative = 1e-12);
    }
}
