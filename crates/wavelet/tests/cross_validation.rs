mod common;

use std::f64::consts::PI;
use std::sync::Arc;

use scalogram_wavelet::{
    AnalysisConfig, Dog, Morlet, Paul, WaveletAnalysis, WaveletKernel, compute_scales,
    convolve_same_direct, fft_cwt, ricker, support_points,
};

#[test]
fn ricker_fft_matches_direct_summation() {
    common::init_tracing();
    let data = common::uniform(2000, 42);
    let mut widths = compute_scales(1.0, 0.125, data.len()).unwrap();
    widths.reverse();

    let fast = fft_cwt(&data, ricker, &widths).unwrap();
    assert_eq!(fast.dim(), (widths.len(), data.len()));

    for (row, &width) in widths.iter().enumerate() {
        let kernel = ricker(support_points(width, data.len()), width);
        let direct = convolve_same_direct(&data, &kernel);
        for (i, d) in direct.iter().enumerate() {
            let diff = (fast[[row, i]] - d).norm();
            assert!(
                diff < 1.5e-13,
                "width {width} sample {i}: |fft - direct| = {diff:e}"
            );
        }
    }
}

#[test]
fn rows_follow_caller_width_order() {
    let data = common::uniform(300, 3);
    let ascending = [2.0, 5.0, 11.0];
    let descending = [11.0, 5.0, 2.0];
    let a = fft_cwt(&data, ricker, &ascending).unwrap();
    let d = fft_cwt(&data, ricker, &descending).unwrap();
    for j in 0..3 {
        for i in 0..data.len() {
            assert_eq!(a[[j, i]], d[[2 - j, i]]);
        }
    }
}

/// 40 and 16 whole cycles in 640 samples, so the circular frequency path sees no seam.
fn two_tone(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64;
            (2.0 * PI * t / 16.0).sin() + 0.5 * (2.0 * PI * t / 40.0).cos()
        })
        .collect()
}

/// Largest interior engine difference relative to the peak modulus, over
/// scales of 4 to 32 samples, and the number of points compared.
fn interior_engine_gap(kernel: Arc<dyn WaveletKernel>, dt: f64) -> (f64, usize) {
    let n = 640;
    let config = AnalysisConfig::new().with_dt(dt).with_kernel(kernel);
    let freq = WaveletAnalysis::new(two_tone(n), config.clone()).unwrap();
    let time =
        WaveletAnalysis::new(two_tone(n), config.with_compute_with_freq(false)).unwrap();
    let w_freq = freq.wavelet_transform().unwrap();
    let w_time = time.wavelet_transform().unwrap();
    let peak = w_freq.iter().map(|c| c.norm()).fold(0.0, f64::max);

    let mut worst: f64 = 0.0;
    let mut compared = 0;
    for (j, &s) in freq.scales().unwrap().iter().enumerate() {
        let width = s / dt;
        if !(4.0..=32.0).contains(&width) {
            continue;
        }
        let half = support_points(width, n) / 2;
        for i in (half + 1)..(n - half - 1) {
            worst = worst.max((w_freq[[j, i]] - w_time[[j, i]]).norm());
            compared += 1;
        }
    }
    (worst / peak, compared)
}

#[test]
fn engines_agree_away_from_edges() {
    common::init_tracing();
    let (gap, compared) = interior_engine_gap(Arc::new(Morlet::default()), 1.0);
    assert!(gap < 1e-5, "relative gap {gap:e}");
    assert!(compared > 1000);
}

#[test]
fn engines_agree_for_every_family_at_quarter_step() {
    common::init_tracing();
    // Residual gaps come from truncating the time-domain kernel at ±5 scales;
    // Paul decays polynomially and keeps the most
    let cases: [(Arc<dyn WaveletKernel>, f64); 4] = [
        (Arc::new(Morlet::default()), 1e-5),
        (Arc::new(Dog::ricker()), 1e-4),
        (Arc::new(Dog::new(3).unwrap()), 3e-4),
        (Arc::new(Paul::default()), 1e-3),
    ];
    for (kernel, tolerance) in cases {
        let name = kernel.name();
        let (gap, compared) = interior_engine_gap(kernel, 0.25);
        assert!(gap < tolerance, "{name}: relative gap {gap:e}");
        assert!(compared > 1000, "{name}: compared {compared}");
    }
}
