//! Mother wavelet kernels.
//!
//! Each kernel is described by its time-domain shape ψ₀(η) at the
//! dimensionless time η = t/s and its Fourier transform ψ̂₀(s·ω), using the
//! convention ψ̂₀(ω) = (2π)^(-1/2) ∫ψ₀(t)e^(-iωt)dt. Neither carries the
//! per-scale energy normalization; the convolution engines apply it.
//!
//! Constants follow Torrence & Compo (1998), Table 1 and Table 2.

use num_complex::Complex64;
use std::f64::consts::{PI, SQRT_2};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::CwtError;

/// Largest derivative / polynomial order accepted for DOG and Paul kernels.
pub const MAX_ORDER: u32 = 30;

/// Capability set shared by every mother wavelet.
///
/// New kernels are added by implementing this trait; the analysis never
/// inspects kernel names.
pub trait WaveletKernel: fmt::Debug + Send + Sync {
    /// Short human-readable name, e.g. `"morlet(w0=6)"`.
    fn name(&self) -> String;

    /// Mother wavelet value at `t / scale`.
    fn time_domain(&self, t: f64, scale: f64) -> Complex64;

    /// Fourier transform of the mother wavelet at `scale * omega`.
    fn frequency_domain(&self, omega: f64, scale: f64) -> Complex64;

    /// Factor converting a scale into its equivalent Fourier period.
    fn flambda(&self) -> f64;

    /// E-folding time of the wavelet power at an edge, in scale units.
    fn coi_e_folding(&self) -> f64;

    /// Tabulated reconstruction constant `C_d`, when one is known.
    fn admissibility_constant(&self) -> Option<f64>;

    /// Fourier period corresponding to `scale`.
    fn fourier_period(&self, scale: f64) -> f64 {
        scale * self.flambda()
    }

    /// Scale whose Fourier period is `period`.
    fn scale_from_period(&self, period: f64) -> f64 {
        period / self.flambda()
    }
}

/// Returns `i^m`.
fn i_pow(m: u32) -> Complex64 {
    match m % 4 {
        0 => Complex64::new(1.0, 0.0),
        1 => Complex64::new(0.0, 1.0),
        2 => Complex64::new(-1.0, 0.0),
        _ => Complex64::new(0.0, -1.0),
    }
}

fn factorial(n: u32) -> f64 {
    (1..=n).map(f64::from).product()
}

/// `Γ(m + 1/2)`, built up from `Γ(1/2) = √π`.
fn gamma_half(m: u32) -> f64 {
    (1..=m).fold(PI.sqrt(), |g, k| g * (f64::from(k) - 0.5))
}

/// Probabilists' Hermite polynomial `He_m(x)`.
fn hermite(m: u32, x: f64) -> f64 {
    let mut prev = 1.0;
    if m == 0 {
        return prev;
    }
    let mut curr = x;
    for n in 1..m {
        let next = x * curr - f64::from(n) * prev;
        prev = curr;
        curr = next;
    }
    curr
}

fn validate_order(family: &str, order: u32) -> Result<(), CwtError> {
    if order == 0 || order > MAX_ORDER {
        return Err(CwtError::invalid(format!(
            "{family} order must be in 1..={MAX_ORDER}, got {order}"
        )));
    }
    Ok(())
}

/// Morlet wavelet: a plane wave modulated by a Gaussian.
///
/// ψ₀(η) = π^(-1/4) e^(i·w0·η) e^(-η²/2). The Fourier transform is taken as
/// analytic (zero for non-positive frequency).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Morlet {
    w0: f64,
}

impl Morlet {
    /// Non-dimensional frequency giving the tabulated `C_d = 0.776`.
    pub const DEFAULT_W0: f64 = 6.0;

    /// Creates a Morlet wavelet with non-dimensional frequency `w0`.
    ///
    /// # Errors
    ///
    /// Returns [`CwtError::InvalidConfiguration`] if `w0` is not finite and positive.
    pub fn new(w0: f64) -> Result<Self, CwtError> {
        if !w0.is_finite() || w0 <= 0.0 {
            return Err(CwtError::invalid(format!(
                "morlet w0 must be finite and > 0, got {w0}"
            )));
        }
        Ok(Self { w0 })
    }

    /// Returns the non-dimensional frequency.
    pub fn w0(&self) -> f64 {
        self.w0
    }
}

impl Default for Morlet {
    fn default() -> Self {
        Self {
            w0: Self::DEFAULT_W0,
        }
    }
}

impl WaveletKernel for Morlet {
    fn name(&self) -> String {
        format!("morlet(w0={})", self.w0)
    }

    fn time_domain(&self, t: f64, scale: f64) -> Complex64 {
        let x = t / scale;
        Complex64::from_polar(PI.powf(-0.25) * (-0.5 * x * x).exp(), self.w0 * x)
    }

    fn frequency_domain(&self, omega: f64, scale: f64) -> Complex64 {
        if omega <= 0.0 {
            return Complex64::new(0.0, 0.0);
        }
        let x = scale * omega - self.w0;
        Complex64::new(PI.powf(-0.25) * (-0.5 * x * x).exp(), 0.0)
    }

    fn flambda(&self) -> f64 {
        4.0 * PI / (self.w0 + (2.0 + self.w0 * self.w0).sqrt())
    }

    fn coi_e_folding(&self) -> f64 {
        SQRT_2
    }

    fn admissibility_constant(&self) -> Option<f64> {
        ((self.w0 - Self::DEFAULT_W0).abs() < 1e-12).then_some(0.776)
    }
}

/// Derivative of Gaussian (DOG) wavelet of order `m`.
///
/// ψ₀(η) = -He_m(η) e^(-η²/2) / √Γ(m + 1/2). Order 2 is the Ricker
/// ("Mexican hat") wavelet. Real-valued in time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Dog {
    order: u32,
}

impl Dog {
    /// Creates a DOG wavelet of the given derivative order.
    ///
    /// # Errors
    ///
    /// Returns [`CwtError::InvalidConfiguration`] if `order` is 0 or above [`MAX_ORDER`].
    pub fn new(order: u32) -> Result<Self, CwtError> {
        validate_order("dog", order)?;
        Ok(Self { order })
    }

    /// The Ricker wavelet (DOG of order 2).
    pub fn ricker() -> Self {
        Self { order: 2 }
    }

    /// Returns the derivative order.
    pub fn order(&self) -> u32 {
        self.order
    }

    fn norm(&self) -> f64 {
        1.0 / gamma_half(self.order).sqrt()
    }
}

impl WaveletKernel for Dog {
    fn name(&self) -> String {
        format!("dog(m={})", self.order)
    }

    fn time_domain(&self, t: f64, scale: f64) -> Complex64 {
        let x = t / scale;
        let value = -hermite(self.order, x) * (-0.5 * x * x).exp() * self.norm();
        Complex64::new(value, 0.0)
    }

    fn frequency_domain(&self, omega: f64, scale: f64) -> Complex64 {
        let m = self.order;
        let x = scale * omega;
        let sign = if m % 2 == 0 { -1.0 } else { 1.0 };
        i_pow(m) * (sign * x.powi(m as i32) * (-0.5 * x * x).exp() * self.norm())
    }

    fn flambda(&self) -> f64 {
        2.0 * PI / (f64::from(self.order) + 0.5).sqrt()
    }

    fn coi_e_folding(&self) -> f64 {
        SQRT_2
    }

    fn admissibility_constant(&self) -> Option<f64> {
        match self.order {
            2 => Some(3.541),
            6 => Some(1.966),
            _ => None,
        }
    }
}

/// Paul wavelet of order `m`.
///
/// ψ₀(η) = 2^m i^m m! / √(π(2m)!) · (1 - iη)^(-(m+1)). Analytic, with
/// polynomial rather than Gaussian decay in time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Paul {
    order: u32,
}

impl Paul {
    /// Order with a tabulated `C_d`.
    pub const DEFAULT_ORDER: u32 = 4;

    /// Creates a Paul wavelet of the given order.
    ///
    /// # Errors
    ///
    /// Returns [`CwtError::InvalidConfiguration`] if `order` is 0 or above [`MAX_ORDER`].
    pub fn new(order: u32) -> Result<Self, CwtError> {
        validate_order("paul", order)?;
        Ok(Self { order })
    }

    /// Returns the order.
    pub fn order(&self) -> u32 {
        self.order
    }
}

impl Default for Paul {
    fn default() -> Self {
        Self {
            order: Self::DEFAULT_ORDER,
        }
    }
}

impl WaveletKernel for Paul {
    fn name(&self) -> String {
        format!("paul(m={})", self.order)
    }

    fn time_domain(&self, t: f64, scale: f64) -> Complex64 {
        let m = self.order;
        let x = t / scale;
        let norm = 2f64.powi(m as i32) * factorial(m) / (PI * factorial(2 * m)).sqrt();
        i_pow(m) * norm * Complex64::new(1.0, -x).powu(m + 1).inv()
    }

    fn frequency_domain(&self, omega: f64, scale: f64) -> Complex64 {
        if omega <= 0.0 {
            return Complex64::new(0.0, 0.0);
        }
        let m = self.order;
        let x = scale * omega;
        let norm = 2f64.powi(m as i32) / (f64::from(m) * factorial(2 * m - 1)).sqrt();
        i_pow(m) * (norm * x.powi(m as i32) * (-x).exp())
    }

    fn flambda(&self) -> f64 {
        4.0 * PI / (2.0 * f64::from(self.order) + 1.0)
    }

    fn coi_e_folding(&self) -> f64 {
        1.0 / SQRT_2
    }

    fn admissibility_constant(&self) -> Option<f64> {
        (self.order == Self::DEFAULT_ORDER).then_some(1.132)
    }
}

/// Built-in kernel families, selectable by name.
///
/// # Example
///
/// ```ignore
/// use scalogram_wavelet::Wavelet;
///
/// let ricker = Wavelet::from_name("ricker")?;
/// let dog6 = Wavelet::from_name("DOG6")?;
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Wavelet {
    /// [`Morlet`] wavelet.
    Morlet(Morlet),
    /// [`Dog`] wavelet (including Ricker).
    Dog(Dog),
    /// [`Paul`] wavelet.
    Paul(Paul),
}

impl Default for Wavelet {
    /// Returns the Morlet wavelet with `w0 = 6`.
    fn default() -> Self {
        Self::Morlet(Morlet::default())
    }
}

impl Wavelet {
    /// Parses a kernel from a case-insensitive name string.
    ///
    /// # Supported Names
    ///
    /// | Input | Kernel |
    /// |-------|--------|
    /// | `"morlet"` | [`Morlet`] with `w0 = 6` |
    /// | `"ricker"`, `"mexican_hat"`, `"dog"` | [`Dog`] of order 2 |
    /// | `"dog<m>"` | [`Dog`] of order `m` |
    /// | `"paul"` | [`Paul`] of order 4 |
    /// | `"paul<m>"` | [`Paul`] of order `m` |
    ///
    /// # Errors
    ///
    /// Returns [`CwtError::InvalidConfiguration`] if the name is not recognized
    /// or the order is out of range.
    pub fn from_name(name: &str) -> Result<Self, CwtError> {
        let lower = name.trim().to_lowercase();
        match lower.as_str() {
            "morlet" => return Ok(Self::Morlet(Morlet::default())),
            "ricker" | "mexican_hat" | "dog" => return Ok(Self::Dog(Dog::ricker())),
            "paul" => return Ok(Self::Paul(Paul::default())),
            _ => {}
        }
        if let Some(order) = lower.strip_prefix("dog") {
            return Ok(Self::Dog(Dog::new(parse_order(name, order)?)?));
        }
        if let Some(order) = lower.strip_prefix("paul") {
            return Ok(Self::Paul(Paul::new(parse_order(name, order)?)?));
        }
        Err(unsupported(name))
    }

    /// Wraps the kernel for sharing with an analysis.
    pub fn into_kernel(self) -> Arc<dyn WaveletKernel> {
        match self {
            Self::Morlet(k) => Arc::new(k),
            Self::Dog(k) => Arc::new(k),
            Self::Paul(k) => Arc::new(k),
        }
    }

    fn inner(&self) -> &dyn WaveletKernel {
        match self {
            Self::Morlet(k) => k,
            Self::Dog(k) => k,
            Self::Paul(k) => k,
        }
    }
}

fn unsupported(name: &str) -> CwtError {
    CwtError::invalid(format!("unsupported wavelet: {name}"))
}

fn parse_order(name: &str, digits: &str) -> Result<u32, CwtError> {
    digits.parse::<u32>().map_err(|_| unsupported(name))
}

impl FromStr for Wavelet {
    type Err = CwtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

impl fmt::Display for Wavelet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl WaveletKernel for Wavelet {
    fn name(&self) -> String {
        self.inner().name()
    }

    fn time_domain(&self, t: f64, scale: f64) -> Complex64 {
        self.inner().time_domain(t, scale)
    }

    fn frequency_domain(&self, omega: f64, scale: f64) -> Complex64 {
        self.inner().frequency_domain(omega, scale)
    }

    fn flambda(&self) -> f64 {
        self.inner().flambda()
    }

    fn coi_e_folding(&self) -> f64 {
        self.inner().coi_e_folding()
    }

    fn admissibility_constant(&self) -> Option<f64> {
        self.inner().admissibility_constant()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    /// Riemann sum of `|f(t)|^2` over a wide symmetric window.
    fn time_energy(kernel: &dyn WaveletKernel) -> f64 {
        let h = 1e-3;
        (-40_000..=40_000)
            .map(|i| kernel.time_domain(i as f64 * h, 1.0).norm_sqr() * h)
            .sum()
    }

    /// Riemann sum of `|f(w)|^2` over `[-40, 40]`.
    fn frequency_energy(kernel: &dyn WaveletKernel) -> f64 {
        let h = 1e-3;
        (-40_000..=40_000)
            .map(|i| kernel.frequency_domain(i as f64 * h, 1.0).norm_sqr() * h)
            .sum()
    }

    #[test]
    fn gamma_half_values() {
        assert_relative_eq!(gamma_half(0), PI.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(gamma_half(2), 0.75 * PI.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn hermite_values() {
        assert_relative_eq!(hermite(0, 1.5), 1.0);
        assert_relative_eq!(hermite(1, 1.5), 1.5);
        // He_2 = x^2 - 1, He_3 = x^3 - 3x
        assert_relative_eq!(hermite(2, 1.5), 1.25, epsilon = 1e-12);
        assert_relative_eq!(hermite(3, 1.5), 3.375 - 4.5, epsilon = 1e-12);
    }

    #[test]
    fn morlet_default_constants() {
        let m = Morlet::default();
        assert_relative_eq!(m.w0(), 6.0);
        assert_relative_eq!(m.flambda(), 1.0330, epsilon = 1e-4);
        assert_relative_eq!(m.coi_e_folding(), SQRT_2);
        assert_abs_diff_eq!(m.admissibility_constant().unwrap(), 0.776, epsilon = 0.01);
        assert_relative_eq!(m.time_domain(0.0, 1.0).re, PI.powf(-0.25), epsilon = 1e-12);
    }

    #[test]
    fn morlet_other_w0_has_no_table_value() {
        let m = Morlet::new(8.0).unwrap();
        assert!(m.admissibility_constant().is_none());
    }

    #[test]
    fn morlet_rejects_bad_w0() {
        assert!(matches!(
            Morlet::new(0.0),
            Err(CwtError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            Morlet::new(f64::NAN),
            Err(CwtError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn morlet_frequency_is_analytic() {
        let m = Morlet::default();
        assert_eq!(m.frequency_domain(-1.0, 2.0), Complex64::new(0.0, 0.0));
        assert_eq!(m.frequency_domain(0.0, 2.0), Complex64::new(0.0, 0.0));
        // Peak at s * w = w0
        let peak = m.frequency_domain(3.0, 2.0).re;
        assert_relative_eq!(peak, PI.powf(-0.25), epsilon = 1e-12);
        assert!(m.frequency_domain(2.5, 2.0).re < peak);
    }

    #[test]
    fn unit_energy_kernels() {
        let kernels: Vec<Box<dyn WaveletKernel>> = vec![
            Box::new(Morlet::default()),
            Box::new(Dog::ricker()),
            Box::new(Dog::new(6).unwrap()),
            Box::new(Paul::default()),
        ];
        for kernel in &kernels {
            let et = time_energy(kernel.as_ref());
            let ef = frequency_energy(kernel.as_ref());
            assert_abs_diff_eq!(et, 1.0, epsilon = 1e-3);
            assert_abs_diff_eq!(ef, 1.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn ricker_shape() {
        let r = Dog::ricker();
        // 2 / (sqrt(3) * pi^(1/4))
        assert_relative_eq!(r.time_domain(0.0, 1.0).re, 0.867325, epsilon = 1e-5);
        assert_abs_diff_eq!(r.time_domain(1.0, 1.0).re, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(r.time_domain(0.3, 1.0).im, 0.0);
        assert_relative_eq!(
            r.time_domain(0.7, 1.0).re,
            r.time_domain(-0.7, 1.0).re,
            epsilon = 1e-12
        );
        assert_relative_eq!(r.flambda(), 2.0 * PI / 2.5_f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(r.admissibility_constant().unwrap(), 3.541);
    }

    #[test]
    fn dog_frequency_is_real_for_even_order() {
        let d = Dog::new(6).unwrap();
        let v = d.frequency_domain(1.3, 1.0);
        assert!(v.re > 0.0);
        assert_abs_diff_eq!(v.im, 0.0);
    }

    #[test]
    fn dog_rejects_bad_order() {
        assert!(Dog::new(0).is_err());
        assert!(Dog::new(MAX_ORDER + 1).is_err());
    }

    #[test]
    fn paul_constants() {
        let p = Paul::default();
        assert_relative_eq!(p.time_domain(0.0, 1.0).re, 1.079, epsilon = 1e-3);
        assert_relative_eq!(p.flambda(), 4.0 * PI / 9.0, epsilon = 1e-12);
        assert_relative_eq!(p.coi_e_folding(), 1.0 / SQRT_2, epsilon = 1e-12);
        assert_relative_eq!(p.admissibility_constant().unwrap(), 1.132);
        assert_eq!(p.frequency_domain(-2.0, 1.0), Complex64::new(0.0, 0.0));
    }

    #[test]
    fn period_scale_round_trip() {
        let m = Morlet::default();
        let s = m.scale_from_period(m.fourier_period(12.5));
        assert_relative_eq!(s, 12.5, epsilon = 1e-12);
    }

    #[test]
    fn from_name_valid() {
        assert_eq!(
            Wavelet::from_name("morlet").unwrap(),
            Wavelet::Morlet(Morlet::default())
        );
        assert_eq!(
            Wavelet::from_name("Ricker").unwrap(),
            Wavelet::Dog(Dog::ricker())
        );
        assert_eq!(
            Wavelet::from_name("mexican_hat").unwrap(),
            Wavelet::Dog(Dog::ricker())
        );
        assert_eq!(
            Wavelet::from_name("DOG6").unwrap(),
            Wavelet::Dog(Dog::new(6).unwrap())
        );
        assert_eq!(
            Wavelet::from_name("paul").unwrap(),
            Wavelet::Paul(Paul::default())
        );
        assert_eq!(
            Wavelet::from_name("paul2").unwrap(),
            Wavelet::Paul(Paul::new(2).unwrap())
        );
        assert_eq!("morlet".parse::<Wavelet>().unwrap(), Wavelet::default());
    }

    #[test]
    fn from_name_invalid() {
        let err = Wavelet::from_name("haar").unwrap_err();
        assert!(matches!(err, CwtError::InvalidConfiguration(ref s) if s == "unsupported wavelet: haar"));
        assert!(Wavelet::from_name("dogx").is_err());
        assert!(Wavelet::from_name("dog0").is_err());
    }

    #[test]
    fn wavelet_delegates() {
        let w = Wavelet::from_name("ricker").unwrap();
        let d = Dog::ricker();
        assert_eq!(w.name(), d.name());
        assert_eq!(w.to_string(), "dog(m=2)");
        assert_relative_eq!(w.flambda(), d.flambda());
        assert_eq!(w.time_domain(0.4, 2.0), d.time_domain(0.4, 2.0));
        let k = w.into_kernel();
        assert_relative_eq!(k.flambda(), d.flambda());
    }

    #[test]
    fn kernels_are_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<Morlet>();
        assert_impl::<Dog>();
        assert_impl::<Paul>();
        assert_impl::<Wavelet>();
    }
}
