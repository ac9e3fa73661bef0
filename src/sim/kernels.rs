//! SPH smoothing kernels
//!
//! All kernels are zero at and beyond the support radius `h`.

use std::f64::consts::PI;

/// Poly6 kernel for density estimation.
/// W(r, h) = (315 / 64πh⁹) * (h² - r²)³ for r < h
#[inline]
pub fn poly6(r: f64, h: f64) -> f64 {
    if r >= h {
        return 0.0;
    }
    let diff = h * h - r * r;
    315.0 / (64.0 * PI * h.powi(9)) * diff * diff * diff
}

/// Magnitude of the Spiky kernel gradient, for pressure.
/// ∇W(r, h) = -(45 / πh⁵) * (h - r)² for r < h
#[inline]
pub fn spiky_gradient(r: f64, h: f64) -> f64 {
    if r >= h {
        return 0.0;
    }
    let diff = h - r;
    -45.0 / (PI * h.powi(5)) * diff * diff
}

/// Laplacian of the viscosity kernel.
/// ∇²W(r, h) = (45 / πh⁶) * (h - r) for r < h
#[inline]
pub fn viscosity_laplacian(r: f64, h: f64) -> f64 {
    if r >= h {
        return 0.0;
    }
    45.0 / (PI * h.powi(6)) * (h - r)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernels_vanish_at_support() {
        for h in [0.5, 1.0, 2.0] {
            assert_eq!(poly6(h, h), 0.0);
            assert_eq!(spiky_gradient(h, h), 0.0);
            assert_eq!(viscosity_laplacian(h, h), 0.0);
            assert_eq!(poly6(h * 1.5, h), 0.0);
        }
    }

    #[test]
    fn test_poly6_peak() {
        let h = 1.0;
        assert!((poly6(0.0, h) - 315.0 / (64.0 * PI)).abs() < 1e-12);
        assert!(poly6(0.2, h) > poly6(0.6, h));
    }

    #[test]
    fn test_poly6_integrates_to_one() {
        // ∫ W 4πr² dr over [0, h]
        let h = 1.3;
        let steps = 20_000;
        let dr = h / steps as f64;
        let total: f64 = (0..steps)
            .map(|i| {
                let r = (i as f64 + 0.5) * dr;
                poly6(r, h) * 4.0 * PI * r * r * dr
            })
            .sum();
        assert!((total - 1.0).abs() < 1e-3, "integral = {}", total);
    }

    #[test]
    fn test_spiky_gradient_is_repulsive() {
        assert!(spiky_gradient(0.3, 1.0) < 0.0);
        assert!(spiky_gradient(0.1, 1.0) < spiky_gradient(0.5, 1.0));
    }

    #[test]
    fn test_viscosity_laplacian_positive() {
        assert!(viscosity_laplacian(0.0, 1.0) > viscosity_laplacian(0.9, 1.0));
        assert!(viscosity_laplacian(0.9, 1.0) > 0.0);
    }
}
