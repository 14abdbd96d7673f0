// SPDX-License-Identifier: GPL-3.0-only

//! Brown-Conrady lens distortion (radial k1..k3, tangential p1, p2)

use crate::calibration::DistortionCoefficients;
use glam::Vec2;

/// Apply distortion to a normalized image-plane point
///
/// `xy` is the perspective-divided point (`x/z`, `y/z`).
#[inline]
pub fn distort(xy: Vec2, coefficients: &DistortionCoefficients) -> Vec2 {
    let DistortionCoefficients { k1, k2, k3, p1, p2 } = *coefficients;
    let (x, y) = (xy.x, xy.y);

    let r2 = x * x + y * y;
    let r4 = r2 * r2;
    let r6 = r4 * r2;
    let radial = 1.0 + k1 * r2 + k2 * r4 + k3 * r6;

    Vec2::new(
        x * radial + 2.0 * p1 * x * y + p2 * (r2 + 2.0 * x * x),
        y * radial + p1 * (r2 + 2.0 * y * y) + 2.0 * p2 * x * y,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_coefficients_identity() {
        let xy = Vec2::new(0.31, -0.12);
        assert_eq!(distort(xy, &DistortionCoefficients::default()), xy);
    }

    #[test]
    fn test_radial_only() {
        let coefficients = DistortionCoefficients {
            k1: 0.1,
            ..Default::default()
        };
        // r2 = 0.25, factor = 1.025
        let out = distort(Vec2::new(0.5, 0.0), &coefficients);
        assert_relative_eq!(out.x, 0.5125, epsilon = 1e-6);
        assert_relative_eq!(out.y, 0.0);
    }

    #[test]
    fn test_tangential_only() {
        let coefficients = DistortionCoefficients {
            p1: 0.01,
            p2: 0.02,
            ..Default::default()
        };
        let out = distort(Vec2::new(0.2, 0.1), &coefficients);
        // r2 = 0.05
        assert_relative_eq!(out.x, 0.2 + 2.0 * 0.01 * 0.02 + 0.02 * (0.05 + 0.08), epsilon = 1e-6);
        assert_relative_eq!(out.y, 0.1 + 0.01 * (0.05 + 0.02) + 2.0 * 0.02 * 0.02, epsilon = 1e-6);
    }

    #[test]
    fn test_center_is_fixed_point() {
        let coefficients = DistortionCoefficients {
            k1: -0.2,
            k2: 0.05,
            k3: 0.01,
            p1: 0.003,
            p2: -0.004,
        };
        assert_eq!(distort(Vec2::ZERO, &coefficients), Vec2::ZERO);
    }
}
