//! Morton (Z-order) encoding for the linear BVH build

use crate::foundation::math::Vec3;
use super::aabb::AABB;

/// Quantization resolution per axis (10 bits)
pub const MORTON_RESOLUTION: u32 = 1023;

/// Spread the low 10 bits of `v` so two zero bits sit between each pair
pub fn expand_bits(v: u32) -> u32 {
    let mut v = v & 0x3FF;
    v = v.wrapping_mul(0x0001_0001) & 0xFF00_00FF;
    v = v.wrapping_mul(0x0000_0101) & 0x0F00_F00F;
    v = v.wrapping_mul(0x0000_0011) & 0xC30C_30C3;
    v = v.wrapping_mul(0x0000_0005) & 0x4924_9249;
    v
}

/// Interleave three 10-bit integers into a 30-bit Morton code (x highest)
pub fn morton3d(x: u32, y: u32, z: u32) -> u32 {
    (expand_bits(x) << 2) | (expand_bits(y) << 1) | expand_bits(z)
}

/// Map `value` into `[0, 1]` relative to `[min, min + extent]`
///
/// Zero-extent axes map to the midpoint.
fn normalize_axis(value: f32, min: f32, extent: f32) -> f32 {
    if extent > 0.0 {
        ((value - min) / extent).clamp(0.0, 1.0)
    } else {
        0.5
    }
}

/// Morton code of `point` quantized inside `domain`
pub fn morton_code(point: Vec3, domain: &AABB) -> u32 {
    let size = domain.max - domain.min;
    let quantize = |axis: usize| -> u32 {
        let n = normalize_axis(point[axis], domain.min[axis], size[axis]);
        (n * MORTON_RESOLUTION as f32) as u32
    };
    morton3d(quantize(0), quantize(1), quantize(2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_bits() {
        assert_eq!(expand_bits(0), 0);
        assert_eq!(expand_bits(1), 1);
        assert_eq!(expand_bits(0b11), 0b1001);
        assert_eq!(expand_bits(0x3FF), 0x0924_9249);
    }

    #[test]
    fn test_morton_interleaving_order() {
        assert_eq!(morton3d(1, 0, 0), 0b100);
        assert_eq!(morton3d(0, 1, 0), 0b010);
        assert_eq!(morton3d(0, 0, 1), 0b001);
        assert_eq!(morton3d(1023, 1023, 1023), 0x3FFF_FFFF);
    }

    #[test]
    fn test_degenerate_axis_maps_to_midpoint() {
        let domain = AABB::new(Vec3::new(0.0, 5.0, 0.0), Vec3::new(10.0, 5.0, 10.0));
        let code = morton_code(Vec3::new(0.0, 5.0, 0.0), &domain);
        // y sits at 0.5 -> 511, x and z at 0
        assert_eq!(code, morton3d(0, 511, 0));
    }

    #[test]
    fn test_corners_of_domain() {
        let domain = AABB::new(Vec3::zeros(), Vec3::new(2.0, 2.0, 2.0));
        assert_eq!(morton_code(domain.min, &domain), 0);
        assert_eq!(morton_code(domain.max, &domain), morton3d(1023, 1023, 1023));
    }
}
