//! Static level geometry.
//!
//! The level is made of axis-aligned boxes (`Surface`). Every surface blocks
//! the character; surfaces also tagged `Climbable` are reported by the climb
//! sensors. The overlap and ray tests here are shared by the sensors, the
//! character physics and the camera boom.

pub mod level;

use bevy::prelude::*;

/// Solid axis-aligned box centred on the entity's translation.
#[derive(Component, Debug, Clone, Copy)]
pub struct Surface {
    pub half_extents: Vec3,
}

impl Surface {
    #[must_use]
    pub fn new(size: Vec3) -> Self {
        Self { half_extents: size * 0.5 }
    }

    /// World-space bounds of this surface placed at `translation`.
    #[must_use]
    pub fn bounds(&self, translation: Vec3) -> Bounds {
        Bounds::from_center(translation, self.half_extents)
    }
}

/// Marker for surfaces the proximity sensors react to.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct Climbable;

/// Axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    #[must_use]
    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        Self { min: center - half_extents, max: center + half_extents }
    }

    /// Strict overlap: boxes that only share a face do not overlap, so a
    /// body resting on a floor can still slide along it.
    #[must_use]
    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// Whether a sphere touches or intersects this box.
    #[must_use]
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        let closest = center.clamp(self.min, self.max);
        closest.distance_squared(center) <= radius * radius
    }

    /// Distance along `dir` (unit length) at which a ray from `origin` first
    /// enters the box, if that happens within `max_distance`. A ray starting
    /// inside the box hits at 0.
    #[must_use]
    pub fn ray_hit(&self, origin: Vec3, dir: Vec3, max_distance: f32) -> Option<f32> {
        let mut t_min = 0.0_f32;
        let mut t_max = max_distance;

        for axis in 0..3 {
            let o = origin[axis];
            let d = dir[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);
            if d.abs() < 1e-6 {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let mut t0 = (lo - o) * inv;
            let mut t1 = (hi - o) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }
        Some(t_min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_faces_do_not_overlap() {
        let floor = Bounds::from_center(Vec3::ZERO, Vec3::new(5.0, 0.5, 5.0));
        let body = Bounds::from_center(Vec3::new(0.0, 1.5, 0.0), Vec3::ONE);
        assert!(!floor.overlaps(&body));
        let sunk = Bounds::from_center(Vec3::new(0.0, 1.4, 0.0), Vec3::ONE);
        assert!(floor.overlaps(&sunk));
    }

    #[test]
    fn sphere_near_corner() {
        let b = Bounds::from_center(Vec3::ZERO, Vec3::ONE);
        assert!(b.intersects_sphere(Vec3::new(1.1, 0.0, 0.0), 0.16));
        assert!(!b.intersects_sphere(Vec3::new(1.2, 1.2, 0.0), 0.16));
        assert!(b.intersects_sphere(Vec3::ZERO, 0.01));
    }

    #[test]
    fn ray_hits_front_face() {
        let b = Bounds::from_center(Vec3::new(0.0, 0.0, 5.0), Vec3::ONE);
        let hit = b.ray_hit(Vec3::ZERO, Vec3::Z, 10.0).unwrap();
        assert!((hit - 4.0).abs() < 1e-5);
        assert_eq!(b.ray_hit(Vec3::ZERO, Vec3::Z, 3.0), None);
        assert_eq!(b.ray_hit(Vec3::ZERO, -Vec3::Z, 10.0), None);
        assert_eq!(b.ray_hit(Vec3::new(0.0, 0.0, 5.0), Vec3::X, 10.0), Some(0.0));
    }
}
