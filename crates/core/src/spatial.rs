//! Ground validation for spawn candidates against an external spatial-query surface.

use glam::Vec3;

use crate::types::CollisionMask;

/// Ray queries against collidable geometry owned by the host world.
pub trait SpatialQuery {
    /// Nearest point where the segment `from -> to` hits geometry on `mask`.
    fn cast_ray(&self, from: Vec3, to: Vec3, mask: CollisionMask) -> Option<Vec3>;
}

impl<T: SpatialQuery + ?Sized> SpatialQuery for &T {
    fn cast_ray(&self, from: Vec3, to: Vec3, mask: CollisionMask) -> Option<Vec3> {
        (**self).cast_ray(from, to, mask)
    }
}

/// Horizontal sample drawn from the spawn bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnCandidate {
    pub x: f32,
    pub z: f32,
}

/// Vertical probe turning a [`SpawnCandidate`] into a ground point.
pub struct GroundProbe<'a> {
    space: &'a dyn SpatialQuery,
    half_height: f32,
    mask: CollisionMask,
}

impl<'a> GroundProbe<'a> {
    pub fn new(space: &'a dyn SpatialQuery, half_height: f32, mask: CollisionMask) -> Self {
        Self { space, half_height, mask }
    }

    pub fn probe(&self, candidate: SpawnCandidate) -> Option<Vec3> {
        let from = Vec3::new(candidate.x, self.half_height, candidate.z);
        let to = Vec3::new(candidate.x, -self.half_height, candidate.z);
        self.space.cast_ray(from, to, self.mask)
    }
}
