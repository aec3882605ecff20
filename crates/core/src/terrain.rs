//! Reference geometry implementing [`SpatialQuery`].
//! This module exists so tooling and tests can drive placement without a host engine.
//! It does not model walls, overhangs, or anything beyond a single ground surface.

use glam::{Vec2, Vec3};

use crate::config::SpawnBounds;
use crate::error::ConfigError;
use crate::seed::SeededRandomSource;
use crate::spatial::SpatialQuery;
use crate::types::{CollisionMask, GenerationSeed};

/// World with no collidable geometry; every probe misses.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyWorld;

impl SpatialQuery for EmptyWorld {
    fn cast_ray(&self, _from: Vec3, _to: Vec3, _mask: CollisionMask) -> Option<Vec3> {
        None
    }
}

/// Horizontal plane at `height`, limited to `extent`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlatGround {
    pub height: f32,
    pub extent: SpawnBounds,
    pub layers: CollisionMask,
}

impl FlatGround {
    pub fn new(height: f32, extent: SpawnBounds) -> Self {
        Self { height, extent, layers: CollisionMask::GROUND }
    }

    pub fn on_layers(mut self, layers: CollisionMask) -> Self {
        self.layers = layers;
        self
    }
}

impl SpatialQuery for FlatGround {
    fn cast_ray(&self, from: Vec3, to: Vec3, mask: CollisionMask) -> Option<Vec3> {
        if !self.layers.intersects(mask) {
            return None;
        }
        let rise = to.y - from.y;
        let t = if rise == 0.0 {
            if from.y != self.height {
                return None;
            }
            0.0
        } else {
            (self.height - from.y) / rise
        };
        if !(0.0..=1.0).contains(&t) {
            return None;
        }
        let hit = from.lerp(to, t);
        self.extent.contains(hit.x, hit.z).then_some(Vec3::new(hit.x, self.height, hit.z))
    }
}

/// Grid of optional ground heights; `None` cells are holes.
#[derive(Clone, Debug, PartialEq)]
pub struct Heightfield {
    origin: Vec2,
    cell_size: f32,
    columns: usize,
    rows: usize,
    heights: Vec<Option<f32>>,
    layers: CollisionMask,
}

impl Heightfield {
    pub fn from_fn(
        origin: Vec2,
        cell_size: f32,
        columns: usize,
        rows: usize,
        mut height: impl FnMut(usize, usize) -> Option<f32>,
    ) -> Result<Self, ConfigError> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(ConfigError::InvalidCellSize(cell_size));
        }
        let mut heights = Vec::with_capacity(columns * rows);
        for row in 0..rows {
            for column in 0..columns {
                heights.push(height(column, row));
            }
        }
        Ok(Self { origin, cell_size, columns, rows, heights, layers: CollisionMask::GROUND })
    }

    /// Grid covering `bounds` where roughly `coverage` of the cells carry ground.
    /// The hole pattern is a pure function of `layout_seed`.
    pub fn patchy(
        bounds: SpawnBounds,
        cell_size: f32,
        coverage: f32,
        layout_seed: GenerationSeed,
    ) -> Result<Self, ConfigError> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(ConfigError::InvalidCellSize(cell_size));
        }
        let size = bounds.size();
        let columns = ((size.x / cell_size).ceil() as usize).max(1);
        let rows = ((size.y / cell_size).ceil() as usize).max(1);
        let mut stream = SeededRandomSource::new(layout_seed);
        Self::from_fn(bounds.min, cell_size, columns, rows, |_, _| {
            let solid = stream.next_unit() < coverage;
            let bump = stream.range_f32(-0.5, 0.5);
            solid.then_some(bump)
        })
    }

    pub fn on_layers(mut self, layers: CollisionMask) -> Self {
        self.layers = layers;
        self
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn solid_cells(&self) -> usize {
        self.heights.iter().filter(|height| height.is_some()).count()
    }

    pub fn height_at(&self, x: f32, z: f32) -> Option<f32> {
        if self.heights.is_empty() {
            return None;
        }
        let local = (Vec2::new(x, z) - self.origin) / self.cell_size;
        let inside = (0.0..=self.columns as f32).contains(&local.x)
            && (0.0..=self.rows as f32).contains(&local.y);
        if !inside {
            return None;
        }
        // The far edge belongs to the last cell.
        let column = (local.x as usize).min(self.columns - 1);
        let row = (local.y as usize).min(self.rows - 1);
        self.heights[row * self.columns + column]
    }
}

impl SpatialQuery for Heightfield {
    // Exact for vertical rays; slanted rays are sampled at half-cell steps.
    fn cast_ray(&self, from: Vec3, to: Vec3, mask: CollisionMask) -> Option<Vec3> {
        if !self.layers.intersects(mask) {
            return None;
        }
        let horizontal = Vec2::new(to.x - from.x, to.z - from.z).length();
        let steps = ((horizontal / (self.cell_size * 0.5)).ceil() as u32).max(1);

        let mut above = false;
        for step in 0..=steps {
            let point = from.lerp(to, step as f32 / steps as f32);
            let Some(ground) = self.height_at(point.x, point.z) else {
                continue;
            };
            let touching = step == 0 && point.y == ground;
            if point.y <= ground && (above || touching) {
                return Some(Vec3::new(point.x, ground, point.z));
            }
            above = point.y > ground;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down(x: f32, z: f32) -> (Vec3, Vec3) {
        (Vec3::new(x, 100.0, z), Vec3::new(x, -100.0, z))
    }

    #[test]
    fn empty_world_never_hits() {
        let (from, to) = down(0.0, 0.0);
        assert_eq!(EmptyWorld.cast_ray(from, to, CollisionMask::ALL), None);
    }

    #[test]
    fn flat_ground_hits_inside_its_extent_only() {
        let ground = FlatGround::new(2.0, SpawnBounds::new(Vec2::splat(-10.0), Vec2::splat(10.0)));

        let (from, to) = down(4.0, -3.0);
        let hit = ground.cast_ray(from, to, CollisionMask::GROUND);
        assert_eq!(hit, Some(Vec3::new(4.0, 2.0, -3.0)));

        let (from, to) = down(11.0, 0.0);
        assert_eq!(ground.cast_ray(from, to, CollisionMask::GROUND), None);
    }

    #[test]
    fn flat_ground_ignores_rays_that_stop_short() {
        let ground = FlatGround::new(-50.0, SpawnBounds::default());
        let from = Vec3::new(0.0, 10.0, 0.0);
        let to = Vec3::new(0.0, -10.0, 0.0);
        assert_eq!(ground.cast_ray(from, to, CollisionMask::GROUND), None);
    }

    #[test]
    fn geometry_on_other_layers_is_ignored() {
        let ground = FlatGround::new(0.0, SpawnBounds::default()).on_layers(CollisionMask(2));
        let (from, to) = down(0.0, 0.0);
        assert_eq!(ground.cast_ray(from, to, CollisionMask::GROUND), None);
        assert!(ground.cast_ray(from, to, CollisionMask(2)).is_some());
    }

    #[test]
    fn heightfield_reports_cell_height_and_holes() {
        let field = Heightfield::from_fn(Vec2::ZERO, 1.0, 2, 2, |column, row| {
            (column != 1 || row != 1).then_some((column + row) as f32)
        })
        .expect("valid cell size");

        let (from, to) = down(1.5, 0.5);
        assert_eq!(field.cast_ray(from, to, CollisionMask::GROUND), Some(Vec3::new(1.5, 1.0, 0.5)));

        let (from, to) = down(1.5, 1.5);
        assert_eq!(field.cast_ray(from, to, CollisionMask::GROUND), None);

        let (from, to) = down(-0.5, 0.5);
        assert_eq!(field.cast_ray(from, to, CollisionMask::GROUND), None);
        assert_eq!(field.solid_cells(), 3);
    }

    #[test]
    fn heightfield_stops_slanted_rays_at_the_first_crossing() {
        let field = Heightfield::from_fn(Vec2::ZERO, 1.0, 10, 1, |column, _| {
            Some(if column < 5 { 0.0 } else { 4.0 })
        })
        .expect("valid cell size");
        let hit = field
            .cast_ray(Vec3::new(0.5, 6.0, 0.5), Vec3::new(9.5, 2.0, 0.5), CollisionMask::GROUND)
            .expect("ray should meet the raised half");
        assert_eq!(hit.y, 4.0);
        assert!(hit.x >= 5.0);
    }

    #[test]
    fn patchy_layout_is_a_function_of_its_seed() {
        let bounds = SpawnBounds::default();
        let left = Heightfield::patchy(bounds, 5.0, 0.5, 77).expect("valid cell size");
        let right = Heightfield::patchy(bounds, 5.0, 0.5, 77).expect("valid cell size");
        assert_eq!(left, right);
        assert_eq!(left.columns(), 20);
        assert_eq!(left.rows(), 20);

        let full = Heightfield::patchy(bounds, 5.0, 1.0, 3).expect("valid cell size");
        assert_eq!(full.solid_cells(), 400);
        let none = Heightfield::patchy(bounds, 5.0, 0.0, 3).expect("valid cell size");
        assert_eq!(none.solid_cells(), 0);
    }

    #[test]
    fn degenerate_cell_sizes_are_rejected() {
        let bounds = SpawnBounds::default();
        for cell_size in [0.0, -2.0, f32::NAN, f32::INFINITY] {
            let result = Heightfield::patchy(bounds, cell_size, 0.5, 1);
            assert!(matches!(result, Err(ConfigError::InvalidCellSize(_))), "{cell_size}");
        }
        let grid = Heightfield::from_fn(Vec2::ZERO, 0.0, 2, 2, |_, _| Some(0.0));
        assert!(matches!(grid, Err(ConfigError::InvalidCellSize(_))));
    }
}
