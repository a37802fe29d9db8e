//! Obstacle geometry consulted when classifying voxels and when testing line
//! of sight between two points.
//!
//! Anything able to answer a sphere overlap and a bounded ray cast can act as
//! the obstacle layer by implementing [ObstacleQuery]. [Obstacles] is the
//! provided implementation made of axis-aligned boxes.
//!

use bevy::math::bounding::{Aabb3d, BoundingSphere, IntersectsVolume, RayCast3d};
use bevy::math::Vec3A;
use bevy::prelude::*;

/// Collision queries against obstacle geometry
pub trait ObstacleQuery {
	/// Does a sphere at `centre` of `radius` overlap any obstacle
	fn check_sphere(&self, centre: Vec3, radius: f32) -> bool;
	/// Does a ray from `origin` along `direction` hit any obstacle within `distance`
	fn raycast(&self, origin: Vec3, direction: Vec3, distance: f32) -> bool;
	/// Is the straight segment between two points obstructed
	fn is_segment_blocked(&self, from: Vec3, to: Vec3) -> bool {
		let delta = to - from;
		self.raycast(from, delta, delta.length())
	}
}

/// A set of box colliders acting as the obstacle layer of the world
#[derive(Component, Clone, Debug, Default)]
pub struct Obstacles {
	/// Axis-aligned colliders
	colliders: Vec<Aabb3d>,
}

impl Obstacles {
	/// Create a new instance of [Obstacles] with no colliders
	pub fn new() -> Self {
		Obstacles::default()
	}
	/// Add a box centred on `centre` extending `half_size` along each axis
	pub fn add_box(&mut self, centre: Vec3, half_size: Vec3) -> &mut Self {
		self.colliders
			.push(Aabb3d::new(Vec3A::from(centre), Vec3A::from(half_size)));
		self
	}
	/// Add a box spanning the two corners `min` and `max`
	pub fn add_box_from_corners(&mut self, min: Vec3, max: Vec3) -> &mut Self {
		let centre = (min + max) * 0.5;
		let half_size = (max - min).abs() * 0.5;
		self.add_box(centre, half_size)
	}
	/// Get the colliders
	pub fn get_colliders(&self) -> &[Aabb3d] {
		&self.colliders
	}
	/// Remove every collider
	pub fn clear(&mut self) {
		self.colliders.clear();
	}
}

impl ObstacleQuery for Obstacles {
	fn check_sphere(&self, centre: Vec3, radius: f32) -> bool {
		let sphere = BoundingSphere::new(Vec3A::from(centre), radius);
		self.colliders.iter().any(|aabb| aabb.intersects(&sphere))
	}
	fn raycast(&self, origin: Vec3, direction: Vec3, distance: f32) -> bool {
		// a degenerate direction has nothing to hit
		let Ok(direction) = Dir3::new(direction) else {
			return false;
		};
		let ray = RayCast3d::new(Vec3A::from(origin), direction, distance);
		self.colliders
			.iter()
			.any(|aabb| ray.aabb_intersection_at(aabb).is_some())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	/// A unit cube wall sitting at `x = 5`
	fn wall() -> Obstacles {
		let mut obstacles = Obstacles::new();
		obstacles.add_box_from_corners(Vec3::new(4.0, -1.0, -1.0), Vec3::new(5.0, 11.0, 11.0));
		obstacles
	}
	#[test]
	fn sphere_inside_wall() {
		let obstacles = wall();
		let result = obstacles.check_sphere(Vec3::new(4.5, 0.5, 0.5), 0.4);
		assert!(result);
	}
	#[test]
	fn sphere_clear_of_wall() {
		let obstacles = wall();
		let result = obstacles.check_sphere(Vec3::new(3.5, 0.5, 0.5), 0.4);
		assert!(!result);
	}
	#[test]
	fn segment_through_wall() {
		let obstacles = wall();
		let result =
			obstacles.is_segment_blocked(Vec3::new(3.5, 0.5, 0.5), Vec3::new(5.5, 0.5, 0.5));
		assert!(result);
	}
	#[test]
	fn segment_short_of_wall() {
		let obstacles = wall();
		let result =
			obstacles.is_segment_blocked(Vec3::new(1.5, 0.5, 0.5), Vec3::new(3.5, 0.5, 0.5));
		assert!(!result);
	}
	#[test]
	fn zero_length_ray_never_hits() {
		let obstacles = wall();
		let result = obstacles.raycast(Vec3::new(3.5, 0.5, 0.5), Vec3::ZERO, 1.0);
		assert!(!result);
	}
	#[test]
	fn no_colliders_never_block() {
		let obstacles = Obstacles::new();
		let result = obstacles.is_segment_blocked(Vec3::ZERO, Vec3::splat(10.0));
		assert!(!result);
	}
}
