//! Measurements derived from a planned route, used for logging and telemetry.
//!

use bevy::prelude::*;

/// Multiplier applied to vertical movement when reporting the cost of a route
pub const PATH_COST_HEIGHT_MULTIPLIER: f32 = 1.5;

/// Summary of a route
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Reflect)]
pub struct PathMetrics {
	/// Sum of the distances between consecutive waypoints
	length: f32,
	/// Length plus every climb or drop scaled by [PATH_COST_HEIGHT_MULTIPLIER]
	cost: f32,
	/// Difference between the highest and lowest waypoint
	height_range: f32,
}

impl PathMetrics {
	/// Measure a sequence of waypoints
	pub fn from_waypoints(waypoints: &[Vec3]) -> Self {
		let mut length = 0.0;
		let mut cost = 0.0;
		for pair in waypoints.windows(2) {
			let distance = pair[0].distance(pair[1]);
			length += distance;
			cost += distance + (pair[1].y - pair[0].y).abs() * PATH_COST_HEIGHT_MULTIPLIER;
		}
		let height_range = match (
			waypoints.iter().map(|p| p.y).reduce(f32::min),
			waypoints.iter().map(|p| p.y).reduce(f32::max),
		) {
			(Some(min), Some(max)) => max - min,
			_ => 0.0,
		};
		PathMetrics {
			length,
			cost,
			height_range,
		}
	}
	pub fn get_length(&self) -> f32 {
		self.length
	}
	pub fn get_cost(&self) -> f32 {
		self.cost
	}
	pub fn get_height_range(&self) -> f32 {
		self.height_range
	}
	/// Mean distance between two consecutive waypoints of a route of `waypoint_count` points
	pub fn get_average_segment_length(&self, waypoint_count: usize) -> f32 {
		if waypoint_count > 1 {
			self.length / (waypoint_count - 1) as f32
		} else {
			0.0
		}
	}
}
