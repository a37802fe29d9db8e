//! Greedy local search with a stochastic stuck counter.
//!
//! From the current voxel every walkable, unvisited neighbour with a clear
//! line of sight is scored and the best one becomes the next step. A score
//! blends three terms, each roughly in `[0, 1]`:
//!
//! ```text
//!  distance  = 1 - |target - n| / total_distance
//!  height    = 1 - |target.y - n.y| / total_distance
//!  direction = dot(norm(n - last), norm(target - n))
//!
//!  score = (distance * 1.8 + height * height_weight + direction) / 3.8
//! ```
//!
//! Every step has a [HillClimbingParams::random_jump_probability] chance of
//! incrementing a stuck counter. Once the counter reaches
//! [HillClimbingParams::max_restarts] the search gives up with
//! [PathfindingError::StuckLimitReached], despite the parameter name there
//! is no restart from the start voxel. While the counter sits at the limit a
//! step may instead move to a random candidate.
//!

use std::collections::HashSet;

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::pathfinding::count_from_value;
use crate::prelude::*;
use bevy::prelude::*;

/// Tunable values of [HillClimbing]
#[cfg_attr(
	feature = "serde",
	derive(serde::Deserialize, serde::Serialize),
	serde(default)
)]
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct HillClimbingParams {
	/// Most steps taken before giving up
	pub max_attempts: usize,
	/// Weight of the height alignment term of a score
	pub height_weight: f32,
	/// Stuck count at which the search is abandoned
	pub max_restarts: u32,
	/// Chance per step of becoming stuck
	pub random_jump_probability: f32,
}

impl Default for HillClimbingParams {
	fn default() -> Self {
		HillClimbingParams {
			max_attempts: 50_000,
			height_weight: 1.0,
			max_restarts: 8,
			random_jump_probability: 0.03,
		}
	}
}

impl HillClimbingParams {
	/// Update a field by its name
	pub fn set_by_name(&mut self, name: &str, value: f32) -> Result<(), ConfigError> {
		match name {
			"max_attempts" => self.max_attempts = count_from_value(value),
			"height_weight" => self.height_weight = value,
			"max_restarts" => self.max_restarts = count_from_value(value) as u32,
			"random_jump_probability" => self.random_jump_probability = value,
			_ => {
				return Err(ConfigError::UnknownParameter {
					algorithm: Algorithm::HillClimbing,
					name: name.to_string(),
				})
			}
		}
		Ok(())
	}
}

/// Stochastic hill-climbing planner
#[derive(Clone, Debug)]
pub struct HillClimbing {
	/// Tunable values
	params: HillClimbingParams,
	/// Source of the stuck and random jump rolls
	rng: StdRng,
	/// Voxels stepped onto during the most recent search
	visited: HashSet<VoxelId>,
	/// Route walked so far, starting with the start voxel
	route: Vec<VoxelId>,
	/// Number of times the most recent search became stuck
	stuck_count: u32,
}

impl Default for HillClimbing {
	fn default() -> Self {
		HillClimbing::new()
	}
}

impl HillClimbing {
	/// Create a new instance of [HillClimbing] seeded from the operating system
	pub fn new() -> Self {
		HillClimbing::from_rng(StdRng::from_os_rng())
	}
	/// Create a new instance of [HillClimbing] producing reproducible searches
	pub fn with_seed(seed: u64) -> Self {
		HillClimbing::from_rng(StdRng::seed_from_u64(seed))
	}
	/// Build with a given random source
	fn from_rng(rng: StdRng) -> Self {
		HillClimbing {
			params: HillClimbingParams::default(),
			rng,
			visited: HashSet::new(),
			route: Vec::new(),
			stuck_count: 0,
		}
	}
	pub fn get_params(&self) -> &HillClimbingParams {
		&self.params
	}
	pub fn get_params_mut(&mut self) -> &mut HillClimbingParams {
		&mut self.params
	}
	/// How many times the most recent search became stuck
	pub fn get_stuck_count(&self) -> u32 {
		self.stuck_count
	}
	/// Pick the voxel to step onto from `current`, `None` when boxed in
	fn find_next_voxel(
		&mut self,
		space: &SearchSpace,
		current: VoxelId,
		target: VoxelId,
		total_distance: f32,
	) -> Option<VoxelId> {
		let grid = space.get_grid();
		let candidates: Vec<VoxelId> = grid
			.get_neighbours(current)
			.iter()
			.copied()
			.filter(|n| {
				grid.is_walkable(*n) && !self.visited.contains(n) && space.has_line_of_sight(current, *n)
			})
			.collect();
		if candidates.is_empty() {
			return None;
		}
		if self.stuck_count >= self.params.max_restarts
			&& self.rng.random::<f32>() < self.params.random_jump_probability
		{
			let index = self.rng.random_range(0..candidates.len());
			return Some(candidates[index]);
		}
		let mut best = candidates[0];
		let mut best_score = f32::NEG_INFINITY;
		for candidate in candidates {
			let score = self.evaluate(space, candidate, target, total_distance);
			if score > best_score {
				best_score = score;
				best = candidate;
			}
		}
		Some(best)
	}
	/// Score a candidate voxel, higher is better
	fn evaluate(&self, space: &SearchSpace, voxel: VoxelId, target: VoxelId, total_distance: f32) -> f32 {
		let position = space.get_position(voxel);
		let target_position = space.get_position(target);
		let distance_score = 1.0 - position.distance(target_position) / total_distance;
		let height_score = 1.0 - (target_position.y - position.y).abs() / total_distance;
		let direction_score = match self.route.last() {
			Some(last) => {
				let step = (position - space.get_position(*last)).normalize_or_zero();
				let to_target = (target_position - position).normalize_or_zero();
				step.dot(to_target)
			}
			None => 0.0,
		};
		(distance_score * 1.8 + height_score * self.params.height_weight + direction_score) / 3.8
	}
}

impl PathPlanner for HillClimbing {
	fn algorithm(&self) -> Algorithm {
		Algorithm::HillClimbing
	}
	fn find_path(
		&mut self,
		space: &SearchSpace,
		start: Vec3,
		target: Vec3,
	) -> Result<Vec<Vec3>, PathfindingError> {
		self.reset();
		let (start_id, target_id) = space.resolve_endpoints(start, target)?;
		if start_id == target_id {
			return Ok(vec![space.get_position(start_id)]);
		}
		let total_distance = start.distance(target);
		let mut current = start_id;
		self.route.push(current);
		for _ in 0..self.params.max_attempts {
			let Some(next) = self.find_next_voxel(space, current, target_id, total_distance) else {
				debug!("Hill-climbing boxed in after {} steps", self.route.len() - 1);
				return Err(PathfindingError::NoPathFound);
			};
			if next == target_id {
				self.route.push(next);
				return Ok(space.to_waypoints(&self.route));
			}
			if self.rng.random::<f32>() < self.params.random_jump_probability {
				self.stuck_count += 1;
				if self.stuck_count >= self.params.max_restarts {
					debug!("Hill-climbing stuck {} times, giving up", self.stuck_count);
					return Err(PathfindingError::StuckLimitReached(self.stuck_count));
				}
			}
			self.route.push(next);
			self.visited.insert(next);
			current = next;
		}
		warn!(
			"Hill-climbing exceeded {} attempts",
			self.params.max_attempts
		);
		Err(PathfindingError::IterationLimitExceeded(
			self.params.max_attempts,
		))
	}
	fn nodes_explored(&self) -> usize {
		self.visited.len()
	}
	fn reset(&mut self) {
		self.visited.clear();
		self.route.clear();
		self.stuck_count = 0;
	}
	fn set_parameter(&mut self, name: &str, value: f32) -> Result<(), ConfigError> {
		self.params.set_by_name(name, value)
	}
}
