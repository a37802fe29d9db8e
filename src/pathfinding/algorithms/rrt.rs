//! Rapidly-exploring random tree.
//!
//! A tree of voxels rooted at the start grows towards random samples of the
//! world. Each iteration:
//!
//! 1. If the newest tree node can see the target the target is attached to it and the search succeeds
//! 2. A point is sampled, the target itself with probability [RrtParams::goal_bias] or otherwise anywhere within the grid bounds
//! 3. The tree node nearest the sample is found by a linear scan
//! 4. A step of at most [RrtParams::step_size] is taken from that node towards the sample and snapped to a voxel
//! 5. The voxel joins the tree when walkable, not already a member and reachable in a straight line
//!
//! A new node lying within [RrtParams::min_distance] of the target with a
//! clear line of sight to it also completes the search.
//!
//! ```text
//!        sample
//!          x
//!         /
//!     new o          . target
//!        /
//!   o---o nearest
//!   |
//!   o start
//! ```
//!

use std::collections::{HashMap, HashSet};

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::pathfinding::count_from_value;
use crate::prelude::*;
use bevy::prelude::*;

/// Tunable values of [Rrt]
#[cfg_attr(
	feature = "serde",
	derive(serde::Deserialize, serde::Serialize),
	serde(default)
)]
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct RrtParams {
	/// Longest distance the tree grows in one iteration
	pub step_size: f32,
	/// Chance of sampling the target rather than a random point
	pub goal_bias: f32,
	/// Most iterations before giving up
	pub max_iterations: usize,
	/// A new node closer than this to the target may connect to it directly
	pub min_distance: f32,
}

impl Default for RrtParams {
	fn default() -> Self {
		RrtParams {
			step_size: 2.0,
			goal_bias: 0.3,
			max_iterations: 2000,
			min_distance: 1.5,
		}
	}
}

impl RrtParams {
	/// Update a field by its name
	pub fn set_by_name(&mut self, name: &str, value: f32) -> Result<(), ConfigError> {
		match name {
			"step_size" => self.step_size = value,
			"goal_bias" => self.goal_bias = value,
			"max_iterations" => self.max_iterations = count_from_value(value),
			"min_distance" => self.min_distance = value,
			_ => {
				return Err(ConfigError::UnknownParameter {
					algorithm: Algorithm::Rrt,
					name: name.to_string(),
				})
			}
		}
		Ok(())
	}
}

/// Sampling based tree planner
#[derive(Clone, Debug)]
pub struct Rrt {
	/// Tunable values
	params: RrtParams,
	/// Source of samples
	rng: StdRng,
	/// Tree nodes in the order they were added, the root first
	tree: Vec<VoxelId>,
	/// Membership of `tree`
	members: HashSet<VoxelId>,
	/// Parent of every node but the root
	parents: HashMap<VoxelId, VoxelId>,
}

impl Default for Rrt {
	fn default() -> Self {
		Rrt::new()
	}
}

impl Rrt {
	/// Create a new instance of [Rrt] seeded from the operating system
	pub fn new() -> Self {
		Rrt::from_rng(StdRng::from_os_rng())
	}
	/// Create a new instance of [Rrt] producing reproducible searches
	pub fn with_seed(seed: u64) -> Self {
		Rrt::from_rng(StdRng::seed_from_u64(seed))
	}
	/// Build with a given random source
	fn from_rng(rng: StdRng) -> Self {
		Rrt {
			params: RrtParams::default(),
			rng,
			tree: Vec::new(),
			members: HashSet::new(),
			parents: HashMap::new(),
		}
	}
	pub fn get_params(&self) -> &RrtParams {
		&self.params
	}
	pub fn get_params_mut(&mut self) -> &mut RrtParams {
		&mut self.params
	}
	/// Nodes of the most recent tree, the root first
	pub fn get_tree(&self) -> &[VoxelId] {
		&self.tree
	}
	/// Parent of a node in the most recent tree
	pub fn get_parent(&self, id: VoxelId) -> Option<VoxelId> {
		self.parents.get(&id).copied()
	}
	/// Target itself or a uniform point within the grid bounds
	fn sample_point(&mut self, space: &SearchSpace, target: Vec3) -> Vec3 {
		if self.rng.random::<f32>() < self.params.goal_bias {
			return target;
		}
		let dimensions = space.get_grid().get_dimensions();
		let min = dimensions.get_min();
		let max = dimensions.get_max();
		Vec3::new(
			self.rng.random_range(min.x..=max.x),
			self.rng.random_range(min.y..=max.y),
			self.rng.random_range(min.z..=max.z),
		)
	}
	/// Tree node closest to `point`, the earliest added wins a tie
	fn nearest_node(&self, space: &SearchSpace, point: Vec3) -> Option<VoxelId> {
		let mut nearest = None;
		let mut nearest_distance = f32::INFINITY;
		for id in self.tree.iter() {
			let distance = space.get_position(*id).distance(point);
			if distance < nearest_distance {
				nearest_distance = distance;
				nearest = Some(*id);
			}
		}
		nearest
	}
	/// Step from `from` towards `point` and return the voxel landed on if it can join the tree
	fn steer(&self, space: &SearchSpace, from: VoxelId, point: Vec3) -> Option<VoxelId> {
		let origin = space.get_position(from);
		let delta = point - origin;
		let direction = delta.normalize_or_zero();
		let distance = self.params.step_size.min(delta.length());
		let id = space.get_grid().voxel_id_at(origin + direction * distance)?;
		if !space.get_grid().is_walkable(id) || self.members.contains(&id) {
			return None;
		}
		space
			.is_ray_clear(origin, direction, distance)
			.then_some(id)
	}
	/// Add a node to the tree under `parent`
	fn attach(&mut self, id: VoxelId, parent: VoxelId) {
		self.tree.push(id);
		self.members.insert(id);
		self.parents.insert(id, parent);
	}
	/// Walk the parent links from `target` back to `start`
	fn build_path(
		&self,
		space: &SearchSpace,
		start: VoxelId,
		target: VoxelId,
	) -> Result<Vec<Vec3>, PathfindingError> {
		let mut route = vec![target];
		let mut current = target;
		while current != start {
			if route.len() > self.tree.len() + 1 {
				error!("Parent links of the tree loop, abandoning path");
				return Err(PathfindingError::PathReconstructionFailure);
			}
			let Some(parent) = self.get_parent(current) else {
				error!("Tree node {:?} has no parent", current);
				return Err(PathfindingError::PathReconstructionFailure);
			};
			route.push(parent);
			current = parent;
		}
		route.reverse();
		Ok(space.to_waypoints(&route))
	}
}

impl PathPlanner for Rrt {
	fn algorithm(&self) -> Algorithm {
		Algorithm::Rrt
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
		self.tree.push(start_id);
		self.members.insert(start_id);

		for _ in 0..self.params.max_iterations {
			let Some(newest) = self.tree.last().copied() else {
				break;
			};
			if space.has_line_of_sight(newest, target_id) {
				self.parents.insert(target_id, newest);
				return self.build_path(space, start_id, target_id);
			}
			let sample = self.sample_point(space, target);
			let Some(nearest) = self.nearest_node(space, sample) else {
				continue;
			};
			let Some(new_node) = self.steer(space, nearest, sample) else {
				continue;
			};
			self.attach(new_node, nearest);
			if new_node == target_id {
				return self.build_path(space, start_id, target_id);
			}
			if space.get_position(new_node).distance(target) < self.params.min_distance
				&& space.has_line_of_sight(new_node, target_id)
			{
				self.parents.insert(target_id, new_node);
				return self.build_path(space, start_id, target_id);
			}
		}
		debug!(
			"RRT grew {} nodes without reaching the target",
			self.tree.len()
		);
		Err(PathfindingError::IterationLimitExceeded(
			self.params.max_iterations,
		))
	}
	fn nodes_explored(&self) -> usize {
		self.tree.len()
	}
	fn reset(&mut self) {
		self.tree.clear();
		self.members.clear();
		self.parents.clear();
	}
	fn set_parameter(&mut self, name: &str, value: f32) -> Result<(), ConfigError> {
		self.params.set_by_name(name, value)
	}
}
