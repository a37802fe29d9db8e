//! Beam search over partial paths.
//!
//! Every round each candidate path in the beam is extended by each valid
//! neighbour of its last voxel, the extensions are scored and only the best
//! [BeamSearchParams::beam_width] survive into the next round. A voxel may be
//! claimed by only one extension across the whole search.
//!
//! A candidate whose last voxel is the target is returned as soon as it is
//! met while walking the beam in list order, a better scoring candidate
//! reaching the target later in the same round is never considered.
//!
//! Scoring favours progress towards the target and penalises what is left
//! to cover:
//!
//! ```text
//!  progress = (total - remaining) / total
//!  score    = progress * 5
//!           - horizontal distance to target
//!           - vertical distance to target
//!           - excess height penalty when more than 2 above the target
//!           - 0.1 * path length
//! ```
//!

use std::collections::HashSet;

use crate::pathfinding::count_from_value;
use crate::prelude::*;
use bevy::prelude::*;

/// Largest climb or drop between two voxels of a candidate path
const BEAM_MAX_HEIGHT_DIFFERENCE: f32 = 1.5;
/// Height above the target beyond which a path is penalised
const BEAM_EXCESS_HEIGHT_THRESHOLD: f32 = 2.0;
/// Penalty per unit of height above the target once over the threshold
const BEAM_EXCESS_HEIGHT_WEIGHT: f32 = 0.5;
/// Weight of the progress term of a score
const BEAM_PROGRESS_WEIGHT: f32 = 5.0;
/// Penalty per voxel of a path
const BEAM_LENGTH_PENALTY: f32 = 0.1;

/// Tunable values of [BeamSearch]
#[cfg_attr(
	feature = "serde",
	derive(serde::Deserialize, serde::Serialize),
	serde(default)
)]
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct BeamSearchParams {
	/// Number of candidate paths kept between rounds
	pub beam_width: usize,
	/// Most rounds before giving up
	pub max_iterations: usize,
	/// Reserved, scoring does not consult it
	pub height_weight: f32,
}

impl Default for BeamSearchParams {
	fn default() -> Self {
		BeamSearchParams {
			beam_width: 200,
			max_iterations: 40_000,
			height_weight: 1.0,
		}
	}
}

impl BeamSearchParams {
	/// Update a field by its name
	pub fn set_by_name(&mut self, name: &str, value: f32) -> Result<(), ConfigError> {
		match name {
			"beam_width" => self.beam_width = count_from_value(value),
			"max_iterations" => self.max_iterations = count_from_value(value),
			"height_weight" => self.height_weight = value,
			_ => {
				return Err(ConfigError::UnknownParameter {
					algorithm: Algorithm::BeamSearch,
					name: name.to_string(),
				})
			}
		}
		Ok(())
	}
}

/// A partial path and its score
#[derive(Clone, Debug)]
struct PathCandidate {
	/// Voxels from the start onwards
	route: Vec<VoxelId>,
	/// Higher is better
	score: f32,
}

/// Bounded width beam search planner
#[derive(Clone, Debug, Default)]
pub struct BeamSearch {
	/// Tunable values
	params: BeamSearchParams,
	/// Voxels claimed by any candidate of the most recent search
	visited: HashSet<VoxelId>,
	/// Largest beam carried between two rounds of the most recent search
	widest_beam: usize,
}

impl BeamSearch {
	/// Create a new instance of [BeamSearch] with default parameters
	pub fn new() -> Self {
		BeamSearch::default()
	}
	/// Create a new instance of [BeamSearch] with custom parameters
	pub fn with_params(params: BeamSearchParams) -> Self {
		BeamSearch {
			params,
			..Default::default()
		}
	}
	pub fn get_params(&self) -> &BeamSearchParams {
		&self.params
	}
	pub fn get_params_mut(&mut self) -> &mut BeamSearchParams {
		&mut self.params
	}
	/// Largest number of candidates kept after any round of the most recent search
	pub fn get_widest_beam(&self) -> usize {
		self.widest_beam
	}
	/// Neighbours of `current` a path may extend into, highest first
	fn valid_neighbours(&self, space: &SearchSpace, current: VoxelId) -> Vec<VoxelId> {
		let grid = space.get_grid();
		let height = space.get_position(current).y;
		let mut neighbours: Vec<VoxelId> = grid
			.get_neighbours(current)
			.iter()
			.copied()
			.filter(|n| {
				grid.is_walkable(*n)
					&& !self.visited.contains(n)
					&& (space.get_position(*n).y - height).abs() <= BEAM_MAX_HEIGHT_DIFFERENCE
					&& space.has_line_of_sight(current, *n)
			})
			.collect();
		neighbours.sort_by(|a, b| {
			space
				.get_position(*b)
				.y
				.total_cmp(&space.get_position(*a).y)
		});
		neighbours
	}
	/// Score a path ending at its last voxel, higher is better
	fn evaluate_path(space: &SearchSpace, route: &[VoxelId], start: VoxelId, target: VoxelId) -> f32 {
		let Some(last) = route.last() else {
			return f32::NEG_INFINITY;
		};
		let position = space.get_position(*last);
		let target_position = space.get_position(target);
		let total = space.get_position(start).distance(target_position);
		let remaining = position.distance(target_position);
		let progress = (total - remaining) / total;
		let horizontal = Vec2::new(position.x - target_position.x, position.z - target_position.z).length();
		let vertical = (position.y - target_position.y).abs();
		let excess_height = if position.y > target_position.y + BEAM_EXCESS_HEIGHT_THRESHOLD {
			(position.y - target_position.y) * BEAM_EXCESS_HEIGHT_WEIGHT
		} else {
			0.0
		};
		progress * BEAM_PROGRESS_WEIGHT
			- (horizontal + vertical + excess_height + BEAM_LENGTH_PENALTY * route.len() as f32)
	}
}

impl PathPlanner for BeamSearch {
	fn algorithm(&self) -> Algorithm {
		Algorithm::BeamSearch
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
		let mut beam = vec![PathCandidate {
			route: vec![start_id],
			score: 0.0,
		}];
		for _ in 0..self.params.max_iterations {
			if beam.is_empty() {
				break;
			}
			let mut next_beam = Vec::new();
			for candidate in beam.iter() {
				let Some(last) = candidate.route.last().copied() else {
					continue;
				};
				if last == target_id {
					return Ok(space.to_waypoints(&candidate.route));
				}
				for neighbour in self.valid_neighbours(space, last) {
					let mut route = candidate.route.clone();
					route.push(neighbour);
					let score = BeamSearch::evaluate_path(space, &route, start_id, target_id);
					next_beam.push(PathCandidate { route, score });
					self.visited.insert(neighbour);
				}
			}
			// stable, so equal scores keep their generation order
			next_beam.sort_by(|a, b| b.score.total_cmp(&a.score));
			next_beam.truncate(self.params.beam_width);
			self.widest_beam = self.widest_beam.max(next_beam.len());
			beam = next_beam;
		}
		if beam.is_empty() {
			debug!(
				"Beam search emptied its beam after visiting {} voxels",
				self.visited.len()
			);
			Err(PathfindingError::NoPathFound)
		} else {
			warn!(
				"Beam search exceeded {} rounds",
				self.params.max_iterations
			);
			Err(PathfindingError::IterationLimitExceeded(
				self.params.max_iterations,
			))
		}
	}
	fn nodes_explored(&self) -> usize {
		self.visited.len()
	}
	fn reset(&mut self) {
		self.visited.clear();
		self.widest_beam = 0;
	}
	fn set_parameter(&mut self, name: &str, value: f32) -> Result<(), ConfigError> {
		self.params.set_by_name(name, value)
	}
}
