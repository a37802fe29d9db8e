//! Configuration of the grid and of every planner.
//!
//! Settings can be built in code or, with the `ron` feature, loaded from a
//! file:
//!
//! ```text
//! (
//!     grid: (
//!         world_size: (200.0, 40.0, 200.0),
//!         world_origin: (-150.0, 1.0, 0.0),
//!         cell_size: 1.0,
//!     ),
//!     algorithm: BeamSearch,
//!     beam_search: (beam_width: 64),
//! )
//! ```
//!
//! Any field left out takes its default.
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Extent and resolution of the world to voxelise
#[cfg_attr(
	feature = "serde",
	derive(serde::Deserialize, serde::Serialize),
	serde(default)
)]
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct GridSettings {
	/// Size of the world along each axis
	pub world_size: Vec3,
	/// World position of the minimum corner
	pub world_origin: Vec3,
	/// Side length of a voxel
	pub cell_size: f32,
}

impl Default for GridSettings {
	fn default() -> Self {
		GridSettings {
			world_size: Vec3::new(200.0, 40.0, 200.0),
			world_origin: Vec3::new(-150.0, 1.0, 0.0),
			cell_size: 1.0,
		}
	}
}

impl GridSettings {
	/// Create a new instance of [GridSettings]
	pub fn new(world_size: Vec3, world_origin: Vec3, cell_size: f32) -> Self {
		GridSettings {
			world_size,
			world_origin,
			cell_size,
		}
	}
}

/// Everything needed to build a grid and its [Planner]
#[cfg_attr(
	feature = "serde",
	derive(serde::Deserialize, serde::Serialize),
	serde(default)
)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Reflect)]
pub struct PlannerSettings {
	/// Grid to voxelise
	pub grid: GridSettings,
	/// Planner used for requests that do not name one
	pub algorithm: Algorithm,
	/// Parameters of [AStar]
	pub astar: AStarParams,
	/// Parameters of [HillClimbing]
	pub hill_climbing: HillClimbingParams,
	/// Parameters of [Rrt]
	pub rrt: RrtParams,
	/// Parameters of [BeamSearch]
	pub beam_search: BeamSearchParams,
	/// Seed of the random planners, seeded from the operating system when `None`
	pub seed: Option<u64>,
}

impl PlannerSettings {
	/// Load settings from a `ron` file
	#[cfg(feature = "ron")]
	pub fn from_ron<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
		let file = std::fs::File::open(path)?;
		let settings: PlannerSettings = ron::de::from_reader(file)?;
		Ok(settings)
	}
}
