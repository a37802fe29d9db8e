//! Failure signals raised while building a grid, configuring the planners or
//! searching for a path.
//!
//! None of these are fatal. A [PathfindingError] simply means that no path was
//! produced by the call, the caller can retry, switch to a different
//! [crate::prelude::Algorithm] or give up.
//!

use bevy::prelude::*;

/// Reasons a search returned without a path
///
/// An edge whose accumulated A* cost would exceed
/// [crate::prelude::ASTAR_MAX_PATH_COST] is skipped rather than aborting the
/// search, so it never surfaces as a variant here.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PathfindingError {
	/// The start or target position either sits outside the grid or resolves to a blocked voxel. Checked before any exploration takes place
	#[error("start {start} or target {target} is outside the grid or not walkable")]
	InvalidEndpoint {
		/// Requested start position
		start: Vec3,
		/// Requested target position
		target: Vec3,
	},
	/// The search hit its iteration cap before reaching the target
	#[error("search aborted after {0} iterations")]
	IterationLimitExceeded(usize),
	/// Walking the predecessor links back from the target did not arrive at the start
	#[error("predecessor chain is broken, cannot reconstruct the path")]
	PathReconstructionFailure,
	/// Every reachable voxel was explored without finding the target
	#[error("no path exists between start and target")]
	NoPathFound,
	/// Local search gave up once its stuck counter reached the configured limit
	#[error("local search abandoned after becoming stuck {0} times")]
	StuckLimitReached(u32),
}

/// Problems with the dimensions used to build a [crate::prelude::VoxelGrid]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
	/// Cell size must be a positive finite number
	#[error("cell size must be positive and finite, got {0}")]
	InvalidCellSize(f32),
	/// Every component of the world origin must be a finite number
	#[error("world origin must be finite, got {0}")]
	NonFiniteOrigin(Vec3),
	/// Each axis of the world must hold at least one voxel
	#[error("world size {world_size} holds no voxels along at least one axis with cell size {cell_size}")]
	EmptyAxis {
		/// Requested world size
		world_size: Vec3,
		/// Requested cell size
		cell_size: f32,
	},
}

/// Problems while editing or loading planner configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	/// The named parameter does not exist on the parameter set of the algorithm
	#[error("{algorithm:?} has no parameter named `{name}`")]
	UnknownParameter {
		/// Algorithm whose parameters were being edited
		algorithm: crate::prelude::Algorithm,
		/// Name that was not recognised
		name: String,
	},
	/// A settings or telemetry file could not be read or written
	#[error("i/o failure: {0}")]
	Io(#[from] std::io::Error),
	/// A settings file could not be parsed
	#[cfg(feature = "ron")]
	#[error("failed deserializing settings: {0}")]
	Ron(#[from] ron::error::SpannedError),
	/// The grid described by a settings file is invalid
	#[error(transparent)]
	Grid(#[from] GridError),
}
