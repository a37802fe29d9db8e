//! `use bevy_voxel_pathfinding_plugin::prelude::*;` to import common structures and methods
//!

#[doc(hidden)]
pub use crate::pathfinding::{
	algorithms::{astar::*, beam_search::*, hill_climbing::*, priority_queue::*, rrt::*},
	error::*,
	grid::{obstacles::*, spatial_hash::*, voxel::*, *},
	metrics::*,
	planner::*,
	settings::*,
	telemetry::*,
	*,
};

#[doc(hidden)]
pub use crate::{
	bundle::*,
	plugin::{grid_layer::*, path_layer::*, *},
};
