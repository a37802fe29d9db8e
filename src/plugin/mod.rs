//! Defines the Bevy [Plugin] for voxel pathfinding
//!

use crate::prelude::*;
use bevy::prelude::*;

pub mod grid_layer;
pub mod path_layer;

/// Grids are rebuilt before any request is served within a frame
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum PathfindingSet {
	Rebuild,
	Plan,
}

pub struct VoxelPathfindingPlugin;

impl Plugin for VoxelPathfindingPlugin {
	#[cfg(not(tarpaulin_include))]
	fn build(&self, app: &mut App) {
		app.register_type::<VoxelId>()
			.register_type::<Algorithm>()
			.register_type::<GridSettings>()
			.register_type::<PlannerSettings>()
			.register_type::<AStarParams>()
			.register_type::<HillClimbingParams>()
			.register_type::<RrtParams>()
			.register_type::<BeamSearchParams>()
			.register_type::<PathMetrics>()
			.add_event::<grid_layer::EventRebuildGrid>()
			.add_event::<path_layer::EventSelectAlgorithm>()
			.add_event::<path_layer::EventPathRequest>()
			.add_event::<path_layer::EventPathResult>()
			.configure_sets(Update, (PathfindingSet::Rebuild, PathfindingSet::Plan).chain())
			.add_systems(
				Update,
				(
					grid_layer::rebuild_grids.in_set(PathfindingSet::Rebuild),
					(
						path_layer::select_algorithm,
						path_layer::process_path_requests,
					)
						.chain()
						.in_set(PathfindingSet::Plan),
				),
			);
	}
}
