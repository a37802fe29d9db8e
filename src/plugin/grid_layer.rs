//! Logic relating to rebuilding [VoxelGrid]s
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Rebuild every [VoxelGrid] from its [Obstacles]. With new [GridSettings]
/// the grid is also resized, otherwise the current dimensions are kept so
/// that edits to [Obstacles] are picked up
#[derive(Event)]
pub struct EventRebuildGrid {
	/// New extent and resolution of the grid
	settings: Option<GridSettings>,
}

impl EventRebuildGrid {
	/// Rebuild with new dimensions
	pub fn new(settings: GridSettings) -> Self {
		EventRebuildGrid {
			settings: Some(settings),
		}
	}
	/// Rebuild keeping the current dimensions
	pub fn refresh() -> Self {
		EventRebuildGrid { settings: None }
	}
	pub fn get_settings(&self) -> Option<&GridSettings> {
		self.settings.as_ref()
	}
}

/// Handle [EventRebuildGrid], afterwards every [Planner] of a rebuilt grid has its records cleared
#[cfg(not(tarpaulin_include))]
pub fn rebuild_grids(
	mut events: EventReader<EventRebuildGrid>,
	mut grid_q: Query<(&mut VoxelGrid, &Obstacles, &mut Planner)>,
) {
	for event in events.read() {
		let dimensions = match event.get_settings() {
			Some(settings) => match GridDimensions::from_settings(settings) {
				Ok(dimensions) => Some(dimensions),
				Err(e) => {
					error!("Ignoring grid rebuild: {}", e);
					continue;
				}
			},
			None => None,
		};
		for (mut grid, obstacles, mut planner) in grid_q.iter_mut() {
			let dimensions = dimensions.unwrap_or(*grid.get_dimensions());
			grid.rebuild(dimensions, obstacles);
			planner.reset_planners();
		}
	}
}
