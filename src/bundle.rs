//! Groups the components needed to plan routes through a voxelised world
//!

use crate::prelude::*;
use bevy::prelude::*;

/// Spawn this onto an entity to give it a [VoxelGrid], the [Obstacles] used to
/// build it and a [Planner] to search it
#[derive(Bundle)]
pub struct VoxelPathfindingBundle {
	/// Voxels of the world
	grid: VoxelGrid,
	/// Colliders used for walkability and line of sight
	obstacles: Obstacles,
	/// Planners searching the grid
	planner: Planner,
}

impl VoxelPathfindingBundle {
	/// Create a new instance of [VoxelPathfindingBundle] by voxelising the world described in [PlannerSettings] around `obstacles`
	pub fn new(settings: &PlannerSettings, obstacles: Obstacles) -> Result<Self, GridError> {
		let grid = VoxelGrid::from_settings(&settings.grid, &obstacles)?;
		let planner = Planner::from_settings(settings);
		Ok(VoxelPathfindingBundle {
			grid,
			obstacles,
			planner,
		})
	}
	/// Create a new instance of [VoxelPathfindingBundle] where the [PlannerSettings] are read from a `ron` file
	#[cfg(feature = "ron")]
	pub fn new_from_disk<P: AsRef<std::path::Path>>(
		path: P,
		obstacles: Obstacles,
	) -> Result<Self, ConfigError> {
		let settings = PlannerSettings::from_ron(path)?;
		Ok(VoxelPathfindingBundle::new(&settings, obstacles)?)
	}
	pub fn get_grid(&self) -> &VoxelGrid {
		&self.grid
	}
	pub fn get_obstacles(&self) -> &Obstacles {
		&self.obstacles
	}
	pub fn get_planner(&self) -> &Planner {
		&self.planner
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	/// Settings of a small world
	fn settings() -> PlannerSettings {
		PlannerSettings {
			grid: GridSettings::new(Vec3::new(12.0, 4.0, 8.0), Vec3::ZERO, 1.0),
			..Default::default()
		}
	}
	#[test]
	fn new_bundle() {
		let mut obstacles = Obstacles::new();
		obstacles.add_box(Vec3::new(6.0, 2.0, 4.0), Vec3::splat(0.5));
		let bundle = VoxelPathfindingBundle::new(&settings(), obstacles).unwrap();
		assert_eq!(12 * 4 * 8, bundle.get_grid().len());
		assert_eq!(1, bundle.get_obstacles().get_colliders().len());
		let blocked = bundle
			.get_grid()
			.get_voxels()
			.iter()
			.filter(|v| !v.is_walkable())
			.count();
		assert!(blocked > 0);
		assert_eq!(Algorithm::AStar, bundle.get_planner().get_algorithm());
	}
	#[test]
	fn invalid_grid() {
		let mut settings = settings();
		settings.grid.cell_size = 0.0;
		let result = VoxelPathfindingBundle::new(&settings, Obstacles::new());
		assert!(matches!(result, Err(GridError::InvalidCellSize(_))));
	}
	#[test]
	#[cfg(feature = "ron")]
	fn new_bundle_from_disk() {
		let path = env!("CARGO_MANIFEST_DIR").to_string() + "/assets/planner_settings.ron";
		let bundle = VoxelPathfindingBundle::new_from_disk(path, Obstacles::new()).unwrap();
		assert_eq!(20 * 10 * 20, bundle.get_grid().len());
		assert_eq!(Algorithm::BeamSearch, bundle.get_planner().get_algorithm());
	}
}
